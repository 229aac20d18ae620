/// Observed range of a scalar metric over a node or edge set, used to map
/// distances and values onto visual ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    min: f64,
    max: f64,
}

impl Span {
    /// `None` when the input is empty, which downstream layout treats as a
    /// no-op rather than an error.
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let mut span = Self { min: first, max: first };
        for value in iter {
            span.min = span.min.min(value);
            span.max = span.max.max(value);
        }
        Some(span)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Position of `value` within the span. Degenerate spans (all values
    /// identical) map everything to the midpoint instead of dividing by zero.
    pub fn unit(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.5
        }
    }

    /// Linear map of `value` onto `[lo, hi]`.
    pub fn scale(&self, value: f64, lo: f64, hi: f64) -> f64 {
        lo + self.unit(value) * (hi - lo)
    }
}

/// Edge length encoding: the closest pair gets 50, the farthest 500.
pub fn edge_length(span: &Span, distance: f64) -> f64 {
    span.scale(distance, 50.0, 500.0)
}

/// Edge width shrinks as the normalized distance grows, floored at 0.5.
pub fn edge_width(span: &Span, distance: f64) -> f64 {
    (3.0 - span.unit(distance) * 2.0).max(0.5)
}
