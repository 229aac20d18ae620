/// The three mechanical properties the dataset pairs with an improvement
/// percentage. Labels, hover text and size encodings vary per property; the
/// size encodings are bounded and monotonic in the value's magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    Modulus,
    Strength,
    Strain,
}

impl Property {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Modulus => "elastic_modulus",
            Self::Strength => "strength",
            Self::Strain => "strain",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Modulus => "Elastic Modulus",
            Self::Strength => "Strength",
            Self::Strain => "Strain to Failure",
        }
    }

    /// Formatted value used as the node label, and thus as node identity.
    pub fn primary_label(self, value: f64) -> String {
        match self {
            Self::Modulus => format!("{value:.2} GPa"),
            Self::Strength => format!("{value:.2} MPa"),
            Self::Strain => format!("{value:.3}"),
        }
    }

    pub fn primary_size(self, value: f64) -> f64 {
        let magnitude = value.abs();
        match self {
            Self::Modulus => 10.0 + (magnitude / 0.5).min(30.0),
            Self::Strength => 10.0 + (magnitude / 10.0).min(30.0),
            Self::Strain => 10.0 + (magnitude * 100.0).min(30.0),
        }
    }

    /// The raw-value variants color primaries by sign; the log10 variants
    /// only ever see positive values and use a single color.
    pub fn primary_color(self, value: f64, signed_palette: bool) -> &'static str {
        if signed_palette && value < 0.0 {
            "lightpink"
        } else {
            "lightblue"
        }
    }

    pub fn primary_title(self, value: f64, log10: Option<f64>) -> String {
        let mut title = format!(
            "Polymer Matrix {}: {}",
            self.display_name(),
            self.primary_label(value)
        );
        if let Some(log10) = log10 {
            title.push_str(&format!("\nLog10 Value: {log10:.4}"));
        }
        title
    }

    pub fn improvement_title(self, value: f64, log10: Option<f64>) -> String {
        let mut title = format!("{} Improvement: {value:.1}%", self.display_name());
        if let Some(log10) = log10 {
            title.push_str(&format!("\nLog10 Value: {log10:.4}"));
        }
        title
    }
}

pub fn improvement_label(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn improvement_size(value: f64) -> f64 {
    10.0 + (value.abs() / 10.0).min(30.0)
}

pub fn improvement_color(value: f64) -> &'static str {
    if value >= 0.0 {
        "lightgreen"
    } else {
        "lightcoral"
    }
}
