use std::f64::consts::TAU;

/// `count` evenly spaced angles around the circle, starting at 0 and not
/// repeating the endpoint.
pub fn even_angles(count: usize) -> Vec<f64> {
    (0..count)
        .map(|index| index as f64 / count.max(1) as f64 * TAU)
        .collect()
}

pub fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_are_evenly_spaced_without_endpoint() {
        let angles = even_angles(4);
        assert_eq!(angles.len(), 4);
        assert!((angles[0]).abs() < 1e-12);
        assert!((angles[1] - TAU / 4.0).abs() < 1e-12);
        assert!((angles[3] - 3.0 * TAU / 4.0).abs() < 1e-12);
    }

    #[test]
    fn polar_projects_onto_axes() {
        let (x, y) = polar(10.0, 0.0);
        assert!((x - 10.0).abs() < 1e-12 && y.abs() < 1e-12);
        let (x, y) = polar(10.0, TAU / 4.0);
        assert!(x.abs() < 1e-9 && (y - 10.0).abs() < 1e-12);
    }
}
