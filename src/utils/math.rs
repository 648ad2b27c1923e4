/// Rounds to the nearest integer with halves going towards positive infinity.
///
/// `f64::round` sends -2.5 to -3; the scores and levels here expect -2.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(77.49), 77.0);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(120.0, 10.0, 90.0), 90.0);
        assert_eq!(clamp(-3.0, 10.0, 90.0), 10.0);
        assert_eq!(clamp(42.0, 10.0, 90.0), 42.0);
    }
}
