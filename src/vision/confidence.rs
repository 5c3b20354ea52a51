//! Confidence display formatting.

/// Format a probability in `[0, 1]` as a percentage string.
///
/// Small values get two decimals, everything else one. Only an exact
/// (or saturated) 100 carries the `%` sign; callers append their own suffix.
pub fn format_confidence(probability: f32) -> String {
    let percentage = probability * 100.0;

    if percentage >= 100.0 {
        "100%".to_string()
    } else if percentage >= 10.0 {
        format!("{:.1}", percentage)
    } else if percentage >= 1.0 {
        format!("{:.1}", percentage)
    } else {
        format!("{:.2}", percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_values_are_capped() {
        assert_eq!(format_confidence(1.0), "100%");
        assert_eq!(format_confidence(1.5), "100%");
    }

    #[test]
    fn test_zero_uses_two_decimals() {
        assert_eq!(format_confidence(0.0), "0.00");
    }

    #[test]
    fn test_nan_does_not_panic() {
        assert_eq!(format_confidence(f32::NAN), "NaN");
    }
}
