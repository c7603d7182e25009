//! Resistance - Percentage mitigation capped at 75%

use super::constants::MAX_RESISTANCE;

/// Resistance clamped to [0, 75]; NaN counts as 0
pub fn capped_resistance(resistance: f64) -> f64 {
    if resistance.is_nan() {
        return 0.0;
    }
    resistance.clamp(0.0, MAX_RESISTANCE)
}

/// Damage left after resistance
pub fn apply_resistance(damage: f64, resistance: f64) -> f64 {
    if damage <= 0.0 {
        return 0.0;
    }
    damage * (1.0 - capped_resistance(resistance) / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistance_cap() {
        assert!((capped_resistance(90.0) - 75.0).abs() < f64::EPSILON);
        assert!((capped_resistance(-20.0)).abs() < f64::EPSILON);
        assert!((capped_resistance(f64::NAN)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_resistance() {
        assert!((apply_resistance(500.0, 50.0) - 250.0).abs() < f64::EPSILON);
        assert!((apply_resistance(100.0, 200.0) - 25.0).abs() < f64::EPSILON);
        assert!((apply_resistance(-5.0, 10.0)).abs() < f64::EPSILON);
    }
}
