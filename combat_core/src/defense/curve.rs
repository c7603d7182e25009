//! Defense - Diminishing-returns curve and flat reduction

use super::constants::ELEMENTAL_DEFENSE_FACTOR;
use loot_core::types::DamageType;

/// Apply the diminishing-returns curve to raw defense
///
/// `effective = raw / (1 + raw / scale)`. Negative raw defense counts as 0.
/// The curve is strictly increasing and approaches `scale` asymptotically,
/// so doubling raw defense always less than doubles effective defense.
pub fn effective_defense(raw: f64, scale: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    raw / (1.0 + raw / scale)
}

/// Flat damage removed by defense after penetration
///
/// Physical damage meets the full defense, every other type half of it.
pub fn defense_reduction(defense: f64, penetration_rate: f64, damage_type: DamageType) -> f64 {
    let defense = defense.max(0.0);
    let penetration = penetration_rate.clamp(0.0, 100.0);
    let effective = defense * (1.0 - penetration / 100.0);
    if damage_type.is_physical() {
        effective
    } else {
        effective * ELEMENTAL_DEFENSE_FACTOR
    }
}
