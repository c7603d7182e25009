//! Defense system - Defense curve, defense reduction and resistances

mod curve;
mod resistance;

pub use curve::{defense_reduction, effective_defense};
pub use resistance::{apply_resistance, capped_resistance};

/// Defense calculation constants
pub mod constants {
    /// Resistance cap in percent; no resistance ever exceeds it
    pub const MAX_RESISTANCE: f64 = 75.0;

    /// Defense curve scale: effective = raw / (1 + raw / SCALE)
    pub const DEFENSE_SCALE: f64 = 1000.0;

    /// Share of defense that applies against non-physical damage
    pub const ELEMENTAL_DEFENSE_FACTOR: f64 = 0.5;

    /// Floor for any hit that lands
    pub const MIN_DAMAGE: f64 = 1.0;
}
