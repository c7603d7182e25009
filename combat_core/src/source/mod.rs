//! StatSource - Trait and implementations for stat providers

mod base_stats;
mod gear;

pub use base_stats::BaseStatsSource;
pub use gear::GearSource;

use crate::stat_block::StatAccumulator;
use loot_core::types::Attributes;

/// Trait for anything that contributes to a combatant's stats
pub trait StatSource {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Priority for application order (higher = applied later)
    /// Default priority is 0.
    /// Suggested priorities:
    /// - Base stats: -100
    /// - Gear: 0
    fn priority(&self) -> i32 {
        0
    }

    /// Adjust attributes before any combat stat is derived
    fn apply_attributes(&self, _attributes: &mut Attributes) {}

    /// Apply this source's stats to the accumulator
    fn apply(&self, stats: &mut StatAccumulator);
}
