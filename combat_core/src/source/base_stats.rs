//! BaseStatsSource - Stats derived from attributes

use crate::config::BaseStatConstants;
use crate::source::StatSource;
use crate::stat_block::StatAccumulator;

/// Converts the accumulator's attributes into base combat stats
pub struct BaseStatsSource {
    pub constants: BaseStatConstants,
}

impl BaseStatsSource {
    pub fn new(constants: BaseStatConstants) -> Self {
        BaseStatsSource { constants }
    }
}

impl StatSource for BaseStatsSource {
    fn id(&self) -> &str {
        "base_stats"
    }

    fn priority(&self) -> i32 {
        -100 // Base stats apply first
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        let c = &self.constants;
        let attributes = stats.attributes;
        let above = |value: f64| value - c.attribute_baseline;

        stats.attack += above(attributes.strength) * c.attack_per_strength;
        stats.defense += above(attributes.endurance) * c.defense_per_endurance;
        stats.dodge_rate += c.base_dodge + above(attributes.agility) * c.dodge_per_agility;
        stats.crit_chance += c.base_crit_chance + above(attributes.precision) * c.crit_per_precision;
        stats.hit_rate += c.base_hit_rate + above(attributes.precision) * c.hit_per_precision;
        stats.crit_damage += c.base_crit_damage;
        stats.max_health += c.base_health + above(attributes.vitality) * c.health_per_vitality;
    }
}
