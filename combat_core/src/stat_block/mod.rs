//! CombatStats - Derived combat numbers for a combatant
//!
//! A `CombatStats` block is never edited in place. It is rebuilt from
//! attributes and equipment by the aggregator whenever either changes.

mod aggregator;

pub use aggregator::{aggregate, recompute_stats, recompute_stats_with, StatAccumulator};
pub(crate) use aggregator::apply_attribute_effect;

use crate::config::{GameConstants, StatCaps};
use crate::defense::effective_defense;
use crate::source::BaseStatsSource;
use loot_core::types::{DamageType, Resistances};
use loot_core::Enemy;
use serde::{Deserialize, Serialize};

/// Effective combat stats. Bounded stats are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: f64,
    /// Defense after the diminishing-returns curve
    pub defense: f64,
    pub crit_chance: f64,
    /// Crit damage in percent (150 = ×1.5)
    pub crit_damage: f64,
    pub dodge_rate: f64,
    pub hit_rate: f64,
    pub penetration_rate: f64,
    pub resistances: Resistances,
    pub max_health: f64,
}

impl Default for CombatStats {
    fn default() -> Self {
        CombatStats {
            attack: 0.0,
            defense: 0.0,
            crit_chance: 5.0,
            crit_damage: 150.0,
            dodge_rate: 3.0,
            hit_rate: 80.0,
            penetration_rate: 0.0,
            resistances: Resistances::default(),
            max_health: 100.0,
        }
    }
}

fn bounded(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max.max(0.0))
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

impl CombatStats {
    /// Copy with every stat forced into its valid range; NaN becomes 0
    pub fn clamped(&self, caps: &StatCaps) -> CombatStats {
        CombatStats {
            attack: non_negative(self.attack),
            defense: non_negative(self.defense),
            crit_chance: bounded(self.crit_chance, caps.crit_chance),
            crit_damage: bounded(self.crit_damage, caps.crit_damage),
            dodge_rate: bounded(self.dodge_rate, caps.dodge_rate),
            hit_rate: bounded(self.hit_rate, caps.hit_rate),
            penetration_rate: bounded(self.penetration_rate, caps.penetration_rate),
            resistances: self.resistances.map(|r| bounded(r, caps.resistance)),
            max_health: non_negative(self.max_health),
        }
    }

    pub fn resistance(&self, damage_type: DamageType) -> f64 {
        self.resistances.get(damage_type)
    }

    /// Stats for an enemy instance
    ///
    /// Rates come from the enemy's attributes the same way a character's
    /// do; defense, resistances and health come from the enemy itself.
    pub fn for_enemy(enemy: &Enemy, constants: &GameConstants) -> CombatStats {
        let base = BaseStatsSource::new(constants.base.clone());
        let mut stats = aggregate(&[&base], enemy.attributes, constants);

        stats.attack = enemy.damage.range().average();
        stats.defense = effective_defense(enemy.defense, constants.defense.scale);
        stats.resistances = enemy.resistances;
        stats.max_health = enemy.health;
        stats.clamped(&constants.caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_caps_and_nan() {
        let stats = CombatStats {
            attack: -5.0,
            defense: f64::NAN,
            crit_chance: 120.0,
            crit_damage: 900.0,
            dodge_rate: 100.0,
            hit_rate: 150.0,
            penetration_rate: -3.0,
            resistances: Resistances {
                fire: 90.0,
                ice: f64::NAN,
                ..Resistances::default()
            },
            max_health: 100.0,
        };

        let clamped = stats.clamped(&StatCaps::default());
        assert!(clamped.attack.abs() < f64::EPSILON);
        assert!(clamped.defense.abs() < f64::EPSILON);
        assert!((clamped.crit_chance - 75.0).abs() < f64::EPSILON);
        assert!((clamped.crit_damage - 500.0).abs() < f64::EPSILON);
        assert!((clamped.dodge_rate - 75.0).abs() < f64::EPSILON);
        assert!((clamped.hit_rate - 99.0).abs() < f64::EPSILON);
        assert!(clamped.penetration_rate.abs() < f64::EPSILON);
        assert!((clamped.resistance(DamageType::Fire) - 75.0).abs() < f64::EPSILON);
        assert!(clamped.resistance(DamageType::Ice).abs() < f64::EPSILON);
    }

    #[test]
    fn test_for_enemy() {
        let constants = GameConstants::default();
        let enemy = Enemy::new("goblin", "哥布林", 3).with_resistance(DamageType::Fire, 20.0);

        let stats = CombatStats::for_enemy(&enemy, &constants);
        // Default attributes are all 10, so rates sit at their bases
        assert!((stats.dodge_rate - 3.0).abs() < f64::EPSILON);
        assert!((stats.crit_chance - 5.0).abs() < f64::EPSILON);
        assert!((stats.hit_rate - 80.0).abs() < f64::EPSILON);
        assert!((stats.resistance(DamageType::Fire) - 20.0).abs() < f64::EPSILON);
        assert!((stats.max_health - enemy.health).abs() < f64::EPSILON);
    }
}
