//! Game constants configuration

use crate::combat::{StatusKind, StatusRule};
use crate::defense::constants::{DEFENSE_SCALE, MAX_RESISTANCE};
use loot_core::types::DamageType;
use serde::{Deserialize, Serialize};

/// Tunable game constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConstants {
    #[serde(default)]
    pub caps: StatCaps,
    #[serde(default)]
    pub base: BaseStatConstants,
    #[serde(default)]
    pub defense: DefenseConstants,
    #[serde(default)]
    pub progression: ProgressionConstants,
    #[serde(default)]
    pub battle: BattleConstants,
    #[serde(default = "default_status_rules")]
    pub status: Vec<StatusRule>,
}

impl Default for GameConstants {
    fn default() -> Self {
        GameConstants {
            caps: StatCaps::default(),
            base: BaseStatConstants::default(),
            defense: DefenseConstants::default(),
            progression: ProgressionConstants::default(),
            battle: BattleConstants::default(),
            status: default_status_rules(),
        }
    }
}

impl GameConstants {
    /// Status rule for a damage type, if any
    pub fn status_rule(&self, damage_type: DamageType) -> Option<&StatusRule> {
        self.status.iter().find(|r| r.damage_type == damage_type)
    }
}

/// Upper bounds for bounded combat stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatCaps {
    #[serde(default = "default_percent_cap")]
    pub crit_chance: f64,
    #[serde(default = "default_crit_damage_cap")]
    pub crit_damage: f64,
    #[serde(default = "default_percent_cap")]
    pub dodge_rate: f64,
    #[serde(default = "default_hit_cap")]
    pub hit_rate: f64,
    #[serde(default = "default_percent_cap")]
    pub penetration_rate: f64,
    #[serde(default = "default_percent_cap")]
    pub resistance: f64,
}

impl Default for StatCaps {
    fn default() -> Self {
        StatCaps {
            crit_chance: 75.0,
            crit_damage: 500.0,
            dodge_rate: 75.0,
            hit_rate: 99.0,
            penetration_rate: 75.0,
            resistance: MAX_RESISTANCE,
        }
    }
}

fn default_percent_cap() -> f64 {
    75.0
}
fn default_crit_damage_cap() -> f64 {
    500.0
}
fn default_hit_cap() -> f64 {
    99.0
}

/// Attribute-to-stat conversion factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStatConstants {
    /// Attribute value that contributes nothing
    pub attribute_baseline: f64,
    pub attack_per_strength: f64,
    pub defense_per_endurance: f64,
    pub base_dodge: f64,
    pub dodge_per_agility: f64,
    pub base_crit_chance: f64,
    pub crit_per_precision: f64,
    pub base_hit_rate: f64,
    pub hit_per_precision: f64,
    /// Crit damage in percent (150 = ×1.5)
    pub base_crit_damage: f64,
    pub base_health: f64,
    pub health_per_vitality: f64,
}

impl Default for BaseStatConstants {
    fn default() -> Self {
        BaseStatConstants {
            attribute_baseline: 10.0,
            attack_per_strength: 2.0,
            defense_per_endurance: 1.0,
            base_dodge: 3.0,
            dodge_per_agility: 1.0,
            base_crit_chance: 5.0,
            crit_per_precision: 0.5,
            base_hit_rate: 80.0,
            hit_per_precision: 0.8,
            base_crit_damage: 150.0,
            base_health: 100.0,
            health_per_vitality: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseConstants {
    /// Scale of the diminishing-returns defense curve
    #[serde(default = "default_defense_scale")]
    pub scale: f64,
}

impl Default for DefenseConstants {
    fn default() -> Self {
        DefenseConstants {
            scale: DEFENSE_SCALE,
        }
    }
}

fn default_defense_scale() -> f64 {
    DEFENSE_SCALE
}

/// Levelling and starting resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConstants {
    /// Experience to the next level is this times the current level
    pub experience_per_level: u32,
    pub points_per_level: u32,
    pub starting_points: u32,
    pub starting_mana: f64,
}

impl Default for ProgressionConstants {
    fn default() -> Self {
        ProgressionConstants {
            experience_per_level: 100,
            points_per_level: 3,
            starting_points: 5,
            starting_mana: 50.0,
        }
    }
}

/// Battle loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConstants {
    pub skill_multiplier: f64,
    pub skill_mana_cost: f64,
    /// Exchanges after which a battle is abandoned
    pub max_exchanges: u32,
}

impl Default for BattleConstants {
    fn default() -> Self {
        BattleConstants {
            skill_multiplier: 1.5,
            skill_mana_cost: 10.0,
            max_exchanges: 500,
        }
    }
}

fn default_status_rules() -> Vec<StatusRule> {
    vec![
        StatusRule::new(DamageType::Fire, StatusKind::Burn, 30.0, 3, 0.1, "灼烧"),
        StatusRule::new(DamageType::Ice, StatusKind::Freeze, 25.0, 1, 0.0, "冰冻"),
        StatusRule::new(DamageType::Poison, StatusKind::Poison, 40.0, 4, 0.08, "中毒"),
        StatusRule::new(DamageType::Lightning, StatusKind::Electrify, 20.0, 2, 0.1, "感电"),
        StatusRule::new(DamageType::Electric, StatusKind::Electrify, 25.0, 3, 0.15, "强力感电"),
        StatusRule::new(DamageType::Paralysis, StatusKind::Paralysis, 15.0, 1, 0.0, "麻痹"),
    ]
}
