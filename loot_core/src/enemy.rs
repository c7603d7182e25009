//! Enemy - Enemy templates, stat scaling and encounter selection

use crate::item::DamageRange;
use crate::types::{Attributes, DamageType, EnemyType, Rarity, Resistances};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Level window used when matching enemies to the player
pub const LEVEL_WINDOW: u32 = 2;

/// Damage an enemy deals per attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyDamage {
    pub min: f64,
    pub max: f64,
    #[serde(default, rename = "type")]
    pub damage_type: DamageType,
}

impl EnemyDamage {
    pub fn range(&self) -> DamageRange {
        DamageRange::new(self.min, self.max)
    }
}

/// One entry of an ordered drop table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropChance {
    pub rarity: Rarity,
    pub chance: f64,
}

/// Inclusive gold range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldDrop {
    pub min: u32,
    pub max: u32,
}

/// Enemy definition from the catalog, or a scaled instance of one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub health: f64,
    pub damage: EnemyDamage,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub attributes: Attributes,
    /// Percent chance (0..=100) that an item drops
    #[serde(default)]
    pub loot_chance: f64,
    /// Walked in order when choosing a rarity
    #[serde(default)]
    pub drop_table: Vec<DropChance>,
    #[serde(default)]
    pub preferred_items: Vec<String>,
    #[serde(default)]
    pub enemy_type: EnemyType,
    #[serde(default)]
    pub gold_drop: Option<GoldDrop>,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub resistances: Resistances,
}

fn default_level() -> u32 {
    1
}

impl Enemy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u32) -> Self {
        Enemy {
            id: id.into(),
            name: name.into(),
            level,
            health: 50.0,
            damage: EnemyDamage {
                min: 5.0,
                max: 10.0,
                damage_type: DamageType::Physical,
            },
            defense: 0.0,
            attributes: Attributes::default(),
            loot_chance: 0.0,
            drop_table: Vec::new(),
            preferred_items: Vec::new(),
            enemy_type: EnemyType::Normal,
            gold_drop: None,
            experience: 0,
            resistances: Resistances::default(),
        }
    }

    pub fn with_loot_chance(mut self, chance: f64) -> Self {
        self.loot_chance = chance;
        self
    }

    pub fn with_drop(mut self, rarity: Rarity, chance: f64) -> Self {
        self.drop_table.push(DropChance { rarity, chance });
        self
    }

    pub fn with_preferred(mut self, tag: impl Into<String>) -> Self {
        self.preferred_items.push(tag.into());
        self
    }

    pub fn with_type(mut self, enemy_type: EnemyType) -> Self {
        self.enemy_type = enemy_type;
        self
    }

    pub fn with_gold(mut self, min: u32, max: u32) -> Self {
        self.gold_drop = Some(GoldDrop { min, max });
        self
    }

    pub fn with_resistance(mut self, damage_type: DamageType, value: f64) -> Self {
        *self.resistances.get_mut(damage_type) = value;
        self
    }

    /// Clone of this template with every combat number scaled by one
    /// random multiplier, `1 ± [0.05, 0.10)`, rounded to whole numbers.
    pub fn scaled(&self, rng: &mut impl Rng) -> Enemy {
        let adjustment = 0.05 + rng.gen::<f64>() * 0.05;
        let multiplier = if rng.gen_bool(0.5) {
            1.0 + adjustment
        } else {
            1.0 - adjustment
        };
        self.scaled_by(multiplier)
    }

    pub fn scaled_by(&self, multiplier: f64) -> Enemy {
        let mut enemy = self.clone();
        enemy.attributes = self.attributes.scaled(multiplier);
        enemy.health = (self.health * multiplier).round();
        enemy.damage.min = (self.damage.min * multiplier).round();
        enemy.damage.max = (self.damage.max * multiplier).round();
        enemy.defense = (self.defense * multiplier).round();
        tracing::debug!(enemy = %enemy.id, multiplier, "scaled enemy");
        enemy
    }

    pub fn resistance(&self, damage_type: DamageType) -> f64 {
        self.resistances.get(damage_type)
    }
}

/// Level a player is matched at: floor(attribute sum / 10)
pub fn effective_level(attributes: &Attributes) -> u32 {
    (attributes.total().max(0.0) / 10.0).floor() as u32
}

/// Pick 3 or 4 enemies within [`LEVEL_WINDOW`] levels of `player_level`,
/// falling back to any template when none match. Each pick is a scaled clone.
pub fn generate_encounter(templates: &[Enemy], player_level: u32, rng: &mut impl Rng) -> Vec<Enemy> {
    if templates.is_empty() {
        tracing::warn!("no enemy templates loaded, encounter is empty");
        return Vec::new();
    }

    let suitable: Vec<&Enemy> = templates
        .iter()
        .filter(|e| e.level.abs_diff(player_level) <= LEVEL_WINDOW)
        .collect();
    if suitable.is_empty() {
        tracing::debug!(player_level, "no enemies in level window, using any template");
    }

    let count = rng.gen_range(3..=4);
    let mut group = Vec::with_capacity(count);
    for _ in 0..count {
        let template = if suitable.is_empty() {
            templates.choose(rng)
        } else {
            suitable.choose(rng).copied()
        };
        if let Some(template) = template {
            group.push(template.scaled(rng));
        }
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scaled_by_rounds() {
        let mut goblin = Enemy::new("goblin", "哥布林", 3);
        goblin.health = 55.0;
        goblin.defense = 12.0;
        let scaled = goblin.scaled_by(1.1);

        assert!((scaled.health - 61.0).abs() < f64::EPSILON);
        assert!((scaled.defense - 13.0).abs() < f64::EPSILON);
        assert!((scaled.damage.max - 11.0).abs() < f64::EPSILON);
        // template untouched
        assert!((goblin.health - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_within_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut ogre = Enemy::new("ogre", "食人魔", 5);
        ogre.health = 1000.0;
        for _ in 0..50 {
            let scaled = ogre.scaled(&mut rng);
            let ratio = scaled.health / 1000.0;
            assert!((0.899..=1.101).contains(&ratio), "ratio {ratio}");
            assert!((ratio - 1.0).abs() >= 0.049);
        }
    }

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level(&Attributes::uniform(13.0)), 6);
        assert_eq!(effective_level(&Attributes::uniform(0.0)), 0);
    }

    #[test]
    fn test_encounter_prefers_matching_levels() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let templates = vec![Enemy::new("rat", "老鼠", 1), Enemy::new("dragon", "巨龙", 30)];

        for _ in 0..20 {
            let group = generate_encounter(&templates, 2, &mut rng);
            assert!((3..=4).contains(&group.len()));
            assert!(group.iter().all(|e| e.id == "rat"));
        }
    }

    #[test]
    fn test_encounter_falls_back_to_any() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let templates = vec![Enemy::new("dragon", "巨龙", 30)];
        let group = generate_encounter(&templates, 1, &mut rng);
        assert!(!group.is_empty());
        assert!(generate_encounter(&[], 1, &mut rng).is_empty());
    }

    #[test]
    fn test_parse_enemy_toml() {
        let enemy: Enemy = toml::from_str(
            r#"
id = "wolf"
name = "野狼"
level = 2
health = 40
defense = 5
loot_chance = 60
preferred_items = ["sword", "ring"]
enemy_type = "elite"
experience = 25

[damage]
min = 4
max = 8
type = "physical"

[gold_drop]
min = 3
max = 9

[[drop_table]]
rarity = "common"
chance = 70

[[drop_table]]
rarity = "rare"
chance = 30

[resistances]
fire = 20
"#,
        )
        .unwrap();

        assert_eq!(enemy.enemy_type, EnemyType::Elite);
        assert_eq!(enemy.drop_table[1].rarity, Rarity::Rare);
        assert!((enemy.resistance(DamageType::Fire) - 20.0).abs() < f64::EPSILON);
        assert!((enemy.resistance(DamageType::Ice)).abs() < f64::EPSILON);
    }
}
