//! Character - Progression, equipment and resources of the player

use crate::config::{default_constants, ClassDef, GameConstants};
use crate::stat_block::{recompute_stats_with, CombatStats};
use loot_core::crafting::{self, Inscription, Materials};
use loot_core::types::{Attribute, Attributes, DamageType, EquipmentSlot};
use loot_core::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn no_points() -> Attributes {
    Attributes::uniform(0.0)
}

/// The player character
///
/// `stats` is derived and never saved; call [`Character::recompute`] after
/// deserializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: ClassDef,
    pub level: u32,
    pub experience: u32,
    /// Points spent by the player on top of class growth
    #[serde(default = "no_points")]
    pub allocated: Attributes,
    pub unspent_points: u32,
    pub current_health: f64,
    pub mana: f64,
    pub max_mana: f64,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, Item>,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub inscriptions: Vec<Inscription>,
    #[serde(default)]
    pub materials: Materials,
    #[serde(default)]
    pub next_inscription_id: u64,
    #[serde(skip)]
    stats: CombatStats,
}

impl Character {
    pub fn new(name: impl Into<String>, class: ClassDef) -> Self {
        Self::new_with(name, class, default_constants())
    }

    /// Level 1 character at full health with the starting points and mana
    pub fn new_with(name: impl Into<String>, class: ClassDef, constants: &GameConstants) -> Self {
        let mut character = Character {
            name: name.into(),
            class,
            level: 1,
            experience: 0,
            allocated: no_points(),
            unspent_points: constants.progression.starting_points,
            current_health: 0.0,
            mana: constants.progression.starting_mana,
            max_mana: constants.progression.starting_mana,
            gold: 0,
            equipment: BTreeMap::new(),
            inventory: Vec::new(),
            inscriptions: Vec::new(),
            materials: Materials::default(),
            next_inscription_id: 1,
            stats: CombatStats::default(),
        };
        character.recompute_with(constants);
        character.current_health = character.max_health();
        character
    }

    /// Class attributes at the current level plus allocated points
    pub fn attributes(&self) -> Attributes {
        let mut attributes = self.class.attributes_at(self.level);
        for attribute in Attribute::all() {
            *attributes.get_mut(*attribute) += self.allocated.get(*attribute);
        }
        attributes
    }

    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }

    pub fn max_health(&self) -> f64 {
        self.stats.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn recompute(&mut self) {
        self.recompute_with(default_constants());
    }

    /// Rebuild derived stats and clamp current health to the new maximum
    pub fn recompute_with(&mut self, constants: &GameConstants) {
        self.stats = recompute_stats_with(self, constants);
        self.current_health = self.current_health.clamp(0.0, self.stats.max_health);
    }

    /// Spend unspent points on an attribute. Refused when short of points.
    pub fn allocate(&mut self, attribute: Attribute, points: u32, constants: &GameConstants) -> bool {
        if points == 0 || points > self.unspent_points {
            return false;
        }
        self.unspent_points -= points;
        *self.allocated.get_mut(attribute) += points as f64;
        self.recompute_with(constants);
        tracing::info!(character = %self.name, ?attribute, points, "allocated attribute points");
        true
    }

    /// Experience needed to leave the current level
    pub fn experience_to_next(&self, constants: &GameConstants) -> u32 {
        constants.progression.experience_per_level.saturating_mul(self.level)
    }

    /// Add experience, levelling up as many times as it covers.
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32, constants: &GameConstants) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        loop {
            let needed = self.experience_to_next(constants);
            if needed == 0 || self.experience < needed {
                break;
            }
            self.experience -= needed;
            self.level += 1;
            self.unspent_points += constants.progression.points_per_level;
            gained += 1;
        }
        if gained > 0 {
            self.recompute_with(constants);
            tracing::info!(character = %self.name, level = self.level, "level up");
        }
        gained
    }

    /// Put an item in its slot, returning whatever was there
    pub fn equip(&mut self, item: Item, constants: &GameConstants) -> Option<Item> {
        let slot = item.equipment_slot();
        let previous = self.equipment.insert(slot, item);
        self.recompute_with(constants);
        previous
    }

    pub fn unequip(&mut self, slot: EquipmentSlot, constants: &GameConstants) -> Option<Item> {
        let removed = self.equipment.remove(&slot);
        if removed.is_some() {
            self.recompute_with(constants);
        }
        removed
    }

    pub fn equipped(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.equipment.get(&slot)
    }

    /// Damage type of the equipped weapon, physical when unarmed
    pub fn attack_damage_type(&self) -> DamageType {
        self.equipment
            .get(&EquipmentSlot::Weapon)
            .map(|weapon| weapon.damage_type)
            .unwrap_or_default()
    }

    pub fn take_damage(&mut self, amount: f64) {
        if amount > 0.0 {
            self.current_health = (self.current_health - amount).max(0.0);
        }
    }

    pub fn heal(&mut self, amount: f64) {
        if amount > 0.0 {
            self.current_health = (self.current_health + amount).min(self.max_health());
        }
    }

    /// Spend mana, refusing when there is not enough
    pub fn spend_mana(&mut self, cost: f64) -> bool {
        if self.mana < cost {
            return false;
        }
        self.mana -= cost;
        true
    }

    /// Full health and mana
    pub fn restore(&mut self) {
        self.current_health = self.max_health();
        self.mana = self.max_mana;
    }

    /// Passive durability regeneration for equipped items
    pub fn regenerate_durability(&mut self, elapsed_secs: f64) {
        for item in self.equipment.values_mut() {
            crafting::regenerate_durability(item, elapsed_secs);
        }
    }

    /// Re-check every carried item against the item invariants
    pub fn sanitize_items(&mut self) -> usize {
        self.equipment
            .values_mut()
            .chain(self.inventory.iter_mut())
            .map(|item| item.sanitize())
            .filter(|changed| *changed)
            .count()
    }

    /// Hand out the next inscription id
    pub fn next_inscription_id(&mut self) -> u64 {
        let id = self.next_inscription_id;
        self.next_inscription_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_classes;
    use loot_core::affix::{Affix, AffixEffect, AppliedAffix};
    use loot_core::types::{AffixKind, ItemKind, StatType};
    use loot_core::{BaseItem, ItemBuilder};
    use std::sync::Arc;

    fn warrior() -> Character {
        let classes = default_classes();
        Character::new_with(
            "测试者",
            classes.find("warrior").unwrap().clone(),
            &GameConstants::default(),
        )
    }

    fn sword_with(effects: &[AffixEffect]) -> Item {
        let base = BaseItem::new("iron_sword", "铁剑", ItemKind::Melee).with_damage(10.0, 20.0);
        let mut affix = Affix::new("sharp", "锋利的");
        for effect in effects {
            affix = affix.with_effect(*effect);
        }
        ItemBuilder::new(&base)
            .affix(AppliedAffix::new(AffixKind::Prefix, Arc::new(affix)))
            .build()
    }

    #[test]
    fn test_new_character() {
        let character = warrior();
        assert_eq!(character.level, 1);
        assert_eq!(character.unspent_points, 5);
        assert!((character.mana - 50.0).abs() < f64::EPSILON);
        // vitality 14: 100 + 4 × 10
        assert!((character.max_health() - 140.0).abs() < f64::EPSILON);
        assert!((character.current_health - 140.0).abs() < f64::EPSILON);
        // strength 15: (15 − 10) × 2
        assert!((character.stats().attack - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_warrior_sword_attack() {
        let constants = GameConstants::default();
        let mut character = warrior();
        let previous = character.equip(sword_with(&[AffixEffect::flat(StatType::Damage, 5.0)]), &constants);
        assert!(previous.is_none());
        // 10 from strength + 15 average + 5 flat
        assert!((character.stats().attack - 30.0).abs() < f64::EPSILON);

        let removed = character.unequip(EquipmentSlot::Weapon, &constants);
        assert!(removed.is_some());
        assert!((character.stats().attack - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attribute_affix_feeds_base_stats() {
        let constants = GameConstants::default();
        let mut character = warrior();
        character.equip(sword_with(&[AffixEffect::flat(StatType::Strength, 5.0)]), &constants);
        // strength 20: 20 + 15 average
        assert!((character.stats().attack - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_allocate_points() {
        let constants = GameConstants::default();
        let mut character = warrior();
        assert!(!character.allocate(Attribute::Vitality, 6, &constants));
        assert!(character.allocate(Attribute::Vitality, 2, &constants));
        assert_eq!(character.unspent_points, 3);
        assert!((character.attributes().vitality - 16.0).abs() < f64::EPSILON);
        assert!((character.max_health() - 160.0).abs() < f64::EPSILON);
        // Current health is not raised by a higher maximum
        assert!((character.current_health - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gain_experience_levels() {
        let constants = GameConstants::default();
        let mut character = warrior();

        assert_eq!(character.gain_experience(99, &constants), 0);
        assert_eq!(character.level, 1);

        // 99 + 251 = 350: level 1→2 costs 100, 2→3 costs 200, 50 left over
        assert_eq!(character.gain_experience(251, &constants), 2);
        assert_eq!(character.level, 3);
        assert_eq!(character.experience, 50);
        assert_eq!(character.unspent_points, 11);
        assert!((character.attributes().strength - 19.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_damage_heal_and_mana() {
        let mut character = warrior();
        character.take_damage(200.0);
        assert!(!character.is_alive());
        character.heal(500.0);
        assert!((character.current_health - character.max_health()).abs() < f64::EPSILON);

        assert!(character.spend_mana(10.0));
        assert!((character.mana - 40.0).abs() < f64::EPSILON);
        character.mana = 5.0;
        assert!(!character.spend_mana(10.0));
        character.restore();
        assert!((character.mana - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recompute_idempotent() {
        let constants = GameConstants::default();
        let mut character = warrior();
        character.equip(sword_with(&[AffixEffect::percentage(StatType::Damage, 20.0)]), &constants);
        let first = *character.stats();
        character.recompute_with(&constants);
        assert_eq!(first, *character.stats());
    }

    #[test]
    fn test_inscription_ids() {
        let mut character = warrior();
        assert_eq!(character.next_inscription_id(), 1);
        assert_eq!(character.next_inscription_id(), 2);
    }
}
