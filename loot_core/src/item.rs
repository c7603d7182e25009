//! Item - Base item templates and rolled item instances

use crate::affix::AppliedAffix;
use crate::naming::name_for_affixes;
use crate::types::{AffixKind, DamageType, EquipmentSlot, ItemKind, Rarity, SlotCategory};
use serde::{Deserialize, Serialize};

/// Hard cap on affixes carried by a single item
pub const MAX_AFFIXES: usize = 6;

/// Durability assumed when no rarity configuration is available
pub const DEFAULT_DURABILITY: u32 = 100;

/// Inclusive damage range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

impl DamageRange {
    pub fn new(min: f64, max: f64) -> Self {
        DamageRange { min, max }
    }

    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Multiply both ends, rounding to whole numbers
    pub fn scaled(&self, multiplier: f64) -> Self {
        DamageRange {
            min: (self.min * multiplier).round(),
            max: (self.max * multiplier).round(),
        }
    }
}

/// Catalog entry an item is rolled from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub base_damage: Option<DamageRange>,
    #[serde(default)]
    pub base_armor: Option<f64>,
    #[serde(default)]
    pub damage_type: DamageType,
}

fn default_level() -> u32 {
    1
}

impl BaseItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        BaseItem {
            id: id.into(),
            name: name.into(),
            kind,
            level: 1,
            base_damage: None,
            base_armor: None,
            damage_type: DamageType::Physical,
        }
    }

    pub fn with_damage(mut self, min: f64, max: f64) -> Self {
        self.base_damage = Some(DamageRange::new(min, max));
        self
    }

    pub fn with_armor(mut self, armor: f64) -> Self {
        self.base_armor = Some(armor);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Placeholder weapon used when a loot pool is empty
    pub fn stub_weapon() -> Self {
        BaseItem::new("stub_weapon", "破旧的武器", ItemKind::Melee).with_damage(1.0, 3.0)
    }
}

/// A rolled item instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub base_id: String,
    pub base_name: String,
    pub kind: ItemKind,
    pub rarity: Rarity,
    pub level: u32,
    pub durability: f64,
    pub max_durability: u32,
    pub enhance_level: u32,
    pub base_damage: Option<DamageRange>,
    pub base_armor: Option<f64>,
    pub damage_type: DamageType,
    affixes: Vec<AppliedAffix>,
    final_name: String,
}

impl Item {
    pub fn affixes(&self) -> &[AppliedAffix] {
        &self.affixes
    }

    pub fn final_name(&self) -> &str {
        &self.final_name
    }

    pub fn slot_category(&self) -> SlotCategory {
        self.kind.slot_category()
    }

    pub fn equipment_slot(&self) -> EquipmentSlot {
        self.kind.equipment_slot()
    }

    pub fn is_full(&self) -> bool {
        self.affixes.len() >= MAX_AFFIXES
    }

    /// Append an affix and rename the item. Refused once the cap is reached.
    pub fn push_affix(&mut self, affix: AppliedAffix) -> bool {
        if self.is_full() {
            return false;
        }
        self.affixes.push(affix);
        self.rename();
        true
    }

    /// Remove the affix at `index`, returning it
    pub fn remove_affix(&mut self, index: usize) -> Option<AppliedAffix> {
        if index >= self.affixes.len() {
            return None;
        }
        let removed = self.affixes.remove(index);
        self.rename();
        Some(removed)
    }

    pub fn count_kind(&self, kind: AffixKind) -> usize {
        self.affixes.iter().filter(|a| a.kind == kind).count()
    }

    /// Spend durability, refusing when not enough remains
    pub fn spend_durability(&mut self, amount: f64) -> bool {
        if self.durability < amount {
            return false;
        }
        self.durability -= amount;
        true
    }

    /// Regain durability, never above the maximum
    pub fn restore_durability(&mut self, amount: f64) {
        self.durability = (self.durability + amount.max(0.0)).min(self.max_durability as f64);
    }

    /// Bring externally loaded data back within item invariants: durability
    /// in `[0, max_durability]` and at most [`MAX_AFFIXES`] affixes.
    /// Returns true when anything changed.
    pub fn sanitize(&mut self) -> bool {
        let max = self.max_durability as f64;
        let durability = if self.durability.is_nan() {
            0.0
        } else {
            self.durability.clamp(0.0, max)
        };
        let mut changed = durability != self.durability;
        self.durability = durability;

        if self.affixes.len() > MAX_AFFIXES {
            tracing::warn!(
                item = %self.base_id,
                affixes = self.affixes.len(),
                "item exceeds the affix cap, dropping extras"
            );
            self.affixes.truncate(MAX_AFFIXES);
            changed = true;
        }
        if changed {
            self.rename();
        }
        changed
    }

    fn rename(&mut self) {
        self.final_name = name_for_affixes(&self.base_name, &self.affixes);
    }
}

/// Builds an [`Item`] from a base template and an ordered affix list
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    base: BaseItem,
    rarity: Rarity,
    max_durability: u32,
    affixes: Vec<AppliedAffix>,
}

impl ItemBuilder {
    pub fn new(base: &BaseItem) -> Self {
        ItemBuilder {
            base: base.clone(),
            rarity: Rarity::Common,
            max_durability: DEFAULT_DURABILITY,
            affixes: Vec::new(),
        }
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn max_durability(mut self, max_durability: u32) -> Self {
        self.max_durability = max_durability;
        self
    }

    /// Add an affix; ignored past the cap
    pub fn affix(mut self, affix: AppliedAffix) -> Self {
        if self.affixes.len() < MAX_AFFIXES {
            self.affixes.push(affix);
        } else {
            tracing::warn!(affix = %affix.affix.id, "affix cap reached, dropping affix");
        }
        self
    }

    pub fn affixes(mut self, affixes: impl IntoIterator<Item = AppliedAffix>) -> Self {
        for affix in affixes {
            self = self.affix(affix);
        }
        self
    }

    pub fn build(self) -> Item {
        let final_name = name_for_affixes(&self.base.name, &self.affixes);
        Item {
            base_id: self.base.id,
            base_name: self.base.name,
            kind: self.base.kind,
            rarity: self.rarity,
            level: self.base.level,
            durability: self.max_durability as f64,
            max_durability: self.max_durability,
            enhance_level: 0,
            base_damage: self.base.base_damage,
            base_armor: self.base.base_armor,
            damage_type: self.base.damage_type,
            affixes: self.affixes,
            final_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::Affix;
    use std::sync::Arc;

    fn prefix(name: &str) -> AppliedAffix {
        AppliedAffix::new(AffixKind::Prefix, Arc::new(Affix::new(name, name)))
    }

    #[test]
    fn test_builder_names_and_durability() {
        let base = BaseItem::new("long_sword", "长剑", ItemKind::Melee).with_damage(10.0, 20.0);
        let item = ItemBuilder::new(&base)
            .rarity(Rarity::Rare)
            .max_durability(200)
            .affix(prefix("锋利的"))
            .build();

        assert_eq!(item.final_name(), "锋利的长剑");
        assert_eq!(item.rarity, Rarity::Rare);
        assert!((item.durability - 200.0).abs() < f64::EPSILON);
        assert_eq!(item.equipment_slot(), EquipmentSlot::Weapon);
    }

    #[test]
    fn test_builder_caps_affixes() {
        let base = BaseItem::new("ring", "戒指", ItemKind::Finger);
        let item = ItemBuilder::new(&base)
            .affixes((0..10).map(|i| prefix(&format!("p{i}"))))
            .build();
        assert_eq!(item.affixes().len(), MAX_AFFIXES);
        assert!(item.is_full());
    }

    #[test]
    fn test_push_affix_renames() {
        let base = BaseItem::new("helm", "头盔", ItemKind::Head).with_armor(5.0);
        let mut item = ItemBuilder::new(&base).build();
        assert_eq!(item.final_name(), "头盔");

        let suffix = AppliedAffix::new(AffixKind::Suffix, Arc::new(Affix::new("s", "守护之")));
        assert!(item.push_affix(suffix));
        assert_eq!(item.final_name(), "守护之头盔");

        item.remove_affix(0);
        assert_eq!(item.final_name(), "头盔");
    }

    #[test]
    fn test_sanitize_tampered_item() {
        let base = BaseItem::new("long_sword", "长剑", ItemKind::Melee).with_damage(10.0, 20.0);
        let item = ItemBuilder::new(&base)
            .max_durability(100)
            .affixes((0..6).map(|i| prefix(&format!("p{i}"))))
            .build();

        let mut value = serde_json::to_value(&item).unwrap();
        value["durability"] = serde_json::json!(5000.0);
        let extra = value["affixes"][0].clone();
        if let Some(affixes) = value["affixes"].as_array_mut() {
            affixes.push(extra.clone());
            affixes.push(extra);
        }
        let mut tampered: Item = serde_json::from_value(value).unwrap();
        assert_eq!(tampered.affixes().len(), 8);

        assert!(tampered.sanitize());
        assert_eq!(tampered.affixes().len(), MAX_AFFIXES);
        assert!((tampered.durability - 100.0).abs() < f64::EPSILON);
        assert_eq!(tampered, item);

        // Already valid items are left alone
        assert!(!tampered.sanitize());

        tampered.durability = -3.0;
        assert!(tampered.sanitize());
        assert!(tampered.durability.abs() < f64::EPSILON);
    }

    #[test]
    fn test_durability_bounds() {
        let base = BaseItem::new("boots", "靴子", ItemKind::Feet);
        let mut item = ItemBuilder::new(&base).max_durability(100).build();

        assert!(item.spend_durability(30.0));
        assert!(!item.spend_durability(80.0));
        assert!((item.durability - 70.0).abs() < f64::EPSILON);

        item.restore_durability(50.0);
        assert!((item.durability - 100.0).abs() < f64::EPSILON);
    }
}
