//! GearSource - Stats from an equipped item

use crate::source::StatSource;
use crate::stat_block::{apply_attribute_effect, StatAccumulator};
use loot_core::types::{Attributes, EquipmentSlot};
use loot_core::Item;

/// Stats from an equipped item
pub struct GearSource<'a> {
    /// Which slot this item is in
    pub slot: EquipmentSlot,
    pub item: &'a Item,
}

impl<'a> GearSource<'a> {
    pub fn new(slot: EquipmentSlot, item: &'a Item) -> Self {
        GearSource { slot, item }
    }
}

impl StatSource for GearSource<'_> {
    fn id(&self) -> &str {
        &self.item.base_id
    }

    fn apply_attributes(&self, attributes: &mut Attributes) {
        for applied in self.item.affixes() {
            for effect in &applied.affix.effects {
                apply_attribute_effect(attributes, effect);
            }
        }
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        // Base values first so percentage affixes see them in the subtotal
        if let Some(damage) = self.item.base_damage {
            stats.attack += damage.average();
        }
        if let Some(armor) = self.item.base_armor {
            stats.defense += armor;
        }

        for applied in self.item.affixes() {
            for effect in &applied.affix.effects {
                stats.apply_effect(effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loot_core::affix::{Affix, AffixEffect, AppliedAffix};
    use loot_core::types::{AffixKind, ItemKind, SlotCategory, StatType};
    use loot_core::{BaseItem, ItemBuilder};
    use std::sync::Arc;

    fn sword() -> Item {
        let base = BaseItem::new("iron_sword", "铁剑", ItemKind::Melee).with_damage(10.0, 20.0);
        let sharp = Affix::new("sharp", "锋利的")
            .with_applicable(SlotCategory::Weapon)
            .with_effect(AffixEffect::flat(StatType::Damage, 5.0))
            .with_effect(AffixEffect::flat(StatType::Strength, 2.0));
        ItemBuilder::new(&base)
            .affix(AppliedAffix::new(AffixKind::Prefix, Arc::new(sharp)))
            .build()
    }

    #[test]
    fn test_gear_source_id() {
        let item = sword();
        let source = GearSource::new(EquipmentSlot::Weapon, &item);
        assert_eq!(source.id(), "iron_sword");
        assert_eq!(source.priority(), 0);
    }

    #[test]
    fn test_gear_applies_base_and_affixes() {
        let item = sword();
        let source = GearSource::new(EquipmentSlot::Weapon, &item);

        let mut attributes = Attributes::default();
        source.apply_attributes(&mut attributes);
        assert!((attributes.strength - 12.0).abs() < f64::EPSILON);

        let mut acc = StatAccumulator::new(attributes);
        source.apply(&mut acc);
        assert!((acc.attack - 20.0).abs() < f64::EPSILON);
    }
}
