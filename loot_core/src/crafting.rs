//! Crafting - Imprinting, enchanting, inscription combining, disassembly
//! and enhancement
//!
//! Every operation either succeeds or returns a [`CraftError`] with the
//! item, inscription and materials left untouched.

use crate::affix::{Affix, AppliedAffix};
use crate::item::{Item, MAX_AFFIXES};
use crate::types::{AffixKind, Rarity};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Share of max durability spent by an imprint
pub const IMPRINT_COST: f64 = 0.2;
/// Share of max durability spent by an enchant attempt
pub const ENCHANT_COST: f64 = 0.15;
/// Enchant success rate on an item with no affixes
pub const ENCHANT_BASE_RATE: f64 = 0.8;
/// Success rate lost per affix already on the item
pub const ENCHANT_AFFIX_PENALTY: f64 = 0.1;
pub const ENCHANT_MIN_RATE: f64 = 0.1;
/// Value multiplier when two inscriptions combine
pub const COMBINE_MULTIPLIER: f64 = 1.2;
pub const ENHANCE_DAMAGE_MULTIPLIER: f64 = 1.1;
pub const ENHANCE_ARMOR_MULTIPLIER: f64 = 1.15;
/// Durability regained per second by equipped items
pub const DURABILITY_REGEN_PER_SECOND: f64 = 0.1;

/// Crafting refusal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CraftError {
    #[error("item has no affix at index {0}")]
    NoSuchAffix(usize),
    #[error("unique affixes cannot be imprinted")]
    UniqueAffix,
    #[error("not enough durability: need {needed}, have {available:.1}")]
    InsufficientDurability { needed: f64, available: f64 },
    #[error("item already carries the maximum number of affixes")]
    AffixCapReached,
    #[error("inscriptions must share name and level to combine")]
    MismatchedInscriptions,
    #[error("an inscription cannot be combined with itself")]
    SameInscription,
    #[error("not enough materials")]
    InsufficientMaterials,
}

/// Crafting material kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    CommonDust,
    UncommonEssence,
    RareCrystal,
    EpicShard,
    AncientCore,
}

impl Material {
    pub fn all() -> &'static [Material] {
        &[
            Material::CommonDust,
            Material::UncommonEssence,
            Material::RareCrystal,
            Material::EpicShard,
            Material::AncientCore,
        ]
    }

    /// Material tied to a rarity tier
    pub fn for_rarity(rarity: Rarity) -> Material {
        match rarity {
            Rarity::Common => Material::CommonDust,
            Rarity::Uncommon => Material::UncommonEssence,
            Rarity::Rare => Material::RareCrystal,
            Rarity::Epic => Material::EpicShard,
            Rarity::Ancient => Material::AncientCore,
        }
    }
}

/// Material counters. Also used as a cost or yield bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Materials {
    pub common_dust: u32,
    pub uncommon_essence: u32,
    pub rare_crystal: u32,
    pub epic_shard: u32,
    pub ancient_core: u32,
}

impl Materials {
    pub fn get(&self, material: Material) -> u32 {
        match material {
            Material::CommonDust => self.common_dust,
            Material::UncommonEssence => self.uncommon_essence,
            Material::RareCrystal => self.rare_crystal,
            Material::EpicShard => self.epic_shard,
            Material::AncientCore => self.ancient_core,
        }
    }

    pub fn get_mut(&mut self, material: Material) -> &mut u32 {
        match material {
            Material::CommonDust => &mut self.common_dust,
            Material::UncommonEssence => &mut self.uncommon_essence,
            Material::RareCrystal => &mut self.rare_crystal,
            Material::EpicShard => &mut self.epic_shard,
            Material::AncientCore => &mut self.ancient_core,
        }
    }

    pub fn with(mut self, material: Material, count: u32) -> Self {
        *self.get_mut(material) += count;
        self
    }

    pub fn add(&mut self, other: &Materials) {
        for m in Material::all() {
            *self.get_mut(*m) = self.get(*m).saturating_add(other.get(*m));
        }
    }

    pub fn covers(&self, cost: &Materials) -> bool {
        Material::all().iter().all(|m| self.get(*m) >= cost.get(*m))
    }

    /// Subtract `cost`, refusing without change when it is not covered
    pub fn spend(&mut self, cost: &Materials) -> Result<(), CraftError> {
        if !self.covers(cost) {
            return Err(CraftError::InsufficientMaterials);
        }
        for m in Material::all() {
            *self.get_mut(*m) -= cost.get(*m);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        Material::all().iter().all(|m| self.get(*m) == 0)
    }
}

/// An affix lifted off an item, ready to be enchanted onto another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inscription {
    pub id: u64,
    pub affix: Arc<Affix>,
    pub affix_kind: AffixKind,
    pub level: u32,
    pub rarity: Rarity,
    pub value: f64,
    /// Value at imprint time; `value / base_value` scales the affix on enchant
    pub base_value: f64,
}

impl Inscription {
    pub fn name(&self) -> &str {
        &self.affix.name
    }

    pub fn potency(&self) -> f64 {
        if self.base_value.abs() < f64::EPSILON {
            1.0
        } else {
            self.value / self.base_value
        }
    }
}

/// Result of an enchant attempt that was allowed to roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnchantOutcome {
    Success { success_rate: f64 },
    Failure { success_rate: f64 },
}

impl EnchantOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EnchantOutcome::Success { .. })
    }
}

fn durability_cost(item: &Item, share: f64) -> f64 {
    (item.max_durability as f64 * share).round()
}

fn ensure_durability(item: &Item, needed: f64) -> Result<(), CraftError> {
    if item.durability < needed {
        return Err(CraftError::InsufficientDurability {
            needed,
            available: item.durability,
        });
    }
    Ok(())
}

/// Copy a non-unique affix off `item` into a new inscription.
/// The affix stays on the item; the item pays 20% of max durability.
pub fn imprint(item: &mut Item, affix_index: usize, id: u64) -> Result<Inscription, CraftError> {
    let applied = item
        .affixes()
        .get(affix_index)
        .ok_or(CraftError::NoSuchAffix(affix_index))?;
    if applied.kind == AffixKind::Unique {
        return Err(CraftError::UniqueAffix);
    }

    let cost = durability_cost(item, IMPRINT_COST);
    ensure_durability(item, cost)?;

    let value = applied.affix.primary_value();
    let inscription = Inscription {
        id,
        affix: Arc::clone(&applied.affix),
        affix_kind: applied.kind,
        level: item.level,
        rarity: item.rarity,
        value,
        base_value: value,
    };
    item.spend_durability(cost);
    tracing::debug!(item = %item.final_name(), affix = %inscription.name(), cost, "imprinted");
    Ok(inscription)
}

/// Success rate for enchanting an item that carries `affix_count` affixes
pub fn enchant_success_rate(affix_count: usize) -> f64 {
    (ENCHANT_BASE_RATE - ENCHANT_AFFIX_PENALTY * affix_count as f64).max(ENCHANT_MIN_RATE)
}

/// Try to add an inscription's affix to `item`.
///
/// Durability is spent on both success and failure. On success the affix,
/// scaled by the inscription's potency, is appended and the item renamed;
/// the caller consumes the inscription.
pub fn enchant(
    item: &mut Item,
    inscription: &Inscription,
    rng: &mut impl Rng,
) -> Result<EnchantOutcome, CraftError> {
    if item.affixes().len() >= MAX_AFFIXES {
        return Err(CraftError::AffixCapReached);
    }
    let cost = durability_cost(item, ENCHANT_COST);
    ensure_durability(item, cost)?;

    let success_rate = enchant_success_rate(item.affixes().len());
    let roll: f64 = rng.gen();
    item.spend_durability(cost);

    if roll > success_rate {
        tracing::debug!(item = %item.final_name(), success_rate, roll, "enchant failed");
        return Ok(EnchantOutcome::Failure { success_rate });
    }

    let affix = Arc::new(inscription.affix.scaled(inscription.potency()));
    item.push_affix(AppliedAffix::new(inscription.affix_kind, affix));
    tracing::debug!(item = %item.final_name(), success_rate, "enchant succeeded");
    Ok(EnchantOutcome::Success { success_rate })
}

/// Merge two inscriptions of the same name and level into one a level higher
pub fn combine_inscriptions(
    first: &Inscription,
    second: &Inscription,
    id: u64,
) -> Result<Inscription, CraftError> {
    if first.id == second.id {
        return Err(CraftError::SameInscription);
    }
    if first.name() != second.name() || first.level != second.level {
        return Err(CraftError::MismatchedInscriptions);
    }
    Ok(Inscription {
        id,
        affix: Arc::clone(&first.affix),
        affix_kind: first.affix_kind,
        level: first.level + 1,
        rarity: first.rarity,
        value: first.value * COMBINE_MULTIPLIER,
        base_value: first.base_value,
    })
}

/// Materials returned by breaking down an item of `rarity`
pub fn disassemble_yield(rarity: Rarity) -> Materials {
    let own = Material::for_rarity(rarity);
    let materials = Materials::default().with(own, 2);
    match rarity {
        Rarity::Common => materials,
        Rarity::Uncommon => materials.with(Material::CommonDust, 1),
        Rarity::Rare => materials.with(Material::UncommonEssence, 1),
        Rarity::Epic => materials.with(Material::RareCrystal, 1),
        Rarity::Ancient => materials.with(Material::EpicShard, 1),
    }
}

/// Consume an item, returning its materials
pub fn disassemble(item: Item) -> Materials {
    let materials = disassemble_yield(item.rarity);
    tracing::debug!(item = %item.final_name(), ?materials, "disassembled");
    materials
}

/// Cost of raising an item of `rarity` from `enhance_level` to the next level
pub fn enhance_cost(rarity: Rarity, enhance_level: u32) -> Materials {
    let n = enhance_level + 1;
    match rarity {
        Rarity::Common => Materials::default().with(Material::CommonDust, 2 * n),
        Rarity::Uncommon => Materials::default()
            .with(Material::UncommonEssence, n)
            .with(Material::CommonDust, n),
        Rarity::Rare => Materials::default()
            .with(Material::RareCrystal, n)
            .with(Material::UncommonEssence, n),
        Rarity::Epic => Materials::default()
            .with(Material::EpicShard, n)
            .with(Material::RareCrystal, n),
        Rarity::Ancient => Materials::default()
            .with(Material::AncientCore, n)
            .with(Material::EpicShard, n),
    }
}

/// Spend materials to raise base damage ×1.1 and base armor ×1.15
pub fn enhance(item: &mut Item, materials: &mut Materials) -> Result<(), CraftError> {
    let cost = enhance_cost(item.rarity, item.enhance_level);
    materials.spend(&cost)?;

    item.enhance_level += 1;
    if let Some(damage) = item.base_damage {
        item.base_damage = Some(damage.scaled(ENHANCE_DAMAGE_MULTIPLIER));
    }
    if let Some(armor) = item.base_armor {
        item.base_armor = Some((armor * ENHANCE_ARMOR_MULTIPLIER).round());
    }
    tracing::debug!(item = %item.final_name(), level = item.enhance_level, "enhanced");
    Ok(())
}

/// Regain durability for `elapsed_secs` of equipped time
pub fn regenerate_durability(item: &mut Item, elapsed_secs: f64) {
    if elapsed_secs > 0.0 {
        item.restore_durability(elapsed_secs * DURABILITY_REGEN_PER_SECOND);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::AffixEffect;
    use crate::generator::make_rng;
    use crate::item::{BaseItem, ItemBuilder};
    use crate::types::{ItemKind, StatType};

    fn affix(id: &str, name: &str, value: f64) -> Arc<Affix> {
        Arc::new(Affix::new(id, name).with_effect(AffixEffect::flat(StatType::Damage, value)))
    }

    fn sword(durability: u32, affixes: Vec<AppliedAffix>) -> Item {
        let base = BaseItem::new("sword", "长剑", ItemKind::Melee).with_damage(10.0, 20.0);
        ItemBuilder::new(&base)
            .rarity(Rarity::Rare)
            .max_durability(durability)
            .affixes(affixes)
            .build()
    }

    fn inscription(id: u64, name: &str, level: u32, value: f64) -> Inscription {
        Inscription {
            id,
            affix: affix(name, name, value),
            affix_kind: AffixKind::Prefix,
            level,
            rarity: Rarity::Rare,
            value,
            base_value: value,
        }
    }

    #[test]
    fn test_imprint_costs_durability() {
        let mut item = sword(200, vec![AppliedAffix::new(AffixKind::Prefix, affix("sharp", "锋利的", 5.0))]);
        let insc = imprint(&mut item, 0, 1).unwrap();

        assert_eq!(insc.name(), "锋利的");
        assert!((insc.value - 5.0).abs() < f64::EPSILON);
        assert!((item.durability - 160.0).abs() < f64::EPSILON);
        assert_eq!(item.affixes().len(), 1);
    }

    #[test]
    fn test_imprint_refusals_leave_item() {
        let mut item = sword(100, vec![AppliedAffix::new(AffixKind::Unique, affix("u", "龙之心", 1.0))]);
        assert_eq!(imprint(&mut item, 0, 1), Err(CraftError::UniqueAffix));
        assert_eq!(imprint(&mut item, 4, 1), Err(CraftError::NoSuchAffix(4)));
        assert!((item.durability - 100.0).abs() < f64::EPSILON);

        let mut worn = sword(100, vec![AppliedAffix::new(AffixKind::Suffix, affix("s", "力量之", 2.0))]);
        worn.durability = 10.0;
        assert!(matches!(
            imprint(&mut worn, 0, 1),
            Err(CraftError::InsufficientDurability { .. })
        ));
        assert!((worn.durability - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enchant_success_rate() {
        assert!((enchant_success_rate(0) - 0.8).abs() < 1e-9);
        assert!((enchant_success_rate(3) - 0.5).abs() < 1e-9);
        assert!((enchant_success_rate(5) - 0.3).abs() < 1e-9);
        assert!((enchant_success_rate(9) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_enchant_spends_durability_either_way() {
        let mut rng = make_rng(21);
        let insc = inscription(1, "锋利的", 1, 5.0);
        let mut successes = 0;
        for _ in 0..40 {
            let mut item = sword(100, Vec::new());
            let outcome = enchant(&mut item, &insc, &mut rng).unwrap();
            assert!((item.durability - 85.0).abs() < f64::EPSILON);
            if outcome.is_success() {
                successes += 1;
                assert_eq!(item.final_name(), "锋利的长剑");
            } else {
                assert!(item.affixes().is_empty());
            }
        }
        assert!(successes > 15);
    }

    #[test]
    fn test_enchant_refused_when_full() {
        let mut rng = make_rng(22);
        let full: Vec<AppliedAffix> = (0..MAX_AFFIXES)
            .map(|i| AppliedAffix::new(AffixKind::Suffix, affix(&format!("s{i}"), "之", 1.0)))
            .collect();
        let mut item = sword(100, full);
        let result = enchant(&mut item, &inscription(1, "x", 1, 1.0), &mut rng);
        assert_eq!(result, Err(CraftError::AffixCapReached));
        assert!((item.durability - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enchant_scales_by_potency() {
        let first = inscription(1, "锋利的", 1, 10.0);
        let second = inscription(2, "锋利的", 1, 10.0);
        let combined = combine_inscriptions(&first, &second, 3).unwrap();
        assert!((combined.potency() - 1.2).abs() < 1e-9);

        let mut rng = make_rng(23);
        loop {
            let mut item = sword(1000, Vec::new());
            if enchant(&mut item, &combined, &mut rng).unwrap().is_success() {
                let value = item.affixes()[0].affix.effects[0].value;
                assert!((value - 12.0).abs() < 1e-9);
                break;
            }
        }
    }

    #[test]
    fn test_combine_rules() {
        let a = inscription(1, "锋利的", 2, 5.0);
        let b = inscription(2, "锋利的", 2, 5.0);
        let combined = combine_inscriptions(&a, &b, 3).unwrap();
        assert_eq!(combined.level, 3);
        assert!((combined.value - 6.0).abs() < 1e-9);

        let other_level = inscription(4, "锋利的", 3, 5.0);
        assert_eq!(
            combine_inscriptions(&a, &other_level, 5),
            Err(CraftError::MismatchedInscriptions)
        );
        assert_eq!(combine_inscriptions(&a, &a, 6), Err(CraftError::SameInscription));
    }

    #[test]
    fn test_disassemble_yields() {
        assert_eq!(disassemble_yield(Rarity::Common), Materials::default().with(Material::CommonDust, 2));
        let epic = disassemble_yield(Rarity::Epic);
        assert_eq!(epic.epic_shard, 2);
        assert_eq!(epic.rare_crystal, 1);
        let rare = disassemble(sword(10, Vec::new()));
        assert_eq!(rare.rare_crystal, 2);
        assert_eq!(rare.uncommon_essence, 1);
    }

    #[test]
    fn test_enhance_cost_and_effect() {
        let mut item = sword(100, Vec::new());
        item.enhance_level = 1;
        let cost = enhance_cost(Rarity::Rare, 1);
        assert_eq!(cost.rare_crystal, 2);
        assert_eq!(cost.uncommon_essence, 2);

        let mut materials = Materials::default()
            .with(Material::RareCrystal, 3)
            .with(Material::UncommonEssence, 2);
        enhance(&mut item, &mut materials).unwrap();

        assert_eq!(item.enhance_level, 2);
        let damage = item.base_damage.unwrap();
        assert!((damage.min - 11.0).abs() < f64::EPSILON);
        assert!((damage.max - 22.0).abs() < f64::EPSILON);
        assert_eq!(materials.rare_crystal, 1);
        assert_eq!(materials.uncommon_essence, 0);
    }

    #[test]
    fn test_enhance_refused_without_materials() {
        let base = BaseItem::new("helm", "头盔", ItemKind::Head).with_armor(4.0);
        let mut item = ItemBuilder::new(&base).build();
        let mut materials = Materials::default().with(Material::CommonDust, 1);

        assert_eq!(enhance(&mut item, &mut materials), Err(CraftError::InsufficientMaterials));
        assert_eq!(item.enhance_level, 0);
        assert_eq!(materials.common_dust, 1);

        materials.common_dust = 2;
        enhance(&mut item, &mut materials).unwrap();
        assert!((item.base_armor.unwrap() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_regenerate_durability() {
        let mut item = sword(100, Vec::new());
        item.durability = 50.0;
        regenerate_durability(&mut item, 30.0);
        assert!((item.durability - 53.0).abs() < 1e-9);
        regenerate_durability(&mut item, 10_000.0);
        assert!((item.durability - 100.0).abs() < f64::EPSILON);
    }
}
