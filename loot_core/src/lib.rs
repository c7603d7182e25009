//! loot_core - Catalogs, items and loot generation
//!
//! This library provides:
//! - Rarity/affix/item/enemy catalogs loaded from TOML or JSON
//! - Item: base template + ordered affixes with a derived display name
//! - LootGenerator: gold, rarity, base item and affix rolls for a kill
//! - Encounter selection and enemy stat scaling
//! - Crafting: imprint, enchant, inscription combine, disassemble, enhance

pub mod affix;
pub mod config;
pub mod crafting;
pub mod enemy;
pub mod generator;
pub mod item;
pub mod naming;
pub mod types;

pub use affix::{Affix, AffixEffect, AppliedAffix};
pub use config::{ConfigError, LootConfig};
pub use crafting::{CraftError, EnchantOutcome, Inscription, Material, Materials};
pub use enemy::{generate_encounter, Enemy};
pub use generator::{make_rng, Loot, LootGenerator};
pub use item::{BaseItem, DamageRange, Item, ItemBuilder, MAX_AFFIXES};
pub use naming::compose_name;
pub use types::{
    AffixKind, Attribute, Attributes, DamageType, EnemyType, EquipmentSlot, ItemKind, ModKind,
    Rarity, Resistances, SlotCategory, StatType,
};
