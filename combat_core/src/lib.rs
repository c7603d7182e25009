//! combat_core - Derived stats, combat and session state for the sandbox
//!
//! This library provides:
//! - CombatStats: derived stats rebuilt from attributes and equipment
//! - Attack resolution: hit, dodge, crit, resistance and defense mitigation
//! - Battle: turn loop with status effects and an ordered event queue
//! - Character progression, save snapshots and the GameSession context

pub mod character;
pub mod combat;
pub mod config;
pub mod defense;
pub mod save;
pub mod session;
pub mod source;
pub mod stat_block;

// Re-export core types for convenience
pub use character::Character;
pub use combat::{
    mitigate_damage, resolve_attack, resolve_attack_with, AttackResult, Battle, BattleOutcome,
    CombatEvent, PlayerAction, Side, StatusEffect, StatusKind,
};
pub use config::{default_classes, default_constants, ClassCatalog, ClassDef, GameConstants};
pub use save::{decode_snapshot, encode_snapshot, SaveError, SaveSnapshot};
pub use session::{GameSession, ItemRef, SessionError};
pub use source::{BaseStatsSource, GearSource, StatSource};
pub use stat_block::{recompute_stats, recompute_stats_with, CombatStats, StatAccumulator};

// Re-export loot_core types for convenience
pub use loot_core::types::{Attribute, Attributes, DamageType, EquipmentSlot, Rarity};
pub use loot_core::{Item, Loot};
