//! Combat - Attack resolution, status effects and the battle loop

mod battle;
mod resolution;
mod result;
mod status;

pub use battle::{Battle, BattleOutcome, CombatEvent, PlayerAction, Side};
pub use resolution::{mitigate_damage, resolve_attack, resolve_attack_with};
pub use result::AttackResult;
pub use status::{ActiveStatuses, StatusEffect, StatusKind, StatusRule, StatusTick};
