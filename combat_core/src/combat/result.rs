//! AttackResult - Outcome of a single attack

use super::status::StatusEffect;
use loot_core::types::DamageType;
use serde::{Deserialize, Serialize};

/// Result of resolving one attack against a defender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Final damage dealt (0 on a miss or dodge)
    pub damage: u32,
    pub damage_type: DamageType,

    // === Rolls ===
    pub is_hit: bool,
    pub is_dodged: bool,
    pub is_crit: bool,
    /// 1.0 unless the attack crit
    pub crit_multiplier: f64,
    /// Defender dodge rate after clamping
    pub effective_dodge_rate: f64,

    /// Statuses the hit inflicted
    pub status_effects: Vec<StatusEffect>,
}

impl AttackResult {
    pub(crate) fn new(damage_type: DamageType) -> Self {
        AttackResult {
            damage: 0,
            damage_type,
            is_hit: false,
            is_dodged: false,
            is_crit: false,
            crit_multiplier: 1.0,
            effective_dodge_rate: 0.0,
            status_effects: Vec::new(),
        }
    }

    /// Whether the attack dealt damage
    pub fn landed(&self) -> bool {
        self.is_hit && !self.is_dodged
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        if !self.is_hit {
            return "Missed".to_string();
        }
        if self.is_dodged {
            return format!("Dodged ({:.0}% dodge)", self.effective_dodge_rate);
        }

        let mut parts = vec![format!("{} {:?} damage", self.damage, self.damage_type)];
        if self.is_crit {
            parts.push(format!("CRIT x{:.2}", self.crit_multiplier));
        }
        for effect in &self.status_effects {
            parts.push(format!("{} ({} turns)", effect.description, effect.duration));
        }
        parts.join(", ")
    }
}
