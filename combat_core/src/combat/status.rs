//! Status effects - Elemental on-hit effects and their per-turn ticking

use loot_core::types::DamageType;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of timed status a hit can leave behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Burn,
    Freeze,
    Poison,
    Electrify,
    Paralysis,
}

impl StatusKind {
    /// Whether the affected side loses its turn while this is active
    pub fn skips_turn(&self) -> bool {
        matches!(self, StatusKind::Freeze | StatusKind::Paralysis)
    }

    /// Whether this deals damage each turn
    pub fn deals_damage(&self) -> bool {
        matches!(
            self,
            StatusKind::Burn | StatusKind::Poison | StatusKind::Electrify
        )
    }
}

/// Chance table entry: which status a damage type may inflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRule {
    pub damage_type: DamageType,
    pub kind: StatusKind,
    /// Percent chance per landed hit
    pub chance: f64,
    /// Turns the status lasts
    pub duration: u32,
    /// Damage per turn as a share of the triggering hit
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub description: String,
}

impl StatusRule {
    pub fn new(
        damage_type: DamageType,
        kind: StatusKind,
        chance: f64,
        duration: u32,
        magnitude: f64,
        description: &str,
    ) -> Self {
        StatusRule {
            damage_type,
            kind,
            chance,
            duration,
            magnitude,
            description: description.to_string(),
        }
    }

    /// Build the effect this rule leaves after a hit of `final_damage`
    pub fn effect_for(&self, final_damage: u32) -> StatusEffect {
        let magnitude = if self.kind.deals_damage() {
            ((final_damage as f64 * self.magnitude).round() as u32).max(1)
        } else {
            0
        };
        StatusEffect {
            kind: self.kind,
            duration: self.duration.max(1),
            magnitude,
            description: self.description.clone(),
        }
    }

    /// Roll the rule's chance; `None` when it does not trigger
    pub fn roll(&self, final_damage: u32, rng: &mut impl Rng) -> Option<StatusEffect> {
        let chance = if self.chance.is_nan() {
            0.0
        } else {
            self.chance.clamp(0.0, 100.0)
        };
        if chance <= 0.0 {
            return None;
        }
        let draw: f64 = rng.gen_range(0.0..100.0);
        if draw < chance {
            Some(self.effect_for(final_damage))
        } else {
            None
        }
    }
}

/// A status applied to a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Remaining turns
    pub duration: u32,
    /// Damage dealt per tick (0 for turn-skipping kinds)
    pub magnitude: u32,
    pub description: String,
}

/// What one start-of-turn tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Damage per ticking status, in application order
    pub damage: Vec<(StatusKind, u32)>,
    /// Status that took the turn away, if any
    pub skipped_by: Option<StatusKind>,
    pub expired: Vec<StatusKind>,
}

impl StatusTick {
    pub fn total_damage(&self) -> u32 {
        self.damage.iter().map(|(_, d)| d).sum()
    }
}

/// Statuses currently active on one combatant
///
/// Reapplying a kind that is already active refreshes it to the longer
/// duration and the stronger magnitude instead of stacking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatuses {
    effects: Vec<StatusEffect>,
}

impl ActiveStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn apply(&mut self, effect: StatusEffect) {
        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => {
                existing.duration = existing.duration.max(effect.duration);
                existing.magnitude = existing.magnitude.max(effect.magnitude);
            }
            None => self.effects.push(effect),
        }
    }

    /// Start-of-turn tick: collect damage, check for a skipped turn,
    /// then count every status down by one turn.
    pub fn tick(&mut self) -> StatusTick {
        let mut tick = StatusTick::default();

        for effect in &self.effects {
            if effect.kind.deals_damage() && effect.magnitude > 0 {
                tick.damage.push((effect.kind, effect.magnitude));
            }
            if tick.skipped_by.is_none() && effect.kind.skips_turn() {
                tick.skipped_by = Some(effect.kind);
            }
        }

        for effect in &mut self.effects {
            effect.duration = effect.duration.saturating_sub(1);
        }
        tick.expired = self
            .effects
            .iter()
            .filter(|e| e.duration == 0)
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| e.duration > 0);

        tick
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
