//! StatAccumulator - Collects stat contributions before producing CombatStats

use super::CombatStats;
use crate::character::Character;
use crate::config::{default_constants, GameConstants};
use crate::defense::effective_defense;
use crate::source::{BaseStatsSource, GearSource, StatSource};
use loot_core::affix::AffixEffect;
use loot_core::types::{Attributes, DamageType, ModKind, Resistances, StatType};

/// Running totals while sources are applied
///
/// Percentage effects read the running subtotal of their stat at the moment
/// they are applied, so source and affix order matters.
#[derive(Debug, Clone, Default)]
pub struct StatAccumulator {
    /// Final attributes, fixed before any source's `apply` runs
    pub attributes: Attributes,

    pub attack: f64,
    /// Raw defense before the curve
    pub defense: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub dodge_rate: f64,
    pub hit_rate: f64,
    pub penetration_rate: f64,
    pub resistances: Resistances,
    pub max_health: f64,
}

fn apply_mod(target: &mut f64, kind: ModKind, value: f64) {
    match kind {
        ModKind::Flat => *target += value,
        ModKind::Percentage => *target += *target * value / 100.0,
    }
}

impl StatAccumulator {
    pub fn new(attributes: Attributes) -> Self {
        StatAccumulator {
            attributes,
            ..Default::default()
        }
    }

    fn stat_mut(&mut self, stat: StatType) -> Option<&mut f64> {
        if let Some(damage_type) = stat.resistance() {
            return Some(self.resistances.get_mut(damage_type));
        }
        match stat {
            StatType::Damage => Some(&mut self.attack),
            StatType::Defense => Some(&mut self.defense),
            StatType::CritChance => Some(&mut self.crit_chance),
            StatType::CritDamage => Some(&mut self.crit_damage),
            StatType::DodgeRate => Some(&mut self.dodge_rate),
            StatType::HitRate => Some(&mut self.hit_rate),
            StatType::Penetration => Some(&mut self.penetration_rate),
            StatType::Health => Some(&mut self.max_health),
            _ => None,
        }
    }

    /// Apply one affix effect to the combat totals
    ///
    /// Attribute effects are skipped here; they are folded into the
    /// attributes before base stats are derived.
    pub fn apply_effect(&mut self, effect: &AffixEffect) {
        if effect.stat.attribute().is_some() {
            return;
        }
        if effect.stat == StatType::AllResistances {
            for damage_type in DamageType::all() {
                apply_mod(self.resistances.get_mut(*damage_type), effect.kind, effect.value);
            }
            return;
        }
        if let Some(target) = self.stat_mut(effect.stat) {
            apply_mod(target, effect.kind, effect.value);
        }
    }

    /// Produce the final block: defense curve, then caps
    pub fn finish(self, constants: &GameConstants) -> CombatStats {
        let raw_defense = if self.defense.is_nan() { 0.0 } else { self.defense.max(0.0) };
        CombatStats {
            attack: self.attack,
            defense: effective_defense(raw_defense, constants.defense.scale),
            crit_chance: self.crit_chance,
            crit_damage: self.crit_damage,
            dodge_rate: self.dodge_rate,
            hit_rate: self.hit_rate,
            penetration_rate: self.penetration_rate,
            resistances: self.resistances,
            max_health: self.max_health,
        }
        .clamped(&constants.caps)
    }
}

/// Apply an attribute effect to an attribute set
pub(crate) fn apply_attribute_effect(attributes: &mut Attributes, effect: &AffixEffect) {
    if let Some(attribute) = effect.stat.attribute() {
        apply_mod(attributes.get_mut(attribute), effect.kind, effect.value);
    }
}

/// Run sources over `attributes` and produce a stat block
///
/// Sources are applied in priority order (stable, so equal priorities keep
/// their given order): first all attribute contributions, then all
/// combat-stat contributions against the finished attributes.
pub fn aggregate(
    sources: &[&dyn StatSource],
    attributes: Attributes,
    constants: &GameConstants,
) -> CombatStats {
    let mut sorted: Vec<&dyn StatSource> = sources.to_vec();
    sorted.sort_by_key(|s| s.priority());

    let mut final_attributes = attributes;
    for source in &sorted {
        source.apply_attributes(&mut final_attributes);
    }

    let mut accumulator = StatAccumulator::new(final_attributes);
    for source in &sorted {
        source.apply(&mut accumulator);
    }
    accumulator.finish(constants)
}

/// Recompute a character's stats with the bundled constants
pub fn recompute_stats(character: &Character) -> CombatStats {
    recompute_stats_with(character, default_constants())
}

/// Recompute a character's stats from class, level, allocated points and
/// equipment. Equipment contributes in slot order.
pub fn recompute_stats_with(character: &Character, constants: &GameConstants) -> CombatStats {
    let base = BaseStatsSource::new(constants.base.clone());
    let gear: Vec<GearSource<'_>> = character
        .equipment
        .iter()
        .map(|(slot, item)| GearSource::new(*slot, item))
        .collect();

    let mut sources: Vec<&dyn StatSource> = Vec::with_capacity(gear.len() + 1);
    sources.push(&base);
    for source in &gear {
        sources.push(source);
    }

    let stats = aggregate(&sources, character.attributes(), constants);
    tracing::debug!(
        character = %character.name,
        attack = stats.attack,
        defense = stats.defense,
        max_health = stats.max_health,
        "recomputed stats"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_then_percentage_uses_subtotal() {
        let mut acc = StatAccumulator::new(Attributes::default());
        acc.attack = 10.0;
        acc.apply_effect(&AffixEffect::flat(StatType::Damage, 10.0));
        acc.apply_effect(&AffixEffect::percentage(StatType::Damage, 50.0));
        assert!((acc.attack - 30.0).abs() < f64::EPSILON);

        // Reversed order gives a different total
        let mut acc = StatAccumulator::new(Attributes::default());
        acc.attack = 10.0;
        acc.apply_effect(&AffixEffect::percentage(StatType::Damage, 50.0));
        acc.apply_effect(&AffixEffect::flat(StatType::Damage, 10.0));
        assert!((acc.attack - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_resistances() {
        let mut acc = StatAccumulator::new(Attributes::default());
        acc.apply_effect(&AffixEffect::flat(StatType::AllResistances, 10.0));
        for damage_type in DamageType::all() {
            assert!((acc.resistances.get(*damage_type) - 10.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_attribute_effects_skipped_in_stat_pass() {
        let mut acc = StatAccumulator::new(Attributes::default());
        acc.apply_effect(&AffixEffect::flat(StatType::Strength, 5.0));
        assert!(acc.attack.abs() < f64::EPSILON);
        assert!((acc.attributes.strength - 10.0).abs() < f64::EPSILON);

        let mut attributes = Attributes::default();
        apply_attribute_effect(&mut attributes, &AffixEffect::flat(StatType::Strength, 5.0));
        assert!((attributes.strength - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_finish_applies_curve_and_caps() {
        let mut acc = StatAccumulator::new(Attributes::default());
        acc.defense = 1000.0;
        acc.dodge_rate = 90.0;
        let stats = acc.finish(&GameConstants::default());
        assert!((stats.defense - 500.0).abs() < f64::EPSILON);
        assert!((stats.dodge_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggregate_base_only() {
        let constants = GameConstants::default();
        let base = BaseStatsSource::new(constants.base.clone());
        let stats = aggregate(&[&base], Attributes::default(), &constants);
        assert!(stats.attack.abs() < f64::EPSILON);
        assert!((stats.crit_damage - 150.0).abs() < f64::EPSILON);
        assert!((stats.max_health - 100.0).abs() < f64::EPSILON);
    }
}
