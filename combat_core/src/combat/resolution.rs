//! Attack resolution - Hit, dodge, crit, mitigation and status rolls

use super::result::AttackResult;
use crate::config::{default_constants, GameConstants};
use crate::defense::constants::MIN_DAMAGE;
use crate::defense::{apply_resistance, defense_reduction};
use crate::stat_block::CombatStats;
use loot_core::types::DamageType;
use rand::Rng;

/// Resolve one attack with the bundled constants
///
/// Steps, in order:
/// 1. Hit check against the attacker's hit rate
/// 2. Dodge check against the defender's (capped) dodge rate
/// 3. Crit check
/// 4. Resistance and defense mitigation
/// 5. Status-effect roll for the damage type
pub fn resolve_attack(
    attacker: &CombatStats,
    defender: &CombatStats,
    base_damage: f64,
    damage_type: DamageType,
    rng: &mut impl Rng,
) -> AttackResult {
    resolve_attack_with(default_constants(), attacker, defender, base_damage, damage_type, rng)
}

/// Resolve one attack with explicit constants
pub fn resolve_attack_with(
    constants: &GameConstants,
    attacker: &CombatStats,
    defender: &CombatStats,
    base_damage: f64,
    damage_type: DamageType,
    rng: &mut impl Rng,
) -> AttackResult {
    let attacker = attacker.clamped(&constants.caps);
    let defender = defender.clamped(&constants.caps);

    let mut result = AttackResult::new(damage_type);
    result.effective_dodge_rate = defender.dodge_rate;

    // Step 1: hit
    let hit_roll: f64 = rng.gen_range(0.0..100.0);
    if attacker.hit_rate <= 0.0 || hit_roll > attacker.hit_rate {
        tracing::debug!(hit_roll, hit_rate = attacker.hit_rate, "attack missed");
        return result;
    }
    result.is_hit = true;

    // Step 2: dodge
    let dodge_roll: f64 = rng.gen_range(0.0..100.0);
    if defender.dodge_rate > 0.0 && dodge_roll <= defender.dodge_rate {
        tracing::debug!(dodge_roll, dodge_rate = defender.dodge_rate, "attack dodged");
        result.is_dodged = true;
        return result;
    }

    // Step 3: crit
    let crit_roll: f64 = rng.gen_range(0.0..100.0);
    if attacker.crit_chance > 0.0 && crit_roll <= attacker.crit_chance {
        result.is_crit = true;
        result.crit_multiplier = attacker.crit_damage / 100.0;
    }

    // Steps 4-6: mitigation
    let resistance = defender.resistance(damage_type).min(constants.caps.resistance);
    result.damage = mitigate_damage(
        base_damage,
        result.crit_multiplier,
        resistance,
        defender.defense,
        attacker.penetration_rate,
        damage_type,
    );

    // Step 7: status effects only ride on landed hits
    if let Some(rule) = constants.status_rule(damage_type) {
        if let Some(effect) = rule.roll(result.damage, rng) {
            tracing::debug!(status = ?effect.kind, duration = effect.duration, "status inflicted");
            result.status_effects.push(effect);
        }
    }

    tracing::debug!(
        damage = result.damage,
        damage_type = ?damage_type,
        crit = result.is_crit,
        "attack resolved"
    );
    result
}

/// Damage left after resistance, crit and defense
///
/// `max(1, base × (1 − resistance/100) × crit − defenseReduction)`, truncated.
/// Resistance is capped at 75%; non-physical damage meets half the
/// defense after penetration.
pub fn mitigate_damage(
    base_damage: f64,
    crit_multiplier: f64,
    resistance: f64,
    defense: f64,
    penetration_rate: f64,
    damage_type: DamageType,
) -> u32 {
    let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };

    let after_resistance = apply_resistance(finite_or_zero(base_damage), resistance);
    let crit = finite_or_zero(crit_multiplier).max(0.0);
    let reduction = defense_reduction(
        finite_or_zero(defense),
        finite_or_zero(penetration_rate),
        damage_type,
    );

    let damage = (after_resistance * crit - reduction).max(MIN_DAMAGE);
    damage.floor() as u32
}
