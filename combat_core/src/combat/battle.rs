//! Battle - Turn loop between a character and one enemy
//!
//! Each exchange is a player turn followed by an enemy turn. Everything that
//! happens is pushed onto an ordered event queue; callers drain it to
//! present the fight at whatever pace they like.

use super::resolution::resolve_attack_with;
use super::result::AttackResult;
use super::status::{ActiveStatuses, StatusEffect, StatusKind};
use crate::character::Character;
use crate::config::GameConstants;
use crate::stat_block::CombatStats;
use loot_core::Enemy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What the player does this exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack,
    /// Stronger attack paid for with mana
    Skill,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// One step of a battle, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    BattleStarted {
        enemy: String,
        enemy_health: f64,
    },
    Attack {
        attacker: Side,
        skill: bool,
        result: AttackResult,
        /// Target health after the attack
        target_health: f64,
    },
    SkillRefused {
        mana: f64,
        cost: f64,
    },
    StatusApplied {
        target: Side,
        effect: StatusEffect,
    },
    StatusTick {
        target: Side,
        kind: StatusKind,
        damage: u32,
        remaining_health: f64,
    },
    TurnSkipped {
        side: Side,
        cause: StatusKind,
    },
    StatusExpired {
        target: Side,
        kind: StatusKind,
    },
    Fled,
    Victory {
        enemy: String,
        experience: u32,
    },
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Ongoing,
    Victory,
    Defeat,
    Fled,
}

impl BattleOutcome {
    pub fn is_over(&self) -> bool {
        *self != BattleOutcome::Ongoing
    }
}

/// A fight against one enemy instance
#[derive(Debug, Clone)]
pub struct Battle {
    enemy: Enemy,
    enemy_stats: CombatStats,
    enemy_health: f64,
    enemy_statuses: ActiveStatuses,
    player_statuses: ActiveStatuses,
    exchanges: u32,
    outcome: BattleOutcome,
    events: VecDeque<CombatEvent>,
}

impl Battle {
    pub fn new(enemy: Enemy, constants: &GameConstants) -> Self {
        let enemy_stats = CombatStats::for_enemy(&enemy, constants);
        let enemy_health = enemy_stats.max_health;
        let mut events = VecDeque::new();
        events.push_back(CombatEvent::BattleStarted {
            enemy: enemy.name.clone(),
            enemy_health,
        });
        tracing::info!(enemy = %enemy.name, level = enemy.level, health = enemy_health, "battle started");

        Battle {
            enemy,
            enemy_stats,
            enemy_health,
            enemy_statuses: ActiveStatuses::new(),
            player_statuses: ActiveStatuses::new(),
            exchanges: 0,
            outcome: BattleOutcome::Ongoing,
            events,
        }
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn enemy_stats(&self) -> &CombatStats {
        &self.enemy_stats
    }

    pub fn enemy_health(&self) -> f64 {
        self.enemy_health
    }

    pub fn enemy_statuses(&self) -> &ActiveStatuses {
        &self.enemy_statuses
    }

    pub fn player_statuses(&self) -> &ActiveStatuses {
        &self.player_statuses
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    /// Events not yet drained
    pub fn events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain(..).collect()
    }

    /// Play one exchange: the player's action, then the enemy's reply
    ///
    /// A refused skill does not use up the exchange. Fleeing ends the
    /// battle before anyone acts.
    pub fn exchange(
        &mut self,
        player: &mut Character,
        action: PlayerAction,
        constants: &GameConstants,
        rng: &mut impl Rng,
    ) -> BattleOutcome {
        if self.outcome.is_over() {
            return self.outcome;
        }

        match action {
            PlayerAction::Flee => {
                tracing::info!(enemy = %self.enemy.name, "player fled");
                return self.finish(BattleOutcome::Fled);
            }
            PlayerAction::Skill if player.mana < constants.battle.skill_mana_cost => {
                self.events.push_back(CombatEvent::SkillRefused {
                    mana: player.mana,
                    cost: constants.battle.skill_mana_cost,
                });
                return self.outcome;
            }
            _ => {}
        }

        self.exchanges += 1;
        if self.exchanges > constants.battle.max_exchanges {
            tracing::warn!(
                enemy = %self.enemy.name,
                exchanges = self.exchanges,
                "battle exceeded the exchange limit, abandoning"
            );
            return self.finish(BattleOutcome::Fled);
        }

        self.player_turn(player, action, constants, rng);
        if self.outcome.is_over() {
            return self.outcome;
        }
        self.enemy_turn(player, constants, rng);
        self.outcome
    }

    /// Attack every exchange until the battle ends
    pub fn run(
        &mut self,
        player: &mut Character,
        constants: &GameConstants,
        rng: &mut impl Rng,
    ) -> BattleOutcome {
        while !self.outcome.is_over() {
            self.exchange(player, PlayerAction::Attack, constants, rng);
        }
        self.outcome
    }

    fn player_turn(
        &mut self,
        player: &mut Character,
        action: PlayerAction,
        constants: &GameConstants,
        rng: &mut impl Rng,
    ) {
        let tick = self.player_statuses.tick();
        for (kind, damage) in &tick.damage {
            player.take_damage(*damage as f64);
            self.events.push_back(CombatEvent::StatusTick {
                target: Side::Player,
                kind: *kind,
                damage: *damage,
                remaining_health: player.current_health,
            });
        }
        for kind in tick.expired {
            self.events.push_back(CombatEvent::StatusExpired {
                target: Side::Player,
                kind,
            });
        }
        if !player.is_alive() {
            self.finish(BattleOutcome::Defeat);
            return;
        }
        if let Some(cause) = tick.skipped_by {
            self.events.push_back(CombatEvent::TurnSkipped {
                side: Side::Player,
                cause,
            });
            return;
        }

        let skill = action == PlayerAction::Skill && player.spend_mana(constants.battle.skill_mana_cost);
        let stats = *player.stats();
        let multiplier = if skill { constants.battle.skill_multiplier } else { 1.0 };
        let base_damage = stats.attack * multiplier;
        let damage_type = player.attack_damage_type();

        let result = resolve_attack_with(constants, &stats, &self.enemy_stats, base_damage, damage_type, rng);
        self.enemy_health = (self.enemy_health - result.damage as f64).max(0.0);
        let effects = result.status_effects.clone();
        self.events.push_back(CombatEvent::Attack {
            attacker: Side::Player,
            skill,
            result,
            target_health: self.enemy_health,
        });
        for effect in effects {
            self.enemy_statuses.apply(effect.clone());
            self.events.push_back(CombatEvent::StatusApplied {
                target: Side::Enemy,
                effect,
            });
        }

        if self.enemy_health <= 0.0 {
            self.finish(BattleOutcome::Victory);
        }
    }

    fn enemy_turn(&mut self, player: &mut Character, constants: &GameConstants, rng: &mut impl Rng) {
        let tick = self.enemy_statuses.tick();
        for (kind, damage) in &tick.damage {
            self.enemy_health = (self.enemy_health - *damage as f64).max(0.0);
            self.events.push_back(CombatEvent::StatusTick {
                target: Side::Enemy,
                kind: *kind,
                damage: *damage,
                remaining_health: self.enemy_health,
            });
        }
        for kind in tick.expired {
            self.events.push_back(CombatEvent::StatusExpired {
                target: Side::Enemy,
                kind,
            });
        }
        if self.enemy_health <= 0.0 {
            self.finish(BattleOutcome::Victory);
            return;
        }
        if let Some(cause) = tick.skipped_by {
            self.events.push_back(CombatEvent::TurnSkipped {
                side: Side::Enemy,
                cause,
            });
            return;
        }

        let base_damage = roll_enemy_damage(&self.enemy, rng);
        let damage_type = self.enemy.damage.damage_type;
        let result = resolve_attack_with(
            constants,
            &self.enemy_stats,
            player.stats(),
            base_damage,
            damage_type,
            rng,
        );
        player.take_damage(result.damage as f64);
        let effects = result.status_effects.clone();
        self.events.push_back(CombatEvent::Attack {
            attacker: Side::Enemy,
            skill: false,
            result,
            target_health: player.current_health,
        });
        for effect in effects {
            self.player_statuses.apply(effect.clone());
            self.events.push_back(CombatEvent::StatusApplied {
                target: Side::Player,
                effect,
            });
        }

        if !player.is_alive() {
            self.finish(BattleOutcome::Defeat);
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) -> BattleOutcome {
        self.outcome = outcome;
        let event = match outcome {
            BattleOutcome::Victory => {
                tracing::info!(enemy = %self.enemy.name, exchanges = self.exchanges, "enemy defeated");
                CombatEvent::Victory {
                    enemy: self.enemy.name.clone(),
                    experience: self.enemy.experience,
                }
            }
            BattleOutcome::Defeat => {
                tracing::info!(enemy = %self.enemy.name, exchanges = self.exchanges, "player defeated");
                CombatEvent::Defeat
            }
            BattleOutcome::Fled => CombatEvent::Fled,
            BattleOutcome::Ongoing => return outcome,
        };
        self.events.push_back(event);
        outcome
    }
}

/// Uniform roll in the enemy's damage range
fn roll_enemy_damage(enemy: &Enemy, rng: &mut impl Rng) -> f64 {
    let range = enemy.damage.range();
    if !range.min.is_finite() || !range.max.is_finite() {
        tracing::warn!(enemy = %enemy.id, "enemy damage range is not finite, using 0");
        return 0.0;
    }
    let (low, high) = if range.min <= range.max {
        (range.min, range.max)
    } else {
        (range.max, range.min)
    };
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_classes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn warrior() -> Character {
        let classes = default_classes();
        Character::new("测试者", classes.find("warrior").unwrap().clone())
    }

    fn dummy(health: f64) -> Enemy {
        let mut enemy = Enemy::new("dummy", "木人", 1);
        enemy.health = health;
        enemy.damage.min = 1.0;
        enemy.damage.max = 2.0;
        enemy.experience = 15;
        enemy
    }

    #[test]
    fn test_battle_starts_with_event() {
        let constants = GameConstants::default();
        let mut battle = Battle::new(dummy(30.0), &constants);
        let events = battle.drain_events();
        assert!(matches!(events[0], CombatEvent::BattleStarted { .. }));
        assert!(battle.drain_events().is_empty());
    }

    #[test]
    fn test_flee_ends_battle() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = warrior();
        let mut battle = Battle::new(dummy(30.0), &constants);

        let outcome = battle.exchange(&mut player, PlayerAction::Flee, &constants, &mut rng);
        assert_eq!(outcome, BattleOutcome::Fled);
        assert_eq!(battle.exchanges(), 0);
        assert!(battle.events().any(|e| matches!(e, CombatEvent::Fled)));

        // Further actions do nothing
        let again = battle.exchange(&mut player, PlayerAction::Attack, &constants, &mut rng);
        assert_eq!(again, BattleOutcome::Fled);
    }

    #[test]
    fn test_skill_refused_without_mana() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = warrior();
        player.mana = 5.0;
        let mut battle = Battle::new(dummy(30.0), &constants);
        battle.drain_events();

        let outcome = battle.exchange(&mut player, PlayerAction::Skill, &constants, &mut rng);
        assert_eq!(outcome, BattleOutcome::Ongoing);
        assert_eq!(battle.exchanges(), 0);
        assert!((player.mana - 5.0).abs() < f64::EPSILON);
        let events = battle.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], CombatEvent::SkillRefused { .. }));
    }

    #[test]
    fn test_skill_spends_mana() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = warrior();
        let mana_before = player.mana;
        let mut battle = Battle::new(dummy(10_000.0), &constants);

        battle.exchange(&mut player, PlayerAction::Skill, &constants, &mut rng);
        assert!((player.mana - (mana_before - 10.0)).abs() < f64::EPSILON);
        assert!(battle.events().any(|e| matches!(
            e,
            CombatEvent::Attack {
                attacker: Side::Player,
                skill: true,
                ..
            }
        )));
    }

    #[test]
    fn test_run_to_victory() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = warrior();
        let mut battle = Battle::new(dummy(30.0), &constants);

        let outcome = battle.run(&mut player, &constants, &mut rng);
        assert_eq!(outcome, BattleOutcome::Victory);
        assert!(battle.enemy_health() <= 0.0);

        let events = battle.drain_events();
        match events.last() {
            Some(CombatEvent::Victory { experience, .. }) => assert_eq!(*experience, 15),
            other => panic!("expected victory, got {other:?}"),
        }
    }

    #[test]
    fn test_defeat() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = warrior();
        player.current_health = 1.0;

        let mut brute = dummy(1_000_000.0);
        brute.damage.min = 500.0;
        brute.damage.max = 500.0;
        brute.attributes.precision = 40.0;
        let mut battle = Battle::new(brute, &constants);

        let outcome = battle.run(&mut player, &constants, &mut rng);
        assert_eq!(outcome, BattleOutcome::Defeat);
        assert!(!player.is_alive());
        assert!(matches!(battle.drain_events().last(), Some(CombatEvent::Defeat)));
    }

    #[test]
    fn test_exchange_limit() {
        let mut constants = GameConstants::default();
        constants.battle.max_exchanges = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = warrior();
        let mut wall = dummy(1_000_000.0);
        wall.damage.min = 0.0;
        wall.damage.max = 0.0;
        let mut battle = Battle::new(wall, &constants);

        let outcome = battle.run(&mut player, &constants, &mut rng);
        assert_eq!(outcome, BattleOutcome::Fled);
        assert_eq!(battle.exchanges(), 4);
    }

    #[test]
    fn test_frozen_enemy_skips_turn() {
        let constants = GameConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = warrior();
        let health_before = player.current_health;
        let mut battle = Battle::new(dummy(1_000_000.0), &constants);
        battle.enemy_statuses.apply(StatusEffect {
            kind: StatusKind::Freeze,
            duration: 1,
            magnitude: 0,
            description: "冰冻".to_string(),
        });
        battle.drain_events();

        battle.exchange(&mut player, PlayerAction::Attack, &constants, &mut rng);
        let events = battle.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::TurnSkipped {
                side: Side::Enemy,
                cause: StatusKind::Freeze
            }
        )));
        assert!(!events.iter().any(|e| matches!(
            e,
            CombatEvent::Attack {
                attacker: Side::Enemy,
                ..
            }
        )));
        assert!((player.current_health - health_before).abs() < f64::EPSILON);
    }
}
