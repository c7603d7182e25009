//! GameSession - Owns the character, encounter and battle state
//!
//! Catalogs and constants are shared read-only; everything a play session
//! mutates lives here and is changed only through these methods.

use crate::character::Character;
use crate::combat::{Battle, BattleOutcome, CombatEvent, PlayerAction};
use crate::config::{default_classes, default_constants, ClassCatalog, GameConstants};
use crate::save::{decode_snapshot, encode_snapshot, SaveError};
use loot_core::config::default_loot_config;
use loot_core::crafting::{self, CraftError, EnchantOutcome, Inscription, Materials};
use loot_core::enemy::{effective_level, generate_encounter};
use loot_core::types::{Attribute, EquipmentSlot};
use loot_core::{Enemy, Item, Loot, LootConfig, LootGenerator};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    #[error("No enemy templates are loaded")]
    NoEnemies,
    #[error("No encounter is active")]
    NoEncounter,
    #[error("Enemy index {0} is out of range")]
    EnemyIndexOutOfRange(usize),
    #[error("Item index {0} is out of range")]
    ItemIndexOutOfRange(usize),
    #[error("Nothing is equipped in slot {0:?}")]
    EmptySlot(EquipmentSlot),
    #[error("Inscription index {0} is out of range")]
    InscriptionIndexOutOfRange(usize),
    #[error("No battle is in progress")]
    NoBattle,
    #[error("A battle is already in progress")]
    BattleInProgress,
    #[error("Not enough attribute points (have {available}, need {needed})")]
    NotEnoughPoints { needed: u32, available: u32 },
    #[error("The character has been defeated")]
    CharacterDefeated,
    #[error(transparent)]
    Craft(#[from] CraftError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Where an item for a crafting action lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Inventory(usize),
    Equipped(EquipmentSlot),
}

/// One player's play session
#[derive(Debug)]
pub struct GameSession {
    constants: Arc<GameConstants>,
    classes: Arc<ClassCatalog>,
    generator: LootGenerator,
    character: Character,
    encounter: Vec<Enemy>,
    battle: Option<Battle>,
    last_loot: Vec<Loot>,
}

impl GameSession {
    /// Start a session with a fresh character of `class_id`
    pub fn new(
        loot_config: Arc<LootConfig>,
        classes: Arc<ClassCatalog>,
        constants: Arc<GameConstants>,
        name: &str,
        class_id: &str,
    ) -> Result<Self, SessionError> {
        let class = classes
            .find(class_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownClass(class_id.to_string()))?;
        let character = Character::new_with(name, class, &constants);
        tracing::info!(character = %name, class = class_id, "session started");

        Ok(GameSession {
            constants,
            classes,
            generator: LootGenerator::new(loot_config),
            character,
            encounter: Vec::new(),
            battle: None,
            last_loot: Vec::new(),
        })
    }

    /// Session over the bundled catalogs and constants
    pub fn with_defaults(name: &str, class_id: &str) -> Result<Self, SessionError> {
        Self::new(
            Arc::new(default_loot_config()),
            Arc::new(default_classes()),
            Arc::new(default_constants().clone()),
            name,
            class_id,
        )
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    pub fn classes(&self) -> &ClassCatalog {
        &self.classes
    }

    pub fn loot_config(&self) -> &LootConfig {
        self.generator.config()
    }

    pub fn encounter(&self) -> &[Enemy] {
        &self.encounter
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    /// Loot from the most recent victory
    pub fn last_loot(&self) -> &[Loot] {
        &self.last_loot
    }

    fn in_battle(&self) -> bool {
        self.battle.as_ref().is_some_and(|b| !b.outcome().is_over())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.in_battle() {
            Err(SessionError::BattleInProgress)
        } else {
            Ok(())
        }
    }

    // === Encounters and battle ===

    /// Roll a new group of enemies matched to the character's level
    pub fn new_encounter(&mut self, rng: &mut impl Rng) -> Result<&[Enemy], SessionError> {
        self.ensure_idle()?;
        let level = effective_level(&self.character.attributes());
        let group = generate_encounter(&self.generator.config().enemies.enemies, level, rng);
        if group.is_empty() {
            return Err(SessionError::NoEnemies);
        }
        tracing::info!(level, enemies = group.len(), "new encounter");
        self.encounter = group;
        Ok(&self.encounter)
    }

    /// Take enemy `index` out of the encounter and start fighting it
    pub fn start_battle(&mut self, index: usize) -> Result<&Battle, SessionError> {
        self.ensure_idle()?;
        if !self.character.is_alive() {
            return Err(SessionError::CharacterDefeated);
        }
        if self.encounter.is_empty() {
            return Err(SessionError::NoEncounter);
        }
        if index >= self.encounter.len() {
            return Err(SessionError::EnemyIndexOutOfRange(index));
        }

        let enemy = self.encounter.remove(index);
        self.last_loot.clear();
        Ok(&*self.battle.insert(Battle::new(enemy, &self.constants)))
    }

    /// Play one exchange of the current battle
    pub fn act(&mut self, action: PlayerAction, rng: &mut impl Rng) -> Result<BattleOutcome, SessionError> {
        let battle = match self.battle.as_mut() {
            Some(battle) if !battle.outcome().is_over() => battle,
            _ => return Err(SessionError::NoBattle),
        };

        let outcome = battle.exchange(&mut self.character, action, &self.constants, rng);
        if outcome == BattleOutcome::Victory {
            self.claim_victory(rng);
        }
        Ok(outcome)
    }

    /// Start a battle with enemy `index` and attack until it ends
    pub fn fight(&mut self, index: usize, rng: &mut impl Rng) -> Result<BattleOutcome, SessionError> {
        self.start_battle(index)?;
        loop {
            let outcome = self.act(PlayerAction::Attack, rng)?;
            if outcome.is_over() {
                return Ok(outcome);
            }
        }
    }

    /// Pending battle events, oldest first
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.battle
            .as_mut()
            .map(|b| b.drain_events())
            .unwrap_or_default()
    }

    fn claim_victory(&mut self, rng: &mut impl Rng) {
        let Some(battle) = self.battle.as_ref() else {
            return;
        };
        let enemy = battle.enemy().clone();

        let levels = self.character.gain_experience(enemy.experience, &self.constants);
        let loot = self.generator.generate_loot(&enemy, rng);
        for drop in &loot {
            match drop {
                Loot::Gold(amount) => self.character.gold = self.character.gold.saturating_add(*amount),
                Loot::Item(item) => self.character.inventory.push(item.clone()),
            }
        }
        tracing::info!(
            enemy = %enemy.name,
            experience = enemy.experience,
            levels,
            drops = loot.len(),
            "victory rewards"
        );
        self.last_loot = loot;
    }

    // === Character management ===

    pub fn allocate(&mut self, attribute: Attribute, points: u32) -> Result<(), SessionError> {
        if !self.character.allocate(attribute, points, &self.constants) {
            return Err(SessionError::NotEnoughPoints {
                needed: points,
                available: self.character.unspent_points,
            });
        }
        Ok(())
    }

    /// Equip an inventory item; whatever it replaces goes back to the inventory
    pub fn equip(&mut self, inventory_index: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if inventory_index >= self.character.inventory.len() {
            return Err(SessionError::ItemIndexOutOfRange(inventory_index));
        }
        let item = self.character.inventory.remove(inventory_index);
        tracing::info!(item = %item.final_name(), slot = ?item.equipment_slot(), "equipped");
        if let Some(previous) = self.character.equip(item, &self.constants) {
            self.character.inventory.push(previous);
        }
        Ok(())
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let item = self
            .character
            .unequip(slot, &self.constants)
            .ok_or(SessionError::EmptySlot(slot))?;
        self.character.inventory.push(item);
        Ok(())
    }

    /// Full health and mana between battles
    pub fn rest(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.character.restore();
        Ok(())
    }

    /// Advance passive timers by `elapsed_secs`
    pub fn tick(&mut self, elapsed_secs: f64) {
        self.character.regenerate_durability(elapsed_secs);
    }

    // === Crafting ===

    fn item_mut(&mut self, item: ItemRef) -> Result<&mut Item, SessionError> {
        match item {
            ItemRef::Inventory(index) => self
                .character
                .inventory
                .get_mut(index)
                .ok_or(SessionError::ItemIndexOutOfRange(index)),
            ItemRef::Equipped(slot) => self
                .character
                .equipment
                .get_mut(&slot)
                .ok_or(SessionError::EmptySlot(slot)),
        }
    }

    fn after_item_change(&mut self, item: ItemRef) {
        if matches!(item, ItemRef::Equipped(_)) {
            self.character.recompute_with(&self.constants);
        }
    }

    /// Copy affix `affix_index` of an item into a new inscription
    pub fn imprint(&mut self, item: ItemRef, affix_index: usize) -> Result<&Inscription, SessionError> {
        self.ensure_idle()?;
        let id = self.character.next_inscription_id;
        let inscription = crafting::imprint(self.item_mut(item)?, affix_index, id)?;
        self.character.next_inscription_id();
        self.character.inscriptions.push(inscription);
        let index = self.character.inscriptions.len() - 1;
        Ok(&self.character.inscriptions[index])
    }

    /// Try to add inscription `inscription_index` to an item. The
    /// inscription is used up only on success.
    pub fn enchant(
        &mut self,
        item: ItemRef,
        inscription_index: usize,
        rng: &mut impl Rng,
    ) -> Result<EnchantOutcome, SessionError> {
        self.ensure_idle()?;
        let inscription = self
            .character
            .inscriptions
            .get(inscription_index)
            .cloned()
            .ok_or(SessionError::InscriptionIndexOutOfRange(inscription_index))?;

        let outcome = crafting::enchant(self.item_mut(item)?, &inscription, rng)?;
        if outcome.is_success() {
            self.character.inscriptions.remove(inscription_index);
            self.after_item_change(item);
        }
        Ok(outcome)
    }

    /// Merge two inscriptions into one a level higher
    pub fn combine_inscriptions(&mut self, first: usize, second: usize) -> Result<&Inscription, SessionError> {
        let inscriptions = &self.character.inscriptions;
        let a = inscriptions
            .get(first)
            .ok_or(SessionError::InscriptionIndexOutOfRange(first))?;
        let b = inscriptions
            .get(second)
            .ok_or(SessionError::InscriptionIndexOutOfRange(second))?;
        if first == second {
            return Err(CraftError::SameInscription.into());
        }

        let id = self.character.next_inscription_id;
        let combined = crafting::combine_inscriptions(a, b, id)?;
        self.character.next_inscription_id();

        let (high, low) = if first > second { (first, second) } else { (second, first) };
        self.character.inscriptions.remove(high);
        self.character.inscriptions.remove(low);
        self.character.inscriptions.push(combined);
        let index = self.character.inscriptions.len() - 1;
        Ok(&self.character.inscriptions[index])
    }

    /// Break an inventory item down into materials
    pub fn disassemble(&mut self, inventory_index: usize) -> Result<Materials, SessionError> {
        if inventory_index >= self.character.inventory.len() {
            return Err(SessionError::ItemIndexOutOfRange(inventory_index));
        }
        let item = self.character.inventory.remove(inventory_index);
        let materials = crafting::disassemble(item);
        self.character.materials.add(&materials);
        Ok(materials)
    }

    pub fn enhance(&mut self, item: ItemRef) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let mut materials = self.character.materials;
        crafting::enhance(self.item_mut(item)?, &mut materials)?;
        self.character.materials = materials;
        self.after_item_change(item);
        Ok(())
    }

    // === Persistence ===

    pub fn save(&self) -> Result<String, SessionError> {
        Ok(encode_snapshot(&self.character)?)
    }

    /// Replace the character with one from save text. Any encounter or
    /// battle is discarded.
    pub fn load(&mut self, data: &str) -> Result<(), SessionError> {
        let snapshot = decode_snapshot(data)?;
        let mut character = snapshot.character;
        character.recompute_with(&self.constants);
        tracing::info!(character = %character.name, level = character.level, "loaded character");
        self.character = character;
        self.encounter.clear();
        self.battle = None;
        self.last_loot.clear();
        Ok(())
    }
}
