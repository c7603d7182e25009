//! LootGenerator - Rolls gold and items when an enemy dies

use crate::affix::{Affix, AppliedAffix};
use crate::config::LootConfig;
use crate::enemy::{DropChance, Enemy};
use crate::item::{BaseItem, Item, ItemBuilder, MAX_AFFIXES};
use crate::types::{AffixKind, Rarity};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Chance that an elite or boss drop is bumped one rarity tier
pub const ELITE_UPGRADE_CHANCE: f64 = 0.3;

/// One unit of loot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loot {
    Gold(u32),
    Item(Item),
}

impl Loot {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Loot::Item(item) => Some(item),
            Loot::Gold(_) => None,
        }
    }
}

/// Seeded RNG for reproducible runs
pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Walk the drop table in order against a roll in [0, 100).
/// Falls back to common when the table is exhausted.
pub fn determine_rarity(drop_table: &[DropChance], rng: &mut impl Rng) -> Rarity {
    let roll = rng.gen_range(0.0..100.0);
    let mut cumulative = 0.0;
    for entry in drop_table {
        cumulative += entry.chance;
        if roll <= cumulative {
            return entry.rarity;
        }
    }
    Rarity::Common
}

/// Generates loot from the shared catalogs
#[derive(Debug, Clone)]
pub struct LootGenerator {
    config: Arc<LootConfig>,
}

impl LootGenerator {
    pub fn new(config: Arc<LootConfig>) -> Self {
        LootGenerator { config }
    }

    pub fn config(&self) -> &LootConfig {
        &self.config
    }

    /// Roll the full drop for a defeated enemy
    pub fn generate_loot(&self, enemy: &Enemy, rng: &mut impl Rng) -> Vec<Loot> {
        let mut loot = Vec::new();

        if let Some(gold) = enemy.gold_drop {
            let (min, max) = (gold.min.min(gold.max), gold.min.max(gold.max));
            loot.push(Loot::Gold(rng.gen_range(min..=max)));
        }

        let drop_roll = rng.gen_range(0.0..100.0);
        if drop_roll > enemy.loot_chance {
            tracing::debug!(enemy = %enemy.id, drop_roll, "no item drop");
            return loot;
        }

        let mut rarity = determine_rarity(&enemy.drop_table, rng);
        let base = self.pick_base_item(enemy, rng);

        if enemy.enemy_type.has_rarity_bonus() && rng.gen_bool(ELITE_UPGRADE_CHANCE) {
            if let Some(next) = rarity.next() {
                tracing::debug!(from = rarity.as_str(), to = next.as_str(), "rarity upgrade");
                rarity = next;
            }
        }

        let item = self.build_item(&base, rarity, rng);
        tracing::debug!(
            enemy = %enemy.id,
            item = %item.final_name(),
            rarity = rarity.as_str(),
            affixes = item.affixes().len(),
            "item dropped"
        );
        loot.push(Loot::Item(item));
        loot
    }

    /// Pick a base item from a random preferred tag's pool
    pub fn pick_base_item(&self, enemy: &Enemy, rng: &mut impl Rng) -> BaseItem {
        let tag = enemy
            .preferred_items
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default();
        match self.config.items.pool_for_tag(tag).choose(rng) {
            Some(base) => base.clone(),
            None => {
                tracing::warn!(enemy = %enemy.id, tag, "empty item pool, using stub weapon");
                BaseItem::stub_weapon()
            }
        }
    }

    /// Assemble an item of `rarity` from `base`
    pub fn build_item(&self, base: &BaseItem, rarity: Rarity, rng: &mut impl Rng) -> Item {
        let max_durability = self.config.rarity_durability(rarity, base.level);
        ItemBuilder::new(base)
            .rarity(rarity)
            .max_durability(max_durability)
            .affixes(self.roll_affixes(base, rarity, rng))
            .build()
    }

    /// Roll prefixes, suffixes and (ancient only) uniques for a base item
    pub fn roll_affixes(&self, base: &BaseItem, rarity: Rarity, rng: &mut impl Rng) -> Vec<AppliedAffix> {
        let Some(rarity_config) = self.config.rarity.get(rarity) else {
            tracing::warn!(rarity = rarity.as_str(), "missing rarity config, no affixes");
            return Vec::new();
        };
        let category = base.kind.slot_category();
        let catalog = &self.config.affixes;

        // Unique slots are reserved before prefixes and suffixes take the rest
        let uniques = if rarity == Rarity::Ancient {
            catalog.uniques_for(category)
        } else {
            Vec::new()
        };
        let unique_count = if uniques.is_empty() {
            0
        } else {
            (rarity_config.unique_affixes as usize).min(MAX_AFFIXES)
        };
        let room = MAX_AFFIXES - unique_count;
        let prefix_count =
            roll_count(rarity_config.min_prefixes, rarity_config.max_prefixes, rng).min(room);
        let suffix_count = roll_count(rarity_config.min_suffixes, rarity_config.max_suffixes, rng)
            .min(room - prefix_count);

        let mut affixes: Vec<AppliedAffix> = Vec::new();
        affixes.extend(sample_distinct(
            catalog.prefixes_for(category),
            prefix_count,
            AffixKind::Prefix,
            rng,
        ));
        affixes.extend(sample_distinct(
            catalog.suffixes_for(category),
            suffix_count,
            AffixKind::Suffix,
            rng,
        ));

        for _ in 0..unique_count {
            if let Some(unique) = uniques.choose(rng) {
                affixes.push(AppliedAffix::new(AffixKind::Unique, Arc::clone(unique)));
            }
        }
        affixes
    }
}

impl Default for LootGenerator {
    fn default() -> Self {
        LootGenerator::new(Arc::new(crate::config::default_loot_config()))
    }
}

fn roll_count(min: u32, max: u32, rng: &mut impl Rng) -> usize {
    if max <= min {
        return min as usize;
    }
    rng.gen_range(min..=max) as usize
}

/// Sample up to `count` affixes without replacement
fn sample_distinct(
    mut pool: Vec<Arc<Affix>>,
    count: usize,
    kind: AffixKind,
    rng: &mut impl Rng,
) -> Vec<AppliedAffix> {
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        if pool.is_empty() {
            break;
        }
        let index = rng.gen_range(0..pool.len());
        picked.push(AppliedAffix::new(kind, pool.swap_remove(index)));
    }
    picked
}
