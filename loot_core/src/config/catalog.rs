//! Item, affix and enemy catalogs

use super::rarity::RarityTable;
use super::{load_catalog_file, parse_toml, ConfigError};
use crate::affix::Affix;
use crate::enemy::Enemy;
use crate::item::BaseItem;
use crate::types::{Rarity, SlotCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

const WEAPON_TAGS: &[&str] = &["sword", "axe", "bow", "staff"];
const ARMOR_TAGS: &[&str] = &["helmet", "chest", "gloves", "pants", "boots"];

/// Base items grouped by pool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    #[serde(default)]
    pub weapons: Vec<BaseItem>,
    #[serde(default)]
    pub armors: Vec<BaseItem>,
    #[serde(default)]
    pub accessories: Vec<BaseItem>,
}

impl ItemCatalog {
    /// Pool for a preferred-item tag. Unknown tags map to accessories.
    pub fn pool_for_tag(&self, tag: &str) -> &[BaseItem] {
        if WEAPON_TAGS.contains(&tag) {
            &self.weapons
        } else if ARMOR_TAGS.contains(&tag) {
            &self.armors
        } else {
            &self.accessories
        }
    }

    pub fn find(&self, id: &str) -> Option<&BaseItem> {
        self.weapons
            .iter()
            .chain(&self.armors)
            .chain(&self.accessories)
            .find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.weapons.len() + self.armors.len() + self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Prefix, suffix and unique affix tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffixCatalog {
    #[serde(default)]
    pub prefixes: Vec<Arc<Affix>>,
    #[serde(default)]
    pub suffixes: Vec<Arc<Affix>>,
    #[serde(default)]
    pub uniques: Vec<Arc<Affix>>,
}

impl AffixCatalog {
    pub fn prefixes_for(&self, category: SlotCategory) -> Vec<Arc<Affix>> {
        filter_applicable(&self.prefixes, category)
    }

    pub fn suffixes_for(&self, category: SlotCategory) -> Vec<Arc<Affix>> {
        filter_applicable(&self.suffixes, category)
    }

    pub fn uniques_for(&self, category: SlotCategory) -> Vec<Arc<Affix>> {
        filter_applicable(&self.uniques, category)
    }

    pub fn find(&self, id: &str) -> Option<&Arc<Affix>> {
        self.prefixes
            .iter()
            .chain(&self.suffixes)
            .chain(&self.uniques)
            .find(|a| a.id == id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for affix in self.prefixes.iter().chain(&self.suffixes).chain(&self.uniques) {
            if !seen.insert(affix.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate affix id: {}",
                    affix.id
                )));
            }
        }
        Ok(())
    }
}

fn filter_applicable(affixes: &[Arc<Affix>], category: SlotCategory) -> Vec<Arc<Affix>> {
    affixes
        .iter()
        .filter(|a| a.applies_to(category))
        .cloned()
        .collect()
}

/// Enemy templates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyCatalog {
    #[serde(default)]
    pub enemies: Vec<Enemy>,
}

impl EnemyCatalog {
    pub fn find(&self, id: &str) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for enemy in &self.enemies {
            if enemy.drop_table.iter().any(|d| d.chance < 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "enemy {} has a negative drop chance",
                    enemy.id
                )));
            }
            if let Some(gold) = enemy.gold_drop {
                if gold.min > gold.max {
                    return Err(ConfigError::ValidationError(format!(
                        "enemy {} gold_drop min > max",
                        enemy.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Every catalog the loot pipeline reads, loaded once and shared read-only
#[derive(Debug, Clone, Default)]
pub struct LootConfig {
    pub items: ItemCatalog,
    pub affixes: AffixCatalog,
    pub rarity: RarityTable,
    pub enemies: EnemyCatalog,
}

impl LootConfig {
    /// Parse the four catalogs from TOML strings
    pub fn from_toml_strs(
        items: &str,
        affixes: &str,
        rarity: &str,
        enemies: &str,
    ) -> Result<Self, ConfigError> {
        let config = LootConfig {
            items: parse_toml(items)?,
            affixes: parse_toml(affixes)?,
            rarity: parse_toml(rarity)?,
            enemies: parse_toml(enemies)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `items`, `affixes`, `rarity` and `enemies` from a directory,
    /// accepting either `.toml` or `.json` for each
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config = LootConfig {
            items: load_catalog_file(&find_catalog(dir, "items")?)?,
            affixes: load_catalog_file(&find_catalog(dir, "affixes")?)?,
            rarity: load_catalog_file(&find_catalog(dir, "rarity")?)?,
            enemies: load_catalog_file(&find_catalog(dir, "enemies")?)?,
        };
        config.validate()?;
        tracing::info!(
            items = config.items.len(),
            enemies = config.enemies.enemies.len(),
            dir = %dir.display(),
            "loaded loot catalogs"
        );
        Ok(config)
    }

    /// Bundled default catalog
    pub fn bundled() -> Result<Self, ConfigError> {
        LootConfig::from_toml_strs(
            include_str!("../../config/items.toml"),
            include_str!("../../config/affixes.toml"),
            include_str!("../../config/rarity.toml"),
            include_str!("../../config/enemies.toml"),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.affixes.validate()?;
        self.rarity.validate()?;
        self.enemies.validate()
    }

    pub fn rarity_durability(&self, rarity: Rarity, level: u32) -> u32 {
        match self.rarity.get(rarity) {
            Some(config) => config.max_durability(level),
            None => super::rarity::durability_for(crate::item::DEFAULT_DURABILITY, level),
        }
    }
}

/// Bundled default catalog, or an empty one if the bundle fails to parse
pub fn default_loot_config() -> LootConfig {
    LootConfig::bundled().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "bundled loot catalog failed to load, using empty catalog");
        LootConfig::default()
    })
}

fn find_catalog(dir: &Path, stem: &str) -> Result<std::path::PathBuf, ConfigError> {
    for ext in ["toml", "json"] {
        let path = dir.join(format!("{stem}.{ext}"));
        if path.exists() {
            return Ok(path);
        }
    }
    Err(ConfigError::ValidationError(format!(
        "no {stem}.toml or {stem}.json in {}",
        dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    #[test]
    fn test_bundled_catalog_loads() {
        let config = LootConfig::bundled().unwrap();
        assert!(!config.items.weapons.is_empty());
        assert!(!config.items.armors.is_empty());
        assert!(!config.items.accessories.is_empty());
        assert!(!config.affixes.uniques.is_empty());
        assert!(!config.enemies.enemies.is_empty());
        assert!(config.rarity.get(Rarity::Ancient).is_some());
    }

    #[test]
    fn test_pool_for_tag() {
        let items = ItemCatalog {
            weapons: vec![BaseItem::new("sword", "剑", ItemKind::Melee)],
            armors: vec![BaseItem::new("helm", "盔", ItemKind::Head)],
            accessories: vec![BaseItem::new("ring", "戒", ItemKind::Finger)],
        };
        assert_eq!(items.pool_for_tag("bow")[0].id, "sword");
        assert_eq!(items.pool_for_tag("boots")[0].id, "helm");
        assert_eq!(items.pool_for_tag("anything")[0].id, "ring");
        assert!(items.find("helm").is_some());
    }

    #[test]
    fn test_affix_filter_by_category() {
        let affixes: AffixCatalog = toml::from_str(
            r#"
[[prefixes]]
id = "sharp"
name = "锋利的"
applicable_types = ["weapon"]
effects = [{ stat = "damage", value = 5 }]

[[prefixes]]
id = "sturdy"
name = "坚固的"
applicable_types = ["armor", "accessory"]
effects = [{ stat = "defense", kind = "percentage", value = 10 }]
"#,
        )
        .unwrap();

        assert_eq!(affixes.prefixes_for(SlotCategory::Weapon).len(), 1);
        assert_eq!(affixes.prefixes_for(SlotCategory::Accessory)[0].id, "sturdy");
        assert!(affixes.suffixes_for(SlotCategory::Weapon).is_empty());
    }

    #[test]
    fn test_duplicate_affix_rejected() {
        let affix = Arc::new(Affix::new("dup", "重复"));
        let config = LootConfig {
            affixes: AffixCatalog {
                prefixes: vec![affix.clone()],
                suffixes: vec![affix],
                uniques: Vec::new(),
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_stat_rejected() {
        let result: Result<AffixCatalog, _> = parse_toml(
            r#"
[[prefixes]]
id = "odd"
name = "奇怪的"
applicable_types = ["weapon"]
effects = [{ stat = "luck", value = 1 }]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_rarity_durability() {
        let config = LootConfig::default();
        assert_eq!(config.rarity_durability(Rarity::Epic, 1), 100);
    }
}
