//! Rarity configuration: affix slot counts and durability per tier

use super::ConfigError;
use crate::item::{DEFAULT_DURABILITY, MAX_AFFIXES};
use crate::types::Rarity;
use serde::{Deserialize, Serialize};

/// Affix slot counts and durability for one rarity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub min_prefixes: u32,
    #[serde(default)]
    pub max_prefixes: u32,
    #[serde(default)]
    pub min_suffixes: u32,
    #[serde(default)]
    pub max_suffixes: u32,
    /// Only honoured on ancient items
    #[serde(default)]
    pub unique_affixes: u32,
    #[serde(default = "default_base_durability")]
    pub base_durability: u32,
}

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_base_durability() -> u32 {
    DEFAULT_DURABILITY
}

impl Default for RarityConfig {
    fn default() -> Self {
        RarityConfig {
            name: String::new(),
            color: default_color(),
            min_prefixes: 0,
            max_prefixes: 0,
            min_suffixes: 0,
            max_suffixes: 0,
            unique_affixes: 0,
            base_durability: DEFAULT_DURABILITY,
        }
    }
}

impl RarityConfig {
    /// Max durability at `level`: round(base × (1 + (level − 1) × 0.1))
    pub fn max_durability(&self, level: u32) -> u32 {
        durability_for(self.base_durability, level)
    }
}

/// Durability formula shared by configured and missing tiers
pub fn durability_for(base: u32, level: u32) -> u32 {
    let multiplier = 1.0 + (level.max(1) - 1) as f64 * 0.1;
    (base as f64 * multiplier).round() as u32
}

/// Per-tier configuration; a missing tier means zero affixes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RarityTable {
    pub common: Option<RarityConfig>,
    pub uncommon: Option<RarityConfig>,
    pub rare: Option<RarityConfig>,
    pub epic: Option<RarityConfig>,
    pub ancient: Option<RarityConfig>,
}

impl RarityTable {
    pub fn get(&self, rarity: Rarity) -> Option<&RarityConfig> {
        match rarity {
            Rarity::Common => self.common.as_ref(),
            Rarity::Uncommon => self.uncommon.as_ref(),
            Rarity::Rare => self.rare.as_ref(),
            Rarity::Epic => self.epic.as_ref(),
            Rarity::Ancient => self.ancient.as_ref(),
        }
    }

    /// Reject tiers whose ranges are inverted or could exceed the affix cap
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rarity in Rarity::all() {
            let Some(config) = self.get(*rarity) else {
                continue;
            };
            if config.min_prefixes > config.max_prefixes {
                return Err(ConfigError::ValidationError(format!(
                    "{}: min_prefixes > max_prefixes",
                    rarity.as_str()
                )));
            }
            if config.min_suffixes > config.max_suffixes {
                return Err(ConfigError::ValidationError(format!(
                    "{}: min_suffixes > max_suffixes",
                    rarity.as_str()
                )));
            }
            let uniques = if *rarity == Rarity::Ancient {
                config.unique_affixes
            } else {
                0
            };
            let most = (config.max_prefixes + config.max_suffixes + uniques) as usize;
            if most > MAX_AFFIXES {
                tracing::warn!(
                    rarity = rarity.as_str(),
                    most,
                    "rarity config can exceed the affix cap, prefix and suffix counts will be reduced"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_scaling() {
        let config = RarityConfig {
            base_durability: 200,
            ..Default::default()
        };
        assert_eq!(config.max_durability(1), 200);
        assert_eq!(config.max_durability(5), 280);
        assert_eq!(durability_for(150, 3), 180);
    }

    #[test]
    fn test_parse_rarity_table() {
        let table: RarityTable = toml::from_str(
            r#"
[common]
name = "普通"
base_durability = 100

[ancient]
name = "远古"
min_prefixes = 2
max_prefixes = 3
min_suffixes = 2
max_suffixes = 2
unique_affixes = 1
base_durability = 300
"#,
        )
        .unwrap();

        assert!(table.get(Rarity::Rare).is_none());
        let ancient = table.get(Rarity::Ancient).unwrap();
        assert_eq!(ancient.unique_affixes, 1);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_inverted_range() {
        let table = RarityTable {
            rare: Some(RarityConfig {
                min_prefixes: 3,
                max_prefixes: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(table.validate(), Err(ConfigError::ValidationError(_))));
    }
}
