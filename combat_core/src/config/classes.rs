//! Character class configuration loading

use loot_core::config::{parse_toml, ConfigError};
use loot_core::types::{Attribute, Attributes};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A playable class: starting attributes and per-level growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_attributes: Attributes,
    pub growth_rates: Attributes,
}

impl ClassDef {
    /// Attributes at `level` before allocated points:
    /// base + floor(growth × (level − 1))
    pub fn attributes_at(&self, level: u32) -> Attributes {
        let steps = level.max(1) - 1;
        let mut attributes = self.base_attributes;
        for attribute in Attribute::all() {
            let growth = (self.growth_rates.get(*attribute) * steps as f64).floor();
            *attributes.get_mut(*attribute) += growth;
        }
        attributes
    }
}

/// Container for class definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassCatalog {
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl ClassCatalog {
    pub fn find(&self, id: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.id == id)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for class in &self.classes {
            let negative = Attribute::all()
                .iter()
                .any(|a| class.growth_rates.get(*a) < 0.0 || class.base_attributes.get(*a) < 0.0);
            if negative {
                return Err(ConfigError::ValidationError(format!(
                    "class {} has a negative attribute or growth rate",
                    class.id
                )));
            }
        }
        Ok(self)
    }
}

/// Load class definitions from a TOML or JSON file
pub fn load_class_configs(path: &Path) -> Result<ClassCatalog, ConfigError> {
    let catalog: ClassCatalog = loot_core::config::load_catalog_file(path)?;
    catalog.validate()
}

/// Load class definitions from a TOML string
pub fn parse_class_configs(content: &str) -> Result<ClassCatalog, ConfigError> {
    let catalog: ClassCatalog = parse_toml(content)?;
    catalog.validate()
}

/// Get default class configurations
pub fn default_classes() -> ClassCatalog {
    let toml = include_str!("../../config/classes.toml");
    parse_class_configs(toml).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "bundled classes failed to load, using a single default class");
        ClassCatalog {
            classes: vec![ClassDef {
                id: "adventurer".to_string(),
                name: "冒险者".to_string(),
                description: String::new(),
                base_attributes: Attributes::default(),
                growth_rates: Attributes::uniform(1.0),
            }],
        }
    })
}
