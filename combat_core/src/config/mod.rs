//! Configuration loading for classes and combat constants

mod classes;
mod constants;

pub use classes::{default_classes, load_class_configs, parse_class_configs, ClassCatalog, ClassDef};
pub use constants::{
    BaseStatConstants, BattleConstants, DefenseConstants, GameConstants, ProgressionConstants,
    StatCaps,
};
pub use loot_core::config::{load_toml, parse_toml, ConfigError};

use std::path::Path;
use std::sync::OnceLock;

static DEFAULT_CONSTANTS: OnceLock<GameConstants> = OnceLock::new();

/// Load game constants from a TOML file
pub fn load_constants(path: &Path) -> Result<GameConstants, ConfigError> {
    let constants: GameConstants = load_toml(path)?;
    constants.validate()
}

/// Load game constants from a TOML string
pub fn parse_constants(content: &str) -> Result<GameConstants, ConfigError> {
    let constants: GameConstants = parse_toml(content)?;
    constants.validate()
}

impl GameConstants {
    /// Constants bundled with the crate, or the built-in defaults if the
    /// bundled file fails to load
    pub fn bundled() -> GameConstants {
        let toml = include_str!("../../config/constants.toml");
        parse_constants(toml).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "bundled constants failed to load, using defaults");
            GameConstants::default()
        })
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.defense.scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "defense scale must be positive".to_string(),
            ));
        }
        if self.progression.experience_per_level == 0 {
            return Err(ConfigError::ValidationError(
                "experience_per_level must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Shared bundled constants, loaded on first use
pub fn default_constants() -> &'static GameConstants {
    DEFAULT_CONSTANTS.get_or_init(GameConstants::bundled)
}
