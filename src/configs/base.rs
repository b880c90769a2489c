use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub party: PartyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Picks `config.toml`, falling back to the shipped `config.default.toml`.
    pub fn locate() -> AnyResult<&'static str> {
        if Path::new("config.toml").exists() {
            Ok("config.toml")
        } else if Path::new("config.default.toml").exists() {
            Ok("config.default.toml")
        } else {
            Err("config.toml or config.default.toml not found".into())
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        if config_str.trim().is_empty() {
            return Err(format!("{} is empty", path.display()).into());
        }
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> AnyResult<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AnyResult<()> {
        if self.party.history_len == 0 {
            return Err("party.history_len must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.party.tie_break_probability) {
            return Err("party.tie_break_probability must be between 0 and 1".into());
        }
        Ok(())
    }
}
