// src/config.rs

use crate::error::{Result, TrainerError};
use crate::session::SessionRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub database_path: PathBuf,
    /// Default `env_logger` filter; `RUST_LOG` still takes precedence.
    pub log_filter: String,
    pub session: SessionRules,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            database_path: PathBuf::from("fact_drill.db"),
            log_filter: "info".to_string(),
            session: SessionRules::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: TrainerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// A session must be able to present at least one fact.
    pub fn validate(&self) -> Result<()> {
        if self.session.lives == Some(0) {
            return Err(TrainerError::InvalidConfig(
                "session.lives must be at least 1; omit it to disable lives".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Reads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(TrainerConfig::default()),
        }
    }
}
