// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fact not found in competency table: {0}")]
    UnknownFact(String),

    #[error("Invalid fact: {0:?}")]
    InvalidFact(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
