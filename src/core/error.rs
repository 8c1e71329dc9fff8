use thiserror::Error;

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown unit definition: {0}")]
    UnknownDefinition(crate::core::types::DefinitionId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
