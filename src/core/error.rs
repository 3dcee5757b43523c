use thiserror::Error;

#[derive(Error, Debug)]
pub enum RehabError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No trainable gestures: every catalog entry lacks a 21-point reference template")]
    NoGestures,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RehabError>;
