use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreenshoeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario catalog: {0}")]
    InvalidCatalog(String),

    #[error("Session {0} ended without a summary")]
    Aborted(crate::core::types::SessionId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GreenshoeError>;
