//! Error types for the fitquest_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitquest_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// The progression backend could not complete a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// No XP reward rate is configured for this action
    #[error("Unknown XP action: {0}")]
    UnknownAction(String),

    /// XP multiplier must be finite and non-negative
    #[error("Invalid XP multiplier: {0}")]
    InvalidMultiplier(f64),

    /// Catalog item id does not exist
    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    /// Skill id is not part of the requirement table
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
