use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvogeneError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("No match: {0}")]
    NoMatch(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl EvogeneError {
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        EvogeneError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvogeneError>;
