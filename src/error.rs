use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementFlowError {
    #[error("Invalid policy ratio '{name}' = {value}: must be a finite positive number")]
    InvalidPolicyRatio { name: &'static str, value: f64 },

    #[error("Invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatementFlowError>;
