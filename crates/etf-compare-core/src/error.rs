use thiserror::Error;

use crate::types::Rate;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Cannot parse date '{value}' for {symbol}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    DateParse { symbol: String, value: String },

    #[error("Data retrieval failed for {symbol}: {reason}")]
    DataRetrieval { symbol: String, reason: String },

    #[error("No aligned months between {etf} and {index}. Check symbols or date range.")]
    NoOverlap { etf: String, index: String },

    #[error("No valid months for ETF vs index comparison")]
    NoValidPeriods,

    #[error("Invalid weight: {field} must be between 0 and 1 (got {value})")]
    InvalidWeight { field: String, value: Rate },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CompareError {
    fn from(e: serde_json::Error) -> Self {
        CompareError::SerializationError(e.to_string())
    }
}
