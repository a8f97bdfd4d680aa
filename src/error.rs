use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CreditError>;

/// Error kinds surfaced by the credit engine and its adapters.
///
/// The first four variants are the terminal request outcomes; the engine
/// never retries them and never downgrades one kind into another. The
/// remaining variants carry adapter failures (storage, serialization, CSV).
#[derive(Error, Debug)]
pub enum CreditError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("business rule violation: {0}")]
    BusinessRule(String),

    /// Charge exceeding available headroom. Carries both sides of the
    /// comparison so callers can report the exact shortfall.
    #[error("insufficient credit: requested {requested}, available {available}")]
    InsufficientCredit {
        requested: Decimal,
        available: Decimal,
    },

    /// The customer lookup dependency is degraded (timeout, 5xx, open
    /// breaker). Distinct from `NotFound`: the customer may well exist.
    #[error("customer service is currently unavailable")]
    ServiceUnavailable,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CreditError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn business_rule(reason: impl Into<String>) -> Self {
        Self::BusinessRule(reason.into())
    }
}
