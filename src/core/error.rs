//! Error taxonomy shared by every rate store.

use thiserror::Error;

/// Errors returned by rate lookups and dataset loading.
///
/// Load-level variants (`Fetch`, `Format`, `EmptyDataset`) are terminal for the
/// store instance that produced them. Lookup-level variants identify the
/// currency or date that could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Upstream unreachable or unreadable. For the persisted backend this also
    /// covers reads and writes of the local rate table.
    #[error("failed to fetch rate data: {0}")]
    Fetch(String),

    #[error("malformed rate data: {0}")]
    Format(String),

    #[error("rate dataset contains no data rows")]
    EmptyDataset,

    #[error("date {0} not found")]
    DateNotFound(String),

    #[error("currency {0} not found")]
    CurrencyNotFound(String),

    #[error("{currency} data does not exist for {date}")]
    DataUnavailable { currency: String, date: String },

    #[error("no data exists for {from} to {to} in {year}-{month:02}")]
    NoData {
        from: String,
        to: String,
        year: i32,
        month: u32,
    },

    #[error("store behavior not configured: {0}")]
    BehaviorNotConfigured(&'static str),
}

impl RateError {
    /// True for failures tied to a single lookup rather than to the store.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            RateError::DateNotFound(_)
                | RateError::CurrencyNotFound(_)
                | RateError::DataUnavailable { .. }
        )
    }
}
