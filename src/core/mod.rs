//! Core business logic abstractions

pub mod config;
pub mod dataset;
pub mod error;
pub mod log;
pub mod lookup;
pub mod rate;

// Re-export main types for cleaner imports
pub use dataset::RateDataset;
pub use error::RateError;
pub use lookup::RateLookup;
pub use rate::{DatedRate, RateStore, quantize};
