use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::ecb_loader::{EcbHistoryLoader, EcbRecentLoader};
use crate::core::dataset::DatasetLoader;
use crate::core::{DatedRate, RateDataset, RateError, RateLookup, RateStore};

/// Rate store backed by an in-memory [`RateDataset`].
///
/// The dataset is loaded lazily by the first lookup. Concurrent first lookups
/// share a single load, and its outcome (including a failure) is kept for the
/// lifetime of the store.
pub struct EcbStore<L: DatasetLoader> {
    loader: L,
    dataset: OnceCell<Result<Arc<RateDataset>, RateError>>,
}

impl<L: DatasetLoader> EcbStore<L> {
    pub fn with_loader(loader: L) -> Self {
        EcbStore {
            loader,
            dataset: OnceCell::new(),
        }
    }

    async fn dataset(&self) -> Result<Arc<RateDataset>, RateError> {
        self.dataset
            .get_or_init(|| async {
                debug!("Loading rate dataset");
                match self.loader.load().await {
                    Ok(dataset) => {
                        debug!(rows = dataset.len(), "Rate dataset ready");
                        Ok(Arc::new(dataset))
                    }
                    Err(e) => {
                        warn!(error = %e, "Rate dataset load failed");
                        Err(e)
                    }
                }
            })
            .await
            .clone()
    }
}

impl EcbStore<EcbHistoryLoader> {
    /// Store over the complete history archive.
    pub fn history(base_url: &str, base_currency: &str) -> Result<Self, RateError> {
        Ok(Self::with_loader(EcbHistoryLoader::new(
            base_url,
            base_currency,
        )?))
    }
}

impl EcbStore<EcbRecentLoader> {
    /// Store over the ninety day XML feed.
    pub fn recent(base_url: &str, base_currency: &str) -> Result<Self, RateError> {
        Ok(Self::with_loader(EcbRecentLoader::new(
            base_url,
            base_currency,
        )?))
    }
}

#[async_trait]
impl<L: DatasetLoader> RateStore for EcbStore<L> {
    async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        date: &str,
    ) -> Result<Decimal, RateError> {
        self.dataset().await?.exchange_rate(from, to, date)
    }

    async fn get_month_exchange_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError> {
        self.dataset().await?.month_rates(from, to, year, month)
    }
}
