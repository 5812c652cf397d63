use async_trait::async_trait;
use fjall::Keyspace;
use reqwest::Client;
use rust_decimal::Decimal;
use std::path::Path;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::ecb_loader::fetch_recent_days;
use super::util::http_client;
use crate::core::{DatedRate, RateError, RateLookup, RateStore};
use crate::store::{DiskRateTable, open_keyspace};

/// Rate store answering from a persisted rate table.
///
/// The table is populated from the ninety day XML feed the first time a store
/// finds it empty; later stores over the same data path reuse it without any
/// network access.
pub struct EcbDbStore {
    table: DiskRateTable,
    base_url: String,
    client: Client,
    ready: OnceCell<Result<(), RateError>>,
}

impl EcbDbStore {
    pub fn open(data_path: &Path, base_url: &str, base_currency: &str) -> Result<Self, RateError> {
        Self::with_keyspace(open_keyspace(data_path)?, base_url, base_currency)
    }

    pub fn with_keyspace(
        keyspace: Keyspace,
        base_url: &str,
        base_currency: &str,
    ) -> Result<Self, RateError> {
        Ok(EcbDbStore {
            table: DiskRateTable::new(keyspace, base_currency)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
            ready: OnceCell::new(),
        })
    }

    async fn populate(&self) -> Result<(), RateError> {
        if !self.table.is_empty()? {
            debug!("Rate table already populated");
            return Ok(());
        }

        let days = fetch_recent_days(&self.client, &self.base_url).await?;
        if days.is_empty() {
            return Err(RateError::EmptyDataset);
        }
        let count = self
            .table
            .insert_days(days.iter().map(|day| (day.date.as_str(), day.rates.as_slice())))?;
        info!(days = count, "Populated rate table");
        Ok(())
    }

    async fn table(&self) -> Result<&DiskRateTable, RateError> {
        self.ready
            .get_or_init(|| async {
                let result = self.populate().await;
                if let Err(e) = &result {
                    warn!(error = %e, "Rate table population failed");
                }
                result
            })
            .await
            .clone()?;
        Ok(&self.table)
    }
}

#[async_trait]
impl RateStore for EcbDbStore {
    async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        date: &str,
    ) -> Result<Decimal, RateError> {
        self.table().await?.exchange_rate(from, to, date)
    }

    async fn get_month_exchange_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError> {
        // Up to 31 days of synchronous table reads; keep them off the runtime workers.
        let table = self.table().await?.clone();
        let (from, to) = (from.to_string(), to.to_string());
        tokio::task::spawn_blocking(move || table.month_rates(&from, &to, year, month))
            .await
            .map_err(|e| RateError::Fetch(format!("local rate table task failed: {e}")))?
    }
}
