use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::RateError;
use crate::core::lookup::{RateLookup, parse_rate_cell};

const PARTITION: &str = "rates";

fn storage_error(e: impl std::fmt::Display) -> RateError {
    RateError::Fetch(format!("local rate table error: {e}"))
}

/// Base-relative rates persisted in an embedded keyspace.
///
/// Every stored date has a marker key (`2017-03-02`) next to its rate keys
/// (`2017-03-02/USD`), so a missing date and a missing currency can be told
/// apart.
#[derive(Clone)]
pub struct DiskRateTable {
    keyspace: Keyspace,
    partition: PartitionHandle,
    base: String,
}

impl DiskRateTable {
    pub fn new(keyspace: Keyspace, base_currency: &str) -> Result<Self, RateError> {
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(storage_error)?;
        Ok(Self {
            keyspace,
            partition,
            base: base_currency.to_string(),
        })
    }

    pub fn is_empty(&self) -> Result<bool, RateError> {
        self.partition.is_empty().map_err(storage_error)
    }

    /// Writes all days in one batch and syncs it to disk.
    pub fn insert_days<'a, I>(&self, days: I) -> Result<usize, RateError>
    where
        I: IntoIterator<Item = (&'a str, &'a [(String, String)])>,
    {
        let mut batch = self.keyspace.batch();
        let mut count = 0;
        for (date, rates) in days {
            batch.insert(&self.partition, date, "");
            for (currency, rate) in rates {
                batch.insert(&self.partition, format!("{date}/{currency}"), rate.as_str());
            }
            count += 1;
        }
        batch.commit().map_err(storage_error)?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(storage_error)?;
        debug!(days = count, "Rate table PUT");
        Ok(count)
    }
}

impl RateLookup for DiskRateTable {
    fn base_currency(&self) -> &str {
        &self.base
    }

    fn base_value(&self, currency: &str, date: &str) -> Result<Decimal, RateError> {
        let key = format!("{date}/{currency}");
        match self.partition.get(&key).map_err(storage_error)? {
            Some(raw) => std::str::from_utf8(&raw)
                .ok()
                .and_then(parse_rate_cell)
                .ok_or_else(|| RateError::DataUnavailable {
                    currency: currency.to_string(),
                    date: date.to_string(),
                }),
            None if self.partition.contains_key(date).map_err(storage_error)? => {
                Err(RateError::CurrencyNotFound(currency.to_string()))
            }
            None => Err(RateError::DateNotFound(date.to_string())),
        }
    }
}
