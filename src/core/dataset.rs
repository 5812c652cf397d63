//! Indexed, immutable snapshot of historical rates against one base currency.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Read;

use super::error::RateError;
use super::lookup::{RateLookup, parse_rate_cell};

/// Row-per-date matrix of base-relative rates.
///
/// Row 0 is the header (`Date` followed by currency codes); column 0 of every
/// other row is a `YYYY-MM-DD` date. The base currency is never a column.
#[derive(Debug)]
pub struct RateDataset {
    base: String,
    rows: Vec<Vec<String>>,
    currency_index: HashMap<String, usize>,
    date_index: HashMap<String, usize>,
}

impl RateDataset {
    /// Builds the currency and date indexes over already decoded rows.
    pub fn from_rows(base: &str, rows: Vec<Vec<String>>) -> Result<Self, RateError> {
        let header = rows
            .first()
            .ok_or_else(|| RateError::Format("missing header row".to_string()))?;
        if rows.len() < 2 {
            return Err(RateError::EmptyDataset);
        }
        if header.len() < 2 {
            return Err(RateError::Format(format!(
                "header row has no currency columns: {header:?}"
            )));
        }

        let currency_index = header
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, code)| !code.is_empty())
            .map(|(i, code)| (code.clone(), i))
            .collect();

        let date_index = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, row)| row.first().map(|date| (date.clone(), i)))
            .collect();

        Ok(Self {
            base: base.to_string(),
            rows,
            currency_index,
            date_index,
        })
    }

    /// Decodes comma separated rows with the header on the first line.
    pub fn from_csv<R: Read>(base: &str, reader: R) -> Result<Self, RateError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let rows = csv_reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                    .map_err(|e| RateError::Format(format!("invalid csv record: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(base, rows)
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.currency_index.keys().map(String::as_str)
    }

    /// Number of dated rows, excluding the header.
    pub(crate) fn len(&self) -> usize {
        self.rows.len() - 1
    }
}

/// Produces a [`RateDataset`] from some upstream source.
///
/// Implementations perform the whole fetch and decode on every call; callers
/// are responsible for invoking it at most once per store.
#[async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn load(&self) -> Result<RateDataset, RateError>;
}

impl RateLookup for RateDataset {
    fn base_currency(&self) -> &str {
        &self.base
    }

    fn base_value(&self, currency: &str, date: &str) -> Result<Decimal, RateError> {
        let row = *self
            .date_index
            .get(date)
            .ok_or_else(|| RateError::DateNotFound(date.to_string()))?;
        let column = *self
            .currency_index
            .get(currency)
            .ok_or_else(|| RateError::CurrencyNotFound(currency.to_string()))?;

        self.rows[row]
            .get(column)
            .and_then(|cell| parse_rate_cell(cell))
            .ok_or_else(|| RateError::DataUnavailable {
                currency: currency.to_string(),
                date: date.to_string(),
            })
    }
}
