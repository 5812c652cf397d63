use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::{debug, instrument};

use super::util::{fetch_bytes, fetch_text, http_client};
use crate::core::dataset::DatasetLoader;
use crate::core::{RateDataset, RateError};

pub const HISTORY_ZIP_PATH: &str = "/stats/eurofxref/eurofxref-hist.zip";
pub const RECENT_XML_PATH: &str = "/stats/eurofxref/eurofxref-hist-90d.xml";

/// Placeholder written for currencies a day does not report.
const MISSING_CELL: &str = "N/A";

/// Loads the complete reference rate history, published as a zip archive
/// holding a single CSV file.
pub struct EcbHistoryLoader {
    base_url: String,
    base_currency: String,
    client: Client,
}

impl EcbHistoryLoader {
    pub fn new(base_url: &str, base_currency: &str) -> Result<Self, RateError> {
        Ok(EcbHistoryLoader {
            base_url: base_url.trim_end_matches('/').to_string(),
            base_currency: base_currency.to_string(),
            client: http_client()?,
        })
    }
}

/// Decodes the first entry of a zip archive as a rate CSV.
pub fn dataset_from_zip(base_currency: &str, bytes: Vec<u8>) -> Result<RateDataset, RateError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| RateError::Format(format!("invalid zip archive: {e}")))?;
    let file = archive
        .by_index(0)
        .map_err(|e| RateError::Format(format!("zip archive has no readable entry: {e}")))?;
    debug!(entry = file.name(), "Decoding rate history entry");
    RateDataset::from_csv(base_currency, file)
}

#[async_trait]
impl DatasetLoader for EcbHistoryLoader {
    #[instrument(name = "EcbHistoryLoad", skip(self), fields(base_url = %self.base_url))]
    async fn load(&self) -> Result<RateDataset, RateError> {
        let url = format!("{}{}", self.base_url, HISTORY_ZIP_PATH);
        let bytes = fetch_bytes(&self.client, &url).await?;
        let dataset = dataset_from_zip(&self.base_currency, bytes)?;
        debug!(
            rows = dataset.len(),
            currencies = dataset.currencies().count(),
            "Loaded rate history"
        );
        Ok(dataset)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Cube")]
    cube: OuterCube,
}

#[derive(Debug, Deserialize)]
struct OuterCube {
    #[serde(rename = "Cube", default)]
    days: Vec<DayCube>,
}

#[derive(Debug, Deserialize)]
struct DayCube {
    #[serde(rename = "@time")]
    time: String,
    #[serde(rename = "Cube", default)]
    rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize)]
struct RateCube {
    #[serde(rename = "@currency")]
    currency: String,
    #[serde(rename = "@rate")]
    rate: String,
}

/// Rates published for one day in the time-windowed XML feed.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRates {
    pub date: String,
    pub rates: Vec<(String, String)>,
}

pub fn parse_xml_feed(text: &str) -> Result<Vec<DayRates>, RateError> {
    let envelope: Envelope = quick_xml::de::from_str(text)
        .map_err(|e| RateError::Format(format!("invalid rate feed xml: {e}")))?;

    Ok(envelope
        .cube
        .days
        .into_iter()
        .map(|day| DayRates {
            date: day.time,
            rates: day
                .rates
                .into_iter()
                .map(|r| (r.currency, r.rate))
                .collect(),
        })
        .collect())
}

/// Lays out per-day rates as a header row plus one row per day.
///
/// Currency columns follow first appearance; days that do not report a
/// currency get a placeholder cell.
pub fn rows_from_days(days: &[DayRates]) -> Vec<Vec<String>> {
    let mut header = vec!["Date".to_string()];
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (currency, _) in days.iter().flat_map(|d| d.rates.iter()) {
        if !columns.contains_key(currency.as_str()) {
            columns.insert(currency.as_str(), header.len());
            header.push(currency.clone());
        }
    }

    let mut rows = Vec::with_capacity(days.len() + 1);
    let width = header.len();
    rows.push(header);
    for day in days {
        let mut row = vec![MISSING_CELL.to_string(); width];
        row[0] = day.date.clone();
        for (currency, rate) in &day.rates {
            row[columns[currency.as_str()]] = rate.clone();
        }
        rows.push(row);
    }
    rows
}

/// Loads the last ninety days of reference rates from the XML feed.
pub struct EcbRecentLoader {
    base_url: String,
    base_currency: String,
    client: Client,
}

impl EcbRecentLoader {
    pub fn new(base_url: &str, base_currency: &str) -> Result<Self, RateError> {
        Ok(EcbRecentLoader {
            base_url: base_url.trim_end_matches('/').to_string(),
            base_currency: base_currency.to_string(),
            client: http_client()?,
        })
    }
}

/// Downloads and decodes the time-windowed XML feed.
pub async fn fetch_recent_days(
    client: &Client,
    base_url: &str,
) -> Result<Vec<DayRates>, RateError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), RECENT_XML_PATH);
    let text = fetch_text(client, &url).await?;
    parse_xml_feed(&text)
}

#[async_trait]
impl DatasetLoader for EcbRecentLoader {
    #[instrument(name = "EcbRecentLoad", skip(self), fields(base_url = %self.base_url))]
    async fn load(&self) -> Result<RateDataset, RateError> {
        let days = fetch_recent_days(&self.client, &self.base_url).await?;
        let dataset = RateDataset::from_rows(&self.base_currency, rows_from_days(&days))?;
        debug!(
            rows = dataset.len(),
            currencies = dataset.currencies().count(),
            "Loaded recent rates"
        );
        Ok(dataset)
    }
}
