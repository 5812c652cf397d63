use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;

use crate::core::RateStore;

/// Rates are published with a delay, so the newest date worth asking for is yesterday.
pub fn default_date() -> NaiveDate {
    (Utc::now() - Duration::days(1)).date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| {
        format!("incorrect date format {value:?}, should be similar to 2016-03-28")
    })
}

/// Looks up a single rate and renders it for the terminal.
pub async fn rate_report(
    store: &dyn RateStore,
    from: &str,
    to: &str,
    date: NaiveDate,
) -> Result<String> {
    let date = date.format("%Y-%m-%d").to_string();
    debug!(from, to, date = %date, "Requesting exchange rate");

    let rate = store
        .get_exchange_rate(from, to, &date)
        .await
        .with_context(|| format!("Failed to get {from} to {to} rate for {date}"))?;
    Ok(rate.to_string())
}
