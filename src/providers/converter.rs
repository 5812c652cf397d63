use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use tracing::{debug, instrument};

use super::util::{fetch_text, http_client};
use crate::core::{DatedRate, RateError, RateStore, quantize};

const RESULT_SELECTOR: &str = "#currency_converter_result";
const VALUE_SELECTOR: &str = ".bld";

fn selector(css: &str) -> Result<Selector, RateError> {
    Selector::parse(css).map_err(|e| RateError::Format(format!("invalid selector {css}: {e:?}")))
}

/// Extracts the converted amount for one unit of `from` from a converter page.
pub fn parse_converter_page(html: &str, from: &str, to: &str) -> Result<Decimal, RateError> {
    let document = Html::parse_document(html);
    let container = document
        .select(&selector(RESULT_SELECTOR)?)
        .next()
        .ok_or_else(|| RateError::Format("converter result missing from page".to_string()))?;
    let value = container
        .select(&selector(VALUE_SELECTOR)?)
        .next()
        .ok_or_else(|| RateError::CurrencyNotFound(format!("{from} or {to}")))?;

    let text = value.text().collect::<String>();
    let amount = text
        .split_whitespace()
        .next()
        .and_then(|token| Decimal::from_str(token).ok())
        .ok_or_else(|| RateError::Format(format!("unreadable converter value: {text:?}")))?;
    Ok(quantize(amount))
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Rate store scraping a currency converter web page.
///
/// The page only reports the latest rate, so the requested date is ignored
/// and month queries never have data.
pub struct ConverterStore {
    base_url: String,
    client: Client,
}

impl ConverterStore {
    pub fn new(base_url: &str) -> Result<Self, RateError> {
        Ok(ConverterStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl RateStore for ConverterStore {
    #[instrument(name = "ConverterRateFetch", skip_all, fields(from = %from, to = %to))]
    async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        date: &str,
    ) -> Result<Decimal, RateError> {
        for code in [from, to] {
            if !is_currency_code(code) {
                return Err(RateError::CurrencyNotFound(code.to_string()));
            }
        }
        debug!(date, "Converter pages only carry the latest rate");

        let url = format!(
            "{}/finance/converter?a=1&from={}&to={}",
            self.base_url, from, to
        );
        let html = fetch_text(&self.client, &url).await?;
        parse_converter_page(&html, from, to)
    }

    async fn get_month_exchange_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError> {
        Err(RateError::NoData {
            from: from.to_string(),
            to: to.to_string(),
            year,
            month,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
<div id="currency_converter_result">1 USD = <span class="bld">0.9511 EUR</span>
<input type="submit" value="Convert"></div>
</body></html>"#;

    #[test]
    fn test_parse_converter_page() {
        let rate = parse_converter_page(PAGE, "USD", "EUR").unwrap();
        assert_eq!(rate.to_string(), "0.95110");
    }

    #[test]
    fn test_page_without_result_is_format_error() {
        let err = parse_converter_page("<html><body></body></html>", "USD", "EUR").unwrap_err();
        assert!(matches!(err, RateError::Format(_)));
    }

    #[test]
    fn test_result_without_value_names_both_currencies() {
        let html = r#"<div id="currency_converter_result"></div>"#;
        let err = parse_converter_page(html, "USD", "XYZ").unwrap_err();
        assert_eq!(err, RateError::CurrencyNotFound("USD or XYZ".to_string()));
        assert_eq!(err.to_string(), "currency USD or XYZ not found");
    }

    #[tokio::test]
    async fn test_converter_store_fetches_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let store = ConverterStore::new(&mock_server.uri()).unwrap();
        let rate = store
            .get_exchange_rate("USD", "EUR", "2017-03-02")
            .await
            .unwrap();
        assert_eq!(rate, Decimal::from_str("0.9511").unwrap());
    }

    #[tokio::test]
    async fn test_converter_store_rejects_malformed_codes() {
        let store = ConverterStore::new("http://127.0.0.1:9").unwrap();
        let err = store
            .get_exchange_rate("US&D", "EUR", "2017-03-02")
            .await
            .unwrap_err();
        assert_eq!(err, RateError::CurrencyNotFound("US&D".to_string()));
    }

    #[tokio::test]
    async fn test_converter_store_has_no_history() {
        let store = ConverterStore::new("http://127.0.0.1:9").unwrap();
        let err = store
            .get_month_exchange_rates("USD", "EUR", 2017, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::NoData { .. }));
    }
}
