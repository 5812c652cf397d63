//! Cross-rate computation and month enumeration over base-relative values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::error::RateError;
use super::rate::{DatedRate, quantize};

/// Parses a raw cell into a base-relative value.
///
/// Placeholders such as `N/A` and negative values yield `None`. Zero is a
/// valid value.
pub fn parse_rate_cell(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| value.is_zero() || value.is_sign_positive())
}

/// Lookup engine over values expressed relative to one implicit base currency.
///
/// Implementors only resolve raw base-relative values; cross rates, precision
/// and month enumeration are shared.
pub trait RateLookup {
    fn base_currency(&self) -> &str;

    /// Base-relative value of a non-base `currency` on `date` (`YYYY-MM-DD`).
    fn base_value(&self, currency: &str, date: &str) -> Result<Decimal, RateError>;

    fn value(&self, currency: &str, date: &str) -> Result<Decimal, RateError> {
        if currency == self.base_currency() {
            return Ok(Decimal::ONE);
        }
        self.base_value(currency, date)
    }

    fn exchange_rate(&self, from: &str, to: &str, date: &str) -> Result<Decimal, RateError> {
        let from_value = self.value(from, date)?;
        let to_value = self.value(to, date)?;

        let rate = to_value
            .checked_div(from_value)
            .ok_or_else(|| RateError::DataUnavailable {
                currency: from.to_string(),
                date: date.to_string(),
            })?;
        Ok(quantize(rate))
    }

    /// Walks days 1 through 31, skipping days that do not exist in the month
    /// or have no rate for either currency.
    fn month_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError> {
        let mut rates = Vec::with_capacity(31);

        for day in 1..=31 {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                debug!(year, month, day, "Skipping nonexistent calendar day");
                continue;
            };
            let key = date.format("%Y-%m-%d").to_string();

            match self.exchange_rate(from, to, &key) {
                Ok(rate) => rates.push(DatedRate { date, rate }),
                Err(e) if e.is_lookup_miss() => {
                    debug!(date = %key, error = %e, "Skipping day without rate");
                }
                Err(e) => return Err(e),
            }
        }

        if rates.is_empty() {
            return Err(RateError::NoData {
                from: from.to_string(),
                to: to.to_string(),
                year,
                month,
            });
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct FakeTable {
        values: HashMap<(String, String), String>,
        calls: Cell<usize>,
    }

    impl FakeTable {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self {
                values: entries
                    .iter()
                    .map(|(c, d, v)| ((c.to_string(), d.to_string()), v.to_string()))
                    .collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl RateLookup for FakeTable {
        fn base_currency(&self) -> &str {
            "EUR"
        }

        fn base_value(&self, currency: &str, date: &str) -> Result<Decimal, RateError> {
            self.calls.set(self.calls.get() + 1);
            let raw = self
                .values
                .get(&(currency.to_string(), date.to_string()))
                .ok_or_else(|| RateError::CurrencyNotFound(currency.to_string()))?;
            parse_rate_cell(raw).ok_or_else(|| RateError::DataUnavailable {
                currency: currency.to_string(),
                date: date.to_string(),
            })
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_rate_cell() {
        assert_eq!(parse_rate_cell(" 1.0514 "), Some(dec("1.0514")));
        assert_eq!(parse_rate_cell("N/A"), None);
        assert_eq!(parse_rate_cell(""), None);
        assert_eq!(parse_rate_cell("0"), Some(Decimal::ZERO));
        assert_eq!(parse_rate_cell("-1.2"), None);
    }

    #[test]
    fn test_base_value_short_circuits() {
        let table = FakeTable::new(&[]);
        assert_eq!(table.value("EUR", "1999-01-04").unwrap(), Decimal::ONE);
        assert_eq!(table.calls.get(), 0);
    }

    #[test]
    fn test_cross_rate_is_quantized() {
        let table = FakeTable::new(&[
            ("USD", "2017-03-02", "1.0514"),
            ("INR", "2017-03-02", "70.201"),
        ]);
        assert_eq!(
            table.exchange_rate("USD", "EUR", "2017-03-02").unwrap(),
            dec("0.95111")
        );
        assert_eq!(
            table.exchange_rate("INR", "USD", "2017-03-02").unwrap(),
            dec("0.01498")
        );
        assert_eq!(
            table
                .exchange_rate("EUR", "USD", "2017-03-02")
                .unwrap()
                .to_string(),
            "1.05140"
        );
    }

    #[test]
    fn test_from_error_reported_before_to_error() {
        let table = FakeTable::new(&[]);
        let err = table.exchange_rate("AAA", "BBB", "2017-03-02").unwrap_err();
        assert_eq!(err, RateError::CurrencyNotFound("AAA".to_string()));
    }

    #[test]
    fn test_unavailable_cell_is_not_zero() {
        let table = FakeTable::new(&[("USD", "2017-03-02", "N/A")]);
        let err = table.exchange_rate("EUR", "USD", "2017-03-02").unwrap_err();
        assert_eq!(
            err,
            RateError::DataUnavailable {
                currency: "USD".to_string(),
                date: "2017-03-02".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_value_is_a_rate_not_a_divisor() {
        let table = FakeTable::new(&[("XAU", "2017-03-02", "0")]);
        assert_eq!(table.value("XAU", "2017-03-02").unwrap(), Decimal::ZERO);

        let to_zero = table.exchange_rate("EUR", "XAU", "2017-03-02").unwrap();
        assert_eq!(to_zero.to_string(), "0.00000");

        let err = table.exchange_rate("XAU", "EUR", "2017-03-02").unwrap_err();
        assert_eq!(
            err,
            RateError::DataUnavailable {
                currency: "XAU".to_string(),
                date: "2017-03-02".to_string(),
            }
        );
    }

    #[test]
    fn test_month_rates_stop_on_load_level_error() {
        struct Broken;
        impl RateLookup for Broken {
            fn base_currency(&self) -> &str {
                "EUR"
            }
            fn base_value(&self, _: &str, _: &str) -> Result<Decimal, RateError> {
                Err(RateError::Fetch("connection refused".to_string()))
            }
        }

        let err = Broken.month_rates("EUR", "USD", 2017, 4).unwrap_err();
        assert_eq!(err, RateError::Fetch("connection refused".to_string()));
    }

    #[test]
    fn test_month_rates_empty_month_is_no_data() {
        let table = FakeTable::new(&[]);
        let err = table.month_rates("EUR", "USD", 2017, 2).unwrap_err();
        assert!(matches!(err, RateError::NoData { month: 2, .. }));
    }

    #[test]
    fn test_month_rates_invalid_month_is_no_data() {
        let table = FakeTable::new(&[("USD", "2017-03-02", "1.0514")]);
        let err = table.month_rates("EUR", "USD", 2017, 13).unwrap_err();
        assert!(matches!(err, RateError::NoData { month: 13, .. }));
    }
}
