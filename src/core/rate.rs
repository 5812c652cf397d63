//! Exchange rate abstractions and core types

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::RateError;

/// Number of fractional digits every rate is reported with.
pub const RATE_SCALE: u32 = 5;

/// A rate observed on a given calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedRate {
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Rounds half away from zero at the fifth fractional digit and pins the
/// scale so that `1` is carried as `1.00000`.
pub fn quantize(rate: Decimal) -> Decimal {
    let mut rounded =
        rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(RATE_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Capability set exposed by every rate backend.
///
/// Callers pick a backend by identifier and only ever talk to it through this
/// trait.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Rate to convert one unit of `from` into `to` on `date` (`YYYY-MM-DD`).
    async fn get_exchange_rate(&self, from: &str, to: &str, date: &str)
    -> Result<Decimal, RateError>;

    /// Every known rate between `from` and `to` in the given month, ordered by day.
    async fn get_month_exchange_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError>;
}
