use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::RwLock;

use crate::core::{DatedRate, RateError, RateStore};

type RateFn = dyn Fn(&str, &str, &str) -> Result<Decimal, RateError> + Send + Sync;
type MonthFn = dyn Fn(&str, &str, i32, u32) -> Result<Vec<DatedRate>, RateError> + Send + Sync;

/// Rate store whose answers are supplied by the caller at run time.
///
/// Operations without configured behavior fail with
/// [`RateError::BehaviorNotConfigured`].
#[derive(Default)]
pub struct MockStore {
    on_get_exchange_rate: RwLock<Option<Box<RateFn>>>,
    on_get_month_exchange_rates: RwLock<Option<Box<MonthFn>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get_exchange_rate<F>(&self, behavior: F)
    where
        F: Fn(&str, &str, &str) -> Result<Decimal, RateError> + Send + Sync + 'static,
    {
        *self
            .on_get_exchange_rate
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(behavior));
    }

    pub fn on_get_month_exchange_rates<F>(&self, behavior: F)
    where
        F: Fn(&str, &str, i32, u32) -> Result<Vec<DatedRate>, RateError> + Send + Sync + 'static,
    {
        *self
            .on_get_month_exchange_rates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(behavior));
    }

    /// Drops all configured behavior.
    pub fn reset(&self) {
        *self
            .on_get_exchange_rate
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        *self
            .on_get_month_exchange_rates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[async_trait]
impl RateStore for MockStore {
    async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        date: &str,
    ) -> Result<Decimal, RateError> {
        let behavior = self
            .on_get_exchange_rate
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match behavior.as_ref() {
            Some(f) => f(from, to, date),
            None => Err(RateError::BehaviorNotConfigured("get_exchange_rate")),
        }
    }

    async fn get_month_exchange_rates(
        &self,
        from: &str,
        to: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<DatedRate>, RateError> {
        let behavior = self
            .on_get_month_exchange_rates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match behavior.as_ref() {
            Some(f) => f(from, to, year, month),
            None => Err(RateError::BehaviorNotConfigured(
                "get_month_exchange_rates",
            )),
        }
    }
}
