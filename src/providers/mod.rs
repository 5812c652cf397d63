pub mod converter;
pub mod ecb;
pub mod ecb_db;
pub mod ecb_loader;
pub mod mock;
pub mod util;

use anyhow::{Context, Result, anyhow};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::core::RateStore;
use crate::core::config::AppConfig;
use converter::ConverterStore;
use ecb::EcbStore;
use ecb_db::EcbDbStore;
use mock::MockStore;

/// Identifiers of the available rate backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Full history archive, indexed in memory
    Ecb,
    /// Ninety day XML feed, indexed in memory
    Ecb90d,
    /// Ninety day feed persisted in an embedded table
    EcbDb,
    /// Scraped converter page, latest rate only
    Converter,
    /// Programmable test double
    Mock,
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StoreKind::Ecb => "ecb",
                StoreKind::Ecb90d => "ecb90d",
                StoreKind::EcbDb => "ecbdb",
                StoreKind::Converter => "converter",
                StoreKind::Mock => "mock",
            }
        )
    }
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecb" => Ok(StoreKind::Ecb),
            "ecb90d" => Ok(StoreKind::Ecb90d),
            "ecbdb" => Ok(StoreKind::EcbDb),
            "converter" => Ok(StoreKind::Converter),
            "mock" => Ok(StoreKind::Mock),
            _ => Err(anyhow!("{} is not a valid store", s)),
        }
    }
}

/// Builds a fresh store instance; every call gets its own load guard.
pub fn build_store(kind: StoreKind, config: &AppConfig) -> Result<Arc<dyn RateStore>> {
    debug!(store = %kind, "Building rate store");
    let ecb_url = &config.providers.ecb.base_url;
    let base = &config.base_currency;

    let store: Arc<dyn RateStore> = match kind {
        StoreKind::Ecb => Arc::new(EcbStore::history(ecb_url, base)?),
        StoreKind::Ecb90d => Arc::new(EcbStore::recent(ecb_url, base)?),
        StoreKind::EcbDb => {
            let data_path = config.default_data_path()?;
            let store = EcbDbStore::open(&data_path, ecb_url, base).with_context(|| {
                format!("Failed to open rate table in {}", data_path.display())
            })?;
            Arc::new(store)
        }
        StoreKind::Converter => {
            Arc::new(ConverterStore::new(&config.providers.converter.base_url)?)
        }
        StoreKind::Mock => Arc::new(MockStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateError;

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("ecb".parse::<StoreKind>().unwrap(), StoreKind::Ecb);
        assert_eq!("ECB90D".parse::<StoreKind>().unwrap(), StoreKind::Ecb90d);
        assert_eq!("ecbdb".parse::<StoreKind>().unwrap(), StoreKind::EcbDb);
        assert_eq!("Converter".parse::<StoreKind>().unwrap(), StoreKind::Converter);
        assert_eq!("mock".parse::<StoreKind>().unwrap(), StoreKind::Mock);

        let err = "googlefinance".parse::<StoreKind>().unwrap_err();
        assert_eq!(err.to_string(), "googlefinance is not a valid store");
    }

    #[test]
    fn test_store_kind_display_round_trips() {
        for kind in [
            StoreKind::Ecb,
            StoreKind::Ecb90d,
            StoreKind::EcbDb,
            StoreKind::Converter,
            StoreKind::Mock,
        ] {
            assert_eq!(kind.to_string().parse::<StoreKind>().unwrap(), kind);
        }
    }

    #[tokio::test]
    async fn test_built_mock_store_is_unconfigured() {
        let store = build_store(StoreKind::Mock, &AppConfig::default()).unwrap();
        let err = store
            .get_exchange_rate("EUR", "USD", "2017-03-02")
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::BehaviorNotConfigured(_)));
    }

    #[test]
    fn test_build_store_uses_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_path: Some(dir.path().to_string_lossy().into_owned()),
            ..AppConfig::default()
        };
        assert!(build_store(StoreKind::EcbDb, &config).is_ok());
        assert!(dir.path().join("rates_db").exists());
    }
}
