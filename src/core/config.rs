use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_ECB_URL: &str = "https://www.ecb.europa.eu";
pub const DEFAULT_CONVERTER_URL: &str = "https://www.google.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EcbProviderConfig {
    pub base_url: String,
}

impl Default for EcbProviderConfig {
    fn default() -> Self {
        EcbProviderConfig {
            base_url: DEFAULT_ECB_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConverterProviderConfig {
    pub base_url: String,
}

impl Default for ConverterProviderConfig {
    fn default() -> Self {
        ConverterProviderConfig {
            base_url: DEFAULT_CONVERTER_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ecb: EcbProviderConfig,
    #[serde(default)]
    pub converter: ConverterProviderConfig,
}

fn default_store() -> String {
    "ecb".to_string()
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Backend identifier used when the command line does not pick one.
    #[serde(default = "default_store")]
    pub store: String,
    /// Currency every dataset value is expressed against.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store: default_store(),
            base_currency: default_base_currency(),
            providers: ProvidersConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "exrates", "exrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "exrates", "exrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
store: ecb90d
base_currency: EUR
providers:
  ecb:
    base_url: "http://example.com/ecb"
  converter:
    base_url: "http://example.com/converter"
data_path: /tmp/exrates
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.store, "ecb90d");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.providers.ecb.base_url, "http://example.com/ecb");
        assert_eq!(
            config.providers.converter.base_url,
            "http://example.com/converter"
        );
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/exrates")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("providers: {}").unwrap();
        assert_eq!(config.store, "ecb");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.providers.ecb.base_url, DEFAULT_ECB_URL);
        assert_eq!(config.providers.converter.base_url, DEFAULT_CONVERTER_URL);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_partial_providers_keep_defaults() {
        let yaml_str = r#"
providers:
  ecb:
    base_url: "http://localhost:9000"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.providers.ecb.base_url, "http://localhost:9000");
        assert_eq!(config.providers.converter.base_url, DEFAULT_CONVERTER_URL);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/exrates/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
