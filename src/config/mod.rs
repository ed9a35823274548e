use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    currency::{VatPolicy, DEFAULT_DOMESTIC_CURRENCY, DEFAULT_DOMESTIC_VAT_RATE},
    errors::{QuoteError, Result},
    utils::{
        app_data_dir, config_file_in,
        persistence::{read_if_present, replace_atomic},
        store_file_in,
    },
};

const DEFAULT_BLUR_GRACE_MS: u64 = 100;
const DEFAULT_DISPLAY_PRECISION: u8 = 2;
const MAX_DISPLAY_PRECISION: u8 = 6;

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: [&str; 5] = [
    "domestic_currency",
    "domestic_vat_rate",
    "blur_grace_ms",
    "display_precision",
    "store_path",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub domestic_currency: String,
    pub domestic_vat_rate: f64,
    pub blur_grace_ms: u64,
    pub display_precision: u8,
    /// Replacement candidate lists keyed by field name (`currency`, `country`,
    /// `shipping_method`).
    pub candidate_overrides: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domestic_currency: DEFAULT_DOMESTIC_CURRENCY.into(),
            domestic_vat_rate: DEFAULT_DOMESTIC_VAT_RATE,
            blur_grace_ms: DEFAULT_BLUR_GRACE_MS,
            display_precision: DEFAULT_DISPLAY_PRECISION,
            candidate_overrides: BTreeMap::new(),
            store_path: None,
        }
    }
}

impl Config {
    pub fn vat_policy(&self) -> VatPolicy {
        VatPolicy {
            domestic_currency: self.domestic_currency.clone(),
            domestic_rate: self.domestic_vat_rate,
        }
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }

    /// Table store file: the explicit `store_path` or `tables.json` under `base`.
    pub fn store_path_in(&self, base: &Path) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| store_file_in(base))
    }

    /// Rejects values a hand-edited file can carry but `set` never accepts.
    pub fn validate(&self) -> Result<()> {
        if !self.domestic_vat_rate.is_finite() || !(0.0..=100.0).contains(&self.domestic_vat_rate) {
            return Err(QuoteError::Config(format!(
                "domestic_vat_rate must be between 0 and 100 (got {})",
                self.domestic_vat_rate
            )));
        }
        if self.display_precision > MAX_DISPLAY_PRECISION {
            return Err(QuoteError::Config(format!(
                "display_precision must be at most {}",
                MAX_DISPLAY_PRECISION
            )));
        }
        Ok(())
    }

    /// Updates a scalar setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim() {
            "domestic_currency" => {
                if value.is_empty() {
                    return Err(QuoteError::Config("domestic_currency cannot be empty".into()));
                }
                self.domestic_currency = value.to_ascii_uppercase();
            }
            "domestic_vat_rate" => {
                let rate: f64 = value
                    .parse()
                    .map_err(|_| QuoteError::Config(format!("`{}` is not a number", value)))?;
                if !(0.0..=100.0).contains(&rate) {
                    return Err(QuoteError::Config(
                        "domestic_vat_rate must be between 0 and 100".into(),
                    ));
                }
                self.domestic_vat_rate = rate;
            }
            "blur_grace_ms" => {
                self.blur_grace_ms = value.parse().map_err(|_| {
                    QuoteError::Config(format!("`{}` is not a whole number of milliseconds", value))
                })?;
            }
            "display_precision" => {
                let precision: u8 = value
                    .parse()
                    .map_err(|_| QuoteError::Config(format!("`{}` is not a precision", value)))?;
                if precision > MAX_DISPLAY_PRECISION {
                    return Err(QuoteError::Config(format!(
                        "display_precision must be at most {}",
                        MAX_DISPLAY_PRECISION
                    )));
                }
                self.display_precision = precision;
            }
            "store_path" => {
                self.store_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => {
                return Err(QuoteError::Config(format!(
                    "unknown setting `{}` (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        match read_if_present(&self.path)? {
            Some(data) => {
                let config: Config = serde_json::from_str(&data)?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        replace_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.vat_policy().rate_for("KRW"), 10.0);
        assert_eq!(config.blur_grace(), Duration::from_millis(100));
    }

    #[test]
    fn saved_settings_survive_reload() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("domestic_currency", "eur").unwrap();
        config.set("domestic_vat_rate", "19").unwrap();
        config
            .candidate_overrides
            .insert("currency".into(), vec!["EUR".into(), "CHF".into()]);
        manager.save(&config).unwrap();

        let reloaded = manager.load().unwrap();
        assert_eq!(reloaded.domestic_currency, "EUR");
        assert_eq!(reloaded.vat_policy().rate_for("eur"), 19.0);
        assert_eq!(reloaded.candidate_overrides["currency"], vec!["EUR", "CHF"]);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"blur_grace_ms": 250}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.blur_grace_ms, 250);
        assert_eq!(config.domestic_currency, "KRW");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("domestic_vat_rate", "120").is_err());
        assert!(config.set("display_precision", "nine").is_err());
        assert!(config.set("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn out_of_range_vat_in_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"domestic_vat_rate": 150}"#).unwrap();
        let err = manager.load().unwrap_err();
        assert!(matches!(err, QuoteError::Config(ref message) if message.contains("150")));
    }

    #[test]
    fn store_path_defaults_under_base() {
        let mut config = Config::default();
        let base = Path::new("/tmp/qc");
        assert_eq!(config.store_path_in(base), base.join("tables.json"));
        config.set("store_path", "/srv/quotes.json").unwrap();
        assert_eq!(config.store_path_in(base), PathBuf::from("/srv/quotes.json"));
    }
}
