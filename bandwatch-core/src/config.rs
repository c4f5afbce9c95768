//! Scanner configuration, loaded from a TOML file.

use crate::rules::{RuleCatalog, UnknownRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Rules(#[from] UnknownRule),
}

/// How the newest bar is treated during a live check.
///
/// Exchanges return the still-forming candle last; `DropForming` evaluates
/// history without it while still reporting its timestamp and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveBarMode {
    #[default]
    DropForming,
    IncludeForming,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub inst_id: String,
    pub bar: String,
    pub limit: u32,
    /// Rolling window W for the bollinger enrichment.
    pub window_length: usize,
    pub cooldown_minutes: i64,
    /// Extremum lookback depths, tried largest first.
    pub lookback_depths: Vec<usize>,
    /// Catalog-level minimum series length.
    pub min_bars: usize,
    /// First index evaluated by the historical scan.
    pub start_index: usize,
    pub live_bar: LiveBarMode,
    /// Hour offset applied to exchange timestamps.
    pub tz_offset_hours: i64,
    pub log_file: Option<PathBuf>,
    pub log_dedup: bool,
    /// Rule ids, in evaluation order. Unset means the standard preset.
    pub rules: Option<Vec<String>>,
    pub telegram: Option<TelegramConfig>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            inst_id: "BTC-USDT".to_string(),
            bar: "15m".to_string(),
            limit: 1000,
            window_length: 20,
            cooldown_minutes: 60,
            lookback_depths: vec![80, 50, 20],
            min_bars: 40,
            start_index: 30,
            live_bar: LiveBarMode::default(),
            tz_offset_hours: 7,
            log_file: None,
            log_dedup: false,
            rules: None,
            telegram: None,
        }
    }
}

impl ScanConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_length < 2 {
            return Err(ConfigError::Invalid(
                "window_length must be at least 2".to_string(),
            ));
        }
        if self.lookback_depths.is_empty() {
            return Err(ConfigError::Invalid(
                "lookback_depths must not be empty".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(ConfigError::Invalid("limit must be positive".to_string()));
        }
        if let Some(rules) = &self.rules {
            if rules.is_empty() {
                return Err(ConfigError::Invalid(
                    "rules, when set, must name at least one rule".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Build the rule catalog this config describes.
    pub fn catalog(&self) -> Result<RuleCatalog, ConfigError> {
        let catalog = match &self.rules {
            Some(ids) => RuleCatalog::from_ids(ids, &self.lookback_depths, self.min_bars)?,
            None => {
                RuleCatalog::standard(&self.lookback_depths).with_min_len(self.min_bars)
            }
        };
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_15m_deployment() {
        let config = ScanConfig::default();
        assert_eq!(config.inst_id, "BTC-USDT");
        assert_eq!(config.bar, "15m");
        assert_eq!(config.window_length, 20);
        assert_eq!(config.cooldown_minutes, 60);
        assert_eq!(config.lookback_depths, vec![80, 50, 20]);
        assert_eq!(config.start_index, 30);
        assert_eq!(config.live_bar, LiveBarMode::DropForming);
        assert_eq!(config.tz_offset_hours, 7);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ScanConfig = toml::from_str(
            r#"
            inst_id = "ETH-USDT"
            window_length = 25
            live_bar = "include_forming"
            "#,
        )
        .unwrap();
        assert_eq!(config.inst_id, "ETH-USDT");
        assert_eq!(config.window_length, 25);
        assert_eq!(config.live_bar, LiveBarMode::IncludeForming);
        assert_eq!(config.bar, "15m");
    }

    #[test]
    fn telegram_section_is_optional() {
        let config: ScanConfig = toml::from_str(
            r#"
            [telegram]
            token = "tok"
            chat_id = "42"
            "#,
        )
        .unwrap();
        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.token, "tok");
        assert_eq!(telegram.chat_id, "42");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ScanConfig, _> = toml::from_str("no_such_key = 1");
        assert!(result.is_err());
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let mut config = ScanConfig::default();
        config.window_length = 1;
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.lookback_depths.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn catalog_from_configured_rule_ids() {
        let mut config = ScanConfig::default();
        config.rules = Some(vec![
            "golden_cross".to_string(),
            "death_cross".to_string(),
        ]);
        config.min_bars = 2;
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.rule_ids(), vec!["golden_cross", "death_cross"]);
        assert_eq!(catalog.min_len(), 2);
    }

    #[test]
    fn catalog_defaults_to_standard_preset() {
        let catalog = ScanConfig::default().catalog().unwrap();
        assert_eq!(catalog.rule_ids().len(), 10);
        assert_eq!(catalog.min_len(), 40);
    }
}
