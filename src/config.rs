use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_ticker() -> String {
    "AAPL".into()
}

fn default_lookback_days() -> i64 {
    365
}

fn default_rsi_window() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_stochastic_window() -> usize {
    14
}

fn default_overbought() -> f64 {
    70.0
}

fn default_oversold() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub signals: SignalSettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            ticker: default_ticker(),
            lookback_days: default_lookback_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorSettings {
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    #[serde(default = "default_stochastic_window")]
    pub stochastic_window: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_window: default_rsi_window(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            stochastic_window: default_stochastic_window(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SignalSettings {
    #[serde(default = "default_overbought")]
    pub overbought_threshold: f64,
    #[serde(default = "default_oversold")]
    pub oversold_threshold: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            overbought_threshold: default_overbought(),
            oversold_threshold: default_oversold(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            bind_addr: default_bind_addr(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
///
/// A missing file is not an error: every field has a default, so the binary
/// runs out of the box against the default ticker.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    if !path.exists() {
        let config = AppConfig::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_market(&config.market)?;
    validate_indicators(&config.indicators)?;
    validate_signals(&config.signals)?;
    Ok(())
}

fn validate_market(market: &MarketConfig) -> Result<(), Report<ConfigError>> {
    if market.ticker.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "market.ticker must not be empty".into(),
        }));
    }
    if market.lookback_days <= 0 {
        return Err(Report::new(ConfigError::Validation {
            field: format!("market.lookback_days must be > 0, got {}", market.lookback_days),
        }));
    }
    Ok(())
}

fn validate_indicators(ind: &IndicatorSettings) -> Result<(), Report<ConfigError>> {
    let windows = [
        ("indicators.rsi_window", ind.rsi_window),
        ("indicators.macd_fast", ind.macd_fast),
        ("indicators.macd_slow", ind.macd_slow),
        ("indicators.macd_signal", ind.macd_signal),
        ("indicators.stochastic_window", ind.stochastic_window),
    ];
    for (field, value) in windows {
        if value == 0 {
            return Err(Report::new(ConfigError::Validation {
                field: format!("{field} must be > 0"),
            }));
        }
    }
    if ind.macd_fast >= ind.macd_slow {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "indicators.macd_fast ({}) must be < indicators.macd_slow ({})",
                ind.macd_fast, ind.macd_slow
            ),
        }));
    }
    Ok(())
}

fn validate_signals(signals: &SignalSettings) -> Result<(), Report<ConfigError>> {
    let over = signals.overbought_threshold;
    let under = signals.oversold_threshold;
    if !(0.0 < under && under < over && over < 100.0) {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "signals: need 0 < oversold_threshold ({under}) < overbought_threshold ({over}) < 100"
            ),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[market]
ticker = "MSFT"
lookback_days = 180

[indicators]
rsi_window = 10
macd_fast = 8
macd_slow = 21
macd_signal = 5
stochastic_window = 10

[signals]
overbought_threshold = 75.0
oversold_threshold = 25.0

[server]
enabled = false
bind_addr = "0.0.0.0:9000"
"#;
        let config = parse(toml);
        assert_eq!(config.market.ticker, "MSFT");
        assert_eq!(config.market.lookback_days, 180);
        assert_eq!(config.indicators.macd_slow, 21);
        assert_eq!(config.signals.overbought_threshold, 75.0);
        assert!(!config.server.enabled);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.market.ticker, "AAPL");
        assert_eq!(config.market.lookback_days, 365);
        assert_eq!(config.indicators.rsi_window, 14);
        assert_eq!(config.indicators.macd_fast, 12);
        assert_eq!(config.indicators.macd_slow, 26);
        assert_eq!(config.indicators.macd_signal, 9);
        assert_eq!(config.indicators.stochastic_window, 14);
        assert_eq!(config.signals.overbought_threshold, 70.0);
        assert_eq!(config.signals.oversold_threshold, 30.0);
        assert!(config.server.enabled);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn empty_ticker_rejected() {
        let config = parse("[market]\nticker = \"  \"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let config = parse("[indicators]\nrsi_window = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn fast_not_below_slow_rejected() {
        let config = parse("[indicators]\nmacd_fast = 26\nmacd_slow = 26\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = parse("[signals]\noverbought_threshold = 30.0\noversold_threshold = 70.0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn out_of_range_thresholds_rejected() {
        let config = parse("[signals]\noverbought_threshold = 110.0\n");
        assert!(validate(&config).is_err());
        let config = parse("[signals]\noversold_threshold = 0.0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn non_positive_lookback_rejected() {
        let config = parse("[market]\nlookback_days = 0\n");
        assert!(validate(&config).is_err());
    }
}
