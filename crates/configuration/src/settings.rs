use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSources,
    pub simulator: SimulatorConfig,
    pub alerting: AlertingConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks the cross-field rules `serde` cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulator.validate()?;
        self.alerting.validate()?;
        Ok(())
    }
}

/// Where the transaction dataset and its companion quote files live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct DataSources {
    /// The primary transactional dataset (spreadsheet or CSV).
    pub primary: PathBuf,
    /// Worksheet to read from a spreadsheet; the first sheet when unset.
    pub sheet: Option<String>,
    /// Daily oil quotes (`Data`, `CotacaoPetroleo`).
    pub oil_quotes: Option<PathBuf>,
    /// Daily soy and corn futures closes (`Data`, `FuturoSoja`, `FuturoMilho`).
    pub futures: Option<PathBuf>,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("_data/df_case.xlsx"),
            sheet: None,
            oil_quotes: None,
            futures: None,
        }
    }
}

impl DataSources {
    /// Every file this source set reads, primary first.
    pub fn paths(&self) -> Vec<&PathBuf> {
        let mut paths = vec![&self.primary];
        paths.extend(self.oil_quotes.iter());
        paths.extend(self.futures.iter());
        paths
    }
}

/// Bounds, step and starting value of one simulator slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
    pub default: Decimal,
}

impl SliderConfig {
    pub const fn new(min: Decimal, max: Decimal, step: Decimal, default: Decimal) -> Self {
        Self { min, max, step, default }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.min >= self.max {
            return Err(ConfigError::ValidationError(format!(
                "slider '{name}': min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        if self.step <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "slider '{name}': step must be positive"
            )));
        }
        if self.default < self.min || self.default > self.max {
            return Err(ConfigError::ValidationError(format!(
                "slider '{name}': default ({}) is outside [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Parameters of the linear FOB price simulator.
///
/// `estimated = base + coef_fx·(fx − fx_ref) + coef_oil·(oil − oil_ref) + coef_soy·(soy − soy_ref)`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub base: Decimal,
    pub coef_fx: Decimal,
    pub coef_oil: Decimal,
    pub coef_soy: Decimal,
    pub fx_ref: Decimal,
    pub oil_ref: Decimal,
    pub soy_ref: Decimal,
    pub fx: SliderConfig,
    pub oil: SliderConfig,
    pub soy: SliderConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            base: dec!(450),
            coef_fx: dec!(20),
            coef_oil: dec!(0.8),
            coef_soy: dec!(2.5),
            fx_ref: dec!(5.0),
            oil_ref: dec!(80),
            soy_ref: dec!(14.0),
            fx: SliderConfig::new(dec!(4.0), dec!(7.0), dec!(0.1), dec!(5.2)),
            oil: SliderConfig::new(dec!(60.0), dec!(150.0), dec!(1.0), dec!(85.0)),
            soy: SliderConfig::new(dec!(10.0), dec!(20.0), dec!(0.1), dec!(14.5)),
        }
    }
}

impl SimulatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.fx.validate("fx")?;
        self.oil.validate("oil")?;
        self.soy.validate("soy")?;
        Ok(())
    }
}

/// Parameters of the trailing-window price alert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Number of observations before the current one that form the baseline.
    pub window: usize,
    /// Band half-width in standard deviations.
    pub sigma: f64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self { window: 30, sigma: 2.0 }
    }
}

impl AlertingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.window < 2 {
            return Err(ConfigError::ValidationError(
                "alerting.window must be at least 2 to estimate a standard deviation".to_string(),
            ));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(ConfigError::ValidationError(
                "alerting.sigma must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// Output layout of the console log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
    /// When set, a daily rolling log file is also written here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            directory: None,
        }
    }
}
