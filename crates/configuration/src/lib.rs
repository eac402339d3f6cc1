use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    AlertingConfig, Config, DataSources, LogFormat, LoggingConfig, ServerConfig,
    SimulatorConfig, SliderConfig,
};

/// Loads the application configuration from a TOML file.
///
/// The file is optional: every section has defaults. Environment variables
/// prefixed with `PRICING__` override file values, using `__` as the section
/// separator (e.g. `PRICING__DATA__PRIMARY=data.csv`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("PRICING")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.alerting.window, 30);
        assert_eq!(config.simulator.coef_soy, dec!(2.5));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[data]
primary = "fixtures/panel.csv"
oil_quotes = "fixtures/oil.csv"

[alerting]
window = 20
sigma = 3.0

[simulator]
base = 500
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.data.primary, Path::new("fixtures/panel.csv"));
        assert_eq!(config.data.oil_quotes.as_deref(), Some(Path::new("fixtures/oil.csv")));
        assert_eq!(config.alerting.window, 20);
        assert_eq!(config.simulator.base, dec!(500));
        assert_eq!(config.simulator.coef_fx, dec!(20));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[alerting]\nsigma = -1.0").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
