//! CLI configuration.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use storedesk_commerce::Currency;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storedesk.toml", ".storedesk.toml", "storedesk.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Page store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Register configuration.
    #[serde(default)]
    pub pos: PosConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Currency the register prices in.
    pub fn currency(&self) -> Result<Currency> {
        match self.pos.currency.parse::<Currency>() {
            Ok(currency) => Ok(currency),
            Err(e) => bail!("Invalid [pos] currency in config: {}", e),
        }
    }
}

/// Page store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding stored pages, relative to the working directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    ".storedesk/pages".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Register configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosConfig {
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Register name printed on receipts.
    #[serde(default = "default_register")]
    pub register: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_register() -> String {
    "register-1".to_string()
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            register: default_register(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Generate a default storedesk.toml config file.
pub fn generate_default_config() -> String {
    r#"# StoreDesk tooling configuration

[store]
data_dir = ".storedesk/pages"

[pos]
currency = "USD"
register = "register-1"

[logging]
# Overridden by RUST_LOG; --verbose raises it to debug.
level = "warn"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.store.data_dir, ".storedesk/pages");
        assert_eq!(config.pos.register, "register-1");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.currency().unwrap(), Currency::USD);
    }

    #[test]
    fn test_missing_sections_default() {
        let config: CliConfig = toml::from_str("[pos]\ncurrency = \"EUR\"\n").unwrap();
        assert_eq!(config.currency().unwrap(), Currency::EUR);
        assert_eq!(config.pos.register, "register-1");
        assert_eq!(config.store.data_dir, ".storedesk/pages");
    }

    #[test]
    fn test_unknown_currency() {
        let mut config = CliConfig::default();
        config.pos.currency = "XYZ".to_string();
        assert!(config.currency().is_err());
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storedesk.json");
        let path = path.to_str().unwrap();

        let mut config = CliConfig::default();
        config.pos.register = "front".to_string();
        config.save(path).unwrap();

        assert_eq!(CliConfig::load(path).unwrap().pos.register, "front");
    }
}
