use serde::Deserialize;
use std::{fs, path::Path};

use energy_client::analytics::DEFAULT_BASE_RATE;

pub const CONFIG_ENV_VAR: &str = "ENERGY_MONITOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "energy-monitor.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "data/readings.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Price per kWh.
    pub base_rate: f64,
    pub monthly_budget: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE,
            monthly_budget: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Loads the file named by `ENERGY_MONITOR_CONFIG`, else `energy-monitor.toml`.
    ///
    /// An explicitly configured path must exist. The default path is optional
    /// and built-in defaults apply when it is absent.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_file(&path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            Err(_) => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}
