use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// A price feed to track: the human-readable symbol the backend serves
/// reference prices under, and the on-chain account live prices and
/// components are keyed by.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Feed {
    pub symbol: String,
    pub price_account: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InsightsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub insights: Option<InsightsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            insights: Some(InsightsProviderConfig {
                base_url: "http://localhost:8000".to_string(),
            }),
        }
    }
}

/// Presentation defaults for the components table, overridable per
/// invocation from the command line.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TableConfig {
    pub default_sort: Option<String>,
    pub default_descending: Option<bool>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub feeds: Vec<Feed>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// How long fetched reference prices stay fresh, in seconds. Watch mode
    /// refetches on this cadence; one-shot runs reuse cached prices within
    /// the same window.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub table: TableConfig,
    pub data_path: Option<String>,
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "feedscope", "feedscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "feedscope", "feedscope")
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
