//! Plugin configuration.
//!
//! Read from a TOML file at startup, or from the JSON document the host
//! supplies when it asks for a reporting plugin factory:
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [[pipelines]]
//! name = "__DEFAULT_PIPELINE__"
//! spec = "ds1 [type=bridge name=prices]"
//!
//! [[pipelines]]
//! name = "juelsPerFeeCoinPipeline"
//! spec = "ds1 [type=bridge name=link]"
//!
//! [deviation]
//! kind = "expiring-instrument"
//! expiresAt = 1735689600
//! ```

use std::path::PathBuf;

use feeds_median::deviation::{DeviationConfig, DeviationDefinition};
use feeds_median::MedianError;
use serde::{Deserialize, Serialize};

/// Pipeline producing this oracle's observation.
pub const DEFAULT_PIPELINE: &str = "__DEFAULT_PIPELINE__";

/// Pipeline producing the juels-per-fee-coin rate.
pub const JUELS_PER_FEE_COIN_PIPELINE: &str = "juelsPerFeeCoinPipeline";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FEEDS_CONFIG";

/// Complete plugin configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Named pipeline specs.
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,
    /// Optional deviation function definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<DeviationDefinition>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// A named pipeline spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Pipeline name, e.g. [`DEFAULT_PIPELINE`].
    pub name: String,
    /// Pipeline source handed to the runner.
    pub spec: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from `$FEEDS_CONFIG`, or `./feeds.toml`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: PluginConfig = toml::from_str(content)?;
        config.deviation_config()?;
        Ok(config)
    }

    /// Parse and validate the JSON document supplied by the host.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: PluginConfig = serde_json::from_str(content)?;
        config.deviation_config()?;
        Ok(config)
    }

    /// Path of the config file.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("feeds.toml"))
    }

    /// Spec of the pipeline called `name`.
    ///
    /// # Errors
    ///
    /// - [`MedianError::InvalidConfig`] if no pipeline has that name
    pub fn pipeline(&self, name: &str) -> Result<&str, MedianError> {
        self.pipelines
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.spec.as_str())
            .ok_or_else(|| MedianError::InvalidConfig(format!("no pipeline found for {name}")))
    }

    /// The validated deviation function configuration, if one is defined.
    ///
    /// # Errors
    ///
    /// - [`MedianError::InvalidConfig`] if the definition is malformed
    pub fn deviation_config(&self) -> Result<Option<DeviationConfig>, MedianError> {
        self.deviation
            .as_ref()
            .map(DeviationConfig::try_from)
            .transpose()
    }
}
