use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::gap::DEFAULT_GAP;

/// Environment variable prefix for overrides, e.g. `CAR_PRICER__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CAR_PRICER";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub oracles: OraclesConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// CSV with at least `make`, `model` and `trim` columns
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default = "default_gap")]
    pub gap: f64,
    #[serde(default = "default_true")]
    pub enforce_gap: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            enforce_gap: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OraclesConfig {
    pub retail: OracleConfig,
    pub private: OracleConfig,
    pub trade_in: OracleConfig,
}

impl OraclesConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OracleConfig)> {
        [
            ("retail", &self.retail),
            ("private", &self.private),
            ("trade_in", &self.trade_in),
        ]
        .into_iter()
    }
}

/// Backend for one pricing tier
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleConfig {
    /// JSON model artifact loaded at startup
    Artifact { path: String },
    /// HTTP inference sidecar
    Remote {
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_seconds: u64,
    },
}

impl OracleConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            OracleConfig::Artifact { .. } => "artifact",
            OracleConfig::Remote { .. } => "remote",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_gap() -> f64 {
    DEFAULT_GAP
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}': expected 'text' or 'json'", other),
    }

    if cfg.dataset.path.trim().is_empty() {
        anyhow::bail!("Dataset path cannot be empty");
    }

    if !cfg.pricing.gap.is_finite() || cfg.pricing.gap < 0.0 {
        anyhow::bail!("Pricing gap must be a finite, non-negative number");
    }

    for (name, oracle) in cfg.oracles.iter() {
        match oracle {
            OracleConfig::Artifact { path } => {
                if path.trim().is_empty() {
                    anyhow::bail!("Oracle '{}' artifact path cannot be empty", name);
                }
            }
            OracleConfig::Remote {
                base_url,
                timeout_seconds,
            } => {
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    anyhow::bail!(
                        "Oracle '{}' base_url must start with http:// or https://",
                        name
                    );
                }
                if *timeout_seconds == 0 {
                    anyhow::bail!("Oracle '{}' timeout_seconds must be greater than 0", name);
                }
            }
        }
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/'");
    }

    Ok(())
}
