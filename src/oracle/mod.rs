//! Price oracles: anything that turns a cleaned feature row into a price.
//!
//! The pricing core only sees the [`PriceOracle`] trait. Two backends ship
//! with the service:
//! - [`artifact`]: an additive tabular model loaded from a JSON export
//! - [`remote`]: an HTTP inference sidecar hosting the trained learners

pub mod artifact;
pub mod remote;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

use crate::{cleaner::CleanedRow, config::OracleConfig, gap::PredictionSet};

pub use artifact::{ArtifactError, TabularModel};
pub use remote::RemoteOracle;

/// Pricing tiers, one trained model each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceLabel {
    Retail,
    Private,
    TradeIn,
}

impl PriceLabel {
    pub const ALL: [PriceLabel; 3] = [PriceLabel::Retail, PriceLabel::Private, PriceLabel::TradeIn];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLabel::Retail => "Retail",
            PriceLabel::Private => "Private",
            PriceLabel::TradeIn => "Trade-In",
        }
    }
}

impl std::str::FromStr for PriceLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retail" => Ok(PriceLabel::Retail),
            "private" => Ok(PriceLabel::Private),
            "trade-in" | "trade_in" | "tradein" => Ok(PriceLabel::TradeIn),
            _ => Err(format!("Invalid price label: {}", s)),
        }
    }
}

impl std::fmt::Display for PriceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{label} oracle request failed: {source}")]
    Http {
        label: PriceLabel,
        #[source]
        source: reqwest::Error,
    },

    #[error("{label} oracle returned {status}: {message}")]
    Upstream {
        label: PriceLabel,
        status: StatusCode,
        message: String,
    },

    #[error("{label} oracle returned a non-finite price ({value})")]
    NonFinite { label: PriceLabel, value: f64 },
}

/// A pure function from (label, feature row) to a scalar price
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn predict(&self, label: PriceLabel, row: &CleanedRow) -> Result<f64, OracleError>;

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}

/// One oracle per pricing tier
#[derive(Clone)]
pub struct OracleSet {
    retail: Arc<dyn PriceOracle>,
    private: Arc<dyn PriceOracle>,
    trade_in: Arc<dyn PriceOracle>,
}

impl OracleSet {
    pub fn new(
        retail: Arc<dyn PriceOracle>,
        private: Arc<dyn PriceOracle>,
        trade_in: Arc<dyn PriceOracle>,
    ) -> Self {
        Self {
            retail,
            private,
            trade_in,
        }
    }

    /// Build every oracle from configuration.
    ///
    /// Artifacts are read here, so a missing or malformed file fails startup.
    pub fn from_config(
        retail: &OracleConfig,
        private: &OracleConfig,
        trade_in: &OracleConfig,
        http_client: &reqwest::Client,
    ) -> Result<Self, ArtifactError> {
        Ok(Self {
            retail: build_oracle(PriceLabel::Retail, retail, http_client)?,
            private: build_oracle(PriceLabel::Private, private, http_client)?,
            trade_in: build_oracle(PriceLabel::TradeIn, trade_in, http_client)?,
        })
    }

    pub fn get(&self, label: PriceLabel) -> &Arc<dyn PriceOracle> {
        match label {
            PriceLabel::Retail => &self.retail,
            PriceLabel::Private => &self.private,
            PriceLabel::TradeIn => &self.trade_in,
        }
    }

    /// Query all three tiers concurrently. Fails if any single call fails.
    pub async fn predict_all(&self, row: &CleanedRow) -> Result<PredictionSet, OracleError> {
        let (retail, private, trade_in) = futures::try_join!(
            predict_checked(self.retail.as_ref(), PriceLabel::Retail, row),
            predict_checked(self.private.as_ref(), PriceLabel::Private, row),
            predict_checked(self.trade_in.as_ref(), PriceLabel::TradeIn, row),
        )?;

        Ok(PredictionSet::new(retail, private, trade_in))
    }
}

async fn predict_checked(
    oracle: &dyn PriceOracle,
    label: PriceLabel,
    row: &CleanedRow,
) -> Result<f64, OracleError> {
    let value = oracle.predict(label, row).await?;
    if !value.is_finite() {
        return Err(OracleError::NonFinite { label, value });
    }
    tracing::debug!(label = %label, backend = oracle.kind(), price = value, "Oracle prediction");
    Ok(value)
}

fn build_oracle(
    label: PriceLabel,
    config: &OracleConfig,
    http_client: &reqwest::Client,
) -> Result<Arc<dyn PriceOracle>, ArtifactError> {
    let oracle: Arc<dyn PriceOracle> = match config {
        OracleConfig::Artifact { path } => {
            let model = TabularModel::load(path)?;
            model.check_label(label)?;
            tracing::info!(label = %label, path = %path, "Loaded price model artifact");
            Arc::new(model)
        }
        OracleConfig::Remote {
            base_url,
            timeout_seconds,
        } => {
            tracing::info!(label = %label, base_url = %base_url, "Using remote price oracle");
            Arc::new(RemoteOracle::new(
                http_client.clone(),
                base_url.clone(),
                *timeout_seconds,
            ))
        }
    };
    Ok(oracle)
}
