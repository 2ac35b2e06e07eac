use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{OracleError, PriceLabel, PriceOracle};
use crate::cleaner::CleanedRow;

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: f64,
}

/// Calls an inference sidecar: `POST {base_url}/predict/{label}` with the
/// cleaned row as JSON, expecting `{"price": <number>}` back.
#[derive(Debug, Clone)]
pub struct RemoteOracle {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteOracle {
    pub fn new(client: Client, base_url: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn endpoint(&self, label: PriceLabel) -> String {
        format!("{}/predict/{}", self.base_url, label.as_str())
    }
}

#[async_trait]
impl PriceOracle for RemoteOracle {
    async fn predict(&self, label: PriceLabel, row: &CleanedRow) -> Result<f64, OracleError> {
        let http = |source| OracleError::Http { label, source };

        let response = self
            .client
            .post(self.endpoint(label))
            .timeout(self.timeout)
            .json(row)
            .send()
            .await
            .map_err(http)?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleError::Upstream {
                label,
                status,
                message,
            });
        }

        let body: PriceResponse = response.json().await.map_err(http)?;
        Ok(body.price)
    }

    fn kind(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let oracle = RemoteOracle::new(Client::new(), "http://localhost:9100/", 5);
        assert_eq!(
            oracle.endpoint(PriceLabel::TradeIn),
            "http://localhost:9100/predict/Trade-In"
        );
        assert_eq!(
            oracle.endpoint(PriceLabel::Retail),
            "http://localhost:9100/predict/Retail"
        );
        assert_eq!(oracle.kind(), "remote");
    }

    #[tokio::test]
    async fn test_connection_failure_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let oracle = RemoteOracle::new(Client::new(), format!("http://{}", addr), 1);
        let row = CleanedRow {
            age: 1,
            mileage: 1,
            make: "Toyota".into(),
            model: "Sienna".into(),
            trim: "LE".into(),
            interior: "good".into(),
            exterior: "good".into(),
            mechanical: "good".into(),
            line: "Mid".into(),
            drivetrain: "FWD".into(),
            transmission: "CVT".into(),
        };

        let err = oracle.predict(PriceLabel::Private, &row).await.unwrap_err();
        assert!(matches!(
            err,
            OracleError::Http {
                label: PriceLabel::Private,
                ..
            }
        ));
    }
}
