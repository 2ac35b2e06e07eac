//! Fixtures shared by the integration tests
#![allow(dead_code)]

use car_pricer::cleaner::RawInput;
use car_pricer::config::{
    Config, DatasetConfig, MetricsConfig, OracleConfig, OraclesConfig, PricingConfig,
    ServerConfig,
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

pub const DATASET: &str = "\u{feff}make,model,trim,year\n\
Toyota,Sienna,LE,2019\n\
Toyota,Sienna,XLE,2020\n\
Toyota,Camry,SE,2018\n\
Honda,Civic,EX,2017\n\
Honda,Accord,Sport,2021\n\
Ford,F-150,XLT,2016\n";

/// Writes an additive artifact with the given intercept. All weights are
/// exactly representable so sums don't depend on iteration order.
pub fn write_artifact(dir: &Path, file: &str, label: &str, intercept: f64) -> String {
    let artifact = json!({
        "label": label,
        "intercept": intercept,
        "numeric": { "age": -1000.0, "mileage": -0.0625 },
        "categorical": {
            "make": { "Toyota": 1000.0, "#na#": 0.0 },
            "interior": { "great": 500.0, "rough": -1500.0 }
        }
    });
    let path = dir.join(file);
    std::fs::write(&path, artifact.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

/// Dataset plus three artifacts in a temp dir, and a config pointing at them
pub fn artifact_config(trade_in_intercept: f64) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("vehicles.csv");
    std::fs::write(&dataset, DATASET).unwrap();

    let retail = write_artifact(dir.path(), "retail.json", "Retail", 30_000.0);
    let private = write_artifact(dir.path(), "private.json", "Private", 26_000.0);
    let trade_in = write_artifact(dir.path(), "tradein.json", "Trade-In", trade_in_intercept);

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        },
        dataset: DatasetConfig {
            path: dataset.to_string_lossy().into_owned(),
        },
        pricing: PricingConfig::default(),
        oracles: OraclesConfig {
            retail: OracleConfig::Artifact { path: retail },
            private: OracleConfig::Artifact { path: private },
            trade_in: OracleConfig::Artifact { path: trade_in },
        },
        metrics: MetricsConfig::default(),
    };

    (dir, config)
}

pub fn raw_input(make: &str, model: &str, trim: &str) -> RawInput {
    RawInput {
        year: 2019,
        mileage: 64_000,
        make: make.to_string(),
        model: model.to_string(),
        trim: trim.to_string(),
        interior: "great".to_string(),
        exterior: "great".to_string(),
        mechanical: "great".to_string(),
        line: "Economy".to_string(),
        drivetrain: "FWD".to_string(),
        transmission: "Automatic".to_string(),
    }
}
