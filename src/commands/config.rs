use anyhow::Result;
use car_pricer::config;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file plus environment overrides) as TOML
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", toml::to_string_pretty(&cfg)?);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Dataset: {}", cfg.dataset.path);
    println!("  Remote Oracles: {}", count_remote_oracles(&cfg));
    println!("  Gap: {}", cfg.pricing.gap);

    info!("Configuration validation successful");
    Ok(())
}

fn count_remote_oracles(cfg: &config::Config) -> usize {
    cfg.oracles
        .iter()
        .filter(|(_, oracle)| matches!(oracle, config::OracleConfig::Remote { .. }))
        .count()
}
