use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use car_pricer::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // `start` initializes tracing itself once it knows the configured level and format
    let needs_early_tracing = !matches!(args.get_command(), cli::Commands::Start);
    if needs_early_tracing {
        init_tracing("warn", "text");
    }

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Predict { input, year_now } => {
            commands::predict::execute(&args.config, &input, year_now).await?;
        }
        cli::Commands::Version => {
            println!("Car Pricer v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
