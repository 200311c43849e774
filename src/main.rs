//! Routine Builder - product picker and routine chat assistant
//!
#![doc = "Main entry point for the routine-builder application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use routine_builder::cli::{Cli, Commands, ProductCommand};
use routine_builder::commands;
use routine_builder::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    config.validate()?;

    match cli.command {
        Commands::Serve { bind } => {
            tracing::info!("Starting relay server");
            commands::serve::run_serve(config, bind).await?;
            Ok(())
        }
        Commands::Products { command } => match command {
            ProductCommand::List { category, json } => {
                commands::products::list_products(&config, category.as_deref(), json).await?;
                Ok(())
            }
            ProductCommand::Categories => {
                commands::products::list_categories(&config).await?;
                Ok(())
            }
        },
        Commands::Select { command } => {
            commands::select::handle_select(&config, command).await?;
            Ok(())
        }
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Routine => {
            tracing::info!("Starting one-shot routine generation");
            commands::chat::run_routine(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "routine_builder=debug"
    } else {
        "routine_builder=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
