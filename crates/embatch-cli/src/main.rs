//! embatch CLI entry point.
//!
//! Binary name: `embatch`
//!
//! Parses CLI arguments, initializes tracing based on verbosity, then
//! dispatches to the appropriate command handler.

mod cli;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,embatch=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Embed {
            input,
            pipeline,
            api_key,
            base_url,
            output,
        } => {
            let config = pipeline.to_config();
            cli::embed::run(
                cli::embed::EmbedArgs {
                    input,
                    model: pipeline.model,
                    api_key: SecretString::from(api_key),
                    base_url,
                    output,
                    config,
                },
                cli.json,
                cli.quiet,
            )
            .await?;
        }

        Commands::Plan { input, pipeline } => {
            let config = pipeline.to_config();
            cli::plan::run(
                cli::plan::PlanArgs {
                    input,
                    model: pipeline.model,
                    config,
                },
                cli.json,
                cli.quiet,
            )
            .await?;
        }
    }

    Ok(())
}
