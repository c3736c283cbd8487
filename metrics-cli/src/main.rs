mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::process;

use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::{CliError, Result},
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let output_format = args.output_format();

    if let Err(e) = run(args).await {
        if output_format.is_some_and(|f| f.is_json()) {
            let error_json = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {}", e);
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();
    init_logging(args.verbose, args.quiet)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    let executor = CommandExecutor::new(config);

    match args.command {
        Commands::Fetch {
            creator_ids,
            output,
            concurrency,
            stats,
        } => {
            executor
                .fetch(&creator_ids, output, concurrency, stats)
                .await?;
        }

        Commands::Platforms { output } => executor.platforms(output)?,

        Commands::Config { show } => {
            if show {
                executor.show_config()?;
            } else {
                let path = args
                    .config
                    .or_else(AppConfig::default_path)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<none>".to_string());
                println!("Config file: {path}");
                println!("Use --show to display the effective configuration");
            }
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
