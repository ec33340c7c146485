//! Real Estate Investment Advisor CLI
//!
//! Predicts whether a property is a Good Investment and estimates its
//! price after 5 years using pre-trained classifier and regressor models.

mod commands;
mod config;
mod form;
mod output;

use advisor_lib::{PredictionLogger, PropertyRecord};
use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, preview, schema};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Real Estate Investment Advisor
#[derive(Parser)]
#[command(name = "advisor")]
#[command(author, version, about = "Real Estate Investment Advisor", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (can also be set via ADVISOR_CONFIG env var)
    #[arg(long, env = "ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Classifier model artifact (overrides config)
    #[arg(long)]
    pub classifier_model: Option<PathBuf>,

    /// Regressor model artifact (overrides config)
    #[arg(long)]
    pub regressor_model: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict investment quality and the price after 5 years
    Predict(form::PropertyArgs),

    /// Show the model input preview without running the models
    Preview(form::PropertyArgs),

    /// List the feature columns supplied to the models
    Schema {
        /// Load both artifacts and compare their declared inputs
        #[arg(long)]
        check_models: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::AdvisorConfig::load(cli.config.as_deref())?
        .with_overrides(cli.classifier_model, cli.regressor_model);
    init_tracing(cli.verbose, config.log_json);
    debug!(?config, "Configuration loaded");

    let logger = PredictionLogger::new("cli");

    match cli.command {
        Commands::Predict(args) => {
            logger.log_startup(ADVISOR_VERSION, &config.artifact_paths());
            let record = PropertyRecord::from(args);
            predict::run_prediction(&config, &record, &logger, cli.format)?;
        }
        Commands::Preview(args) => {
            preview::show_preview(&PropertyRecord::from(args), cli.format)?;
        }
        Commands::Schema { check_models } => {
            schema::show_schema(&config, check_models, cli.format)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so JSON output on stdout stays parseable
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
