//! Command-line entry point for the PM2.5 predictor

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use aqi_predictor::{AqiConfig, PredictionRequest, PredictionService, logging, web};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "aqi-predictor", version)]
#[command(about = "Real-time PM2.5 prediction from live weather observations", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict PM2.5 for a city you name
    Manual {
        /// City name, e.g. "Delhi"
        #[arg(long)]
        city: String,

        #[command(flatten)]
        output: PredictArgs,
    },

    /// Predict PM2.5 for the location of your IP address
    Auto {
        #[command(flatten)]
        output: PredictArgs,
    },

    /// Serve the prediction web page
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct PredictArgs {
    /// Measured aerosol optical depth; the configured placeholder is used otherwise
    #[arg(long, allow_negative_numbers = true)]
    aod: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let config = AqiConfig::load_from_path(cli.config.clone())?;
    logging::init_tracing(&config.logging, cli.verbose)?;

    for key in config.missing_api_keys() {
        warn!("{} is not set; requests that need it will be rejected upstream", key);
    }

    let service = PredictionService::from_config(&config)?;
    info!("Using {} model from {}", service.model_kind(), config.model.path.display());

    match cli.command {
        Commands::Manual { city, output } => {
            let request = PredictionRequest::manual(city).with_aod(output.aod);
            predict(&service, &request, output.json).await
        }
        Commands::Auto { output } => {
            let request = PredictionRequest::auto().with_aod(output.aod);
            predict(&service, &request, output.json).await
        }
        Commands::Serve { port } => {
            web::run(service, port.unwrap_or(config.server.port)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn predict(
    service: &PredictionService,
    request: &PredictionRequest,
    json: bool,
) -> Result<ExitCode> {
    let mode = request.input.mode();
    match service.run(request).await {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("❌ {}", err.user_message(mode));
            Ok(ExitCode::FAILURE)
        }
    }
}
