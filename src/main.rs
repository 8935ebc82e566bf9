use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use routewhisperer::weather::parse_observation;
use routewhisperer::{
    RoutePlanner, RouteWhispererConfig, TranscriptWeatherSource, cities, telemetry, web,
};

#[derive(Parser, Debug)]
#[command(
    name = "routewhisperer",
    version,
    about = "Weather-aware route planner with risk-adjusted ETAs"
)]
struct Cli {
    /// Path to config file (TOML format)
    #[arg(short, long, global = true, env = "ROUTEWHISPERER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Plan a route and print the report as JSON
    Plan {
        /// Comma-separated city ids, defaults to Santa's stops
        #[arg(long, value_delimiter = ',')]
        cities: Vec<String>,
        /// Read destination weather from a captured agent transcript
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Parse a weather observation out of free text or JSON
    Parse {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        location: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RouteWhispererConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let planner = Arc::new(RoutePlanner::from_config(&config)?);
            info!("Starting server in {:?} mode", config.data_source.mode);
            web::run(&config.server, planner).await
        }
        Command::Plan {
            cities: selection,
            transcript,
        } => {
            let mut planner = RoutePlanner::from_config(&config)?;
            if let Some(path) = transcript {
                let source = TranscriptWeatherSource::from_file(&path)
                    .await
                    .with_context(|| format!("Failed to read transcript {}", path.display()))?;
                planner = planner.with_weather(Arc::new(source));
            }

            let ids = if selection.is_empty() {
                cities::default_route().into_iter().map(|c| c.id).collect()
            } else {
                selection
            };

            let planned = planner.plan(&ids).await?;
            let report = planned.route.report();
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Parse { input, location } => {
            let text = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let observation = parse_observation(&text, &location);
            println!("{}", serde_json::to_string_pretty(&observation)?);
            Ok(())
        }
    }
}
