use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use registry_config::{load_config, ConfigLoader, RegistryConfig};
use registry_monitoring::{init_tracing, TracingConfig};
use std::path::PathBuf;
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "contract-registry")]
#[command(about = "Resolve deployed contract addresses from a bundle of artifacts", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "CONFIG_FILE")]
	config: Option<PathBuf>,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(long)]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// List every contract with the networks it is deployed on
	Contracts {
		#[arg(long)]
		json: bool,
	},
	/// Resolve deployed addresses for a network
	Resolve {
		/// Network to resolve for; the connection is queried when omitted
		#[arg(short, long)]
		network_id: Option<String>,

		/// Only report these contracts, by declared name (repeatable)
		#[arg(long = "contract", value_name = "NAME")]
		contracts: Vec<String>,

		#[arg(long)]
		json: bool,
	},
	/// Validate the configuration file and artifact bundle
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = match &cli.config {
		Some(path) => ConfigLoader::from_env_and_file(Some(path.as_path())),
		None => load_config(),
	}
	.context("Failed to load configuration")?;

	setup_tracing(&config, cli.log_level.as_deref())?;

	match cli.command {
		Some(Commands::Contracts { json }) => commands::contracts(&config, json),
		Some(Commands::Resolve {
			network_id,
			contracts,
			json,
		}) => commands::resolve(&config, network_id, &contracts, json).await,
		Some(Commands::Validate) | None => commands::validate(&config),
	}
}

fn setup_tracing(config: &RegistryConfig, level_override: Option<&str>) -> Result<()> {
	let level = level_override.unwrap_or(&config.logging.level);

	let tracing_config = TracingConfig::from_level_str(level)
		.map_err(|e| anyhow!(e))?
		.with_json_format(config.logging.json);

	init_tracing(tracing_config).map_err(|e| anyhow!("{}", e))?;

	info!("Using artifacts from {:?}", config.artifacts.path);
	Ok(())
}
