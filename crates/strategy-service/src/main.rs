use anyhow::{Context, Result};
use clap::Parser;
use strategy_config::ConfigLoader;
use strategy_core::RegistryBuilder;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	run(&args).await
}

async fn run(args: &Args) -> Result<()> {
	let config = ConfigLoader::new()
		.with_file(&args.config)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

	let log_level = args
		.log_level
		.clone()
		.unwrap_or_else(|| config.registry.log_level.clone());
	setup_tracing(&log_level)?;

	if matches!(args.command, Command::Validate) {
		return commands::validate(&config);
	}

	info!("Loaded configuration for '{}'", config.registry.name);
	let caller = args.caller.or(config.registry.caller);
	let engine = RegistryBuilder::new(config)
		.build()
		.context("Failed to build registry")?;

	commands::run(&engine, caller, &args.command).await
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.try_init()
		.context("Failed to initialize tracing")?;

	Ok(())
}
