//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/registry.toml

use std::env;
use std::process;

use strategy_config::ConfigLoader;

#[tokio::main]
async fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::new().with_file(config_path).load().await {
		Ok(config) => {
			println!("✅ Configuration is valid!");
			println!("Registry name: {}", config.registry.name);
			println!("Hash scheme: {}", config.registry.hash_scheme());
			println!("Step flags: {:?}", config.registry.step_flags);
			println!("Storage backend: {}", config.storage.backend);
			println!("Seed risk profiles: {}", config.risk_profiles.len());
			println!("Oracle scores: {}", config.oracle.scores.len());
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
