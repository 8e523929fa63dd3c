//! Configuration loading for the strategy registry.
//!
//! Files may be TOML, JSON or YAML (picked by extension). `${VAR}` references
//! are substituted from the environment before parsing, and a handful of
//! settings can be overridden with `STRATEGY_*` variables afterwards.

use regex::Regex;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use strategy_types::{Address, RegistryConfig};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

const STORAGE_BACKENDS: [&str; 2] = ["memory", "file"];

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "STRATEGY_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<RegistryConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		let mut config = self.load_from_file(file_path).await?;

		self.apply_env_overrides(&mut config)?;

		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<RegistryConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);

		if !tokio::fs::try_exists(path).await.unwrap_or(false) {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}
		let content = tokio::fs::read_to_string(path).await?;

		let substituted = substitute_env_vars(&content)?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => from_toml(&substituted),
			Some("json") => from_json(&substituted),
			Some("yaml") | Some("yml") => from_yaml(&substituted),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}

	fn apply_env_overrides(&self, config: &mut RegistryConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.registry.log_level = log_level;
		}

		if let Ok(chain_id) = env::var(format!("{}CHAIN_ID", self.env_prefix)) {
			debug!("Overriding chain id from environment");
			config.registry.chain_id = chain_id
				.parse::<strategy_types::ChainId>()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid chain id: {}", e)))?
				.0;
		}

		if let Ok(caller) = env::var(format!("{}CALLER", self.env_prefix)) {
			debug!("Overriding caller from environment");
			config.registry.caller = Some(caller.parse::<Address>().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid caller address: {}", e))
			})?);
		}

		if let Ok(path) = env::var(format!("{}STORAGE_PATH", self.env_prefix)) {
			debug!("Overriding storage path from environment");
			config
				.storage
				.options
				.insert("storage_path".to_string(), toml::Value::String(path));
		}

		Ok(())
	}
}

/// Replaces every `${VAR_NAME}` with the value of the environment variable.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Load from TOML string
pub fn from_toml(contents: &str) -> Result<RegistryConfig, ConfigError> {
	toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load from JSON string
pub fn from_json(contents: &str) -> Result<RegistryConfig, ConfigError> {
	serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load from YAML string
pub fn from_yaml(contents: &str) -> Result<RegistryConfig, ConfigError> {
	serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Validate configuration
pub fn validate_config(config: &RegistryConfig) -> Result<(), ConfigError> {
	if config.registry.name.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"registry.name cannot be empty".to_string(),
		));
	}

	if !STORAGE_BACKENDS.contains(&config.storage.backend.as_str()) {
		return Err(ConfigError::ValidationError(format!(
			"Unknown storage backend '{}', expected one of {:?}",
			config.storage.backend, STORAGE_BACKENDS
		)));
	}

	let roles = [
		("governance", config.roles.governance),
		("operator", config.roles.operator),
		("risk_operator", config.roles.risk_operator),
		("strategy_operator", config.roles.strategy_operator),
	];
	for (name, holder) in roles {
		if holder == Address::ZERO {
			return Err(ConfigError::ValidationError(format!(
				"roles.{} cannot be the zero address",
				name
			)));
		}
	}

	let mut codes = HashSet::new();
	for profile in &config.risk_profiles {
		if profile.name.trim().is_empty() || profile.symbol.trim().is_empty() {
			return Err(ConfigError::ValidationError(format!(
				"Risk profile {} needs a name and a symbol",
				profile.code
			)));
		}
		if !profile.pool_rating.is_valid() {
			return Err(ConfigError::ValidationError(format!(
				"Risk profile {} has invalid rating range {}",
				profile.code, profile.pool_rating
			)));
		}
		if !codes.insert(profile.code) {
			return Err(ConfigError::ValidationError(format!(
				"Risk profile {} is listed twice",
				profile.code
			)));
		}
	}

	for score in &config.oracle.scores {
		if score.token_hash.is_zero() || score.strategy_hash.is_zero() {
			return Err(ConfigError::ValidationError(
				"oracle.scores entries cannot use the zero hash".to_string(),
			));
		}
	}

	Ok(())
}
