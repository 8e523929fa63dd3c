//! Configuration types for the strategy registry.

use crate::{Address, ChainId, HashScheme, NewRiskProfile, StepFlagSemantics};
use serde::{Deserialize, Serialize};

/// Complete registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
	pub registry: RegistrySettings,
	#[serde(default)]
	pub storage: StorageConfig,
	pub roles: RolesConfig,
	#[serde(default)]
	pub oracle: OracleConfig,
	/// Risk profiles seeded by the `setup` command
	#[serde(default)]
	pub risk_profiles: Vec<NewRiskProfile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrySettings {
	pub name: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Chain id mixed into chain-aware token hashes
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
	#[serde(default)]
	pub hash_scheme: HashSchemeKind,
	#[serde(default)]
	pub step_flags: StepFlagSemantics,
	/// Identity used by the CLI when no `--caller` is given
	pub caller: Option<Address>,
}

impl RegistrySettings {
	pub fn hash_scheme(&self) -> HashScheme {
		match self.hash_scheme {
			HashSchemeKind::Legacy => HashScheme::Legacy,
			HashSchemeKind::ChainAware => HashScheme::ChainAware(ChainId(self.chain_id)),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashSchemeKind {
	Legacy,
	#[default]
	ChainAware,
}

/// Storage backend selection. Every key besides `backend` is handed to the
/// backend factory untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// "memory" or "file"
	pub backend: String,
	#[serde(flatten)]
	pub options: toml::Table,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: "memory".to_string(),
			options: toml::Table::new(),
		}
	}
}

/// Initial holders of each role
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RolesConfig {
	pub governance: Address,
	pub operator: Address,
	pub risk_operator: Address,
	pub strategy_operator: Address,
	pub finance_operator: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OracleConfig {
	#[serde(default)]
	pub scores: Vec<OracleScore>,
}

/// Precomputed best-APR answer for a token hash
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleScore {
	pub token_hash: crate::TokenHash,
	pub strategy_hash: crate::StrategyHash,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_chain_id() -> u64 {
	ChainId::ETHEREUM.0
}
