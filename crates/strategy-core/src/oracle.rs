//! APR oracle seam used by default resolution when the provider is switched
//! to [`DefaultStrategyState::AprOracle`](strategy_types::DefaultStrategyState).

use async_trait::async_trait;
use dashmap::DashMap;
use strategy_types::{OracleConfig, StrategyHash, TokenHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
	#[error("Oracle unavailable: {0}")]
	Unavailable(String),
}

#[async_trait]
pub trait AprOracle: Send + Sync {
	/// Highest-yield strategy for the token group, if the oracle knows one.
	async fn best_apr(&self, token_hash: &TokenHash) -> Result<Option<StrategyHash>, OracleError>;
}

/// Oracle answering from a fixed table.
#[derive(Debug, Default)]
pub struct StaticAprOracle {
	scores: DashMap<TokenHash, StrategyHash>,
}

impl StaticAprOracle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_config(config: &OracleConfig) -> Self {
		let oracle = Self::new();
		for score in &config.scores {
			oracle.set_score(score.token_hash, score.strategy_hash);
		}
		oracle
	}

	pub fn set_score(&self, token_hash: TokenHash, strategy_hash: StrategyHash) {
		self.scores.insert(token_hash, strategy_hash);
	}
}

#[async_trait]
impl AprOracle for StaticAprOracle {
	async fn best_apr(&self, token_hash: &TokenHash) -> Result<Option<StrategyHash>, OracleError> {
		Ok(self
			.scores
			.get(token_hash)
			.map(|hash| *hash)
			.filter(|hash| !hash.is_zero()))
	}
}
