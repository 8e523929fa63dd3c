//! Strategy registry engine.
//!
//! [`RegistryEngine`] wires the strategy registry, token index, risk profile
//! registry, liquidity pool registry and strategy provider to one storage
//! backend, one role resolver and one event bus. Build it with
//! [`RegistryBuilder`].

use std::sync::Arc;
use strategy_storage::{StorageError, StorageInterface, StorageService};
use strategy_types::{
	Address, HashScheme, RegistryConfig, RegistryError, RegistryEvent, Result, Role, RoleEvent,
	StepFlagSemantics,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

pub mod actions;
pub mod event_bus;
pub mod ledger;
pub mod oracle;
pub mod pools;
pub mod provider;
pub mod risk_profiles;
pub mod roles;
pub mod strategies;
pub mod tokens;

#[cfg(test)]
mod test_support;

use ledger::ROLES_NAMESPACE;

pub use event_bus::EventBus;
pub use ledger::{Ledger, Transaction};
pub use oracle::{AprOracle, OracleError, StaticAprOracle};
pub use pools::LiquidityPoolRegistry;
pub use provider::StrategyProvider;
pub use risk_profiles::RiskProfileRegistry;
pub use roles::{ConfiguredRoles, RoleError, RoleResolver};
pub use strategies::StrategyRegistry;
pub use tokens::TokenIndex;

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

pub struct RegistryEngine {
	config: RegistryConfig,
	ledger: Arc<Ledger>,
	strategies: Arc<StrategyRegistry>,
	tokens: Arc<TokenIndex>,
	risk_profiles: Arc<RiskProfileRegistry>,
	pools: Arc<LiquidityPoolRegistry>,
	provider: Arc<StrategyProvider>,
}

impl RegistryEngine {
	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	pub fn hash_scheme(&self) -> HashScheme {
		self.config.registry.hash_scheme()
	}

	pub fn step_flags(&self) -> StepFlagSemantics {
		self.config.registry.step_flags
	}

	pub fn strategies(&self) -> &StrategyRegistry {
		&self.strategies
	}

	pub fn tokens(&self) -> &TokenIndex {
		&self.tokens
	}

	pub fn risk_profiles(&self) -> &RiskProfileRegistry {
		&self.risk_profiles
	}

	pub fn pools(&self) -> &LiquidityPoolRegistry {
		&self.pools
	}

	pub fn provider(&self) -> &StrategyProvider {
		&self.provider
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
		self.ledger.event_bus().subscribe()
	}

	/// Hands `role` to `holder`. Only governance may do this. The holder is
	/// stored, so it outlives a restart and overrides the configured one.
	pub async fn transfer_role(&self, caller: Address, role: Role, holder: Address) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Governance).await?;

		if holder == Address::ZERO {
			return Err(RegistryError::InvalidInput(format!(
				"cannot transfer {} to the zero address",
				role
			)));
		}

		let mut tx = Transaction::new();
		tx.put(ROLES_NAMESPACE, &role.to_string(), &holder)?;
		tx.emit(RegistryEvent::Role(RoleEvent::Transferred {
			role,
			holder,
			caller,
		}));
		self.ledger.commit(tx).await?;

		info!("Transferred {} to {}", role, holder);
		Ok(())
	}

	/// Current holder of `role`.
	pub async fn role_holder(&self, role: Role) -> Result<Address> {
		self.ledger.role_holder(role).await.map_err(|e| match e {
			RoleError::Unassigned(role) => RegistryError::NotFound(format!("holder of {}", role)),
			e => RegistryError::Storage(e.to_string()),
		})
	}

	/// Adds every configured risk profile that is not active yet and returns
	/// how many were added.
	pub async fn seed_risk_profiles(&self, caller: Address) -> Result<usize> {
		let mut added = 0;
		for profile in &self.config.risk_profiles {
			if actions::ensure_risk_profile(self, caller, profile).await? {
				added += 1;
			}
		}
		info!(
			"Seeded {} of {} configured risk profile(s)",
			added,
			self.config.risk_profiles.len()
		);
		Ok(added)
	}
}

type StorageFactory =
	Box<dyn Fn(&toml::Value) -> std::result::Result<Box<dyn StorageInterface>, StorageError> + Send>;

pub struct RegistryBuilder {
	config: RegistryConfig,
	storage_factory: Option<StorageFactory>,
	role_resolver: Option<Arc<dyn RoleResolver>>,
	apr_oracle: Option<Arc<dyn AprOracle>>,
}

impl RegistryBuilder {
	pub fn new(config: RegistryConfig) -> Self {
		Self {
			config,
			storage_factory: None,
			role_resolver: None,
			apr_oracle: None,
		}
	}

	pub fn with_storage_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> std::result::Result<Box<dyn StorageInterface>, StorageError>
			+ Send
			+ 'static,
	{
		self.storage_factory = Some(Box::new(factory));
		self
	}

	pub fn with_role_resolver(mut self, resolver: Arc<dyn RoleResolver>) -> Self {
		self.role_resolver = Some(resolver);
		self
	}

	pub fn with_apr_oracle(mut self, oracle: Arc<dyn AprOracle>) -> Self {
		self.apr_oracle = Some(oracle);
		self
	}

	/// Anything not supplied explicitly is built from the config: the
	/// configured storage backend, [`ConfiguredRoles`] and
	/// [`StaticAprOracle`].
	pub fn build(self) -> std::result::Result<RegistryEngine, EngineError> {
		let storage_config = toml::Value::Table(self.config.storage.options.clone());
		let backend = match self.storage_factory {
			Some(factory) => factory(&storage_config)?,
			None => strategy_storage::create_storage(&self.config.storage.backend, &storage_config)?,
		};
		let storage = Arc::new(StorageService::new(backend));

		let roles: Arc<dyn RoleResolver> = match self.role_resolver {
			Some(resolver) => resolver,
			None => Arc::new(ConfiguredRoles::from_config(&self.config.roles)),
		};
		let oracle: Arc<dyn AprOracle> = match self.apr_oracle {
			Some(oracle) => oracle,
			None => Arc::new(StaticAprOracle::from_config(&self.config.oracle)),
		};

		let ledger = Arc::new(Ledger::new(storage, roles, EventBus::new(1000)));
		let strategies = Arc::new(StrategyRegistry::new(ledger.clone()));
		let tokens = Arc::new(TokenIndex::new(ledger.clone()));
		let risk_profiles = Arc::new(RiskProfileRegistry::new(ledger.clone()));
		let pools = Arc::new(LiquidityPoolRegistry::new(ledger.clone()));
		let provider = Arc::new(StrategyProvider::new(
			ledger.clone(),
			strategies.clone(),
			tokens.clone(),
			risk_profiles.clone(),
			pools.clone(),
			Some(oracle),
			self.config.registry.step_flags,
		));

		info!(
			"Registry '{}' ready ({} backend, {} hashing, {:?} step flags)",
			self.config.registry.name,
			self.config.storage.backend,
			self.config.registry.hash_scheme(),
			self.config.registry.step_flags
		);

		Ok(RegistryEngine {
			config: self.config,
			ledger,
			strategies,
			tokens,
			risk_profiles,
			pools,
			provider,
		})
	}
}
