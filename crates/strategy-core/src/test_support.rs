//! Fixtures shared by the component tests.

use crate::{ConfiguredRoles, RegistryBuilder, RegistryEngine, StaticAprOracle};
use std::sync::Arc;
use strategy_storage::implementations::memory::MemoryStorage;
use strategy_types::{
	Address, HashScheme, NewRiskProfile, PoolRatingRange, RegistryConfig, RegistrySettings,
	RolesConfig, StepFlagSemantics, StorageConfig, StrategyStep,
};

pub fn owner() -> Address {
	Address::repeat_byte(0x11)
}

pub fn stranger() -> Address {
	Address::repeat_byte(0xee)
}

pub fn token(n: u8) -> Address {
	Address::repeat_byte(0x20 + n)
}

pub fn pool(n: u8) -> Address {
	Address::repeat_byte(0x40 + n)
}

pub fn config(step_flags: StepFlagSemantics) -> RegistryConfig {
	RegistryConfig {
		registry: RegistrySettings {
			name: "test-registry".to_string(),
			log_level: "debug".to_string(),
			chain_id: 1,
			hash_scheme: Default::default(),
			step_flags,
			caller: Some(owner()),
		},
		storage: StorageConfig::default(),
		roles: RolesConfig {
			governance: owner(),
			operator: owner(),
			risk_operator: owner(),
			strategy_operator: owner(),
			finance_operator: Some(owner()),
		},
		oracle: Default::default(),
		risk_profiles: Vec::new(),
	}
}

pub fn engine() -> RegistryEngine {
	engine_with(StepFlagSemantics::Borrow, Arc::new(StaticAprOracle::new()))
}

pub fn engine_with(step_flags: StepFlagSemantics, oracle: Arc<StaticAprOracle>) -> RegistryEngine {
	RegistryBuilder::new(config(step_flags))
		.with_storage_factory(|_| Ok(Box::new(MemoryStorage::new())))
		.with_role_resolver(Arc::new(ConfiguredRoles::single(owner())))
		.with_apr_oracle(oracle)
		.build()
		.unwrap()
}

pub fn scheme() -> HashScheme {
	HashScheme::ChainAware(strategy_types::ChainId::ETHEREUM)
}

pub fn profile(code: u64, can_borrow: bool, lower: u8, upper: u8) -> NewRiskProfile {
	NewRiskProfile {
		code,
		name: format!("profile-{}", code),
		symbol: format!("RP{}", code),
		can_borrow,
		pool_rating: PoolRatingRange::new(lower, upper),
	}
}

pub fn step(n: u8, is_borrow: bool) -> StrategyStep {
	StrategyStep::new(pool(n), token(100 + n), is_borrow)
}

/// Drains every event published so far.
pub fn drain<T: Clone>(rx: &mut tokio::sync::broadcast::Receiver<T>) -> Vec<T> {
	let mut events = Vec::new();
	while let Ok(event) = rx.try_recv() {
		events.push(event);
	}
	events
}
