use serde::{Deserialize, Serialize};

use crate::{
	Address, DefaultStrategyState, PoolKind, PoolRatingRange, Role, StrategyHash, TokenHash,
	VaultRewardStrategy,
};

/// Events published after an operation commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
	Token(TokenEvent),
	RiskProfile(RiskProfileEvent),
	Pool(PoolEvent),
	Strategy(StrategyEvent),
	Provider(ProviderEvent),
	Role(RoleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
	Approval {
		token: Address,
		enabled: bool,
		caller: Address,
	},
	TokensHashMapped {
		token_hash: TokenHash,
		caller: Address,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfileEvent {
	Updated {
		index: u64,
		exists: bool,
		can_borrow: bool,
		caller: Address,
	},
	PoolRatingsUpdated {
		index: u64,
		range: PoolRatingRange,
		caller: Address,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
	Approval {
		kind: PoolKind,
		pool: Address,
		enabled: bool,
		caller: Address,
	},
	Rated {
		kind: PoolKind,
		pool: Address,
		rating: u8,
		caller: Address,
	},
	AdapterMapped {
		pool: Address,
		adapter: Address,
		caller: Address,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyEvent {
	Added {
		strategy_hash: StrategyHash,
		index: u64,
		caller: Address,
	},
	Removed {
		strategy_hash: StrategyHash,
		caller: Address,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEvent {
	BestStrategySet {
		risk_profile_code: u64,
		token_hash: TokenHash,
		caller: Address,
	},
	DefaultStrategySet {
		risk_profile_code: u64,
		token_hash: TokenHash,
		caller: Address,
	},
	DefaultStrategyStateChanged {
		state: DefaultStrategyState,
		caller: Address,
	},
	VaultRewardStrategySet {
		token_hash: TokenHash,
		strategy: VaultRewardStrategy,
		caller: Address,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleEvent {
	Transferred {
		role: Role,
		holder: Address,
		caller: Address,
	},
}
