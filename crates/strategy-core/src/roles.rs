//! Role resolution.
//!
//! A [`RoleResolver`] supplies the initial holders. The ledger asks it on
//! every mutating call unless a transfer has stored a newer holder.

use async_trait::async_trait;
use dashmap::DashMap;
use strategy_types::{Address, Role, RolesConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
	#[error("Role not assigned: {0}")]
	Unassigned(Role),
	#[error("Role resolver unavailable: {0}")]
	Unavailable(String),
}

#[async_trait]
pub trait RoleResolver: Send + Sync {
	/// Current holder of `role`.
	async fn resolve(&self, role: Role) -> Result<Address, RoleError>;
}

/// In-process role table seeded from the `[roles]` config section.
#[derive(Debug, Default)]
pub struct ConfiguredRoles {
	holders: DashMap<Role, Address>,
}

impl ConfiguredRoles {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_config(config: &RolesConfig) -> Self {
		let roles = Self::new()
			.with(Role::Governance, config.governance)
			.with(Role::Operator, config.operator)
			.with(Role::RiskOperator, config.risk_operator)
			.with(Role::StrategyOperator, config.strategy_operator);
		match config.finance_operator {
			Some(holder) => roles.with(Role::FinanceOperator, holder),
			None => roles,
		}
	}

	/// Every role held by one address.
	pub fn single(holder: Address) -> Self {
		Role::ALL
			.iter()
			.fold(Self::new(), |roles, role| roles.with(*role, holder))
	}

	pub fn with(self, role: Role, holder: Address) -> Self {
		self.holders.insert(role, holder);
		self
	}
}

#[async_trait]
impl RoleResolver for ConfiguredRoles {
	async fn resolve(&self, role: Role) -> Result<Address, RoleError> {
		self.holders
			.get(&role)
			.map(|holder| *holder)
			.ok_or(RoleError::Unassigned(role))
	}
}
