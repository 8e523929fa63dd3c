//! Operator roles checked before every mutating operation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Governance,
	/// Token, token hash, pool and strategy approvals.
	Operator,
	/// Risk profile and pool rating changes.
	RiskOperator,
	/// Best/default strategy slots.
	StrategyOperator,
	FinanceOperator,
}

impl Role {
	pub const ALL: [Role; 5] = [
		Role::Governance,
		Role::Operator,
		Role::RiskOperator,
		Role::StrategyOperator,
		Role::FinanceOperator,
	];
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Role::Governance => "governance",
			Role::Operator => "operator",
			Role::RiskOperator => "risk_operator",
			Role::StrategyOperator => "strategy_operator",
			Role::FinanceOperator => "finance_operator",
		};
		write!(f, "{}", name)
	}
}
