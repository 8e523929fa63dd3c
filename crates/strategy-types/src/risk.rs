//! Risk profiles and liquidity pool ratings.

use crate::common::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of pool ratings a risk profile accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolRatingRange {
	pub lower_limit: u8,
	pub upper_limit: u8,
}

impl PoolRatingRange {
	pub fn new(lower_limit: u8, upper_limit: u8) -> Self {
		Self {
			lower_limit,
			upper_limit,
		}
	}

	pub fn is_valid(&self) -> bool {
		self.lower_limit <= self.upper_limit
	}

	pub fn contains(&self, rating: u8) -> bool {
		rating >= self.lower_limit && rating <= self.upper_limit
	}
}

impl fmt::Display for PoolRatingRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}]", self.lower_limit, self.upper_limit)
	}
}

/// A named risk tier.
///
/// `code` is the external identity; `index` is the position in the profile
/// list and stays stable after removal so historical data remains queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
	pub code: u64,
	pub index: u64,
	pub name: String,
	pub symbol: String,
	pub can_borrow: bool,
	pub pool_rating_range: PoolRatingRange,
	pub exists: bool,
}

/// Input for adding a risk profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRiskProfile {
	pub code: u64,
	pub name: String,
	pub symbol: String,
	#[serde(default)]
	pub can_borrow: bool,
	pub pool_rating: PoolRatingRange,
}

/// Registry view of a liquidity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiquidityPool {
	pub is_liquidity_pool: bool,
	pub rating: u8,
	pub adapter: Option<Address>,
}

/// Pool registries. Liquidity pools carry an adapter; swap and credit pools
/// only carry approval and rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
	Liquidity,
	Swap,
	Credit,
}

impl fmt::Display for PoolKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			PoolKind::Liquidity => "liquidity",
			PoolKind::Swap => "swap",
			PoolKind::Credit => "credit",
		};
		write!(f, "{}", name)
	}
}

/// Registry view of a swap or credit pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatedPool {
	pub is_approved: bool,
	pub rating: u8,
}
