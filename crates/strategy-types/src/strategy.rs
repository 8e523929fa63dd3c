//! Strategy steps, registry entries and provider slot types.

use crate::common::{Address, StrategyHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::{FromStr, ParseBoolError};
use thiserror::Error;

/// Errors from parsing steps or provider settings given as text.
#[derive(Debug, Error)]
pub enum StepParseError {
	#[error("expected pool,output_token,flag but got '{0}'")]
	Shape(String),
	#[error("invalid {field} address '{value}': {source}")]
	Address {
		field: &'static str,
		value: String,
		#[source]
		source: alloy_primitives::hex::FromHexError,
	},
	#[error("invalid flag '{value}': {source}")]
	Flag {
		value: String,
		#[source]
		source: ParseBoolError,
	},
	#[error("unknown default strategy state: {0}")]
	UnknownState(String),
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, StepParseError> {
	value.parse::<Address>().map_err(|source| StepParseError::Address {
		field,
		value: value.to_string(),
		source,
	})
}

/// One leg of a multi-step investment strategy.
///
/// Step `n` deposits the output token of step `n - 1` (or the underlying token
/// for the first step) into `pool` and receives `output_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyStep {
	/// Liquidity pool or contract the step interacts with.
	pub pool: Address,
	/// Token received from the pool.
	pub output_token: Address,
	/// Borrow or swap flag, see [`StepFlagSemantics`].
	pub is_borrow: bool,
}

impl StrategyStep {
	pub fn new(pool: Address, output_token: Address, is_borrow: bool) -> Self {
		Self {
			pool,
			output_token,
			is_borrow,
		}
	}
}

/// Parses the `pool,output_token,flag` triple used on the command line.
impl FromStr for StrategyStep {
	type Err = StepParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let parts: Vec<&str> = s.split(',').map(str::trim).collect();
		let [pool, output_token, flag] = parts.as_slice() else {
			return Err(StepParseError::Shape(s.to_string()));
		};
		let is_borrow = flag.parse::<bool>().map_err(|source| StepParseError::Flag {
			value: flag.to_string(),
			source,
		})?;
		Ok(Self::new(
			parse_address("pool", pool)?,
			parse_address("output token", output_token)?,
			is_borrow,
		))
	}
}

/// Parses a dash separated list of steps, e.g. `pool,out,false-pool,out,true`.
pub fn parse_strategy_steps(s: &str) -> Result<Vec<StrategyStep>, StepParseError> {
	if s.trim().is_empty() {
		return Ok(Vec::new());
	}
	s.split('-').map(StrategyStep::from_str).collect()
}

/// How the boolean of a [`StrategyStep`] is interpreted by a deployment.
///
/// Both protocol versions hash the same `(address, address, bool)` tuple, but
/// one treats the flag as "borrow" and the other as "swap". Only borrow steps
/// are gated by a risk profile's borrow permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFlagSemantics {
	#[default]
	Borrow,
	Swap,
}

/// A strategy as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyEntry {
	pub steps: Vec<StrategyStep>,
	/// Monotonic insertion ordinal, never reused after a delete.
	pub index: u64,
}

/// Value accepted by a provider slot.
///
/// Older callers pin a hash that points into the strategy registry, newer
/// callers pass the steps inline. Both read back as steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyRef {
	Hash(StrategyHash),
	Inline(Vec<StrategyStep>),
}

impl StrategyRef {
	/// True for the zero hash or an empty step list, both of which clear a slot.
	pub fn is_empty(&self) -> bool {
		match self {
			StrategyRef::Hash(hash) => hash.is_zero(),
			StrategyRef::Inline(steps) => steps.is_empty(),
		}
	}
}

/// Selects where default resolution comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultStrategyState {
	/// Use the operator-maintained default slot.
	#[default]
	DefaultSlot,
	/// Ask the APR oracle for the highest-yield strategy.
	AprOracle,
}

impl fmt::Display for DefaultStrategyState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DefaultStrategyState::DefaultSlot => write!(f, "default-slot"),
			DefaultStrategyState::AprOracle => write!(f, "apr-oracle"),
		}
	}
}

impl FromStr for DefaultStrategyState {
	type Err = StepParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"default-slot" | "default_slot" | "0" => Ok(DefaultStrategyState::DefaultSlot),
			"apr-oracle" | "apr_oracle" | "1" => Ok(DefaultStrategyState::AprOracle),
			other => Err(StepParseError::UnknownState(other.to_string())),
		}
	}
}

/// Basis points split applied to a vault's reward token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VaultRewardStrategy {
	/// Share of rewards held as-is.
	pub hold: u64,
	/// Share of rewards converted into the vault's underlying token.
	pub convert: u64,
}

impl VaultRewardStrategy {
	pub const TOTAL_BPS: u64 = 10_000;
}

/// Outcome of strategy resolution for a (risk profile, token hash) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// Operator pinned override.
	Best(Vec<StrategyStep>),
	/// Operator maintained fallback.
	Default(Vec<StrategyStep>),
	/// Strategy chosen by the APR oracle.
	AprOracle(StrategyHash, Vec<StrategyStep>),
	/// No eligible strategy; keep funds uninvested.
	Hold,
}

impl Resolution {
	pub fn steps(&self) -> &[StrategyStep] {
		match self {
			Resolution::Best(steps) | Resolution::Default(steps) => steps,
			Resolution::AprOracle(_, steps) => steps,
			Resolution::Hold => &[],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_strategy_steps() {
		let input = "0x5d3a536E4D6DbD6114cc1Ead35777bAB948E3643,0x5d3a536E4D6DbD6114cc1Ead35777bAB948E3643,false-\
			0x0000000000000000000000000000000000000001,0x0000000000000000000000000000000000000002,true";
		let steps = parse_strategy_steps(input).unwrap();
		assert_eq!(steps.len(), 2);
		assert!(!steps[0].is_borrow);
		assert!(steps[1].is_borrow);
		assert_eq!(steps[1].output_token, Address::with_last_byte(2));
	}

	#[test]
	fn test_parse_rejects_malformed_step() {
		assert!(matches!(
			parse_strategy_steps("0x01,false"),
			Err(StepParseError::Shape(_))
		));
		assert!(matches!(
			parse_strategy_steps("nothex,0x0000000000000000000000000000000000000002,true"),
			Err(StepParseError::Address { field: "pool", .. })
		));
		assert!(matches!(
			parse_strategy_steps(
				"0x0000000000000000000000000000000000000001,0x0000000000000000000000000000000000000002,yes"
			),
			Err(StepParseError::Flag { .. })
		));
		assert!(parse_strategy_steps("").unwrap().is_empty());
	}

	#[test]
	fn test_parse_default_strategy_state() {
		assert_eq!(
			"apr-oracle".parse::<DefaultStrategyState>().unwrap(),
			DefaultStrategyState::AprOracle
		);
		assert_eq!(
			"0".parse::<DefaultStrategyState>().unwrap(),
			DefaultStrategyState::DefaultSlot
		);
		let err = "best".parse::<DefaultStrategyState>().unwrap_err();
		assert!(matches!(err, StepParseError::UnknownState(ref state) if state == "best"));
		assert_eq!(err.to_string(), "unknown default strategy state: best");
	}

	#[test]
	fn test_strategy_ref_emptiness() {
		assert!(StrategyRef::Hash(StrategyHash::ZERO).is_empty());
		assert!(StrategyRef::Inline(vec![]).is_empty());
		assert!(!StrategyRef::Inline(vec![StrategyStep::new(
			Address::with_last_byte(1),
			Address::with_last_byte(2),
			false
		)])
		.is_empty());
	}
}
