//! Common types used throughout the strategy registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use alloy_primitives::{Address, B256, U256};

/// Chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const POLYGON: Self = Self(137);

	/// The chain id as the big-endian 32-byte word that is hashed next to a token group.
	pub fn to_word(self) -> B256 {
		B256::from(U256::from(self.0).to_be_bytes::<32>())
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Accepts both decimal (`1`) and hex (`0x1`) notation.
impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
			Some(hex) => Ok(ChainId(u64::from_str_radix(hex, 16)?)),
			None => Ok(ChainId(s.parse()?)),
		}
	}
}

macro_rules! digest_newtype {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(pub B256);

		impl $name {
			/// The all-zero digest, used as "no value".
			pub const ZERO: Self = Self(B256::ZERO);

			pub fn is_zero(&self) -> bool {
				self.0.is_zero()
			}
		}

		impl From<B256> for $name {
			fn from(value: B256) -> Self {
				Self(value)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = alloy_primitives::hex::FromHexError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(B256::from_str(s)?))
			}
		}
	};
}

digest_newtype!(
	/// Canonical digest of an ordered token group.
	TokenHash
);

digest_newtype!(
	/// Canonical digest of an ordered list of strategy steps for one underlying token.
	StrategyHash
);

/// Which token-hash function produced a [`TokenHash`].
///
/// Registries deployed before chain ids were part of the hash input still hold
/// legacy hashes, so both schemes are supported side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashScheme {
	/// `keccak256(abi.encodePacked(address[]))`
	Legacy,
	/// `keccak256(abi.encode(bytes32(chainId), address[]))`
	ChainAware(ChainId),
}

impl fmt::Display for HashScheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			HashScheme::Legacy => write!(f, "legacy"),
			HashScheme::ChainAware(chain_id) => write!(f, "chain-aware({})", chain_id),
		}
	}
}
