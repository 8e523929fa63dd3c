//! Canonical hashing of token groups and strategies.
//!
//! Hashes computed here are lookup keys into stores that were populated by the
//! on-chain registry, so the byte layout must match Solidity exactly:
//!
//! - legacy token hash: `keccak256(abi.encodePacked(address[] tokens))`
//! - chain-aware token hash: `keccak256(abi.encode(bytes32(chainId), tokens))`
//! - legacy strategy hash: `keccak256(abi.encodePacked(tokenHash, bytes32[] stepHashes))`
//!   with `stepHash = keccak256(abi.encodePacked(pool, outputToken, flag))`
//! - chain-aware strategy hash: same shape, `abi.encode` throughout
//!
//! Inputs are hashed in the order given. Nothing is sorted or deduplicated, and
//! empty inputs hash like any other input.

use crate::{Address, ChainId, HashScheme, StrategyHash, StrategyStep, TokenHash, B256};
use alloy_primitives::keccak256;
use alloy_sol_types::SolValue;

/// Chain-aware hash of an ordered token group.
pub fn hash_token_group(tokens: &[Address], chain_id: ChainId) -> TokenHash {
	let encoded = (chain_id.to_word(), tokens.to_vec()).abi_encode_params();
	TokenHash(keccak256(encoded))
}

/// Hash of an ordered token group as computed before chain ids were introduced.
pub fn hash_token_group_legacy(tokens: &[Address]) -> TokenHash {
	// Packed arrays still pad every element to a full word.
	let mut packed = Vec::with_capacity(tokens.len() * 32);
	for token in tokens {
		packed.extend_from_slice(token.into_word().as_slice());
	}
	TokenHash(keccak256(packed))
}

pub fn hash_token_group_with(scheme: HashScheme, tokens: &[Address]) -> TokenHash {
	match scheme {
		HashScheme::Legacy => hash_token_group_legacy(tokens),
		HashScheme::ChainAware(chain_id) => hash_token_group(tokens, chain_id),
	}
}

/// Packed hash of a single step: 20 + 20 + 1 bytes.
pub fn hash_strategy_step(step: &StrategyStep) -> B256 {
	let mut packed = Vec::with_capacity(41);
	packed.extend_from_slice(step.pool.as_slice());
	packed.extend_from_slice(step.output_token.as_slice());
	packed.push(u8::from(step.is_borrow));
	keccak256(packed)
}

/// Legacy strategy hash for `steps` investing `underlying`.
pub fn hash_strategy(steps: &[StrategyStep], underlying: Address) -> StrategyHash {
	let token_hash = hash_token_group_legacy(&[underlying]);
	let mut packed = Vec::with_capacity(32 * (steps.len() + 1));
	packed.extend_from_slice(token_hash.0.as_slice());
	for step in steps {
		packed.extend_from_slice(hash_strategy_step(step).as_slice());
	}
	StrategyHash(keccak256(packed))
}

/// Chain-aware strategy hash for `steps` investing `underlying` on `chain_id`.
pub fn hash_strategy_chain_aware(
	steps: &[StrategyStep],
	underlying: Address,
	chain_id: ChainId,
) -> StrategyHash {
	let token_hash = hash_token_group(&[underlying], chain_id);
	let step_hashes: Vec<B256> = steps
		.iter()
		.map(|step| keccak256((step.pool, step.output_token, step.is_borrow).abi_encode_params()))
		.collect();
	StrategyHash(keccak256((token_hash.0, step_hashes).abi_encode_params()))
}

pub fn hash_strategy_with(
	scheme: HashScheme,
	steps: &[StrategyStep],
	underlying: Address,
) -> StrategyHash {
	match scheme {
		HashScheme::Legacy => hash_strategy(steps, underlying),
		HashScheme::ChainAware(chain_id) => hash_strategy_chain_aware(steps, underlying, chain_id),
	}
}
