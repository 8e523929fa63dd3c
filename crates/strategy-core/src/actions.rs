//! Idempotent setup helpers.
//!
//! Each helper checks current state first and only issues the mutations that
//! are still missing, so deployment scripts can be re-run safely. They sit on
//! top of the components and never bypass their guards.

use crate::RegistryEngine;
use strategy_types::hashing::{hash_strategy_with, hash_token_group_with};
use strategy_types::{
	Address, HashScheme, NewRiskProfile, Result, StrategyHash, StrategyRef, StrategyStep,
	TokenHash,
};
use tracing::debug;

/// Approves whichever of `tokens` are not yet approved and returns them.
pub async fn ensure_approved(
	engine: &RegistryEngine,
	caller: Address,
	tokens: &[Address],
) -> Result<Vec<Address>> {
	let mut missing = Vec::new();
	for token in tokens {
		if !missing.contains(token) && !engine.tokens().is_approved_token(*token).await? {
			missing.push(*token);
		}
	}
	if !missing.is_empty() {
		engine.tokens().approve_tokens(caller, &missing).await?;
	}
	Ok(missing)
}

/// Approves the group and maps its hash unless the mapping already matches.
pub async fn ensure_token_hash_set(
	engine: &RegistryEngine,
	caller: Address,
	tokens: &[Address],
	scheme: HashScheme,
) -> Result<TokenHash> {
	ensure_approved(engine, caller, tokens).await?;
	let token_hash = hash_token_group_with(scheme, tokens);
	if engine.tokens().is_set_token_hash(tokens, scheme).await? {
		debug!("Token hash {} already set", token_hash);
	} else {
		engine
			.tokens()
			.set_tokens_hash_to_tokens(caller, token_hash, tokens)
			.await?;
	}
	Ok(token_hash)
}

/// Maps a single-token group for every token in `tokens`.
pub async fn ensure_token_hash_set_each(
	engine: &RegistryEngine,
	caller: Address,
	tokens: &[Address],
	scheme: HashScheme,
) -> Result<Vec<TokenHash>> {
	let mut hashes = Vec::with_capacity(tokens.len());
	for token in tokens {
		hashes.push(ensure_token_hash_set(engine, caller, std::slice::from_ref(token), scheme).await?);
	}
	Ok(hashes)
}

/// Adds the profile unless an active one with the same code exists.
/// Returns whether it was added.
pub async fn ensure_risk_profile(
	engine: &RegistryEngine,
	caller: Address,
	profile: &NewRiskProfile,
) -> Result<bool> {
	if engine.risk_profiles().get_active(profile.code).await?.is_some() {
		debug!("Risk profile {} already exists", profile.code);
		return Ok(false);
	}
	engine
		.risk_profiles()
		.add_risk_profile(caller, profile.clone())
		.await?;
	Ok(true)
}

/// Approves the pool, then optionally applies a rating and an adapter.
pub async fn ensure_liquidity_pool(
	engine: &RegistryEngine,
	caller: Address,
	pool: Address,
	rating: Option<u8>,
	adapter: Option<Address>,
) -> Result<()> {
	let state = engine.pools().get_liquidity_pool(pool).await?;
	if !state.is_liquidity_pool {
		engine.pools().approve_liquidity_pool(caller, pool).await?;
	}
	if let Some(rating) = rating.filter(|rating| *rating != state.rating) {
		engine
			.pools()
			.rate_liquidity_pool(caller, pool, rating)
			.await?;
	}
	if let Some(adapter) = adapter.filter(|adapter| state.adapter != Some(*adapter)) {
		engine
			.pools()
			.set_liquidity_pool_to_adapter(caller, pool, adapter)
			.await?;
	}
	Ok(())
}

/// Hashes the strategy and registers it if missing.
pub async fn ensure_strategy(
	engine: &RegistryEngine,
	caller: Address,
	steps: &[StrategyStep],
	underlying: Address,
	scheme: HashScheme,
) -> Result<StrategyHash> {
	let hash = hash_strategy_with(scheme, steps, underlying);
	if engine.strategies().get_strategy(hash).await?.is_none() {
		engine.strategies().add_strategy(caller, hash, steps).await?;
	}
	Ok(hash)
}

/// Registers the strategy and pins it into the best slot, or the default
/// slot when `as_default` is set, for the underlying token's group.
pub async fn set_best_strategy_for_token(
	engine: &RegistryEngine,
	caller: Address,
	risk_profile_code: u64,
	underlying: Address,
	steps: &[StrategyStep],
	scheme: HashScheme,
	as_default: bool,
) -> Result<StrategyHash> {
	let hash = ensure_strategy(engine, caller, steps, underlying, scheme).await?;
	let token_hash = hash_token_group_with(scheme, &[underlying]);
	let provider = engine.provider();
	if as_default {
		provider
			.set_best_default_strategy(caller, risk_profile_code, token_hash, StrategyRef::Hash(hash))
			.await?;
	} else {
		provider
			.set_best_strategy(caller, risk_profile_code, token_hash, StrategyRef::Hash(hash))
			.await?;
	}
	Ok(hash)
}
