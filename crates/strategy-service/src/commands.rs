//! Subcommand handlers.
//!
//! Results go to stdout, logs to stderr.

use crate::cli::Command;
use anyhow::{anyhow, bail, Context, Result};
use strategy_core::actions;
use strategy_core::RegistryEngine;
use strategy_types::hashing::{hash_strategy_with, hash_token_group_with};
use strategy_types::{
	parse_strategy_steps, Address, HashScheme, NewRiskProfile, PoolRatingRange, RegistryConfig,
	Resolution, StrategyRef,
};

pub fn validate(config: &RegistryConfig) -> Result<()> {
	println!("Configuration is valid");
	println!("Registry name: {}", config.registry.name);
	println!("Hash scheme: {}", config.registry.hash_scheme());
	println!("Step flags: {:?}", config.registry.step_flags);
	println!("Storage backend: {}", config.storage.backend);
	println!("Seed risk profiles: {}", config.risk_profiles.len());
	Ok(())
}

pub async fn run(engine: &RegistryEngine, caller: Option<Address>, command: &Command) -> Result<()> {
	let scheme = engine.hash_scheme();
	let require_caller = || caller.ok_or_else(|| anyhow!("No caller: pass --caller or set registry.caller"));

	match command {
		Command::Validate => validate(engine.config()),

		Command::Setup => {
			let added = engine.seed_risk_profiles(require_caller()?).await?;
			println!("Added {} risk profile(s)", added);
			Ok(())
		}

		Command::HashTokens { tokens, legacy } => {
			let scheme = if *legacy { HashScheme::Legacy } else { scheme };
			println!("{}", hash_token_group_with(scheme, tokens));
			Ok(())
		}

		Command::ApproveToken { token } => {
			engine.tokens().approve_token(require_caller()?, *token).await?;
			println!("Approved {}", token);
			Ok(())
		}

		Command::ApproveTokens { tokens } => {
			engine.tokens().approve_tokens(require_caller()?, tokens).await?;
			println!("Approved {} token(s)", tokens.len());
			Ok(())
		}

		Command::MapTokens { tokens } => {
			let token_hash = actions::ensure_token_hash_set(engine, require_caller()?, tokens, scheme).await?;
			println!("{}", token_hash);
			Ok(())
		}

		Command::AddRiskProfile {
			code,
			name,
			symbol,
			can_borrow,
			lower,
			upper,
		} => {
			let index = engine
				.risk_profiles()
				.add_risk_profile(
					require_caller()?,
					NewRiskProfile {
						code: *code,
						name: name.clone(),
						symbol: symbol.clone(),
						can_borrow: *can_borrow,
						pool_rating: PoolRatingRange::new(*lower, *upper),
					},
				)
				.await?;
			println!("Added risk profile {} at index {}", code, index);
			Ok(())
		}

		Command::AddStrategy { underlying, steps } => {
			let steps = parse_strategy_steps(steps).context("Invalid strategy steps")?;
			let hash = hash_strategy_with(scheme, &steps, *underlying);
			let index = engine
				.strategies()
				.add_strategy(require_caller()?, hash, &steps)
				.await?;
			println!("{} (index {})", hash, index);
			Ok(())
		}

		Command::DeleteStrategy { hash } => {
			engine.strategies().delete_strategy(require_caller()?, *hash).await?;
			println!("Deleted {}", hash);
			Ok(())
		}

		Command::GetAllStrategies => {
			for hash in engine.strategies().get_all_strategies().await? {
				let steps = engine.strategies().get_strategy_steps(hash).await?;
				println!("{} {}", hash, serde_json::to_string(&steps)?);
			}
			Ok(())
		}

		Command::ApproveLiquidityPool { pool } => {
			engine.pools().approve_liquidity_pool(require_caller()?, *pool).await?;
			println!("Approved liquidity pool {}", pool);
			Ok(())
		}

		Command::RateLiquidityPool { pool, rating } => {
			engine
				.pools()
				.rate_liquidity_pool(require_caller()?, *pool, *rating)
				.await?;
			println!("Rated {} at {}", pool, rating);
			Ok(())
		}

		Command::MapLiquidityPoolAdapter {
			pool,
			adapter,
			approve,
		} => {
			let pools = engine.pools();
			if *approve {
				pools
					.approve_liquidity_pool_and_map_to_adapter(require_caller()?, *pool, *adapter)
					.await?;
			} else {
				pools
					.set_liquidity_pool_to_adapter(require_caller()?, *pool, *adapter)
					.await?;
			}
			println!("Mapped {} to adapter {}", pool, adapter);
			Ok(())
		}

		Command::ApproveSwapPool { pool } => {
			engine.pools().approve_swap_pool(require_caller()?, *pool).await?;
			println!("Approved swap pool {}", pool);
			Ok(())
		}

		Command::RateSwapPool { pool, rating } => {
			engine
				.pools()
				.rate_swap_pool(require_caller()?, *pool, *rating)
				.await?;
			println!("Rated swap pool {} at {}", pool, rating);
			Ok(())
		}

		Command::ApproveCreditPool { pool } => {
			engine.pools().approve_credit_pool(require_caller()?, *pool).await?;
			println!("Approved credit pool {}", pool);
			Ok(())
		}

		Command::RateCreditPool { pool, rating } => {
			engine
				.pools()
				.rate_credit_pool(require_caller()?, *pool, *rating)
				.await?;
			println!("Rated credit pool {} at {}", pool, rating);
			Ok(())
		}

		Command::SetBestStrategy {
			risk_profile,
			tokens,
			hash,
			steps,
			default,
		} => {
			let strategy = match (hash, steps) {
				(Some(hash), _) => StrategyRef::Hash(*hash),
				(None, Some(steps)) => StrategyRef::Inline(
					parse_strategy_steps(steps).context("Invalid strategy steps")?,
				),
				(None, None) => bail!("Pass either --hash or --steps"),
			};
			let token_hash = hash_token_group_with(scheme, tokens);
			let provider = engine.provider();
			if *default {
				provider
					.set_best_default_strategy(require_caller()?, *risk_profile, token_hash, strategy)
					.await?;
			} else {
				provider
					.set_best_strategy(require_caller()?, *risk_profile, token_hash, strategy)
					.await?;
			}
			println!("Updated risk profile {} / {}", risk_profile, token_hash);
			Ok(())
		}

		Command::GetBestStrategy {
			risk_profile,
			tokens,
			default,
		} => {
			let token_hash = hash_token_group_with(scheme, tokens);
			let provider = engine.provider();
			let steps = if *default {
				provider
					.get_rp_to_token_to_default_strategy(*risk_profile, token_hash)
					.await?
			} else {
				provider
					.get_rp_to_token_to_best_strategy(*risk_profile, token_hash)
					.await?
			};
			println!(
				"{}",
				serde_json::to_string_pretty(&steps).context("Failed to encode steps")?
			);
			Ok(())
		}

		Command::SetDefaultStrategyState { state } => {
			engine
				.provider()
				.set_default_strategy_state(require_caller()?, *state)
				.await?;
			println!("Default strategy state: {}", state);
			Ok(())
		}

		Command::Resolve {
			risk_profile,
			tokens,
		} => {
			let token_hash = hash_token_group_with(scheme, tokens);
			let resolution = engine.provider().resolve(*risk_profile, token_hash).await?;
			let source = match &resolution {
				Resolution::Best(_) => "best".to_string(),
				Resolution::Default(_) => "default".to_string(),
				Resolution::AprOracle(hash, _) => format!("apr-oracle {}", hash),
				Resolution::Hold => "hold".to_string(),
			};
			println!("{}", source);
			println!(
				"{}",
				serde_json::to_string_pretty(resolution.steps()).context("Failed to encode steps")?
			);
			Ok(())
		}
	}
}
