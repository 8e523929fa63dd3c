//! Strategy provider and resolver.
//!
//! Each (risk profile, token hash) pair has two operator slots, "best" and
//! "default". Resolution prefers an eligible best strategy, then falls back
//! to the default slot or the APR oracle depending on the provider state,
//! and finally to holding funds uninvested.

use crate::ledger::{Ledger, Transaction};
use crate::oracle::AprOracle;
use crate::pools::LiquidityPoolRegistry;
use crate::risk_profiles::RiskProfileRegistry;
use crate::strategies::StrategyRegistry;
use crate::tokens::TokenIndex;
use std::sync::Arc;
use strategy_types::{
	Address, DefaultStrategyState, PoolKind, ProviderEvent, RegistryError, RegistryEvent,
	Resolution, Result, RiskProfile, Role, StepFlagSemantics, StrategyRef, StrategyStep,
	TokenHash, VaultRewardStrategy,
};
use tracing::{debug, info, warn};

const BEST_STRATEGIES: &str = "best_strategy";
const DEFAULT_STRATEGIES: &str = "default_strategy";
const VAULT_REWARD_STRATEGIES: &str = "vault_reward_strategy";
const PROVIDER: &str = "provider";
const DEFAULT_STRATEGY_STATE: &str = "default_strategy_state";

#[derive(Debug, Clone, Copy)]
enum Slot {
	Best,
	Default,
}

impl Slot {
	fn namespace(self) -> &'static str {
		match self {
			Slot::Best => BEST_STRATEGIES,
			Slot::Default => DEFAULT_STRATEGIES,
		}
	}

	fn event(self, risk_profile_code: u64, token_hash: TokenHash, caller: Address) -> ProviderEvent {
		match self {
			Slot::Best => ProviderEvent::BestStrategySet {
				risk_profile_code,
				token_hash,
				caller,
			},
			Slot::Default => ProviderEvent::DefaultStrategySet {
				risk_profile_code,
				token_hash,
				caller,
			},
		}
	}
}

fn slot_id(risk_profile_code: u64, token_hash: TokenHash) -> String {
	format!("{}-{}", risk_profile_code, token_hash)
}

pub struct StrategyProvider {
	ledger: Arc<Ledger>,
	strategies: Arc<StrategyRegistry>,
	tokens: Arc<TokenIndex>,
	risk_profiles: Arc<RiskProfileRegistry>,
	pools: Arc<LiquidityPoolRegistry>,
	oracle: Option<Arc<dyn AprOracle>>,
	step_flags: StepFlagSemantics,
}

impl StrategyProvider {
	pub fn new(
		ledger: Arc<Ledger>,
		strategies: Arc<StrategyRegistry>,
		tokens: Arc<TokenIndex>,
		risk_profiles: Arc<RiskProfileRegistry>,
		pools: Arc<LiquidityPoolRegistry>,
		oracle: Option<Arc<dyn AprOracle>>,
		step_flags: StepFlagSemantics,
	) -> Self {
		Self {
			ledger,
			strategies,
			tokens,
			risk_profiles,
			pools,
			oracle,
			step_flags,
		}
	}

	pub async fn set_best_strategy(
		&self,
		caller: Address,
		risk_profile_code: u64,
		token_hash: TokenHash,
		strategy: StrategyRef,
	) -> Result<()> {
		self.set_slot(Slot::Best, caller, risk_profile_code, token_hash, strategy)
			.await
	}

	pub async fn set_best_default_strategy(
		&self,
		caller: Address,
		risk_profile_code: u64,
		token_hash: TokenHash,
		strategy: StrategyRef,
	) -> Result<()> {
		self.set_slot(Slot::Default, caller, risk_profile_code, token_hash, strategy)
			.await
	}

	/// An empty strategy clears the slot.
	async fn set_slot(
		&self,
		slot: Slot,
		caller: Address,
		risk_profile_code: u64,
		token_hash: TokenHash,
		strategy: StrategyRef,
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::StrategyOperator).await?;

		let profile = self
			.risk_profiles
			.get_active(risk_profile_code)
			.await?
			.ok_or(RegistryError::UnknownRiskProfile(risk_profile_code))?;
		if !self.tokens.is_registered(token_hash).await? {
			return Err(RegistryError::TokenHashNotSet(token_hash));
		}

		let id = slot_id(risk_profile_code, token_hash);
		let mut tx = Transaction::new();
		if strategy.is_empty() {
			tx.delete(slot.namespace(), &id);
		} else {
			let steps = match &strategy {
				StrategyRef::Hash(hash) => self
					.strategies
					.get_strategy(*hash)
					.await?
					.map(|entry| entry.steps)
					.ok_or_else(|| RegistryError::NotFound(format!("strategy {}", hash)))?,
				StrategyRef::Inline(steps) => steps.clone(),
			};
			if self.borrows_without_permission(&profile, &steps) {
				return Err(RegistryError::InvalidInput(format!(
					"risk profile {} cannot borrow",
					risk_profile_code
				)));
			}
			tx.put(slot.namespace(), &id, &strategy)?;
		}
		tx.emit(RegistryEvent::Provider(slot.event(
			risk_profile_code,
			token_hash,
			caller,
		)));
		self.ledger.commit(tx).await?;

		info!(
			"Set {:?} strategy for risk profile {} and token hash {}",
			slot, risk_profile_code, token_hash
		);
		Ok(())
	}

	/// Raw content of the best slot.
	pub async fn get_best_strategy_ref(
		&self,
		risk_profile_code: u64,
		token_hash: TokenHash,
	) -> Result<Option<StrategyRef>> {
		self.ledger
			.get(BEST_STRATEGIES, &slot_id(risk_profile_code, token_hash))
			.await
	}

	/// Raw content of the default slot.
	pub async fn get_default_strategy_ref(
		&self,
		risk_profile_code: u64,
		token_hash: TokenHash,
	) -> Result<Option<StrategyRef>> {
		self.ledger
			.get(DEFAULT_STRATEGIES, &slot_id(risk_profile_code, token_hash))
			.await
	}

	pub async fn get_rp_to_token_to_best_strategy(
		&self,
		risk_profile_code: u64,
		token_hash: TokenHash,
	) -> Result<Vec<StrategyStep>> {
		let slot = self
			.get_best_strategy_ref(risk_profile_code, token_hash)
			.await?;
		self.steps_of(slot).await
	}

	pub async fn get_rp_to_token_to_default_strategy(
		&self,
		risk_profile_code: u64,
		token_hash: TokenHash,
	) -> Result<Vec<StrategyStep>> {
		let slot = self
			.get_default_strategy_ref(risk_profile_code, token_hash)
			.await?;
		self.steps_of(slot).await
	}

	/// A hash whose strategy was deleted after pinning reads as empty.
	async fn steps_of(&self, slot: Option<StrategyRef>) -> Result<Vec<StrategyStep>> {
		match slot {
			Some(StrategyRef::Hash(hash)) => self.strategies.get_strategy_steps(hash).await,
			Some(StrategyRef::Inline(steps)) => Ok(steps),
			None => Ok(Vec::new()),
		}
	}

	pub async fn default_strategy_state(&self) -> Result<DefaultStrategyState> {
		Ok(self
			.ledger
			.get(PROVIDER, DEFAULT_STRATEGY_STATE)
			.await?
			.unwrap_or_default())
	}

	pub async fn set_default_strategy_state(
		&self,
		caller: Address,
		state: DefaultStrategyState,
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::StrategyOperator).await?;

		let mut tx = Transaction::new();
		tx.put(PROVIDER, DEFAULT_STRATEGY_STATE, &state)?;
		tx.emit(RegistryEvent::Provider(
			ProviderEvent::DefaultStrategyStateChanged { state, caller },
		));
		self.ledger.commit(tx).await?;

		info!("Default strategy state set to {}", state);
		Ok(())
	}

	pub async fn get_vault_reward_strategy(&self, token_hash: TokenHash) -> Result<VaultRewardStrategy> {
		Ok(self
			.ledger
			.get(VAULT_REWARD_STRATEGIES, &token_hash.to_string())
			.await?
			.unwrap_or_default())
	}

	/// `hold + convert` must be the full 10 000 bps, or both zero to clear.
	pub async fn set_vault_reward_strategy(
		&self,
		caller: Address,
		token_hash: TokenHash,
		strategy: VaultRewardStrategy,
	) -> Result<VaultRewardStrategy> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::StrategyOperator).await?;

		if !self.tokens.is_registered(token_hash).await? {
			return Err(RegistryError::TokenHashNotSet(token_hash));
		}
		let total = strategy.hold.checked_add(strategy.convert);
		if total != Some(0) && total != Some(VaultRewardStrategy::TOTAL_BPS) {
			return Err(RegistryError::InvalidInput(format!(
				"reward split must add up to {} bps",
				VaultRewardStrategy::TOTAL_BPS
			)));
		}

		let mut tx = Transaction::new();
		tx.put(VAULT_REWARD_STRATEGIES, &token_hash.to_string(), &strategy)?;
		tx.emit(RegistryEvent::Provider(
			ProviderEvent::VaultRewardStrategySet {
				token_hash,
				strategy,
				caller,
			},
		));
		self.ledger.commit(tx).await?;

		info!(
			"Vault reward strategy for {}: hold {} convert {}",
			token_hash, strategy.hold, strategy.convert
		);
		Ok(strategy)
	}

	/// Picks the strategy a vault of `risk_profile_code` should run for
	/// `token_hash`.
	pub async fn resolve(&self, risk_profile_code: u64, token_hash: TokenHash) -> Result<Resolution> {
		let profile = self
			.risk_profiles
			.get_active(risk_profile_code)
			.await?
			.ok_or(RegistryError::UnknownRiskProfile(risk_profile_code))?;

		let best = self
			.get_rp_to_token_to_best_strategy(risk_profile_code, token_hash)
			.await?;
		if self.is_eligible(&profile, &best).await? {
			return Ok(Resolution::Best(best));
		}

		match self.default_strategy_state().await? {
			DefaultStrategyState::DefaultSlot => {
				let default = self
					.get_rp_to_token_to_default_strategy(risk_profile_code, token_hash)
					.await?;
				if self.is_eligible(&profile, &default).await? {
					return Ok(Resolution::Default(default));
				}
			}
			DefaultStrategyState::AprOracle => {
				if let Some(resolution) = self.resolve_from_oracle(&profile, token_hash).await? {
					return Ok(resolution);
				}
			}
		}

		debug!(
			"No eligible strategy for risk profile {} and token hash {}",
			risk_profile_code, token_hash
		);
		Ok(Resolution::Hold)
	}

	async fn resolve_from_oracle(
		&self,
		profile: &RiskProfile,
		token_hash: TokenHash,
	) -> Result<Option<Resolution>> {
		let Some(oracle) = &self.oracle else {
			warn!("Default strategy state is apr-oracle but no oracle is configured");
			return Ok(None);
		};
		let hash = match oracle.best_apr(&token_hash).await {
			Ok(Some(hash)) => hash,
			Ok(None) => return Ok(None),
			Err(e) => {
				warn!("APR oracle failed for {}: {}", token_hash, e);
				return Ok(None);
			}
		};

		let steps = self.strategies.get_strategy_steps(hash).await?;
		if self.is_eligible(profile, &steps).await? {
			Ok(Some(Resolution::AprOracle(hash, steps)))
		} else {
			Ok(None)
		}
	}

	/// A strategy is eligible when it is non-empty, every step goes through an
	/// approved pool rated inside the profile's range, and it only borrows
	/// if the profile allows it. Flagged steps are checked against the swap
	/// or credit pool registry depending on the step flag semantics.
	async fn is_eligible(&self, profile: &RiskProfile, steps: &[StrategyStep]) -> Result<bool> {
		if steps.is_empty() || self.borrows_without_permission(profile, steps) {
			return Ok(false);
		}
		for step in steps {
			let (kind, approved, rating) = self.pool_status(step).await?;
			if !approved || !profile.pool_rating_range.contains(rating) {
				debug!(
					"{} pool {} (rating {}) not eligible for risk profile {}",
					kind, step.pool, rating, profile.code
				);
				return Ok(false);
			}
		}
		Ok(true)
	}

	async fn pool_status(&self, step: &StrategyStep) -> Result<(PoolKind, bool, u8)> {
		if !step.is_borrow {
			let pool = self.pools.get_liquidity_pool(step.pool).await?;
			return Ok((PoolKind::Liquidity, pool.is_liquidity_pool, pool.rating));
		}
		let (kind, pool) = match self.step_flags {
			StepFlagSemantics::Swap => (PoolKind::Swap, self.pools.get_swap_pool(step.pool).await?),
			StepFlagSemantics::Borrow => (
				PoolKind::Credit,
				self.pools.get_credit_pool(step.pool).await?,
			),
		};
		Ok((kind, pool.is_approved, pool.rating))
	}

	fn borrows_without_permission(&self, profile: &RiskProfile, steps: &[StrategyStep]) -> bool {
		self.step_flags == StepFlagSemantics::Borrow
			&& !profile.can_borrow
			&& steps.iter().any(|step| step.is_borrow)
	}
}

#[cfg(test)]
mod tests {
	use crate::test_support::*;
	use crate::{RegistryEngine, StaticAprOracle};
	use std::sync::Arc;
	use strategy_types::hashing::{hash_strategy, hash_token_group};
	use strategy_types::{
		ChainId, DefaultStrategyState, ProviderEvent, RegistryError, RegistryEvent, Resolution,
		StepFlagSemantics, StrategyHash, StrategyRef, TokenHash, VaultRewardStrategy, B256,
	};

	/// Registers profile 1 (non-borrowing, ratings 0..=10), the single-token
	/// group of token(1), and approved pools 1..=3 rated 5.
	async fn setup(engine: &RegistryEngine) -> TokenHash {
		engine
			.risk_profiles()
			.add_risk_profile(owner(), profile(1, false, 0, 10))
			.await
			.unwrap();
		let token_hash = hash_token_group(&[token(1)], ChainId::ETHEREUM);
		engine
			.tokens()
			.approve_token_and_map_to_tokens_hash(owner(), token_hash, &[token(1)])
			.await
			.unwrap();
		for n in 1..=3 {
			engine
				.pools()
				.approve_liquidity_pool(owner(), pool(n))
				.await
				.unwrap();
			engine
				.pools()
				.rate_liquidity_pool(owner(), pool(n), 5)
				.await
				.unwrap();
		}
		token_hash
	}

	#[tokio::test]
	async fn test_unknown_profile_and_token_hash() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let provider = engine.provider();

		let result = provider
			.set_best_strategy(owner(), 9, token_hash, StrategyRef::Inline(vec![step(1, false)]))
			.await;
		assert_eq!(result, Err(RegistryError::UnknownRiskProfile(9)));

		let unknown = TokenHash(B256::repeat_byte(9));
		let result = provider
			.set_best_strategy(owner(), 1, unknown, StrategyRef::Inline(vec![step(1, false)]))
			.await;
		assert_eq!(result, Err(RegistryError::TokenHashNotSet(unknown)));
	}

	#[tokio::test]
	async fn test_hash_and_inline_read_the_same() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let steps = vec![step(1, false), step(2, false)];
		let hash = hash_strategy(&steps, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();

		let provider = engine.provider();
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Hash(hash))
			.await
			.unwrap();
		provider
			.set_best_default_strategy(owner(), 1, token_hash, StrategyRef::Inline(steps.clone()))
			.await
			.unwrap();

		assert_eq!(
			provider
				.get_rp_to_token_to_best_strategy(1, token_hash)
				.await
				.unwrap(),
			steps
		);
		assert_eq!(
			provider
				.get_rp_to_token_to_default_strategy(1, token_hash)
				.await
				.unwrap(),
			steps
		);
		assert_eq!(
			provider.get_best_strategy_ref(1, token_hash).await.unwrap(),
			Some(StrategyRef::Hash(hash))
		);
	}

	#[tokio::test]
	async fn test_pinning_missing_hash_fails() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let result = engine
			.provider()
			.set_best_strategy(
				owner(),
				1,
				token_hash,
				StrategyRef::Hash(StrategyHash(B256::repeat_byte(4))),
			)
			.await;
		assert!(matches!(result, Err(RegistryError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_empty_strategy_clears_slot() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let mut events = engine.subscribe();
		let provider = engine.provider();

		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(vec![step(1, false)]))
			.await
			.unwrap();
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(Vec::new()))
			.await
			.unwrap();
		assert_eq!(provider.get_best_strategy_ref(1, token_hash).await.unwrap(), None);

		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(vec![step(1, false)]))
			.await
			.unwrap();
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Hash(StrategyHash::ZERO))
			.await
			.unwrap();
		assert!(provider
			.get_rp_to_token_to_best_strategy(1, token_hash)
			.await
			.unwrap()
			.is_empty());

		let set = RegistryEvent::Provider(ProviderEvent::BestStrategySet {
			risk_profile_code: 1,
			token_hash,
			caller: owner(),
		});
		assert_eq!(drain(&mut events), vec![set.clone(), set.clone(), set.clone(), set]);
	}

	#[tokio::test]
	async fn test_borrow_step_rejected_for_non_borrowing_profile() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let result = engine
			.provider()
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(vec![step(1, true)]))
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
	}

	#[tokio::test]
	async fn test_swap_steps_need_a_rated_swap_pool() {
		let engine = engine_with(StepFlagSemantics::Swap, Arc::new(StaticAprOracle::new()));
		let token_hash = setup(&engine).await;
		let steps = vec![step(1, false), step(9, true)];
		let provider = engine.provider();
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(steps.clone()))
			.await
			.unwrap();

		// Not an approved swap pool yet.
		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);

		// Approving it as a liquidity pool does not count.
		engine
			.pools()
			.approve_liquidity_pool(owner(), pool(9))
			.await
			.unwrap();
		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);

		engine.pools().approve_swap_pool(owner(), pool(9)).await.unwrap();
		engine.pools().rate_swap_pool(owner(), pool(9), 50).await.unwrap();
		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);

		engine.pools().rate_swap_pool(owner(), pool(9), 4).await.unwrap();
		assert_eq!(
			provider.resolve(1, token_hash).await.unwrap(),
			Resolution::Best(steps)
		);

		engine.pools().revoke_swap_pool(owner(), pool(9)).await.unwrap();
		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);
	}

	#[tokio::test]
	async fn test_borrow_steps_need_a_rated_credit_pool() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		engine
			.risk_profiles()
			.add_risk_profile(owner(), profile(2, true, 0, 10))
			.await
			.unwrap();
		let steps = vec![step(1, false), step(8, true)];
		let provider = engine.provider();
		provider
			.set_best_strategy(owner(), 2, token_hash, StrategyRef::Inline(steps.clone()))
			.await
			.unwrap();
		assert_eq!(provider.resolve(2, token_hash).await.unwrap(), Resolution::Hold);

		engine.pools().approve_credit_pool(owner(), pool(8)).await.unwrap();
		engine.pools().rate_credit_pool(owner(), pool(8), 3).await.unwrap();
		assert_eq!(
			provider.resolve(2, token_hash).await.unwrap(),
			Resolution::Best(steps)
		);

		engine.pools().revoke_credit_pool(owner(), pool(8)).await.unwrap();
		assert_eq!(provider.resolve(2, token_hash).await.unwrap(), Resolution::Hold);
	}

	#[tokio::test]
	async fn test_resolve_falls_back_to_default() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let provider = engine.provider();
		let default = vec![step(1, false)];

		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);

		provider
			.set_best_default_strategy(owner(), 1, token_hash, StrategyRef::Inline(default.clone()))
			.await
			.unwrap();
		assert_eq!(
			provider.resolve(1, token_hash).await.unwrap(),
			Resolution::Default(default.clone())
		);

		let best = vec![step(2, false)];
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(best.clone()))
			.await
			.unwrap();
		assert_eq!(
			provider.resolve(1, token_hash).await.unwrap(),
			Resolution::Best(best)
		);
	}

	#[tokio::test]
	async fn test_ineligible_best_falls_through() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let provider = engine.provider();
		let best = vec![step(2, false)];
		let default = vec![step(1, false)];
		provider
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Inline(best))
			.await
			.unwrap();
		provider
			.set_best_default_strategy(owner(), 1, token_hash, StrategyRef::Inline(default.clone()))
			.await
			.unwrap();

		// Pool 2 leaves the profile's range.
		engine
			.pools()
			.rate_liquidity_pool(owner(), pool(2), 50)
			.await
			.unwrap();
		assert_eq!(
			provider.resolve(1, token_hash).await.unwrap(),
			Resolution::Default(default)
		);

		// Pool 1 revoked: nothing eligible is left.
		engine
			.pools()
			.revoke_liquidity_pool(owner(), pool(1))
			.await
			.unwrap();
		assert_eq!(provider.resolve(1, token_hash).await.unwrap(), Resolution::Hold);
	}

	#[tokio::test]
	async fn test_deleted_strategy_reads_empty() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();
		engine
			.provider()
			.set_best_strategy(owner(), 1, token_hash, StrategyRef::Hash(hash))
			.await
			.unwrap();
		engine
			.strategies()
			.delete_strategy(owner(), hash)
			.await
			.unwrap();

		assert!(engine
			.provider()
			.get_rp_to_token_to_best_strategy(1, token_hash)
			.await
			.unwrap()
			.is_empty());
		assert_eq!(
			engine.provider().resolve(1, token_hash).await.unwrap(),
			Resolution::Hold
		);
	}

	#[tokio::test]
	async fn test_resolve_from_apr_oracle() {
		let oracle = Arc::new(StaticAprOracle::new());
		let engine = engine_with(StepFlagSemantics::Borrow, oracle.clone());
		let token_hash = setup(&engine).await;
		let steps = vec![step(3, false)];
		let hash = hash_strategy(&steps, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();
		oracle.set_score(token_hash, hash);

		let provider = engine.provider();
		provider
			.set_best_default_strategy(owner(), 1, token_hash, StrategyRef::Inline(vec![step(1, false)]))
			.await
			.unwrap();
		provider
			.set_default_strategy_state(owner(), DefaultStrategyState::AprOracle)
			.await
			.unwrap();

		assert_eq!(
			provider.default_strategy_state().await.unwrap(),
			DefaultStrategyState::AprOracle
		);
		assert_eq!(
			provider.resolve(1, token_hash).await.unwrap(),
			Resolution::AprOracle(hash, steps)
		);
	}

	#[tokio::test]
	async fn test_resolve_unknown_profile() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		assert_eq!(
			engine.provider().resolve(7, token_hash).await,
			Err(RegistryError::UnknownRiskProfile(7))
		);
	}

	#[tokio::test]
	async fn test_vault_reward_strategy() {
		let engine = engine();
		let token_hash = setup(&engine).await;
		let provider = engine.provider();

		let split = VaultRewardStrategy {
			hold: 4_000,
			convert: 6_000,
		};
		provider
			.set_vault_reward_strategy(owner(), token_hash, split)
			.await
			.unwrap();
		assert_eq!(
			provider.get_vault_reward_strategy(token_hash).await.unwrap(),
			split
		);

		let result = provider
			.set_vault_reward_strategy(
				owner(),
				token_hash,
				VaultRewardStrategy {
					hold: 5_000,
					convert: 6_000,
				},
			)
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));

		let result = provider
			.set_vault_reward_strategy(owner(), TokenHash(B256::repeat_byte(9)), split)
			.await;
		assert!(matches!(result, Err(RegistryError::TokenHashNotSet(_))));
	}

	#[tokio::test]
	async fn test_requires_strategy_operator() {
		let engine = engine();
		let result = engine
			.provider()
			.set_default_strategy_state(stranger(), DefaultStrategyState::AprOracle)
			.await;
		assert!(matches!(
			result,
			Err(RegistryError::PermissionDenied { .. })
		));
	}
}
