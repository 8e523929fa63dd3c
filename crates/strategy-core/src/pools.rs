//! Pool approval, rating and adapter mapping.
//!
//! Three registries live here. Liquidity pools back deposit steps and carry
//! an adapter. Swap pools back swap steps and credit pools back borrow steps.
//! Resolution only routes funds through approved pools whose rating falls
//! inside the risk profile's range.

use crate::ledger::{Ledger, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use strategy_types::{
	Address, LiquidityPool, PoolEvent, PoolKind, RatedPool, RegistryError, RegistryEvent, Result,
	Role,
};
use tracing::info;

const POOLS: &str = "liquidity_pool";
const SWAP_POOLS: &str = "swap_pool";
const CREDIT_POOLS: &str = "credit_pool";

fn rated_namespace(kind: PoolKind) -> &'static str {
	match kind {
		PoolKind::Swap => SWAP_POOLS,
		PoolKind::Credit => CREDIT_POOLS,
		PoolKind::Liquidity => POOLS,
	}
}

pub struct LiquidityPoolRegistry {
	ledger: Arc<Ledger>,
}

impl LiquidityPoolRegistry {
	pub fn new(ledger: Arc<Ledger>) -> Self {
		Self { ledger }
	}

	/// Registry view of `pool`; unknown pools read as unapproved and unrated.
	pub async fn get_liquidity_pool(&self, pool: Address) -> Result<LiquidityPool> {
		Ok(self
			.ledger
			.get(POOLS, &pool.to_string())
			.await?
			.unwrap_or_default())
	}

	pub async fn approve_liquidity_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.approve_liquidity_pools(caller, &[pool]).await
	}

	pub async fn approve_liquidity_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_approval(caller, pools, true).await
	}

	pub async fn revoke_liquidity_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.revoke_liquidity_pools(caller, &[pool]).await
	}

	/// Rating and adapter survive a revoke.
	pub async fn revoke_liquidity_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_approval(caller, pools, false).await
	}

	async fn set_approval(&self, caller: Address, pools: &[Address], enabled: bool) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut staged: HashMap<Address, LiquidityPool> = HashMap::new();
		let mut tx = Transaction::new();
		for pool in pools {
			ensure_pool_address(PoolKind::Liquidity, *pool)?;
			if staged.contains_key(pool) {
				continue;
			}
			let mut state = self.get_liquidity_pool(*pool).await?;
			if state.is_liquidity_pool == enabled {
				continue;
			}
			state.is_liquidity_pool = enabled;
			tx.put(POOLS, &pool.to_string(), &state)?;
			tx.emit(RegistryEvent::Pool(PoolEvent::Approval {
				kind: PoolKind::Liquidity,
				pool: *pool,
				enabled,
				caller,
			}));
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		if !staged.is_empty() {
			info!(
				"{} {} liquidity pool(s)",
				if enabled { "Approved" } else { "Revoked" },
				staged.len()
			);
		}
		Ok(())
	}

	pub async fn rate_liquidity_pool(&self, caller: Address, pool: Address, rating: u8) -> Result<()> {
		self.rate_liquidity_pools(caller, &[(pool, rating)]).await
	}

	/// Every pool must be approved. A pool listed twice keeps its last rating.
	pub async fn rate_liquidity_pools(&self, caller: Address, ratings: &[(Address, u8)]) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		let mut staged: HashMap<Address, LiquidityPool> = HashMap::new();
		let mut tx = Transaction::new();
		for (pool, rating) in ratings {
			let mut state = match staged.get(pool) {
				Some(state) => *state,
				None => self.require_approved(*pool).await?,
			};
			state.rating = *rating;
			tx.put(POOLS, &pool.to_string(), &state)?;
			tx.emit(RegistryEvent::Pool(PoolEvent::Rated {
				kind: PoolKind::Liquidity,
				pool: *pool,
				rating: *rating,
				caller,
			}));
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		info!("Rated {} liquidity pool(s)", ratings.len());
		Ok(())
	}

	pub async fn set_liquidity_pool_to_adapter(
		&self,
		caller: Address,
		pool: Address,
		adapter: Address,
	) -> Result<()> {
		self.set_liquidity_pools_to_adapters(caller, &[(pool, adapter)])
			.await
	}

	pub async fn set_liquidity_pools_to_adapters(
		&self,
		caller: Address,
		mappings: &[(Address, Address)],
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut staged: HashMap<Address, LiquidityPool> = HashMap::new();
		let mut tx = Transaction::new();
		for (pool, adapter) in mappings {
			let state = match staged.get(pool) {
				Some(state) => *state,
				None => self.require_approved(*pool).await?,
			};
			let state = stage_adapter(&mut tx, caller, *pool, *adapter, state)?;
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		info!("Mapped {} liquidity pool adapter(s)", mappings.len());
		Ok(())
	}

	pub async fn approve_liquidity_pool_and_map_to_adapter(
		&self,
		caller: Address,
		pool: Address,
		adapter: Address,
	) -> Result<()> {
		self.approve_liquidity_pools_and_map_to_adapters(caller, &[(pool, adapter)])
			.await
	}

	/// Approves each pool that is not yet approved and maps its adapter in one
	/// transaction. Nothing is written if any entry is rejected.
	pub async fn approve_liquidity_pools_and_map_to_adapters(
		&self,
		caller: Address,
		mappings: &[(Address, Address)],
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut staged: HashMap<Address, LiquidityPool> = HashMap::new();
		let mut tx = Transaction::new();
		for (pool, adapter) in mappings {
			ensure_pool_address(PoolKind::Liquidity, *pool)?;
			let mut state = match staged.get(pool) {
				Some(state) => *state,
				None => self.get_liquidity_pool(*pool).await?,
			};
			if !state.is_liquidity_pool {
				state.is_liquidity_pool = true;
				tx.emit(RegistryEvent::Pool(PoolEvent::Approval {
					kind: PoolKind::Liquidity,
					pool: *pool,
					enabled: true,
					caller,
				}));
			}
			let state = stage_adapter(&mut tx, caller, *pool, *adapter, state)?;
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		info!("Approved and mapped {} liquidity pool(s)", staged.len());
		Ok(())
	}

	async fn require_approved(&self, pool: Address) -> Result<LiquidityPool> {
		let state = self.get_liquidity_pool(pool).await?;
		if !state.is_liquidity_pool {
			return Err(RegistryError::NotFound(format!("liquidity pool {}", pool)));
		}
		Ok(state)
	}

	pub async fn get_swap_pool(&self, pool: Address) -> Result<RatedPool> {
		self.get_rated_pool(PoolKind::Swap, pool).await
	}

	pub async fn approve_swap_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.approve_swap_pools(caller, &[pool]).await
	}

	pub async fn approve_swap_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_rated_approval(PoolKind::Swap, caller, pools, true)
			.await
	}

	pub async fn revoke_swap_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.revoke_swap_pools(caller, &[pool]).await
	}

	pub async fn revoke_swap_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_rated_approval(PoolKind::Swap, caller, pools, false)
			.await
	}

	pub async fn rate_swap_pool(&self, caller: Address, pool: Address, rating: u8) -> Result<()> {
		self.rate_swap_pools(caller, &[(pool, rating)]).await
	}

	pub async fn rate_swap_pools(&self, caller: Address, ratings: &[(Address, u8)]) -> Result<()> {
		self.rate_rated_pools(PoolKind::Swap, caller, ratings).await
	}

	pub async fn get_credit_pool(&self, pool: Address) -> Result<RatedPool> {
		self.get_rated_pool(PoolKind::Credit, pool).await
	}

	pub async fn approve_credit_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.approve_credit_pools(caller, &[pool]).await
	}

	pub async fn approve_credit_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_rated_approval(PoolKind::Credit, caller, pools, true)
			.await
	}

	pub async fn revoke_credit_pool(&self, caller: Address, pool: Address) -> Result<()> {
		self.revoke_credit_pools(caller, &[pool]).await
	}

	pub async fn revoke_credit_pools(&self, caller: Address, pools: &[Address]) -> Result<()> {
		self.set_rated_approval(PoolKind::Credit, caller, pools, false)
			.await
	}

	pub async fn rate_credit_pool(&self, caller: Address, pool: Address, rating: u8) -> Result<()> {
		self.rate_credit_pools(caller, &[(pool, rating)]).await
	}

	pub async fn rate_credit_pools(&self, caller: Address, ratings: &[(Address, u8)]) -> Result<()> {
		self.rate_rated_pools(PoolKind::Credit, caller, ratings).await
	}

	async fn get_rated_pool(&self, kind: PoolKind, pool: Address) -> Result<RatedPool> {
		Ok(self
			.ledger
			.get(rated_namespace(kind), &pool.to_string())
			.await?
			.unwrap_or_default())
	}

	async fn set_rated_approval(
		&self,
		kind: PoolKind,
		caller: Address,
		pools: &[Address],
		enabled: bool,
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut staged: HashMap<Address, RatedPool> = HashMap::new();
		let mut tx = Transaction::new();
		for pool in pools {
			ensure_pool_address(kind, *pool)?;
			if staged.contains_key(pool) {
				continue;
			}
			let mut state = self.get_rated_pool(kind, *pool).await?;
			if state.is_approved == enabled {
				continue;
			}
			state.is_approved = enabled;
			tx.put(rated_namespace(kind), &pool.to_string(), &state)?;
			tx.emit(RegistryEvent::Pool(PoolEvent::Approval {
				kind,
				pool: *pool,
				enabled,
				caller,
			}));
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		if !staged.is_empty() {
			info!(
				"{} {} {} pool(s)",
				if enabled { "Approved" } else { "Revoked" },
				staged.len(),
				kind
			);
		}
		Ok(())
	}

	async fn rate_rated_pools(
		&self,
		kind: PoolKind,
		caller: Address,
		ratings: &[(Address, u8)],
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		let mut staged: HashMap<Address, RatedPool> = HashMap::new();
		let mut tx = Transaction::new();
		for (pool, rating) in ratings {
			let mut state = match staged.get(pool) {
				Some(state) => *state,
				None => {
					let state = self.get_rated_pool(kind, *pool).await?;
					if !state.is_approved {
						return Err(RegistryError::NotFound(format!("{} pool {}", kind, pool)));
					}
					state
				}
			};
			state.rating = *rating;
			tx.put(rated_namespace(kind), &pool.to_string(), &state)?;
			tx.emit(RegistryEvent::Pool(PoolEvent::Rated {
				kind,
				pool: *pool,
				rating: *rating,
				caller,
			}));
			staged.insert(*pool, state);
		}
		self.ledger.commit(tx).await?;

		info!("Rated {} {} pool(s)", ratings.len(), kind);
		Ok(())
	}
}

fn ensure_pool_address(kind: PoolKind, pool: Address) -> Result<()> {
	if pool == Address::ZERO {
		return Err(RegistryError::InvalidInput(format!(
			"zero address cannot be a {} pool",
			kind
		)));
	}
	Ok(())
}

fn stage_adapter(
	tx: &mut Transaction,
	caller: Address,
	pool: Address,
	adapter: Address,
	mut state: LiquidityPool,
) -> Result<LiquidityPool> {
	if adapter == Address::ZERO {
		return Err(RegistryError::InvalidInput(format!(
			"zero adapter for pool {}",
			pool
		)));
	}
	state.adapter = Some(adapter);
	tx.put(POOLS, &pool.to_string(), &state)?;
	tx.emit(RegistryEvent::Pool(PoolEvent::AdapterMapped {
		pool,
		adapter,
		caller,
	}));
	Ok(state)
}
