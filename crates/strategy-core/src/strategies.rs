//! Content-addressed strategy registry.
//!
//! A strategy is stored once under its hash and never overwritten. Deleting
//! it frees the hash for a later add, which gets a fresh index.

use crate::ledger::{Ledger, Transaction, INDEX_NAMESPACE};
use std::collections::HashSet;
use std::sync::Arc;
use strategy_types::{
	ensure_same_length, Address, RegistryError, RegistryEvent, Result, Role, StrategyEntry,
	StrategyEvent, StrategyHash, StrategyStep,
};
use tracing::info;

const STRATEGIES: &str = "strategy";
const STRATEGY_LIST: &str = "strategies";
const STRATEGY_COUNTER: &str = "strategy_counter";

pub struct StrategyRegistry {
	ledger: Arc<Ledger>,
}

impl StrategyRegistry {
	pub fn new(ledger: Arc<Ledger>) -> Self {
		Self { ledger }
	}

	pub async fn get_strategy(&self, hash: StrategyHash) -> Result<Option<StrategyEntry>> {
		self.ledger.get(STRATEGIES, &hash.to_string()).await
	}

	/// Steps stored under `hash`, empty when absent.
	pub async fn get_strategy_steps(&self, hash: StrategyHash) -> Result<Vec<StrategyStep>> {
		Ok(self
			.get_strategy(hash)
			.await?
			.map(|entry| entry.steps)
			.unwrap_or_default())
	}

	/// Hashes of every present strategy in insertion order.
	pub async fn get_all_strategies(&self) -> Result<Vec<StrategyHash>> {
		Ok(self
			.ledger
			.get(INDEX_NAMESPACE, STRATEGY_LIST)
			.await?
			.unwrap_or_default())
	}

	/// Number of strategies ever added, deleted ones included.
	pub async fn strategy_count(&self) -> Result<u64> {
		Ok(self
			.ledger
			.get(INDEX_NAMESPACE, STRATEGY_COUNTER)
			.await?
			.unwrap_or(0))
	}

	/// Returns the index assigned to the new strategy.
	pub async fn add_strategy(
		&self,
		caller: Address,
		hash: StrategyHash,
		steps: &[StrategyStep],
	) -> Result<u64> {
		let indexes = self
			.add_strategies(caller, &[hash], &[steps.to_vec()])
			.await?;
		Ok(indexes[0])
	}

	pub async fn add_strategies(
		&self,
		caller: Address,
		hashes: &[StrategyHash],
		steps: &[Vec<StrategyStep>],
	) -> Result<Vec<u64>> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;
		ensure_same_length(hashes.len(), steps.len())?;

		let mut counter = self.strategy_count().await?;
		let mut list = self.get_all_strategies().await?;
		let mut staged = HashSet::new();
		let mut indexes = Vec::with_capacity(hashes.len());
		let mut tx = Transaction::new();

		for (hash, steps) in hashes.iter().zip(steps) {
			if hash.is_zero() {
				return Err(RegistryError::InvalidInput(
					"strategy hash must not be zero".into(),
				));
			}
			if steps.is_empty() {
				return Err(RegistryError::InvalidInput(format!(
					"strategy {} has no steps",
					hash
				)));
			}
			if !staged.insert(*hash) || self.get_strategy(*hash).await?.is_some() {
				return Err(RegistryError::AlreadyExists(format!("strategy {}", hash)));
			}

			let entry = StrategyEntry {
				steps: steps.clone(),
				index: counter,
			};
			tx.put(STRATEGIES, &hash.to_string(), &entry)?;
			tx.emit(RegistryEvent::Strategy(StrategyEvent::Added {
				strategy_hash: *hash,
				index: counter,
				caller,
			}));
			list.push(*hash);
			indexes.push(counter);
			counter += 1;
		}

		if !indexes.is_empty() {
			tx.put(INDEX_NAMESPACE, STRATEGY_LIST, &list)?;
			tx.put(INDEX_NAMESPACE, STRATEGY_COUNTER, &counter)?;
		}
		self.ledger.commit(tx).await?;

		info!("Added {} strategy(ies)", indexes.len());
		Ok(indexes)
	}

	pub async fn delete_strategy(&self, caller: Address, hash: StrategyHash) -> Result<()> {
		self.delete_strategies(caller, &[hash]).await
	}

	pub async fn delete_strategies(&self, caller: Address, hashes: &[StrategyHash]) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut removed = HashSet::new();
		let mut tx = Transaction::new();
		for hash in hashes {
			// A hash repeated in the batch is already gone by its second use.
			if removed.contains(hash) || self.get_strategy(*hash).await?.is_none() {
				return Err(RegistryError::NotFound(format!("strategy {}", hash)));
			}
			tx.delete(STRATEGIES, &hash.to_string());
			tx.emit(RegistryEvent::Strategy(StrategyEvent::Removed {
				strategy_hash: *hash,
				caller,
			}));
			removed.insert(*hash);
		}

		if !removed.is_empty() {
			let mut list = self.get_all_strategies().await?;
			list.retain(|hash| !removed.contains(hash));
			tx.put(INDEX_NAMESPACE, STRATEGY_LIST, &list)?;
		}
		self.ledger.commit(tx).await?;

		info!("Deleted {} strategy(ies)", removed.len());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::test_support::*;
	use strategy_types::hashing::hash_strategy;
	use strategy_types::{RegistryError, RegistryEvent, StrategyEvent, StrategyHash, B256};

	#[tokio::test]
	async fn test_add_and_get() {
		let engine = engine();
		let steps = vec![step(1, false), step(2, false)];
		let hash = hash_strategy(&steps, token(1));

		let index = engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();
		assert_eq!(index, 0);
		assert_eq!(
			engine.strategies().get_strategy_steps(hash).await.unwrap(),
			steps
		);
		assert_eq!(
			engine.strategies().get_all_strategies().await.unwrap(),
			vec![hash]
		);
	}

	#[tokio::test]
	async fn test_no_overwrite() {
		let engine = engine();
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();

		let result = engine
			.strategies()
			.add_strategy(owner(), hash, &[step(2, false)])
			.await;
		assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
		assert_eq!(
			engine.strategies().get_strategy_steps(hash).await.unwrap(),
			steps
		);
	}

	#[tokio::test]
	async fn test_empty_steps_rejected() {
		let engine = engine();
		let hash = StrategyHash(B256::repeat_byte(7));
		let result = engine.strategies().add_strategy(owner(), hash, &[]).await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
		assert!(engine
			.strategies()
			.get_strategy_steps(hash)
			.await
			.unwrap()
			.is_empty());
		assert_eq!(engine.strategies().strategy_count().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_batch_with_empty_steps_adds_nothing() {
		let engine = engine();
		let mut events = engine.subscribe();
		let steps = vec![step(1, false)];
		let hash_a = hash_strategy(&steps, token(1));
		let hash_b = StrategyHash(B256::repeat_byte(8));

		let result = engine
			.strategies()
			.add_strategies(owner(), &[hash_a, hash_b], &[steps, Vec::new()])
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
		assert!(engine
			.strategies()
			.get_strategy_steps(hash_a)
			.await
			.unwrap()
			.is_empty());
		assert_eq!(engine.strategies().strategy_count().await.unwrap(), 0);
		assert!(engine
			.strategies()
			.get_all_strategies()
			.await
			.unwrap()
			.is_empty());
		assert!(drain(&mut events).is_empty());
	}

	#[tokio::test]
	async fn test_delete_twice() {
		let engine = engine();
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash, &steps)
			.await
			.unwrap();

		engine.strategies().delete_strategy(owner(), hash).await.unwrap();
		assert!(engine
			.strategies()
			.get_strategy_steps(hash)
			.await
			.unwrap()
			.is_empty());
		let result = engine.strategies().delete_strategy(owner(), hash).await;
		assert!(matches!(result, Err(RegistryError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_readd_gets_fresh_index() {
		let engine = engine();
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		let strategies = engine.strategies();

		assert_eq!(strategies.add_strategy(owner(), hash, &steps).await.unwrap(), 0);
		strategies.delete_strategy(owner(), hash).await.unwrap();
		assert_eq!(strategies.add_strategy(owner(), hash, &steps).await.unwrap(), 1);
		assert_eq!(strategies.strategy_count().await.unwrap(), 2);
		assert_eq!(strategies.get_all_strategies().await.unwrap(), vec![hash]);
	}

	#[tokio::test]
	async fn test_batch_is_atomic() {
		let engine = engine();
		let mut events = engine.subscribe();
		let a = vec![step(1, false)];
		let b = vec![step(2, false)];
		let hash_a = hash_strategy(&a, token(1));
		let hash_b = hash_strategy(&b, token(1));
		engine
			.strategies()
			.add_strategy(owner(), hash_b, &b)
			.await
			.unwrap();
		drain(&mut events);

		// Second entry collides, so the first must not land either.
		let result = engine
			.strategies()
			.add_strategies(owner(), &[hash_a, hash_b], &[a.clone(), b.clone()])
			.await;
		assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
		assert!(engine
			.strategies()
			.get_strategy(hash_a)
			.await
			.unwrap()
			.is_none());
		assert!(drain(&mut events).is_empty());

		let result = engine
			.strategies()
			.delete_strategies(owner(), &[hash_b, hash_a])
			.await;
		assert!(matches!(result, Err(RegistryError::NotFound(_))));
		assert!(engine
			.strategies()
			.get_strategy(hash_b)
			.await
			.unwrap()
			.is_some());
	}

	#[tokio::test]
	async fn test_batch_rejects_duplicates() {
		let engine = engine();
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		let result = engine
			.strategies()
			.add_strategies(owner(), &[hash, hash], &[steps.clone(), steps])
			.await;
		assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
		assert_eq!(engine.strategies().strategy_count().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_batch_length_mismatch() {
		let engine = engine();
		let hash = StrategyHash(B256::repeat_byte(1));
		let result = engine
			.strategies()
			.add_strategies(owner(), &[hash], &[])
			.await;
		assert_eq!(
			result,
			Err(RegistryError::LengthMismatch {
				expected: 1,
				actual: 0
			})
		);
	}

	#[tokio::test]
	async fn test_batch_add_emits_in_order() {
		let engine = engine();
		let mut events = engine.subscribe();
		let a = vec![step(1, false)];
		let b = vec![step(2, true)];
		let hash_a = hash_strategy(&a, token(1));
		let hash_b = hash_strategy(&b, token(1));

		let indexes = engine
			.strategies()
			.add_strategies(owner(), &[hash_a, hash_b], &[a, b])
			.await
			.unwrap();
		assert_eq!(indexes, vec![0, 1]);
		assert_eq!(
			drain(&mut events),
			vec![
				RegistryEvent::Strategy(StrategyEvent::Added {
					strategy_hash: hash_a,
					index: 0,
					caller: owner(),
				}),
				RegistryEvent::Strategy(StrategyEvent::Added {
					strategy_hash: hash_b,
					index: 1,
					caller: owner(),
				}),
			]
		);
	}

	#[tokio::test]
	async fn test_requires_operator() {
		let engine = engine();
		let steps = vec![step(1, false)];
		let hash = hash_strategy(&steps, token(1));
		let result = engine
			.strategies()
			.add_strategy(stranger(), hash, &steps)
			.await;
		assert!(matches!(
			result,
			Err(RegistryError::PermissionDenied { .. })
		));
	}
}
