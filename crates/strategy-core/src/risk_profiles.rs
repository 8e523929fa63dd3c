//! Risk profile registry.
//!
//! Profiles are keyed by code. The index assigned on first add is permanent:
//! removal only clears `exists`, and re-adding a removed code reuses it.

use crate::ledger::{Ledger, Transaction, INDEX_NAMESPACE};
use std::collections::HashSet;
use std::sync::Arc;
use strategy_types::{
	ensure_same_length, Address, NewRiskProfile, PoolRatingRange, RegistryError, RegistryEvent,
	Result, RiskProfile, RiskProfileEvent, Role,
};
use tracing::info;

const RISK_PROFILES: &str = "risk_profile";
const RISK_PROFILE_LIST: &str = "risk_profiles";

pub struct RiskProfileRegistry {
	ledger: Arc<Ledger>,
}

impl RiskProfileRegistry {
	pub fn new(ledger: Arc<Ledger>) -> Self {
		Self { ledger }
	}

	/// Profile stored under `code`, removed ones included.
	pub async fn get_risk_profile(&self, code: u64) -> Result<Option<RiskProfile>> {
		self.ledger.get(RISK_PROFILES, &code.to_string()).await
	}

	/// The profile, only while it is active.
	pub async fn get_active(&self, code: u64) -> Result<Option<RiskProfile>> {
		Ok(self
			.get_risk_profile(code)
			.await?
			.filter(|profile| profile.exists))
	}

	/// Codes in index order.
	pub async fn get_risk_profile_list(&self) -> Result<Vec<u64>> {
		Ok(self
			.ledger
			.get(INDEX_NAMESPACE, RISK_PROFILE_LIST)
			.await?
			.unwrap_or_default())
	}

	pub async fn get_risk_profile_code_by_index(&self, index: u64) -> Result<Option<u64>> {
		let list = self.get_risk_profile_list().await?;
		Ok(usize::try_from(index)
			.ok()
			.and_then(|index| list.get(index).copied()))
	}

	/// Returns the index of the added profile.
	pub async fn add_risk_profile(&self, caller: Address, profile: NewRiskProfile) -> Result<u64> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		let mut tx = Transaction::new();
		let indexes = self
			.stage_profiles(&mut tx, caller, std::slice::from_ref(&profile))
			.await?;
		self.ledger.commit(tx).await?;

		info!(
			"Added risk profile {} ({}) at index {}",
			profile.code, profile.symbol, indexes[0]
		);
		Ok(indexes[0])
	}

	/// Batch add from parallel arrays. All arrays must have the same length.
	pub async fn add_risk_profiles(
		&self,
		caller: Address,
		codes: &[u64],
		names: &[String],
		symbols: &[String],
		can_borrow: &[bool],
		pool_ratings: &[PoolRatingRange],
	) -> Result<Vec<u64>> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		ensure_same_length(codes.len(), names.len())?;
		ensure_same_length(codes.len(), symbols.len())?;
		ensure_same_length(codes.len(), can_borrow.len())?;
		ensure_same_length(codes.len(), pool_ratings.len())?;

		let profiles: Vec<NewRiskProfile> = codes
			.iter()
			.enumerate()
			.map(|(i, code)| NewRiskProfile {
				code: *code,
				name: names[i].clone(),
				symbol: symbols[i].clone(),
				can_borrow: can_borrow[i],
				pool_rating: pool_ratings[i],
			})
			.collect();

		let mut tx = Transaction::new();
		let indexes = self.stage_profiles(&mut tx, caller, &profiles).await?;
		self.ledger.commit(tx).await?;

		info!("Added {} risk profile(s)", indexes.len());
		Ok(indexes)
	}

	async fn stage_profiles(
		&self,
		tx: &mut Transaction,
		caller: Address,
		profiles: &[NewRiskProfile],
	) -> Result<Vec<u64>> {
		let mut list = self.get_risk_profile_list().await?;
		let listed = list.len();
		let mut staged = HashSet::new();
		let mut indexes = Vec::with_capacity(profiles.len());

		for new in profiles {
			validate_new_profile(new)?;
			let existing = self.get_risk_profile(new.code).await?;
			if !staged.insert(new.code) || existing.as_ref().is_some_and(|p| p.exists) {
				return Err(RegistryError::AlreadyExists(format!(
					"risk profile {}",
					new.code
				)));
			}

			let index = match existing {
				Some(removed) => removed.index,
				None => {
					list.push(new.code);
					(list.len() - 1) as u64
				}
			};
			let profile = RiskProfile {
				code: new.code,
				index,
				name: new.name.clone(),
				symbol: new.symbol.clone(),
				can_borrow: new.can_borrow,
				pool_rating_range: new.pool_rating,
				exists: true,
			};
			tx.put(RISK_PROFILES, &new.code.to_string(), &profile)?;
			tx.emit(RegistryEvent::RiskProfile(RiskProfileEvent::Updated {
				index,
				exists: true,
				can_borrow: profile.can_borrow,
				caller,
			}));
			tx.emit(RegistryEvent::RiskProfile(
				RiskProfileEvent::PoolRatingsUpdated {
					index,
					range: profile.pool_rating_range,
					caller,
				},
			));
			indexes.push(index);
		}

		if list.len() != listed {
			tx.put(INDEX_NAMESPACE, RISK_PROFILE_LIST, &list)?;
		}
		Ok(indexes)
	}

	pub async fn update_risk_profile_borrow(
		&self,
		caller: Address,
		code: u64,
		can_borrow: bool,
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		let mut profile = self.require_active(code).await?;
		profile.can_borrow = can_borrow;

		let mut tx = Transaction::new();
		tx.put(RISK_PROFILES, &code.to_string(), &profile)?;
		tx.emit(RegistryEvent::RiskProfile(RiskProfileEvent::Updated {
			index: profile.index,
			exists: true,
			can_borrow,
			caller,
		}));
		self.ledger.commit(tx).await?;

		info!("Risk profile {} can_borrow = {}", code, can_borrow);
		Ok(())
	}

	pub async fn update_rp_pool_ratings(
		&self,
		caller: Address,
		code: u64,
		range: PoolRatingRange,
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		validate_range(&range)?;
		let mut profile = self.require_active(code).await?;
		profile.pool_rating_range = range;

		let mut tx = Transaction::new();
		tx.put(RISK_PROFILES, &code.to_string(), &profile)?;
		tx.emit(RegistryEvent::RiskProfile(
			RiskProfileEvent::PoolRatingsUpdated {
				index: profile.index,
				range,
				caller,
			},
		));
		self.ledger.commit(tx).await?;

		info!("Risk profile {} pool ratings = {}", code, range);
		Ok(())
	}

	pub async fn remove_risk_profile(&self, caller: Address, code: u64) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::RiskOperator).await?;

		let mut profile = self.require_active(code).await?;
		profile.exists = false;

		let mut tx = Transaction::new();
		tx.put(RISK_PROFILES, &code.to_string(), &profile)?;
		tx.emit(RegistryEvent::RiskProfile(RiskProfileEvent::Updated {
			index: profile.index,
			exists: false,
			can_borrow: profile.can_borrow,
			caller,
		}));
		self.ledger.commit(tx).await?;

		info!("Removed risk profile {}", code);
		Ok(())
	}

	async fn require_active(&self, code: u64) -> Result<RiskProfile> {
		self.get_active(code)
			.await?
			.ok_or_else(|| RegistryError::NotFound(format!("risk profile {}", code)))
	}
}

fn validate_new_profile(profile: &NewRiskProfile) -> Result<()> {
	if profile.name.trim().is_empty() {
		return Err(RegistryError::InvalidInput(format!(
			"risk profile {} has an empty name",
			profile.code
		)));
	}
	if profile.symbol.trim().is_empty() {
		return Err(RegistryError::InvalidInput(format!(
			"risk profile {} has an empty symbol",
			profile.code
		)));
	}
	validate_range(&profile.pool_rating)
}

fn validate_range(range: &PoolRatingRange) -> Result<()> {
	if !range.is_valid() {
		return Err(RegistryError::InvalidInput(format!(
			"invalid pool rating range {}",
			range
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::test_support::*;
	use strategy_types::{
		PoolRatingRange, RegistryError, RegistryEvent, RiskProfileEvent,
	};

	#[tokio::test]
	async fn test_add_basic_profile() {
		let engine = engine();
		let mut events = engine.subscribe();
		let mut basic = profile(1, false, 0, 10);
		basic.name = "Basic".to_string();
		basic.symbol = "RP1".to_string();

		let index = engine
			.risk_profiles()
			.add_risk_profile(owner(), basic)
			.await
			.unwrap();
		assert_eq!(index, 0);

		let stored = engine
			.risk_profiles()
			.get_risk_profile(1)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.name, "Basic");
		assert_eq!(stored.pool_rating_range, PoolRatingRange::new(0, 10));
		assert!(stored.exists);
		assert!(!stored.can_borrow);

		assert_eq!(
			drain(&mut events),
			vec![
				RegistryEvent::RiskProfile(RiskProfileEvent::Updated {
					index: 0,
					exists: true,
					can_borrow: false,
					caller: owner(),
				}),
				RegistryEvent::RiskProfile(RiskProfileEvent::PoolRatingsUpdated {
					index: 0,
					range: PoolRatingRange::new(0, 10),
					caller: owner(),
				}),
			]
		);
	}

	#[tokio::test]
	async fn test_inverted_range_rejected() {
		let engine = engine();
		let result = engine
			.risk_profiles()
			.add_risk_profile(owner(), profile(1, false, 10, 1))
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
		assert!(engine
			.risk_profiles()
			.get_risk_profile(1)
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_empty_name_rejected() {
		let engine = engine();
		let mut nameless = profile(1, false, 0, 10);
		nameless.name = String::new();
		let result = engine
			.risk_profiles()
			.add_risk_profile(owner(), nameless)
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
	}

	#[tokio::test]
	async fn test_duplicate_code_rejected() {
		let engine = engine();
		let profiles = engine.risk_profiles();
		profiles
			.add_risk_profile(owner(), profile(1, false, 0, 10))
			.await
			.unwrap();
		let result = profiles
			.add_risk_profile(owner(), profile(1, true, 0, 5))
			.await;
		assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
	}

	#[tokio::test]
	async fn test_remove_keeps_index() {
		let engine = engine();
		let profiles = engine.risk_profiles();
		profiles
			.add_risk_profile(owner(), profile(1, false, 0, 10))
			.await
			.unwrap();
		profiles
			.add_risk_profile(owner(), profile(2, true, 0, 10))
			.await
			.unwrap();

		profiles.remove_risk_profile(owner(), 1).await.unwrap();
		let removed = profiles.get_risk_profile(1).await.unwrap().unwrap();
		assert!(!removed.exists);
		assert_eq!(removed.index, 0);
		assert_eq!(profiles.get_risk_profile_code_by_index(0).await.unwrap(), Some(1));
		assert!(profiles.get_active(1).await.unwrap().is_none());

		let result = profiles.remove_risk_profile(owner(), 1).await;
		assert!(matches!(result, Err(RegistryError::NotFound(_))));

		// Re-adding reactivates under the original index.
		let index = profiles
			.add_risk_profile(owner(), profile(1, true, 2, 4))
			.await
			.unwrap();
		assert_eq!(index, 0);
		assert_eq!(profiles.get_risk_profile_list().await.unwrap(), vec![1, 2]);
		assert!(profiles.get_risk_profile(1).await.unwrap().unwrap().can_borrow);
	}

	#[tokio::test]
	async fn test_updates() {
		let engine = engine();
		let profiles = engine.risk_profiles();
		profiles
			.add_risk_profile(owner(), profile(1, false, 0, 10))
			.await
			.unwrap();

		profiles
			.update_risk_profile_borrow(owner(), 1, true)
			.await
			.unwrap();
		profiles
			.update_rp_pool_ratings(owner(), 1, PoolRatingRange::new(3, 7))
			.await
			.unwrap();
		let stored = profiles.get_risk_profile(1).await.unwrap().unwrap();
		assert!(stored.can_borrow);
		assert_eq!(stored.pool_rating_range, PoolRatingRange::new(3, 7));

		let result = profiles
			.update_rp_pool_ratings(owner(), 1, PoolRatingRange::new(8, 2))
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
		let result = profiles.update_risk_profile_borrow(owner(), 9, true).await;
		assert!(matches!(result, Err(RegistryError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_batch_add() {
		let engine = engine();
		let profiles = engine.risk_profiles();
		let indexes = profiles
			.add_risk_profiles(
				owner(),
				&[1, 2],
				&["Basic".to_string(), "Aggressive".to_string()],
				&["RP1".to_string(), "RP2".to_string()],
				&[false, true],
				&[PoolRatingRange::new(0, 10), PoolRatingRange::new(0, 20)],
			)
			.await
			.unwrap();
		assert_eq!(indexes, vec![0, 1]);
		assert_eq!(profiles.get_risk_profile_code_by_index(1).await.unwrap(), Some(2));
		assert_eq!(profiles.get_risk_profile_code_by_index(5).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_batch_add_length_mismatch() {
		let engine = engine();
		let result = engine
			.risk_profiles()
			.add_risk_profiles(
				owner(),
				&[1, 2],
				&["Basic".to_string()],
				&["RP1".to_string(), "RP2".to_string()],
				&[false, true],
				&[PoolRatingRange::new(0, 10), PoolRatingRange::new(0, 20)],
			)
			.await;
		assert!(matches!(result, Err(RegistryError::LengthMismatch { .. })));
	}

	#[tokio::test]
	async fn test_batch_add_is_atomic() {
		let engine = engine();
		let profiles = engine.risk_profiles();
		let result = profiles
			.add_risk_profiles(
				owner(),
				&[1, 2],
				&["Basic".to_string(), "Broken".to_string()],
				&["RP1".to_string(), "RP2".to_string()],
				&[false, false],
				&[PoolRatingRange::new(0, 10), PoolRatingRange::new(9, 1)],
			)
			.await;
		assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
		assert!(profiles.get_risk_profile(1).await.unwrap().is_none());
		assert!(profiles.get_risk_profile_list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_requires_risk_operator() {
		let engine = engine();
		let result = engine
			.risk_profiles()
			.add_risk_profile(stranger(), profile(1, false, 0, 10))
			.await;
		assert!(matches!(
			result,
			Err(RegistryError::PermissionDenied { .. })
		));
	}
}
