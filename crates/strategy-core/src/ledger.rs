//! Shared state access for all registry components.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. take the commit lock with [`Ledger::begin`]
//! 2. check the caller's role with [`Ledger::authorize`]
//! 3. validate and stage writes and events in a [`Transaction`]
//! 4. hand the transaction to [`Ledger::commit`]
//!
//! Nothing is written before step 4, so a failed validation leaves the store
//! untouched, and the lock keeps operations fully serialized.

use crate::event_bus::EventBus;
use crate::roles::{RoleError, RoleResolver};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use strategy_storage::{StorageError, StorageService, WriteBatch};
use strategy_types::{Address, RegistryError, RegistryEvent, Result, Role};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Namespace holding the enumerable lists and counters.
pub(crate) const INDEX_NAMESPACE: &str = "index";

/// Role holders recorded by a transfer, keyed by role name.
pub(crate) const ROLES_NAMESPACE: &str = "role";

pub(crate) fn storage_error(e: StorageError) -> RegistryError {
	RegistryError::Storage(e.to_string())
}

/// Writes and events staged by a single operation.
#[derive(Default)]
pub struct Transaction {
	batch: WriteBatch,
	events: Vec<RegistryEvent>,
}

impl Transaction {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn put<T: Serialize>(&mut self, namespace: &str, id: &str, data: &T) -> Result<()> {
		self.batch.put(namespace, id, data).map_err(storage_error)
	}

	pub fn delete(&mut self, namespace: &str, id: &str) {
		self.batch.delete(namespace, id);
	}

	pub fn emit(&mut self, event: RegistryEvent) {
		self.events.push(event);
	}

	pub fn is_empty(&self) -> bool {
		self.batch.is_empty() && self.events.is_empty()
	}
}

pub struct Ledger {
	storage: Arc<StorageService>,
	roles: Arc<dyn RoleResolver>,
	event_bus: EventBus,
	commit_lock: Mutex<()>,
}

impl Ledger {
	pub fn new(
		storage: Arc<StorageService>,
		roles: Arc<dyn RoleResolver>,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			roles,
			event_bus,
			commit_lock: Mutex::new(()),
		}
	}

	/// Serializes mutating operations. Hold the guard until after `commit`.
	pub async fn begin(&self) -> MutexGuard<'_, ()> {
		self.commit_lock.lock().await
	}

	/// Denies unless `caller` currently holds `role`. A lookup failure denies too.
	pub async fn authorize(&self, caller: Address, role: Role) -> Result<()> {
		match self.role_holder(role).await {
			Ok(holder) if holder == caller && holder != Address::ZERO => Ok(()),
			Ok(_) => {
				warn!("Rejected {}: not the {}", caller, role);
				Err(RegistryError::PermissionDenied { caller, role })
			}
			Err(e) => {
				warn!("Rejected {}: could not resolve {}: {}", caller, role, e);
				Err(RegistryError::PermissionDenied { caller, role })
			}
		}
	}

	/// A holder recorded by a transfer takes precedence over the resolver.
	pub async fn role_holder(&self, role: Role) -> std::result::Result<Address, RoleError> {
		let stored = self
			.storage
			.retrieve_optional::<Address>(ROLES_NAMESPACE, &role.to_string())
			.await
			.map_err(|e| RoleError::Unavailable(e.to_string()))?;
		match stored {
			Some(holder) => Ok(holder),
			None => self.roles.resolve(role).await,
		}
	}

	pub async fn get<T: DeserializeOwned>(&self, namespace: &str, id: &str) -> Result<Option<T>> {
		self.storage
			.retrieve_optional(namespace, id)
			.await
			.map_err(storage_error)
	}

	/// Writes the staged batch in one backend call, then publishes its events.
	pub async fn commit(&self, tx: Transaction) -> Result<()> {
		let Transaction { batch, events } = tx;
		let writes = batch.len();
		self.storage.commit(batch).await.map_err(storage_error)?;
		debug!("Committed {} writes, {} events", writes, events.len());

		for event in events {
			self.event_bus.publish(event).ok();
		}
		Ok(())
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}
}
