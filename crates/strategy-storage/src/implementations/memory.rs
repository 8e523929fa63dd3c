//! In-memory storage backend.

use crate::{StorageError, StorageInterface, WriteOp};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// Batches are applied while holding the write lock, so readers never observe
/// a partially applied batch.
#[derive(Default)]
pub struct MemoryStorage {
	data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.data
			.read()
			.await
			.get(key)
			.cloned()
			.ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.data.write().await.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.data.write().await.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.data.read().await.contains_key(key))
	}

	async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		let mut data = self.data.write().await;
		for op in ops {
			match op {
				WriteOp::Put { key, value } => {
					data.insert(key, value);
				}
				WriteOp::Delete { key } => {
					data.remove(&key);
				}
			}
		}
		Ok(())
	}
}

/// Factory function to create an in-memory backend. Takes no parameters.
pub fn create_storage(_config: &toml::Value) -> Box<dyn StorageInterface> {
	Box::new(MemoryStorage::new())
}
