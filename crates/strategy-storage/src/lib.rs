//! Storage module for the strategy registry.
//!
//! This module provides a namespaced key-value abstraction over pluggable
//! backends. Writes that must land together are collected in a [`WriteBatch`]
//! and handed to the backend in a single call.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs when the backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
	Put { key: String, value: Vec<u8> },
	Delete { key: String },
}

impl WriteOp {
	pub fn key(&self) -> &str {
		match self {
			WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
		}
	}
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the registry. Besides basic key-value operations a backend
/// must be able to apply a batch of writes so that readers observe either
/// none or all of them.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Applies every write in `ops`, in order, as one unit.
	async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StorageError>;
}

fn make_key(namespace: &str, id: &str) -> String {
	format!("{}:{}", namespace, id)
}

/// Writes staged for a single commit.
#[derive(Debug, Default)]
pub struct WriteBatch {
	ops: Vec<WriteOp>,
}

impl WriteBatch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stages a serialized value under `namespace:id`.
	pub fn put<T: Serialize>(
		&mut self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let value =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.ops.push(WriteOp::Put {
			key: make_key(namespace, id),
			value,
		});
		Ok(())
	}

	/// Stages removal of `namespace:id`.
	pub fn delete(&mut self, namespace: &str, id: &str) {
		self.ops.push(WriteOp::Delete {
			key: make_key(namespace, id),
		});
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	pub fn len(&self) -> usize {
		self.ops.len()
	}

	pub fn into_ops(self) -> Vec<WriteOp> {
		self.ops
	}
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend. Reads are typed
/// lookups; every write goes through [`commit`](Self::commit) as a batch.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Retrieves and deserializes a value from storage.
	///
	/// The namespace and id are combined to form the lookup key.
	/// The retrieved bytes are deserialized from JSON.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&make_key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Like [`retrieve`](Self::retrieve), but maps a missing key to `None`.
	pub async fn retrieve_optional<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(namespace, id).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Applies every staged write as one unit. Empty batches are a no-op.
	pub async fn commit(&self, batch: WriteBatch) -> Result<(), StorageError> {
		if batch.is_empty() {
			return Ok(());
		}
		self.backend.apply_batch(batch.into_ops()).await
	}
}

/// Creates a storage backend by name from its configuration table.
pub fn create_storage(
	backend: &str,
	config: &toml::Value,
) -> Result<Box<dyn StorageInterface>, StorageError> {
	match backend {
		"memory" => Ok(implementations::memory::create_storage(config)),
		"file" => Ok(implementations::file::create_storage(config)),
		other => Err(StorageError::Configuration(format!(
			"Unknown storage backend: {}",
			other
		))),
	}
}
