//! File-based storage backend.
//!
//! Each key is stored as its own file under a base directory.

use crate::{StorageError, StorageInterface, WriteOp};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

/// File-based storage implementation.
///
/// This implementation stores data as binary files on the filesystem,
/// providing simple persistence without requiring external dependencies.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Sanitizes the key by replacing problematic characters and
	/// appending a .bin extension.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':', '\\'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	async fn discard(staged: &[(PathBuf, PathBuf)]) {
		for (temp_path, _) in staged {
			if let Err(e) = fs::remove_file(temp_path).await {
				warn!("Failed to remove staged file {:?}: {}", temp_path, e);
			}
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		Ok(fs::try_exists(&path).await.unwrap_or(false))
	}

	async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		// Only the last write to a key survives the batch.
		let mut last: HashMap<String, Option<Vec<u8>>> = HashMap::new();
		for op in ops {
			match op {
				WriteOp::Put { key, value } => last.insert(key, Some(value)),
				WriteOp::Delete { key } => last.insert(key, None),
			};
		}

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// Stage every put before anything becomes visible.
		let mut staged = Vec::new();
		for (key, value) in &last {
			if let Some(value) = value {
				let path = self.get_file_path(key);
				let temp_path = path.with_extension("tmp");
				if let Err(e) = fs::write(&temp_path, value).await {
					staged.push((temp_path, path));
					Self::discard(&staged).await;
					return Err(StorageError::Backend(e.to_string()));
				}
				staged.push((temp_path, path));
			}
		}

		for (temp_path, path) in &staged {
			fs::rename(temp_path, path)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		for (key, value) in &last {
			if value.is_none() {
				self.delete(key).await?;
			}
		}

		Ok(())
	}
}

/// Factory function to create a storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/registry")
pub fn create_storage(config: &toml::Value) -> Box<dyn StorageInterface> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/registry")
		.to_string();

	Box::new(FileStorage::new(PathBuf::from(storage_path)))
}
