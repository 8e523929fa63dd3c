//! Error kinds surfaced by registry operations.
//!
//! Every failure aborts the whole operation, batches included; read-only
//! queries never fail on "not found" and return an empty value instead.

use crate::common::{Address, TokenHash};
use crate::roles::Role;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Length mismatch: expected {expected}, got {actual}")]
	LengthMismatch { expected: usize, actual: usize },

	#[error("Already exists: {0}")]
	AlreadyExists(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Unknown risk profile: {0}")]
	UnknownRiskProfile(u64),

	#[error("Token not approved: {0}")]
	TokenNotApproved(Address),

	#[error("Token hash not set: {0}")]
	TokenHashNotSet(TokenHash),

	#[error("Permission denied: {caller} is not {role}")]
	PermissionDenied { caller: Address, role: Role },

	#[error("Storage error: {0}")]
	Storage(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Fails with [`RegistryError::LengthMismatch`] unless both batch inputs have the same length.
pub fn ensure_same_length(expected: usize, actual: usize) -> Result<()> {
	if expected != actual {
		return Err(RegistryError::LengthMismatch { expected, actual });
	}
	Ok(())
}
