//! Token approval and token-group hash index.
//!
//! A token hash may only be mapped to a group of approved tokens. Once a hash
//! is mapped it joins the enumerable index and stays there, even when its
//! token list is later overwritten.

use crate::ledger::{Ledger, Transaction, INDEX_NAMESPACE};
use std::collections::HashSet;
use std::sync::Arc;
use strategy_types::hashing::hash_token_group_with;
use strategy_types::{
	Address, HashScheme, RegistryError, RegistryEvent, Result, Role, TokenEvent, TokenHash,
};
use tracing::info;

const APPROVED_TOKENS: &str = "approved_token";
const TOKEN_GROUPS: &str = "tokens_hash";
const TOKEN_HASH_LIST: &str = "token_hashes";

pub struct TokenIndex {
	ledger: Arc<Ledger>,
}

impl TokenIndex {
	pub fn new(ledger: Arc<Ledger>) -> Self {
		Self { ledger }
	}

	pub async fn is_approved_token(&self, token: Address) -> Result<bool> {
		Ok(self
			.ledger
			.get::<bool>(APPROVED_TOKENS, &token.to_string())
			.await?
			.unwrap_or(false))
	}

	pub async fn approve_token(&self, caller: Address, token: Address) -> Result<()> {
		self.approve_tokens(caller, &[token]).await
	}

	/// Approves every token. Already approved tokens are skipped silently.
	pub async fn approve_tokens(&self, caller: Address, tokens: &[Address]) -> Result<()> {
		self.set_approval(caller, tokens, true).await
	}

	pub async fn revoke_token(&self, caller: Address, token: Address) -> Result<()> {
		self.revoke_tokens(caller, &[token]).await
	}

	pub async fn revoke_tokens(&self, caller: Address, tokens: &[Address]) -> Result<()> {
		self.set_approval(caller, tokens, false).await
	}

	async fn set_approval(&self, caller: Address, tokens: &[Address], enabled: bool) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut tx = Transaction::new();
		let changed = self.stage_approval(&mut tx, caller, tokens, enabled).await?;
		self.ledger.commit(tx).await?;

		if changed > 0 {
			info!(
				"{} {} token(s)",
				if enabled { "Approved" } else { "Revoked" },
				changed
			);
		}
		Ok(())
	}

	/// Stages approval changes and returns how many tokens actually changed.
	async fn stage_approval(
		&self,
		tx: &mut Transaction,
		caller: Address,
		tokens: &[Address],
		enabled: bool,
	) -> Result<usize> {
		let mut seen = HashSet::new();
		let mut changed = 0;
		for token in tokens {
			if *token == Address::ZERO {
				return Err(RegistryError::InvalidInput(
					"zero address cannot be a token".into(),
				));
			}
			if !seen.insert(*token) || self.is_approved_token(*token).await? == enabled {
				continue;
			}

			let id = token.to_string();
			if enabled {
				tx.put(APPROVED_TOKENS, &id, &true)?;
			} else {
				tx.delete(APPROVED_TOKENS, &id);
			}
			tx.emit(RegistryEvent::Token(TokenEvent::Approval {
				token: *token,
				enabled,
				caller,
			}));
			changed += 1;
		}
		Ok(changed)
	}

	/// Token group mapped to `token_hash`, empty when unmapped.
	pub async fn get_tokens_hash_to_token_list(&self, token_hash: TokenHash) -> Result<Vec<Address>> {
		Ok(self
			.ledger
			.get(TOKEN_GROUPS, &token_hash.to_string())
			.await?
			.unwrap_or_default())
	}

	/// Every token hash ever mapped, in first-mapping order.
	pub async fn get_tokens_hashes(&self) -> Result<Vec<TokenHash>> {
		Ok(self
			.ledger
			.get(INDEX_NAMESPACE, TOKEN_HASH_LIST)
			.await?
			.unwrap_or_default())
	}

	pub async fn is_registered(&self, token_hash: TokenHash) -> Result<bool> {
		Ok(!self.get_tokens_hash_to_token_list(token_hash).await?.is_empty())
	}

	/// True when the hash of `tokens` is mapped to exactly `tokens`, same
	/// length and same order.
	pub async fn is_set_token_hash(&self, tokens: &[Address], scheme: HashScheme) -> Result<bool> {
		let token_hash = hash_token_group_with(scheme, tokens);
		let mapped = self.get_tokens_hash_to_token_list(token_hash).await?;
		Ok(!mapped.is_empty() && mapped.as_slice() == tokens)
	}

	pub async fn set_tokens_hash_to_tokens(
		&self,
		caller: Address,
		token_hash: TokenHash,
		tokens: &[Address],
	) -> Result<()> {
		self.set_tokens_hashes_to_tokens(caller, &[(token_hash, tokens.to_vec())])
			.await
	}

	/// Maps each hash to its token group. Every token must already be approved.
	pub async fn set_tokens_hashes_to_tokens(
		&self,
		caller: Address,
		entries: &[(TokenHash, Vec<Address>)],
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut tx = Transaction::new();
		self.stage_mapping(&mut tx, caller, entries, &HashSet::new())
			.await?;
		self.ledger.commit(tx).await?;

		info!("Mapped {} token hash(es)", entries.len());
		Ok(())
	}

	/// Approves any unapproved token in the group and maps the hash in one
	/// atomic operation.
	pub async fn approve_token_and_map_to_tokens_hash(
		&self,
		caller: Address,
		token_hash: TokenHash,
		tokens: &[Address],
	) -> Result<()> {
		let _guard = self.ledger.begin().await;
		self.ledger.authorize(caller, Role::Operator).await?;

		let mut tx = Transaction::new();
		self.stage_approval(&mut tx, caller, tokens, true).await?;
		let approved: HashSet<Address> = tokens.iter().copied().collect();
		self.stage_mapping(&mut tx, caller, &[(token_hash, tokens.to_vec())], &approved)
			.await?;
		self.ledger.commit(tx).await?;

		info!("Approved and mapped token hash {}", token_hash);
		Ok(())
	}

	/// `staged_approvals` lists tokens approved earlier in the same transaction.
	async fn stage_mapping(
		&self,
		tx: &mut Transaction,
		caller: Address,
		entries: &[(TokenHash, Vec<Address>)],
		staged_approvals: &HashSet<Address>,
	) -> Result<()> {
		let mut index = self.get_tokens_hashes().await?;
		let known_hashes = index.len();

		for (token_hash, tokens) in entries {
			if token_hash.is_zero() {
				return Err(RegistryError::InvalidInput(
					"token hash must not be zero".into(),
				));
			}
			if tokens.is_empty() {
				return Err(RegistryError::InvalidInput(format!(
					"token list for {} is empty",
					token_hash
				)));
			}
			for token in tokens {
				if !staged_approvals.contains(token) && !self.is_approved_token(*token).await? {
					return Err(RegistryError::TokenNotApproved(*token));
				}
			}

			tx.put(TOKEN_GROUPS, &token_hash.to_string(), tokens)?;
			if !index.contains(token_hash) {
				index.push(*token_hash);
			}
			tx.emit(RegistryEvent::Token(TokenEvent::TokensHashMapped {
				token_hash: *token_hash,
				caller,
			}));
		}

		if index.len() != known_hashes {
			tx.put(INDEX_NAMESPACE, TOKEN_HASH_LIST, &index)?;
		}
		Ok(())
	}
}
