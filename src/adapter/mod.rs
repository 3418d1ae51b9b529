//! Wallet Adapter Contract
//!
//! Every backend implements the `WalletAdapter` capability trait. The
//! lifecycle and signing protocol shared by all backends (connect, session
//! resume, disconnect, group signing, strict programmatic signing) is
//! factored once into provided methods; an individual backend only supplies
//! the narrow hooks that talk to its SDK:
//!
//! - `authorize`: lazily materialize the underlying client and run the
//!   backend's own authorization flow, returning raw addresses.
//! - `fetch_live_accounts`: re-establish a session and list the currently
//!   authorized addresses.
//! - `teardown`: best-effort backend cleanup.
//! - `sign_instructions`: the backend round trip for a prepared
//!   instruction sequence.
//!
//! Lifecycle: uninitialized → connecting → connected → disconnected, where
//! disconnected is terminal only until `connect`/`resume_session` re-enter
//! the connecting state.

pub mod extension;
pub mod manager;
pub mod mnemonic;
pub mod relay;
pub mod vault;

use crate::error::WalletError;
use crate::session::store::SessionStore;
use crate::session::types::{NetworkId, WalletAccount, WalletState, accounts_match, label_accounts};
pub use crate::session::types::WalletId;
use crate::transaction::codec::Address;
use crate::transaction::group::{
	SigningInstruction, TransactionGroup, build_signing_instructions, ensure_all_signable,
};
use crate::transaction::reconcile::{SignedResponse, merge};

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Optional arguments passed through to the backend's authorization flow.
#[derive(Debug, Clone, Default)]
pub struct ConnectArgs {
	/// Network to authorize against; defaults to the store's active network.
	pub network: Option<NetworkId>,
	/// Backend-specific parameters, forwarded opaquely.
	pub params: Option<serde_json::Value>,
}

/// Memoized slot for the lazily-constructed backend client. Construction
/// may be expensive or asynchronous and runs at most once while the slot
/// holds a client.
pub struct ClientSlot<C> {
	slot: tokio::sync::Mutex<Option<Arc<C>>>,
}

impl<C> ClientSlot<C> {
	pub fn new() -> Self {
		Self {
			slot: tokio::sync::Mutex::new(None),
		}
	}

	/// The current client, failing when nothing has been materialized yet
	/// (no `connect`/`resume_session` has run, or `disconnect` cleared it).
	pub async fn current(&self) -> Result<Arc<C>, WalletError> {
		self.slot
			.lock()
			.await
			.clone()
			.ok_or(WalletError::ClientNotInitialized)
	}

	/// The memoized client, materializing it on first use. The slot lock is
	/// held across materialization, so concurrent callers wait for the one
	/// in-flight construction instead of racing it.
	pub async fn get_or_materialize<F, Fut>(&self, materialize: F) -> Result<Arc<C>, WalletError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<C, WalletError>>,
	{
		let mut slot = self.slot.lock().await;
		if let Some(client) = slot.as_ref() {
			return Ok(client.clone());
		}
		let client = Arc::new(materialize().await?);
		*slot = Some(client.clone());
		Ok(client)
	}

	pub async fn clear(&self) {
		*self.slot.lock().await = None;
	}
}

impl<C> Default for ClientSlot<C> {
	fn default() -> Self {
		Self::new()
	}
}

/// The capability contract every signing backend implements.
#[async_trait::async_trait]
pub trait WalletAdapter: Send + Sync {
	/// Stable backend identifier, used as the session-store key.
	fn id(&self) -> WalletId;

	/// Display name used to label accounts ("<name> Account <n>").
	fn display_name(&self) -> &'static str;

	/// Shared session store handle.
	fn store(&self) -> &Arc<SessionStore>;

	/// Materialize the backend client if absent and run its authorization
	/// flow. Backends that can distinguish user cancellation surface it as
	/// `WalletError::UserCancelled`.
	async fn authorize(&self, args: Option<ConnectArgs>) -> Result<Vec<Address>, WalletError>;

	/// Re-establish the backend session and list its currently authorized
	/// addresses.
	async fn fetch_live_accounts(&self) -> Result<Vec<Address>, WalletError>;

	/// Backend teardown. Failures never block session removal.
	async fn teardown(&self) -> Result<(), WalletError>;

	/// Run the backend round trip for a prepared instruction sequence.
	/// Fails with `ClientNotInitialized` before any connect/resume.
	async fn sign_instructions(
		&self,
		instructions: &[SigningInstruction],
	) -> Result<SignedResponse, WalletError>;

	/// Authorize the backend and record the resulting accounts in the
	/// session store. A cancelled interactive flow resolves to an empty
	/// account list and leaves the store untouched.
	async fn connect(&self, args: Option<ConnectArgs>) -> Result<Vec<WalletAccount>, WalletError> {
		info!("connecting {}", self.id());
		let addresses = match self.authorize(args).await {
			Ok(addresses) => addresses,
			Err(WalletError::UserCancelled) => {
				info!("{} authorization cancelled by user", self.id());
				return Ok(Vec::new());
			}
			Err(e) => return Err(e),
		};
		if addresses.is_empty() {
			return Err(WalletError::NoAccountsFound(self.id()));
		}

		let accounts = label_accounts(self.display_name(), &addresses);
		let wallet = WalletState {
			active_account: accounts.first().cloned(),
			accounts: accounts.clone(),
		};
		self.store().add_wallet(self.id(), wallet)?;
		info!("{} connected with {} account(s)", self.id(), accounts.len());
		Ok(accounts)
	}

	/// Reconcile a persisted session against the live backend. No-op when
	/// nothing is persisted for this backend. On an account-set divergence
	/// the store is updated once; on backend failure the session is removed
	/// and the error re-raised so the caller can prompt a re-connect.
	async fn resume_session(&self) -> Result<(), WalletError> {
		let Some(persisted) = self.store().wallet_state(self.id()) else {
			debug!("no persisted session for {}, nothing to resume", self.id());
			return Ok(());
		};

		match self.fetch_live_accounts().await {
			Ok(live) => {
				let accounts = label_accounts(self.display_name(), &live);
				if accounts.is_empty() {
					let e = WalletError::NoAccountsFound(self.id());
					error!("{} session resumed to an empty account set", self.id());
					let _ = self.disconnect().await;
					return Err(e);
				}
				if !accounts_match(&persisted.accounts, &accounts) {
					info!("{} account set diverged, updating persisted session", self.id());
					self.store().set_accounts(self.id(), accounts)?;
				} else {
					debug!("{} session resumed unchanged", self.id());
				}
				Ok(())
			}
			Err(e) => {
				error!("failed to resume {} session: {}", self.id(), e);
				if let Err(cleanup) = self.disconnect().await {
					warn!("cleanup disconnect for {} failed: {}", self.id(), cleanup);
				}
				Err(e)
			}
		}
	}

	/// Best-effort backend teardown followed by session removal.
	async fn disconnect(&self) -> Result<(), WalletError> {
		if let Err(e) = self.teardown().await {
			warn!("{} teardown failed: {}", self.id(), e);
		}
		self.store().remove_wallet(self.id())?;
		info!("{} disconnected", self.id());
		Ok(())
	}

	/// Sign a transaction group: derive the per-position instructions from
	/// the live connected-address set, run the backend round trip, and
	/// reassemble the order-preserving result.
	async fn sign_transactions(
		&self,
		group: TransactionGroup,
		indexes_to_sign: Option<&[usize]>,
		return_group: bool,
	) -> Result<Vec<Option<Vec<u8>>>, WalletError> {
		let connected = self.store().connected_addresses(self.id());
		let instructions = build_signing_instructions(group, &connected, indexes_to_sign)?;
		let response = self.sign_instructions(&instructions).await?;
		merge(&instructions, response, return_group)
	}

	/// Strict variant for programmatic signer injection: every requested
	/// index must be signable, and only newly-signed bytes are returned.
	/// A backend that declines any requested position fails the whole call.
	async fn transaction_signer(
		&self,
		group: TransactionGroup,
		indexes_to_sign: &[usize],
	) -> Result<Vec<Vec<u8>>, WalletError> {
		let connected = self.store().connected_addresses(self.id());
		let instructions = build_signing_instructions(group, &connected, Some(indexes_to_sign))?;
		ensure_all_signable(&instructions, indexes_to_sign)?;
		let expected = instructions.iter().filter(|i| i.should_sign).count();
		let response = self.sign_instructions(&instructions).await?;
		let merged = merge(&instructions, response, false)?;
		let signed: Vec<Vec<u8>> = merged.into_iter().flatten().collect();
		if signed.len() != expected {
			// Positional backends may decline a position after the
			// pre-flight check passed; that is a hard error here.
			return Err(WalletError::IncompleteSigningResult {
				expected,
				returned: signed.len(),
			});
		}
		Ok(signed)
	}
}
