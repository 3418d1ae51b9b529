//! Session store: per-backend account state with synchronous persistence.
//!
//! The store holds the process-wide `SessionState` behind a mutex and
//! persists the full snapshot through the storage seam before every
//! mutation returns. All mutation happens on the single application thread
//! in response to awaited backend results, so last-writer-wins is the
//! intended behavior and there is no optimistic concurrency control.

use crate::error::WalletError;
use crate::session::storage::SessionStorage;
use crate::session::types::{NetworkId, SessionState, WalletAccount, WalletId, WalletState};
use crate::transaction::codec::Address;

use std::sync::Mutex;
use tracing::{info, warn};

/// Well-known storage key for the serialized session snapshot. Renaming it
/// orphans existing persisted sessions.
pub const SESSION_STORAGE_KEY: &str = "wallet-gateway:session";

/// Process-wide session store. Shared by reference between the manager and
/// every adapter.
pub struct SessionStore {
	storage: Box<dyn SessionStorage>,
	state: Mutex<SessionState>,
}

impl SessionStore {
	/// Load the persisted snapshot, or start fresh when the key is absent.
	/// Corrupt content is treated as absence, never as a fatal error.
	pub fn new(storage: Box<dyn SessionStorage>, default_network: NetworkId) -> Self {
		let state = match storage.get(SESSION_STORAGE_KEY) {
			Ok(Some(blob)) => match serde_json::from_str::<SessionState>(&blob) {
				Ok(state) => {
					info!(
						"restored session with {} wallet(s), active: {:?}",
						state.wallets.len(),
						state.active_wallet
					);
					state
				}
				Err(e) => {
					warn!("persisted session is corrupt ({}), starting fresh", e);
					SessionState::new(default_network)
				}
			},
			Ok(None) => SessionState::new(default_network),
			Err(e) => {
				warn!("failed to load persisted session ({}), starting fresh", e);
				SessionState::new(default_network)
			}
		};

		Self {
			storage,
			state: Mutex::new(state),
		}
	}

	/// Current full snapshot.
	pub fn snapshot(&self) -> SessionState {
		self.state.lock().unwrap().clone()
	}

	/// State for one backend, if connected.
	pub fn wallet_state(&self, id: WalletId) -> Option<WalletState> {
		self.state.lock().unwrap().wallets.get(&id).cloned()
	}

	/// Addresses currently authorized for one backend. Empty when the
	/// backend has no session entry.
	pub fn connected_addresses(&self, id: WalletId) -> Vec<Address> {
		self.state
			.lock()
			.unwrap()
			.wallets
			.get(&id)
			.map(|wallet| wallet.accounts.iter().map(|a| a.address.clone()).collect())
			.unwrap_or_default()
	}

	pub fn active_wallet(&self) -> Option<WalletId> {
		self.state.lock().unwrap().active_wallet
	}

	pub fn active_network(&self) -> NetworkId {
		self.state.lock().unwrap().active_network
	}

	/// Active account of the given backend, if any.
	pub fn active_account(&self, id: WalletId) -> Option<WalletAccount> {
		self.state
			.lock()
			.unwrap()
			.wallets
			.get(&id)
			.and_then(|wallet| wallet.active_account.clone())
	}

	/// Insert or overwrite a backend's state. The first connected backend
	/// becomes the active one. An active account outside the account list
	/// is coerced to the first account, keeping the membership invariant.
	pub fn add_wallet(&self, id: WalletId, mut wallet: WalletState) -> Result<(), WalletError> {
		if wallet.accounts.is_empty() {
			return Err(WalletError::NoAccountsFound(id));
		}
		let stray_active = wallet.active_account.as_ref().is_some_and(|active| {
			!wallet.accounts.iter().any(|a| a.address == active.address)
		});
		if stray_active {
			wallet.active_account = wallet.accounts.first().cloned();
		}
		let mut state = self.state.lock().unwrap();
		state.wallets.insert(id, wallet);
		if state.active_wallet.is_none() {
			state.active_wallet = Some(id);
		}
		self.persist(&state)
	}

	/// Replace the account list of an existing backend entry. When the
	/// current active account disappears from the new list, the first
	/// account takes its place.
	pub fn set_accounts(&self, id: WalletId, accounts: Vec<WalletAccount>) -> Result<(), WalletError> {
		if accounts.is_empty() {
			return Err(WalletError::NoAccountsFound(id));
		}
		let mut state = self.state.lock().unwrap();
		let wallet = state.wallets.get_mut(&id).ok_or(WalletError::UnknownWallet(id))?;

		let still_active = wallet.active_account.as_ref().and_then(|active| {
			accounts.iter().find(|a| a.address == active.address).cloned()
		});
		wallet.active_account = still_active.or_else(|| accounts.first().cloned());
		wallet.accounts = accounts;
		self.persist(&state)
	}

	/// Make one of the backend's authorized accounts the active one.
	pub fn set_active_account(&self, id: WalletId, address: &str) -> Result<(), WalletError> {
		let mut state = self.state.lock().unwrap();
		let wallet = state.wallets.get_mut(&id).ok_or(WalletError::UnknownWallet(id))?;
		let account = wallet
			.accounts
			.iter()
			.find(|a| a.address == address)
			.cloned()
			.ok_or_else(|| WalletError::AccountNotFound(address.to_string()))?;
		wallet.active_account = Some(account);
		self.persist(&state)
	}

	pub fn set_active_wallet(&self, id: WalletId) -> Result<(), WalletError> {
		let mut state = self.state.lock().unwrap();
		if !state.wallets.contains_key(&id) {
			return Err(WalletError::UnknownWallet(id));
		}
		state.active_wallet = Some(id);
		self.persist(&state)
	}

	pub fn set_active_network(&self, network: NetworkId) -> Result<(), WalletError> {
		let mut state = self.state.lock().unwrap();
		state.active_network = network;
		self.persist(&state)
	}

	/// Delete a backend's entry. Clears the active pointer when it pointed
	/// at the removed backend. Removing an absent entry is a no-op.
	pub fn remove_wallet(&self, id: WalletId) -> Result<(), WalletError> {
		let mut state = self.state.lock().unwrap();
		if state.wallets.remove(&id).is_none() {
			return Ok(());
		}
		if state.active_wallet == Some(id) {
			state.active_wallet = None;
		}
		self.persist(&state)
	}

	/// Tear the whole session down and drop the persisted record.
	pub fn reset(&self) -> Result<(), WalletError> {
		let mut state = self.state.lock().unwrap();
		let network = state.active_network;
		*state = SessionState::new(network);
		self.storage.remove(SESSION_STORAGE_KEY)
	}

	fn persist(&self, state: &SessionState) -> Result<(), WalletError> {
		let blob = serde_json::to_string(state)
			.map_err(|e| WalletError::Storage(format!("failed to serialize session: {}", e)))?;
		self.storage.set(SESSION_STORAGE_KEY, &blob)
	}
}
