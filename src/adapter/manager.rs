//! Backend registry and active-wallet dispatch.
//!
//! Owns one adapter instance per registered backend id plus the shared
//! session store, replacing inheritance-based dispatch with a plain
//! identifier → implementation map.

use crate::adapter::{WalletAdapter, WalletId};
use crate::error::WalletError;
use crate::session::store::SessionStore;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of backend adapters sharing one session store.
pub struct WalletManager {
	store: Arc<SessionStore>,
	adapters: HashMap<WalletId, Arc<dyn WalletAdapter>>,
}

impl WalletManager {
	pub fn new(store: Arc<SessionStore>) -> Self {
		Self {
			store,
			adapters: HashMap::new(),
		}
	}

	pub fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	/// Register a backend. Re-registering an id replaces the previous
	/// adapter instance.
	pub fn register(&mut self, adapter: Arc<dyn WalletAdapter>) {
		info!("registered {} backend", adapter.id());
		self.adapters.insert(adapter.id(), adapter);
	}

	/// Adapter for a backend id.
	pub fn adapter(&self, id: WalletId) -> Result<Arc<dyn WalletAdapter>, WalletError> {
		self.adapters
			.get(&id)
			.cloned()
			.ok_or(WalletError::UnknownWallet(id))
	}

	/// Adapter for the store's active wallet.
	pub fn active_adapter(&self) -> Result<Arc<dyn WalletAdapter>, WalletError> {
		let id = self
			.store
			.active_wallet()
			.ok_or(WalletError::ClientNotInitialized)?;
		self.adapter(id)
	}

	/// Make a connected backend the active one.
	pub fn set_active_wallet(&self, id: WalletId) -> Result<(), WalletError> {
		self.store.set_active_wallet(id)
	}

	/// Resume every persisted session across the registered backends.
	/// Individual failures are logged and skipped so one expired session
	/// cannot block the others from resuming.
	pub async fn resume_sessions(&self) {
		for (id, adapter) in &self.adapters {
			if let Err(e) = adapter.resume_session().await {
				warn!("failed to resume {} session: {}", id, e);
			}
		}
	}
}
