//! Session State and Persistence
//!
//! Holds, per backend, the set of authorized accounts plus the active
//! account/backend/network pointers, persisted across reloads through a
//! pluggable storage seam.

pub mod storage;
pub mod store;
pub mod types;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{SESSION_STORAGE_KEY, SessionStore};
pub use types::{
	NetworkId, SessionState, WalletAccount, WalletId, WalletState, accounts_match, label_accounts,
};
