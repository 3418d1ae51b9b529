//! wallet-gateway: one signing contract over many wallet backends.
//!
//! Applications obtain signed transaction groups from whichever backend the
//! user selected (browser extension, mobile bridge, hosted key service, raw
//! mnemonic) without knowing which one is active. The crate's core is the
//! transaction-group signing reconciliation protocol plus the wallet
//! session state machine; individual backends are thin adapters over
//! injected SDK traits.
//!
//! ```text
//! application
//!     │  sign_transactions(group, indexes, return_group)
//!     ▼
//! WalletAdapter (active backend)
//!     ├── group::build_signing_instructions  ← connected addresses (SessionStore)
//!     ├── backend round trip (SDK trait, out of scope)
//!     └── reconcile::merge → order-preserving (bytes | null) array
//! ```
//!
//! The session store persists per-backend account sets across reloads and
//! is mutated only on connect/resume divergence, never per signing call.

pub mod adapter;
pub mod error;
pub mod session;
pub mod transaction;

pub use adapter::manager::WalletManager;
pub use adapter::{ClientSlot, ConnectArgs, WalletAdapter};
pub use error::WalletError;
pub use session::storage::{FileStorage, MemoryStorage, SessionStorage};
pub use session::store::{SESSION_STORAGE_KEY, SessionStore};
pub use session::types::{
	NetworkId, SessionState, WalletAccount, WalletId, WalletState, accounts_match, label_accounts,
};
pub use transaction::codec::{Address, DecodedTransaction, SignatureEnvelope, UnsignedTransaction};
pub use transaction::group::{
	RawTransaction, SigningInstruction, TransactionGroup, build_signing_instructions,
};
pub use transaction::reconcile::{SignedResponse, merge};
pub use transaction::wire::WalletTransaction;
