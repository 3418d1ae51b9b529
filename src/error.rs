//! Error types shared by the signing protocol, session store and adapters.

use crate::session::types::{NetworkId, WalletId};

/// Error taxonomy for wallet connection, session and signing operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
	#[error("{0} returned no accounts")]
	NoAccountsFound(WalletId),

	#[error("client not initialized; call connect or resume_session first")]
	ClientNotInitialized,

	#[error("no wallet entry for {0}")]
	UnknownWallet(WalletId),

	#[error("account {0} not found in wallet")]
	AccountNotFound(String),

	#[error("transaction group is empty")]
	EmptyGroup,

	#[error("malformed transaction: {0}")]
	MalformedTransaction(String),

	#[error("incomplete signing result: expected {expected} signed transactions, got {returned}")]
	IncompleteSigningResult { expected: usize, returned: usize },

	#[error("transaction at index {0} cannot be signed by the connected accounts")]
	UnauthorizedSigner(usize),

	#[error("{0} does not support {1}")]
	MethodNotSupported(WalletId, String),

	#[error("network {0} is not supported by {1}")]
	NetworkNotSupported(NetworkId, WalletId),

	#[error("request timed out after {0:?}")]
	TimedOut(std::time::Duration),

	#[error("persisted session no longer matches the live account set")]
	SessionMismatch,

	#[error("user cancelled the request")]
	UserCancelled,

	#[error("storage error: {0}")]
	Storage(String),

	#[error("transport error: {0}")]
	Transport(String),

	#[error("backend error: {0}")]
	Backend(String),
}
