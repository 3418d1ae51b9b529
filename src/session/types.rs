//! Session state types shared by the store and the adapters.

use crate::transaction::codec::Address;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Identifiers for the supported backends. The string forms are persisted
/// inside session snapshots and must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletId {
	/// Raw mnemonic backend, signing locally with a derived key.
	Mnemonic,
	/// Mobile-bridge backend speaking JSON-RPC over a relay transport.
	Bridge,
	/// Hosted key-management-service backend.
	Vault,
	/// Browser-injected provider backend.
	Extension,
}

impl WalletId {
	pub fn as_str(&self) -> &'static str {
		match self {
			WalletId::Mnemonic => "mnemonic",
			WalletId::Bridge => "bridge",
			WalletId::Vault => "vault",
			WalletId::Extension => "extension",
		}
	}
}

impl std::fmt::Display for WalletId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Network the session is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
	MainNet,
	TestNet,
	DevNet,
	LocalNet,
}

impl std::fmt::Display for NetworkId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			NetworkId::MainNet => "mainnet",
			NetworkId::TestNet => "testnet",
			NetworkId::DevNet => "devnet",
			NetworkId::LocalNet => "localnet",
		};
		f.write_str(name)
	}
}

/// One authorized account: a display label plus the invariant address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
	pub name: String,
	pub address: Address,
}

/// Per-backend session state. `accounts` is non-empty while the entry
/// exists, and `active_account`, when set, is a member of `accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
	pub accounts: Vec<WalletAccount>,
	pub active_account: Option<WalletAccount>,
}

/// The process-wide session snapshot: one `WalletState` per connected
/// backend, plus the active backend and network pointers. `active_wallet`,
/// when set, has an entry in `wallets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	pub wallets: HashMap<WalletId, WalletState>,
	pub active_wallet: Option<WalletId>,
	pub active_network: NetworkId,
}

impl SessionState {
	pub fn new(active_network: NetworkId) -> Self {
		Self {
			wallets: HashMap::new(),
			active_wallet: None,
			active_network,
		}
	}
}

impl Default for SessionState {
	fn default() -> Self {
		Self::new(NetworkId::TestNet)
	}
}

/// Set-equality comparison of two account lists: true iff their address
/// sets are equal, independent of order, duplicates and display names.
pub fn accounts_match(a: &[WalletAccount], b: &[WalletAccount]) -> bool {
	let left: BTreeSet<&str> = a.iter().map(|account| account.address.as_str()).collect();
	let right: BTreeSet<&str> = b.iter().map(|account| account.address.as_str()).collect();
	left == right
}

/// Map raw backend addresses to labeled accounts, assigning deterministic
/// display names and dropping duplicate addresses while preserving order.
pub fn label_accounts(backend_name: &str, addresses: &[Address]) -> Vec<WalletAccount> {
	addresses
		.iter()
		.unique()
		.enumerate()
		.map(|(n, address)| WalletAccount {
			name: format!("{} Account {}", backend_name, n + 1),
			address: address.clone(),
		})
		.collect()
}
