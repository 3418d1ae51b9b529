//! Tests for the session store: mutation invariants and persistence.

use std::sync::Arc;

use wallet_gateway::session::storage::{FileStorage, MemoryStorage, SessionStorage};
use wallet_gateway::session::store::{SESSION_STORAGE_KEY, SessionStore};
use wallet_gateway::session::types::{
	NetworkId, WalletAccount, WalletId, WalletState, accounts_match, label_accounts,
};
use wallet_gateway::WalletError;

fn account(name: &str, address: &str) -> WalletAccount {
	WalletAccount {
		name: name.to_string(),
		address: address.to_string(),
	}
}

fn wallet_with(addresses: &[&str]) -> WalletState {
	let accounts: Vec<WalletAccount> = addresses
		.iter()
		.enumerate()
		.map(|(n, a)| account(&format!("Account {}", n + 1), a))
		.collect();
	WalletState {
		active_account: accounts.first().cloned(),
		accounts,
	}
}

fn memory_store() -> SessionStore {
	SessionStore::new(Box::new(MemoryStorage::new()), NetworkId::TestNet)
}

#[test]
fn first_connected_wallet_becomes_active() {
	let store = memory_store();
	store.add_wallet(WalletId::Mnemonic, wallet_with(&["addr1"])).unwrap();
	store.add_wallet(WalletId::Vault, wallet_with(&["addr2"])).unwrap();

	assert_eq!(store.active_wallet(), Some(WalletId::Mnemonic));
}

#[test]
fn adding_empty_wallet_is_rejected() {
	let store = memory_store();
	let result = store.add_wallet(WalletId::Vault, wallet_with(&[]));
	assert!(matches!(result, Err(WalletError::NoAccountsFound(WalletId::Vault))));
	assert!(store.wallet_state(WalletId::Vault).is_none());
}

#[test]
fn add_wallet_coerces_foreign_active_account() {
	let store = memory_store();
	store
		.add_wallet(
			WalletId::Vault,
			WalletState {
				accounts: vec![account("one", "a"), account("two", "b")],
				active_account: Some(account("stray", "z")),
			},
		)
		.unwrap();

	assert_eq!(store.active_account(WalletId::Vault).unwrap().address, "a");
}

#[test]
fn set_accounts_keeps_active_account_when_it_survives() {
	let store = memory_store();
	store.add_wallet(WalletId::Extension, wallet_with(&["a", "b"])).unwrap();
	store.set_active_account(WalletId::Extension, "b").unwrap();

	store
		.set_accounts(WalletId::Extension, vec![account("x", "c"), account("y", "b")])
		.unwrap();

	assert_eq!(store.active_account(WalletId::Extension).unwrap().address, "b");
}

#[test]
fn set_accounts_falls_back_to_first_when_active_disappears() {
	let store = memory_store();
	store.add_wallet(WalletId::Extension, wallet_with(&["a", "b"])).unwrap();
	store.set_active_account(WalletId::Extension, "b").unwrap();

	store
		.set_accounts(WalletId::Extension, vec![account("x", "c"), account("y", "d")])
		.unwrap();

	assert_eq!(store.active_account(WalletId::Extension).unwrap().address, "c");
}

#[test]
fn set_active_account_requires_membership() {
	let store = memory_store();
	store.add_wallet(WalletId::Bridge, wallet_with(&["a"])).unwrap();

	let result = store.set_active_account(WalletId::Bridge, "nope");
	assert!(matches!(result, Err(WalletError::AccountNotFound(_))));
}

#[test]
fn remove_wallet_clears_active_pointer() {
	let store = memory_store();
	store.add_wallet(WalletId::Mnemonic, wallet_with(&["a"])).unwrap();
	store.add_wallet(WalletId::Vault, wallet_with(&["b"])).unwrap();

	store.remove_wallet(WalletId::Mnemonic).unwrap();
	assert_eq!(store.active_wallet(), None);
	// The remaining backend is untouched.
	assert!(store.wallet_state(WalletId::Vault).is_some());

	// Removing an absent entry is a no-op.
	store.remove_wallet(WalletId::Mnemonic).unwrap();
}

#[test]
fn reset_drops_state_and_persisted_record() {
	let storage = Arc::new(MemoryStorage::new());

	struct Shared(Arc<MemoryStorage>);
	impl SessionStorage for Shared {
		fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
			self.0.get(key)
		}
		fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
			self.0.set(key, value)
		}
		fn remove(&self, key: &str) -> Result<(), WalletError> {
			self.0.remove(key)
		}
	}

	let store = SessionStore::new(Box::new(Shared(storage.clone())), NetworkId::MainNet);
	store.add_wallet(WalletId::Vault, wallet_with(&["a"])).unwrap();
	assert!(storage.get(SESSION_STORAGE_KEY).unwrap().is_some());

	store.reset().unwrap();
	assert!(storage.get(SESSION_STORAGE_KEY).unwrap().is_none());
	assert_eq!(store.active_wallet(), None);
	// The network pointer survives a reset.
	assert_eq!(store.active_network(), NetworkId::MainNet);
}

#[test]
fn session_round_trips_through_file_storage() {
	let dir = tempfile::tempdir().unwrap();

	{
		let store = SessionStore::new(
			Box::new(FileStorage::new(dir.path().to_path_buf())),
			NetworkId::TestNet,
		);
		store.add_wallet(WalletId::Extension, wallet_with(&["addr1", "addr2"])).unwrap();
		store.set_active_account(WalletId::Extension, "addr2").unwrap();
		store.set_active_network(NetworkId::LocalNet).unwrap();
	}

	// A new store instance over the same directory restores the snapshot.
	let restored = SessionStore::new(
		Box::new(FileStorage::new(dir.path().to_path_buf())),
		NetworkId::TestNet,
	);
	assert_eq!(restored.active_wallet(), Some(WalletId::Extension));
	assert_eq!(restored.active_network(), NetworkId::LocalNet);
	assert_eq!(
		restored.active_account(WalletId::Extension).unwrap().address,
		"addr2"
	);
	assert_eq!(
		restored.connected_addresses(WalletId::Extension),
		vec!["addr1".to_string(), "addr2".to_string()]
	);
}

#[test]
fn corrupt_persisted_session_starts_fresh() {
	let dir = tempfile::tempdir().unwrap();
	let storage = FileStorage::new(dir.path().to_path_buf());
	storage.set(SESSION_STORAGE_KEY, "not json at all").unwrap();

	let store = SessionStore::new(
		Box::new(FileStorage::new(dir.path().to_path_buf())),
		NetworkId::DevNet,
	);
	assert_eq!(store.active_wallet(), None);
	assert_eq!(store.active_network(), NetworkId::DevNet);
}

#[test]
fn accounts_match_ignores_order_and_names() {
	let a = vec![account("Ext Account 1", "x"), account("Ext Account 2", "y")];
	let b = vec![account("other", "y"), account("renamed", "x")];
	assert!(accounts_match(&a, &b));

	let c = vec![account("only", "x")];
	assert!(!accounts_match(&a, &c));
}

#[test]
fn label_accounts_dedupes_and_numbers() {
	let labeled = label_accounts(
		"Vault",
		&["a".to_string(), "b".to_string(), "a".to_string()],
	);
	assert_eq!(labeled.len(), 2);
	assert_eq!(labeled[0].name, "Vault Account 1");
	assert_eq!(labeled[0].address, "a");
	assert_eq!(labeled[1].name, "Vault Account 2");
	assert_eq!(labeled[1].address, "b");
}
