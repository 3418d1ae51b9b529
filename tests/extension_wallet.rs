//! Tests for the browser-injected provider backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use wallet_gateway::adapter::extension::{ExtensionWallet, InjectedProvider, ProviderLocator};
use wallet_gateway::session::storage::MemoryStorage;
use wallet_gateway::session::store::SessionStore;
use wallet_gateway::session::types::{NetworkId, WalletId};
use wallet_gateway::transaction::codec::{self, Address, DecodedTransaction, UnsignedTransaction};
use wallet_gateway::transaction::group::TransactionGroup;
use wallet_gateway::transaction::wire::WalletTransaction;
use wallet_gateway::{WalletAdapter, WalletError};

fn store() -> Arc<SessionStore> {
	Arc::new(SessionStore::new(Box::new(MemoryStorage::new()), NetworkId::TestNet))
}

fn unsigned(sender: &str) -> Vec<u8> {
	codec::encode(&DecodedTransaction::Unsigned(UnsignedTransaction {
		sender: sender.to_string(),
		body: vec![0x42; 4],
	}))
	.unwrap()
}

/// Provider double: `enable` answers a fixed account list (empty models a
/// closed popup), `sign_transactions` signs every requested item.
struct StubProvider {
	accounts: Vec<Address>,
	enable_calls: AtomicUsize,
	disabled: AtomicBool,
}

impl StubProvider {
	fn new(accounts: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			accounts: accounts.iter().map(|a| a.to_string()).collect(),
			enable_calls: AtomicUsize::new(0),
			disabled: AtomicBool::new(false),
		})
	}
}

#[async_trait::async_trait]
impl InjectedProvider for StubProvider {
	async fn enable(&self) -> Result<Vec<Address>, WalletError> {
		self.enable_calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.accounts.clone())
	}

	async fn sign_transactions(
		&self,
		items: Vec<WalletTransaction>,
	) -> Result<Vec<Option<Vec<u8>>>, WalletError> {
		Ok(items
			.into_iter()
			.enumerate()
			.map(|(n, item)| item.signers.is_none().then(|| format!("ext-sig-{}", n).into_bytes()))
			.collect())
	}

	async fn disable(&self) -> Result<(), WalletError> {
		self.disabled.store(true, Ordering::SeqCst);
		Ok(())
	}
}

struct StubLocator(Arc<StubProvider>);

#[async_trait::async_trait]
impl ProviderLocator for StubLocator {
	async fn locate(&self) -> Result<Arc<dyn InjectedProvider>, WalletError> {
		Ok(self.0.clone())
	}
}

fn wallet(store: Arc<SessionStore>, provider: Arc<StubProvider>) -> ExtensionWallet {
	ExtensionWallet::new(store, Box::new(StubLocator(provider)))
}

#[tokio::test]
async fn connect_labels_provider_accounts() {
	let store = store();
	let provider = StubProvider::new(&["addr-1", "addr-2"]);
	let wallet = wallet(store.clone(), provider.clone());

	let accounts = wallet.connect(None).await.unwrap();

	assert_eq!(accounts.len(), 2);
	assert_eq!(accounts[0].name, "Extension Account 1");
	assert_eq!(store.active_wallet(), Some(WalletId::Extension));
	assert_eq!(provider.enable_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn closed_popup_resolves_as_cancelled_connect() {
	let store = store();
	let wallet = wallet(store.clone(), StubProvider::new(&[]));

	// An empty enable() result models the user closing the popup; connect
	// resolves empty without an error and without touching the store.
	let accounts = wallet.connect(None).await.unwrap();

	assert!(accounts.is_empty());
	assert!(store.wallet_state(WalletId::Extension).is_none());
	assert_eq!(store.active_wallet(), None);
}

#[tokio::test]
async fn signing_uses_the_positional_convention() {
	let store = store();
	let wallet = wallet(store.clone(), StubProvider::new(&["alice"]));
	wallet.connect(None).await.unwrap();

	let originals = vec![unsigned("alice"), unsigned("mallory"), unsigned("alice")];
	let group = TransactionGroup::Single(originals.clone());
	let merged = wallet.sign_transactions(group, None, true).await.unwrap();

	assert_eq!(merged.len(), 3);
	assert_eq!(merged[0].as_deref(), Some(b"ext-sig-0".as_slice()));
	// The foreign sender's entry is declined by the provider and the
	// original bytes are passed through.
	assert_eq!(merged[1].as_deref(), Some(originals[1].as_slice()));
	assert_eq!(merged[2].as_deref(), Some(b"ext-sig-2".as_slice()));
}

#[tokio::test]
async fn disconnect_disables_the_provider() {
	let store = store();
	let provider = StubProvider::new(&["alice"]);
	let wallet = wallet(store.clone(), provider.clone());
	wallet.connect(None).await.unwrap();

	wallet.disconnect().await.unwrap();

	assert!(provider.disabled.load(Ordering::SeqCst));
	assert!(store.wallet_state(WalletId::Extension).is_none());
	let group = TransactionGroup::Single(vec![unsigned("alice")]);
	assert!(matches!(
		wallet.sign_transactions(group, None, true).await,
		Err(WalletError::ClientNotInitialized)
	));
}
