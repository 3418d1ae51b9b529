//! Browser-injected provider backend.
//!
//! Wraps a provider object the host page injects (the extension's own SDK
//! surface), modeled here as a trait. Approval happens inside the
//! extension's popup: a cancelled popup resolves to an empty account list,
//! which this adapter reports as a cancellation rather than a failure.
//! Results come back in the positional ARC-0001 convention.

use crate::adapter::{ClientSlot, ConnectArgs, WalletAdapter, WalletId};
use crate::error::WalletError;
use crate::session::store::SessionStore;
use crate::transaction::codec::Address;
use crate::transaction::group::SigningInstruction;
use crate::transaction::reconcile::SignedResponse;
use crate::transaction::wire::{self, WalletTransaction};

use std::sync::Arc;

/// The injected provider surface. `sign_transactions` receives one wire
/// item per position and returns one entry per position, `None` for
/// positions it did not sign. A provider lacking a capability reports
/// `MethodNotSupported`.
#[async_trait::async_trait]
pub trait InjectedProvider: Send + Sync {
	/// Run the extension's authorization popup. An empty list means the
	/// user closed it without approving.
	async fn enable(&self) -> Result<Vec<Address>, WalletError>;
	async fn sign_transactions(
		&self,
		items: Vec<WalletTransaction>,
	) -> Result<Vec<Option<Vec<u8>>>, WalletError>;
	async fn disable(&self) -> Result<(), WalletError>;
}

/// Locates the injected provider; invoked at most once while the client
/// slot is populated (providers may appear only after page load).
#[async_trait::async_trait]
pub trait ProviderLocator: Send + Sync {
	async fn locate(&self) -> Result<Arc<dyn InjectedProvider>, WalletError>;
}

/// Browser-extension wallet backend.
pub struct ExtensionWallet {
	store: Arc<SessionStore>,
	locator: Box<dyn ProviderLocator>,
	client: ClientSlot<Arc<dyn InjectedProvider>>,
}

impl ExtensionWallet {
	pub fn new(store: Arc<SessionStore>, locator: Box<dyn ProviderLocator>) -> Self {
		Self {
			store,
			locator,
			client: ClientSlot::new(),
		}
	}

	async fn provider(&self) -> Result<Arc<Arc<dyn InjectedProvider>>, WalletError> {
		self.client
			.get_or_materialize(|| async { self.locator.locate().await })
			.await
	}
}

#[async_trait::async_trait]
impl WalletAdapter for ExtensionWallet {
	fn id(&self) -> WalletId {
		WalletId::Extension
	}

	fn display_name(&self) -> &'static str {
		"Extension"
	}

	fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	async fn authorize(&self, _args: Option<ConnectArgs>) -> Result<Vec<Address>, WalletError> {
		let provider = self.provider().await?;
		let addresses = provider.enable().await?;
		if addresses.is_empty() {
			// This provider distinguishes cancellation: a closed popup
			// yields an empty list, never an error.
			return Err(WalletError::UserCancelled);
		}
		Ok(addresses)
	}

	async fn fetch_live_accounts(&self) -> Result<Vec<Address>, WalletError> {
		let provider = self.provider().await?;
		provider.enable().await
	}

	async fn teardown(&self) -> Result<(), WalletError> {
		let result = match self.client.current().await {
			Ok(provider) => provider.disable().await,
			Err(_) => Ok(()),
		};
		self.client.clear().await;
		result
	}

	async fn sign_instructions(
		&self,
		instructions: &[SigningInstruction],
	) -> Result<SignedResponse, WalletError> {
		let provider = self.client.current().await?;
		let items = wire::to_wire(instructions);
		let entries = provider.sign_transactions(items).await?;
		Ok(SignedResponse::Positional(entries))
	}
}
