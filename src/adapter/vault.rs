//! Hosted key-management-service backend.
//!
//! The service itself (daemon, REST API, enterprise signer) is injected as
//! a `KeyService`; this adapter translates the signing protocol into
//! per-transaction remote signing calls and collects the results in the
//! compact convention.

use crate::adapter::{ClientSlot, ConnectArgs, WalletAdapter, WalletId};
use crate::error::WalletError;
use crate::session::store::SessionStore;
use crate::transaction::codec::Address;
use crate::transaction::group::SigningInstruction;
use crate::transaction::reconcile::SignedResponse;

use std::sync::Arc;
use tracing::debug;

/// The injected key-management service.
#[async_trait::async_trait]
pub trait KeyService: Send + Sync {
	/// Addresses the service holds keys for.
	async fn list_keys(&self) -> Result<Vec<Address>, WalletError>;
	/// Sign one canonical unsigned blob with the key for `address`,
	/// returning the canonical signed blob.
	async fn sign_transaction(&self, address: &str, txn: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// Materializes a connected service handle; invoked at most once while the
/// client slot is populated.
#[async_trait::async_trait]
pub trait KeyServiceFactory: Send + Sync {
	async fn connect(&self) -> Result<Arc<dyn KeyService>, WalletError>;
}

/// Hosted key-service wallet backend.
pub struct VaultWallet {
	store: Arc<SessionStore>,
	factory: Box<dyn KeyServiceFactory>,
	client: ClientSlot<Arc<dyn KeyService>>,
}

impl VaultWallet {
	pub fn new(store: Arc<SessionStore>, factory: Box<dyn KeyServiceFactory>) -> Self {
		Self {
			store,
			factory,
			client: ClientSlot::new(),
		}
	}

	async fn service(&self) -> Result<Arc<dyn KeyService>, WalletError> {
		let service = self
			.client
			.get_or_materialize(|| async { self.factory.connect().await })
			.await?;
		Ok(service.as_ref().clone())
	}
}

#[async_trait::async_trait]
impl WalletAdapter for VaultWallet {
	fn id(&self) -> WalletId {
		WalletId::Vault
	}

	fn display_name(&self) -> &'static str {
		"Vault"
	}

	fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	async fn authorize(&self, _args: Option<ConnectArgs>) -> Result<Vec<Address>, WalletError> {
		let service = self.service().await?;
		service.list_keys().await
	}

	async fn fetch_live_accounts(&self) -> Result<Vec<Address>, WalletError> {
		let service = self.service().await?;
		service.list_keys().await
	}

	async fn teardown(&self) -> Result<(), WalletError> {
		self.client.clear().await;
		Ok(())
	}

	async fn sign_instructions(
		&self,
		instructions: &[SigningInstruction],
	) -> Result<SignedResponse, WalletError> {
		let service = self.client.current().await?;
		let mut signed = Vec::new();
		for instruction in instructions.iter().filter(|i| i.should_sign) {
			let sender = instruction
				.txn
				.as_ref()
				.map(|txn| txn.sender.clone())
				.ok_or_else(|| {
					WalletError::MalformedTransaction(format!(
						"transaction at index {} has no decodable payload",
						instruction.position
					))
				})?;
			debug!("requesting vault signature for index {}", instruction.position);
			signed.push(service.sign_transaction(&sender, &instruction.raw).await?);
		}
		Ok(SignedResponse::Compact(signed))
	}
}
