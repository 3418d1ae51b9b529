//! Local mnemonic backend.
//!
//! Signs with an ed25519 key derived from a user-supplied phrase. The
//! phrase is collected through an injected credential provider rather than
//! any specific UI mechanism, so hosts decide how (and whether) to prompt.
//! Intended for development and testing flows; the phrase never leaves the
//! process.

use crate::adapter::{ClientSlot, ConnectArgs, WalletAdapter, WalletId};
use crate::error::WalletError;
use crate::session::store::SessionStore;
use crate::session::types::NetworkId;
use crate::transaction::codec::{self, Address, DecodedTransaction, SignatureEnvelope};
use crate::transaction::group::SigningInstruction;
use crate::transaction::reconcile::SignedResponse;

use bech32::{Bech32m, Hrp};
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

/// Collects the mnemonic phrase. Implementations may prompt the user, read
/// a keystore, or return a fixture in tests.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
	async fn mnemonic(&self) -> Result<String, WalletError>;
}

/// The materialized signing client: one derived account.
pub struct MnemonicSigner {
	key: SigningKey,
	address: Address,
}

impl MnemonicSigner {
	/// Derive the signing key and address from a phrase. The address is the
	/// bech32m encoding of the verifying key under a network-dependent HRP.
	pub fn derive(phrase: &str, network: NetworkId) -> Result<Self, WalletError> {
		let phrase = phrase.trim();
		if phrase.is_empty() {
			return Err(WalletError::Backend("empty mnemonic phrase".to_string()));
		}

		let digest = Sha256::digest(phrase.as_bytes());
		let key = SigningKey::from_bytes(&digest.into());
		let address = encode_address(&key, network)?;

		Ok(Self { key, address })
	}

	pub fn address(&self) -> &Address {
		&self.address
	}

	/// Sign one unsigned transaction, producing the canonical signed blob.
	pub fn sign(&self, instruction: &SigningInstruction) -> Result<Vec<u8>, WalletError> {
		let txn = instruction.txn.clone().ok_or_else(|| {
			WalletError::MalformedTransaction(format!(
				"transaction at index {} has no decodable payload",
				instruction.position
			))
		})?;
		let message = codec::encode_unsigned(&txn)?;
		let signature = self.key.sign(&message);
		codec::encode(&DecodedTransaction::Signed(SignatureEnvelope {
			txn,
			signature: signature.to_bytes().to_vec(),
			auth_address: None,
		}))
	}
}

fn encode_address(key: &SigningKey, network: NetworkId) -> Result<Address, WalletError> {
	let network_suffix = match network {
		NetworkId::MainNet => "",
		NetworkId::TestNet => "_test",
		NetworkId::DevNet => "_dev",
		NetworkId::LocalNet => "_local",
	};
	let hrp_str = format!("wg{}", network_suffix);
	let hrp = Hrp::parse(&hrp_str)
		.map_err(|e| WalletError::Backend(format!("invalid address HRP: {}", e)))?;
	bech32::encode::<Bech32m>(hrp, key.verifying_key().as_bytes())
		.map_err(|e| WalletError::Backend(format!("failed to encode address: {}", e)))
}

/// Mnemonic wallet backend. Uses the compact result convention.
pub struct MnemonicWallet {
	store: Arc<SessionStore>,
	provider: Box<dyn CredentialProvider>,
	client: ClientSlot<MnemonicSigner>,
}

impl MnemonicWallet {
	pub fn new(store: Arc<SessionStore>, provider: Box<dyn CredentialProvider>) -> Self {
		Self {
			store,
			provider,
			client: ClientSlot::new(),
		}
	}

	async fn signer(&self) -> Result<Arc<MnemonicSigner>, WalletError> {
		let network = self.store.active_network();
		self.client
			.get_or_materialize(|| async {
				let phrase = self.provider.mnemonic().await?;
				let signer = MnemonicSigner::derive(&phrase, network)?;
				info!("derived mnemonic signer for {}", signer.address());
				Ok(signer)
			})
			.await
	}
}

#[async_trait::async_trait]
impl WalletAdapter for MnemonicWallet {
	fn id(&self) -> WalletId {
		WalletId::Mnemonic
	}

	fn display_name(&self) -> &'static str {
		"Mnemonic"
	}

	fn store(&self) -> &Arc<SessionStore> {
		&self.store
	}

	async fn authorize(&self, _args: Option<ConnectArgs>) -> Result<Vec<Address>, WalletError> {
		let signer = self.signer().await?;
		Ok(vec![signer.address().clone()])
	}

	async fn fetch_live_accounts(&self) -> Result<Vec<Address>, WalletError> {
		// Re-deriving through the provider is the only way to re-obtain key
		// material after a reload.
		let signer = self.signer().await?;
		Ok(vec![signer.address().clone()])
	}

	async fn teardown(&self) -> Result<(), WalletError> {
		self.client.clear().await;
		Ok(())
	}

	async fn sign_instructions(
		&self,
		instructions: &[SigningInstruction],
	) -> Result<SignedResponse, WalletError> {
		let signer = self.client.current().await?;
		let mut signed = Vec::new();
		for instruction in instructions.iter().filter(|i| i.should_sign) {
			signed.push(signer.sign(instruction)?);
		}
		Ok(SignedResponse::Compact(signed))
	}
}
