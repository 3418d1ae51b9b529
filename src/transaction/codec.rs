//! Canonical binary transaction codec.
//!
//! Transactions travel between the application and the backends as opaque
//! byte blobs in a canonical, self-describing encoding. The codec decodes a
//! blob into either a bare unsigned transaction or a signature envelope
//! wrapping one, extracts the sender, and converts between the byte and
//! base64 wire representations several backends exchange instead of raw
//! bytes.

use crate::error::WalletError;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Opaque string identifier for a signing key.
pub type Address = String;

/// The unsigned transaction payload. The sender address is the only field
/// the signing protocol interprets; everything else is an opaque body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
	/// Sender address, used to decide which backend account may sign.
	pub sender: Address,
	/// Application payload, never inspected by the protocol.
	pub body: Vec<u8>,
}

/// A signed transaction: the inner unsigned transaction plus its signature
/// and an optional rekeyed signing authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelope {
	pub txn: UnsignedTransaction,
	pub signature: Vec<u8>,
	/// Rekeyed signing authority, when the signature was produced by an
	/// address other than the sender.
	pub auth_address: Option<Address>,
}

/// A decoded transaction blob: either still unsigned, or wrapped in a
/// signature envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedTransaction {
	Unsigned(UnsignedTransaction),
	Signed(SignatureEnvelope),
}

impl DecodedTransaction {
	/// True iff the blob carries a signature envelope rather than being the
	/// unsigned transaction itself.
	pub fn is_signed(&self) -> bool {
		matches!(self, DecodedTransaction::Signed(_))
	}

	/// The sender of the unsigned transaction, unwrapping the signature
	/// envelope first when signed.
	pub fn sender(&self) -> &Address {
		&self.unsigned().sender
	}

	/// The inner unsigned transaction.
	pub fn unsigned(&self) -> &UnsignedTransaction {
		match self {
			DecodedTransaction::Unsigned(txn) => txn,
			DecodedTransaction::Signed(envelope) => &envelope.txn,
		}
	}
}

/// Decode a canonical transaction blob.
pub fn decode(bytes: &[u8]) -> Result<DecodedTransaction, WalletError> {
	bincode::deserialize(bytes)
		.map_err(|e| WalletError::MalformedTransaction(format!("failed to decode transaction: {}", e)))
}

/// Encode a transaction into its canonical blob form.
pub fn encode(txn: &DecodedTransaction) -> Result<Vec<u8>, WalletError> {
	bincode::serialize(txn)
		.map_err(|e| WalletError::MalformedTransaction(format!("failed to encode transaction: {}", e)))
}

/// Encode an unsigned transaction into its canonical blob form. This is the
/// byte sequence signatures are computed over.
pub fn encode_unsigned(txn: &UnsignedTransaction) -> Result<Vec<u8>, WalletError> {
	encode(&DecodedTransaction::Unsigned(txn.clone()))
}

/// Base64 form of a transaction blob, for backends that exchange base64
/// rather than raw bytes.
pub fn to_base64(bytes: &[u8]) -> String {
	BASE64.encode(bytes)
}

/// Decode a base64 wire representation back into the canonical blob.
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, WalletError> {
	BASE64
		.decode(encoded)
		.map_err(|e| WalletError::MalformedTransaction(format!("invalid base64 transaction: {}", e)))
}
