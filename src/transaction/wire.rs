//! Per-transaction wire item exchanged with backends.
//!
//! Every backend adapter produces or consumes this shape: the unsigned
//! transaction as base64, an optional `signers` list where an empty list
//! means "do not sign this one", an optional `stxn` echoing already-signed
//! bytes, an optional rekeyed signing authority, and display-only message
//! hints.

use crate::transaction::codec::{self, Address};
use crate::transaction::group::SigningInstruction;

use serde::{Deserialize, Serialize};

/// One transaction as presented to a backend for approval and signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
	/// Base64 of the canonical unsigned-transaction encoding (the original
	/// blob when the entry could not be decoded).
	pub txn: String,
	/// Absent means "please sign"; an empty list means "do not sign".
	#[serde(skip_serializing_if = "Option::is_none")]
	pub signers: Option<Vec<Address>>,
	/// Base64 of the already-signed form, echoed when the caller wants the
	/// original signed bytes back for a non-signable entry.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stxn: Option<String>,
	/// Rekeyed signing authority override.
	#[serde(rename = "authAddr", skip_serializing_if = "Option::is_none")]
	pub auth_addr: Option<Address>,
	/// Human-readable hint for this transaction; no semantic effect.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Human-readable hint for the whole group; no semantic effect.
	#[serde(rename = "groupMessage", skip_serializing_if = "Option::is_none")]
	pub group_message: Option<String>,
}

impl WalletTransaction {
	/// Build the wire item for one signing instruction. Backends require the
	/// unsigned form even for pass-through entries, so the decoded payload
	/// is re-encoded when available; already-signed entries keep their
	/// original bytes in `stxn`.
	pub fn from_instruction(instruction: &SigningInstruction) -> Self {
		let txn = match &instruction.txn {
			Some(unsigned) => codec::encode_unsigned(unsigned)
				.map(|bytes| codec::to_base64(&bytes))
				.unwrap_or_else(|_| codec::to_base64(&instruction.raw)),
			None => codec::to_base64(&instruction.raw),
		};

		let signers = if instruction.should_sign { None } else { Some(Vec::new()) };
		let stxn = instruction
			.already_signed
			.then(|| codec::to_base64(&instruction.raw));

		WalletTransaction {
			txn,
			signers,
			stxn,
			auth_addr: None,
			message: None,
			group_message: None,
		}
	}
}

/// Convert a full instruction sequence into the wire items a backend
/// consumes, preserving order.
pub fn to_wire(instructions: &[SigningInstruction]) -> Vec<WalletTransaction> {
	instructions.iter().map(WalletTransaction::from_instruction).collect()
}
