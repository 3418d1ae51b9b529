//! Transaction group processing.
//!
//! A group arrives either flat or pre-grouped (a sequence of sequences) and
//! is always flattened, preserving order, before anything else happens. For
//! each position the processor decides whether the active backend should
//! attempt to sign it, producing one `SigningInstruction` per position in
//! the same order.

use crate::error::WalletError;
use crate::transaction::codec::{self, Address, UnsignedTransaction};

use tracing::debug;

/// An opaque encoded transaction blob.
pub type RawTransaction = Vec<u8>;

/// An ordered transaction group, possibly pre-grouped. Order is semantically
/// significant and is never changed, only flattened.
#[derive(Debug, Clone)]
pub enum TransactionGroup {
	Single(Vec<RawTransaction>),
	Grouped(Vec<Vec<RawTransaction>>),
}

impl TransactionGroup {
	/// Flatten into one ordered sequence, concatenating sub-groups in order.
	pub fn flatten(self) -> Vec<RawTransaction> {
		match self {
			TransactionGroup::Single(txns) => txns,
			TransactionGroup::Grouped(groups) => groups.into_iter().flatten().collect(),
		}
	}
}

impl From<Vec<RawTransaction>> for TransactionGroup {
	fn from(txns: Vec<RawTransaction>) -> Self {
		TransactionGroup::Single(txns)
	}
}

/// Per-transaction directive sent to a backend: either "please sign"
/// (`should_sign`) or "do not sign". Produced 1:1 with the flattened group.
#[derive(Debug, Clone)]
pub struct SigningInstruction {
	/// Position in the flattened group.
	pub position: usize,
	/// The original encoded bytes, exactly as submitted.
	pub raw: RawTransaction,
	/// The decoded unsigned payload (the inner transaction when the blob was
	/// already signed). `None` when the blob could not be decoded at all.
	pub txn: Option<UnsignedTransaction>,
	/// Whether the blob already carried a signature envelope.
	pub already_signed: bool,
	/// Whether the backend should attempt to sign this position.
	pub should_sign: bool,
}

/// Derive the per-position signing instructions for a group.
///
/// A position is marked "please sign" when it is selected by
/// `indexes_to_sign` (or no subset was given), is not already signed, and
/// its sender is one of the connected addresses. A transaction that cannot
/// be decoded degrades to "do not sign" rather than aborting the group.
pub fn build_signing_instructions(
	group: TransactionGroup,
	connected_addresses: &[Address],
	indexes_to_sign: Option<&[usize]>,
) -> Result<Vec<SigningInstruction>, WalletError> {
	let flattened = group.flatten();
	if flattened.is_empty() {
		return Err(WalletError::EmptyGroup);
	}

	let mut instructions = Vec::with_capacity(flattened.len());
	for (position, raw) in flattened.into_iter().enumerate() {
		let is_index_match = indexes_to_sign.is_none_or(|indexes| indexes.contains(&position));

		let (txn, already_signed, can_sign) = match codec::decode(&raw) {
			Ok(decoded) => {
				let already_signed = decoded.is_signed();
				let can_sign = !already_signed && connected_addresses.contains(decoded.sender());
				(Some(decoded.unsigned().clone()), already_signed, can_sign)
			}
			Err(e) => {
				// Undecodable entries are skipped, not fatal.
				debug!("transaction at index {} is not decodable ({}), skipping", position, e);
				(None, false, false)
			}
		};

		let should_sign = is_index_match && can_sign;
		debug!(
			"instruction {}: index_match={}, already_signed={}, can_sign={}, should_sign={}",
			position, is_index_match, already_signed, can_sign, should_sign
		);

		instructions.push(SigningInstruction {
			position,
			raw,
			txn,
			already_signed,
			should_sign,
		});
	}

	Ok(instructions)
}

/// Check that every requested index resolved to a "please sign" instruction.
/// Used by the strict programmatic signer, where a requested-but-unsignable
/// index is an error rather than a pass-through.
pub fn ensure_all_signable(
	instructions: &[SigningInstruction],
	indexes_to_sign: &[usize],
) -> Result<(), WalletError> {
	for &index in indexes_to_sign {
		let signable = instructions
			.get(index)
			.map(|instruction| instruction.should_sign)
			.unwrap_or(false);
		if !signable {
			return Err(WalletError::UnauthorizedSigner(index));
		}
	}
	Ok(())
}
