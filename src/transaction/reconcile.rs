//! Reassembly of backend signing results.
//!
//! Backends return their newly-signed transactions in one of two wire
//! conventions, and both exist in the wild:
//!
//! - compact: only the bytes for transactions the backend agreed to sign,
//!   in the same relative order as the "please sign" instructions;
//! - positional: one entry per original position, `None` meaning "not
//!   signed by me" (the ARC-0001 null-for-unsigned convention).
//!
//! The reconciler merges either shape back into the full, order-preserving
//! result array. It never reorders and never silently pads.

use crate::error::WalletError;
use crate::transaction::group::SigningInstruction;

use std::collections::VecDeque;

/// A backend's signing result, in whichever wire convention the backend's
/// SDK uses.
#[derive(Debug, Clone)]
pub enum SignedResponse {
	/// Only the newly-signed bytes, in "please sign" order.
	Compact(Vec<Vec<u8>>),
	/// One entry per original position; `None` marks positions the backend
	/// did not sign.
	Positional(Vec<Option<Vec<u8>>>),
}

/// Merge a backend response back into the order-preserving result array.
///
/// With `return_group` set, the output has one entry per original position,
/// unsigned positions carrying the original bytes. Without it, the output
/// keeps only the signed positions (compact) or passes nulls through
/// unchanged (positional), still in original relative order.
///
/// A compact response whose length differs from the number of "please sign"
/// instructions fails, in either direction; extra entries are never dropped.
pub fn merge(
	instructions: &[SigningInstruction],
	response: SignedResponse,
	return_group: bool,
) -> Result<Vec<Option<Vec<u8>>>, WalletError> {
	match response {
		SignedResponse::Compact(signed) => {
			let expected = instructions.iter().filter(|i| i.should_sign).count();
			if signed.len() != expected {
				return Err(WalletError::IncompleteSigningResult {
					expected,
					returned: signed.len(),
				});
			}

			let mut queue: VecDeque<Vec<u8>> = signed.into();
			let mut merged = Vec::with_capacity(instructions.len());
			for instruction in instructions {
				if instruction.should_sign {
					// Checked above, the queue cannot run dry here.
					let bytes = queue.pop_front().ok_or(WalletError::IncompleteSigningResult {
						expected,
						returned: 0,
					})?;
					merged.push(Some(bytes));
				} else if return_group {
					merged.push(Some(instruction.raw.clone()));
				}
			}
			Ok(merged)
		}
		SignedResponse::Positional(entries) => {
			if entries.len() != instructions.len() {
				return Err(WalletError::IncompleteSigningResult {
					expected: instructions.len(),
					returned: entries.len(),
				});
			}

			let merged = entries
				.into_iter()
				.zip(instructions)
				.map(|(entry, instruction)| match entry {
					Some(bytes) => Some(bytes),
					None if return_group => Some(instruction.raw.clone()),
					None => None,
				})
				.collect();
			Ok(merged)
		}
	}
}
