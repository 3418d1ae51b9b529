//! Transaction Signing Protocol
//!
//! This module holds the protocol every backend adapter speaks:
//!
//! - `codec`: canonical binary encoding, base64 wire forms, signed/unsigned
//!   classification and sender extraction.
//! - `group`: flattening of (possibly nested) transaction groups and the
//!   per-position decision of whether the active backend should sign.
//! - `reconcile`: merging of backend results back into the order-preserving
//!   output array, for both the compact and the positional conventions.
//! - `wire`: the per-transaction item exchanged with backend SDKs.

pub mod codec;
pub mod group;
pub mod reconcile;
pub mod wire;

pub use codec::{Address, DecodedTransaction, SignatureEnvelope, UnsignedTransaction};
pub use group::{RawTransaction, SigningInstruction, TransactionGroup, build_signing_instructions};
pub use reconcile::{SignedResponse, merge};
pub use wire::WalletTransaction;
