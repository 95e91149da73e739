//! Core types for the Ika dWallet SDK.
//!
//! This crate provides the ledger identifier types used across the SDK:
//!
//! - [`ObjectId`] -- identifier of a Sui object (dWallets, presigns, coins,
//!   the dWallet coordinator)
//! - [`SuiAddress`] -- account address of a transaction signer
//!
//! Both are 32-byte values rendered as `0x`-prefixed lowercase hex. They are
//! serialized as hex strings in human-readable formats (JSON-RPC payloads)
//! and as a fixed 32-byte sequence in BCS.

pub mod object_id;

pub use object_id::{ADDRESS_LENGTH, ObjectId, ObjectIdError, SuiAddress};
