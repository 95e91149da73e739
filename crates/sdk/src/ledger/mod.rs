//! Ledger client seam: the operations the SDK needs from a Sui node.
//!
//! The SDK never talks to a node directly. It consumes three reads and one
//! write through [`LedgerClient`], and signs through [`Signer`]:
//!
//! | Call | Used for |
//! |------|----------|
//! | [`LedgerClient::shared_object_ref`] | coordinator input (`initial_shared_version`) |
//! | [`LedgerClient::execute_transaction`] | submitting the request, returning events |
//! | [`LedgerClient::get_object`] | polling the result object |
//!
//! [`InMemoryLedger`](memory::InMemoryLedger) implements the trait for tests
//! and simulations.

pub mod memory;

use std::fmt;
use std::future::Future;

use ika_sdk_core::{ObjectId, SuiAddress};
use serde_json::Value;

use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// LedgerError
// ---------------------------------------------------------------------------

/// Errors raised by a ledger client or signer.
///
/// The SDK propagates these unchanged inside
/// [`SdkError::Ledger`](crate::SdkError::Ledger) or
/// [`SdkError::Submission`](crate::SdkError::Submission).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The node could not be reached or the connection dropped.
    Transport(String),

    /// The transaction was rejected or aborted during execution.
    ExecutionFailed(String),

    /// The gas budget or gas coin balance is insufficient.
    InsufficientGas,

    /// The object does not exist (or was deleted).
    NotFound(ObjectId),

    /// The object exists but is a package, not a Move object.
    NotMoveObject(ObjectId),

    /// The node answered with something the client could not interpret.
    InvalidResponse(String),

    /// The signer refused or failed to sign.
    SigningFailed(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(detail) => write!(f, "transport error: {detail}"),
            Self::ExecutionFailed(detail) => write!(f, "execution failed: {detail}"),
            Self::InsufficientGas => write!(f, "insufficient gas"),
            Self::NotFound(id) => write!(f, "object {id} not found"),
            Self::NotMoveObject(id) => write!(f, "object {id} is not a move object"),
            Self::InvalidResponse(detail) => write!(f, "invalid node response: {detail}"),
            Self::SigningFailed(detail) => write!(f, "signing failed: {detail}"),
        }
    }
}

impl std::error::Error for LedgerError {}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Descriptor of a shared object, as needed to reference it as an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedObjectRef {
    /// Object id.
    pub object_id: ObjectId,
    /// Version at which the object became shared.
    pub initial_shared_version: u64,
}

/// What the node should include in an execution response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteOptions {
    /// Include transaction effects.
    pub show_effects: bool,
    /// Include emitted events.
    pub show_events: bool,
}

impl ExecuteOptions {
    /// Effects and events, as every SDK request needs.
    pub const EFFECTS_AND_EVENTS: Self = Self {
        show_effects: true,
        show_events: true,
    };
}

/// A transaction together with its BCS bytes and the sender's signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// The transaction.
    pub transaction: Transaction,
    /// BCS bytes the signature covers.
    pub tx_bytes: Vec<u8>,
    /// Serialized signature.
    pub signature: Vec<u8>,
}

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEvent {
    /// Fully qualified Move event type.
    pub event_type: String,
    /// Event payload decoded to JSON.
    pub parsed_json: Value,
}

/// The node's answer to an executed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResponse {
    /// Transaction digest.
    pub digest: String,
    /// Effects, if requested. Opaque to the SDK.
    pub effects: Option<Value>,
    /// Emitted events in emission order, if requested.
    pub events: Vec<LedgerEvent>,
}

/// Content of a Move object.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveObjectData {
    /// Object id.
    pub object_id: ObjectId,
    /// Current version.
    pub version: u64,
    /// Fully qualified Move type.
    pub object_type: String,
    /// Object fields decoded to JSON.
    pub fields: Value,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read/write access to a Sui node.
///
/// Implementations must be `Send + Sync` for concurrent SDK operations.
pub trait LedgerClient: Send + Sync {
    /// Looks up a shared object's descriptor.
    fn shared_object_ref(
        &self,
        object_id: ObjectId,
    ) -> impl Future<Output = Result<SharedObjectRef, LedgerError>> + Send;

    /// Executes a signed transaction and waits for its effects.
    fn execute_transaction(
        &self,
        transaction: SignedTransaction,
        options: ExecuteOptions,
    ) -> impl Future<Output = Result<ExecutionResponse, LedgerError>> + Send;

    /// Fetches a Move object's current content.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the object does not exist.
    fn get_object(
        &self,
        object_id: ObjectId,
    ) -> impl Future<Output = Result<MoveObjectData, LedgerError>> + Send;
}

/// The identity that signs and pays for requests.
///
/// Key management lives outside the SDK; implementations wrap whatever
/// keystore the caller uses.
pub trait Signer: Send + Sync {
    /// The signer's address. Capabilities produced by requests are
    /// transferred here.
    fn address(&self) -> SuiAddress;

    /// Signs the BCS bytes of a transaction.
    fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<Vec<u8>, LedgerError>;
}
