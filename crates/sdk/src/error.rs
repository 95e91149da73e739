//! SDK error types.
//!
//! [`SdkError`] is the unified error type for all SDK operations. The
//! variants separate the three ways a request can fail after it is built:
//!
//! - the request never landed ([`SdkError::Submission`])
//! - it landed but the acknowledgement was unreadable
//!   ([`SdkError::InvalidStartEvent`])
//! - it was acknowledged but the network did not finish in time
//!   ([`SdkError::CompletionTimeout`])
//!
//! Ledger failures are carried verbatim.

use std::fmt;

use ika_config::ConfigError;
use ika_sdk_core::ObjectId;

use crate::ledger::LedgerError;
use crate::objects::DecodeError;

// ---------------------------------------------------------------------------
// SdkError
// ---------------------------------------------------------------------------

/// Errors from SDK operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The SDK has been shut down (cancellation token fired).
    Cancelled,

    /// The request parameters are invalid.
    InvalidRequest(&'static str),

    /// The network configuration is unusable.
    InvalidConfig(ConfigError),

    /// A transaction or call argument could not be BCS-encoded.
    Serialization(String),

    /// A ledger read (coordinator lookup, object fetch) failed.
    Ledger(LedgerError),

    /// Signing or executing the request transaction failed.
    Submission(LedgerError),

    /// The transaction executed but the start event is missing or malformed.
    InvalidStartEvent(String),

    /// A fetched result object matches neither its pending nor its
    /// completed shape.
    MalformedObject {
        /// The object that failed to decode.
        object_id: ObjectId,
        /// What was wrong with it.
        error: DecodeError,
    },

    /// The result object did not reach its completed shape within the
    /// polling budget.
    CompletionTimeout {
        /// The object that is still pending. Pass it to
        /// [`Sdk::wait_for`](crate::Sdk::wait_for) to keep waiting.
        object_id: ObjectId,
        /// Number of fetches performed.
        attempts: u32,
    },
}

impl SdkError {
    /// Returns `true` if this error is transient and the same call may
    /// succeed if repeated.
    ///
    /// Transient errors:
    /// - `Ledger(Transport)` -- a read failed at the network level
    /// - `CompletionTimeout` -- the object may still complete; re-poll it
    ///
    /// Submission failures are never transient here: a transport error during
    /// execution does not say whether the transaction landed, so the caller
    /// must build a new request with a fresh session identifier.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Ledger(LedgerError::Transport(_)) | Self::CompletionTimeout { .. }
        )
    }

    /// The pending result object, if this is a completion timeout.
    pub fn pending_object(&self) -> Option<ObjectId> {
        match self {
            Self::CompletionTimeout { object_id, .. } => Some(*object_id),
            _ => None,
        }
    }
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::InvalidRequest(reason) => write!(f, "invalid request: {reason}"),
            Self::InvalidConfig(e) => write!(f, "invalid config: {e}"),
            Self::Serialization(detail) => write!(f, "serialization failed: {detail}"),
            Self::Ledger(e) => write!(f, "ledger read failed: {e}"),
            Self::Submission(e) => write!(f, "transaction submission failed: {e}"),
            Self::InvalidStartEvent(reason) => write!(f, "invalid start event: {reason}"),
            Self::MalformedObject { object_id, error } => {
                write!(f, "malformed object {object_id}: {error}")
            }
            Self::CompletionTimeout {
                object_id,
                attempts,
            } => write!(
                f,
                "object {object_id} not completed after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for SdkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            Self::Ledger(e) | Self::Submission(e) => Some(e),
            Self::MalformedObject { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for SdkError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}
