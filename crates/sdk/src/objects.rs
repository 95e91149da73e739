//! Typed decoders for ledger objects and events.
//!
//! A result object moves through two shapes: *pending* while the MPC
//! network works, and *completed* once it has written its output. Each
//! object type implements [`LedgerObject::decode`], which maps the fetched
//! JSON fields to [`ObjectState::Pending`], [`ObjectState::Completed`], or a
//! [`DecodeError`] when the fields match neither shape.
//!
//! Decoding is a pure function of the fields: decoding the same value twice
//! gives the same answer.

use std::fmt;

use ika_sdk_core::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ObjectState / DecodeError
// ---------------------------------------------------------------------------

/// Lifecycle shape of a result object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectState<T> {
    /// The network has not written the result yet.
    Pending,
    /// The result is available.
    Completed(T),
}

impl<T> ObjectState<T> {
    /// Returns `true` for [`ObjectState::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Pending => None,
        }
    }
}

/// A fetched object or event that matches none of its known shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// What was being decoded, e.g. `"presign session"`.
    pub kind: &'static str,
    /// What was wrong.
    pub reason: String,
}

impl DecodeError {
    fn new(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

impl std::error::Error for DecodeError {}

/// An object type with a pending and a completed shape.
pub trait LedgerObject: Sized {
    /// Human-readable name used in errors and logs.
    const KIND: &'static str;

    /// Classifies the object's fields.
    fn decode(fields: &Value) -> Result<ObjectState<Self>, DecodeError>;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Move `UID` wrapper: `{ "id": "0x…" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidField {
    /// The object id.
    pub id: ObjectId,
}

fn as_object<'a>(
    kind: &'static str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::new(kind, "expected a JSON object"))
}

fn decode_at<T: for<'de> Deserialize<'de>>(
    kind: &'static str,
    value: &Value,
    pointer: &str,
) -> Result<Option<T>, DecodeError> {
    match value.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(found) => T::deserialize(found)
            .map(Some)
            .map_err(|e| DecodeError::new(kind, format!("{pointer}: {e}"))),
    }
}

fn required_id(kind: &'static str, value: &Value, pointer: &str) -> Result<ObjectId, DecodeError> {
    decode_at(kind, value, pointer)?
        .ok_or_else(|| DecodeError::new(kind, format!("{pointer} is missing")))
}

// ---------------------------------------------------------------------------
// CompletedPresign
// ---------------------------------------------------------------------------

/// Presign output bytes, as nested under the session's `state` enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignFields {
    /// The presign produced by the network.
    pub presign: Vec<u8>,
}

/// The `Completed` variant of a presign session's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignState {
    /// Variant fields.
    pub fields: PresignFields,
}

/// A presign session whose state carries a non-empty presign.
///
/// Serializes as `{ "state": { "fields": { "presign": [..] } }, "id": { "id": "0x…" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPresign {
    /// Session state.
    pub state: PresignState,
    /// Session object id.
    pub id: UidField,
}

impl CompletedPresign {
    /// The presign session's object id.
    pub fn presign_id(&self) -> ObjectId {
        self.id.id
    }

    /// The presign bytes.
    pub fn presign(&self) -> &[u8] {
        &self.state.fields.presign
    }
}

impl LedgerObject for CompletedPresign {
    const KIND: &'static str = "presign session";

    fn decode(fields: &Value) -> Result<ObjectState<Self>, DecodeError> {
        as_object(Self::KIND, fields)?;
        let id = required_id(Self::KIND, fields, "/id/id")?;
        let presign: Option<Vec<u8>> = decode_at(Self::KIND, fields, "/state/fields/presign")?;
        match presign {
            Some(presign) if !presign.is_empty() => Ok(ObjectState::Completed(Self {
                state: PresignState {
                    fields: PresignFields { presign },
                },
                id: UidField { id },
            })),
            _ => Ok(ObjectState::Pending),
        }
    }
}

// ---------------------------------------------------------------------------
// DWalletWithPublicShare
// ---------------------------------------------------------------------------

/// A dWallet whose user secret key share has been made public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DWalletWithPublicShare {
    /// dWallet object id.
    pub id: UidField,
    /// The published share. Never empty.
    pub public_user_secret_key_share: Vec<u8>,
    /// The dWallet's capability object, when the object exposes it.
    pub dwallet_cap_id: Option<ObjectId>,
}

impl LedgerObject for DWalletWithPublicShare {
    const KIND: &'static str = "dwallet";

    fn decode(fields: &Value) -> Result<ObjectState<Self>, DecodeError> {
        as_object(Self::KIND, fields)?;
        let id = required_id(Self::KIND, fields, "/id/id")?;
        let share: Option<Vec<u8>> =
            decode_at(Self::KIND, fields, "/public_user_secret_key_share")?;
        let Some(public_user_secret_key_share) = share.filter(|s| !s.is_empty()) else {
            return Ok(ObjectState::Pending);
        };
        Ok(ObjectState::Completed(Self {
            id: UidField { id },
            public_user_secret_key_share,
            dwallet_cap_id: decode_at(Self::KIND, fields, "/dwallet_cap_id")?,
        }))
    }
}

// ---------------------------------------------------------------------------
// PresignStartEvent
// ---------------------------------------------------------------------------

/// Acknowledgement emitted when a presign request is accepted.
///
/// Payload shape: `{ "event_data": { "presign_id": "0x…", "dwallet_id": "0x…" } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresignStartEvent {
    /// The presign session that will hold the result.
    pub presign_id: ObjectId,
    /// The dWallet the presign is for, if the event names it.
    pub dwallet_id: Option<ObjectId>,
}

impl PresignStartEvent {
    const KIND: &'static str = "presign start event";

    /// Decodes the event payload. A missing `presign_id` is an error.
    pub fn decode(payload: &Value) -> Result<Self, DecodeError> {
        as_object(Self::KIND, payload)?;
        Ok(Self {
            presign_id: required_id(Self::KIND, payload, "/event_data/presign_id")?,
            dwallet_id: decode_at(Self::KIND, payload, "/event_data/dwallet_id")?,
        })
    }
}
