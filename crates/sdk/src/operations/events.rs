//! Start event lookup.
//!
//! The coordinator emits the request's acknowledgement at a fixed position
//! in the transaction's event list: session registration comes first, the
//! start event second. That position is the only place the SDK depends on
//! emission order; [`start_event`] is the single lookup that encodes it.

use ika_sdk_core::ObjectId;
use tracing::warn;

use crate::SdkError;
use crate::ledger::LedgerEvent;
use crate::objects::PresignStartEvent;

/// Position of the start event in a request's emitted events.
pub const START_EVENT_INDEX: usize = 1;

/// The start event of an executed request, if present.
pub fn start_event(events: &[LedgerEvent]) -> Option<&LedgerEvent> {
    events.get(START_EVENT_INDEX)
}

/// Extracts the presign session id from a presign request's events.
///
/// # Errors
///
/// [`SdkError::InvalidStartEvent`] if the start event is missing or its
/// payload has no valid `event_data.presign_id`.
pub fn extract_presign_id(digest: &str, events: &[LedgerEvent]) -> Result<ObjectId, SdkError> {
    let Some(event) = start_event(events) else {
        warn!(
            %digest,
            emitted = events.len(),
            "no start event at index {START_EVENT_INDEX}"
        );
        return Err(SdkError::InvalidStartEvent(format!(
            "expected an event at index {START_EVENT_INDEX}, transaction emitted {}",
            events.len()
        )));
    };

    match PresignStartEvent::decode(&event.parsed_json) {
        Ok(decoded) => Ok(decoded.presign_id),
        Err(e) => {
            warn!(%digest, event_type = %event.event_type, error = %e, "malformed start event");
            Err(SdkError::InvalidStartEvent(e.to_string()))
        }
    }
}
