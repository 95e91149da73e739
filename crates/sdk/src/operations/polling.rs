//! Result polling.
//!
//! [`wait_for_object`] fetches an object until its decoder reports it
//! completed. The first fetch is immediate; later fetches back off
//! exponentially. Polling stops with [`SdkError::CompletionTimeout`] when
//! either the attempt budget or the overall timeout runs out, and with
//! [`SdkError::Cancelled`] as soon as the SDK is shut down.

use std::time::Duration;

use ika_config::constants::{
    DEFAULT_COMPLETION_TIMEOUT_MS, DEFAULT_POLL_INITIAL_BACKOFF_MS, DEFAULT_POLL_MAX_ATTEMPTS,
    DEFAULT_POLL_MAX_BACKOFF_MS,
};
use ika_sdk_core::ObjectId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::SdkError;
use crate::ledger::LedgerClient;
use crate::objects::{LedgerObject, ObjectState};

// ---------------------------------------------------------------------------
// PollPolicy
// ---------------------------------------------------------------------------

/// How long and how often to poll a result object.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Maximum number of fetches (including the first).
    pub max_attempts: u32,
    /// Delay before the second fetch.
    pub initial_backoff: Duration,
    /// Maximum delay between fetches.
    pub max_backoff: Duration,
    /// Multiplier applied to the delay after each fetch.
    pub backoff_multiplier: f64,
    /// Overall time budget, measured from the first fetch.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_POLL_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_POLL_MAX_BACKOFF_MS),
            backoff_multiplier: 2.0,
            timeout: Duration::from_millis(DEFAULT_COMPLETION_TIMEOUT_MS),
        }
    }
}

impl PollPolicy {
    /// A policy that fetches once and gives up if the object is pending.
    pub const fn single_fetch() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(0),
            max_backoff: Duration::from_millis(0),
            backoff_multiplier: 1.0,
            timeout: Duration::from_millis(0),
        }
    }

    /// Backoff before retry number `retry` (0-indexed).
    pub(crate) fn backoff_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return self.initial_backoff.min(self.max_backoff);
        }
        let factor = self.backoff_multiplier.powi(retry as i32);
        let ms = (self.initial_backoff.as_millis() as f64 * factor) as u64;
        Duration::from_millis(ms).min(self.max_backoff)
    }
}

// ---------------------------------------------------------------------------
// wait_for_object
// ---------------------------------------------------------------------------

/// Polls `object_id` until it decodes as completed.
///
/// # Errors
///
/// - [`SdkError::Ledger`] if a fetch fails (including a missing object)
/// - [`SdkError::MalformedObject`] if the object matches neither shape
/// - [`SdkError::CompletionTimeout`] if the budget runs out
/// - [`SdkError::Cancelled`] if `cancel` fires
pub async fn wait_for_object<T, L>(
    client: &L,
    object_id: ObjectId,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<T, SdkError>
where
    T: LedgerObject,
    L: LedgerClient,
{
    // `None` when the timeout is too large to represent: no deadline.
    let deadline = Instant::now().checked_add(policy.timeout);
    let mut attempts = 0u32;

    while attempts < policy.max_attempts {
        if attempts > 0 {
            let delay = policy.backoff_for(attempts - 1);
            if let Some(deadline) = deadline {
                match Instant::now().checked_add(delay) {
                    Some(next) if next <= deadline => {}
                    _ => break,
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(SdkError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        } else if cancel.is_cancelled() {
            return Err(SdkError::Cancelled);
        }

        attempts += 1;
        let object = client
            .get_object(object_id)
            .await
            .map_err(SdkError::Ledger)?;

        match T::decode(&object.fields) {
            Ok(ObjectState::Completed(value)) => {
                info!(%object_id, kind = T::KIND, attempts, version = object.version, "object completed");
                return Ok(value);
            }
            Ok(ObjectState::Pending) => {
                debug!(%object_id, kind = T::KIND, attempt = attempts, "object pending, retrying");
            }
            Err(error) => {
                warn!(%object_id, %error, "object matches no known shape");
                return Err(SdkError::MalformedObject { object_id, error });
            }
        }
    }

    error!(
        %object_id,
        kind = T::KIND,
        "object not completed after {} attempts",
        attempts
    );
    Err(SdkError::CompletionTimeout {
        object_id,
        attempts,
    })
}
