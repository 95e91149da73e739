//! Operation tracking: structured observability for request/await flows.
//!
//! Every public SDK request creates an [`Operation`] record that captures:
//! - A unique [`OperationId`] for log correlation
//! - The [`OperationKind`] (presign, publish secret share)
//! - The request's [`RequestState`]
//! - A sequence of [`StepRecord`]s with timestamps, durations, and outcomes
//! - The transaction digest and result object id once known
//!
//! The [`OperationStore`] trait provides pluggable persistence. The default
//! [`NoopOperationStore`] discards everything; [`InMemoryOperationStore`]
//! keeps records for inspection.
//!
//! # Request states
//!
//! ```text
//! Preparing -> Built -> Submitted -> Acknowledged -> Completed
//!     |          |          |             |
//!     +----------+----------+-------------+--------> Failed
//! ```
//!
//! No state leads back to `Built`: a failed request is never resubmitted.
//! Retrying means building a new request with a new session identifier.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use ika_sdk_core::ObjectId;

use crate::SdkError;

// ---------------------------------------------------------------------------
// OperationId
// ---------------------------------------------------------------------------

/// Unique identifier for an in-flight operation.
///
/// Monotonically increasing u64 -- cheap to create, copy, and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(u64);

impl OperationId {
    /// Generate the next unique operation ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The type of SDK operation being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationKind {
    Presign,
    PublishSecretShare,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presign => write!(f, "presign"),
            Self::PublishSecretShare => write!(f, "publish_secret_share"),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestState
// ---------------------------------------------------------------------------

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Inputs are being looked up and the transaction assembled.
    Preparing,
    /// The transaction is built but not yet submitted.
    Built,
    /// The transaction is being signed and executed.
    Submitted,
    /// The ledger executed the request and returned its events.
    Acknowledged,
    /// The result object reached its completed shape.
    Completed,
    /// The request failed.
    Failed,
}

impl RequestState {
    /// Returns `true` if a request may move from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Preparing, Built)
                | (Built, Submitted)
                | (Submitted, Acknowledged)
                | (Acknowledged, Completed)
                | (Preparing | Built | Submitted | Acknowledged, Failed)
        )
    }

    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preparing => write!(f, "preparing"),
            Self::Built => write!(f, "built"),
            Self::Submitted => write!(f, "submitted"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationStep
// ---------------------------------------------------------------------------

/// A logical step within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationStep {
    /// Request parameter checks.
    Validate,
    /// Fetching the coordinator's shared-object descriptor.
    CoordinatorLookup,
    /// Session identifier allocation.
    SessionAllocation,
    /// Assembling fee inputs and the request call.
    BuildTransaction,
    /// Signing and executing the transaction.
    Submit,
    /// Reading the start event.
    ExtractStartEvent,
    /// Polling the result object.
    AwaitCompletion,
}

impl fmt::Display for OperationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::CoordinatorLookup => write!(f, "coordinator_lookup"),
            Self::SessionAllocation => write!(f, "session_allocation"),
            Self::BuildTransaction => write!(f, "build_transaction"),
            Self::Submit => write!(f, "submit"),
            Self::ExtractStartEvent => write!(f, "extract_start_event"),
            Self::AwaitCompletion => write!(f, "await_completion"),
        }
    }
}

// ---------------------------------------------------------------------------
// StepOutcome / StepRecord
// ---------------------------------------------------------------------------

/// Outcome of a single step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step succeeded.
    Ok,
    /// Step failed with the given error.
    Failed(SdkError),
    /// Step did not apply (e.g. no start event for entity-keyed requests).
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed(e) => write!(f, "failed({e})"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// A timestamped record of a step execution.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Which step was executed.
    pub step: OperationStep,
    /// What happened.
    pub outcome: StepOutcome,
    /// When the step was recorded.
    pub timestamp: Instant,
    /// How long it took, if it ran.
    pub duration: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Full record of an SDK request.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Unique identifier.
    pub id: OperationId,
    /// What kind of operation.
    pub kind: OperationKind,
    /// Current request state.
    pub state: RequestState,
    /// Ordered list of step records.
    pub steps: Vec<StepRecord>,
    /// Digest of the submitted transaction, once executed.
    pub digest: Option<String>,
    /// The object being awaited, once known.
    pub result_object_id: Option<ObjectId>,
    /// When the operation started.
    pub created_at: Instant,
    /// When the operation reached a terminal state.
    pub completed_at: Option<Instant>,
}

impl Operation {
    pub(crate) fn new(kind: OperationKind) -> Self {
        Self {
            id: OperationId::next(),
            kind,
            state: RequestState::Preparing,
            steps: Vec::new(),
            digest: None,
            result_object_id: None,
            created_at: Instant::now(),
            completed_at: None,
        }
    }

    /// Returns `true` if any step failed.
    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }

    /// Returns `true` once the request completed or failed.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// OperationError
// ---------------------------------------------------------------------------

/// Rich error returned by tracked SDK operations.
///
/// Wraps the base [`SdkError`] with the operation context: which operation
/// failed, at which step, in which request state, and what had already
/// completed.
#[derive(Debug, Clone)]
pub struct OperationError {
    /// The tracked operation ID.
    pub operation_id: OperationId,
    /// The base SDK error.
    pub error: SdkError,
    /// The step that failed.
    pub failed_step: OperationStep,
    /// The request state when the failure happened.
    pub failed_in: RequestState,
    /// Steps that completed before the failure.
    pub completed_steps: Vec<StepRecord>,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] operation failed at {} ({}): {}",
            self.operation_id, self.failed_step, self.failed_in, self.error
        )
    }
}

impl std::error::Error for OperationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<OperationError> for SdkError {
    fn from(e: OperationError) -> Self {
        e.error
    }
}

// ---------------------------------------------------------------------------
// OperationStore trait
// ---------------------------------------------------------------------------

/// Pluggable storage for operation tracking records.
///
/// The SDK calls into this store at operation start, after each step and
/// state change, and at completion.
pub trait OperationStore: Send + Sync {
    /// Record a new operation.
    fn record(&self, op: &Operation);

    /// Retrieve an operation by ID.
    fn get(&self, id: OperationId) -> Option<Operation>;

    /// List all operations not yet completed or failed.
    fn list_active(&self) -> Vec<Operation>;

    /// Append a step record to an existing operation.
    fn update_step(&self, id: OperationId, step: StepRecord);

    /// Replace the stored copy of an operation's state, digest and result id.
    fn update(&self, op: &Operation);
}

// ---------------------------------------------------------------------------
// NoopOperationStore
// ---------------------------------------------------------------------------

/// A no-op store that discards all records.
///
/// Used as the default when no tracking is configured.
pub struct NoopOperationStore;

impl OperationStore for NoopOperationStore {
    #[inline]
    fn record(&self, _op: &Operation) {}
    #[inline]
    fn get(&self, _id: OperationId) -> Option<Operation> {
        None
    }
    #[inline]
    fn list_active(&self) -> Vec<Operation> {
        Vec::new()
    }
    #[inline]
    fn update_step(&self, _id: OperationId, _step: StepRecord) {}
    #[inline]
    fn update(&self, _op: &Operation) {}
}

// ---------------------------------------------------------------------------
// InMemoryOperationStore
// ---------------------------------------------------------------------------

/// Thread-safe in-memory operation store.
///
/// Uses `RwLock<HashMap>` for concurrent read access with exclusive writes.
/// Operations are lost on process restart.
pub struct InMemoryOperationStore {
    ops: RwLock<HashMap<OperationId, Operation>>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self {
            ops: RwLock::new(HashMap::new()),
        }
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.ops.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryOperationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationStore for InMemoryOperationStore {
    fn record(&self, op: &Operation) {
        self.ops
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op.id, op.clone());
    }

    fn get(&self, id: OperationId) -> Option<Operation> {
        self.ops
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn list_active(&self) -> Vec<Operation> {
        self.ops
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|op| !op.state.is_terminal())
            .cloned()
            .collect()
    }

    fn update_step(&self, id: OperationId, step: StepRecord) {
        if let Some(op) = self
            .ops
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
        {
            op.steps.push(step);
        }
    }

    fn update(&self, op: &Operation) {
        if let Some(stored) = self
            .ops
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&op.id)
        {
            stored.state = op.state;
            stored.digest.clone_from(&op.digest);
            stored.result_object_id = op.result_object_id;
            stored.completed_at = op.completed_at;
        }
    }
}

// ---------------------------------------------------------------------------
// OperationTracker
// ---------------------------------------------------------------------------

/// Convenience wrapper around a store reference and a live operation.
///
/// Used internally by SDK methods to record steps and drive the request
/// state machine.
pub(crate) struct OperationTracker {
    store: Arc<dyn OperationStore>,
    pub op: Operation,
}

impl OperationTracker {
    /// Start tracking a new operation.
    pub fn start(store: Arc<dyn OperationStore>, kind: OperationKind) -> Self {
        let op = Operation::new(kind);
        store.record(&op);
        Self { store, op }
    }

    /// The operation ID.
    pub fn id(&self) -> OperationId {
        self.op.id
    }

    fn push(&mut self, step: OperationStep, outcome: StepOutcome, duration: Option<Duration>) {
        let record = StepRecord {
            step,
            outcome,
            timestamp: Instant::now(),
            duration,
        };
        self.op.steps.push(record.clone());
        self.store.update_step(self.op.id, record);
    }

    /// Record a successful step.
    pub fn step_ok(&mut self, step: OperationStep, duration: Duration) {
        self.push(step, StepOutcome::Ok, Some(duration));
    }

    /// Record a step that did not apply.
    pub fn step_skipped(&mut self, step: OperationStep) {
        self.push(step, StepOutcome::Skipped, None);
    }

    /// Move the request to `next`. Invalid transitions are ignored.
    pub fn advance(&mut self, next: RequestState) {
        if !self.op.state.can_transition_to(next) {
            tracing::warn!(
                operation = %self.op.id,
                from = %self.op.state,
                to = %next,
                "ignoring invalid request state transition"
            );
            return;
        }
        self.op.state = next;
        if next.is_terminal() {
            self.op.completed_at = Some(Instant::now());
        }
        self.store.update(&self.op);
    }

    /// Record the executed transaction's digest.
    pub fn set_digest(&mut self, digest: &str) {
        self.op.digest = Some(digest.to_owned());
        self.store.update(&self.op);
    }

    /// Record the object the request resolves to.
    pub fn set_result_object(&mut self, object_id: ObjectId) {
        self.op.result_object_id = Some(object_id);
        self.store.update(&self.op);
    }

    /// Mark the request as completed and persist.
    pub fn succeed(mut self) {
        self.advance(RequestState::Completed);
    }

    /// Record the failed step, mark the request failed, and return an
    /// [`OperationError`].
    pub fn fail(
        mut self,
        failed_step: OperationStep,
        error: SdkError,
        duration: Duration,
    ) -> OperationError {
        let failed_in = self.op.state;
        self.push(failed_step, StepOutcome::Failed(error.clone()), Some(duration));
        self.advance(RequestState::Failed);
        OperationError {
            operation_id: self.op.id,
            error,
            failed_step,
            failed_in,
            completed_steps: self
                .op
                .steps
                .into_iter()
                .filter(|s| !matches!(s.outcome, StepOutcome::Failed(_)))
                .collect(),
        }
    }
}
