//! In-memory ledger for tests and simulations.
//!
//! [`InMemoryLedger`] keeps shared-object descriptors and Move objects in a
//! `Mutex`-guarded map. Objects can be *scripted*: given a sequence of field
//! versions, each fetch returns the next version until the last one, which
//! then stays. This models a result object that is pending for a few polls
//! and then completes.
//!
//! Execution is delegated to a responder closure that sees the transaction
//! and may write objects (the simulated MPC network's output) before
//! returning the emitted events.

use std::collections::{HashMap, VecDeque};
use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ika_sdk_core::ObjectId;
use serde_json::Value;

use super::{
    ExecuteOptions, ExecutionResponse, LedgerClient, LedgerError, LedgerEvent, MoveObjectData,
    SharedObjectRef, SignedTransaction,
};
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Closure deciding the outcome of an executed transaction.
pub type Responder = Box<
    dyn Fn(&Transaction, &mut LedgerWrites<'_>) -> Result<Vec<LedgerEvent>, LedgerError>
        + Send
        + Sync,
>;

struct ScriptedObject {
    object_type: String,
    version: u64,
    /// Front is served next. The last entry is sticky.
    fields: VecDeque<Value>,
}

impl ScriptedObject {
    fn next(&mut self) -> Option<Value> {
        let current = if self.fields.len() > 1 {
            self.fields.pop_front()
        } else {
            self.fields.front().cloned()
        };
        if current.is_some() {
            self.version += 1;
        }
        current
    }
}

#[derive(Default)]
struct LedgerState {
    shared: HashMap<ObjectId, u64>,
    objects: HashMap<ObjectId, ScriptedObject>,
    executed: Vec<SignedTransaction>,
    fetched: Vec<ObjectId>,
    fail_next_execution: Option<LedgerError>,
}

/// Object writes available to a [`Responder`].
pub struct LedgerWrites<'a> {
    objects: &'a mut HashMap<ObjectId, ScriptedObject>,
}

impl LedgerWrites<'_> {
    /// Stores an object with fixed fields.
    pub fn put_object(&mut self, object_id: ObjectId, object_type: &str, fields: Value) {
        self.script_object(object_id, object_type, vec![fields]);
    }

    /// Stores an object whose fields advance through `versions`, one per fetch.
    pub fn script_object(&mut self, object_id: ObjectId, object_type: &str, versions: Vec<Value>) {
        self.objects.insert(
            object_id,
            ScriptedObject {
                object_type: object_type.to_owned(),
                version: 0,
                fields: versions.into(),
            },
        );
    }
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// In-memory [`LedgerClient`].
///
/// Records every executed transaction and every fetched object id so tests
/// can assert on what the SDK sent and read.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    responder: Option<Responder>,
}

impl InMemoryLedger {
    /// Creates an empty ledger whose executions emit no events.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            responder: None,
        }
    }

    /// Sets the execution responder.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Transaction, &mut LedgerWrites<'_>) -> Result<Vec<LedgerEvent>, LedgerError>
            + Send
            + Sync
            + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Registers a shared object.
    pub fn insert_shared_object(&self, object_id: ObjectId, initial_shared_version: u64) {
        self.lock().shared.insert(object_id, initial_shared_version);
    }

    /// Stores an object with fixed fields.
    pub fn put_object(&self, object_id: ObjectId, object_type: &str, fields: Value) {
        let mut state = self.lock();
        LedgerWrites {
            objects: &mut state.objects,
        }
        .put_object(object_id, object_type, fields);
    }

    /// Stores an object whose fields advance through `versions`, one per fetch.
    pub fn script_object(&self, object_id: ObjectId, object_type: &str, versions: Vec<Value>) {
        let mut state = self.lock();
        LedgerWrites {
            objects: &mut state.objects,
        }
        .script_object(object_id, object_type, versions);
    }

    /// Makes the next execution fail with `error` without calling the responder.
    pub fn fail_next_execution(&self, error: LedgerError) {
        self.lock().fail_next_execution = Some(error);
    }

    /// Transactions executed so far, in order.
    pub fn executed_transactions(&self) -> Vec<Transaction> {
        self.lock()
            .executed
            .iter()
            .map(|signed| signed.transaction.clone())
            .collect()
    }

    /// Signed transactions executed so far, in order.
    pub fn executed_signed(&self) -> Vec<SignedTransaction> {
        self.lock().executed.clone()
    }

    /// Object ids fetched so far, in order (repeats included).
    pub fn fetched_ids(&self) -> Vec<ObjectId> {
        self.lock().fetched.clone()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute(&self, signed: SignedTransaction) -> Result<ExecutionResponse, LedgerError> {
        let mut state = self.lock();
        if let Some(error) = state.fail_next_execution.take() {
            return Err(error);
        }

        let events = match &self.responder {
            Some(responder) => responder(
                &signed.transaction,
                &mut LedgerWrites {
                    objects: &mut state.objects,
                },
            )?,
            None => Vec::new(),
        };

        state.executed.push(signed);
        Ok(ExecutionResponse {
            digest: format!("mem-tx-{}", state.executed.len()),
            effects: Some(serde_json::json!({ "status": { "status": "success" } })),
            events,
        })
    }

    fn fetch(&self, object_id: ObjectId) -> Result<MoveObjectData, LedgerError> {
        let mut state = self.lock();
        state.fetched.push(object_id);
        let object = state
            .objects
            .get_mut(&object_id)
            .ok_or(LedgerError::NotFound(object_id))?;
        let fields = object.next().ok_or(LedgerError::NotFound(object_id))?;
        Ok(MoveObjectData {
            object_id,
            version: object.version,
            object_type: object.object_type.clone(),
            fields,
        })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for InMemoryLedger {
    fn shared_object_ref(
        &self,
        object_id: ObjectId,
    ) -> impl Future<Output = Result<SharedObjectRef, LedgerError>> + Send {
        let result = self
            .lock()
            .shared
            .get(&object_id)
            .map(|&initial_shared_version| SharedObjectRef {
                object_id,
                initial_shared_version,
            })
            .ok_or(LedgerError::NotFound(object_id));
        ready(result)
    }

    fn execute_transaction(
        &self,
        transaction: SignedTransaction,
        _options: ExecuteOptions,
    ) -> impl Future<Output = Result<ExecutionResponse, LedgerError>> + Send {
        ready(self.execute(transaction))
    }

    fn get_object(
        &self,
        object_id: ObjectId,
    ) -> impl Future<Output = Result<MoveObjectData, LedgerError>> + Send {
        ready(self.fetch(object_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
