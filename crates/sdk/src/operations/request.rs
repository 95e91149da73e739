//! Shared request pipeline.
//!
//! Presign and publish-secret-share requests differ only in the entry
//! point, one payload argument, whether a capability comes back, and how
//! the result object is found. Everything else lives here:
//!
//! 1. **Coordinator lookup**: fetch the coordinator's `initial_shared_version`.
//! 2. **Session allocation**: register a fresh session identifier.
//! 3. **Build**: resolve fee inputs, append the request call, transfer any
//!    capability to the signer, destroy the zero coin if one was minted.
//! 4. **Submit**: sign and execute, asking for effects and events.
//! 5. **Correlate**: read the result object id from the start event, or use
//!    the target dWallet itself.
//! 6. **Await**: poll the result object until it decodes as completed.

use std::time::{Duration, Instant};

use ika_config::constants::DWALLET_COORDINATOR_MODULE_NAME;
use ika_sdk_core::ObjectId;
use tracing::info;

use crate::fee::{FeeCoins, FeePlan, with_fee_inputs};
use crate::ledger::{
    ExecuteOptions, ExecutionResponse, LedgerClient, SharedObjectRef, SignedTransaction, Signer,
};
use crate::objects::LedgerObject;
use crate::operations::events::extract_presign_id;
use crate::operations::tracking::{OperationError, OperationKind, OperationStep, RequestState};
use crate::session::SessionIdentifierAllocator;
use crate::transaction::{Argument, MoveCall, Transaction};
use crate::{Sdk, SdkError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An unsigned request transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    /// The transaction, ready to sign.
    pub transaction: Transaction,
    /// Whether a zero IKA coin was minted (and is destroyed) in it.
    pub placeholder_fee: bool,
}

/// The request-specific call argument after the dWallet id.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RequestPayload<'a> {
    /// `u32` signature algorithm tag.
    SignatureAlgorithm(u32),
    /// `vector<u8>` secret share.
    SecretShare(&'a [u8]),
}

/// How the result object is found after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Correlation {
    /// The start event names a new object.
    StartEvent,
    /// The target dWallet itself changes shape.
    TargetEntity,
}

/// Everything that distinguishes one request kind from another.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestSpec<'a> {
    pub kind: OperationKind,
    pub function: &'static str,
    pub dwallet_id: ObjectId,
    pub payload: RequestPayload<'a>,
    pub fees: FeeCoins,
    pub returns_capability: bool,
    pub correlation: Correlation,
}

impl RequestSpec<'_> {
    /// Rejects requests that could never complete.
    pub(crate) fn validate(&self) -> Result<(), SdkError> {
        match self.payload {
            RequestPayload::SecretShare([]) => {
                Err(SdkError::InvalidRequest("secret share is empty"))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

impl<L, S, A> Sdk<L, S, A>
where
    L: LedgerClient,
    S: Signer,
    A: SessionIdentifierAllocator,
{
    pub(crate) async fn coordinator_ref(&self) -> Result<SharedObjectRef, SdkError> {
        self.inner
            .client
            .shared_object_ref(self.inner.config.network.coordinator_object_id())
            .await
            .map_err(SdkError::Ledger)
    }

    /// Starts a transaction with the coordinator as a mutable shared input
    /// and a freshly allocated session identifier.
    pub(crate) async fn open_transaction(
        &self,
        coordinator: SharedObjectRef,
    ) -> Result<(Transaction, Argument, Argument), SdkError> {
        let mut tx = Transaction::new(self.inner.signer.address());
        let coordinator_arg = tx.shared_object(
            coordinator.object_id,
            coordinator.initial_shared_version,
            true,
        );
        let session = self
            .inner
            .allocator
            .allocate(
                &mut tx,
                coordinator_arg,
                self.inner.config.network.dwallet_package_id(),
            )
            .await?;
        Ok((tx, coordinator_arg, session))
    }

    /// Appends the fee inputs and the request call.
    pub(crate) fn append_request(
        &self,
        mut tx: Transaction,
        coordinator: Argument,
        session: Argument,
        spec: &RequestSpec<'_>,
    ) -> Result<BuiltRequest, SdkError> {
        let plan = FeePlan::resolve(&spec.fees, self.inner.default_ika_coin_id);
        let package = self.inner.config.network.dwallet_package_id();
        let recipient = self.inner.signer.address();

        with_fee_inputs(
            &mut tx,
            &plan,
            self.inner.framework_package_id,
            &self.inner.ika_coin_type,
            |tx, fees| {
                let dwallet = tx.pure_id(&spec.dwallet_id);
                let payload = match spec.payload {
                    RequestPayload::SignatureAlgorithm(tag) => tx.pure_u32(tag),
                    RequestPayload::SecretShare(share) => tx.pure_bytes(share)?,
                };
                let output = tx.move_call(
                    MoveCall::new(package, DWALLET_COORDINATOR_MODULE_NAME, spec.function)
                        .with_arguments(vec![
                            coordinator,
                            dwallet,
                            payload,
                            session,
                            fees.ika_coin,
                            fees.sui_coin,
                        ]),
                );
                if spec.returns_capability {
                    tx.transfer_objects(vec![output], recipient);
                }
                Ok(())
            },
        )?;

        Ok(BuiltRequest {
            transaction: tx,
            placeholder_fee: plan.synthesizes_placeholder(),
        })
    }

    /// Lookup, allocation and build without tracking.
    pub(crate) async fn prepare(&self, spec: &RequestSpec<'_>) -> Result<BuiltRequest, SdkError> {
        self.check_cancelled()?;
        spec.validate()?;
        let coordinator = self.coordinator_ref().await?;
        let (tx, coordinator_arg, session) = self.open_transaction(coordinator).await?;
        self.append_request(tx, coordinator_arg, session, spec)
    }

    /// Signs and executes a built request.
    ///
    /// Ledger and signer failures are returned verbatim inside
    /// [`SdkError::Submission`]. Nothing is retried.
    pub async fn submit_request(
        &self,
        request: BuiltRequest,
    ) -> Result<ExecutionResponse, SdkError> {
        self.check_cancelled()?;
        let tx_bytes = request.transaction.to_bytes()?;
        let signature = self
            .inner
            .signer
            .sign_transaction(&tx_bytes)
            .map_err(SdkError::Submission)?;
        self.inner
            .client
            .execute_transaction(
                SignedTransaction {
                    transaction: request.transaction,
                    tx_bytes,
                    signature,
                },
                ExecuteOptions::EFFECTS_AND_EVENTS,
            )
            .await
            .map_err(SdkError::Submission)
    }

    // -----------------------------------------------------------------------
    // Tracked run
    // -----------------------------------------------------------------------

    /// Runs a request end to end, recording each step.
    pub(crate) async fn run_request<T: LedgerObject>(
        &self,
        spec: RequestSpec<'_>,
    ) -> Result<T, OperationError> {
        let mut tracker = self.tracker(spec.kind);
        let op_id = tracker.id();

        if let Err(e) = self.check_cancelled().and_then(|()| spec.validate()) {
            return Err(tracker.fail(OperationStep::Validate, e, Duration::ZERO));
        }

        // Coordinator lookup.
        let t = Instant::now();
        let coordinator = match self.coordinator_ref().await {
            Ok(c) => c,
            Err(e) => return Err(tracker.fail(OperationStep::CoordinatorLookup, e, t.elapsed())),
        };
        tracker.step_ok(OperationStep::CoordinatorLookup, t.elapsed());

        // Session allocation.
        let t = Instant::now();
        let (tx, coordinator_arg, session) = match self.open_transaction(coordinator).await {
            Ok(opened) => opened,
            Err(e) => return Err(tracker.fail(OperationStep::SessionAllocation, e, t.elapsed())),
        };
        tracker.step_ok(OperationStep::SessionAllocation, t.elapsed());

        // Build.
        let t = Instant::now();
        let built = match self.append_request(tx, coordinator_arg, session, &spec) {
            Ok(b) => b,
            Err(e) => return Err(tracker.fail(OperationStep::BuildTransaction, e, t.elapsed())),
        };
        tracker.step_ok(OperationStep::BuildTransaction, t.elapsed());
        tracker.advance(RequestState::Built);
        info!(
            operation = %op_id,
            kind = %spec.kind,
            dwallet_id = %spec.dwallet_id,
            placeholder_fee = built.placeholder_fee,
            "request built"
        );

        // Submit.
        tracker.advance(RequestState::Submitted);
        let t = Instant::now();
        let response = match self.submit_request(built).await {
            Ok(r) => r,
            Err(e) => return Err(tracker.fail(OperationStep::Submit, e, t.elapsed())),
        };
        tracker.step_ok(OperationStep::Submit, t.elapsed());
        tracker.set_digest(&response.digest);
        tracker.advance(RequestState::Acknowledged);

        // Correlate.
        let result_object_id = match spec.correlation {
            Correlation::StartEvent => {
                let t = Instant::now();
                match extract_presign_id(&response.digest, &response.events) {
                    Ok(id) => {
                        tracker.step_ok(OperationStep::ExtractStartEvent, t.elapsed());
                        id
                    }
                    Err(e) => {
                        return Err(tracker.fail(OperationStep::ExtractStartEvent, e, t.elapsed()));
                    }
                }
            }
            Correlation::TargetEntity => {
                tracker.step_skipped(OperationStep::ExtractStartEvent);
                spec.dwallet_id
            }
        };
        tracker.set_result_object(result_object_id);
        info!(
            operation = %op_id,
            digest = %response.digest,
            %result_object_id,
            "request acknowledged, awaiting network"
        );

        // Await completion.
        let t = Instant::now();
        match self.wait_for::<T>(result_object_id).await {
            Ok(value) => {
                tracker.step_ok(OperationStep::AwaitCompletion, t.elapsed());
                tracker.succeed();
                info!(operation = %op_id, %result_object_id, "request completed");
                Ok(value)
            }
            Err(e) => Err(tracker.fail(OperationStep::AwaitCompletion, e, t.elapsed())),
        }
    }
}
