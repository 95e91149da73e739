//! Ika SDK: request/await orchestration for dWallet MPC operations on Sui.
//!
//! The SDK asks the Ika MPC network to do work by submitting a transaction
//! to the dWallet coordinator, then waits for the network to write its
//! output back to the ledger. It combines:
//! - **Ledger client** ([`LedgerClient`]) for reads and execution
//! - **Signer** ([`Signer`]) for the sender identity
//! - **Session allocator** ([`SessionIdentifierAllocator`]) for per-request
//!   correlation tokens
//!
//! # Request lifecycle
//!
//! ```text
//! build (coordinator + session + fees + call)
//!   -> submit (sign, execute, effects + events)
//!   -> correlate (start event at index 1, or the target dWallet)
//!   -> await (poll until the result object decodes as completed)
//! ```
//!
//! No cryptography runs locally and nothing is retried except the bounded
//! polling of the result object.
//!
//! # Usage
//!
//! ```no_run
//! use ika_config::IkaConfig;
//! use ika_sdk::fee::FeeCoins;
//! use ika_sdk::ledger::memory::InMemoryLedger;
//! use ika_sdk::{Sdk, SdkConfig};
//! use ika_sdk_core::ObjectId;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(signer: impl ika_sdk::Signer) -> Result<(), Box<dyn std::error::Error>> {
//! let network = IkaConfig::from_json(&std::fs::read_to_string("ika_config.json")?)?;
//! let cancel = CancellationToken::new();
//! let sdk = Sdk::new(SdkConfig::new(network), InMemoryLedger::new(), signer, cancel.clone())?;
//!
//! let dwallet: ObjectId = "0x1234".parse()?;
//! let presign = sdk.presign(&dwallet, FeeCoins::default()).await?;
//! println!("presign {} ready", presign.presign_id());
//!
//! sdk.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fee;
pub mod ledger;
pub mod objects;
pub mod operations;
pub mod session;
pub mod transaction;

pub use error::SdkError;
pub use ledger::{LedgerClient, Signer};
pub use operations::polling::PollPolicy;
pub use operations::request::BuiltRequest;
pub use operations::tracking;
pub use session::{RandomSessionIdentifier, SessionIdentifierAllocator};

use std::sync::{Arc, PoisonError, RwLock};

use ika_config::IkaConfig;
use ika_sdk_core::ObjectId;
use tokio_util::sync::CancellationToken;

use crate::objects::LedgerObject;
use crate::operations::tracking::{NoopOperationStore, OperationStore, OperationTracker};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// SDK configuration.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Package and object addressing of the target Ika network.
    pub network: IkaConfig,
    /// Polling budget for result objects. Defaults to 120 attempts with
    /// exponential backoff (500ms initial, 2x multiplier, 5s cap) and a
    /// five minute overall timeout.
    pub poll_policy: PollPolicy,
}

impl SdkConfig {
    /// Configuration with the default polling policy.
    pub fn new(network: IkaConfig) -> Self {
        Self {
            network,
            poll_policy: PollPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sdk
// ---------------------------------------------------------------------------

/// Shared state across all SDK operations.
pub(crate) struct SdkInner<L, S, A> {
    pub config: SdkConfig,
    pub client: L,
    pub signer: S,
    pub allocator: A,
    pub framework_package_id: ObjectId,
    pub default_ika_coin_id: ObjectId,
    pub ika_coin_type: String,
    pub operation_store: RwLock<Arc<dyn OperationStore>>,
    pub cancel: CancellationToken,
}

/// The Ika SDK entry point.
///
/// `Clone`-able (wraps an `Arc<SdkInner>`). Concurrent requests share only
/// the read-only configuration; each allocates its own session identifier.
///
/// # Type Parameters
///
/// - `L`: Ledger client (shared-object lookup, execution, object fetch)
/// - `S`: Signer paying for and sending requests
/// - `A`: Session identifier allocator (defaults to [`RandomSessionIdentifier`])
pub struct Sdk<L, S, A = RandomSessionIdentifier> {
    pub(crate) inner: Arc<SdkInner<L, S, A>>,
}

// Manual Clone: L, S, A need not be Clone.
impl<L, S, A> Clone for Sdk<L, S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, S, A> std::fmt::Debug for Sdk<L, S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("network", &self.inner.config.network)
            .field("cancelled", &self.inner.cancel.is_cancelled())
            .finish()
    }
}

impl<L, S> Sdk<L, S, RandomSessionIdentifier>
where
    L: LedgerClient,
    S: Signer,
{
    /// Creates a new SDK instance with random session identifiers.
    ///
    /// No network I/O happens during construction.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidConfig`] if the configured addresses do
    /// not parse.
    pub fn new(
        config: SdkConfig,
        client: L,
        signer: S,
        cancel: CancellationToken,
    ) -> Result<Self, SdkError> {
        Self::with_allocator(config, client, signer, RandomSessionIdentifier, cancel)
    }
}

impl<L, S, A> Sdk<L, S, A>
where
    L: LedgerClient,
    S: Signer,
    A: SessionIdentifierAllocator,
{
    /// Creates a new SDK instance with a custom session allocator.
    pub fn with_allocator(
        config: SdkConfig,
        client: L,
        signer: S,
        allocator: A,
        cancel: CancellationToken,
    ) -> Result<Self, SdkError> {
        let framework_package_id = config.network.sui_framework_package_id()?;
        let default_ika_coin_id = config.network.default_ika_coin_id()?;
        let ika_coin_type = config.network.ika_coin_type();

        Ok(Self {
            inner: Arc::new(SdkInner {
                config,
                client,
                signer,
                allocator,
                framework_package_id,
                default_ika_coin_id,
                ika_coin_type,
                operation_store: RwLock::new(Arc::new(NoopOperationStore)),
                cancel,
            }),
        })
    }

    /// Returns a reference to the SDK configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    /// Returns a reference to the ledger client.
    pub fn client(&self) -> &L {
        &self.inner.client
    }

    /// Returns a reference to the cancellation token.
    pub fn cancel(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Graceful shutdown: signals cancellation so in-flight polls stop at
    /// their next backoff.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        tokio::task::yield_now().await;
    }

    /// Checks whether the SDK has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Returns [`SdkError::Cancelled`] if the cancellation token has fired.
    pub(crate) fn check_cancelled(&self) -> Result<(), SdkError> {
        if self.inner.cancel.is_cancelled() {
            Err(SdkError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Polls `object_id` with the configured policy until it decodes as
    /// completed.
    ///
    /// Use this to keep waiting on the object named by a
    /// [`SdkError::CompletionTimeout`].
    pub async fn wait_for<T: LedgerObject>(&self, object_id: ObjectId) -> Result<T, SdkError> {
        operations::polling::wait_for_object(
            &self.inner.client,
            object_id,
            &self.inner.config.poll_policy,
            &self.inner.cancel,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Operation tracking
    // -----------------------------------------------------------------------

    /// Replace the operation store at runtime.
    ///
    /// Use [`tracking::InMemoryOperationStore`] for observability, or
    /// implement [`OperationStore`] to persist request history.
    pub fn set_operation_store(&self, store: Arc<dyn OperationStore>) {
        *self
            .inner
            .operation_store
            .write()
            .unwrap_or_else(PoisonError::into_inner) = store;
    }

    /// Get the current operation store (cheap `Arc` clone).
    pub fn operation_store(&self) -> Arc<dyn OperationStore> {
        self.inner
            .operation_store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start tracking a new operation.
    pub(crate) fn tracker(&self, kind: tracking::OperationKind) -> OperationTracker {
        OperationTracker::start(self.operation_store(), kind)
    }

    /// Query a tracked operation by ID.
    ///
    /// Returns `None` if the operation was not found (e.g. using
    /// [`tracking::NoopOperationStore`]).
    pub fn query_operation(&self, id: tracking::OperationId) -> Option<tracking::Operation> {
        self.operation_store().get(id)
    }

    /// List all operations that have not completed or failed.
    pub fn active_operations(&self) -> Vec<tracking::Operation> {
        self.operation_store().list_active()
    }
}
