//! Presign requests.
//!
//! A presign is precomputed by the MPC network ahead of signing. The
//! request transaction calls `coordinator::request_presign` with the ECDSA
//! algorithm tag and transfers the returned presign capability to the
//! signer. The start event names the presign session object, which is
//! polled until its state carries the presign bytes.

use ika_config::constants::{ECDSA_SIGNATURE_ALGORITHM, REQUEST_PRESIGN_FUNCTION_NAME};
use ika_sdk_core::ObjectId;

use super::request::{BuiltRequest, Correlation, RequestPayload, RequestSpec};
use crate::fee::FeeCoins;
use crate::ledger::{LedgerClient, Signer};
use crate::objects::CompletedPresign;
use crate::operations::tracking::{OperationError, OperationKind};
use crate::session::SessionIdentifierAllocator;
use crate::{Sdk, SdkError};

fn presign_spec(dwallet_id: ObjectId, fees: FeeCoins) -> RequestSpec<'static> {
    RequestSpec {
        kind: OperationKind::Presign,
        function: REQUEST_PRESIGN_FUNCTION_NAME,
        dwallet_id,
        payload: RequestPayload::SignatureAlgorithm(ECDSA_SIGNATURE_ALGORITHM),
        fees,
        returns_capability: true,
        correlation: Correlation::StartEvent,
    }
}

impl<L, S, A> Sdk<L, S, A>
where
    L: LedgerClient,
    S: Signer,
    A: SessionIdentifierAllocator,
{
    /// Requests a presign for `dwallet_id` and waits for the network to
    /// produce it.
    ///
    /// With default `fees`, a zero IKA coin is minted and destroyed in the
    /// request and the SUI fee is paid from gas.
    ///
    /// # Errors
    ///
    /// The wrapped [`SdkError`] tells where the request stopped:
    /// [`SdkError::Submission`] if it never landed,
    /// [`SdkError::InvalidStartEvent`] if it landed without a readable
    /// acknowledgement (no object is fetched in that case), and
    /// [`SdkError::CompletionTimeout`] if the presign was not ready in time.
    pub async fn presign(
        &self,
        dwallet_id: &ObjectId,
        fees: FeeCoins,
    ) -> Result<CompletedPresign, OperationError> {
        self.run_request(presign_spec(*dwallet_id, fees)).await
    }

    /// Builds the presign request transaction without submitting it.
    pub async fn build_presign_request(
        &self,
        dwallet_id: &ObjectId,
        fees: FeeCoins,
    ) -> Result<BuiltRequest, SdkError> {
        self.prepare(&presign_spec(*dwallet_id, fees)).await
    }
}
