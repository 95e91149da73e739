//! Publishing a dWallet's user secret key share.
//!
//! Calls `coordinator::request_make_dwallet_user_secret_key_shares_public`
//! with the share bytes. Nothing is transferred back and no new object is
//! created: completion is observed on the dWallet itself, which exposes a
//! non-empty `public_user_secret_key_share` once the network has processed
//! the request.

use ika_config::constants::REQUEST_MAKE_SHARES_PUBLIC_FUNCTION_NAME;
use ika_sdk_core::ObjectId;

use super::request::{BuiltRequest, Correlation, RequestPayload, RequestSpec};
use crate::fee::FeeCoins;
use crate::ledger::{LedgerClient, Signer};
use crate::objects::DWalletWithPublicShare;
use crate::operations::tracking::{OperationError, OperationKind};
use crate::session::SessionIdentifierAllocator;
use crate::{Sdk, SdkError};

fn publish_spec(dwallet_id: ObjectId, secret_share: &[u8], fees: FeeCoins) -> RequestSpec<'_> {
    RequestSpec {
        kind: OperationKind::PublishSecretShare,
        function: REQUEST_MAKE_SHARES_PUBLIC_FUNCTION_NAME,
        dwallet_id,
        payload: RequestPayload::SecretShare(secret_share),
        fees,
        returns_capability: false,
        correlation: Correlation::TargetEntity,
    }
}

impl<L, S, A> Sdk<L, S, A>
where
    L: LedgerClient,
    S: Signer,
    A: SessionIdentifierAllocator,
{
    /// Makes the user secret key share of `dwallet_id` public and waits
    /// until the dWallet exposes it.
    ///
    /// Returns the dWallet as re-fetched after completion. An empty
    /// `secret_share` is rejected with [`SdkError::InvalidRequest`] before
    /// anything is sent.
    pub async fn publish_secret_share(
        &self,
        dwallet_id: &ObjectId,
        secret_share: &[u8],
        fees: FeeCoins,
    ) -> Result<DWalletWithPublicShare, OperationError> {
        self.run_request(publish_spec(*dwallet_id, secret_share, fees))
            .await
    }

    /// Builds the publish request transaction without submitting it.
    pub async fn build_publish_secret_share_request(
        &self,
        dwallet_id: &ObjectId,
        secret_share: &[u8],
        fees: FeeCoins,
    ) -> Result<BuiltRequest, SdkError> {
        self.prepare(&publish_spec(*dwallet_id, secret_share, fees))
            .await
    }
}
