//! Session identifier allocation.
//!
//! Every request carries a fresh session identifier registered with the
//! coordinator inside the same transaction. The MPC network tags its output
//! with it, so two requests must never share one.

use std::future::Future;

use ika_config::constants::{
    DWALLET_COORDINATOR_MODULE_NAME, REGISTER_SESSION_IDENTIFIER_FUNCTION_NAME,
    SESSION_IDENTIFIER_LENGTH,
};
use ika_sdk_core::ObjectId;
use rand_core::{OsRng, RngCore};

use crate::SdkError;
use crate::transaction::{Argument, MoveCall, Transaction};

/// Allocates a session identifier inside a transaction being built.
pub trait SessionIdentifierAllocator: Send + Sync {
    /// Appends whatever the allocation needs to `tx` and returns the
    /// argument to pass as the request's session identifier.
    ///
    /// `coordinator` is the coordinator's shared input and `package_id` the
    /// dWallet 2PC-MPC package.
    fn allocate(
        &self,
        tx: &mut Transaction,
        coordinator: Argument,
        package_id: ObjectId,
    ) -> impl Future<Output = Result<Argument, SdkError>> + Send;
}

/// Registers 32 bytes from the OS RNG via
/// `coordinator::register_session_identifier`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSessionIdentifier;

impl RandomSessionIdentifier {
    fn fresh_bytes() -> [u8; SESSION_IDENTIFIER_LENGTH] {
        let mut bytes = [0u8; SESSION_IDENTIFIER_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}

impl SessionIdentifierAllocator for RandomSessionIdentifier {
    async fn allocate(
        &self,
        tx: &mut Transaction,
        coordinator: Argument,
        package_id: ObjectId,
    ) -> Result<Argument, SdkError> {
        let bytes = tx.pure_bytes(&Self::fresh_bytes())?;
        Ok(tx.move_call(
            MoveCall::new(
                package_id,
                DWALLET_COORDINATOR_MODULE_NAME,
                REGISTER_SESSION_IDENTIFIER_FUNCTION_NAME,
            )
            .with_arguments(vec![coordinator, bytes]),
        ))
    }
}
