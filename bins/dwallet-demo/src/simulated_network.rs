//! A stand-in for the Ika MPC network on top of the in-memory ledger.
//!
//! Answers each request the way the coordinator and the network would:
//! a session registration event, then (for presigns) a start event naming
//! a new presign session that completes after a few polls. Published
//! shares appear on the dWallet after one pending read.

use std::sync::atomic::{AtomicU8, Ordering};

use ika_config::constants::{
    REQUEST_MAKE_SHARES_PUBLIC_FUNCTION_NAME, REQUEST_PRESIGN_FUNCTION_NAME,
};
use ika_sdk::ledger::memory::{InMemoryLedger, LedgerWrites};
use ika_sdk::ledger::{LedgerError, LedgerEvent, Signer};
use ika_sdk::transaction::{CallArg, MoveCall, Transaction};
use ika_sdk_core::{ObjectId, SuiAddress};
use serde_json::{Value, json};

/// Rounds the network spends on a presign before it is readable.
const PRESIGN_ROUNDS: usize = 3;

/// Signs with a fixed placeholder signature; the in-memory ledger does not
/// verify signatures.
pub struct DemoSigner {
    pub address: SuiAddress,
}

impl Signer for DemoSigner {
    fn address(&self) -> SuiAddress {
        self.address
    }

    fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<Vec<u8>, LedgerError> {
        tracing::debug!(len = tx_bytes.len(), "signing request");
        Ok(vec![0u8; 64])
    }
}

/// Builds an in-memory ledger whose responder simulates the network.
pub fn ledger(dwallet_id: ObjectId, dwallet_cap_id: ObjectId) -> InMemoryLedger {
    let next_session = AtomicU8::new(1);
    InMemoryLedger::new().with_responder(move |tx, writes| {
        let call = tx
            .move_calls()
            .find(|c| c.function.starts_with("request_"))
            .ok_or_else(|| LedgerError::ExecutionFailed("no request call".into()))?;

        let session = next_session.fetch_add(1, Ordering::Relaxed);
        let mut events = vec![registered_event(call, session)];

        match call.function.as_str() {
            REQUEST_PRESIGN_FUNCTION_NAME => {
                let presign_id = ObjectId::new([session; 32]);
                presign_session(writes, presign_id, dwallet_id);
                events.push(LedgerEvent {
                    event_type: format!("{}::coordinator::DWalletSessionEvent", call.package),
                    parsed_json: json!({
                        "event_data": {
                            "presign_id": presign_id.to_hex(),
                            "dwallet_id": dwallet_id.to_hex(),
                        }
                    }),
                });
            }
            REQUEST_MAKE_SHARES_PUBLIC_FUNCTION_NAME => {
                let share = share_argument(tx, call)?;
                publish_share(writes, dwallet_id, dwallet_cap_id, share);
            }
            other => {
                return Err(LedgerError::ExecutionFailed(format!(
                    "unknown entry point {other}"
                )));
            }
        }
        Ok(events)
    })
}

fn registered_event(call: &MoveCall, session: u8) -> LedgerEvent {
    LedgerEvent {
        event_type: format!(
            "{}::coordinator::SessionIdentifierRegisteredEvent",
            call.package
        ),
        parsed_json: json!({ "session_sequence_number": session }),
    }
}

fn presign_session(writes: &mut LedgerWrites<'_>, presign_id: ObjectId, dwallet_id: ObjectId) {
    let version = |state: Value| {
        json!({
            "id": { "id": presign_id.to_hex() },
            "dwallet_id": dwallet_id.to_hex(),
            "state": state,
        })
    };
    let mut versions = vec![version(json!({ "variant": "Requested" })); PRESIGN_ROUNDS];
    versions.push(version(json!({
        "variant": "Completed",
        "fields": { "presign": (0..32u8).collect::<Vec<_>>() }
    })));
    writes.script_object(presign_id, "PresignSession", versions);
}

fn share_argument(tx: &Transaction, call: &MoveCall) -> Result<Vec<u8>, LedgerError> {
    let arg = call
        .arguments
        .get(2)
        .ok_or_else(|| LedgerError::ExecutionFailed("missing share argument".into()))?;
    match tx.input(*arg) {
        Some(CallArg::Pure(raw)) => {
            bcs::from_bytes(raw).map_err(|e| LedgerError::ExecutionFailed(e.to_string()))
        }
        _ => Err(LedgerError::ExecutionFailed("share is not a pure input".into())),
    }
}

fn publish_share(
    writes: &mut LedgerWrites<'_>,
    dwallet_id: ObjectId,
    dwallet_cap_id: ObjectId,
    share: Vec<u8>,
) {
    let version = |share: Value| {
        json!({
            "id": { "id": dwallet_id.to_hex() },
            "dwallet_cap_id": dwallet_cap_id.to_hex(),
            "public_user_secret_key_share": share,
        })
    };
    writes.script_object(
        dwallet_id,
        "DWallet",
        vec![version(Value::Null), version(json!(share))],
    );
}
