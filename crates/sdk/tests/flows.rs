//! End-to-end request flows against a simulated MPC network.
//!
//! The in-memory ledger's responder plays the network: it inspects the
//! executed request, emits the coordinator's events, and scripts the
//! result object to complete after a few polls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use ika_config::IkaConfig;
use ika_sdk::fee::FeeCoins;
use ika_sdk::ledger::memory::{InMemoryLedger, LedgerWrites};
use ika_sdk::ledger::{LedgerError, LedgerEvent, Signer};
use ika_sdk::objects::{CompletedPresign, DWalletWithPublicShare};
use ika_sdk::tracking::{InMemoryOperationStore, OperationStep, RequestState};
use ika_sdk::transaction::{Argument, CallArg, Command, MoveCall, ObjectArg, Transaction};
use ika_sdk::{PollPolicy, Sdk, SdkConfig, SdkError};
use ika_sdk_core::{ObjectId, SuiAddress};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const COORDINATOR_VERSION: u64 = 7;

fn id(byte: u8) -> ObjectId {
    ObjectId::new([byte; 32])
}

fn ika_package() -> ObjectId {
    id(0x1a)
}

fn dwallet_package() -> ObjectId {
    id(0xd0)
}

fn coordinator() -> ObjectId {
    id(0xc0)
}

fn e1() -> ObjectId {
    id(0xe1)
}

fn signer_address() -> SuiAddress {
    SuiAddress::new([0x5a; 32])
}

struct TestSigner;

impl Signer for TestSigner {
    fn address(&self) -> SuiAddress {
        signer_address()
    }

    fn sign_transaction(&self, tx_bytes: &[u8]) -> Result<Vec<u8>, LedgerError> {
        assert!(!tx_bytes.is_empty());
        Ok(vec![0xaa; 64])
    }
}

fn network() -> IkaConfig {
    IkaConfig::new(ika_package(), dwallet_package(), coordinator())
}

fn fast_poll() -> PollPolicy {
    PollPolicy {
        max_attempts: 10,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(500),
        backoff_multiplier: 2.0,
        timeout: Duration::from_secs(30),
    }
}

fn sdk(ledger: InMemoryLedger) -> Sdk<InMemoryLedger, TestSigner> {
    ledger.insert_shared_object(coordinator(), COORDINATOR_VERSION);
    let config = SdkConfig {
        network: network(),
        poll_policy: fast_poll(),
    };
    Sdk::new(config, ledger, TestSigner, CancellationToken::new()).unwrap()
}

fn session_event() -> LedgerEvent {
    LedgerEvent {
        event_type: format!("{}::coordinator::SessionIdentifierRegisteredEvent", dwallet_package()),
        parsed_json: json!({ "session_identifier_preimage": [0, 1, 2] }),
    }
}

fn start_event(payload: Value) -> LedgerEvent {
    LedgerEvent {
        event_type: format!("{}::coordinator::DWalletSessionEvent", dwallet_package()),
        parsed_json: payload,
    }
}

fn request_call(tx: &Transaction) -> &MoveCall {
    tx.move_calls()
        .find(|c| c.module == "coordinator" && c.function.starts_with("request_"))
        .expect("request call present")
}

fn count_calls(tx: &Transaction, module: &str, function: &str) -> usize {
    tx.move_calls().filter(|c| c.is(module, function)).count()
}

fn pure_bytes(tx: &Transaction, arg: Argument) -> Vec<u8> {
    match tx.input(arg) {
        Some(CallArg::Pure(raw)) => raw.clone(),
        other => panic!("expected pure input, got {other:?}"),
    }
}

fn presign_object(presign_id: ObjectId, presign: Value) -> Value {
    json!({
        "id": { "id": presign_id.to_hex() },
        "dwallet_id": e1().to_hex(),
        "state": { "fields": { "presign": presign } }
    })
}

/// Network that answers every presign request with a new session whose
/// presign completes on the third poll.
fn presign_network(next_id: Arc<AtomicU8>) -> InMemoryLedger {
    InMemoryLedger::new().with_responder(move |tx: &Transaction, writes: &mut LedgerWrites<'_>| {
        assert!(request_call(tx).is("coordinator", "request_presign"));
        let presign_id = id(0x90 + next_id.fetch_add(1, Ordering::SeqCst));
        writes.script_object(
            presign_id,
            "PresignSession",
            vec![
                presign_object(presign_id, json!(null)),
                presign_object(presign_id, json!([])),
                presign_object(presign_id, json!([4, 5, 6])),
            ],
        );
        Ok(vec![
            session_event(),
            start_event(json!({
                "event_data": { "presign_id": presign_id.to_hex(), "dwallet_id": e1().to_hex() }
            })),
        ])
    })
}

// ---------------------------------------------------------------------------
// Presign
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn presign_with_placeholder_fee_end_to_end() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));

    let presign = sdk.presign(&e1(), FeeCoins::default()).await.unwrap();

    assert_eq!(presign.presign_id(), id(0x90));
    assert_eq!(presign.presign(), &[4, 5, 6]);

    let executed = sdk.client().executed_transactions();
    assert_eq!(executed.len(), 1);
    let tx = &executed[0];
    assert_eq!(tx.sender(), signer_address());
    assert_eq!(count_calls(tx, "coin", "zero"), 1);
    assert_eq!(count_calls(tx, "coordinator", "request_presign"), 1);
    assert_eq!(count_calls(tx, "coin", "destroy_zero"), 1);
    let transfers = tx
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::TransferObjects(..)))
        .count();
    assert_eq!(transfers, 1);

    // Only the session named by the start event is fetched.
    assert_eq!(sdk.client().fetched_ids(), vec![id(0x90); 3]);
}

#[tokio::test(start_paused = true)]
async fn presign_request_arguments() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.presign(&e1(), FeeCoins::default()).await.unwrap();
    let tx = &sdk.client().executed_transactions()[0];

    let call = request_call(tx);
    assert_eq!(call.package, dwallet_package());
    assert_eq!(call.arguments.len(), 6);
    assert_eq!(
        tx.input(call.arguments[0]),
        Some(&CallArg::Object(ObjectArg::Shared {
            id: coordinator(),
            initial_shared_version: COORDINATOR_VERSION,
            mutable: true,
        }))
    );
    assert_eq!(pure_bytes(tx, call.arguments[1]), e1().as_bytes().to_vec());
    assert_eq!(pure_bytes(tx, call.arguments[2]), vec![0, 0, 0, 0]);

    let register = tx
        .move_calls()
        .find(|c| c.is("coordinator", "register_session_identifier"))
        .unwrap();
    assert!(matches!(call.arguments[3], Argument::Result(_)));
    assert_eq!(register.arguments[0], call.arguments[0]);
    assert_eq!(call.arguments[5], Argument::GasCoin);

    let ika = format!("{}::ika::IKA", ika_package());
    let mint = tx.move_calls().find(|c| c.is("coin", "zero")).unwrap();
    assert_eq!(mint.type_arguments, vec![ika]);
}

#[tokio::test(start_paused = true)]
async fn placeholder_is_destroyed_after_request() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.presign(&e1(), FeeCoins::default()).await.unwrap();
    let tx = &sdk.client().executed_transactions()[0];

    let commands = tx.commands();
    let position = |module: &str, function: &str| {
        commands
            .iter()
            .position(|c| matches!(c, Command::MoveCall(call) if call.is(module, function)))
            .unwrap()
    };
    let mint = position("coin", "zero");
    let request = position("coordinator", "request_presign");
    let destroy = position("coin", "destroy_zero");
    assert!(mint < request && request < destroy);
    assert_eq!(destroy, commands.len() - 1);

    let Command::MoveCall(destroy_call) = &commands[destroy] else {
        unreachable!()
    };
    let minted = Argument::Result(mint as u16);
    assert_eq!(destroy_call.arguments, vec![minted]);
    assert_eq!(request_call(tx).arguments[4], minted);
}

#[tokio::test(start_paused = true)]
async fn capability_goes_to_signer() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.presign(&e1(), FeeCoins::default()).await.unwrap();
    let tx = &sdk.client().executed_transactions()[0];

    let request_index = tx
        .commands()
        .iter()
        .position(|c| matches!(c, Command::MoveCall(call) if call.is("coordinator", "request_presign")))
        .unwrap();
    for command in tx.commands() {
        if let Command::TransferObjects(objects, recipient) = command {
            assert_eq!(objects, &vec![Argument::Result(request_index as u16)]);
            assert_eq!(pure_bytes(tx, *recipient), signer_address().as_bytes().to_vec());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn presign_with_explicit_fees_has_no_placeholder() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.presign(&e1(), FeeCoins::explicit(id(0xf1), None))
        .await
        .unwrap();
    let tx = &sdk.client().executed_transactions()[0];

    assert_eq!(count_calls(tx, "coin", "zero"), 0);
    assert_eq!(count_calls(tx, "coin", "destroy_zero"), 0);
    let call = request_call(tx);
    let default_ika: ObjectId = ika_config::constants::DEFAULT_IKA_COIN_ID.parse().unwrap();
    assert_eq!(
        tx.input(call.arguments[4]),
        Some(&CallArg::Object(ObjectArg::ImmOrOwned(default_ika)))
    );
    assert_eq!(
        tx.input(call.arguments[5]),
        Some(&CallArg::Object(ObjectArg::ImmOrOwned(id(0xf1))))
    );
}

#[tokio::test]
async fn malformed_start_event_fetches_nothing() {
    let ledger = InMemoryLedger::new().with_responder(|_, _| {
        Ok(vec![
            session_event(),
            start_event(json!({ "event_data": { "dwallet_id": e1().to_hex() } })),
        ])
    });
    let sdk = sdk(ledger);
    let store = Arc::new(InMemoryOperationStore::new());
    sdk.set_operation_store(store.clone());

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert!(matches!(err.error, SdkError::InvalidStartEvent(_)));
    assert_eq!(err.failed_step, OperationStep::ExtractStartEvent);
    assert_eq!(err.failed_in, RequestState::Acknowledged);
    assert!(sdk.client().fetched_ids().is_empty());

    let op = sdk.query_operation(err.operation_id).unwrap();
    assert_eq!(op.state, RequestState::Failed);
    assert_eq!(op.digest.as_deref(), Some("mem-tx-1"));
    assert_eq!(op.result_object_id, None);
}

#[tokio::test]
async fn single_event_is_invalid_start_event() {
    let ledger = InMemoryLedger::new().with_responder(|_, _| Ok(vec![session_event()]));
    let sdk = sdk(ledger);

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert!(matches!(err.error, SdkError::InvalidStartEvent(_)));
    assert!(sdk.client().fetched_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn only_the_indexed_event_is_trusted() {
    let decoy = id(0x66);
    let target = id(0x77);
    let ledger = InMemoryLedger::new().with_responder(move |_, writes| {
        writes.put_object(target, "PresignSession", presign_object(target, json!([1])));
        writes.put_object(decoy, "PresignSession", presign_object(decoy, json!([2])));
        Ok(vec![
            start_event(json!({ "event_data": { "presign_id": decoy.to_hex() } })),
            start_event(json!({ "event_data": { "presign_id": target.to_hex() } })),
        ])
    });
    let sdk = sdk(ledger);

    let presign = sdk.presign(&e1(), FeeCoins::default()).await.unwrap();

    assert_eq!(presign.presign_id(), target);
    assert_eq!(sdk.client().fetched_ids(), vec![target]);
}

#[tokio::test]
async fn submission_failure_is_passed_through() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.client().fail_next_execution(LedgerError::InsufficientGas);

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert_eq!(err.error, SdkError::Submission(LedgerError::InsufficientGas));
    assert_eq!(err.failed_step, OperationStep::Submit);
    assert_eq!(err.failed_in, RequestState::Submitted);
    assert!(sdk.client().fetched_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn completion_timeout_then_resume() {
    let presign_id = id(0x91);
    let ledger = InMemoryLedger::new().with_responder(move |_, writes| {
        writes.put_object(presign_id, "PresignSession", presign_object(presign_id, json!(null)));
        Ok(vec![
            session_event(),
            start_event(json!({ "event_data": { "presign_id": presign_id.to_hex() } })),
        ])
    });
    let sdk = sdk(ledger);

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert_eq!(
        err.error,
        SdkError::CompletionTimeout {
            object_id: presign_id,
            attempts: 10
        }
    );
    assert_eq!(err.failed_step, OperationStep::AwaitCompletion);
    assert!(err.error.is_transient());

    // The network finishes later; keep waiting on the same object.
    sdk.client()
        .put_object(presign_id, "PresignSession", presign_object(presign_id, json!([8])));
    let pending = err.error.pending_object().unwrap();
    let presign: CompletedPresign = sdk.wait_for(pending).await.unwrap();
    assert_eq!(presign.presign(), &[8]);
    assert_eq!(sdk.client().executed_transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_requests_use_distinct_sessions() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));

    let dwallet = e1();
    let (a, b) = tokio::join!(
        sdk.presign(&dwallet, FeeCoins::default()),
        sdk.presign(&dwallet, FeeCoins::default())
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.presign_id(), b.presign_id());

    let sessions: Vec<Vec<u8>> = sdk
        .client()
        .executed_transactions()
        .iter()
        .map(|tx| {
            let register = tx
                .move_calls()
                .find(|c| c.is("coordinator", "register_session_identifier"))
                .unwrap();
            pure_bytes(tx, register.arguments[1])
        })
        .collect();
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0], sessions[1]);
}

#[tokio::test]
async fn missing_coordinator_fails_before_building() {
    let ledger = InMemoryLedger::new();
    let config = SdkConfig {
        network: network(),
        poll_policy: fast_poll(),
    };
    let sdk = Sdk::new(config, ledger, TestSigner, CancellationToken::new()).unwrap();

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert_eq!(err.error, SdkError::Ledger(LedgerError::NotFound(coordinator())));
    assert_eq!(err.failed_step, OperationStep::CoordinatorLookup);
    assert!(sdk.client().executed_transactions().is_empty());
}

#[tokio::test]
async fn shutdown_cancels_new_requests() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));
    sdk.shutdown().await;

    let err = sdk.presign(&e1(), FeeCoins::default()).await.unwrap_err();

    assert_eq!(err.error, SdkError::Cancelled);
    assert!(sdk.client().executed_transactions().is_empty());
}

#[tokio::test]
async fn build_only_has_no_side_effects() {
    let sdk = sdk(presign_network(Arc::new(AtomicU8::new(0))));

    let built = sdk
        .build_presign_request(&e1(), FeeCoins::default())
        .await
        .unwrap();

    assert!(built.placeholder_fee);
    assert_eq!(count_calls(&built.transaction, "coin", "destroy_zero"), 1);
    assert!(sdk.client().executed_transactions().is_empty());
    assert!(sdk.client().fetched_ids().is_empty());

    let response = sdk.submit_request(built).await.unwrap();
    assert_eq!(response.events.len(), 2);
    assert_eq!(sdk.client().executed_signed()[0].signature, vec![0xaa; 64]);
}

// ---------------------------------------------------------------------------
// Publish secret share
// ---------------------------------------------------------------------------

fn dwallet_object(share: Value) -> Value {
    json!({
        "id": { "id": e1().to_hex() },
        "dwallet_cap_id": id(0xca).to_hex(),
        "public_user_secret_key_share": share
    })
}

/// Network that publishes whatever share the request carried, visible on
/// the second poll.
fn publish_network() -> InMemoryLedger {
    InMemoryLedger::new().with_responder(|tx, writes| {
        let call = request_call(tx);
        assert!(call.is(
            "coordinator",
            "request_make_dwallet_user_secret_key_shares_public"
        ));
        let raw = pure_bytes(tx, call.arguments[2]);
        let share: Vec<u8> =
            bcs::from_bytes(&raw).map_err(|e| LedgerError::ExecutionFailed(e.to_string()))?;
        writes.script_object(
            e1(),
            "DWallet",
            vec![dwallet_object(json!(null)), dwallet_object(json!(share))],
        );
        Ok(vec![session_event()])
    })
}

#[tokio::test(start_paused = true)]
async fn publish_with_explicit_fees_end_to_end() {
    let sdk = sdk(publish_network());
    let (f1, f2) = (id(0xf1), id(0xf2));

    let dwallet = sdk
        .publish_secret_share(&e1(), &[1, 2, 3], FeeCoins::explicit(f1, Some(f2)))
        .await
        .unwrap();

    assert_eq!(dwallet.public_user_secret_key_share, vec![1, 2, 3]);
    assert_eq!(dwallet.id.id, e1());
    assert_eq!(dwallet.dwallet_cap_id, Some(id(0xca)));

    let tx = &sdk.client().executed_transactions()[0];
    assert_eq!(count_calls(tx, "coin", "zero"), 0);
    assert_eq!(count_calls(tx, "coin", "destroy_zero"), 0);
    assert!(
        !tx.commands()
            .iter()
            .any(|c| matches!(c, Command::TransferObjects(..)))
    );
    let call = request_call(tx);
    assert_eq!(
        tx.input(call.arguments[4]),
        Some(&CallArg::Object(ObjectArg::ImmOrOwned(f2)))
    );
    assert_eq!(
        tx.input(call.arguments[5]),
        Some(&CallArg::Object(ObjectArg::ImmOrOwned(f1)))
    );

    // Completion is observed on the dWallet itself.
    assert_eq!(sdk.client().fetched_ids(), vec![e1(), e1()]);
}

#[tokio::test(start_paused = true)]
async fn publish_with_placeholder_fee() {
    let sdk = sdk(publish_network());
    let store = Arc::new(InMemoryOperationStore::new());
    sdk.set_operation_store(store.clone());

    let dwallet: DWalletWithPublicShare = sdk
        .publish_secret_share(&e1(), &[9], FeeCoins::default())
        .await
        .unwrap();

    assert_eq!(dwallet.public_user_secret_key_share, vec![9]);
    let tx = &sdk.client().executed_transactions()[0];
    assert_eq!(count_calls(tx, "coin", "zero"), 1);
    assert_eq!(count_calls(tx, "coin", "destroy_zero"), 1);

    assert_eq!(store.len(), 1);
    assert!(sdk.active_operations().is_empty());
}

#[tokio::test]
async fn empty_share_is_rejected_up_front() {
    let sdk = sdk(publish_network());

    let err = sdk
        .publish_secret_share(&e1(), &[], FeeCoins::default())
        .await
        .unwrap_err();

    assert_eq!(err.error, SdkError::InvalidRequest("secret share is empty"));
    assert_eq!(err.failed_step, OperationStep::Validate);
    assert!(sdk.client().executed_transactions().is_empty());

    let build = sdk
        .build_publish_secret_share_request(&e1(), &[], FeeCoins::default())
        .await;
    assert!(matches!(build, Err(SdkError::InvalidRequest(_))));
}
