//! dWallet request demo against a simulated Ika network.
//!
//! Runs a presign paid from gas (zero IKA placeholder) and then publishes a
//! user secret key share with explicit fee coins, logging each request's
//! progress. The ledger is in-memory and the MPC network is simulated, so
//! no node or keys are needed.
//!
//! # Configuration
//!
//! Set `IKA_CONFIG` to the path of an `ika_config.json` to use its package
//! and coordinator addresses. If unset, placeholder addresses are used.
//!
//! ```bash
//! RUST_LOG=info,ika_sdk=debug cargo run -p dwallet-demo
//! ```

mod simulated_network;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ika_config::IkaConfig;
use ika_sdk::fee::FeeCoins;
use ika_sdk::tracking::InMemoryOperationStore;
use ika_sdk::{PollPolicy, Sdk, SdkConfig};
use ika_sdk_core::{ObjectId, SuiAddress};
use simulated_network::DemoSigner;

const COORDINATOR_INITIAL_SHARED_VERSION: u64 = 1;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("dwallet-demo starting");

    // -----------------------------------------------------------------------
    // Network and SDK setup
    // -----------------------------------------------------------------------

    let network = resolve_network("IKA_CONFIG");
    let dwallet_id = ObjectId::new([0xd1; 32]);
    let dwallet_cap_id = ObjectId::new([0xca; 32]);

    let ledger = simulated_network::ledger(dwallet_id, dwallet_cap_id);
    ledger.insert_shared_object(
        network.coordinator_object_id(),
        COORDINATOR_INITIAL_SHARED_VERSION,
    );

    let signer = DemoSigner {
        address: SuiAddress::new([0x5e; 32]),
    };
    tracing::info!(address = %signer.address, "signer ready");

    let cancel = CancellationToken::new();
    let sdk = Sdk::new(
        SdkConfig {
            network,
            poll_policy: PollPolicy {
                initial_backoff: Duration::from_millis(200),
                ..PollPolicy::default()
            },
        },
        ledger,
        signer,
        cancel.clone(),
    )
    .expect("SDK init");

    let operations = Arc::new(InMemoryOperationStore::new());
    sdk.set_operation_store(operations.clone());
    tracing::info!("SDK initialized");

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    let run = async {
        match sdk.presign(&dwallet_id, FeeCoins::default()).await {
            Ok(presign) => tracing::info!(
                presign_id = %presign.presign_id(),
                len = presign.presign().len(),
                "presign ready"
            ),
            Err(e) => tracing::error!(%e, "presign failed"),
        }

        let share = [0x42u8; 32];
        let fees = FeeCoins::explicit(ObjectId::new([0xf1; 32]), None);
        match sdk.publish_secret_share(&dwallet_id, &share, fees).await {
            Ok(dwallet) => tracing::info!(
                dwallet_id = %dwallet.id.id,
                share_len = dwallet.public_user_secret_key_share.len(),
                "secret share published"
            ),
            Err(e) => tracing::error!(%e, "publish failed"),
        }
    };

    tokio::select! {
        _ = run => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    sdk.shutdown().await;
    tracing::info!(
        requests = operations.len(),
        transactions = sdk.client().executed_transactions().len(),
        "dwallet-demo stopped"
    );
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the network from an env-named `ika_config.json`, or use placeholders.
fn resolve_network(env_key: &str) -> IkaConfig {
    if let Ok(path) = std::env::var(env_key) {
        let json = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("{env_key}={path} is not readable: {e}"));
        IkaConfig::from_json(&json).unwrap_or_else(|e| panic!("{env_key}={path}: {e}"))
    } else {
        IkaConfig::new(
            ObjectId::new([0x1a; 32]),
            ObjectId::new([0xd0; 32]),
            ObjectId::new([0xc0; 32]),
        )
    }
}
