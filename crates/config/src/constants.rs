//! Ika protocol constants.
//!
//! Move addressing for the entry points the SDK calls, fixed protocol
//! parameters, and polling defaults.

// ---------------------------------------------------------------------------
// Sui framework
// ---------------------------------------------------------------------------

/// Address of the Sui framework package (`0x2`).
pub const SUI_FRAMEWORK_PACKAGE_ID: &str = "0x2";

/// Framework module hosting `zero` and `destroy_zero`.
pub const COIN_MODULE_NAME: &str = "coin";

/// `coin::zero<T>()`: mints a zero-value coin of type `T`.
pub const COIN_ZERO_FUNCTION_NAME: &str = "zero";

/// `coin::destroy_zero<T>(coin)`: consumes a zero-value coin.
pub const COIN_DESTROY_ZERO_FUNCTION_NAME: &str = "destroy_zero";

// ---------------------------------------------------------------------------
// Ika packages
// ---------------------------------------------------------------------------

/// Module in the IKA package defining the coin type.
pub const IKA_COIN_MODULE_NAME: &str = "ika";

/// Struct name of the IKA coin type.
pub const IKA_COIN_STRUCT_NAME: &str = "IKA";

/// Module in the dWallet 2PC-MPC package hosting the coordinator entry points.
pub const DWALLET_COORDINATOR_MODULE_NAME: &str = "coordinator";

/// Registers a caller-chosen session identifier with the coordinator.
pub const REGISTER_SESSION_IDENTIFIER_FUNCTION_NAME: &str = "register_session_identifier";

/// Requests a presign session. Returns an unverified presign capability.
pub const REQUEST_PRESIGN_FUNCTION_NAME: &str = "request_presign";

/// Requests that a dWallet's user secret key share be made public.
pub const REQUEST_MAKE_SHARES_PUBLIC_FUNCTION_NAME: &str =
    "request_make_dwallet_user_secret_key_shares_public";

// ---------------------------------------------------------------------------
// Protocol parameters
// ---------------------------------------------------------------------------

/// Signature algorithm tag passed to `request_presign` (ECDSA).
pub const ECDSA_SIGNATURE_ALGORITHM: u32 = 0;

/// Length in bytes of a session identifier preimage.
pub const SESSION_IDENTIFIER_LENGTH: usize = 32;

/// IKA coin used for fees when the caller supplies a SUI coin but no IKA
/// coin. This is a testnet object; deployments override it through
/// `IkaConfig::default_ika_coin_id`.
pub const DEFAULT_IKA_COIN_ID: &str =
    "0x9df87437f4f0fb73bffe6fc6291f568da6e59ad4ad0770743b21cd4e1c030914";

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Maximum number of fetches while waiting for a result object.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 120;

/// Delay before the second fetch, in milliseconds. The first is immediate.
pub const DEFAULT_POLL_INITIAL_BACKOFF_MS: u64 = 500;

/// Upper bound on the delay between fetches, in milliseconds.
pub const DEFAULT_POLL_MAX_BACKOFF_MS: u64 = 5_000;

/// Overall deadline for a result object to reach its completed shape.
pub const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 5 * 60 * 1_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_identifier_matches_move_preimage_length() {
        assert_eq!(SESSION_IDENTIFIER_LENGTH, 32);
    }

    #[test]
    fn backoff_cap_exceeds_initial_delay() {
        assert!(DEFAULT_POLL_MAX_BACKOFF_MS >= DEFAULT_POLL_INITIAL_BACKOFF_MS);
    }
}
