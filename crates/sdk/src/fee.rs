//! Fee input resolution.
//!
//! Requests consume two fee inputs: an IKA coin and a SUI coin. The caller
//! either names existing coins or lets the SDK pay from gas:
//!
//! | Caller supplies | IKA input | SUI input |
//! |-----------------|-----------|-----------|
//! | SUI coin id (and maybe IKA coin id) | given IKA coin, else the default | given SUI coin |
//! | nothing | freshly minted zero IKA coin | gas coin |
//!
//! A minted zero coin must be destroyed in the same transaction, since a
//! transaction may not leave an unconsumed zero-value coin behind.
//! [`with_fee_inputs`] owns that pairing: it mints before running the
//! caller's body and appends `destroy_zero` after it.

use ika_config::constants::{
    COIN_DESTROY_ZERO_FUNCTION_NAME, COIN_MODULE_NAME, COIN_ZERO_FUNCTION_NAME,
};
use ika_sdk_core::ObjectId;

use crate::SdkError;
use crate::transaction::{Argument, MoveCall, Transaction};

// ---------------------------------------------------------------------------
// FeeCoins / FeePlan
// ---------------------------------------------------------------------------

/// Fee coins named by the caller. The default pays from gas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeCoins {
    /// SUI coin paying the network fee.
    pub sui_coin_id: Option<ObjectId>,
    /// IKA coin paying the MPC fee. Only read when `sui_coin_id` is set.
    pub ika_coin_id: Option<ObjectId>,
}

impl FeeCoins {
    /// Pay with existing coins. A missing IKA coin falls back to the
    /// configured default.
    pub fn explicit(sui_coin_id: ObjectId, ika_coin_id: Option<ObjectId>) -> Self {
        Self {
            sui_coin_id: Some(sui_coin_id),
            ika_coin_id,
        }
    }
}

/// How a transaction sources its fee inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePlan {
    /// Both coins are existing owned objects.
    Explicit {
        /// IKA coin.
        ika_coin: ObjectId,
        /// SUI coin.
        sui_coin: ObjectId,
    },
    /// Mint a zero IKA coin and pay SUI from gas.
    ZeroIkaFromGas,
}

impl FeePlan {
    /// Resolves the caller's coins against the default IKA coin.
    pub fn resolve(coins: &FeeCoins, default_ika_coin: ObjectId) -> Self {
        match coins.sui_coin_id {
            Some(sui_coin) => Self::Explicit {
                ika_coin: coins.ika_coin_id.unwrap_or(default_ika_coin),
                sui_coin,
            },
            None => Self::ZeroIkaFromGas,
        }
    }

    /// Whether this plan mints (and destroys) a zero coin.
    pub fn synthesizes_placeholder(&self) -> bool {
        matches!(self, Self::ZeroIkaFromGas)
    }
}

// ---------------------------------------------------------------------------
// ZeroCoin
// ---------------------------------------------------------------------------

/// A zero-value coin minted inside a transaction.
///
/// Consumed only by [`ZeroCoin::destroy`].
#[must_use = "a minted zero coin must be destroyed in the same transaction"]
#[derive(Debug)]
pub struct ZeroCoin {
    coin: Argument,
    framework: ObjectId,
    coin_type: String,
}

impl ZeroCoin {
    /// Appends `framework::coin::zero<coin_type>()`.
    pub fn mint(tx: &mut Transaction, framework: ObjectId, coin_type: &str) -> Self {
        let coin = tx.move_call(
            MoveCall::new(framework, COIN_MODULE_NAME, COIN_ZERO_FUNCTION_NAME)
                .with_type_arguments(vec![coin_type.to_owned()]),
        );
        Self {
            coin,
            framework,
            coin_type: coin_type.to_owned(),
        }
    }

    /// The minted coin.
    pub fn argument(&self) -> Argument {
        self.coin
    }

    /// Appends `framework::coin::destroy_zero<coin_type>(coin)`.
    pub fn destroy(self, tx: &mut Transaction) {
        tx.move_call(
            MoveCall::new(self.framework, COIN_MODULE_NAME, COIN_DESTROY_ZERO_FUNCTION_NAME)
                .with_type_arguments(vec![self.coin_type])
                .with_arguments(vec![self.coin]),
        );
    }
}

// ---------------------------------------------------------------------------
// with_fee_inputs
// ---------------------------------------------------------------------------

/// The fee arguments handed to a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeArguments {
    /// IKA coin argument.
    pub ika_coin: Argument,
    /// SUI coin argument.
    pub sui_coin: Argument,
}

/// Adds the fee inputs described by `plan`, runs `body`, and destroys the
/// zero coin afterwards if one was minted.
///
/// The destroy call is appended after everything `body` appended.
pub fn with_fee_inputs<R>(
    tx: &mut Transaction,
    plan: &FeePlan,
    framework: ObjectId,
    ika_coin_type: &str,
    body: impl FnOnce(&mut Transaction, FeeArguments) -> Result<R, SdkError>,
) -> Result<R, SdkError> {
    match *plan {
        FeePlan::Explicit { ika_coin, sui_coin } => {
            let fees = FeeArguments {
                ika_coin: tx.object(ika_coin),
                sui_coin: tx.object(sui_coin),
            };
            body(tx, fees)
        }
        FeePlan::ZeroIkaFromGas => {
            let zero = ZeroCoin::mint(tx, framework, ika_coin_type);
            let fees = FeeArguments {
                ika_coin: zero.argument(),
                sui_coin: tx.gas(),
            };
            let out = body(tx, fees)?;
            zero.destroy(tx);
            Ok(out)
        }
    }
}
