//! Errors returned by wallet operations.

use enrolwallet_balance::BalanceError;
use enrolwallet_core::{AmountError, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::coupon::CouponError;
use crate::store::StoreError;

/// Errors returned by [`Wallet`](crate::Wallet) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// An input amount was rejected.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The user or category could not be resolved.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// The store refused the batch.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The coupon cannot be used.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The balance does not cover the debit.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount asked for.
        requested: Decimal,
        /// Balance at the time of the request.
        available: Decimal,
    },

    /// Transfers are switched off.
    #[error("transfers are disabled")]
    TransferDisabled,

    /// The transfer is smaller than the configured minimum.
    #[error("transfer of {amount} is below the minimum of {minimum}")]
    BelowMinimumTransfer {
        /// Amount asked for.
        amount: Decimal,
        /// Configured minimum.
        minimum: Decimal,
    },

    /// Sender and receiver are the same user.
    #[error("user {0} cannot transfer to themselves")]
    SelfTransfer(UserId),
}

impl WalletError {
    /// Whether this is a refusal of a well-formed request, as opposed to a
    /// broken setup (unknown ids, bad configuration, store failures).
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::Amount(_)
                | Self::Coupon(_)
                | Self::InsufficientBalance { .. }
                | Self::TransferDisabled
                | Self::BelowMinimumTransfer { .. }
                | Self::SelfTransfer(_)
        )
    }
}
