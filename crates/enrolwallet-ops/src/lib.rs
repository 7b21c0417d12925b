//! Wallet operations for enrolwallet.
//!
//! This crate ties the category balance calculator to persistent storage:
//!
//! - [`LedgerStore`] - The persistence contract, with [`MemoryStore`] as the in-memory implementation
//! - [`Wallet`] - Credits, debits, top-ups, transfers, enrolment payments and coupons
//! - [`WalletConfig`] - Transfer, discount and coupon settings
//!
//! Every operation builds one batch and commits it atomically; a refused
//! operation leaves the store untouched.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod coupon;
pub mod discount;
pub mod error;
pub mod store;
pub mod wallet;

pub use config::{ConfigError, CouponSettings, FeePayer, TransferSettings, WalletConfig};
pub use coupon::{Coupon, CouponBook, CouponError, CouponKind, CouponTarget, CouponUse};
pub use discount::{best_discount, ConditionalDiscount};
pub use error::WalletError;
pub use store::{LedgerStore, LedgerWrite, MemoryStore, StoreError};
pub use wallet::{
    BalanceSummary, Credit, Debit, DebitReceipt, EnrolmentFee, EnrolmentReceipt, TopUpReceipt,
    TransferReceipt, Wallet,
};

// Re-export the calculator types that appear in this crate's API
pub use enrolwallet_balance::{BalanceDetailsProvider, BalanceError};
