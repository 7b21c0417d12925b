//! Category-scoped wallet balance calculator.
//!
//! This crate provides:
//! - [`CategoryBalance`], the combined balance of a category and all its ancestors
//! - Cascading deductions that cut category by category in ascending id order
//! - The [`BalanceDetailsProvider`] contract the calculator loads ledger entries through
//!
//! The calculator is pure arithmetic over the entries it was loaded with. It
//! performs no I/O; persisting the outcome is left to the caller.
//!
//! # Deductions
//!
//! A deduction visits the category and its ancestors sorted by numeric id. In
//! each category the refundable pool is consumed first, then the non-refundable
//! pool. Whatever the whole set cannot cover is returned as the remainder.
//!
//! ```
//! use enrolwallet_balance::{CategoryBalance, StaticDetails};
//! use enrolwallet_core::{BalanceDetail, CategoryId, CategoryTree, UserId};
//! use rust_decimal_macros::dec;
//!
//! let mut tree = CategoryTree::new();
//! tree.insert(CategoryId(5), CategoryId::SITE).unwrap();
//!
//! let provider = StaticDetails::new(UserId(2))
//!     .with_entry(CategoryId::SITE, BalanceDetail::new(dec!(0), dec!(20), dec!(5)))
//!     .with_entry(CategoryId(5), BalanceDetail::refundable(dec!(10)));
//!
//! let mut balance = CategoryBalance::new(&provider, &tree, CategoryId(5), UserId(2)).unwrap();
//! assert_eq!(balance.balance(), dec!(30));
//!
//! let remaining = balance.deduct(dec!(25));
//! assert_eq!(remaining, dec!(0));
//! assert_eq!(balance.free_cut(), dec!(5));
//! assert_eq!(balance.balance(), dec!(5));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod category_balance;
mod provider;

pub use category_balance::{BalanceError, CategoryBalance};
pub use provider::{BalanceDetailsProvider, StaticDetails};
