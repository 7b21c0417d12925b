//! Core types for enrolwallet
//!
//! This crate provides the fundamental types used throughout the enrolwallet project:
//!
//! - [`CategoryId`] / [`UserId`] / [`CourseId`] - Identifiers for categories, wallet owners and courses
//! - [`BalanceDetail`] - The refundable / non-refundable / free split of one ledger entry
//! - [`BalanceDetails`] - Ledger entries of one user, keyed by category
//! - [`CategoryTree`] - An in-memory course category hierarchy
//! - [`TransactionRecord`] - One entry of the append-only audit log
//!
//! # Example
//!
//! ```
//! use enrolwallet_core::{BalanceDetail, CategoryHierarchy, CategoryId, CategoryTree};
//! use rust_decimal_macros::dec;
//!
//! let mut tree = CategoryTree::new();
//! tree.insert(CategoryId(3), CategoryId::SITE).unwrap();
//! tree.insert(CategoryId(7), CategoryId(3)).unwrap();
//!
//! let parents = tree.parents(CategoryId(7)).unwrap();
//! assert_eq!(
//!     parents.into_iter().collect::<Vec<_>>(),
//!     vec![CategoryId::SITE, CategoryId(3), CategoryId(7)]
//! );
//!
//! let entry = BalanceDetail::new(dec!(10), dec!(4), dec!(9));
//! assert_eq!(entry.balance(), dec!(14));
//! assert_eq!(entry.free, dec!(4)); // clamped to the non-refundable pool
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod balance;
pub mod category;
pub mod format;
pub mod ids;
pub mod transaction;

pub use amount::{check_amount, checked_credit, round_money, AmountError};
pub use balance::{BalanceDetail, BalanceDetails};
pub use category::{CategoryError, CategoryHierarchy, CategoryNode, CategoryTree};
pub use format::{format_details, format_record};
pub use ids::{CategoryId, CourseId, UserId};
pub use transaction::{TransactionKind, TransactionRecord};

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;
