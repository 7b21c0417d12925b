//! Enrolment wallet CLI tools.
//!
//! This crate provides command-line tools over a JSON wallet state file:
//!
//! - `ewallet-balance`: Show a user's balance as seen from a category
//! - `ewallet-credit`: Credit a wallet, top it up, or redeem a coupon
//! - `ewallet-debit`: Debit a wallet
//! - `ewallet-transfer`: Move funds between users
//! - `ewallet-enrol`: Pay an enrolment fee, optionally with a coupon
//! - `ewallet-history`: Print a user's transaction log
//!
//! # Example Usage
//!
//! ```bash
//! ewallet-credit wallet.json --user 5 --amount 20 --top-up
//! ewallet-enrol wallet.json --user 5 --course 11 --cost 15 --category 3
//! ewallet-balance wallet.json --user 5 --category 3
//! ```
//!
//! Exit codes: `0` on success, `1` when the wallet refuses the operation,
//! `2` on usage or I/O errors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod state;
