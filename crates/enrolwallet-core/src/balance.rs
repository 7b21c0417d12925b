//! Balance ledger entries.
//!
//! A [`BalanceDetail`] is what a user holds in one category. The non-refundable
//! pool carries a `free` subset that tracks promotional credit; the total
//! balance is always derived from the two pools and never stored on its own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CategoryId;

/// Ledger entries of one user, keyed by category.
///
/// A missing key means no entry has been created for that category yet.
pub type BalanceDetails = BTreeMap<CategoryId, BalanceDetail>;

/// The refundable / non-refundable / free split of one ledger entry.
///
/// # Examples
///
/// ```
/// use enrolwallet_core::BalanceDetail;
/// use rust_decimal_macros::dec;
///
/// let entry = BalanceDetail::new(dec!(20), dec!(5), dec!(2));
/// assert_eq!(entry.balance(), dec!(25));
/// assert!(entry.is_consistent());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDetail {
    /// Funds that may be returned to the user.
    pub refundable: Decimal,
    /// Funds that can only be spent.
    pub nonrefundable: Decimal,
    /// Promotional part of `nonrefundable`.
    #[serde(default)]
    pub free: Decimal,
}

impl BalanceDetail {
    /// Create an entry; `free` is clamped into `[0, nonrefundable]`.
    #[must_use]
    pub fn new(refundable: Decimal, nonrefundable: Decimal, free: Decimal) -> Self {
        let mut entry = Self {
            refundable,
            nonrefundable,
            free,
        };
        entry.clamp_free();
        entry
    }

    /// An entry holding only refundable funds.
    #[must_use]
    pub fn refundable(amount: Decimal) -> Self {
        Self::new(amount, Decimal::ZERO, Decimal::ZERO)
    }

    /// An entry holding only non-refundable funds.
    #[must_use]
    pub fn nonrefundable(amount: Decimal) -> Self {
        Self::new(Decimal::ZERO, amount, Decimal::ZERO)
    }

    /// Total spendable balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.refundable + self.nonrefundable
    }

    /// Check if nothing is held.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.refundable.is_zero() && self.nonrefundable.is_zero() && self.free.is_zero()
    }

    /// Whether the entry satisfies `0 <= free <= nonrefundable` and has no negative pool.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.refundable >= Decimal::ZERO
            && self.nonrefundable >= Decimal::ZERO
            && self.free >= Decimal::ZERO
            && self.free <= self.nonrefundable
    }

    /// Pull `free` back into `[0, nonrefundable]`.
    pub fn clamp_free(&mut self) {
        self.free = self.free.min(self.nonrefundable).max(Decimal::ZERO);
    }
}
