//! Transaction log records.
//!
//! Every credit and debit appends one [`TransactionRecord`]. Records are never
//! edited; the balance figures they carry make the log an audit trail that can
//! be checked against the maintained ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CategoryId, UserId};

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money added to the wallet.
    Credit,
    /// Money taken from the wallet.
    Debit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
        }
    }
}

/// One immutable entry of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Wallet owner.
    pub user: UserId,
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Amount moved, always non-negative.
    pub amount: Decimal,
    /// Effective category balance before the operation.
    pub balance_before: Decimal,
    /// Effective category balance after the operation.
    pub balance_after: Decimal,
    /// Effective non-refundable balance after the operation.
    pub nonrefundable_after: Decimal,
    /// Category the operation was made against.
    pub category: CategoryId,
    /// Human-readable reason.
    pub description: String,
    /// When the operation happened.
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        user: UserId,
        kind: TransactionKind,
        amount: Decimal,
        category: CategoryId,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user,
            kind,
            amount,
            balance_before: Decimal::ZERO,
            balance_after: Decimal::ZERO,
            nonrefundable_after: Decimal::ZERO,
            category,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    /// Set the before/after balance figures.
    #[must_use]
    pub fn with_balances(
        mut self,
        before: Decimal,
        after: Decimal,
        nonrefundable_after: Decimal,
    ) -> Self {
        self.balance_before = before;
        self.balance_after = after;
        self.nonrefundable_after = nonrefundable_after;
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Signed change this record applies to the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }

    /// Whether `balance_after` equals `balance_before` plus the signed amount.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.balance_before + self.signed_amount() == self.balance_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_amount() {
        let credit = TransactionRecord::new(
            UserId(1),
            TransactionKind::Credit,
            dec!(5),
            CategoryId::SITE,
            "top up",
        );
        assert_eq!(credit.signed_amount(), dec!(5));

        let debit = TransactionRecord {
            kind: TransactionKind::Debit,
            ..credit
        };
        assert_eq!(debit.signed_amount(), dec!(-5));
    }

    #[test]
    fn test_is_balanced() {
        let record = TransactionRecord::new(
            UserId(1),
            TransactionKind::Debit,
            dec!(3),
            CategoryId(4),
            "course fee",
        )
        .with_balances(dec!(10), dec!(7), dec!(2));
        assert!(record.is_balanced());

        let wrong = record.with_balances(dec!(10), dec!(8), dec!(2));
        assert!(!wrong.is_balanced());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Debit).unwrap(),
            r#""debit""#
        );
    }
}
