//! Plain-text rendering of ledger state.
//!
//! Used by the command-line tools for audit output.

use std::fmt::Write;

use crate::{BalanceDetails, TransactionRecord};

/// Render one transaction record as a single audit line.
///
/// ```
/// use enrolwallet_core::{format_record, CategoryId, TransactionKind, TransactionRecord, UserId};
/// use chrono::{TimeZone, Utc};
/// use rust_decimal_macros::dec;
///
/// let record = TransactionRecord::new(UserId(3), TransactionKind::Credit, dec!(15), CategoryId(2), "top up")
///     .with_balances(dec!(5), dec!(20), dec!(0))
///     .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
///
/// assert_eq!(
///     format_record(&record),
///     r#"2024-03-01T12:00:00+00:00 credit 15 cat=2 before=5 after=20 nonrefundable=0 "top up""#
/// );
/// ```
#[must_use]
pub fn format_record(record: &TransactionRecord) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write!(
        out,
        "{} {} {} cat={} before={} after={} nonrefundable={} {:?}",
        record.timestamp.to_rfc3339(),
        record.kind,
        record.amount,
        record.category,
        record.balance_before,
        record.balance_after,
        record.nonrefundable_after,
        record.description,
    );
    out
}

/// Render ledger entries, one category per line, in category id order.
#[must_use]
pub fn format_details(details: &BalanceDetails) -> String {
    let mut out = String::new();
    for (category, entry) in details {
        let _ = writeln!(
            out,
            "cat={category} refundable={} nonrefundable={} free={} balance={}",
            entry.refundable,
            entry.nonrefundable,
            entry.free,
            entry.balance(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BalanceDetail, CategoryId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_details_ordered() {
        let mut details = BalanceDetails::new();
        details.insert(CategoryId(7), BalanceDetail::refundable(dec!(1)));
        details.insert(CategoryId::SITE, BalanceDetail::new(dec!(2), dec!(3), dec!(1)));

        let text = format_details(&details);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "cat=0 refundable=2 nonrefundable=3 free=1 balance=5",
                "cat=7 refundable=1 nonrefundable=0 free=0 balance=1",
            ]
        );
    }

    #[test]
    fn test_format_details_empty() {
        assert!(format_details(&BalanceDetails::new()).is_empty());
    }
}
