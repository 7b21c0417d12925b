//! Monetary amount guards.
//!
//! Wallet amounts are plain [`Decimal`]s. The balance calculator assumes every
//! amount it receives is non-negative; [`check_amount`] is the gate callers
//! run before handing an amount over.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places kept for derived amounts (fees, bonuses).
pub const MONEY_SCALE: u32 = 2;

/// Errors raised by the amount guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The amount is below zero.
    #[error("amount must not be negative, got {0}")]
    Negative(Decimal),

    /// Applying the amount would exceed what a [`Decimal`] can hold.
    #[error("applying {0} overflows the balance")]
    Overflow(Decimal),
}

/// Reject negative amounts.
///
/// ```
/// use enrolwallet_core::{check_amount, AmountError};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(check_amount(dec!(12.50)), Ok(dec!(12.50)));
/// assert_eq!(check_amount(dec!(0)), Ok(dec!(0)));
/// assert_eq!(check_amount(dec!(-1)), Err(AmountError::Negative(dec!(-1))));
/// ```
pub fn check_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }
    Ok(amount)
}

/// Add `amount` to `total`, failing instead of overflowing.
///
/// ```
/// use enrolwallet_core::{checked_credit, AmountError};
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(checked_credit(dec!(1.5), dec!(2)), Ok(dec!(3.5)));
/// assert_eq!(checked_credit(Decimal::MAX, dec!(1)), Err(AmountError::Overflow(dec!(1))));
/// ```
pub fn checked_credit(total: Decimal, amount: Decimal) -> Result<Decimal, AmountError> {
    total
        .checked_add(amount)
        .ok_or(AmountError::Overflow(amount))
}

/// Round a derived amount to [`MONEY_SCALE`] places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_zero_is_accepted() {
        let negative_zero = -Decimal::ZERO;
        assert!(check_amount(negative_zero).is_ok());
    }

    #[test]
    fn test_checked_credit_at_the_limit() {
        assert_eq!(checked_credit(Decimal::MAX, Decimal::ZERO), Ok(Decimal::MAX));
        assert_eq!(
            checked_credit(Decimal::MAX - dec!(1), dec!(1)),
            Ok(Decimal::MAX)
        );
        assert_eq!(
            checked_credit(Decimal::MAX, dec!(2)),
            Err(AmountError::Overflow(dec!(2)))
        );
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(3.3333333)), dec!(3.33));
    }
}
