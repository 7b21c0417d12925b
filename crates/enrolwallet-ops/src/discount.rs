//! Conditional top-up discounts.
//!
//! A discount rule rewards top-ups above a threshold with extra
//! non-refundable credit. Paying `paid` under a `percent` rule is treated as
//! having bought `paid * 100 / (100 - percent)` at a discount.

use chrono::{DateTime, Utc};
use enrolwallet_core::{round_money, AmountError, CategoryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One conditional discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalDiscount {
    /// Minimum top-up the rule applies to.
    pub condition: Decimal,
    /// Discount percentage, in `[0, 100)`.
    pub percent: Decimal,
    /// Restrict the rule to top-ups in this category or its descendants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    /// Start of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl ConditionalDiscount {
    /// A rule without category restriction or validity window.
    #[must_use]
    pub const fn new(condition: Decimal, percent: Decimal) -> Self {
        Self {
            condition,
            percent,
            category: None,
            valid_from: None,
            valid_to: None,
        }
    }

    /// Restrict the rule to a category subtree.
    #[must_use]
    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Limit the rule to a time window; either bound may be open.
    #[must_use]
    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }

    /// Whether the rule covers a top-up of `paid` whose category has `parents`.
    #[must_use]
    pub fn applies(
        &self,
        paid: Decimal,
        parents: &BTreeSet<CategoryId>,
        now: DateTime<Utc>,
    ) -> bool {
        paid >= self.condition
            && self.category.map_or(true, |c| parents.contains(&c))
            && self.valid_from.map_or(true, |from| now >= from)
            && self.valid_to.map_or(true, |to| now <= to)
    }

    /// Extra credit granted for a top-up of `paid`.
    ///
    /// The bonus is `paid * percent / (100 - percent)`, which can exceed
    /// `paid` for steep discounts; an unrepresentable bonus is an error.
    ///
    /// ```
    /// use enrolwallet_ops::ConditionalDiscount;
    /// use rust_decimal_macros::dec;
    ///
    /// let rule = ConditionalDiscount::new(dec!(100), dec!(20));
    /// assert_eq!(rule.bonus(dec!(100)), Ok(dec!(25)));
    /// assert_eq!(rule.bonus(dec!(50)), Ok(dec!(12.50)));
    /// ```
    pub fn bonus(&self, paid: Decimal) -> Result<Decimal, AmountError> {
        let hundred = Decimal::ONE_HUNDRED;
        if self.percent <= Decimal::ZERO || self.percent >= hundred {
            return Ok(Decimal::ZERO);
        }
        let ratio = self.percent / (hundred - self.percent);
        paid.checked_mul(ratio).map(round_money).ok_or(AmountError::Overflow(paid))
    }
}

/// Pick the rule for a top-up: greatest condition first, then greatest percent.
#[must_use]
pub fn best_discount<'a>(
    rules: &'a [ConditionalDiscount],
    paid: Decimal,
    parents: &BTreeSet<CategoryId>,
    now: DateTime<Utc>,
) -> Option<&'a ConditionalDiscount> {
    rules
        .iter()
        .filter(|rule| rule.applies(paid, parents, now))
        .max_by(|a, b| {
            a.condition
                .cmp(&b.condition)
                .then_with(|| a.percent.cmp(&b.percent))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn site() -> BTreeSet<CategoryId> {
        BTreeSet::from([CategoryId::SITE])
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_greatest_condition_wins() {
        let rules = [
            ConditionalDiscount::new(dec!(50), dec!(30)),
            ConditionalDiscount::new(dec!(100), dec!(10)),
            ConditionalDiscount::new(dec!(500), dec!(50)),
        ];
        let best = best_discount(&rules, dec!(120), &site(), now()).unwrap();
        assert_eq!(best.condition, dec!(100));
    }

    #[test]
    fn test_tie_goes_to_greater_percent() {
        let rules = [
            ConditionalDiscount::new(dec!(100), dec!(10)),
            ConditionalDiscount::new(dec!(100), dec!(15)),
        ];
        let best = best_discount(&rules, dec!(100), &site(), now()).unwrap();
        assert_eq!(best.percent, dec!(15));
    }

    #[test]
    fn test_below_every_condition() {
        let rules = [ConditionalDiscount::new(dec!(100), dec!(10))];
        assert!(best_discount(&rules, dec!(99.99), &site(), now()).is_none());
    }

    #[test]
    fn test_category_rule_needs_matching_parent() {
        let rule = ConditionalDiscount::new(dec!(10), dec!(10)).in_category(CategoryId(4));
        assert!(!rule.applies(dec!(10), &site(), now()));

        let parents = BTreeSet::from([CategoryId::SITE, CategoryId(4), CategoryId(9)]);
        assert!(rule.applies(dec!(10), &parents, now()));
    }

    #[test]
    fn test_validity_window() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let rule = ConditionalDiscount::new(dec!(0), dec!(10)).between(Some(from), Some(to));

        assert!(!rule.applies(dec!(5), &site(), now()));
        assert!(rule.applies(dec!(5), &site(), from));
        assert!(rule.applies(dec!(5), &site(), to));
    }

    #[test]
    fn test_bonus_rounds_to_cents() {
        let rule = ConditionalDiscount::new(dec!(0), dec!(15));
        // 10 * 100 / 85 = 11.7647...
        assert_eq!(rule.bonus(dec!(10)), Ok(dec!(1.76)));
    }

    #[test]
    fn test_bonus_outside_range_is_zero() {
        assert_eq!(ConditionalDiscount::new(dec!(0), dec!(0)).bonus(dec!(10)), Ok(dec!(0)));
        assert_eq!(ConditionalDiscount::new(dec!(0), dec!(100)).bonus(dec!(10)), Ok(dec!(0)));
    }

    #[test]
    fn test_bonus_overflow() {
        let paid = Decimal::MAX / dec!(10);
        let steep = ConditionalDiscount::new(dec!(0), dec!(95));
        assert_eq!(steep.bonus(paid), Err(AmountError::Overflow(paid)));

        // 10% of a tenth of the maximum still fits
        let mild = ConditionalDiscount::new(dec!(0), dec!(10));
        assert!(mild.bonus(paid).is_ok());
    }
}
