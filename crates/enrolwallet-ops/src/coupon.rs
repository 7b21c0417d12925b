//! Coupons and their usage book.

use chrono::{DateTime, Utc};
use enrolwallet_core::{round_money, CategoryId, CourseId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::config::CouponSettings;

/// What a coupon does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Credits a fixed value at the site level.
    Fixed,
    /// Takes a percentage off an enrolment fee.
    Percent,
    /// Credits a fixed value in one category.
    Category,
    /// Makes the listed courses free.
    Enrol,
}

impl CouponKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [Self::Fixed, Self::Percent, Self::Category, Self::Enrol];
}

impl fmt::Display for CouponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "fixed",
            Self::Percent => "percent",
            Self::Category => "category",
            Self::Enrol => "enrol",
        };
        f.write_str(name)
    }
}

/// A coupon definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Code typed in by the user.
    pub code: String,
    /// Kind of coupon.
    pub kind: CouponKind,
    /// Credit value for fixed and category coupons, percentage for percent coupons.
    #[serde(default)]
    pub value: Decimal,
    /// Category the coupon is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    /// Courses the coupon is bound to; empty means any course.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<CourseId>,
    /// Total number of uses allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_usage: Option<u32>,
    /// Number of uses allowed per user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_user: Option<u32>,
    /// Start of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl Coupon {
    /// A coupon without limits, restrictions or validity window.
    #[must_use]
    pub fn new(code: impl Into<String>, kind: CouponKind, value: Decimal) -> Self {
        Self {
            code: code.into(),
            kind,
            value,
            category: None,
            courses: Vec::new(),
            max_usage: None,
            max_per_user: None,
            valid_from: None,
            valid_to: None,
        }
    }

    /// Cost of an enrolment after this coupon.
    ///
    /// Fixed and category coupons leave the cost unchanged.
    #[must_use]
    pub fn discounted_cost(&self, cost: Decimal) -> Decimal {
        match self.kind {
            CouponKind::Percent => {
                let percent = self.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
                let share = (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED;
                round_money(cost * share)
            }
            CouponKind::Enrol => Decimal::ZERO,
            CouponKind::Fixed | CouponKind::Category => cost,
        }
    }
}

/// One recorded use of a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponUse {
    /// Code of the coupon.
    pub code: String,
    /// Who used it.
    pub user: UserId,
    /// Course it was used for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseId>,
    /// When it was used.
    pub timestamp: DateTime<Utc>,
}

/// Where a coupon is about to be used.
#[derive(Debug, Clone, Copy)]
pub struct CouponTarget<'a> {
    /// The (resolved) user.
    pub user: UserId,
    /// The target category and its ancestors.
    pub parents: &'a BTreeSet<CategoryId>,
    /// The course being paid for, if any.
    pub course: Option<CourseId>,
}

/// Reasons a coupon cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// No coupon has this code.
    #[error("unknown coupon code {0:?}")]
    UnknownCode(String),

    /// The coupon's kind is switched off.
    #[error("{kind} coupons are disabled")]
    KindDisabled {
        /// The disabled kind.
        kind: CouponKind,
    },

    /// The validity window has not started.
    #[error("coupon {code:?} is not valid before {from}")]
    NotYetValid {
        /// The coupon code.
        code: String,
        /// Start of the window.
        from: DateTime<Utc>,
    },

    /// The validity window has ended.
    #[error("coupon {code:?} expired at {to}")]
    Expired {
        /// The coupon code.
        code: String,
        /// End of the window.
        to: DateTime<Utc>,
    },

    /// Every allowed use has been made.
    #[error("coupon {code:?} has been used the maximum of {max} times")]
    UsageExhausted {
        /// The coupon code.
        code: String,
        /// Total allowed uses.
        max: u32,
    },

    /// This user has made every use allowed to them.
    #[error("user {user} has used coupon {code:?} the maximum of {max} times")]
    UserLimitReached {
        /// The coupon code.
        code: String,
        /// The user.
        user: UserId,
        /// Uses allowed per user.
        max: u32,
    },

    /// The coupon is bound to a category outside the target.
    #[error("coupon {code:?} only applies in category {category}")]
    WrongCategory {
        /// The coupon code.
        code: String,
        /// The category it is bound to.
        category: CategoryId,
    },

    /// The coupon is bound to other courses.
    #[error("coupon {code:?} does not apply to this course")]
    WrongCourse {
        /// The coupon code.
        code: String,
    },

    /// The coupon's value is out of range for its kind.
    #[error("coupon {code:?} has invalid value {value}")]
    InvalidValue {
        /// The coupon code.
        code: String,
        /// The rejected value.
        value: Decimal,
    },

    /// The coupon kind cannot be used for this operation.
    #[error("{kind} coupon {code:?} cannot be used here")]
    NotApplicable {
        /// The coupon code.
        code: String,
        /// Its kind.
        kind: CouponKind,
    },
}

/// Coupon definitions plus their usage log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponBook {
    #[serde(default)]
    coupons: BTreeMap<String, Coupon>,
    #[serde(default)]
    usage: Vec<CouponUse>,
}

impl CouponBook {
    /// An empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon, replacing any coupon with the same code.
    pub fn insert(&mut self, coupon: Coupon) -> Option<Coupon> {
        self.coupons.insert(coupon.code.clone(), coupon)
    }

    /// Builder form of [`CouponBook::insert`].
    #[must_use]
    pub fn with_coupon(mut self, coupon: Coupon) -> Self {
        self.insert(coupon);
        self
    }

    /// Look up a coupon.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Coupon> {
        self.coupons.get(code)
    }

    /// All coupons, ordered by code.
    pub fn coupons(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.values()
    }

    /// The usage log.
    #[must_use]
    pub fn usage(&self) -> &[CouponUse] {
        &self.usage
    }

    /// Number of recorded uses of a code.
    #[must_use]
    pub fn uses(&self, code: &str) -> usize {
        self.usage.iter().filter(|u| u.code == code).count()
    }

    /// Number of recorded uses of a code by one user.
    #[must_use]
    pub fn uses_by(&self, code: &str, user: UserId) -> usize {
        self.usage
            .iter()
            .filter(|u| u.code == code && u.user == user)
            .count()
    }

    /// Check that a coupon can be used for `target` at `now`.
    pub fn validate(
        &self,
        code: &str,
        target: &CouponTarget<'_>,
        settings: &CouponSettings,
        now: DateTime<Utc>,
    ) -> Result<&Coupon, CouponError> {
        let coupon = self
            .get(code)
            .ok_or_else(|| CouponError::UnknownCode(code.to_string()))?;
        let code = coupon.code.clone();

        if !settings.is_enabled(coupon.kind) {
            return Err(CouponError::KindDisabled { kind: coupon.kind });
        }
        if let Some(from) = coupon.valid_from.filter(|from| now < *from) {
            return Err(CouponError::NotYetValid { code, from });
        }
        if let Some(to) = coupon.valid_to.filter(|to| now > *to) {
            return Err(CouponError::Expired { code, to });
        }
        if let Some(max) = coupon.max_usage {
            if self.uses(&code) >= max as usize {
                return Err(CouponError::UsageExhausted { code, max });
            }
        }
        if let Some(max) = coupon.max_per_user {
            if self.uses_by(&code, target.user) >= max as usize {
                return Err(CouponError::UserLimitReached {
                    code,
                    user: target.user,
                    max,
                });
            }
        }
        if let Some(category) = coupon.category {
            if !target.parents.contains(&category) {
                return Err(CouponError::WrongCategory { code, category });
            }
        }
        if !coupon.courses.is_empty()
            && !target.course.is_some_and(|c| coupon.courses.contains(&c))
        {
            return Err(CouponError::WrongCourse { code });
        }

        let value_ok = match coupon.kind {
            CouponKind::Percent => {
                coupon.value >= Decimal::ZERO && coupon.value <= Decimal::ONE_HUNDRED
            }
            CouponKind::Fixed | CouponKind::Category => coupon.value >= Decimal::ZERO,
            CouponKind::Enrol => true,
        };
        if !value_ok {
            return Err(CouponError::InvalidValue {
                code,
                value: coupon.value,
            });
        }

        Ok(coupon)
    }

    /// Record one use.
    pub fn record_use(
        &mut self,
        code: &str,
        user: UserId,
        course: Option<CourseId>,
        timestamp: DateTime<Utc>,
    ) {
        self.usage.push(CouponUse {
            code: code.to_string(),
            user,
            course,
            timestamp,
        });
    }
}
