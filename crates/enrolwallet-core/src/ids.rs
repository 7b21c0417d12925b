//! Identifier newtypes for categories, users and courses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a course category.
///
/// Categories form a tree rooted at [`CategoryId::SITE`]. Ordering is plain
/// numeric ordering, which is also the order in which deductions visit
/// categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl CategoryId {
    /// The site level, root of every category tree.
    pub const SITE: Self = Self(0);

    /// Whether this is the site level.
    #[must_use]
    pub const fn is_site(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for CategoryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a wallet owner.
///
/// The value `0` ([`UserId::CURRENT`]) stands for the acting user and has to be
/// resolved before any balance is read.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Placeholder for the acting user.
    pub const CURRENT: Self = Self(0);

    /// Resolve [`UserId::CURRENT`] against the acting user.
    ///
    /// Returns `None` when the placeholder is used and nobody is acting.
    ///
    /// ```
    /// use enrolwallet_core::UserId;
    ///
    /// assert_eq!(UserId(4).resolve(Some(UserId(9))), Some(UserId(4)));
    /// assert_eq!(UserId::CURRENT.resolve(Some(UserId(9))), Some(UserId(9)));
    /// assert_eq!(UserId::CURRENT.resolve(None), None);
    /// ```
    #[must_use]
    pub fn resolve(self, current: Option<Self>) -> Option<Self> {
        if self == Self::CURRENT {
            current.filter(|u| *u != Self::CURRENT)
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a course.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CourseId(pub u64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CourseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
