//! Source of the ledger entries a calculator is loaded with.

use enrolwallet_core::{BalanceDetail, BalanceDetails, CategoryId, UserId};

/// Read access to stored ledger entries.
///
/// Implemented by the persistence layer. The calculator reads through this
/// trait once, at construction.
pub trait BalanceDetailsProvider {
    /// Whether the user is known.
    fn user_exists(&self, user: UserId) -> bool;

    /// All ledger entries of a user. Users without entries get an empty map.
    fn balance_details(&self, user: UserId) -> BalanceDetails;

    /// The acting user, used to resolve [`UserId::CURRENT`].
    fn current_user(&self) -> Option<UserId> {
        None
    }
}

/// A fixed set of entries for a single user.
///
/// Handy for one-off calculations and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDetails {
    user: UserId,
    details: BalanceDetails,
    acting: bool,
}

impl StaticDetails {
    /// Entries for `user`, initially empty.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            details: BalanceDetails::new(),
            acting: false,
        }
    }

    /// Add or replace one category entry.
    #[must_use]
    pub fn with_entry(mut self, category: CategoryId, entry: BalanceDetail) -> Self {
        self.details.insert(category, entry);
        self
    }

    /// Make the owner the acting user.
    #[must_use]
    pub fn acting(mut self) -> Self {
        self.acting = true;
        self
    }
}

impl BalanceDetailsProvider for StaticDetails {
    fn user_exists(&self, user: UserId) -> bool {
        user == self.user
    }

    fn balance_details(&self, user: UserId) -> BalanceDetails {
        if user == self.user {
            self.details.clone()
        } else {
            BalanceDetails::new()
        }
    }

    fn current_user(&self) -> Option<UserId> {
        self.acting.then_some(self.user)
    }
}
