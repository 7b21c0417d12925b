//! Combined balance of a category and its ancestors.

use enrolwallet_core::{
    checked_credit, AmountError, BalanceDetail, BalanceDetails, CategoryHierarchy, CategoryId,
    UserId,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::BalanceDetailsProvider;

/// Errors that can occur while setting up a [`CategoryBalance`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// The user is unknown, or is the acting-user placeholder with nobody acting.
    #[error("cannot resolve user {0}")]
    UnknownUser(UserId),

    /// The category is not part of the hierarchy.
    #[error("cannot resolve category {0}")]
    UnknownCategory(CategoryId),

    /// The stored entries add up to more than a [`Decimal`] can hold.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Balance of one user as seen from one category.
///
/// The effective balance of a category is the sum of the ledger entries of the
/// category itself and every ancestor up to the site level. Credits land on
/// the category itself; deductions cascade through the whole set.
///
/// # Examples
///
/// ```
/// use enrolwallet_balance::{CategoryBalance, StaticDetails};
/// use enrolwallet_core::{BalanceDetail, CategoryId, CategoryTree, UserId};
/// use rust_decimal_macros::dec;
///
/// let mut tree = CategoryTree::new();
/// tree.insert(CategoryId(1), CategoryId::SITE).unwrap();
///
/// let provider = StaticDetails::new(UserId(7))
///     .with_entry(CategoryId::SITE, BalanceDetail::refundable(dec!(4)));
///
/// let mut balance = CategoryBalance::new(&provider, &tree, CategoryId(1), UserId(7)).unwrap();
/// balance.add(dec!(6), false, true).unwrap();
///
/// assert_eq!(balance.balance(), dec!(10));
/// assert_eq!(balance.non_refundable_balance(), dec!(6));
/// assert_eq!(balance.free_balance(), dec!(6));
///
/// // Site level (id 0) is cut before category 1
/// assert_eq!(balance.deduct(dec!(12)), dec!(2));
/// assert_eq!(balance.balance(), dec!(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBalance {
    user: UserId,
    category: CategoryId,
    /// The category and its ancestors, ascending by id.
    parents: BTreeSet<CategoryId>,
    details: BalanceDetails,
    refundable: Decimal,
    nonrefundable: Decimal,
    initial_free: Decimal,
    free_cut: Decimal,
}

impl CategoryBalance {
    /// Load the balance of `user` as seen from `category`.
    ///
    /// [`UserId::CURRENT`] is resolved through [`BalanceDetailsProvider::current_user`].
    pub fn new<P, H>(
        provider: &P,
        hierarchy: &H,
        category: CategoryId,
        user: UserId,
    ) -> Result<Self, BalanceError>
    where
        P: BalanceDetailsProvider + ?Sized,
        H: CategoryHierarchy + ?Sized,
    {
        let resolved = user
            .resolve(provider.current_user())
            .filter(|u| provider.user_exists(*u))
            .ok_or(BalanceError::UnknownUser(user))?;

        let parents = hierarchy
            .parents(category)
            .ok_or(BalanceError::UnknownCategory(category))?;

        let details = provider.balance_details(resolved);
        let mut refundable = Decimal::ZERO;
        let mut nonrefundable = Decimal::ZERO;
        let mut free = Decimal::ZERO;
        for entry in parents.iter().filter_map(|id| details.get(id)) {
            refundable = checked_credit(refundable, entry.refundable)?;
            nonrefundable = checked_credit(nonrefundable, entry.nonrefundable)?;
            free = checked_credit(free, entry.free)?;
        }
        // balance() adds the two pools without checking
        checked_credit(refundable, nonrefundable)?;

        Ok(Self {
            user: resolved,
            category,
            parents,
            details,
            refundable,
            nonrefundable,
            initial_free: free.min(nonrefundable),
            free_cut: Decimal::ZERO,
        })
    }

    /// Credit the category itself; ancestors are left alone.
    ///
    /// Non-refundable credit flagged as `free` also grows the free tracker,
    /// capped at the category's non-refundable pool. Fails without changing
    /// anything when the total balance would overflow.
    pub fn add(
        &mut self,
        amount: Decimal,
        refundable: bool,
        free: bool,
    ) -> Result<(), AmountError> {
        checked_credit(self.balance(), amount)?;
        let entry = self.details.entry(self.category).or_default();

        if refundable {
            entry.refundable = checked_credit(entry.refundable, amount)?;
            self.refundable = checked_credit(self.refundable, amount)?;
        } else {
            entry.nonrefundable = checked_credit(entry.nonrefundable, amount)?;
            self.nonrefundable = checked_credit(self.nonrefundable, amount)?;
            if free {
                entry.free = checked_credit(entry.free, amount)?.min(entry.nonrefundable);
            }
        }
        Ok(())
    }

    /// Deduct `amount` across the category and its ancestors.
    ///
    /// Categories are cut in ascending numeric id order, which is not
    /// necessarily hierarchy order. Returns the part that could not be covered;
    /// zero means the deduction was fully satisfied.
    pub fn deduct(&mut self, amount: Decimal) -> Decimal {
        let order: Vec<CategoryId> = self.parents.iter().copied().collect();
        let mut remaining = amount;

        for id in order {
            if remaining.is_zero() {
                break;
            }
            remaining = self.single_cut(remaining, id);
        }

        remaining
    }

    /// Cut `amount` from a single category entry.
    ///
    /// Refundable funds go first, then non-refundable. Returns the part the
    /// entry could not cover; a category without an entry covers nothing.
    pub fn single_cut(&mut self, amount: Decimal, id: CategoryId) -> Decimal {
        let Some(old) = self.details.get(&id).copied() else {
            return amount;
        };

        let mut remaining = Decimal::ZERO;
        let mut entry = old;

        if old.refundable >= amount {
            entry.refundable = old.refundable - amount;
        } else {
            entry.refundable = Decimal::ZERO;
            entry.nonrefundable = old.nonrefundable - (amount - old.refundable);

            if entry.nonrefundable < Decimal::ZERO {
                remaining = entry.nonrefundable.abs();
                entry.nonrefundable = Decimal::ZERO;
            }

            entry.free = old.free.min(entry.nonrefundable).max(Decimal::ZERO);
            self.free_cut += (old.free - entry.free).max(Decimal::ZERO);
        }

        self.details.insert(id, entry);
        if self.parents.contains(&id) {
            self.refundable -= old.refundable - entry.refundable;
            self.nonrefundable -= old.nonrefundable - entry.nonrefundable;
        }

        remaining
    }

    /// Total spendable balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.refundable + self.nonrefundable
    }

    /// Refundable part of the balance.
    #[must_use]
    pub const fn refundable_balance(&self) -> Decimal {
        self.refundable
    }

    /// Non-refundable part of the balance.
    #[must_use]
    pub const fn non_refundable_balance(&self) -> Decimal {
        self.nonrefundable
    }

    /// Sum of the free trackers over the category and its ancestors, computed on every call.
    #[must_use]
    pub fn free_balance(&self) -> Decimal {
        self.parents
            .iter()
            .filter_map(|id| self.details.get(id))
            .map(|entry| entry.free)
            .sum()
    }

    /// Free balance at construction, capped at the non-refundable total.
    #[must_use]
    pub const fn initial_free(&self) -> Decimal {
        self.initial_free
    }

    /// Free balance consumed by cuts so far.
    #[must_use]
    pub const fn free_cut(&self) -> Decimal {
        self.free_cut
    }

    /// The resolved user.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// The category the balance is seen from.
    #[must_use]
    pub const fn category(&self) -> CategoryId {
        self.category
    }

    /// The category and its ancestors, ascending by id.
    #[must_use]
    pub const fn parents(&self) -> &BTreeSet<CategoryId> {
        &self.parents
    }

    /// Current entry of one category, if it has one.
    #[must_use]
    pub fn entry(&self, id: CategoryId) -> Option<&BalanceDetail> {
        self.details.get(&id)
    }

    /// All entries of the user, including categories outside this view.
    #[must_use]
    pub const fn details(&self) -> &BalanceDetails {
        &self.details
    }

    /// Consume the calculator and hand back the updated entries.
    #[must_use]
    pub fn into_details(self) -> BalanceDetails {
        self.details
    }
}
