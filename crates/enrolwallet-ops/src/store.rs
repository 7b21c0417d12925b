//! Persistence contract and the in-memory ledger store.

use enrolwallet_balance::BalanceDetailsProvider;
use enrolwallet_core::{BalanceDetail, BalanceDetails, CategoryId, TransactionRecord, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised while committing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The batch references a user the store does not know.
    #[error("user {0} is not registered")]
    UnknownUser(UserId),

    /// The batch would leave a negative pool behind.
    #[error("entry for user {user} in category {category} has a negative pool: {entry:?}")]
    CorruptBalance {
        /// Owner of the entry.
        user: UserId,
        /// Category of the entry.
        category: CategoryId,
        /// The rejected entry.
        entry: BalanceDetail,
    },
}

/// One user's part of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerWrite {
    /// The user whose entries change.
    pub user: UserId,
    /// New entries for the categories touched; other categories are kept.
    pub entries: BalanceDetails,
    /// Records to append to the log, in order.
    pub records: Vec<TransactionRecord>,
}

/// Storage behind a wallet.
///
/// Reads go through [`BalanceDetailsProvider`]; writes arrive as batches that
/// are applied completely or not at all.
pub trait LedgerStore: BalanceDetailsProvider {
    /// Apply a batch atomically.
    fn commit(&mut self, batch: Vec<LedgerWrite>) -> Result<(), StoreError>;

    /// Transaction log of one user, in append order.
    fn transactions(&self, user: UserId) -> Vec<TransactionRecord>;
}

/// Ledger kept in memory, serializable as part of a state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    users: BTreeSet<UserId>,
    #[serde(default)]
    balances: BTreeMap<UserId, BalanceDetails>,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    acting: Option<UserId>,
}

impl MemoryStore {
    /// An empty store with no users.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Returns `false` if it was already known.
    ///
    /// [`UserId::CURRENT`] is a placeholder and is never registered.
    pub fn register(&mut self, user: UserId) -> bool {
        user != UserId::CURRENT && self.users.insert(user)
    }

    /// Builder form of [`MemoryStore::register`].
    #[must_use]
    pub fn with_user(mut self, user: UserId) -> Self {
        self.register(user);
        self
    }

    /// Set or clear the acting user.
    pub fn set_acting(&mut self, user: Option<UserId>) {
        self.acting = user;
    }

    /// Registered users, ascending.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.iter().copied()
    }

    /// The whole log, across users.
    #[must_use]
    pub fn all_transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    fn check(&self, write: &LedgerWrite) -> Result<(), StoreError> {
        if !self.users.contains(&write.user) {
            return Err(StoreError::UnknownUser(write.user));
        }
        for (category, entry) in &write.entries {
            let negative = entry.refundable < Decimal::ZERO
                || entry.nonrefundable < Decimal::ZERO
                || entry.free < Decimal::ZERO;
            if negative {
                return Err(StoreError::CorruptBalance {
                    user: write.user,
                    category: *category,
                    entry: *entry,
                });
            }
        }
        if let Some(record) = write.records.iter().find(|r| r.user != write.user) {
            return Err(StoreError::UnknownUser(record.user));
        }
        Ok(())
    }
}

impl BalanceDetailsProvider for MemoryStore {
    fn user_exists(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }

    fn balance_details(&self, user: UserId) -> BalanceDetails {
        self.balances.get(&user).cloned().unwrap_or_default()
    }

    fn current_user(&self) -> Option<UserId> {
        self.acting
    }
}

impl LedgerStore for MemoryStore {
    fn commit(&mut self, batch: Vec<LedgerWrite>) -> Result<(), StoreError> {
        for write in &batch {
            self.check(write)?;
        }

        for write in batch {
            let stored = self.balances.entry(write.user).or_default();
            for (category, mut entry) in write.entries {
                entry.clamp_free();
                stored.insert(category, entry);
            }
            self.transactions.extend(write.records);
        }
        Ok(())
    }

    fn transactions(&self, user: UserId) -> Vec<TransactionRecord> {
        self.transactions
            .iter()
            .filter(|r| r.user == user)
            .cloned()
            .collect()
    }
}
