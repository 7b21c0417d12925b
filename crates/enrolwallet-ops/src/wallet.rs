//! The wallet coordinator.
//!
//! Every operation loads a [`CategoryBalance`] per user involved, applies its
//! changes to that copy, and hands the store a single batch. Nothing reaches
//! the store when any step fails.

use chrono::{DateTime, Utc};
use enrolwallet_balance::{BalanceDetailsProvider, BalanceError, CategoryBalance};
use enrolwallet_core::{
    check_amount, checked_credit, round_money, BalanceDetails, CategoryHierarchy, CategoryId,
    CourseId, TransactionKind, TransactionRecord, UserId,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{FeePayer, WalletConfig};
use crate::coupon::{CouponBook, CouponError, CouponKind, CouponTarget};
use crate::discount::best_discount;
use crate::error::WalletError;
use crate::store::{LedgerStore, LedgerWrite};

/// Request to credit a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    /// Wallet owner.
    pub user: UserId,
    /// Category the credit lands in.
    pub category: CategoryId,
    /// Amount to credit.
    pub amount: Decimal,
    /// Whether the credit can be refunded.
    pub refundable: bool,
    /// Whether non-refundable credit counts as free (gift) credit.
    pub free: bool,
    /// Log description.
    pub description: String,
}

impl Credit {
    /// A refundable credit.
    #[must_use]
    pub fn refundable(
        user: UserId,
        category: CategoryId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user,
            category,
            amount,
            refundable: true,
            free: false,
            description: description.into(),
        }
    }

    /// A non-refundable credit.
    #[must_use]
    pub fn nonrefundable(
        user: UserId,
        category: CategoryId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            refundable: false,
            ..Self::refundable(user, category, amount, description)
        }
    }

    /// Mark the credit as free; free credit is always non-refundable.
    #[must_use]
    pub fn free(mut self) -> Self {
        self.refundable = false;
        self.free = true;
        self
    }
}

/// Request to debit a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debit {
    /// Wallet owner.
    pub user: UserId,
    /// Category the debit is charged from.
    pub category: CategoryId,
    /// Amount to debit.
    pub amount: Decimal,
    /// Log description.
    pub description: String,
}

impl Debit {
    /// A debit request.
    #[must_use]
    pub fn new(
        user: UserId,
        category: CategoryId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user,
            category,
            amount,
            description: description.into(),
        }
    }
}

/// Balance figures as seen from one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    /// Resolved owner.
    pub user: UserId,
    /// Category the figures are seen from.
    pub category: CategoryId,
    /// Total spendable balance.
    pub balance: Decimal,
    /// Refundable part.
    pub refundable: Decimal,
    /// Non-refundable part.
    pub nonrefundable: Decimal,
    /// Free credit still held.
    pub free: Decimal,
}

impl From<&CategoryBalance> for BalanceSummary {
    fn from(balance: &CategoryBalance) -> Self {
        Self {
            user: balance.user(),
            category: balance.category(),
            balance: balance.balance(),
            refundable: balance.refundable_balance(),
            nonrefundable: balance.non_refundable_balance(),
            free: balance.free_balance(),
        }
    }
}

/// Result of a committed debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebitReceipt {
    /// The appended record.
    pub record: TransactionRecord,
    /// Free credit consumed by the debit.
    pub free_cut: Decimal,
}

/// Result of a committed top-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpReceipt {
    /// Record of the paid amount.
    pub payment: TransactionRecord,
    /// Record of the discount bonus, if a rule applied.
    pub bonus: Option<TransactionRecord>,
}

impl TopUpReceipt {
    /// Total amount credited, bonus included.
    #[must_use]
    pub fn credited(&self) -> Decimal {
        self.payment.amount + self.bonus.as_ref().map_or(Decimal::ZERO, |b| b.amount)
    }
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Record on the sender's side.
    pub debit: TransactionRecord,
    /// Record on the receiver's side.
    pub credit: TransactionRecord,
    /// Fee withheld.
    pub fee: Decimal,
}

/// An enrolment to pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrolmentFee {
    /// Course being enrolled in.
    pub course: CourseId,
    /// Category of the course.
    pub category: CategoryId,
    /// Fee before coupons.
    pub cost: Decimal,
}

/// Result of a committed enrolment payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolmentReceipt {
    /// Amount actually charged.
    pub charged: Decimal,
    /// The debit, absent when nothing was charged.
    pub debit: Option<DebitReceipt>,
    /// Coupon used, if any.
    pub coupon: Option<String>,
}

/// Pending changes for one user.
struct Staged {
    balance: CategoryBalance,
    original: BalanceDetails,
    records: Vec<TransactionRecord>,
    now: DateTime<Utc>,
}

impl Staged {
    fn new(balance: CategoryBalance, now: DateTime<Utc>) -> Self {
        let original = balance.details().clone();
        Self {
            balance,
            original,
            records: Vec::new(),
            now,
        }
    }

    fn user(&self) -> UserId {
        self.balance.user()
    }

    fn credit(
        &mut self,
        amount: Decimal,
        refundable: bool,
        free: bool,
        description: String,
    ) -> Result<TransactionRecord, WalletError> {
        let before = self.balance.balance();
        self.balance.add(amount, refundable, free)?;
        Ok(self.push(TransactionKind::Credit, amount, before, description))
    }

    fn debit(
        &mut self,
        amount: Decimal,
        description: String,
    ) -> Result<DebitReceipt, WalletError> {
        let before = self.balance.balance();
        let free_cut_before = self.balance.free_cut();

        let remaining = self.balance.deduct(amount);
        if remaining > Decimal::ZERO {
            return Err(WalletError::InsufficientBalance {
                requested: amount,
                available: before,
            });
        }

        let record = self.push(TransactionKind::Debit, amount, before, description);
        Ok(DebitReceipt {
            record,
            free_cut: self.balance.free_cut() - free_cut_before,
        })
    }

    fn push(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        before: Decimal,
        description: String,
    ) -> TransactionRecord {
        let record = TransactionRecord::new(
            self.balance.user(),
            kind,
            amount,
            self.balance.category(),
            description,
        )
        .with_balances(
            before,
            self.balance.balance(),
            self.balance.non_refundable_balance(),
        )
        .with_timestamp(self.now);
        self.records.push(record.clone());
        record
    }

    fn into_write(self) -> LedgerWrite {
        let user = self.balance.user();
        let original = self.original;
        let entries = self
            .balance
            .into_details()
            .into_iter()
            .filter(|(id, entry)| original.get(id) != Some(entry))
            .collect();
        LedgerWrite {
            user,
            entries,
            records: self.records,
        }
    }
}

fn refused(operation: &str, err: WalletError) -> WalletError {
    if err.is_refusal() {
        tracing::debug!("{} refused: {}", operation, err);
    } else {
        tracing::warn!("{} failed: {}", operation, err);
    }
    err
}

/// Wallet operations over a ledger store and a category hierarchy.
///
/// # Examples
///
/// ```
/// use enrolwallet_core::{CategoryId, CategoryTree, UserId};
/// use enrolwallet_ops::{Credit, Debit, MemoryStore, Wallet, WalletConfig};
/// use rust_decimal_macros::dec;
///
/// let mut tree = CategoryTree::new();
/// tree.insert(CategoryId(2), CategoryId::SITE).unwrap();
///
/// let store = MemoryStore::new().with_user(UserId(5));
/// let mut wallet = Wallet::new(store, tree, WalletConfig::default()).unwrap();
///
/// wallet
///     .credit(Credit::refundable(UserId(5), CategoryId::SITE, dec!(20), "top-up"))
///     .unwrap();
/// let receipt = wallet
///     .debit(Debit::new(UserId(5), CategoryId(2), dec!(7.5), "course fee"))
///     .unwrap();
///
/// assert_eq!(receipt.record.balance_after, dec!(12.5));
/// assert_eq!(wallet.summary(UserId(5), CategoryId(2)).unwrap().balance, dec!(12.5));
/// ```
#[derive(Debug)]
pub struct Wallet<S, H> {
    store: S,
    hierarchy: H,
    coupons: CouponBook,
    config: WalletConfig,
    clock: fn() -> DateTime<Utc>,
}

impl<S: LedgerStore, H: CategoryHierarchy> Wallet<S, H> {
    /// Create a wallet after validating `config`.
    pub fn new(store: S, hierarchy: H, config: WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;
        Ok(Self {
            store,
            hierarchy,
            coupons: CouponBook::new(),
            config,
            clock: Utc::now,
        })
    }

    /// Replace the coupon book.
    #[must_use]
    pub fn with_coupons(mut self, coupons: CouponBook) -> Self {
        self.coupons = coupons;
        self
    }

    /// Replace the clock used for timestamps and validity windows.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store, e.g. to register users.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The category hierarchy.
    pub const fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    /// The coupon book.
    pub const fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// Mutable access to the coupon book.
    pub fn coupons_mut(&mut self) -> &mut CouponBook {
        &mut self.coupons
    }

    /// The active configuration.
    pub const fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Take the wallet apart.
    pub fn into_parts(self) -> (S, H, CouponBook, WalletConfig) {
        (self.store, self.hierarchy, self.coupons, self.config)
    }

    /// Balance of `user` as seen from `category`.
    pub fn summary(
        &self,
        user: UserId,
        category: CategoryId,
    ) -> Result<BalanceSummary, WalletError> {
        let balance = self.load(user, category)?;
        Ok(BalanceSummary::from(&balance))
    }

    /// Transaction log of `user`, oldest first.
    pub fn history(&self, user: UserId) -> Result<Vec<TransactionRecord>, WalletError> {
        let resolved = user
            .resolve(self.store.current_user())
            .filter(|u| self.store.user_exists(*u))
            .ok_or(BalanceError::UnknownUser(user))?;
        Ok(self.store.transactions(resolved))
    }

    /// Credit a wallet.
    pub fn credit(&mut self, credit: Credit) -> Result<TransactionRecord, WalletError> {
        self.apply_credit(credit).map_err(|e| refused("credit", e))
    }

    /// Debit a wallet, cascading through the category's ancestors.
    pub fn debit(&mut self, debit: Debit) -> Result<DebitReceipt, WalletError> {
        self.apply_debit(debit).map_err(|e| refused("debit", e))
    }

    /// Credit a paid top-up plus any conditional discount bonus.
    pub fn top_up(
        &mut self,
        user: UserId,
        category: CategoryId,
        paid: Decimal,
        description: impl Into<String>,
    ) -> Result<TopUpReceipt, WalletError> {
        self.apply_top_up(user, category, paid, description.into())
            .map_err(|e| refused("top-up", e))
    }

    /// Move funds from one user to another.
    pub fn transfer(
        &mut self,
        from: UserId,
        to: UserId,
        category: CategoryId,
        amount: Decimal,
    ) -> Result<TransferReceipt, WalletError> {
        self.apply_transfer(from, to, category, amount)
            .map_err(|e| refused("transfer", e))
    }

    /// Pay an enrolment fee, optionally with a percent or enrol coupon.
    pub fn pay_enrolment(
        &mut self,
        user: UserId,
        fee: &EnrolmentFee,
        coupon: Option<&str>,
    ) -> Result<EnrolmentReceipt, WalletError> {
        self.apply_enrolment(user, fee, coupon)
            .map_err(|e| refused("enrolment", e))
    }

    /// Redeem a fixed or category coupon as free credit.
    pub fn redeem_coupon(
        &mut self,
        user: UserId,
        category: CategoryId,
        code: &str,
    ) -> Result<TransactionRecord, WalletError> {
        self.apply_redeem(user, category, code)
            .map_err(|e| refused("coupon redemption", e))
    }

    fn load(&self, user: UserId, category: CategoryId) -> Result<CategoryBalance, WalletError> {
        Ok(CategoryBalance::new(
            &self.store,
            &self.hierarchy,
            category,
            user,
        )?)
    }

    fn stage(
        &self,
        user: UserId,
        category: CategoryId,
        now: DateTime<Utc>,
    ) -> Result<Staged, WalletError> {
        Ok(Staged::new(self.load(user, category)?, now))
    }

    fn commit(&mut self, staged: Vec<Staged>) -> Result<(), WalletError> {
        let batch = staged.into_iter().map(Staged::into_write).collect();
        self.store.commit(batch)?;
        Ok(())
    }

    fn apply_credit(&mut self, credit: Credit) -> Result<TransactionRecord, WalletError> {
        let amount = check_amount(credit.amount)?;
        let mut staged = self.stage(credit.user, credit.category, (self.clock)())?;
        let record = staged.credit(amount, credit.refundable, credit.free, credit.description)?;
        self.commit(vec![staged])?;

        tracing::info!(
            "Credited {} to user {} in category {}",
            amount,
            record.user,
            record.category
        );
        Ok(record)
    }

    fn apply_debit(&mut self, debit: Debit) -> Result<DebitReceipt, WalletError> {
        let amount = check_amount(debit.amount)?;
        let mut staged = self.stage(debit.user, debit.category, (self.clock)())?;
        let receipt = staged.debit(amount, debit.description)?;
        self.commit(vec![staged])?;

        tracing::info!(
            "Debited {} from user {} in category {} (free cut {})",
            amount,
            receipt.record.user,
            receipt.record.category,
            receipt.free_cut
        );
        Ok(receipt)
    }

    fn apply_top_up(
        &mut self,
        user: UserId,
        category: CategoryId,
        paid: Decimal,
        description: String,
    ) -> Result<TopUpReceipt, WalletError> {
        let paid = check_amount(paid)?;
        let now = (self.clock)();
        let mut staged = self.stage(user, category, now)?;

        let rule = best_discount(
            &self.config.conditional_discounts,
            paid,
            staged.balance.parents(),
            now,
        )
        .map(|rule| rule.bonus(paid).map(|bonus| (rule.percent, bonus)))
        .transpose()?;

        let payment = staged.credit(paid, true, false, description)?;
        let bonus = match rule {
            Some((percent, bonus)) if bonus > Decimal::ZERO => Some(staged.credit(
                bonus,
                false,
                true,
                format!("Discount bonus of {percent}% on top-up"),
            )?),
            _ => None,
        };
        self.commit(vec![staged])?;

        let receipt = TopUpReceipt { payment, bonus };
        tracing::info!(
            "Topped up user {} in category {} with {} (credited {})",
            receipt.payment.user,
            category,
            paid,
            receipt.credited()
        );
        Ok(receipt)
    }

    fn apply_transfer(
        &mut self,
        from: UserId,
        to: UserId,
        category: CategoryId,
        amount: Decimal,
    ) -> Result<TransferReceipt, WalletError> {
        let amount = check_amount(amount)?;
        let settings = self.config.transfer.clone();
        if !settings.enabled {
            return Err(WalletError::TransferDisabled);
        }
        if amount < settings.min_transfer {
            return Err(WalletError::BelowMinimumTransfer {
                amount,
                minimum: settings.min_transfer,
            });
        }

        let now = (self.clock)();
        let mut sender = self.stage(from, category, now)?;
        let mut receiver = self.stage(to, category, now)?;
        if sender.user() == receiver.user() {
            return Err(WalletError::SelfTransfer(sender.user()));
        }

        let fee = round_money(amount * (settings.fee_percent / Decimal::ONE_HUNDRED));
        let (debited, credited) = match settings.fee_from {
            FeePayer::Sender => (checked_credit(amount, fee)?, amount),
            FeePayer::Receiver => (amount, amount - fee),
        };

        let debit = sender
            .debit(debited, format!("Transfer to user {}", receiver.user()))?
            .record;
        let credit = receiver.credit(
            credited,
            false,
            false,
            format!("Transfer from user {}", sender.user()),
        )?;
        self.commit(vec![sender, receiver])?;

        tracing::info!(
            "Transferred {} from user {} to user {} in category {} (fee {})",
            amount,
            debit.user,
            credit.user,
            category,
            fee
        );
        Ok(TransferReceipt { debit, credit, fee })
    }

    fn apply_enrolment(
        &mut self,
        user: UserId,
        fee: &EnrolmentFee,
        coupon: Option<&str>,
    ) -> Result<EnrolmentReceipt, WalletError> {
        let cost = check_amount(fee.cost)?;
        let now = (self.clock)();
        let mut staged = self.stage(user, fee.category, now)?;

        let mut charged = cost;
        let mut used = None;
        if let Some(code) = coupon {
            let target = CouponTarget {
                user: staged.user(),
                parents: staged.balance.parents(),
                course: Some(fee.course),
            };
            let coupon = self
                .coupons
                .validate(code, &target, &self.config.coupons, now)?;
            match coupon.kind {
                CouponKind::Percent | CouponKind::Enrol => {
                    charged = coupon.discounted_cost(cost);
                    used = Some(coupon.code.clone());
                }
                kind @ (CouponKind::Fixed | CouponKind::Category) => {
                    return Err(CouponError::NotApplicable {
                        code: coupon.code.clone(),
                        kind,
                    }
                    .into());
                }
            }
        }

        let debit = if charged > Decimal::ZERO {
            Some(staged.debit(charged, format!("Enrolment in course {}", fee.course))?)
        } else {
            None
        };
        let resolved = staged.user();
        self.commit(vec![staged])?;

        if let Some(code) = &used {
            self.coupons.record_use(code, resolved, Some(fee.course), now);
        }
        tracing::info!(
            "User {} paid {} for course {} (cost {})",
            resolved,
            charged,
            fee.course,
            cost
        );
        Ok(EnrolmentReceipt {
            charged,
            debit,
            coupon: used,
        })
    }

    fn apply_redeem(
        &mut self,
        user: UserId,
        category: CategoryId,
        code: &str,
    ) -> Result<TransactionRecord, WalletError> {
        let now = (self.clock)();
        let context = self.load(user, category)?;
        let target = CouponTarget {
            user: context.user(),
            parents: context.parents(),
            course: None,
        };
        let coupon = self
            .coupons
            .validate(code, &target, &self.config.coupons, now)?;

        let credit_category = match coupon.kind {
            CouponKind::Fixed => CategoryId::SITE,
            CouponKind::Category => coupon.category.unwrap_or(category),
            kind @ (CouponKind::Percent | CouponKind::Enrol) => {
                return Err(CouponError::NotApplicable {
                    code: coupon.code.clone(),
                    kind,
                }
                .into());
            }
        };
        let value = coupon.value;
        let code = coupon.code.clone();

        let mut staged = self.stage(context.user(), credit_category, now)?;
        let record = staged.credit(value, false, true, format!("Coupon {code}"))?;
        self.commit(vec![staged])?;

        self.coupons.record_use(&code, record.user, None, now);
        tracing::info!(
            "User {} redeemed coupon {} for {} in category {}",
            record.user,
            code,
            value,
            credit_category
        );
        Ok(record)
    }
}
