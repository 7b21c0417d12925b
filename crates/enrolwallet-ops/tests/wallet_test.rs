//! Wallet coordinator tests: credits, debits, top-ups and atomicity.

use chrono::{DateTime, TimeZone, Utc};
use enrolwallet_balance::{BalanceDetailsProvider, BalanceError};
use enrolwallet_core::{
    AmountError, BalanceDetail, CategoryId, CategoryNode, CategoryTree, TransactionKind, UserId,
};
use enrolwallet_ops::{
    ConditionalDiscount, ConfigError, Credit, Debit, LedgerStore, MemoryStore, Wallet,
    WalletConfig, WalletError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// site(0) -> 2 -> 7, site(0) -> 3
fn tree() -> CategoryTree {
    CategoryTree::from_nodes([
        CategoryNode {
            id: CategoryId(2),
            parent: CategoryId::SITE,
        },
        CategoryNode {
            id: CategoryId(7),
            parent: CategoryId(2),
        },
        CategoryNode {
            id: CategoryId(3),
            parent: CategoryId::SITE,
        },
    ])
    .unwrap()
}

fn wallet_with(config: WalletConfig) -> Wallet<MemoryStore, CategoryTree> {
    let store = MemoryStore::new().with_user(ALICE).with_user(BOB);
    Wallet::new(store, tree(), config)
        .unwrap()
        .with_clock(fixed_now)
}

fn wallet() -> Wallet<MemoryStore, CategoryTree> {
    wallet_with(WalletConfig::default())
}

#[test]
fn credit_records_effective_category_balance() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId::SITE, dec!(5), "site"))
        .unwrap();
    let record = wallet
        .credit(Credit::refundable(ALICE, CategoryId(7), dec!(10), "leaf"))
        .unwrap();

    assert_eq!(record.kind, TransactionKind::Credit);
    assert_eq!(record.balance_before, dec!(5));
    assert_eq!(record.balance_after, dec!(15));
    assert_eq!(record.timestamp, fixed_now());
    assert!(record.is_balanced());

    let details = wallet.store().balance_details(ALICE);
    assert_eq!(details[&CategoryId(7)], BalanceDetail::refundable(dec!(10)));
    assert_eq!(details[&CategoryId::SITE], BalanceDetail::refundable(dec!(5)));
}

#[test]
fn debit_cascades_and_reports_free_cut() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::nonrefundable(ALICE, CategoryId::SITE, dec!(20), "gift").free())
        .unwrap();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId(7), dec!(10), "paid"))
        .unwrap();

    let receipt = wallet
        .debit(Debit::new(ALICE, CategoryId(7), dec!(25), "fee"))
        .unwrap();

    assert_eq!(receipt.free_cut, dec!(20));
    assert_eq!(receipt.record.balance_before, dec!(30));
    assert_eq!(receipt.record.balance_after, dec!(5));
    assert_eq!(receipt.record.nonrefundable_after, dec!(0));

    let details = wallet.store().balance_details(ALICE);
    assert_eq!(details[&CategoryId::SITE], BalanceDetail::default());
    assert_eq!(details[&CategoryId(7)], BalanceDetail::refundable(dec!(5)));
    // category 2 had no entry and still has none
    assert!(!details.contains_key(&CategoryId(2)));
}

#[test]
fn insufficient_debit_writes_nothing() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId(7), dec!(10), "paid"))
        .unwrap();
    let before = wallet.store().clone();

    let err = wallet
        .debit(Debit::new(ALICE, CategoryId(7), dec!(15), "too much"))
        .unwrap_err();

    assert_eq!(
        err,
        WalletError::InsufficientBalance {
            requested: dec!(15),
            available: dec!(10),
        }
    );
    assert!(err.is_refusal());
    assert_eq!(wallet.store(), &before);
    assert_eq!(wallet.history(ALICE).unwrap().len(), 1);
}

#[test]
fn sibling_category_funds_are_not_spendable() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId(3), dec!(100), "paid"))
        .unwrap();

    let err = wallet
        .debit(Debit::new(ALICE, CategoryId(7), dec!(1), "fee"))
        .unwrap_err();
    assert!(matches!(err, WalletError::InsufficientBalance { .. }));
}

#[test]
fn negative_amounts_are_refused() {
    let mut wallet = wallet();
    let err = wallet
        .credit(Credit::refundable(ALICE, CategoryId::SITE, dec!(-3), "oops"))
        .unwrap_err();
    assert_eq!(err, WalletError::Amount(AmountError::Negative(dec!(-3))));

    let err = wallet
        .debit(Debit::new(ALICE, CategoryId::SITE, dec!(-1), "oops"))
        .unwrap_err();
    assert!(matches!(err, WalletError::Amount(_)));
    assert!(wallet.store().all_transactions().is_empty());
}

#[test]
fn unknown_user_and_category() {
    let mut wallet = wallet();
    let err = wallet
        .credit(Credit::refundable(UserId(99), CategoryId::SITE, dec!(1), "x"))
        .unwrap_err();
    assert_eq!(err, WalletError::Balance(BalanceError::UnknownUser(UserId(99))));
    assert!(!err.is_refusal());

    let err = wallet.summary(ALICE, CategoryId(42)).unwrap_err();
    assert_eq!(
        err,
        WalletError::Balance(BalanceError::UnknownCategory(CategoryId(42)))
    );
}

#[test]
fn current_user_resolves_through_store() {
    let mut wallet = wallet();
    assert!(wallet.summary(UserId::CURRENT, CategoryId::SITE).is_err());

    wallet.store_mut().set_acting(Some(BOB));
    let record = wallet
        .credit(Credit::refundable(UserId::CURRENT, CategoryId(3), dec!(4), "self"))
        .unwrap();

    assert_eq!(record.user, BOB);
    assert_eq!(wallet.summary(BOB, CategoryId(3)).unwrap().balance, dec!(4));
    assert_eq!(wallet.history(UserId::CURRENT).unwrap(), vec![record]);
}

#[test]
fn top_up_applies_best_discount_as_free_credit() {
    let mut wallet = wallet_with(WalletConfig {
        conditional_discounts: vec![
            ConditionalDiscount::new(dec!(50), dec!(10)),
            ConditionalDiscount::new(dec!(100), dec!(20)),
        ],
        ..WalletConfig::default()
    });

    let receipt = wallet.top_up(ALICE, CategoryId(2), dec!(100), "card").unwrap();
    let bonus = receipt.bonus.clone().unwrap();

    assert_eq!(receipt.payment.amount, dec!(100));
    assert_eq!(bonus.amount, dec!(25));
    assert_eq!(bonus.balance_before, dec!(100));
    assert_eq!(bonus.balance_after, dec!(125));
    assert_eq!(receipt.credited(), dec!(125));

    let summary = wallet.summary(ALICE, CategoryId(2)).unwrap();
    assert_eq!(summary.refundable, dec!(100));
    assert_eq!(summary.nonrefundable, dec!(25));
    assert_eq!(summary.free, dec!(25));
    assert_eq!(wallet.history(ALICE).unwrap().len(), 2);
}

#[test]
fn top_up_without_matching_rule_has_no_bonus() {
    let mut wallet = wallet_with(WalletConfig {
        conditional_discounts: vec![
            ConditionalDiscount::new(dec!(50), dec!(10)),
            ConditionalDiscount::new(dec!(0), dec!(30)).in_category(CategoryId(3)),
        ],
        ..WalletConfig::default()
    });

    let receipt = wallet.top_up(ALICE, CategoryId(7), dec!(20), "card").unwrap();
    assert!(receipt.bonus.is_none());
    assert_eq!(receipt.credited(), dec!(20));

    let receipt = wallet.top_up(ALICE, CategoryId(3), dec!(7), "card").unwrap();
    assert_eq!(receipt.bonus.map(|b| b.amount), Some(dec!(3)));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = WalletConfig {
        conditional_discounts: vec![ConditionalDiscount::new(dec!(10), dec!(100))],
        ..WalletConfig::default()
    };
    let err = Wallet::new(MemoryStore::new(), tree(), config).unwrap_err();
    assert!(matches!(
        err,
        WalletError::Config(ConfigError::PercentOutOfRange { .. })
    ));
}

#[test]
fn history_is_per_user_in_order() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId::SITE, dec!(10), "one"))
        .unwrap();
    wallet
        .credit(Credit::refundable(BOB, CategoryId::SITE, dec!(1), "other"))
        .unwrap();
    wallet
        .debit(Debit::new(ALICE, CategoryId::SITE, dec!(4), "two"))
        .unwrap();

    let history = wallet.history(ALICE).unwrap();
    let descriptions: Vec<_> = history.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, vec!["one", "two"]);
    assert!(history.iter().all(|r| r.is_balanced()));
    assert_eq!(wallet.store().transactions(BOB).len(), 1);
}

#[test]
fn credit_past_decimal_range_is_refused() {
    let mut wallet = wallet();
    wallet
        .credit(Credit::refundable(ALICE, CategoryId::SITE, Decimal::MAX, "max"))
        .unwrap();
    let before = wallet.store().clone();

    let err = wallet
        .credit(Credit::refundable(ALICE, CategoryId::SITE, dec!(1), "one more"))
        .unwrap_err();
    assert_eq!(err, WalletError::Amount(AmountError::Overflow(dec!(1))));
    assert!(err.is_refusal());
    assert_eq!(wallet.store(), &before);

    // The leaf sees the site entry too
    let err = wallet
        .credit(Credit::nonrefundable(ALICE, CategoryId(7), dec!(1), "leaf").free())
        .unwrap_err();
    assert!(matches!(err, WalletError::Amount(AmountError::Overflow(_))));
    assert_eq!(wallet.store(), &before);
}

#[test]
fn top_up_bonus_past_decimal_range_is_refused() {
    let paid = Decimal::MAX / dec!(10);

    let mut wallet = wallet_with(WalletConfig {
        conditional_discounts: vec![ConditionalDiscount::new(dec!(0), dec!(95))],
        ..WalletConfig::default()
    });
    let err = wallet.top_up(ALICE, CategoryId(2), paid, "card").unwrap_err();
    assert_eq!(err, WalletError::Amount(AmountError::Overflow(paid)));
    assert!(wallet.history(ALICE).unwrap().is_empty());

    let mut wallet = wallet_with(WalletConfig {
        conditional_discounts: vec![ConditionalDiscount::new(dec!(0), dec!(10))],
        ..WalletConfig::default()
    });
    let receipt = wallet.top_up(ALICE, CategoryId(2), paid, "card").unwrap();
    assert!(receipt.credited() > paid);
}
