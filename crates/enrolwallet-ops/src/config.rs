//! Wallet settings.
//!
//! Every field has a serde default, so an empty JSON object is a valid
//! configuration: transfers off, no discounts, every coupon kind enabled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coupon::CouponKind;
use crate::discount::ConditionalDiscount;

/// Errors found by [`WalletConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A percentage lies outside its allowed range.
    #[error("{field} must lie in {range}, got {value}")]
    PercentOutOfRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Allowed range, for display.
        range: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// An amount that must not be negative is.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Name of the offending setting.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },
}

/// Who pays the transfer fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeePayer {
    /// The sender is debited the amount plus the fee.
    #[default]
    Sender,
    /// The receiver gets the amount minus the fee.
    Receiver,
}

/// Transfer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Whether transfers are allowed at all.
    pub enabled: bool,
    /// Smallest amount that may be transferred.
    pub min_transfer: Decimal,
    /// Fee charged on each transfer, in percent.
    pub fee_percent: Decimal,
    /// Who pays the fee.
    pub fee_from: FeePayer,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_transfer: Decimal::ZERO,
            fee_percent: Decimal::ZERO,
            fee_from: FeePayer::Sender,
        }
    }
}

/// Coupon settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouponSettings {
    /// Kinds that may be used.
    pub enabled_kinds: Vec<CouponKind>,
}

impl Default for CouponSettings {
    fn default() -> Self {
        Self {
            enabled_kinds: CouponKind::ALL.to_vec(),
        }
    }
}

impl CouponSettings {
    /// Whether coupons of `kind` may be used.
    #[must_use]
    pub fn is_enabled(&self, kind: CouponKind) -> bool {
        self.enabled_kinds.contains(&kind)
    }
}

/// Settings of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Currency code used for display.
    pub currency: String,
    /// Transfer settings.
    pub transfer: TransferSettings,
    /// Top-up discount rules.
    pub conditional_discounts: Vec<ConditionalDiscount>,
    /// Coupon settings.
    pub coupons: CouponSettings,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            transfer: TransferSettings::default(),
            conditional_discounts: Vec::new(),
            coupons: CouponSettings::default(),
        }
    }
}

impl WalletConfig {
    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let transfer = &self.transfer;
        if transfer.min_transfer < Decimal::ZERO {
            return Err(ConfigError::NegativeAmount {
                field: "transfer.min_transfer",
                value: transfer.min_transfer,
            });
        }
        if transfer.fee_percent < Decimal::ZERO || transfer.fee_percent > Decimal::ONE_HUNDRED {
            return Err(ConfigError::PercentOutOfRange {
                field: "transfer.fee_percent",
                range: "[0, 100]",
                value: transfer.fee_percent,
            });
        }

        for rule in &self.conditional_discounts {
            if rule.condition < Decimal::ZERO {
                return Err(ConfigError::NegativeAmount {
                    field: "conditional_discounts.condition",
                    value: rule.condition,
                });
            }
            if rule.percent < Decimal::ZERO || rule.percent >= Decimal::ONE_HUNDRED {
                return Err(ConfigError::PercentOutOfRange {
                    field: "conditional_discounts.percent",
                    range: "[0, 100)",
                    value: rule.percent,
                });
            }
        }
        Ok(())
    }
}
