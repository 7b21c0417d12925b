//! The JSON state file shared by all commands.
//!
//! A state file holds the wallet configuration, the category tree, the
//! ledger and the coupon book:
//!
//! ```json
//! {
//!   "config": { "currency": "EUR", "transfer": { "enabled": true } },
//!   "categories": [ { "id": 3, "parent": 0 } ],
//!   "store": { "users": [5, 6] },
//!   "coupons": {}
//! }
//! ```

use anyhow::{Context, Result};
use enrolwallet_core::CategoryTree;
use enrolwallet_ops::{CouponBook, MemoryStore, Wallet, WalletConfig};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Wallet over the in-memory store, as used by the CLI.
pub type FileWallet = Wallet<MemoryStore, CategoryTree>;

/// Contents of a state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Wallet settings.
    #[serde(default)]
    pub config: WalletConfig,
    /// Category tree as `(id, parent)` edges.
    #[serde(default)]
    pub categories: CategoryTree,
    /// Users, ledger entries and transaction log.
    #[serde(default)]
    pub store: MemoryStore,
    /// Coupons and their usage.
    #[serde(default)]
    pub coupons: CouponBook,
}

impl State {
    /// Build a wallet, validating the configuration.
    pub fn into_wallet(self) -> Result<FileWallet> {
        let wallet = Wallet::new(self.store, self.categories, self.config)
            .context("invalid wallet configuration")?;
        Ok(wallet.with_coupons(self.coupons))
    }

    /// Take a wallet apart again for saving.
    pub fn from_wallet(wallet: FileWallet) -> Self {
        let (store, categories, coupons, config) = wallet.into_parts();
        Self {
            config,
            categories,
            store,
            coupons,
        }
    }
}

/// Read a state file.
pub fn load(path: &Path) -> Result<State> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write a state file through a temporary sibling, then rename it into place.
pub fn save(path: &Path, state: &State) -> Result<()> {
    let mut json = serde_json::to_string_pretty(state).context("failed to serialize state")?;
    json.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Load a state file straight into a wallet.
pub fn open(path: &Path) -> Result<FileWallet> {
    load(path)?.into_wallet()
}

/// Save a wallet back to its state file.
pub fn commit(path: &Path, wallet: FileWallet) -> Result<()> {
    save(path, &State::from_wallet(wallet))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
