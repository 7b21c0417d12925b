//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod balance;
pub mod completions;
pub mod credit;
pub mod debit;
pub mod enrol;
pub mod history;
pub mod transfer;

use anyhow::{Context, Result};
use enrolwallet_ops::WalletError;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Install a DEBUG-level subscriber writing to stderr.
pub(crate) fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Map the outcome of `run` to an exit code.
pub(crate) fn finish(result: Result<ExitCode>) -> ExitCode {
    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Report a refused operation with exit code 1; anything else is an error.
pub(crate) fn refused(err: WalletError) -> Result<ExitCode> {
    if err.is_refusal() {
        eprintln!("refused: {err}");
        Ok(ExitCode::from(1))
    } else {
        Err(err.into())
    }
}

/// Unwrap an argument clap only requires outside completion mode.
pub(crate) fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.with_context(|| format!("the argument '{flag}' is required"))
}
