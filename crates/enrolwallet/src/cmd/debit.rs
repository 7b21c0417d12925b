//! Debit command.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_record, CategoryId, UserId};
use enrolwallet_ops::Debit;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Debit a wallet, spending from the category and its ancestors.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The wallet state file
    #[arg(value_name = "FILE", required_unless_present = "generate_completions")]
    pub file: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Wallet owner (0 for the acting user)
    #[arg(short, long, required_unless_present = "generate_completions")]
    pub user: Option<UserId>,

    /// Amount to debit
    #[arg(short, long, required_unless_present = "generate_completions")]
    pub amount: Option<Decimal>,

    /// Category the debit is charged from
    #[arg(short, long, default_value_t = CategoryId::SITE)]
    pub category: CategoryId,

    /// Description for the transaction log
    #[arg(short, long, default_value = "Manual debit")]
    pub description: String,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let file = super::required(args.file.as_deref(), "FILE")?;
    let user = super::required(args.user, "--user")?;
    let amount = super::required(args.amount, "--amount")?;
    let mut wallet = state::open(file)?;

    let debit = Debit::new(user, args.category, amount, args.description.clone());
    let receipt = match wallet.debit(debit) {
        Ok(receipt) => receipt,
        Err(e) => return super::refused(e),
    };

    state::commit(file, wallet)?;
    println!("{}", format_record(&receipt.record));
    if !receipt.free_cut.is_zero() {
        println!("free credit used: {}", receipt.free_cut);
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the debit command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-debit")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        super::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    super::init_tracing(args.verbose);
    super::finish(run(&args))
}
