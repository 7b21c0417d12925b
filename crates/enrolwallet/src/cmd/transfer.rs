//! Transfer command.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_record, CategoryId, UserId};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Move funds from one wallet to another.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The wallet state file
    #[arg(value_name = "FILE", required_unless_present = "generate_completions")]
    pub file: Option<PathBuf>,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    pub generate_completions: Option<ShellType>,

    /// Sender (0 for the acting user)
    #[arg(long, required_unless_present = "generate_completions")]
    pub from: Option<UserId>,

    /// Receiver
    #[arg(long, required_unless_present = "generate_completions")]
    pub to: Option<UserId>,

    /// Amount to transfer, before fees
    #[arg(short, long, required_unless_present = "generate_completions")]
    pub amount: Option<Decimal>,

    /// Category both sides are booked in
    #[arg(short, long, default_value_t = CategoryId::SITE)]
    pub category: CategoryId,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let file = super::required(args.file.as_deref(), "FILE")?;
    let from = super::required(args.from, "--from")?;
    let to = super::required(args.to, "--to")?;
    let amount = super::required(args.amount, "--amount")?;
    let mut wallet = state::open(file)?;

    let receipt = match wallet.transfer(from, to, args.category, amount) {
        Ok(receipt) => receipt,
        Err(e) => return super::refused(e),
    };

    state::commit(file, wallet)?;
    println!("{}", format_record(&receipt.debit));
    println!("{}", format_record(&receipt.credit));
    println!("fee: {}", receipt.fee);
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the transfer command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-transfer")
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
