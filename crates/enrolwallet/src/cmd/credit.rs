//! Credit command: manual credits, paid top-ups and coupon redemption.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_record, CategoryId, UserId};
use enrolwallet_ops::Credit;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Credit a wallet.
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

    /// Amount to credit
    #[arg(
        short,
        long,
        required_unless_present_any = ["generate_completions", "coupon"],
        conflicts_with = "coupon"
    )]
    pub amount: Option<Decimal>,

    /// Category the credit lands in
    #[arg(short, long, default_value_t = CategoryId::SITE)]
    pub category: CategoryId,

    /// Credit as non-refundable
    #[arg(long)]
    pub non_refundable: bool,

    /// Credit as free (gift) credit; implies --non-refundable
    #[arg(long)]
    pub free: bool,

    /// Treat the amount as a paid top-up and apply conditional discounts
    #[arg(long, conflicts_with_all = ["non_refundable", "free"])]
    pub top_up: bool,

    /// Redeem a fixed or category coupon instead of crediting an amount
    #[arg(long, value_name = "CODE", conflicts_with_all = ["top_up", "non_refundable", "free"])]
    pub coupon: Option<String>,

    /// Description for the transaction log
    #[arg(short, long, default_value = "Manual credit")]
    pub description: String,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let file = super::required(args.file.as_deref(), "FILE")?;
    let user = super::required(args.user, "--user")?;
    let mut wallet = state::open(file)?;

    let records = if let Some(code) = &args.coupon {
        match wallet.redeem_coupon(user, args.category, code) {
            Ok(record) => vec![record],
            Err(e) => return super::refused(e),
        }
    } else {
        let amount = super::required(args.amount, "--amount")?;
        if args.top_up {
            match wallet.top_up(user, args.category, amount, args.description.clone()) {
                Ok(receipt) => std::iter::once(receipt.payment).chain(receipt.bonus).collect(),
                Err(e) => return super::refused(e),
            }
        } else {
            let mut credit = if args.non_refundable {
                Credit::nonrefundable(user, args.category, amount, args.description.clone())
            } else {
                Credit::refundable(user, args.category, amount, args.description.clone())
            };
            if args.free {
                credit = credit.free();
            }
            match wallet.credit(credit) {
                Ok(record) => vec![record],
                Err(e) => return super::refused(e),
            }
        }
    };

    state::commit(file, wallet)?;
    for record in &records {
        println!("{}", format_record(record));
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the credit command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-credit")
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
