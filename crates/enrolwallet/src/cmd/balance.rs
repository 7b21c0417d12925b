//! Balance command: show what a user can spend in a category.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_details, CategoryId, UserId};
use enrolwallet_ops::BalanceDetailsProvider as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Show a user's wallet balance as seen from a category.
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

    /// Category to view the balance from
    #[arg(short, long, default_value_t = CategoryId::SITE)]
    pub category: CategoryId,

    /// Also list the raw ledger entries of every category
    #[arg(long)]
    pub details: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let file = super::required(args.file.as_deref(), "FILE")?;
    let user = super::required(args.user, "--user")?;

    let wallet = state::open(file)?;
    let summary = match wallet.summary(user, args.category) {
        Ok(summary) => summary,
        Err(e) => return super::refused(e),
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    let currency = &wallet.config().currency;
    writeln!(
        stdout,
        "user {} in category {}",
        summary.user, summary.category
    )?;
    writeln!(stdout, "  balance        {} {currency}", summary.balance)?;
    writeln!(stdout, "  refundable     {} {currency}", summary.refundable)?;
    writeln!(stdout, "  nonrefundable  {} {currency}", summary.nonrefundable)?;
    writeln!(stdout, "  free           {} {currency}", summary.free)?;

    if args.details {
        let details = wallet.store().balance_details(summary.user);
        write!(stdout, "{}", format_details(&details))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the balance command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-balance")
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
