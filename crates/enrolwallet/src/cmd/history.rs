//! History command: print a user's transaction log.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_record, UserId};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Print the transaction log of a wallet, oldest first.
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

    let records = match wallet.history(user) {
        Ok(records) => records,
        Err(e) => return super::refused(e),
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&records)?)?;
    } else {
        for record in &records {
            writeln!(stdout, "{}", format_record(record))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the history command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-history")
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
