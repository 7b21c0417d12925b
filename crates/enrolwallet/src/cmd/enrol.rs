//! Enrolment payment command.

use crate::cmd::completions::ShellType;
use crate::state;
use anyhow::Result;
use clap::Parser;
use enrolwallet_core::{format_record, CategoryId, CourseId, UserId};
use enrolwallet_ops::EnrolmentFee;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

/// Pay a course enrolment fee from a wallet.
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

    /// Course being enrolled in
    #[arg(short = 'k', long, required_unless_present = "generate_completions")]
    pub course: Option<CourseId>,

    /// Enrolment fee before coupons
    #[arg(long, required_unless_present = "generate_completions")]
    pub cost: Option<Decimal>,

    /// Category of the course
    #[arg(short, long, default_value_t = CategoryId::SITE)]
    pub category: CategoryId,

    /// Percent or enrol coupon to apply
    #[arg(long, value_name = "CODE")]
    pub coupon: Option<String>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn run(args: &Args) -> Result<ExitCode> {
    let file = super::required(args.file.as_deref(), "FILE")?;
    let user = super::required(args.user, "--user")?;
    let fee = EnrolmentFee {
        course: super::required(args.course, "--course")?,
        category: args.category,
        cost: super::required(args.cost, "--cost")?,
    };
    let mut wallet = state::open(file)?;

    let receipt = match wallet.pay_enrolment(user, &fee, args.coupon.as_deref()) {
        Ok(receipt) => receipt,
        Err(e) => return super::refused(e),
    };

    state::commit(file, wallet)?;
    match &receipt.debit {
        Some(debit) => println!("{}", format_record(&debit.record)),
        None => println!("no charge for course {}", fee.course),
    }
    if let Some(code) = &receipt.coupon {
        println!("coupon {code} applied, charged {} of {}", receipt.charged, fee.cost);
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the enrol command.
pub fn main() -> ExitCode {
    main_with_name("ewallet-enrol")
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
