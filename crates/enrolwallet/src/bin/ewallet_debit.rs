//! ewallet-debit - Debit a wallet.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::debit::main()
}
