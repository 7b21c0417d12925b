//! ewallet-transfer - Move funds between wallets.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::transfer::main()
}
