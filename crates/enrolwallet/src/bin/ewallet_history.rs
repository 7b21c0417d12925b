//! ewallet-history - Print a user's transaction log.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::history::main()
}
