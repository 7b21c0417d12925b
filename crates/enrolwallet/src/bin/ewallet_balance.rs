//! ewallet-balance - Show a user's balance as seen from a category.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::balance::main()
}
