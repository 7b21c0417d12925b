//! ewallet-enrol - Pay an enrolment fee from a wallet.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::enrol::main()
}
