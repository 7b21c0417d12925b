//! ewallet-credit - Credit a wallet, top it up, or redeem a coupon.

fn main() -> std::process::ExitCode {
    enrolwallet::cmd::credit::main()
}
