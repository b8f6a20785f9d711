//! ratecard-quote - price a role at every location.

fn main() -> std::process::ExitCode {
    ratecard::cmd::quote::main()
}
