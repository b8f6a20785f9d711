//! ratecard-roles - list the rate card roles and their hourly costs.

fn main() -> std::process::ExitCode {
    ratecard::cmd::roles::main()
}
