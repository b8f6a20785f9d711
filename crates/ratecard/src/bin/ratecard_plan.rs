//! ratecard-plan - run a staffing plan and print its summary.

fn main() -> std::process::ExitCode {
    ratecard::cmd::plan::main()
}
