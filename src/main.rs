use std::process::ExitCode;

fn main() -> ExitCode {
    synaptiq_lib::run()
}
