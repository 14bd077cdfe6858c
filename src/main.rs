mod cli;

use std::process::ExitCode;

/// Exit code for load, parse and configuration failures.
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
