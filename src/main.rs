//! Binary entrypoint for the `bundiff` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match bundiff::run(std::env::args()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
