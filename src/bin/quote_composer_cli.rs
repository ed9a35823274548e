use std::process::ExitCode;

use quote_composer::cli::{output, run_cli};

fn main() -> ExitCode {
    quote_composer::init();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            ExitCode::FAILURE
        }
    }
}
