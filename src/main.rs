use std::process::ExitCode;

use tracing::error;
use tyme::cli::run_cli;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error running cli {e:?}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
