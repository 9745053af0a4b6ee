mod cli;
mod config;
mod models;
mod services;
mod utils;

use crate::utils::output;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
