use std::process::ExitCode;

use colored::Colorize;
use rmistub::cli;

/// Front-end failures whose diagnostics were already rendered.
const REPORTED: &[&str] = &["lexing failed", "parsing failed"];

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let msg = err.to_string();
            if !REPORTED.iter().any(|reported| msg.contains(reported)) {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}
