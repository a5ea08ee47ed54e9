//! Hauth - device credential client
//!
//! Command-line entry point over the application context.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use hauth_domain::HauthError;
use hauth_lib::utils::logging::{error_label, init_tracing};
use hauth_lib::{parse_args, run_command, AppContext, Command};

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let json_logs = std::env::var("HAUTH_LOG_FORMAT").is_ok_and(|format| format == "json");
    if let Err(e) = init_tracing(json_logs) {
        eprintln!("{e}");
    }

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "env.loaded"),
        Err(e) => tracing::trace!(error = %e, "env.not_loaded"),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let label = e.downcast_ref::<HauthError>().map_or("internal", error_label);
            tracing::error!(error = %e, label, "command.failed");
            eprintln!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<String> {
    let config = hauth_infra::config::load()?;
    let context = AppContext::new(config);
    run_command(&context, command)
}
