//! Workspace automation for `hauth`.
//!
//! Run with: `cargo run -p xtask -- <task>`

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::{bail, Context};

/// A named sequence of cargo invocations
struct Task {
    name: &'static str,
    about: &'static str,
    steps: &'static [&'static [&'static str]],
}

const TASKS: &[Task] = &[
    Task {
        name: "ci",
        about: "fmt, clippy and the full test suite",
        steps: &[
            &["fmt", "--all", "--", "--check"],
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            &["test", "--workspace"],
        ],
    },
    Task { name: "fmt", about: "check formatting", steps: &[&["fmt", "--all", "--", "--check"]] },
    Task {
        name: "clippy",
        about: "lint with warnings denied",
        steps: &[&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]],
    },
    Task {
        name: "test-core",
        about: "domain and core tests only (no sockets, no subprocesses)",
        steps: &[&["test", "-p", "hauth-domain", "-p", "hauth-core"]],
    },
    Task {
        name: "test-adapters",
        about: "infra and app tests (wiremock, sysfs fixtures, sh probes)",
        steps: &[&["test", "-p", "hauth-infra", "-p", "hauth-app"]],
    },
    Task { name: "test", about: "all tests", steps: &[&["test", "--workspace"]] },
];

fn main() -> ExitCode {
    let name = env::args().nth(1);
    let task = match name.as_deref() {
        None | Some("help") => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Some(name) => TASKS.iter().find(|t| t.name == name),
    };
    let Some(task) = task else {
        eprintln!("unknown task: {}\n", name.unwrap_or_default());
        print_help();
        return ExitCode::FAILURE;
    };

    match run(task) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xtask {} failed: {e:#}", task.name);
            ExitCode::FAILURE
        }
    }
}

fn run(task: &Task) -> anyhow::Result<()> {
    for (index, args) in task.steps.iter().enumerate() {
        println!("==> [{}/{}] cargo {}", index + 1, task.steps.len(), args.join(" "));
        let status = Command::new("cargo")
            .args(*args)
            .status()
            .with_context(|| format!("spawning cargo {}", args.join(" ")))?;
        if !status.success() {
            bail!("cargo {} exited with {status}", args.join(" "));
        }
    }
    Ok(())
}

fn print_help() {
    println!("usage: cargo run -p xtask -- <task>\n");
    for task in TASKS {
        println!("    {:<14}{}", task.name, task.about);
    }
}
