//! External identity-probe command with timeout handling.
//!
//! One call spawns one process. The process is always waited on, and a probe
//! that outlives its timeout is killed and reaped before returning.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use hauth_core::IdentityProbe;
use hauth_domain::{HauthError, IdentityConfig, Result};
use wait_timeout::ChildExt;

use crate::errors::map_io_error;

/// Runs the configured command and returns one line of its standard output
#[derive(Debug, Clone)]
pub struct CommandProber {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    pattern: Option<String>,
}

impl CommandProber {
    pub fn new(program: impl Into<String>, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            timeout,
            pattern: None,
        }
    }

    /// Build from `identity.probe_command`; the first element is the program.
    pub fn from_config(config: &IdentityConfig) -> Self {
        let (program, args) = match config.probe_command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            timeout: Duration::from_millis(config.probe_timeout_ms),
            pattern: None,
        }
    }

    /// Select the first output line containing `pattern` instead of the
    /// first line.
    pub fn with_match(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Run the command once.
    ///
    /// `Ok(None)` covers non-zero exit and empty or non-matching output.
    ///
    /// # Errors
    /// Returns `HauthError::Platform` if the command cannot be spawned or
    /// waited on, or exceeds its timeout.
    pub fn run(&self) -> Result<Option<String>> {
        if self.program.is_empty() {
            return Err(HauthError::Platform("no probe command configured".into()));
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| map_io_error("probe spawn", &e, HauthError::Platform))?;

        // Drain stdout while waiting so a chatty probe cannot fill the pipe
        // and stall before exiting.
        let reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut stdout = String::new();
                pipe.read_to_string(&mut stdout).map(|_| stdout)
            })
        });

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_ms = self.timeout.as_millis(),
                    "probe.timed_out"
                );
                // The reader is left detached: a grandchild may still hold the pipe.
                reap(&mut child);
                return Err(HauthError::Platform(format!(
                    "probe timed out after {}ms",
                    self.timeout.as_millis()
                )));
            }
            Err(e) => {
                reap(&mut child);
                return Err(map_io_error("probe wait", &e, HauthError::Platform));
            }
        };

        if !status.success() {
            tracing::debug!(program = %self.program, code = status.code(), "probe.nonzero_exit");
            return Ok(None);
        }

        let stdout = match reader {
            Some(handle) => handle
                .join()
                .map_err(|_| HauthError::Internal("probe output reader panicked".into()))?
                .map_err(|e| map_io_error("probe output", &e, HauthError::Platform))?,
            None => String::new(),
        };

        Ok(self.select_line(&stdout))
    }

    fn select_line(&self, stdout: &str) -> Option<String> {
        let line = match &self.pattern {
            Some(pattern) => stdout.lines().find(|line| line.contains(pattern.as_str())),
            None => stdout.lines().next(),
        }?;
        (!line.is_empty()).then(|| line.to_string())
    }
}

fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "probe.kill_failed");
    }
    if let Err(e) = child.wait() {
        tracing::debug!(error = %e, "probe.reap_failed");
    }
}

impl IdentityProbe for CommandProber {
    fn probe(&self) -> Option<String> {
        match self.run() {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, "probe.failed");
                None
            }
        }
    }
}
