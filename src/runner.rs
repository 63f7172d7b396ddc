// SPDX-License-Identifier: PMPL-1.0-or-later

//! External tool invocation with an optional wall-clock deadline
//!
//! Every analysis shells out (cargo, objdump, cargo-bloat). `ToolRunner` is the
//! seam: the real implementation spawns processes, tests substitute canned
//! output.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A program plus arguments, resolved but not yet run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured output of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub status_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Both streams concatenated, the way `2>&1` would show them
    pub fn combined(&self) -> Vec<u8> {
        let mut bytes = self.stdout.clone();
        bytes.extend_from_slice(&self.stderr);
        bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationFailure {
    NotFound { program: String },
    Spawn { program: String, message: String },
    NonZeroExit { code: Option<i32>, output: String },
    TimedOut { limit: Duration },
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationFailure::NotFound { program } => {
                write!(f, "{} not found. Please ensure it's installed and in PATH.", program)
            }
            InvocationFailure::Spawn { program, message } => {
                write!(f, "failed to run {}: {}", program, message)
            }
            InvocationFailure::NonZeroExit { code, output } => {
                match code {
                    Some(code) => write!(f, "exit status {}", code)?,
                    None => write!(f, "terminated by signal")?,
                }
                let output = output.trim();
                if !output.is_empty() {
                    write!(f, ": {}", output)?;
                }
                Ok(())
            }
            InvocationFailure::TimedOut { limit } => {
                if limit.subsec_nanos() == 0 {
                    write!(f, "timed out after {}s", limit.as_secs())
                } else {
                    write!(f, "timed out after {:.3}s", limit.as_secs_f64())
                }
            }
        }
    }
}

impl std::error::Error for InvocationFailure {}

pub trait ToolRunner {
    /// Run to completion (or deadline). Any exit status is returned as output.
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, InvocationFailure>;

    /// Like `run`, but a non-zero exit is a failure carrying the combined output
    fn run_checked(&self, command: &ToolCommand) -> Result<ToolOutput, InvocationFailure> {
        let output = self.run(command)?;
        if output.success {
            Ok(output)
        } else {
            Err(InvocationFailure::NonZeroExit {
                code: output.status_code,
                output: String::from_utf8_lossy(&output.combined()).to_string(),
            })
        }
    }
}

/// Spawns real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, InvocationFailure> {
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }
        // Own process group, so a deadline can take down rustc/objdump/simavr too
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }

        let mut child = process
            .spawn()
            .map_err(|err| spawn_failure(&command.program, err))?;

        // Drain both pipes while polling so a chatty child never blocks on a full pipe
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(err) => {
                    kill_tree(&mut child);
                    return Err(spawn_failure(&command.program, err));
                }
            }
            if let Some(limit) = command.timeout {
                if started.elapsed() >= limit {
                    kill_tree(&mut child);
                    // Leave the readers detached in case anything survived holding the pipes
                    return Err(InvocationFailure::TimedOut { limit });
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(ToolOutput {
            success: status.success(),
            status_code: status.code(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

/// Kill the child and, on unix, every process in its group
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let _ = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_failure(program: &str, err: io::Error) -> InvocationFailure {
    if err.kind() == io::ErrorKind::NotFound {
        InvocationFailure::NotFound {
            program: program.to_string(),
        }
    } else {
        InvocationFailure::Spawn {
            program: program.to_string(),
            message: err.to_string(),
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_not_found() {
        let command = ToolCommand::new("fw-audit-definitely-not-installed");
        let err = SystemRunner.run(&command).unwrap_err();
        assert!(matches!(err, InvocationFailure::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout_and_status() {
        let command = ToolCommand::new("sh").args(["-c", "echo hello; echo oops >&2; exit 3"]);
        let output = SystemRunner.run(&command).unwrap();
        assert!(!output.success);
        assert_eq!(output.status_code, Some(3));
        assert_eq!(output.stdout_lossy().trim(), "hello");
        assert_eq!(output.stderr_lossy().trim(), "oops");

        let err = SystemRunner.run_checked(&command).unwrap_err();
        assert!(matches!(err, InvocationFailure::NonZeroExit { code: Some(3), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_deadline_kills_child() {
        let command = ToolCommand::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let err = SystemRunner.run(&command).unwrap_err();
        assert!(matches!(err, InvocationFailure::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_deadline_kills_background_children() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("late");
        let script = format!("(sleep 1; touch '{}') & wait", marker.display());
        let command = ToolCommand::new("sh")
            .args(["-c", script.as_str()])
            .timeout(Some(Duration::from_millis(300)));

        let err = SystemRunner.run(&command).unwrap_err();
        assert_eq!(err.to_string(), "timed out after 0.300s");

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists(), "background child outlived the deadline");
    }

    #[test]
    fn test_timeout_message_precision() {
        let whole = InvocationFailure::TimedOut {
            limit: Duration::from_secs(300),
        };
        assert_eq!(whole.to_string(), "timed out after 300s");
        let fractional = InvocationFailure::TimedOut {
            limit: Duration::from_millis(1500),
        };
        assert_eq!(fractional.to_string(), "timed out after 1.500s");
    }

    #[test]
    fn test_display_renders_command_line() {
        let command = ToolCommand::new("cargo").args(["objdump", "--example", "blinky"]);
        assert_eq!(command.display(), "cargo objdump --example blinky");
    }
}
