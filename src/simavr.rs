// SPDX-License-Identifier: PMPL-1.0-or-later

//! Cargo runner shim that launches firmware under simavr
//!
//! Cargo appends the built binary to whatever runner arguments are
//! configured, so options and the binary arrive mixed together. Only
//! `-t/--timeout` is ours; everything else passes through to simavr.

use crate::diagnostics;
use anyhow::{bail, Result};
use std::io;
use std::path::Path;
use std::process::Command;

const BINARY_EXTENSIONS: &[&str] = &[".elf", ".bin", ".hex"];
pub const USAGE: &str = "Usage: fw-audit simavr [-t timeout] [simavr_args...] <binary.elf>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimavrInvocation {
    pub binary: String,
    pub simavr_args: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl SimavrInvocation {
    /// Split raw arguments into the timeout, simavr passthrough and the binary
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut timeout_secs = None;
        let mut simavr_args = Vec::new();
        let mut binary = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "-t" || arg == "--timeout" {
                let Some(value) = iter.next() else {
                    bail!("-t/--timeout requires a value");
                };
                match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => timeout_secs = Some(secs),
                    _ => bail!("timeout value must be a positive integer"),
                }
            } else if BINARY_EXTENSIONS.iter().any(|ext| arg.ends_with(ext)) {
                binary = Some(arg.clone());
            } else {
                simavr_args.push(arg.clone());
            }
        }

        // Without a recognised extension the last argument is the binary
        if binary.is_none() {
            binary = simavr_args.pop();
        }
        let Some(binary) = binary else {
            bail!("No binary file specified\n{}", USAGE);
        };

        Ok(Self {
            binary,
            simavr_args,
            timeout_secs,
        })
    }

    /// Program and arguments, wrapped in `timeout(1)` when a limit is set
    pub fn command_line(&self) -> (String, Vec<String>) {
        let mut simavr = vec!["simavr".to_string()];
        simavr.extend(self.simavr_args.iter().cloned());
        simavr.push(self.binary.clone());

        match self.timeout_secs {
            Some(secs) => {
                let mut args = vec![secs.to_string()];
                args.extend(simavr);
                ("timeout".to_string(), args)
            }
            None => {
                let program = simavr.remove(0);
                (program, simavr)
            }
        }
    }
}

/// Run simavr with inherited stdio; returns the process exit code
pub fn run(invocation: &SimavrInvocation) -> i32 {
    if !Path::new(&invocation.binary).exists() {
        diagnostics::error(format!("Binary file '{}' not found.", invocation.binary));
        return 1;
    }

    let (program, args) = invocation.command_line();
    match Command::new(&program).args(&args).status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            diagnostics::error(format!(
                "{} not found. Please ensure it's installed and in PATH.",
                program
            ));
            1
        }
        Err(err) => {
            diagnostics::error(format!("failed to run {}: {}", program, err));
            1
        }
    }
}
