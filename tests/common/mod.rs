// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures: a scripted toolchain and a throwaway firmware crate

#![allow(dead_code)]

use fw_audit::config::AuditConfig;
use fw_audit::runner::{InvocationFailure, ToolCommand, ToolOutput, ToolRunner};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// Answers each command by the first scripted key found in its arguments
pub struct ScriptedRunner {
    script: Vec<(String, Result<ToolOutput, InvocationFailure>)>,
    pub calls: RefCell<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn stdout(mut self, key: &str, stdout: &str) -> Self {
        self.script.push((key.to_string(), Ok(success(stdout))));
        self
    }

    pub fn fail(mut self, key: &str, failure: InvocationFailure) -> Self {
        self.script.push((key.to_string(), Err(failure)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, InvocationFailure> {
        self.calls.borrow_mut().push(command.clone());
        self.script
            .iter()
            .find(|(key, _)| command.args.iter().any(|arg| arg.contains(key.as_str())))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| {
                Err(InvocationFailure::NotFound {
                    program: command.program.clone(),
                })
            })
    }
}

pub fn success(stdout: &str) -> ToolOutput {
    ToolOutput {
        success: true,
        status_code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// A crate directory with `examples/<name>.rs` for each name
pub fn firmware_crate(root: &Path, examples: &[&str]) -> AuditConfig {
    let examples_dir = root.join("examples");
    fs::create_dir_all(&examples_dir).unwrap();
    for name in examples {
        fs::write(
            examples_dir.join(format!("{}.rs", name)),
            "#![no_std]\n#![no_main]\n",
        )
        .unwrap();
    }
    AuditConfig {
        crate_dir: root.to_path_buf(),
        ..AuditConfig::default()
    }
}

/// Disassembly as `cargo objdump` prints it, with build noise in front
pub fn disassembly(target: &str, body: &str) -> String {
    format!(
        "   Compiling avr_demo v0.1.0\n    Finished `release` profile [optimized] target(s)\n\n{}:\tfile format elf32-avr\n\nDisassembly of section .text:\n\n{}",
        target, body
    )
}
