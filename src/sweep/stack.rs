// SPDX-License-Identifier: PMPL-1.0-or-later

//! Stack high-water mark sweep across JSON nesting depths

use super::{failure_summary, run_sweep, SweepCase, SweepResults};
use crate::runner::{InvocationFailure, ToolCommand, ToolOutput, ToolRunner};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Nesting depths, each backed by a `depth-<n>` cargo feature
pub const DEPTHS: &[u32] = &[7, 9, 31, 63, 127, 255, 511, 513, 1023, 1025];

/// A parser configuration under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    pub name: &'static str,
    pub example: &'static str,
    pub features: &'static [&'static str],
}

pub const CONFIGS: &[StackConfig] = &[
    StackConfig {
        name: "serde",
        example: "test_serde",
        features: &[],
    },
    StackConfig {
        name: "picojson-tiny",
        example: "test_picojson",
        features: &["pico-tiny"],
    },
    StackConfig {
        name: "picojson-small",
        example: "test_picojson",
        features: &["pico-small"],
    },
    StackConfig {
        name: "picojson-huge",
        example: "test_picojson",
        features: &["pico-huge"],
    },
];

const PARSE_FAILED_MARKER: &str = "JSON parsing failed!";
const COMPLETE_MARKER: &str = "=== TEST COMPLETE ===";

fn stack_usage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Max stack usage: (\d+) bytes").expect("valid stack regex"))
}

/// How one simulator run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOutcome {
    Measured(u64),
    NoStack,
    CleanFail,
    Overflow,
    OverflowUndecodable,
    BuildFailed(String),
}

impl StackOutcome {
    pub fn label(&self) -> String {
        match self {
            StackOutcome::Measured(bytes) => format!("{} bytes", bytes),
            StackOutcome::NoStack => "Success (No Stack)".to_string(),
            StackOutcome::CleanFail => "Clean Fail".to_string(),
            StackOutcome::Overflow => "Stack Overflow".to_string(),
            StackOutcome::OverflowUndecodable => {
                "Stack Overflow (undecodable output)".to_string()
            }
            StackOutcome::BuildFailed(detail) => format!("Build Failed: {}", detail),
        }
    }
}

/// Classify the combined output of one `cargo run` under the simulator
pub fn classify_output(combined: &[u8]) -> StackOutcome {
    let (text, decodable) = match std::str::from_utf8(combined) {
        Ok(text) => (text.to_string(), true),
        Err(_) => (String::from_utf8_lossy(combined).to_string(), false),
    };

    if text.contains(PARSE_FAILED_MARKER) {
        StackOutcome::CleanFail
    } else if text.contains(COMPLETE_MARKER) {
        stack_usage_re()
            .captures(&text)
            .and_then(|caps| caps[1].parse().ok())
            .map(StackOutcome::Measured)
            .unwrap_or(StackOutcome::NoStack)
    } else if decodable {
        StackOutcome::Overflow
    } else {
        StackOutcome::OverflowUndecodable
    }
}

pub fn classify(outcome: Result<ToolOutput, InvocationFailure>) -> StackOutcome {
    match outcome {
        Ok(output) => classify_output(&output.combined()),
        Err(failure) => StackOutcome::BuildFailed(failure_summary(&failure)),
    }
}

pub fn row_label(depth: u32) -> String {
    format!("{} levels", depth)
}

pub fn command_for(
    crate_dir: &Path,
    depth: u32,
    config: &StackConfig,
    timeout: Option<Duration>,
) -> ToolCommand {
    let mut command = ToolCommand::new("cargo").args([
        "run",
        "--release",
        "--no-default-features",
    ]);
    command = command.arg("--features").arg(format!("depth-{}", depth));
    for feature in config.features {
        command = command.arg("--features").arg(*feature);
    }
    command
        .arg("--example")
        .arg(config.example)
        .current_dir(crate_dir)
        .timeout(timeout)
}

/// Depth-major cartesian product of `depths` × `configs`
pub fn cases(
    crate_dir: &Path,
    depths: &[u32],
    configs: &[StackConfig],
    timeout: Option<Duration>,
) -> Vec<SweepCase> {
    depths
        .iter()
        .flat_map(|&depth| {
            configs.iter().map(move |config| SweepCase {
                row: row_label(depth),
                column: config.name.to_string(),
                command: command_for(crate_dir, depth, config, timeout),
            })
        })
        .collect()
}

pub fn run<R: ToolRunner>(
    runner: &R,
    crate_dir: &Path,
    depths: &[u32],
    configs: &[StackConfig],
    timeout: Option<Duration>,
) -> SweepResults {
    let cases = cases(crate_dir, depths, configs, timeout);
    run_sweep(runner, &cases, |outcome| classify(outcome).label())
}
