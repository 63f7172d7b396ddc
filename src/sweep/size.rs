// SPDX-License-Identifier: PMPL-1.0-or-later

//! Binary size sweep via `cargo bloat`

use super::{failure_summary, run_sweep, SweepCase, SweepResults};
use crate::runner::{InvocationFailure, ToolCommand, ToolOutput, ToolRunner};
use std::path::Path;
use std::time::Duration;

pub const SIZE_COLUMN: &str = "Binary Size";
const TEXT_SECTION_FIELD: &str = "text-section-size";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConfig {
    pub name: &'static str,
    pub example: &'static str,
    pub features: &'static [&'static str],
}

pub const CONFIGS: &[SizeConfig] = &[
    SizeConfig {
        name: "serde",
        example: "test_serde",
        features: &[],
    },
    SizeConfig {
        name: "picojson",
        example: "test_picojson",
        features: &[],
    },
];

/// Pull `text-section-size` out of cargo-bloat's JSON and render it in KB
pub fn parse_bloat_output(stdout: &str) -> Result<String, String> {
    let last = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| "Invalid JSON".to_string())?;

    let data: serde_json::Value =
        serde_json::from_str(last).map_err(|_| "Invalid JSON".to_string())?;
    let bytes = data
        .get(TEXT_SECTION_FIELD)
        .and_then(|value| value.as_u64())
        .ok_or_else(|| format!("missing {}", TEXT_SECTION_FIELD))?;

    Ok(format!("{:.1} KB", bytes as f64 / 1024.0))
}

pub fn classify(outcome: Result<ToolOutput, InvocationFailure>) -> String {
    let parsed = match outcome {
        Ok(output) => parse_bloat_output(&output.stdout_lossy()),
        Err(failure) => Err(failure_summary(&failure)),
    };
    parsed.unwrap_or_else(|detail| format!("Bloat Failed: {}", detail))
}

pub fn command_for(crate_dir: &Path, config: &SizeConfig, timeout: Option<Duration>) -> ToolCommand {
    let mut command = ToolCommand::new("cargo").args(["bloat", "--release"]);
    for feature in config.features {
        command = command.arg("--features").arg(*feature);
    }
    command
        .args(["--example", config.example, "--message-format=json"])
        .current_dir(crate_dir)
        .timeout(timeout)
}

pub fn cases(crate_dir: &Path, configs: &[SizeConfig], timeout: Option<Duration>) -> Vec<SweepCase> {
    configs
        .iter()
        .map(|config| SweepCase {
            row: config.name.to_string(),
            column: SIZE_COLUMN.to_string(),
            command: command_for(crate_dir, config, timeout),
        })
        .collect()
}

pub fn run<R: ToolRunner>(
    runner: &R,
    crate_dir: &Path,
    configs: &[SizeConfig],
    timeout: Option<Duration>,
) -> SweepResults {
    let cases = cases(crate_dir, configs, timeout);
    run_sweep(runner, &cases, classify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_last_json_line() {
        let stdout = "   Compiling avr_demo\n{\"file-size\": 90000, \"text-section-size\": 12698}\n";
        assert_eq!(parse_bloat_output(stdout), Ok("12.4 KB".to_string()));
    }

    #[test]
    fn test_invalid_json() {
        assert_eq!(
            parse_bloat_output("not json at all"),
            Err("Invalid JSON".to_string())
        );
        assert_eq!(parse_bloat_output(""), Err("Invalid JSON".to_string()));
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            parse_bloat_output(r#"{"file-size": 1}"#),
            Err("missing text-section-size".to_string())
        );
    }

    #[test]
    fn test_classify_labels_failures() {
        let failed = classify(Err(InvocationFailure::NotFound {
            program: "cargo".to_string(),
        }));
        assert!(failed.starts_with("Bloat Failed: cargo not found"));
    }

    #[test]
    fn test_command_shape() {
        let command = command_for(Path::new("."), &CONFIGS[0], None);
        assert_eq!(
            command.display(),
            "cargo bloat --release --example test_serde --message-format=json"
        );
    }
}
