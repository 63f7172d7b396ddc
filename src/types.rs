// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for fw-audit
//!
//! Everything here lives for a single invocation: findings are produced by the
//! scanner, wrapped into per-target results by the driver and thrown away once
//! the report has been printed (or saved as JSON).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable identifier for each entry of the panic pattern catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternId {
    PanickingModule,
    PanicFmt,
    PanicImpl,
    BeginUnwind,
    BoundsCheck,
    SliceIndexFail,
    StrSliceFail,
    StrIndexFail,
    UnwrapFailed,
    ExpectFailed,
    AssertFailed,
    PanicConst,
    EncodePanic,
    GenericPanic,
}

impl PatternId {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternId::PanickingModule => "panicking-module",
            PatternId::PanicFmt => "panic-fmt",
            PatternId::PanicImpl => "panic-impl",
            PatternId::BeginUnwind => "begin-unwind",
            PatternId::BoundsCheck => "bounds-check",
            PatternId::SliceIndexFail => "slice-index-fail",
            PatternId::StrSliceFail => "str-slice-fail",
            PatternId::StrIndexFail => "str-index-fail",
            PatternId::UnwrapFailed => "unwrap-failed",
            PatternId::ExpectFailed => "expect-failed",
            PatternId::AssertFailed => "assert-failed",
            PatternId::PanicConst => "panic-const",
            PatternId::EncodePanic => "encode-panic",
            PatternId::GenericPanic => "generic-panic",
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single panic reference located in the filtered disassembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based line number within the filtered (and persisted) assembly
    pub line_number: usize,
    /// The line, trimmed of surrounding whitespace
    pub raw_line_text: String,
    /// Source of the catalog pattern that matched
    pub matched_pattern: String,
    pub pattern_id: PatternId,
    /// Enclosing function, absent when the line is the function's own header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_function: Option<String>,
}

/// A line skipped by an exclusion rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedLine {
    pub line_number: usize,
    pub rule_id: String,
    pub raw_line_text: String,
}

/// Outcome of scanning one filtered disassembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutput {
    pub findings: Vec<Finding>,
    pub suppressed: Vec<SuppressedLine>,
}

/// Result of analyzing a single target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub target_name: String,
    pub asm_path: PathBuf,
    pub findings: Vec<Finding>,
    pub passed: bool,
    /// False when the disassembly carried no ELF "file format" marker
    pub marker_found: bool,
}

impl AnalysisResult {
    pub fn new(
        target_name: impl Into<String>,
        asm_path: PathBuf,
        findings: Vec<Finding>,
        marker_found: bool,
    ) -> Self {
        let passed = findings.is_empty();
        Self {
            target_name: target_name.into(),
            asm_path,
            findings,
            passed,
            marker_found,
        }
    }
}

/// Per-target status inside a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum TargetOutcome {
    Analyzed(AnalysisResult),
    /// The target's source file does not exist
    NotFound,
    /// The external toolchain could not produce disassembly
    Failed { reason: String },
}

impl TargetOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            TargetOutcome::Analyzed(result) if result.passed => Verdict::Pass,
            TargetOutcome::Analyzed(_) => Verdict::Fail,
            TargetOutcome::NotFound => Verdict::NotFound,
            TargetOutcome::Failed { .. } => Verdict::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Pass,
    Fail,
    NotFound,
    Error,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::NotFound => "not found",
            Verdict::Error => "failed to analyze",
        }
    }

    /// Counts towards the "found" denominator of the suite aggregate
    pub fn is_found(self) -> bool {
        !matches!(self, Verdict::NotFound)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Verdict::Fail | Verdict::Error)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Results across many targets, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub created_at: String,
    pub entries: Vec<SuiteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteEntry {
    pub target_name: String,
    pub outcome: TargetOutcome,
}

impl SuiteResult {
    pub fn new() -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, target_name: impl Into<String>, outcome: TargetOutcome) {
        self.entries.push(SuiteEntry {
            target_name: target_name.into(),
            outcome,
        });
    }

    pub fn found_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.verdict().is_found())
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.verdict().is_failure())
            .count()
    }

    pub fn passed(&self) -> bool {
        self.failure_count() == 0
    }
}

impl Default for SuiteResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Build options forwarded to the toolchain for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub no_default_features: bool,
    pub features: Vec<String>,
}

impl BuildOptions {
    /// Parse a comma-separated feature list, dropping empty entries
    pub fn with_feature_list(no_default_features: bool, list: Option<&str>) -> Self {
        let features = list
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            no_default_features,
            features,
        }
    }

    /// Cargo flags selecting this configuration
    pub fn cargo_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.no_default_features {
            flags.push("--no-default-features".to_string());
        }
        if !self.features.is_empty() {
            flags.push("--features".to_string());
            flags.push(self.features.join(","));
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_list_parsing() {
        let opts = BuildOptions::with_feature_list(true, Some("pico-tiny, depth-7,,"));
        assert!(opts.no_default_features);
        assert_eq!(opts.features, vec!["pico-tiny", "depth-7"]);

        let empty = BuildOptions::with_feature_list(false, None);
        assert!(empty.features.is_empty());
        assert!(empty.cargo_flags().is_empty());
    }

    #[test]
    fn test_cargo_flags() {
        let opts = BuildOptions::with_feature_list(true, Some("pico-tiny,depth-7"));
        assert_eq!(
            opts.cargo_flags(),
            vec!["--no-default-features", "--features", "pico-tiny,depth-7"]
        );
    }

    #[test]
    fn test_suite_counts_ignore_not_found() {
        let mut suite = SuiteResult::new();
        suite.push(
            "clean",
            TargetOutcome::Analyzed(AnalysisResult::new("clean", PathBuf::new(), vec![], true)),
        );
        suite.push("missing", TargetOutcome::NotFound);

        assert_eq!(suite.found_count(), 1);
        assert_eq!(suite.failure_count(), 0);
        assert!(suite.passed());
    }

    #[test]
    fn test_failed_analysis_counts_as_failure() {
        let mut suite = SuiteResult::new();
        suite.push(
            "broken",
            TargetOutcome::Failed {
                reason: "timed out".to_string(),
            },
        );
        assert_eq!(suite.found_count(), 1);
        assert_eq!(suite.failure_count(), 1);
        assert!(!suite.passed());
    }
}
