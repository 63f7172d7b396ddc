// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report formatting and output
//!
//! Finding lines follow the `path:line: text` shape that editors and CI
//! annotators jump to, so they are rendered plain (no colour) and on stdout.

use crate::types::*;
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    /// `"{asm_file_path}:{line_number}: {trimmed_line_text}{context_suffix}"`
    pub fn finding_line(&self, asm_path: &Path, finding: &Finding) -> String {
        let suffix = finding
            .context_function
            .as_ref()
            .map(|name| format!(" [from {}]", name))
            .unwrap_or_default();
        format!(
            "{}:{}: {}{}",
            asm_path.display(),
            finding.line_number,
            finding.raw_line_text,
            suffix
        )
    }

    pub fn single_summary(&self, result: &AnalysisResult) -> String {
        if result.passed {
            format!("PASS {}: no panic references found", result.target_name)
        } else {
            format!(
                "FAIL {}: found {} panic reference(s)",
                result.target_name,
                result.findings.len()
            )
        }
    }

    pub fn render_single(&self, result: &AnalysisResult) -> Vec<String> {
        let mut lines = vec![self.single_summary(result)];
        lines.extend(
            result
                .findings
                .iter()
                .map(|finding| self.finding_line(&result.asm_path, finding)),
        );
        lines
    }

    /// Print a single-target report; returns whether the target passed
    pub fn print_single(&self, result: &AnalysisResult) -> bool {
        let summary = self.single_summary(result);
        if result.passed {
            println!("{}", summary.green().bold());
        } else {
            println!("{}", summary.red().bold());
            for finding in &result.findings {
                println!("{}", self.finding_line(&result.asm_path, finding));
            }
        }
        result.passed
    }

    pub fn aggregate_line(&self, suite: &SuiteResult) -> String {
        format!(
            "{}/{} have panic references",
            suite.failure_count(),
            suite.found_count()
        )
    }

    pub fn render_suite(&self, suite: &SuiteResult) -> Vec<String> {
        let width = suite
            .entries
            .iter()
            .map(|e| e.target_name.len())
            .max()
            .unwrap_or(0)
            .max("Target".len());

        let mut lines = Vec::with_capacity(suite.entries.len() + 3);
        lines.push(format!("{:<width$}  {}", "Target", "Result", width = width));
        lines.push(format!("{}  {}", "-".repeat(width), "-".repeat(6)));
        for entry in &suite.entries {
            lines.push(format!(
                "{:<width$}  {}",
                entry.target_name,
                entry.outcome.verdict(),
                width = width
            ));
        }
        lines.push(self.aggregate_line(suite));
        lines
    }

    /// Print the suite matrix; returns whether every found target passed
    pub fn print_suite(&self, suite: &SuiteResult) -> bool {
        println!("\n{}", "=== PANIC REFERENCE SUMMARY ===".bold().cyan());
        let lines = self.render_suite(suite);
        let (table, aggregate) = lines.split_at(lines.len() - 1);
        for line in table {
            println!("{}", line);
        }

        let aggregate = &aggregate[0];
        if suite.passed() {
            println!("{}", aggregate.green().bold());
        } else {
            println!("{}", aggregate.red().bold());
        }
        suite.passed()
    }

    pub fn save<T: Serialize, P: AsRef<Path>>(&self, report: &T, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path.as_ref(), json)?;
        println!("Report saved to: {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn finding(line: usize, text: &str, context: Option<&str>) -> Finding {
        Finding {
            line_number: line,
            raw_line_text: text.to_string(),
            matched_pattern: "unwrap_failed".to_string(),
            pattern_id: PatternId::UnwrapFailed,
            context_function: context.map(str::to_string),
        }
    }

    #[test]
    fn test_finding_line_with_context() {
        let formatter = ReportFormatter::new();
        let line = formatter.finding_line(
            Path::new("target/avr/release/examples/t.asm"),
            &finding(42, "call <unwrap_failed>", Some("foo::bar")),
        );
        assert_eq!(
            line,
            "target/avr/release/examples/t.asm:42: call <unwrap_failed> [from foo::bar]"
        );
    }

    #[test]
    fn test_finding_line_without_context() {
        let formatter = ReportFormatter::new();
        let line = formatter.finding_line(
            Path::new("t.asm"),
            &finding(1, "<core::panicking::panic_fmt>:", None),
        );
        assert_eq!(line, "t.asm:1: <core::panicking::panic_fmt>:");
    }

    #[test]
    fn test_render_single_pass_has_no_finding_lines() {
        let formatter = ReportFormatter::new();
        let result = AnalysisResult::new("blinky", PathBuf::from("b.asm"), vec![], true);
        let lines = formatter.render_single(&result);
        assert_eq!(lines, vec!["PASS blinky: no panic references found"]);
    }

    #[test]
    fn test_render_suite_rows_in_input_order() {
        let formatter = ReportFormatter::new();
        let mut suite = SuiteResult::new();
        suite.push(
            "test_serde",
            TargetOutcome::Analyzed(AnalysisResult::new(
                "test_serde",
                PathBuf::from("s.asm"),
                vec![finding(3, "x", None)],
                true,
            )),
        );
        suite.push("ghost", TargetOutcome::NotFound);
        suite.push(
            "minimal",
            TargetOutcome::Analyzed(AnalysisResult::new("minimal", PathBuf::from("m.asm"), vec![], true)),
        );

        let lines = formatter.render_suite(&suite);
        assert!(lines[2].starts_with("test_serde") && lines[2].ends_with("fail"));
        assert!(lines[3].starts_with("ghost") && lines[3].ends_with("not found"));
        assert!(lines[4].starts_with("minimal") && lines[4].ends_with("pass"));
        assert_eq!(lines.last().unwrap(), "1/2 have panic references");
    }
}
