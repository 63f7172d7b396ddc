// SPDX-License-Identifier: PMPL-1.0-or-later

//! Single-pass panic scanner over filtered disassembly

use crate::catalog::{PatternCatalog, Suppressor};
use crate::scan::scope::ScopeState;
use crate::types::{Finding, ScanOutput, SuppressedLine};
use anyhow::Result;

/// What a single line contributed to the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Clean,
    Finding(Finding),
    Suppressed(SuppressedLine),
}

pub struct PanicScanner {
    catalog: PatternCatalog,
    suppressor: Suppressor,
}

impl PanicScanner {
    pub fn new(catalog: PatternCatalog, suppressor: Suppressor) -> Self {
        Self {
            catalog,
            suppressor,
        }
    }

    /// Built-in catalog and built-in exclusions
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(PatternCatalog::new()?, Suppressor::new(&[])?))
    }

    /// Process one line given the scope left by the previous one
    pub fn step(
        &self,
        scope: ScopeState,
        line_number: usize,
        line: &str,
    ) -> (ScopeState, LineOutcome) {
        if let Some(rule) = self.suppressor.matching_rule(line) {
            let skipped = SuppressedLine {
                line_number,
                rule_id: rule.id.clone(),
                raw_line_text: line.trim().to_string(),
            };
            return (scope, LineOutcome::Suppressed(skipped));
        }

        // Header detection sees the same unmodified line as the matchers
        let (scope, is_header) = scope.advance(line);

        let outcome = match self.catalog.first_match(line) {
            Some(pattern) => LineOutcome::Finding(Finding {
                line_number,
                raw_line_text: line.trim().to_string(),
                matched_pattern: pattern.source.to_string(),
                pattern_id: pattern.id,
                context_function: if is_header {
                    None
                } else {
                    scope.current().map(str::to_string)
                },
            }),
            None => LineOutcome::Clean,
        };

        (scope, outcome)
    }

    /// Scan the whole text, folding scope state through every line
    pub fn scan(&self, text: &str) -> ScanOutput {
        let (_, output) = text.lines().enumerate().fold(
            (ScopeState::new(), ScanOutput::default()),
            |(scope, mut output), (index, line)| {
                let (scope, outcome) = self.step(scope, index + 1, line);
                match outcome {
                    LineOutcome::Finding(finding) => output.findings.push(finding),
                    LineOutcome::Suppressed(skipped) => output.suppressed.push(skipped),
                    LineOutcome::Clean => {}
                }
                (scope, output)
            },
        );
        output
    }
}
