// SPDX-License-Identifier: PMPL-1.0-or-later

//! Panic-reference analysis for firmware examples

use crate::catalog::{PatternCatalog, Suppressor};
use crate::config::{AuditConfig, BUILD_FLAGS_PLACEHOLDER};
use crate::diagnostics::{self, Diagnostic, Level};
use crate::runner::{InvocationFailure, ToolCommand, ToolRunner};
use crate::scan::{filter_disassembly, PanicScanner};
use crate::types::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct Analyzer<'a, R: ToolRunner> {
    config: &'a AuditConfig,
    runner: &'a R,
    scanner: PanicScanner,
    verbose: bool,
}

impl<'a, R: ToolRunner> Analyzer<'a, R> {
    pub fn new(config: &'a AuditConfig, runner: &'a R) -> Result<Self> {
        Self::build(config, runner, false)
    }

    pub fn new_verbose(config: &'a AuditConfig, runner: &'a R) -> Result<Self> {
        Self::build(config, runner, true)
    }

    fn build(config: &'a AuditConfig, runner: &'a R, verbose: bool) -> Result<Self> {
        let scanner = PanicScanner::new(
            PatternCatalog::new()?,
            Suppressor::new(&config.exclusions).context("loading exclusion rules")?,
        );
        Ok(Self {
            config,
            runner,
            scanner,
            verbose,
        })
    }

    /// Expand the configured disassembler template for one target
    pub fn disassembler_command(&self, target: &str, options: &BuildOptions) -> ToolCommand {
        let disassembler = &self.config.disassembler;
        let mut args = Vec::with_capacity(disassembler.args.len() + 3);
        for arg in &disassembler.args {
            if arg == BUILD_FLAGS_PLACEHOLDER {
                args.extend(options.cargo_flags());
            } else {
                args.push(
                    arg.replace("{target}", target)
                        .replace("{profile}", &self.config.profile),
                );
            }
        }

        ToolCommand::new(&disassembler.program)
            .args(args)
            .current_dir(&self.config.crate_dir)
            .timeout(Some(self.config.timeout()))
    }

    /// Disassemble and scan one target
    pub fn analyze(
        &self,
        target: &str,
        options: &BuildOptions,
    ) -> Result<AnalysisResult, InvocationFailure> {
        let command = self.disassembler_command(target, options);
        if self.verbose {
            diagnostics::note(format!("running {}", command.display()));
        }

        let output = self.runner.run_checked(&command)?;
        let (result, notes) = self.analyze_text(target, &output.stdout_lossy());
        for note in &notes {
            note.print();
        }
        Ok(result)
    }

    /// Filter, scan and persist already-captured disassembly.
    ///
    /// Operator messages are returned rather than printed so callers decide
    /// where they go.
    pub fn analyze_text(&self, target: &str, raw: &str) -> (AnalysisResult, Vec<Diagnostic>) {
        let mut notes = Vec::new();
        let filtered = filter_disassembly(raw);
        if !filtered.marker_found {
            notes.push(Diagnostic::new(
                Level::Warn,
                format!(
                    "{}: no ELF 'file format' line in disassembly, scanning the full output",
                    target
                ),
            ));
        }

        let output = self.scanner.scan(filtered.text);
        if self.verbose {
            notes.extend(output.suppressed.iter().map(|skipped| {
                Diagnostic::new(
                    Level::Note,
                    format!(
                        "{}:{}: skipped false positive ({}): {}",
                        target, skipped.line_number, skipped.rule_id, skipped.raw_line_text
                    ),
                )
            }));
        }

        let asm_path = self.config.artifact_path(target);
        if let Err(err) = persist_artifact(&asm_path, filtered.text) {
            notes.push(Diagnostic::new(Level::Warn, format!("{}: {:#}", target, err)));
        } else if self.verbose {
            notes.push(Diagnostic::new(
                Level::Note,
                format!("saved assembly to {}", asm_path.display()),
            ));
        }

        let result = AnalysisResult::new(target, asm_path, output.findings, filtered.marker_found);
        (result, notes)
    }

    /// Suite entry for one target: missing sources and tool failures become outcomes
    pub fn outcome_for(&self, target: &str, options: &BuildOptions) -> TargetOutcome {
        if !self.config.target_source(target).is_file() {
            return TargetOutcome::NotFound;
        }

        match self.analyze(target, options) {
            Ok(result) => TargetOutcome::Analyzed(result),
            Err(err) => {
                diagnostics::error(format!("{}: failed to analyze: {}", target, err));
                TargetOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Analyze targets strictly one after another
    pub fn run_suite(&self, targets: &[String], options: &BuildOptions) -> SuiteResult {
        let mut suite = SuiteResult::new();
        for target in targets {
            println!("Checking {}...", target);
            let outcome = self.outcome_for(target, options);
            suite.push(target.clone(), outcome);
        }
        suite
    }
}

/// Write the filtered assembly next to the build artifacts
pub fn persist_artifact(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
