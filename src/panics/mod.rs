// SPDX-License-Identifier: PMPL-1.0-or-later

//! Panic-reference analysis module
//!
//! Disassembles firmware examples and reports every line that references a
//! panic entry point, so CI can prove an example is panic-free.

pub mod analyzer;

use crate::config::AuditConfig;
use crate::runner::ToolRunner;
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use walkdir::WalkDir;

pub use analyzer::{persist_artifact, Analyzer};

/// Analyze a single example
pub fn analyze<R: ToolRunner>(
    config: &AuditConfig,
    runner: &R,
    target: &str,
    options: &BuildOptions,
    verbose: bool,
) -> Result<TargetOutcome> {
    let analyzer = if verbose {
        Analyzer::new_verbose(config, runner)?
    } else {
        Analyzer::new(config, runner)?
    };
    Ok(analyzer.outcome_for(target, options))
}

/// Analyze every target in order
pub fn run_suite<R: ToolRunner>(
    config: &AuditConfig,
    runner: &R,
    targets: &[String],
    options: &BuildOptions,
    verbose: bool,
) -> Result<SuiteResult> {
    let analyzer = if verbose {
        Analyzer::new_verbose(config, runner)?
    } else {
        Analyzer::new(config, runner)?
    };
    Ok(analyzer.run_suite(targets, options))
}

/// Example names (file stems of `*.rs`) directly inside `examples_dir`, sorted
pub fn discover_targets(examples_dir: &Path) -> Result<Vec<String>> {
    if !examples_dir.is_dir() {
        anyhow::bail!("Not a directory: {}", examples_dir.display());
    }

    let mut targets: Vec<String> = WalkDir::new(examples_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("rs"))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
        })
        .collect();

    targets.sort();
    Ok(targets)
}
