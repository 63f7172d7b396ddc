// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report rendering module

pub mod formatter;
pub mod table;

use crate::types::*;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

pub use formatter::ReportFormatter;
pub use table::MarkdownTable;

/// Print a single-target report; returns whether it passed
pub fn print_single(result: &AnalysisResult) -> bool {
    ReportFormatter::new().print_single(result)
}

/// Print the suite matrix; returns whether the suite passed
pub fn print_suite(suite: &SuiteResult) -> bool {
    ReportFormatter::new().print_suite(suite)
}

/// Save any report as pretty JSON
pub fn save_report<T: Serialize, P: AsRef<Path>>(report: &T, path: P) -> Result<()> {
    ReportFormatter::new().save(report, path)
}
