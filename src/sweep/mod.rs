// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sweep: run one external command per (row, column) combination
//!
//! Stack and size analyses share the same shape: build a command for each
//! configuration, run them sequentially, reduce each run to one text cell and
//! print the grid as a markdown table. Only the cell classifier differs.

pub mod size;
pub mod stack;

use crate::report::MarkdownTable;
use crate::runner::{InvocationFailure, ToolCommand, ToolOutput, ToolRunner};
use serde::{Deserialize, Serialize};

/// One command to run, addressed by its table position
#[derive(Debug, Clone)]
pub struct SweepCase {
    pub row: String,
    pub column: String,
    pub command: ToolCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCell {
    pub row: String,
    pub column: String,
    pub value: String,
}

/// Cells in run order, plus row/column order for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResults {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<SweepCell>,
}

impl SweepResults {
    pub fn get(&self, row: &str, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
            .map(|c| c.value.as_str())
    }

    fn record(&mut self, row: &str, column: &str, value: String) {
        if !self.rows.iter().any(|r| r == row) {
            self.rows.push(row.to_string());
        }
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self.cells.push(SweepCell {
            row: row.to_string(),
            column: column.to_string(),
            value,
        });
    }

    /// Rows × columns grid; missing cells render as `N/A`
    pub fn to_table(&self, row_header: &str) -> MarkdownTable {
        let mut table = MarkdownTable::new(
            std::iter::once(row_header.to_string()).chain(self.columns.iter().cloned()),
        );
        for row in &self.rows {
            let mut cells = vec![row.clone()];
            cells.extend(
                self.columns
                    .iter()
                    .map(|column| self.get(row, column).unwrap_or("N/A").to_string()),
            );
            table.push_row(cells);
        }
        table
    }
}

/// Run every case in order, reducing each invocation with `classify`.
///
/// A failing case never stops the sweep; the classifier turns it into a label.
pub fn run_sweep<R, F>(runner: &R, cases: &[SweepCase], classify: F) -> SweepResults
where
    R: ToolRunner,
    F: Fn(Result<ToolOutput, InvocationFailure>) -> String,
{
    let mut results = SweepResults::default();
    for case in cases {
        println!("Running {} at {}...", case.column, case.row);
        println!("Running command: {}", case.command.display());

        let value = classify(runner.run_checked(&case.command));
        println!("  Result: {}", value);
        results.record(&case.row, &case.column, value);
    }
    results
}

/// Short, table-friendly description of a failed invocation
pub fn failure_summary(failure: &InvocationFailure) -> String {
    match failure {
        InvocationFailure::NonZeroExit { code, output } => {
            let status = code
                .map(|code| format!("exit status {}", code))
                .unwrap_or_else(|| "terminated by signal".to_string());
            match output.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
                Some(last) => format!("{}: {}", status, last),
                None => status,
            }
        }
        other => other.to_string(),
    }
}

/// Print a titled markdown table
pub fn print_table(title: &str, table: &MarkdownTable) {
    println!("\n\n--- {} ---", title);
    for line in table.render() {
        println!("{}", line);
    }
}
