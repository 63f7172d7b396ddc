// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markdown tables for sweep results

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Short rows are padded with `N/A`
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
        while cells.len() < self.header.len() {
            cells.push("N/A".to_string());
        }
        self.rows.push(cells);
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(Self::render_row(&self.header));
        lines.push(format!("{}|", "|---".repeat(self.header.len())));
        lines.extend(self.rows.iter().map(|row| Self::render_row(row)));
        lines
    }

    fn render_row(cells: &[String]) -> String {
        format!("| {} |", cells.join(" | "))
    }
}
