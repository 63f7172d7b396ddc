// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tagged operator messages on stderr
//!
//! Stdout is reserved for report lines that editors and CI parse, so every
//! warning, note and error goes through here instead.

use colored::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Note,
    Warn,
    Error,
}

impl Level {
    fn tag(&self) -> &'static str {
        match self {
            Level::Note => "NOTE",
            Level::Warn => "WARN",
            Level::Error => "ERR",
        }
    }

    fn colored_tag(&self) -> ColoredString {
        match self {
            Level::Note => self.tag().dimmed(),
            Level::Warn => self.tag().yellow().bold(),
            Level::Error => self.tag().red().bold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(level: Level, detail: impl Into<String>) -> Self {
        Self {
            level,
            detail: detail.into(),
        }
    }

    pub fn print(&self) {
        eprintln!("[{}] {}", self.level.colored_tag(), self.detail);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.tag(), self.detail)
    }
}

pub fn note(detail: impl Into<String>) {
    Diagnostic::new(Level::Note, detail).print();
}

pub fn warn(detail: impl Into<String>) {
    Diagnostic::new(Level::Warn, detail).print();
}

pub fn error(detail: impl Into<String>) {
    Diagnostic::new(Level::Error, detail).print();
}
