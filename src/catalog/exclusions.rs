// SPDX-License-Identifier: PMPL-1.0-or-later

//! Known false-positive shapes that the scanner must skip

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Disassembler comments naming `int_log10`'s nonpositive-argument panic sit next
/// to unrelated code; they are not call sites.
pub const INT_LOG10_RULE_ID: &str = "int-log10-nonpositive-comment";
const INT_LOG10_RULE: &str = r"^\s*;.*int_log10::panic_for_nonpositive_argument";

/// Serializable form of an exclusion, as read from the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSpec {
    pub id: String,
    pub pattern: String,
}

impl ExclusionSpec {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
        }
    }
}

pub struct ExclusionRule {
    pub id: String,
    regex: Regex,
}

impl ExclusionRule {
    pub fn compile(spec: &ExclusionSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern)
            .with_context(|| format!("compiling exclusion rule {}", spec.id))?;
        Ok(Self {
            id: spec.id.clone(),
            regex,
        })
    }
}

pub struct Suppressor {
    rules: Vec<ExclusionRule>,
}

impl Suppressor {
    pub fn default_specs() -> Vec<ExclusionSpec> {
        vec![ExclusionSpec::new(INT_LOG10_RULE_ID, INT_LOG10_RULE)]
    }

    /// Built-in rules followed by `extra`
    pub fn new(extra: &[ExclusionSpec]) -> Result<Self> {
        let rules = Self::default_specs()
            .iter()
            .chain(extra.iter())
            .map(ExclusionRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// No rules at all, not even the built-in one
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    /// The first rule that excludes this line
    pub fn matching_rule(&self, line: &str) -> Option<&ExclusionRule> {
        self.rules.iter().find(|r| r.regex.is_match(line))
    }
}
