// SPDX-License-Identifier: PMPL-1.0-or-later

//! Panic-indicator patterns for demangled Rust disassembly

use crate::types::PatternId;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// Catalog entries in match-priority order
const CATALOG: &[(PatternId, &str)] = &[
    (PatternId::PanickingModule, r"core::panicking::"),
    (PatternId::PanicFmt, r"panic_fmt"),
    (PatternId::PanicImpl, r"panic_impl"),
    (PatternId::BeginUnwind, r"rust_begin_unwind"),
    (PatternId::BoundsCheck, r"panic_bounds_check"),
    (
        PatternId::SliceIndexFail,
        r"slice_(start_|end_)?index_(len_|order_|overflow_)?fail",
    ),
    (PatternId::StrSliceFail, r"slice_error_fail"),
    (PatternId::StrIndexFail, r"str_index_overflow_fail"),
    (PatternId::UnwrapFailed, r"unwrap_failed"),
    (PatternId::ExpectFailed, r"expect_failed"),
    (PatternId::AssertFailed, r"assert_failed"),
    (PatternId::PanicConst, r"panic_const"),
    // `encode_utf8_raw::do_panic` and friends; `_` defeats the `\b` below
    (PatternId::EncodePanic, r"::do_panic\b"),
    (PatternId::GenericPanic, r"\bpanic"),
];

pub struct PanicPattern {
    pub id: PatternId,
    pub source: &'static str,
    regex: Regex,
}

impl PanicPattern {
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Ordered, pre-compiled set of panic matchers
pub struct PatternCatalog {
    patterns: Vec<PanicPattern>,
}

impl PatternCatalog {
    pub fn new() -> Result<Self> {
        let patterns = CATALOG
            .iter()
            .map(|&(id, source)| {
                let regex = RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("compiling catalog pattern {}", id))?;
                Ok(PanicPattern { id, source, regex })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[PanicPattern] {
        &self.patterns
    }

    /// First pattern, in catalog order, that matches the line
    pub fn first_match(&self, line: &str) -> Option<&PanicPattern> {
        self.patterns.iter().find(|p| p.is_match(line))
    }
}
