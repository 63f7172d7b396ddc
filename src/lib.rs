// SPDX-License-Identifier: PMPL-1.0-or-later

//! fw-audit: panic, stack and size auditing for embedded firmware examples.
//!
//! The interesting part is the panic-reference scanner: it reads the
//! disassembly of a compiled example, tracks which function each line belongs
//! to and flags every reference to a panic entry point. The stack and size
//! sweeps are thin drivers around the simulator and `cargo bloat`.
//!
//! PIPELINE:
//! 1. **Runner**: shells out to the toolchain with a wall-clock deadline.
//! 2. **Scan**: filters the disassembly, folds function scope through each
//!    line and matches the panic catalog, minus known false positives.
//! 3. **Report**: `path:line: text` diagnostics per target and a pass/fail
//!    matrix across targets.

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod panics;
pub mod report;
pub mod runner;
pub mod scan;
pub mod simavr;
pub mod sweep;
pub mod types;
