// SPDX-License-Identifier: PMPL-1.0-or-later

//! Lexical panic-reference scanning over disassembly text
//!
//! Nothing here understands the instruction set. The scanner only knows what
//! a function header looks like and which symbol names imply a panic path.

pub mod filter;
pub mod scanner;
pub mod scope;

pub use filter::{filter_disassembly, FilteredDisassembly};
pub use scanner::{LineOutcome, PanicScanner};
pub use scope::{symbol_header_name, ScopeState};
