// SPDX-License-Identifier: PMPL-1.0-or-later

//! Panic pattern catalog and false-positive exclusions

pub mod exclusions;
pub mod patterns;

pub use exclusions::{ExclusionRule, ExclusionSpec, Suppressor};
pub use patterns::{PanicPattern, PatternCatalog};
