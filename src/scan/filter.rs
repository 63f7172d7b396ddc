// SPDX-License-Identifier: PMPL-1.0-or-later

//! Trims disassembler output down to the object-file section

/// Disassembly starting at the ELF "file format" header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredDisassembly<'a> {
    pub text: &'a str,
    /// False when no header line was found and `text` is the whole input
    pub marker_found: bool,
}

fn is_format_marker(line: &str) -> bool {
    line.contains("file format") && line.to_ascii_lowercase().contains("elf")
}

/// Drop everything before the first `... file format elf...` line.
///
/// Cargo and the build script print progress noise ahead of the actual
/// disassembly; line numbers in reports are relative to the returned text.
pub fn filter_disassembly(raw: &str) -> FilteredDisassembly<'_> {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if is_format_marker(line) {
            return FilteredDisassembly {
                text: &raw[offset..],
                marker_found: true,
            };
        }
        offset += line.len();
    }

    FilteredDisassembly {
        text: raw,
        marker_found: false,
    }
}
