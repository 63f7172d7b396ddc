// SPDX-License-Identifier: PMPL-1.0-or-later

//! Function-scope tracking from symbol-header lines
//!
//! Disassemblers announce each function with a header such as
//! `000001c4 <picojson::stream_parser::StreamParser<R>::next_event>:`.
//! Demangled names can themselves contain angle brackets, so the name is
//! recovered with a balanced-bracket scan from the trailing colon backwards.

/// Extract the function name from a symbol-header line.
///
/// The name is the balanced `<...>` pair closing nearest the trailing colon.
/// Usually that pair ends right at the colon; `objdump -F` appends
/// `(File Offset: 0x..)` after it. Returns `None` for ordinary lines and for
/// header-shaped lines without a balanced, non-empty pair.
pub fn symbol_header_name(line: &str) -> Option<&str> {
    if !line.contains('<') || !line.contains('>') {
        return None;
    }
    let body = line.trim_end().strip_suffix(':')?;
    let bytes = body.as_bytes();
    let close = (0..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b'>' && !is_arrow(bytes, i))?;

    let mut depth = 0usize;
    for i in (0..=close).rev() {
        match bytes[i] {
            // `->` in fn-pointer types is not a bracket
            b'>' if is_arrow(bytes, i) => {}
            b'>' => depth += 1,
            b'<' => {
                depth -= 1;
                if depth == 0 {
                    let name = &body[i + 1..close];
                    return (!name.is_empty()).then_some(name);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_arrow(bytes: &[u8], i: usize) -> bool {
    i > 0 && bytes[i - 1] == b'-'
}

/// The function most recently announced by a header line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeState {
    current: Option<String>,
}

impl ScopeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Consume this state and the next line, returning the new state and
    /// whether the line was a header.
    pub fn advance(self, line: &str) -> (ScopeState, bool) {
        match symbol_header_name(line) {
            Some(name) => (
                ScopeState {
                    current: Some(name.to_string()),
                },
                true,
            ),
            None => (self, false),
        }
    }
}
