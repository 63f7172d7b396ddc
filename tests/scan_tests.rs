// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scanner behaviour on realistic AVR disassembly

use fw_audit::catalog::{ExclusionSpec, PatternCatalog, Suppressor};
use fw_audit::scan::{filter_disassembly, symbol_header_name, PanicScanner};
use fw_audit::types::*;

const PICOJSON_LISTING: &str = "\
test_picojson.elf:\tfile format elf32-avr

Disassembly of section .text:

00000000 <__vectors>:
       0: 0c 94 72 00   jmp\t0xe4
000001c4 <picojson::stream_parser::StreamParser<R>::next_event>:
     1c4: 0f 93         push\tr16
     1c6: 0e 94 10 05   call\t0xa20 <core::slice::index::slice_end_index_len_fail>
     1ca: 08 95         ret
00000a20 <core::slice::index::slice_end_index_len_fail>:
     a20: ff cf         rjmp\t.-2
";

fn scanner() -> PanicScanner {
    PanicScanner::with_defaults().expect("built-in catalog compiles")
}

#[test]
fn test_unwrap_inside_function_scenario() {
    let text = "<foo::bar>:\n  20: call 0x40 <core::option::unwrap_failed>\n";
    let output = scanner().scan(text);

    assert_eq!(output.findings.len(), 1);
    let finding = &output.findings[0];
    assert_eq!(finding.line_number, 2);
    assert_eq!(finding.context_function.as_deref(), Some("foo::bar"));
    assert_eq!(finding.pattern_id, PatternId::UnwrapFailed);
    assert_eq!(finding.matched_pattern, "unwrap_failed");
}

#[test]
fn test_panic_impl_header_scenario() {
    let text = "00000300 <panic_impl>:\n     300: ff cf   rjmp .-2\n";
    let output = scanner().scan(text);

    assert_eq!(output.findings.len(), 1);
    assert_eq!(output.findings[0].line_number, 1);
    assert_eq!(output.findings[0].context_function, None);
}

#[test]
fn test_header_hit_then_body_hit() {
    let text = "<core::panicking::panic_fmt>:\n  10: call 0x80 <rust_begin_unwind>\n";
    let output = scanner().scan(text);

    assert_eq!(output.findings.len(), 2);
    assert_eq!(output.findings[0].context_function, None);
    assert_eq!(
        output.findings[1].context_function.as_deref(),
        Some("core::panicking::panic_fmt")
    );
}

#[test]
fn test_realistic_listing() {
    let filtered = filter_disassembly(PICOJSON_LISTING);
    assert!(filtered.marker_found);

    let output = scanner().scan(filtered.text);
    let lines: Vec<_> = output.findings.iter().map(|f| f.line_number).collect();
    assert_eq!(lines, vec![9, 11]);
    assert_eq!(
        output.findings[0].context_function.as_deref(),
        Some("picojson::stream_parser::StreamParser<R>::next_event")
    );
    assert_eq!(output.findings[0].pattern_id, PatternId::SliceIndexFail);
    assert_eq!(output.findings[1].context_function, None);
}

#[test]
fn test_str_and_overflow_helpers_are_findings() {
    let text = "\
00000200 <avr_demo::parse>:
     200: 0e 94 00 04   call\t0x800 <core::str::slice_error_fail>
     204: 0e 94 10 04   call\t0x820 <core::slice::index::slice_end_index_overflow_fail>
     208: 0e 94 20 04   call\t0x840 <core::char::methods::encode_utf8_raw::do_panic>
";
    let output = scanner().scan(text);

    let ids: Vec<_> = output.findings.iter().map(|f| f.pattern_id).collect();
    assert_eq!(
        ids,
        vec![
            PatternId::StrSliceFail,
            PatternId::SliceIndexFail,
            PatternId::EncodePanic
        ]
    );
    assert!(output
        .findings
        .iter()
        .all(|f| f.context_function.as_deref() == Some("avr_demo::parse")));
}

#[test]
fn test_file_offset_headers_set_scope() {
    let text = "00000200 <avr_demo::parse> (File Offset: 0x2b4):\n  200: call <unwrap_failed>\n";
    let output = scanner().scan(text);
    assert_eq!(output.findings.len(), 1);
    assert_eq!(
        output.findings[0].context_function.as_deref(),
        Some("avr_demo::parse")
    );
}

#[test]
fn test_int_log10_comment_is_suppressed() {
    let text = "<fmt_u32>:\n  ; core::num::int_log10::panic_for_nonpositive_argument\n  1e: ret\n";
    let output = scanner().scan(text);

    assert!(output.findings.is_empty());
    assert_eq!(output.suppressed.len(), 1);
    assert_eq!(output.suppressed[0].line_number, 2);

    // Without any exclusions the same line is a finding
    let unfiltered = PanicScanner::new(PatternCatalog::new().unwrap(), Suppressor::empty());
    assert_eq!(unfiltered.scan(text).findings.len(), 1);
}

#[test]
fn test_configured_exclusion_applies() {
    let extra = [ExclusionSpec::new("vendor-note", r"^\s*;.*vendor_panic_note")];
    let scanner = PanicScanner::new(
        PatternCatalog::new().unwrap(),
        Suppressor::new(&extra).unwrap(),
    );
    let output = scanner.scan("  ; vendor_panic_note\n  ; int_log10::panic_for_nonpositive_argument\n");
    assert!(output.findings.is_empty());
    let rules: Vec<_> = output.suppressed.iter().map(|s| s.rule_id.as_str()).collect();
    assert_eq!(rules, vec!["vendor-note", "int-log10-nonpositive-comment"]);
}

#[test]
fn test_nested_header_names() {
    assert_eq!(symbol_header_name("00000abc <outer<inner>>:"), Some("outer<inner>"));
    assert_eq!(
        symbol_header_name("00000abc <a<b<c>>::d>:"),
        Some("a<b<c>>::d")
    );
}

#[test]
fn test_filter_missing_marker_is_noop() {
    let raw = "<foo>:\n  call <unwrap_failed>\n";
    let filtered = filter_disassembly(raw);
    assert!(!filtered.marker_found);
    assert_eq!(filtered.text, raw);
}

#[test]
fn test_scanning_twice_is_identical() {
    let scanner = scanner();
    let first = scanner.scan(PICOJSON_LISTING);
    let second = scanner.scan(PICOJSON_LISTING);
    assert_eq!(first, second);
}
