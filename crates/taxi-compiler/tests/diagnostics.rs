//! Rendering of compilation diagnostics through ariadne and as JSON.

use taxi_compiler::diagnostics::{render_all, render_diagnostic, to_json, DiagnosticOptions};
use taxi_compiler::{CompilationError, Compiler};

// ── Helpers ────────────────────────────────────────────────────────────

fn opts() -> DiagnosticOptions {
    DiagnosticOptions::colorless()
}

fn diagnostics_for(src: &str) -> Vec<CompilationError> {
    Compiler::new().with_source("test.taxi", src).compile_with_messages().0
}

/// Render the first diagnostic of a source as a plain string.
fn render_first_error(src: &str) -> String {
    let diagnostics = diagnostics_for(src);
    assert!(
        !diagnostics.is_empty(),
        "expected at least one diagnostic for source: {:?}",
        src
    );
    render_diagnostic(&diagnostics[0], src, &opts())
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn unresolved_type_report_has_code_and_label() {
    let rendered = render_first_error("type A {\n  b : Bar\n}");
    assert!(rendered.contains("[E0002]"), "{rendered}");
    assert!(rendered.contains("Unresolved type: Bar"), "{rendered}");
    assert!(rendered.contains("UnresolvedType"), "{rendered}");
    assert!(rendered.contains("b : Bar"), "{rendered}");
}

#[test]
fn syntax_error_report() {
    let rendered = render_first_error("type A {");
    assert!(rendered.contains("[E0001]"), "{rendered}");
    assert!(rendered.contains("Error"), "{rendered}");
}

#[test]
fn warnings_render_as_warnings() {
    let rendered = render_first_error("annotation Audit { reason : String }\n@Audit(who = 'me') type A");
    assert!(rendered.contains("Warning"), "{rendered}");
    assert!(rendered.contains("[E0007]"), "{rendered}");
}

#[test]
fn colorless_output_has_no_escape_codes() {
    let rendered = render_first_error("type A { b : Bar }");
    assert!(!rendered.contains('\u{1b}'), "{rendered:?}");
}

#[test]
fn render_all_falls_back_to_plain_text_for_unknown_sources() {
    let diagnostics = diagnostics_for("type A { b : Bar }");
    let rendered = render_all(&diagnostics, |_| None, &opts());
    assert_eq!(rendered, vec!["test.taxi(1,13) error: Unresolved type: Bar".to_string()]);
}

// ── JSON ───────────────────────────────────────────────────────────────

#[test]
fn json_diagnostic_fields() {
    let diagnostics = diagnostics_for("type A { b : Bar }");
    let json = to_json(&diagnostics[0]);
    assert_eq!(json["code"], "E0002");
    assert_eq!(json["kind"], "UnresolvedType");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["line"], 1);
    assert_eq!(json["char"], 13);
    assert_eq!(json["source"], "test.taxi");
}

#[test]
fn json_option_renders_json() {
    let src = "type A { b : Bar }";
    let diagnostics = diagnostics_for(src);
    let rendered = render_diagnostic(&diagnostics[0], src, &DiagnosticOptions::json());
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed["message"], "Unresolved type: Bar");
}

#[test]
fn document_summary_outlines_types_and_services() {
    let doc = Compiler::from_source(
        "enum Color { RED }\ntype Paint { color : Color }\nservice Shop { operation buy(paint : Paint) : Paint }",
    )
    .compile()
    .unwrap();
    let summary = doc.summary();
    assert_eq!(summary["types"][0]["name"], "Color");
    assert_eq!(summary["types"][0]["values"][0], "RED");
    assert_eq!(summary["types"][1]["fields"][0]["type"], "Color");
    assert_eq!(summary["services"][0]["operations"][0]["returnType"], "Paint");
}
