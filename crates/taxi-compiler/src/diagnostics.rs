//! Ariadne-based rendering of compilation diagnostics, plus a JSON form for
//! tooling.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use serde_json::{json, Value as Json};

use crate::error::{CompilationError, Severity};

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
    /// Emit JSON instead of human-readable reports.
    pub json: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self { color: true, json: false }
    }
}

impl DiagnosticOptions {
    /// Plain output, for tests and pipes.
    pub fn colorless() -> Self {
        Self { color: false, json: false }
    }

    pub fn json() -> Self {
        Self { color: false, json: true }
    }
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    }
}

fn label_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}

/// Render one diagnostic against the text of the source it came from.
pub fn render_diagnostic(error: &CompilationError, source: &str, opts: &DiagnosticOptions) -> String {
    if opts.json {
        return to_json(error).to_string();
    }

    let source_len = source.len();
    // ariadne needs a non-empty span inside the source.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };
    let range = clamp(error.span.map(|s| s.to_range()).unwrap_or(0..0));
    let config = Config::default().with_color(opts.color);

    let mut builder = Report::build(report_kind(error.severity), range.clone())
        .with_code(error.kind.code())
        .with_message(&error.message)
        .with_config(config);
    if error.span.is_some() {
        builder.add_label(
            Label::new(range)
                .with_message(error.kind.name())
                .with_color(label_color(error.severity)),
        );
    }
    let report = builder.finish();

    let mut buf = Vec::new();
    if let Err(err) = report.write(Source::from(source), &mut buf) {
        return format!("{error} (diagnostic rendering failed: {err})");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Render every diagnostic, looking each one's source text up by name.
pub fn render_all<'a>(
    errors: &[CompilationError],
    source_text: impl Fn(&str) -> Option<&'a str>,
    opts: &DiagnosticOptions,
) -> Vec<String> {
    errors
        .iter()
        .map(|err| match source_text(&err.source_name) {
            Some(text) => render_diagnostic(err, text, opts),
            None => err.to_string(),
        })
        .collect()
}

pub fn to_json(error: &CompilationError) -> Json {
    json!({
        "code": error.kind.code(),
        "kind": error.kind.name(),
        "severity": error.severity,
        "message": error.message,
        "source": error.source_name,
        "line": error.line,
        "char": error.char,
    })
}
