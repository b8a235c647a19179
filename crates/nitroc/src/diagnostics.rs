//! Compile error reporting: ariadne reports for people, one JSON object per
//! line for tools.

use std::path::Path;

use ariadne::{Config, Label, Report, ReportKind, Source};
use nitro_codegen::{CompileError, LowerError};
use nitro_common::span::LineIndex;
use nitro_parser::ParseError;

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub json: bool,
}

/// Stable code for each kind of failure.
pub fn code(err: &CompileError) -> &'static str {
    match err {
        CompileError::Syntax(_) => "P0001",
        CompileError::Lower(LowerError::Internal { .. }) => "L0001",
        CompileError::Lower(LowerError::Unsupported { .. }) => "L0002",
    }
}

/// Write `err` to stderr.
pub fn report(source: &str, path: &Path, err: &CompileError, opts: &DiagnosticOptions) {
    if opts.json {
        eprintln!("{}", to_json(source, path, err));
        return;
    }
    match err {
        CompileError::Syntax(err) => syntax_report(source, err, opts),
        CompileError::Lower(err) => eprintln!("error: {}: {err}", path.display()),
    }
}

fn syntax_report(source: &str, err: &ParseError, opts: &DiagnosticOptions) {
    let config = Config::default().with_color(opts.color);
    let range = err.span.to_range();
    let mut report = Report::<std::ops::Range<usize>>::build(ReportKind::Error, range.clone())
        .with_message("Parse error")
        .with_config(config)
        .with_label(Label::new(range).with_message(&err.message));
    if let Some((message, span)) = &err.related {
        report = report.with_label(Label::new(span.to_range()).with_message(message));
    }
    let _ = report.finish().eprint(Source::from(source));
}

pub fn to_json(source: &str, path: &Path, err: &CompileError) -> serde_json::Value {
    let file = path.display().to_string();
    let spans = match err {
        CompileError::Syntax(err) => {
            let index = LineIndex::new(source);
            let mut spans = vec![span_json(&index, err.span, &err.message)];
            if let Some((message, span)) = &err.related {
                spans.push(span_json(&index, *span, message));
            }
            spans
        }
        CompileError::Lower(_) => Vec::new(),
    };
    serde_json::json!({
        "code": code(err),
        "severity": "error",
        "message": err.to_string(),
        "file": file,
        "spans": spans,
    })
}

fn span_json(index: &LineIndex, span: nitro_common::span::Span, label: &str) -> serde_json::Value {
    let range = span.to_range();
    let (line, column) = index.line_col(span.start);
    serde_json::json!({
        "start": range.start,
        "end": range.end,
        "line": line,
        "column": column,
        "label": label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitro_codegen::{compile, GoOptions};

    fn error(source: &str) -> CompileError {
        compile(source, &GoOptions::default()).unwrap_err()
    }

    #[test]
    fn syntax_error_json_has_position() {
        let source = "func ok() 1\nfunc (";
        let json = to_json(source, Path::new("app.nitro"), &error(source));
        assert_eq!(json["code"], "P0001");
        assert_eq!(json["file"], "app.nitro");
        assert_eq!(json["spans"][0]["line"], 2);
    }

    #[test]
    fn lowering_codes() {
        assert_eq!(code(&error("func f(u) <p>{u.name}</p>")), "L0001");
        assert_eq!(code(&error("func f() { select a, a from t }")), "L0002");
    }
}
