//! Definition parsers: functions, HTTP routes and struct declarations.

use nitro_common::token::HTTP_VERBS;

use crate::syntax_kind::SyntaxKind;

use super::expressions;
use super::Parser;

pub(crate) fn parse_definition(p: &mut Parser) {
    match p.current() {
        SyntaxKind::FUNC_KW => parse_fn_def(p),
        SyntaxKind::STRUCT_KW => parse_struct_def(p),
        // HTTP verbs are contextual identifiers.
        SyntaxKind::IDENT if HTTP_VERBS.contains(&p.current_text()) => parse_http_def(p),
        _ => p.error("expected `func`, `struct`, or an HTTP verb"),
    }
}

fn parse_name(p: &mut Parser, what: &str) -> bool {
    if p.at(SyntaxKind::IDENT) {
        p.advance_as(SyntaxKind::NAME);
        true
    } else {
        p.error(&format!("expected {what}"));
        false
    }
}

// ── Functions ────────────────────────────────────────────────────────────

/// `func name(params) body`
fn parse_fn_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // func

    if parse_name(p, "function name") {
        if p.at(SyntaxKind::L_PAREN) {
            parse_param_list(p);
        } else {
            p.error("expected `(` after function name");
        }
    }
    if !p.has_error() {
        expressions::parse_body(p);
    }

    p.close(m, SyntaxKind::FN_DEF);
}

/// `(a, b,)` -- bare names, trailing comma allowed.
fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (

    while !p.at(SyntaxKind::R_PAREN) && !p.has_error() {
        if p.at(SyntaxKind::IDENT) {
            p.advance_as(SyntaxKind::PARAM);
        } else {
            p.error("expected parameter name");
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);

    p.close(m, SyntaxKind::PARAM_LIST);
}

// ── HTTP routes ──────────────────────────────────────────────────────────

/// `verb /path/{wildcard}/ () body`
fn parse_http_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // verb

    if p.at(SyntaxKind::SLASH) {
        parse_route_path(p);
    } else {
        p.error("expected a route path starting with `/`");
    }
    if !p.has_error() && p.expect(SyntaxKind::L_PAREN) {
        p.expect(SyntaxKind::R_PAREN);
    }
    if !p.has_error() {
        expressions::parse_body(p);
    }

    p.close(m, SyntaxKind::HTTP_DEF);
}

/// A route path is written without blanks: each segment must touch the
/// `/` before it, and a following `/` must touch the segment.
fn parse_route_path(p: &mut Parser) {
    let m = p.open();

    loop {
        p.advance(); // /
        if !p.last_span().touches(p.current_span()) {
            break;
        }
        match p.current() {
            SyntaxKind::IDENT | SyntaxKind::URL_IDENT => {
                p.advance_as(SyntaxKind::PATH_SEGMENT);
            }
            SyntaxKind::L_BRACE => parse_path_wildcard(p),
            _ => break,
        }
        if p.has_error() || !p.at(SyntaxKind::SLASH) || !p.last_span().touches(p.current_span()) {
            break;
        }
    }

    p.close(m, SyntaxKind::ROUTE_PATH);
}

fn parse_path_wildcard(p: &mut Parser) {
    let m = p.open();
    p.advance(); // {
    if p.at(SyntaxKind::IDENT) {
        p.advance_as(SyntaxKind::NAME);
        p.expect(SyntaxKind::R_BRACE);
    } else {
        p.error("expected wildcard name");
    }
    p.close(m, SyntaxKind::PATH_WILDCARD);
}

// ── Structs ──────────────────────────────────────────────────────────────

/// `struct Name { field: type, ... }`
fn parse_struct_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // struct

    if parse_name(p, "struct name") && p.expect(SyntaxKind::L_BRACE) {
        while !p.at(SyntaxKind::R_BRACE) && !p.has_error() {
            parse_struct_field(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        p.expect(SyntaxKind::R_BRACE);
    }

    p.close(m, SyntaxKind::STRUCT_DEF);
}

fn parse_struct_field(p: &mut Parser) {
    let m = p.open();
    if parse_name(p, "field name") && p.expect(SyntaxKind::COLON) {
        if p.at(SyntaxKind::IDENT) {
            p.advance_as(SyntaxKind::TYPE_REF);
        } else {
            p.error("expected field type");
        }
    }
    p.close(m, SyntaxKind::STRUCT_FIELD);
}
