//! Expression parsing.
//!
//! Precedence, tightest first:
//!
//! ```text
//! atom       = literal | raw | (expr) | markup | select | for | name
//! index      = atom ("[" expr "]")*            left-folded
//! dot        = index ("." expr)*               rhs is a full expression, so
//!                                              a.b.c parses as a.(b.c)
//! body       = block | dot
//! expr       = "let" name "=" expr | body
//! ```

use crate::syntax_kind::SyntaxKind;

use super::markup;
use super::sql;
use super::{MarkClosed, Parser};

pub(crate) fn expr(p: &mut Parser) {
    if p.at(SyntaxKind::LET_KW) {
        parse_let_expr(p);
    } else {
        parse_body(p);
    }
}

/// `let name = expr`. Chained lets nest right: `let a = let b = 1`.
fn parse_let_expr(p: &mut Parser) {
    let m = p.open();
    p.advance(); // let

    if p.at(SyntaxKind::IDENT) {
        p.advance_as(SyntaxKind::NAME);
        if p.expect(SyntaxKind::EQ) {
            expr(p);
        }
    } else {
        p.error("expected binding name after `let`");
    }

    p.close(m, SyntaxKind::LET_EXPR);
}

/// A block or a dot expression: what definitions and loops take as body.
pub(crate) fn parse_body(p: &mut Parser) {
    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        parse_dot_expr(p);
    }
}

fn parse_block(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // {

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        expr(p);
    }
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}` to close block", open_span, "block opened here");
    }

    p.close(m, SyntaxKind::BLOCK);
}

fn parse_dot_expr(p: &mut Parser) {
    let Some(mut lhs) = parse_index_expr(p) else {
        return;
    };
    while p.at(SyntaxKind::DOT) && !p.has_error() {
        let m = p.open_before(lhs);
        p.advance(); // .
        expr(p);
        lhs = p.close(m, SyntaxKind::DOT_EXPR);
    }
}

fn parse_index_expr(p: &mut Parser) -> Option<MarkClosed> {
    let mut lhs = parse_atom(p)?;
    while p.at(SyntaxKind::L_BRACKET) && !p.has_error() {
        let m = p.open_before(lhs);
        p.advance(); // [
        expr(p);
        p.expect(SyntaxKind::R_BRACKET);
        lhs = p.close(m, SyntaxKind::INDEX_EXPR);
    }
    Some(lhs)
}

fn parse_atom(p: &mut Parser) -> Option<MarkClosed> {
    let done = match p.current() {
        SyntaxKind::STRING => p.advance_as(SyntaxKind::LITERAL),
        SyntaxKind::INT_NUMBER => {
            if p.current_text().parse::<i64>().is_err() {
                p.error("integer literal out of range");
                return None;
            }
            p.advance_as(SyntaxKind::LITERAL)
        }
        SyntaxKind::RAW_LINE => p.advance_as(SyntaxKind::RAW_EXPR),
        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance(); // (
            expr(p);
            p.expect(SyntaxKind::R_PAREN);
            p.close(m, SyntaxKind::PAREN_EXPR)
        }
        SyntaxKind::L_ANGLE => markup::parse_markup(p),
        SyntaxKind::FOR_KW => parse_for_expr(p),
        SyntaxKind::IDENT if p.current_text() == "select" && sql::at_selection_start(p, 1) => {
            sql::parse_select(p)
        }
        SyntaxKind::IDENT => p.advance_as(SyntaxKind::NAME_REF),
        _ => {
            p.error("expected expression");
            return None;
        }
    };
    Some(done)
}

/// `for name in iterable body`
fn parse_for_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // for

    if p.at(SyntaxKind::IDENT) {
        p.advance_as(SyntaxKind::NAME);
        if p.expect(SyntaxKind::IN_KW) {
            expr(p);
            if !p.has_error() {
                parse_body(p);
            }
        }
    } else {
        p.error("expected loop variable after `for`");
    }

    p.close(m, SyntaxKind::FOR_EXPR)
}
