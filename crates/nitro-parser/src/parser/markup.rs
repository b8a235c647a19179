//! Markup parsing: `<tag attr="v" attr={x}>children</tag>` and `<tag />`.
//!
//! The closing tag's name is optional and never compared with the opening
//! one, so `<div>hello</span>` is accepted.

use crate::syntax_kind::SyntaxKind;

use super::expressions;
use super::{MarkClosed, Parser};

pub(crate) fn parse_markup(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // <

    let has_tag = p.at(SyntaxKind::IDENT);
    if has_tag {
        p.advance_as(SyntaxKind::TAG_NAME);
        while p.at_any(&[SyntaxKind::IDENT, SyntaxKind::URL_IDENT]) && !p.has_error() {
            parse_attr(p);
        }
    }

    match p.current() {
        SyntaxKind::SLASH_R_ANGLE if has_tag => {
            p.advance();
            return p.close(m, SyntaxKind::MARKUP_SELF_CLOSING);
        }
        SyntaxKind::R_ANGLE => p.advance(),
        _ => {
            p.error("expected `>` or `/>` to end the tag");
            return p.close(m, SyntaxKind::MARKUP_ELEMENT);
        }
    }

    while !p.has_error() {
        match p.current() {
            SyntaxKind::L_ANGLE_SLASH => break,
            SyntaxKind::L_ANGLE => {
                parse_markup(p);
            }
            SyntaxKind::TEXT => {
                p.advance_as(SyntaxKind::MARKUP_TEXT);
            }
            SyntaxKind::STRING => {
                p.advance_as(SyntaxKind::MARKUP_STRING);
            }
            SyntaxKind::L_BRACE => {
                parse_capture(p);
            }
            SyntaxKind::EOF => {
                p.error_with_related(
                    "unclosed markup element",
                    open_span,
                    "element opened here",
                );
            }
            _ => p.error("unexpected token in markup content"),
        }
    }

    if !p.has_error() {
        let close = p.open();
        p.advance(); // </
        p.eat(SyntaxKind::IDENT);
        p.expect(SyntaxKind::R_ANGLE);
        p.close(close, SyntaxKind::CLOSE_TAG);
    }

    p.close(m, SyntaxKind::MARKUP_ELEMENT)
}

/// `name="literal"` or `name={expr}`.
fn parse_attr(p: &mut Parser) {
    let m = p.open();
    p.advance(); // name

    if p.expect(SyntaxKind::EQ) {
        match p.current() {
            SyntaxKind::STRING => p.advance(),
            SyntaxKind::L_BRACE => {
                parse_capture(p);
            }
            _ => p.error("expected a quoted string or `{` capture as attribute value"),
        }
    }

    p.close(m, SyntaxKind::ATTR);
}

/// `{expr}`, shared by markup and SQL.
pub(crate) fn parse_capture(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {
    expressions::expr(p);
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::CAPTURE)
}
