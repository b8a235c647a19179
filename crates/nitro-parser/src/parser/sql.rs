//! `select` statements.
//!
//! ```text
//! select  = "select" selection ("," selection)* from? where?
//! selection = value ("as" alias)?
//! value   = 'string' | {capture} | [table "."] column
//! from    = "from" table (["as"] alias)?
//! where   = "where" value "=" value
//! ```
//!
//! Table, column and alias names are identifiers that are not one of the
//! reserved words; a reserved word ends whatever list it follows.

use nitro_common::token::is_sql_reserved;

use crate::syntax_kind::SyntaxKind;

use super::markup::parse_capture;
use super::{MarkClosed, Parser};

/// Whether the `n`th token can begin a selection item. Lets `select` stay
/// usable as a plain name when no statement follows it.
pub(crate) fn at_selection_start(p: &Parser, n: usize) -> bool {
    match p.nth(n) {
        SyntaxKind::SQL_STRING | SyntaxKind::L_BRACE => true,
        SyntaxKind::IDENT => !is_sql_reserved(p.nth_text(n)),
        _ => false,
    }
}

fn at_sql_ident(p: &Parser) -> bool {
    p.at(SyntaxKind::IDENT) && !is_sql_reserved(p.current_text())
}

pub(crate) fn parse_select(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // select

    parse_selection(p);
    while p.eat(SyntaxKind::COMMA) && !p.has_error() {
        parse_selection(p);
    }
    if p.at_word("from") && !p.has_error() {
        parse_from(p);
    }
    if p.at_word("where") && !p.has_error() {
        parse_where(p);
    }

    p.close(m, SyntaxKind::SELECT_EXPR)
}

fn parse_selection(p: &mut Parser) {
    let m = p.open();
    parse_value(p);
    if p.at_word("as") && !p.has_error() {
        p.advance(); // as
        parse_alias(p);
    }
    p.close(m, SyntaxKind::SQL_SELECTION);
}

fn parse_value(p: &mut Parser) {
    match p.current() {
        SyntaxKind::SQL_STRING => {
            p.advance_as(SyntaxKind::SQL_LITERAL);
        }
        SyntaxKind::L_BRACE => {
            parse_capture(p);
        }
        _ if at_sql_ident(p) => parse_column(p),
        _ => p.error("expected a column, a quoted string, or a capture"),
    }
}

/// `name` or `table.name`.
fn parse_column(p: &mut Parser) {
    let m = p.open();
    p.advance();
    if p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT && !is_sql_reserved(p.nth_text(1)) {
        p.advance(); // .
        p.advance();
    }
    p.close(m, SyntaxKind::SQL_COLUMN);
}

fn parse_alias(p: &mut Parser) {
    if at_sql_ident(p) {
        p.advance_as(SyntaxKind::SQL_ALIAS);
    } else {
        p.error("expected alias name");
    }
}

fn parse_from(p: &mut Parser) {
    let m = p.open();
    p.advance(); // from

    if at_sql_ident(p) {
        p.advance_as(SyntaxKind::SQL_TABLE);
        if p.at_word("as") {
            p.advance();
            parse_alias(p);
        } else if at_sql_ident(p) {
            parse_alias(p);
        }
    } else {
        p.error("expected table name");
    }

    p.close(m, SyntaxKind::SQL_FROM);
}

fn parse_where(p: &mut Parser) {
    let m = p.open();
    p.advance(); // where

    parse_value(p);
    if !p.has_error() && p.expect(SyntaxKind::EQ) {
        parse_value(p);
    }

    p.close(m, SyntaxKind::SQL_WHERE);
}
