use serde::Serialize;

use crate::span::Span;

/// A token produced by the Nitro lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in a Nitro source file.
///
/// One source mixes host code, markup and SQL. The markup tokens (`LAngle`,
/// `Text`, ...) only come out of the lexer's tag and content modes; SQL
/// words and HTTP verbs are plain `Ident`s that the parser recognises by
/// their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Func,
    Let,
    For,
    In,
    Struct,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // ── Punctuation ────────────────────────────────────────────────────
    Comma,
    Dot,
    Eq,
    Colon,
    /// `/` in host code. Only meaningful inside route paths.
    Slash,

    // ── Markup ─────────────────────────────────────────────────────────
    /// `<` opening a tag.
    LAngle,
    /// `</` opening a closing tag.
    LAngleSlash,
    /// `>` ending an opening or closing tag.
    RAngle,
    /// `/>` ending a self-closing tag.
    SlashRAngle,
    /// A run of literal markup text, `[^<{]+`.
    Text,

    // ── Literals ───────────────────────────────────────────────────────
    /// `"..."`, no escapes.
    StringLiteral,
    /// `'...'`, only valid inside a select.
    SqlString,
    IntLiteral,
    /// `__go__` followed by the rest of its line.
    RawLine,

    // ── Identifiers ────────────────────────────────────────────────────
    Ident,
    /// Identifier containing `-` or `~`; only produced in paths and tags.
    UrlIdent,

    // ── Special ────────────────────────────────────────────────────────
    Eof,
    Error,
}

/// Look up a keyword from its string representation.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "func" => Some(TokenKind::Func),
        "let" => Some(TokenKind::Let),
        "for" => Some(TokenKind::For),
        "in" => Some(TokenKind::In),
        "struct" => Some(TokenKind::Struct),
        _ => None,
    }
}

/// Words that may not be used as SQL identifiers (tables, columns, aliases).
pub const SQL_RESERVED: &[&str] = &["where", "select", "from", "as"];

/// Whether `word` is reserved inside a select statement.
pub fn is_sql_reserved(word: &str) -> bool {
    SQL_RESERVED.contains(&word)
}

/// HTTP verbs that may start a route definition.
pub const HTTP_VERBS: &[&str] = &["get", "put", "post", "patch", "delete"];
