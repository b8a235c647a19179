//! SyntaxKind enum for the Nitro CST.
//!
//! Token kinds mirror [`TokenKind`] in SCREAMING_SNAKE_CASE; node kinds are
//! the composite nodes built by the parser.

use nitro_common::token::TokenKind;

/// Every kind of syntax element in the Nitro CST.
///
/// The first two values are sentinels used by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    TOMBSTONE = 0,
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    FUNC_KW,
    LET_KW,
    FOR_KW,
    IN_KW,
    STRUCT_KW,

    // ── Delimiters and punctuation ─────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    DOT,
    EQ,
    COLON,
    SLASH,

    // ── Markup tokens ──────────────────────────────────────────────────
    L_ANGLE,
    L_ANGLE_SLASH,
    R_ANGLE,
    SLASH_R_ANGLE,
    TEXT,

    // ── Literals and identifiers ───────────────────────────────────────
    STRING,
    SQL_STRING,
    INT_NUMBER,
    RAW_LINE,
    IDENT,
    URL_IDENT,

    EOF,
    ERROR,

    // ── Definitions ────────────────────────────────────────────────────
    SOURCE_FILE,
    FN_DEF,
    HTTP_DEF,
    STRUCT_DEF,
    /// A declared name: function, parameter, let binding, loop binding.
    NAME,
    PARAM_LIST,
    PARAM,
    ROUTE_PATH,
    /// Literal route segment, `users` in `/users/`.
    PATH_SEGMENT,
    /// `{id}` route segment.
    PATH_WILDCARD,
    STRUCT_FIELD,
    TYPE_REF,

    // ── Expressions ────────────────────────────────────────────────────
    BLOCK,
    LET_EXPR,
    DOT_EXPR,
    INDEX_EXPR,
    /// String or integer literal.
    LITERAL,
    RAW_EXPR,
    PAREN_EXPR,
    NAME_REF,
    FOR_EXPR,

    // ── Markup ─────────────────────────────────────────────────────────
    MARKUP_ELEMENT,
    MARKUP_SELF_CLOSING,
    TAG_NAME,
    ATTR,
    /// `</tag>` closing an element; the name is optional and unchecked.
    CLOSE_TAG,
    MARKUP_TEXT,
    MARKUP_STRING,
    /// `{expr}` inside markup or SQL.
    CAPTURE,

    // ── SQL ────────────────────────────────────────────────────────────
    SELECT_EXPR,
    SQL_SELECTION,
    SQL_LITERAL,
    SQL_COLUMN,
    SQL_ALIAS,
    SQL_FROM,
    SQL_TABLE,
    SQL_WHERE,

    #[doc(hidden)]
    __LAST,
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Func => SyntaxKind::FUNC_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::For => SyntaxKind::FOR_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::Struct => SyntaxKind::STRUCT_KW,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::LAngle => SyntaxKind::L_ANGLE,
            TokenKind::LAngleSlash => SyntaxKind::L_ANGLE_SLASH,
            TokenKind::RAngle => SyntaxKind::R_ANGLE,
            TokenKind::SlashRAngle => SyntaxKind::SLASH_R_ANGLE,
            TokenKind::Text => SyntaxKind::TEXT,
            TokenKind::StringLiteral => SyntaxKind::STRING,
            TokenKind::SqlString => SyntaxKind::SQL_STRING,
            TokenKind::IntLiteral => SyntaxKind::INT_NUMBER,
            TokenKind::RawLine => SyntaxKind::RAW_LINE,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::UrlIdent => SyntaxKind::URL_IDENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}

impl SyntaxKind {
    /// How the kind is named in "expected ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::L_PAREN => "`(`",
            SyntaxKind::R_PAREN => "`)`",
            SyntaxKind::L_BRACKET => "`[`",
            SyntaxKind::R_BRACKET => "`]`",
            SyntaxKind::L_BRACE => "`{`",
            SyntaxKind::R_BRACE => "`}`",
            SyntaxKind::COMMA => "`,`",
            SyntaxKind::EQ => "`=`",
            SyntaxKind::COLON => "`:`",
            SyntaxKind::R_ANGLE => "`>`",
            SyntaxKind::IN_KW => "`in`",
            SyntaxKind::IDENT => "identifier",
            SyntaxKind::EOF => "end of file",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kinds_map_to_token_range() {
        let kinds = [
            TokenKind::Func,
            TokenKind::LBrace,
            TokenKind::LAngleSlash,
            TokenKind::RawLine,
            TokenKind::UrlIdent,
            TokenKind::Error,
        ];
        for kind in kinds {
            let syntax = SyntaxKind::from(kind.clone());
            assert!(syntax > SyntaxKind::ERROR_NODE, "{kind:?}");
            assert!(syntax < SyntaxKind::SOURCE_FILE, "{kind:?}");
        }
    }

    #[test]
    fn sentinel_values() {
        assert_eq!(SyntaxKind::TOMBSTONE as u16, 0);
        assert_eq!(SyntaxKind::ERROR_NODE as u16, 1);
    }

    #[test]
    fn describe_known_delimiters() {
        assert_eq!(SyntaxKind::R_BRACE.describe(), "`}`");
        assert_eq!(SyntaxKind::SOURCE_FILE.describe(), "token");
    }
}
