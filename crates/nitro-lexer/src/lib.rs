// Nitro lexer -- tokenizer for Nitro source files.

mod cursor;

use cursor::Cursor;
use nitro_common::token::{keyword_from_str, Token, TokenKind};

/// Prefix of a raw Go passthrough line.
pub const RAW_PREFIX: &str = "__go__";

/// One entry of the lexer's mode stack.
///
/// Host code, the inside of a tag and markup content have different
/// alphabets, so the lexer tracks where it is. Captures (`{...}`) inside
/// tags and content push a fresh `Code` frame that pops at its matching `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Host code. `depth` counts unmatched `{` opened inside this frame.
    Code { depth: u32 },
    /// Between `<` and `>` of an opening tag, or `</` and `>` of a closing one.
    Tag { closing: bool },
    /// Between an opening tag's `>` and the next `</`.
    Content,
}

/// The Nitro lexer. Converts source text into a stream of tokens.
///
/// Implements `Iterator<Item = Token>`; the final item is always `Eof`.
/// Whitespace is skipped, never tokenized.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    modes: Vec<Mode>,
    emitted_eof: bool,
    /// Whether the previous token was a `/` in host code, in which case the
    /// next word is a path segment and uses the URL alphabet.
    after_slash: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            modes: vec![Mode::Code { depth: 0 }],
            emitted_eof: false,
            after_slash: false,
        }
    }

    /// Tokenize the entire source into a `Vec<Token>`, including the final `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Code { depth: 0 })
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.cursor.pos();
        if self.cursor.peek().is_none() {
            return Token::new(TokenKind::Eof, start, start);
        }
        match self.mode() {
            Mode::Code { .. } => self.code_token(start),
            Mode::Tag { closing } => self.tag_token(start, closing),
            Mode::Content => self.content_token(start),
        }
    }

    // ── Host code ─────────────────────────────────────────────────────

    fn code_token(&mut self, start: u32) -> Token {
        let path_segment = std::mem::take(&mut self.after_slash);
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };
        match c {
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            '=' => self.single_char_token(TokenKind::Eq, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '{' => {
                if let Some(Mode::Code { depth }) = self.modes.last_mut() {
                    *depth += 1;
                }
                self.single_char_token(TokenKind::LBrace, start)
            }
            '}' => {
                self.close_brace();
                self.single_char_token(TokenKind::RBrace, start)
            }
            '/' => {
                self.after_slash = true;
                self.single_char_token(TokenKind::Slash, start)
            }
            '<' => {
                self.modes.push(Mode::Tag { closing: false });
                self.single_char_token(TokenKind::LAngle, start)
            }
            '"' => self.lex_string(start),
            '\'' => self.lex_sql_string(start),
            '0'..='9' => {
                self.cursor.eat_while(|c| c.is_ascii_digit());
                Token::new(TokenKind::IntLiteral, start, self.cursor.pos())
            }
            '_' if self.cursor.starts_with(RAW_PREFIX) => self.lex_raw_line(start),
            c if c.is_ascii_alphabetic() => {
                if path_segment {
                    self.lex_url_word(start)
                } else {
                    self.lex_ident(start)
                }
            }
            _ => self.single_char_token(TokenKind::Error, start),
        }
    }

    /// A `}` either closes a nested block of the current code frame or, at
    /// depth zero inside a capture, ends the capture and returns to the
    /// surrounding markup.
    fn close_brace(&mut self) {
        let nested = self.modes.len() > 1;
        match self.modes.last_mut() {
            Some(Mode::Code { depth }) if *depth > 0 => *depth -= 1,
            Some(Mode::Code { .. }) if nested => {
                self.modes.pop();
            }
            _ => {}
        }
    }

    // ── Tags ───────────────────────────────────────────────────────────

    fn tag_token(&mut self, start: u32, closing: bool) -> Token {
        match self.cursor.peek() {
            Some('>') => {
                self.modes.pop();
                if !closing {
                    self.modes.push(Mode::Content);
                }
                self.single_char_token(TokenKind::RAngle, start)
            }
            Some('/') if self.cursor.peek_next() == Some('>') => {
                self.modes.pop();
                self.cursor.advance_by(2);
                Token::new(TokenKind::SlashRAngle, start, self.cursor.pos())
            }
            Some('=') => self.single_char_token(TokenKind::Eq, start),
            Some('"') => self.lex_string(start),
            Some('{') => {
                self.modes.push(Mode::Code { depth: 0 });
                self.single_char_token(TokenKind::LBrace, start)
            }
            Some(c) if c.is_ascii_alphabetic() => self.lex_url_word(start),
            _ => self.single_char_token(TokenKind::Error, start),
        }
    }

    // ── Markup content ────────────────────────────────────────────────

    fn content_token(&mut self, start: u32) -> Token {
        match self.cursor.peek() {
            Some('<') if self.cursor.peek_next() == Some('/') => {
                self.modes.pop();
                self.modes.push(Mode::Tag { closing: true });
                self.cursor.advance_by(2);
                Token::new(TokenKind::LAngleSlash, start, self.cursor.pos())
            }
            Some('<') => {
                self.modes.push(Mode::Tag { closing: false });
                self.single_char_token(TokenKind::LAngle, start)
            }
            Some('{') => {
                self.modes.push(Mode::Code { depth: 0 });
                self.single_char_token(TokenKind::LBrace, start)
            }
            Some('"') if self.cursor.rest()[1..].contains('"') => self.lex_string(start),
            _ => {
                self.cursor.eat_while(|c| c != '<' && c != '{');
                Token::new(TokenKind::Text, start, self.cursor.pos())
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn skip_whitespace(&mut self) {
        self.cursor
            .eat_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// `"..."`. An unterminated string swallows the rest of the input as an
    /// `Error` token.
    fn lex_string(&mut self, start: u32) -> Token {
        self.lex_quoted(start, '"', TokenKind::StringLiteral)
    }

    fn lex_sql_string(&mut self, start: u32) -> Token {
        self.lex_quoted(start, '\'', TokenKind::SqlString)
    }

    fn lex_quoted(&mut self, start: u32, quote: char, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(|c| c != quote);
        if self.cursor.advance().is_none() {
            return Token::new(TokenKind::Error, start, self.cursor.pos());
        }
        Token::new(kind, start, self.cursor.pos())
    }

    /// `__go__` + blanks + rest of line. Without the separating blank the
    /// prefix is an error token.
    fn lex_raw_line(&mut self, start: u32) -> Token {
        self.cursor.advance_by(RAW_PREFIX.len());
        if !matches!(self.cursor.peek(), Some(' ' | '\t')) {
            return Token::new(TokenKind::Error, start, self.cursor.pos());
        }
        self.cursor.eat_while(|c| c != '\n');
        Token::new(TokenKind::RawLine, start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }

    /// Path segments and tag/attribute names. Keywords are not recognised
    /// here, so `/for` is a plain segment.
    fn lex_url_word(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor
            .eat_while(|c| is_ident_continue(c) || c == '-' || c == '~');
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = if text.contains(['-', '~']) {
            TokenKind::UrlIdent
        } else {
            TokenKind::Ident
        };
        Token::new(kind, start, self.cursor.pos())
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds("  \n\t"), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("func let letter for in struct select"),
            vec![
                TokenKind::Func,
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Struct,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn path_segments_use_url_alphabet() {
        assert_eq!(
            kinds("/my-page/{id}/for"),
            vec![
                TokenKind::Slash,
                TokenKind::UrlIdent,
                TokenKind::Slash,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn raw_line_runs_to_end_of_line() {
        let tokens = Lexer::tokenize("__go__ fmt.Println(1)\nx");
        assert_eq!(tokens[0].kind, TokenKind::RawLine);
        assert_eq!(tokens[0].span.end, 21);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn raw_prefix_without_blank_is_error() {
        assert_eq!(kinds("__go__x")[0], TokenKind::Error);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn sql_string() {
        assert_eq!(kinds("'a b'"), vec![TokenKind::SqlString, TokenKind::Eof]);
    }

    #[test]
    fn markup_text_and_capture() {
        assert_eq!(
            kinds("<p>hi {name}!</p>"),
            vec![
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Text,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::Text,
                TokenKind::LAngleSlash,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn self_closing_tag_returns_to_code() {
        assert_eq!(
            kinds("<br /> x"),
            vec![
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::SlashRAngle,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn nested_braces_inside_capture() {
        // The loop body's braces must not end the capture early.
        assert_eq!(
            kinds("<ul>{for x in xs {x}}</ul>"),
            vec![
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::LBrace,
                TokenKind::For,
                TokenKind::Ident,
                TokenKind::In,
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::RBrace,
                TokenKind::LAngleSlash,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_quote_in_content_is_text() {
        assert_eq!(
            kinds("<p>it\"s</p>"),
            vec![
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Text,
                TokenKind::LAngleSlash,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn stray_close_brace_at_top_level_is_kept() {
        assert_eq!(kinds("}"), vec![TokenKind::RBrace, TokenKind::Eof]);
    }
}
