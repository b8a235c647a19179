//! Event-based parser for Nitro.
//!
//! Parse functions call `open()` to start a node, `advance()` to consume
//! tokens and `close()` to finish a node with its real kind. Events are
//! collected into a flat `Vec<Event>` and turned into a rowan `GreenNode` by
//! `build_tree()`. `open_before()` wraps an already completed node, which is
//! how the postfix forms (`a[i]`, `a.b`) are built.
//!
//! The parser stops at the first error: later errors are not recorded and
//! every loop bails once `has_error()` is set.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod markup;
pub(crate) mod sql;

use nitro_common::span::Span;
use nitro_common::token::Token;

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    /// Start a node. `kind` is TOMBSTONE until `close()` patches it.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    Advance,
}

/// A started but not yet closed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// A completed node, usable with `open_before()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| SyntaxKind::from(t.kind.clone()))
    }

    pub(crate) fn nth_text(&self, n: usize) -> &'src str {
        match self.tokens.get(self.pos + n) {
            Some(token) => &self.source[token.span.start as usize..token.span.end as usize],
            None => "",
        }
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.nth_text(0)
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => {
                let end = self.source.len() as u32;
                Span::new(end, end)
            }
        }
    }

    /// Span of the most recently consumed token.
    pub(crate) fn last_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::new(0, 0),
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the current token is the identifier `word`. SQL words and
    /// HTTP verbs are contextual, so they are matched by text.
    pub(crate) fn at_word(&self, word: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == word
    }

    // ── Node management ────────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a node that will become the parent of `completed`.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = self.open();
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────────

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Wrap the current token in a node of `kind`.
    pub(crate) fn advance_as(&mut self, kind: SyntaxKind) -> MarkClosed {
        let m = self.open();
        self.advance();
        self.close(m, kind)
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(&format!("expected {}", kind.describe()));
        false
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Error reporting ────────────────────────────────────────────────

    /// Record an error at the current token. Only the first error counts.
    ///
    /// When the current token is a lexer error the lexical problem is
    /// reported instead of `message`.
    pub(crate) fn error(&mut self, message: &str) {
        if self.has_error() {
            return;
        }
        let span = self.current_span();
        let message = self.lexical_error().unwrap_or(message);
        self.errors.push(ParseError::new(message, span));
    }

    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related_msg: &str) {
        if self.has_error() {
            return;
        }
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related_msg, related_span));
    }

    pub(crate) fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    fn lexical_error(&self) -> Option<&'static str> {
        if !self.at(SyntaxKind::ERROR) {
            return None;
        }
        let text = self.current_text();
        Some(if text.starts_with('"') {
            "unterminated string literal"
        } else if text.starts_with('\'') {
            "unterminated SQL string"
        } else if text.starts_with(nitro_lexer::RAW_PREFIX) {
            "expected a blank between `__go__` and the raw line"
        } else {
            "unexpected character"
        })
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert the collected events into a green tree.
    ///
    /// A node opened with `open_before()` is linked from the node it wraps
    /// through `forward_parent`; the chain is followed and the wrappers are
    /// started outermost first, then tombstoned so they are skipped later.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos = 0;
        let mut chain: Vec<SyntaxKind> = Vec::new();

        for i in 0..self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent: None,
                } => {
                    if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Open {
                    forward_parent: Some(_),
                    ..
                } => {
                    chain.clear();
                    let mut next = Some(i);
                    while let Some(idx) = next {
                        let Event::Open {
                            kind,
                            forward_parent,
                        } = &mut self.events[idx]
                        else {
                            break;
                        };
                        chain.push(std::mem::replace(kind, SyntaxKind::TOMBSTONE));
                        next = forward_parent.take();
                    }
                    for &kind in chain.iter().rev() {
                        if kind != SyntaxKind::TOMBSTONE {
                            builder.start_node(rowan::SyntaxKind(kind as u16));
                        }
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Advance => {
                    if let Some(token) = self.tokens.get(token_pos) {
                        let kind = SyntaxKind::from(token.kind.clone());
                        let text = &self.source[token.span.start as usize..token.span.end as usize];
                        builder.token(rowan::SyntaxKind(kind as u16), text);
                        token_pos += 1;
                    }
                }
            }
        }

        (builder.finish(), self.errors)
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a complete source file: definitions until EOF.
///
/// After the first error the remaining tokens are swept into one
/// ERROR_NODE so the tree still covers the whole input.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    while !p.at(SyntaxKind::EOF) && !p.has_error() {
        items::parse_definition(p);
    }

    if !p.at(SyntaxKind::EOF) {
        let rest = p.open();
        while !p.at(SyntaxKind::EOF) {
            p.advance();
        }
        p.close(rest, SyntaxKind::ERROR_NODE);
    }
    p.advance(); // EOF

    p.close(root, SyntaxKind::SOURCE_FILE);
}
