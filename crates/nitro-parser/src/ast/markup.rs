//! Markup nodes.

use crate::ast::expr::Expr;
use crate::ast::{ast_node, child_token, first_token_text, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

ast_node!(MarkupElement, MARKUP_ELEMENT);

impl MarkupElement {
    /// Opening tag name; `None` for a fragment `<>...</>`.
    pub fn tag(&self) -> Option<String> {
        tag_name(&self.syntax)
    }

    pub fn attrs(&self) -> impl Iterator<Item = Attr> + '_ {
        self.syntax.children().filter_map(Attr::cast)
    }

    pub fn children(&self) -> impl Iterator<Item = MarkupChild> + '_ {
        self.syntax.children().filter_map(MarkupChild::cast)
    }

    /// Closing tag name as written, if any. Never checked against `tag()`.
    pub fn close_tag(&self) -> Option<String> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::CLOSE_TAG)
            .and_then(|n| child_token(&n, SyntaxKind::IDENT))
            .map(|t| t.text().to_string())
    }
}

ast_node!(MarkupSelfClosing, MARKUP_SELF_CLOSING);

impl MarkupSelfClosing {
    pub fn tag(&self) -> Option<String> {
        tag_name(&self.syntax)
    }

    pub fn attrs(&self) -> impl Iterator<Item = Attr> + '_ {
        self.syntax.children().filter_map(Attr::cast)
    }
}

fn tag_name(node: &SyntaxNode) -> Option<String> {
    node.children()
        .find(|n| n.kind() == SyntaxKind::TAG_NAME)
        .and_then(|n| first_token_text(&n))
}

ast_node!(Attr, ATTR);

impl Attr {
    pub fn name(&self) -> Option<String> {
        first_token_text(&self.syntax)
    }

    pub fn value(&self) -> Option<AttrValue> {
        if let Some(capture) = self.syntax.children().find_map(Capture::cast) {
            return Some(AttrValue::Capture(capture));
        }
        child_token(&self.syntax, SyntaxKind::STRING).map(|t| AttrValue::Literal(unquote(t.text())))
    }
}

#[derive(Debug, Clone)]
pub enum AttrValue {
    /// Unquoted contents of `"..."`.
    Literal(String),
    Capture(Capture),
}

ast_node!(Capture, CAPTURE);

impl Capture {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

#[derive(Debug, Clone)]
pub enum MarkupChild {
    Element(MarkupElement),
    SelfClosing(MarkupSelfClosing),
    /// A raw text run, untrimmed.
    Text(String),
    /// A quoted string child, unquoted.
    Str(String),
    Capture(Capture),
}

impl MarkupChild {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::MARKUP_ELEMENT => Some(MarkupChild::Element(MarkupElement { syntax: node })),
            SyntaxKind::MARKUP_SELF_CLOSING => {
                Some(MarkupChild::SelfClosing(MarkupSelfClosing { syntax: node }))
            }
            SyntaxKind::MARKUP_TEXT => first_token_text(&node).map(MarkupChild::Text),
            SyntaxKind::MARKUP_STRING => {
                first_token_text(&node).map(|s| MarkupChild::Str(unquote(&s)))
            }
            SyntaxKind::CAPTURE => Some(MarkupChild::Capture(Capture { syntax: node })),
            _ => None,
        }
    }
}

/// Strip one pair of surrounding quotes (`"` or `'`).
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix(['"', '\''])
        .and_then(|t| t.strip_suffix(['"', '\'']))
        .unwrap_or(text);
    inner.to_string()
}
