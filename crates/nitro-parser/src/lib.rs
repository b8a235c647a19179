//! Nitro parser: recursive descent over the token stream, producing a
//! rowan-based CST.
//!
//! One grammar covers the four sub-languages of a Nitro file (host code,
//! markup, SQL selects and HTTP routes). [`parse`] lexes and parses a whole
//! file; [`ast`] layers typed accessors over the resulting tree.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

use ast::item::SourceFile;
use ast::AstNode;

/// Result of parsing a Nitro source file.
///
/// Parsing stops at the first error, so `errors` holds at most one entry.
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed root of the tree.
    pub fn tree(&self) -> Option<SourceFile> {
        SourceFile::cast(self.syntax())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn parse(source: &str) -> Parse {
    let tokens = nitro_lexer::Lexer::tokenize(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, errors) = p.build_tree();
    Parse { green, errors }
}

/// Render a tree as indented `KIND` lines, tokens followed by their text.
/// Used by snapshot tests.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_tree(&mut out, &SyntaxElement::Node(node.clone()), 0);
    out
}

fn write_tree(out: &mut String, element: &SyntaxElement, depth: usize) {
    let indent = "  ".repeat(depth);
    match element {
        SyntaxElement::Node(node) => {
            out.push_str(&format!("{indent}{:?}\n", node.kind()));
            for child in node.children_with_tokens() {
                write_tree(out, &child, depth + 1);
            }
        }
        SyntaxElement::Token(token) => {
            out.push_str(&format!("{indent}{:?} {:?}\n", token.kind(), token.text()));
        }
    }
}
