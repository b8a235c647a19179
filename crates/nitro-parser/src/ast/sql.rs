//! `select` statement nodes.

use crate::ast::markup::Capture;
use crate::ast::{ast_node, child_node, child_nodes, first_token_text, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

ast_node!(SelectExpr, SELECT_EXPR);

impl SelectExpr {
    pub fn selections(&self) -> impl Iterator<Item = SqlSelection> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn from_clause(&self) -> Option<SqlFrom> {
        child_node(&self.syntax)
    }

    pub fn where_clause(&self) -> Option<SqlWhere> {
        child_node(&self.syntax)
    }
}

ast_node!(SqlSelection, SQL_SELECTION);

impl SqlSelection {
    pub fn value(&self) -> Option<SqlValue> {
        self.syntax.children().find_map(SqlValue::cast)
    }

    pub fn alias(&self) -> Option<String> {
        alias_of(&self.syntax)
    }
}

fn alias_of(node: &SyntaxNode) -> Option<String> {
    node.children()
        .find(|n| n.kind() == SyntaxKind::SQL_ALIAS)
        .and_then(|n| first_token_text(&n))
}

#[derive(Debug, Clone)]
pub enum SqlValue {
    /// `'text'`, kept with its quotes.
    Literal(String),
    Column(SqlColumn),
    Capture(Capture),
}

impl SqlValue {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::SQL_LITERAL => first_token_text(&node).map(SqlValue::Literal),
            SyntaxKind::SQL_COLUMN => Some(SqlValue::Column(SqlColumn { syntax: node })),
            SyntaxKind::CAPTURE => Capture::cast(node).map(SqlValue::Capture),
            _ => None,
        }
    }
}

ast_node!(SqlColumn, SQL_COLUMN);

impl SqlColumn {
    fn idents(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }

    pub fn table(&self) -> Option<String> {
        let mut idents = self.idents();
        (idents.len() == 2).then(|| idents.swap_remove(0))
    }

    pub fn name(&self) -> Option<String> {
        self.idents().pop()
    }
}

ast_node!(SqlFrom, SQL_FROM);

impl SqlFrom {
    pub fn table(&self) -> Option<String> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::SQL_TABLE)
            .and_then(|n| first_token_text(&n))
    }

    pub fn alias(&self) -> Option<String> {
        alias_of(&self.syntax)
    }
}

ast_node!(SqlWhere, SQL_WHERE);

impl SqlWhere {
    pub fn column(&self) -> Option<SqlValue> {
        self.syntax.children().filter_map(SqlValue::cast).next()
    }

    pub fn value(&self) -> Option<SqlValue> {
        self.syntax.children().filter_map(SqlValue::cast).nth(1)
    }
}
