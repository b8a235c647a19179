//! Definitions: functions, HTTP routes, struct declarations.

use crate::ast::expr::{Expr, Name};
use crate::ast::{ast_node, child_node, child_nodes, first_token_text, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        self.syntax.children().filter_map(Definition::cast)
    }
}

#[derive(Debug, Clone)]
pub enum Definition {
    FnDef(FnDef),
    HttpDef(HttpDef),
    StructDef(StructDef),
}

impl Definition {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FN_DEF => Some(Definition::FnDef(FnDef { syntax: node })),
            SyntaxKind::HTTP_DEF => Some(Definition::HttpDef(HttpDef { syntax: node })),
            SyntaxKind::STRUCT_DEF => Some(Definition::StructDef(StructDef { syntax: node })),
            _ => None,
        }
    }
}

// ── Functions ────────────────────────────────────────────────────────────

ast_node!(FnDef, FN_DEF);

impl FnDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn text(&self) -> Option<String> {
        first_token_text(&self.syntax)
    }
}

// ── HTTP routes ──────────────────────────────────────────────────────────

ast_node!(HttpDef, HTTP_DEF);

impl HttpDef {
    /// The verb exactly as written (`get`, `post`, ...).
    pub fn verb(&self) -> Option<String> {
        first_token_text(&self.syntax)
    }

    pub fn path(&self) -> Option<RoutePath> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(RoutePath, ROUTE_PATH);

impl RoutePath {
    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.syntax.children().filter_map(PathSegment::cast)
    }
}

#[derive(Debug, Clone)]
pub enum PathSegment {
    /// A literal segment; carries its text.
    Literal(String),
    /// `{name}`; carries the wildcard name.
    Wildcard(Option<String>),
}

impl PathSegment {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::PATH_SEGMENT => first_token_text(&node).map(PathSegment::Literal),
            SyntaxKind::PATH_WILDCARD => Some(PathSegment::Wildcard(
                child_node::<Name>(&node).and_then(|n| n.text()),
            )),
            _ => None,
        }
    }
}

// ── Structs ──────────────────────────────────────────────────────────────

ast_node!(StructDef, STRUCT_DEF);

impl StructDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = StructField> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(StructField, STRUCT_FIELD);

impl StructField {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn type_name(&self) -> Option<String> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_REF)
            .and_then(|n| first_token_text(&n))
    }
}
