//! Expression nodes.

use crate::ast::markup::{MarkupElement, MarkupSelfClosing};
use crate::ast::sql::SelectExpr;
use crate::ast::{ast_node, child_node, first_token_text, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone)]
pub enum Expr {
    Block(Block),
    LetExpr(LetExpr),
    DotExpr(DotExpr),
    IndexExpr(IndexExpr),
    Literal(Literal),
    RawExpr(RawExpr),
    ParenExpr(ParenExpr),
    NameRef(NameRef),
    ForExpr(ForExpr),
    MarkupElement(MarkupElement),
    MarkupSelfClosing(MarkupSelfClosing),
    SelectExpr(SelectExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::BLOCK => Expr::Block(Block { syntax: node }),
            SyntaxKind::LET_EXPR => Expr::LetExpr(LetExpr { syntax: node }),
            SyntaxKind::DOT_EXPR => Expr::DotExpr(DotExpr { syntax: node }),
            SyntaxKind::INDEX_EXPR => Expr::IndexExpr(IndexExpr { syntax: node }),
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::RAW_EXPR => Expr::RawExpr(RawExpr { syntax: node }),
            SyntaxKind::PAREN_EXPR => Expr::ParenExpr(ParenExpr { syntax: node }),
            SyntaxKind::NAME_REF => Expr::NameRef(NameRef { syntax: node }),
            SyntaxKind::FOR_EXPR => Expr::ForExpr(ForExpr { syntax: node }),
            SyntaxKind::MARKUP_ELEMENT => Expr::MarkupElement(MarkupElement { syntax: node }),
            SyntaxKind::MARKUP_SELF_CLOSING => {
                Expr::MarkupSelfClosing(MarkupSelfClosing { syntax: node })
            }
            SyntaxKind::SELECT_EXPR => Expr::SelectExpr(SelectExpr { syntax: node }),
            _ => return None,
        };
        Some(expr)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Block(e) => e.syntax(),
            Expr::LetExpr(e) => e.syntax(),
            Expr::DotExpr(e) => e.syntax(),
            Expr::IndexExpr(e) => e.syntax(),
            Expr::Literal(e) => e.syntax(),
            Expr::RawExpr(e) => e.syntax(),
            Expr::ParenExpr(e) => e.syntax(),
            Expr::NameRef(e) => e.syntax(),
            Expr::ForExpr(e) => e.syntax(),
            Expr::MarkupElement(e) => e.syntax(),
            Expr::MarkupSelfClosing(e) => e.syntax(),
            Expr::SelectExpr(e) => e.syntax(),
        }
    }
}

/// The `n`th child of `node` that is an expression.
fn nth_expr(node: &SyntaxNode, n: usize) -> Option<Expr> {
    node.children().filter_map(Expr::cast).nth(n)
}

// ── Names ────────────────────────────────────────────────────────────────

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> Option<String> {
        first_token_text(&self.syntax)
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> Option<String> {
        first_token_text(&self.syntax)
    }
}

// ── Compound expressions ─────────────────────────────────────────────────

ast_node!(Block, BLOCK);

impl Block {
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(LetExpr, LET_EXPR);

impl LetExpr {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn value(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(DotExpr, DOT_EXPR);

impl DotExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn base(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn index(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(ForExpr, FOR_EXPR);

impl ForExpr {
    pub fn binding(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn iterable(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn body(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

// ── Leaves ───────────────────────────────────────────────────────────────

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax.first_token()
    }
}

ast_node!(RawExpr, RAW_EXPR);

impl RawExpr {
    /// The target source text: the line after `__go__` and its blanks.
    pub fn code(&self) -> Option<String> {
        let token = self.syntax.first_token()?;
        let rest = token.text().strip_prefix(nitro_lexer::RAW_PREFIX)?;
        Some(rest.trim_start_matches([' ', '\t']).trim_end_matches('\r').to_string())
    }
}
