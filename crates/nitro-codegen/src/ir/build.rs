//! CST to IR conversion.
//!
//! The parser stops at the first error, so this only ever sees a complete
//! tree. A missing piece here is a parser bug, reported as an internal
//! error of the parse pass rather than a panic.

use nitro_parser::ast::expr as ast;
use nitro_parser::ast::item::{self, SourceFile};
use nitro_parser::ast::markup::{self as ast_markup, unquote};
use nitro_parser::ast::sql as ast_sql;
use nitro_parser::SyntaxKind;

use crate::lower::{LowerError, Pass};
use crate::CompileError;

use super::*;

/// Parse `source` and convert it to a [`Module`].
///
/// # Errors
///
/// Returns the first syntax error, or an internal error if the tree is
/// incomplete.
pub fn parse_module(source: &str) -> Result<Module, CompileError> {
    let parse = nitro_parser::parse(source);
    if let Some(err) = parse.errors().first() {
        return Err(CompileError::Syntax(err.clone()));
    }
    let tree = parse.tree().ok_or_else(|| missing("source file"))?;
    Ok(build_module(&tree)?)
}

pub fn build_module(tree: &SourceFile) -> Result<Module, LowerError> {
    let definitions = tree
        .definitions()
        .map(|def| definition(&def))
        .collect::<Result<_, _>>()?;
    Ok(Module { definitions })
}

fn missing(node: &str) -> LowerError {
    LowerError::internal(Pass::Parse, node, "incomplete syntax tree")
}

fn definition(def: &item::Definition) -> Result<Definition, LowerError> {
    match def {
        item::Definition::FnDef(f) => {
            let name = f.name().and_then(|n| n.text()).ok_or_else(|| missing("function name"))?;
            let parameters = f
                .param_list()
                .map(|list| list.params().filter_map(|p| p.text()).collect())
                .unwrap_or_default();
            let body = expr(&f.body().ok_or_else(|| missing("function body"))?)?;
            Ok(Definition::Function(FunctionDef {
                name,
                parameters,
                body,
            }))
        }
        item::Definition::HttpDef(h) => {
            let verb = h
                .verb()
                .as_deref()
                .and_then(Verb::from_keyword)
                .ok_or_else(|| missing("HTTP verb"))?;
            let path = h
                .path()
                .ok_or_else(|| missing("route path"))?
                .segments()
                .map(|segment| match segment {
                    item::PathSegment::Literal(text) => Ok(PathSegment::Literal(text)),
                    item::PathSegment::Wildcard(name) => name
                        .map(PathSegment::Wildcard)
                        .ok_or_else(|| missing("wildcard name")),
                })
                .collect::<Result<_, _>>()?;
            let body = expr(&h.body().ok_or_else(|| missing("handler body"))?)?;
            let setup = match body {
                Expr::Block(exprs) => exprs,
                other => vec![other],
            };
            Ok(Definition::Http(HttpDef {
                verb,
                path,
                setup,
                ops: Vec::new(),
            }))
        }
        item::Definition::StructDef(s) => {
            let name = s.name().and_then(|n| n.text()).ok_or_else(|| missing("struct name"))?;
            let fields = s
                .fields()
                .map(|field| {
                    Ok(Field {
                        name: field
                            .name()
                            .and_then(|n| n.text())
                            .ok_or_else(|| missing("field name"))?,
                        ty: field.type_name().ok_or_else(|| missing("field type"))?,
                    })
                })
                .collect::<Result<_, LowerError>>()?;
            Ok(Definition::Struct(StructDef { name, fields }))
        }
    }
}

fn boxed(e: Option<ast::Expr>, what: &str) -> Result<Box<Expr>, LowerError> {
    Ok(Box::new(expr(&e.ok_or_else(|| missing(what))?)?))
}

fn expr(e: &ast::Expr) -> Result<Expr, LowerError> {
    Ok(match e {
        ast::Expr::Block(b) => Expr::Block(b.exprs().map(|e| expr(&e)).collect::<Result<_, _>>()?),
        ast::Expr::LetExpr(l) => Expr::Let {
            name: l.name().and_then(|n| n.text()).ok_or_else(|| missing("let name"))?,
            value: boxed(l.value(), "let value")?,
        },
        ast::Expr::DotExpr(d) => Expr::Dot {
            lhs: boxed(d.lhs(), "member base")?,
            rhs: boxed(d.rhs(), "member")?,
        },
        ast::Expr::IndexExpr(i) => Expr::Index {
            base: boxed(i.base(), "index base")?,
            index: boxed(i.index(), "index")?,
        },
        ast::Expr::Literal(lit) => {
            let token = lit.token().ok_or_else(|| missing("literal"))?;
            match token.kind() {
                SyntaxKind::INT_NUMBER => Expr::Int(
                    token
                        .text()
                        .parse()
                        .map_err(|_| missing("integer literal"))?,
                ),
                _ => Expr::Str(unquote(token.text())),
            }
        }
        ast::Expr::RawExpr(r) => Expr::Raw(r.code().ok_or_else(|| missing("raw line"))?),
        ast::Expr::ParenExpr(p) => Expr::Group(boxed(p.expr(), "parenthesized expression")?),
        ast::Expr::NameRef(n) => Expr::Ident(n.text().ok_or_else(|| missing("name"))?),
        ast::Expr::ForExpr(f) => Expr::For(ForLoop {
            binding: f
                .binding()
                .and_then(|n| n.text())
                .ok_or_else(|| missing("loop variable"))?,
            iterable: boxed(f.iterable(), "loop iterable")?,
            body: boxed(f.body(), "loop body")?,
        }),
        ast::Expr::MarkupElement(el) => Expr::Markup(element(el)?),
        ast::Expr::MarkupSelfClosing(sc) => Expr::Markup(self_closing(sc)?),
        ast::Expr::SelectExpr(s) => Expr::Select(select(s)?),
    })
}

// ── Markup ───────────────────────────────────────────────────────────────

fn element(el: &ast_markup::MarkupElement) -> Result<Markup, LowerError> {
    Ok(Markup::Element(Element {
        tag: el.tag(),
        close_tag: el.close_tag(),
        attributes: el.attrs().map(|a| attribute(&a)).collect::<Result<_, _>>()?,
        children: el
            .children()
            .map(|c| child(&c))
            .collect::<Result<_, _>>()?,
    }))
}

fn self_closing(sc: &ast_markup::MarkupSelfClosing) -> Result<Markup, LowerError> {
    Ok(Markup::SelfClosing(SelfClosing {
        tag: sc.tag().ok_or_else(|| missing("tag name"))?,
        attributes: sc.attrs().map(|a| attribute(&a)).collect::<Result<_, _>>()?,
    }))
}

fn attribute(attr: &ast_markup::Attr) -> Result<Attribute, LowerError> {
    let name = attr.name().ok_or_else(|| missing("attribute name"))?;
    let value = match attr.value().ok_or_else(|| missing("attribute value"))? {
        ast_markup::AttrValue::Literal(text) => AttrValue::Literal(text),
        ast_markup::AttrValue::Capture(c) => AttrValue::Capture(capture(&c)?),
    };
    Ok(Attribute { name, value })
}

fn capture(c: &ast_markup::Capture) -> Result<Expr, LowerError> {
    expr(&c.expr().ok_or_else(|| missing("capture"))?)
}

fn child(c: &ast_markup::MarkupChild) -> Result<MarkupChild, LowerError> {
    Ok(match c {
        ast_markup::MarkupChild::Element(el) => MarkupChild::Markup(element(el)?),
        ast_markup::MarkupChild::SelfClosing(sc) => MarkupChild::Markup(self_closing(sc)?),
        ast_markup::MarkupChild::Text(text) => MarkupChild::Text(text.clone()),
        ast_markup::MarkupChild::Str(text) => MarkupChild::Str(text.clone()),
        ast_markup::MarkupChild::Capture(c) => MarkupChild::Capture(capture(c)?),
    })
}

// ── SQL ──────────────────────────────────────────────────────────────────

fn select(s: &ast_sql::SelectExpr) -> Result<Select, LowerError> {
    let selections = s
        .selections()
        .map(|sel| {
            Ok(Selection {
                value: sql_value(sel.value())?,
                alias: sel.alias(),
            })
        })
        .collect::<Result<_, LowerError>>()?;
    let from = s
        .from_clause()
        .map(|from| {
            Ok::<_, LowerError>(FromClause {
                table: from.table().ok_or_else(|| missing("table name"))?,
                alias: from.alias(),
            })
        })
        .transpose()?;
    let filter = s
        .where_clause()
        .map(|w| {
            Ok::<_, LowerError>(WhereClause {
                column: sql_value(w.column())?,
                value: sql_value(w.value())?,
            })
        })
        .transpose()?;
    Ok(Select {
        selections,
        from,
        filter,
    })
}

fn sql_value(value: Option<ast_sql::SqlValue>) -> Result<SqlValue, LowerError> {
    Ok(match value.ok_or_else(|| missing("SQL value"))? {
        ast_sql::SqlValue::Literal(text) => SqlValue::Str(text),
        ast_sql::SqlValue::Column(col) => SqlValue::Column {
            table: col.table(),
            name: col.name().ok_or_else(|| missing("column name"))?,
        },
        ast_sql::SqlValue::Capture(c) => SqlValue::Capture(Box::new(capture(&c)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(source: &str) -> Module {
        parse_module(source).unwrap()
    }

    #[test]
    fn route_body_becomes_setup() {
        let m = module("get /users/{id} () { let x = id x }");
        let Definition::Http(h) = &m.definitions[0] else {
            panic!("expected a route");
        };
        assert_eq!(h.verb, Verb::Get);
        assert_eq!(
            h.path,
            vec![
                PathSegment::Literal("users".into()),
                PathSegment::Wildcard("id".into())
            ]
        );
        assert_eq!(h.setup.len(), 2);
        assert!(h.ops.is_empty());
    }

    #[test]
    fn literals_are_unquoted() {
        let m = module(r#"func f() { "hi" 42 }"#);
        let Definition::Function(f) = &m.definitions[0] else {
            panic!("expected a function");
        };
        assert_eq!(
            f.body,
            Expr::Block(vec![Expr::Str("hi".into()), Expr::Int(42)])
        );
    }

    #[test]
    fn markup_keeps_both_tag_names() {
        let m = module("func f() <div>hi</span>");
        let Definition::Function(f) = &m.definitions[0] else {
            panic!("expected a function");
        };
        let Expr::Markup(Markup::Element(el)) = &f.body else {
            panic!("expected markup");
        };
        assert_eq!(el.tag.as_deref(), Some("div"));
        assert_eq!(el.close_tag.as_deref(), Some("span"));
        assert_eq!(el.children, vec![MarkupChild::Text("hi".into())]);
    }

    #[test]
    fn sql_string_keeps_quotes() {
        let m = module("func f() select 'a' as x from t");
        let Definition::Function(f) = &m.definitions[0] else {
            panic!("expected a function");
        };
        let Expr::Select(s) = &f.body else {
            panic!("expected select");
        };
        assert_eq!(s.selections[0].value, SqlValue::Str("'a'".into()));
        assert_eq!(s.selections[0].alias.as_deref(), Some("x"));
        assert_eq!(
            s.from,
            Some(FromClause {
                table: "t".into(),
                alias: None
            })
        );
    }

    #[test]
    fn syntax_error_is_returned() {
        let err = parse_module("func (").unwrap_err();
        assert!(matches!(err, CompileError::Syntax(_)));
    }
}
