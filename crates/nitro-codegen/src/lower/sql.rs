//! SQL lowering.
//!
//! Every `select` becomes a record struct, a query method on the database
//! handle, and a call to that method at the original site. Captured values
//! become positional parameters (`$1`, `$2`, ...) in the order they appear:
//! selections, then the where clause.

use tracing::trace;

use crate::ir::*;

use super::{LowerError, NameSource, Pass};

/// Replace every select in `module` with a query call.
///
/// Generated records and queries are placed ahead of the original
/// definitions, in the order the selects were found.
pub fn lower_sql(module: &Module, names: &mut NameSource) -> Result<Module, LowerError> {
    let mut lowerer = SqlLowerer {
        names,
        generated: Vec::new(),
    };
    let rewritten = module
        .definitions
        .iter()
        .map(|def| lowerer.definition(def))
        .collect::<Result<Vec<_>, _>>()?;

    let mut definitions = lowerer.generated;
    definitions.extend(rewritten);
    Ok(Module { definitions })
}

struct SqlLowerer<'a> {
    names: &'a mut NameSource,
    generated: Vec<Definition>,
}

impl SqlLowerer<'_> {
    fn definition(&mut self, def: &Definition) -> Result<Definition, LowerError> {
        Ok(match def {
            Definition::Function(f) => Definition::Function(FunctionDef {
                body: self.expr(&f.body)?,
                ..f.clone()
            }),
            Definition::Http(h) => Definition::Http(HttpDef {
                setup: self.exprs(&h.setup)?,
                ops: self.ops(&h.ops)?,
                ..h.clone()
            }),
            Definition::Component(c) => Definition::Component(ComponentDef {
                setup: self.exprs(&c.setup)?,
                ops: self.ops(&c.ops)?,
                ..c.clone()
            }),
            Definition::Struct(_) | Definition::Query(_) => def.clone(),
        })
    }

    fn exprs(&mut self, es: &[Expr]) -> Result<Vec<Expr>, LowerError> {
        es.iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&mut self, e: &Expr) -> Result<Box<Expr>, LowerError> {
        Ok(Box::new(self.expr(e)?))
    }

    fn expr(&mut self, e: &Expr) -> Result<Expr, LowerError> {
        Ok(match e {
            Expr::Select(select) => self.select(select)?,
            Expr::Block(es) => Expr::Block(self.exprs(es)?),
            Expr::Let { name, value } => Expr::Let {
                name: name.clone(),
                value: self.boxed(value)?,
            },
            Expr::Group(inner) => Expr::Group(self.boxed(inner)?),
            Expr::Index { base, index } => Expr::Index {
                base: self.boxed(base)?,
                index: self.boxed(index)?,
            },
            Expr::Dot { lhs, rhs } => Expr::Dot {
                lhs: self.boxed(lhs)?,
                rhs: self.boxed(rhs)?,
            },
            Expr::For(l) => Expr::For(ForLoop {
                binding: l.binding.clone(),
                iterable: self.boxed(&l.iterable)?,
                body: self.boxed(&l.body)?,
            }),
            Expr::Call { callee, args } => Expr::Call {
                callee: callee.clone(),
                args: self.exprs(args)?,
            },
            Expr::Markup(m) => Expr::Markup(self.markup(m)?),
            Expr::Str(_) | Expr::Int(_) | Expr::Ident(_) | Expr::Raw(_) => e.clone(),
        })
    }

    fn markup(&mut self, m: &Markup) -> Result<Markup, LowerError> {
        Ok(match m {
            Markup::Element(el) => Markup::Element(Element {
                attributes: self.attributes(&el.attributes)?,
                children: el
                    .children
                    .iter()
                    .map(|child| {
                        Ok(match child {
                            MarkupChild::Markup(m) => MarkupChild::Markup(self.markup(m)?),
                            MarkupChild::Capture(e) => MarkupChild::Capture(self.expr(e)?),
                            MarkupChild::Text(_) | MarkupChild::Str(_) => child.clone(),
                        })
                    })
                    .collect::<Result<_, LowerError>>()?,
                ..el.clone()
            }),
            Markup::SelfClosing(sc) => Markup::SelfClosing(SelfClosing {
                tag: sc.tag.clone(),
                attributes: self.attributes(&sc.attributes)?,
            }),
        })
    }

    fn attributes(&mut self, attributes: &[Attribute]) -> Result<Vec<Attribute>, LowerError> {
        attributes
            .iter()
            .map(|attr| {
                Ok(Attribute {
                    name: attr.name.clone(),
                    value: match &attr.value {
                        AttrValue::Capture(e) => AttrValue::Capture(self.expr(e)?),
                        AttrValue::Literal(_) => attr.value.clone(),
                    },
                })
            })
            .collect()
    }

    fn ops(&mut self, ops: &[EmissionOp]) -> Result<Vec<EmissionOp>, LowerError> {
        ops.iter()
            .map(|op| {
                Ok(match op {
                    EmissionOp::BindComponent { name, args } => EmissionOp::BindComponent {
                        name: name.clone(),
                        args: self.exprs(args)?,
                    },
                    EmissionOp::ForEach {
                        binding,
                        iterable,
                        body,
                    } => EmissionOp::ForEach {
                        binding: binding.clone(),
                        iterable: self.expr(iterable)?,
                        body: self.ops(body)?,
                    },
                    _ => op.clone(),
                })
            })
            .collect()
    }

    fn select(&mut self, select: &Select) -> Result<Expr, LowerError> {
        let function = self.names.temp("query");
        let record = self.names.temp("record");

        let mut captures: Vec<&Expr> = Vec::new();
        let mut columns: Vec<String> = Vec::new();
        let mut rendered = Vec::new();
        for (i, selection) in select.selections.iter().enumerate() {
            let column = column_name(i, selection)?;
            if columns.contains(&column) {
                return Err(LowerError::unsupported(
                    Pass::Sql,
                    format!("duplicate result column `{column}`"),
                ));
            }
            let value = render_value(&selection.value, &mut captures);
            rendered.push(match &selection.alias {
                Some(alias) => format!("{value} as {alias}"),
                None => value,
            });
            columns.push(column);
        }

        let mut sql = format!("select {}", rendered.join(","));
        if let Some(from) = &select.from {
            sql.push_str(" from ");
            sql.push_str(&from.table);
            if let Some(alias) = &from.alias {
                sql.push_str(" as ");
                sql.push_str(alias);
            }
        }
        if let Some(filter) = &select.filter {
            if let SqlValue::Capture(e) = &filter.column {
                return Err(LowerError::internal(
                    Pass::Sql,
                    e.describe(),
                    "a captured value cannot stand in the column position of a where clause",
                ));
            }
            let column = render_value(&filter.column, &mut captures);
            let value = render_value(&filter.value, &mut captures);
            sql.push_str(&format!(" where {column} = {value}"));
        }

        trace!(%function, %record, %sql, "lowered select");
        self.generated.push(Definition::Struct(StructDef {
            name: record.clone(),
            fields: columns
                .iter()
                .map(|name| Field {
                    name: name.clone(),
                    ty: "string".to_string(),
                })
                .collect(),
        }));
        self.generated.push(Definition::Query(QueryDef {
            name: function.clone(),
            record,
            parameters: (1..=captures.len()).map(|n| format!("arg{n}")).collect(),
            sql,
            columns,
        }));

        // Captured expressions may hold selects of their own; their
        // definitions follow this one.
        let args = captures
            .into_iter()
            .map(|e| self.expr(e))
            .collect::<Result<_, _>>()?;
        Ok(Expr::Call {
            callee: format!("db.{function}"),
            args,
        })
    }
}

/// The record field a selection fills: its alias, else the column name,
/// else `column{i}` for a literal.
fn column_name(i: usize, selection: &Selection) -> Result<String, LowerError> {
    if let Some(alias) = &selection.alias {
        return Ok(alias.clone());
    }
    match &selection.value {
        SqlValue::Column { name, .. } => Ok(name.clone()),
        SqlValue::Str(_) => Ok(format!("column{i}")),
        SqlValue::Capture(e) => Err(LowerError::internal(
            Pass::Sql,
            e.describe(),
            "a captured selection needs an `as` alias to name its column",
        )),
    }
}

fn render_value<'a>(value: &'a SqlValue, captures: &mut Vec<&'a Expr>) -> String {
    match value {
        SqlValue::Str(text) => text.clone(),
        SqlValue::Column {
            table: Some(table),
            name,
        } => format!("{table}.{name}"),
        SqlValue::Column { table: None, name } => name.clone(),
        SqlValue::Capture(e) => {
            captures.push(e);
            format!("${}", captures.len())
        }
    }
}
