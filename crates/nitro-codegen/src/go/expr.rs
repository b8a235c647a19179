//! Host expressions and statements.
//!
//! The source language has no types and little syntax, so expressions map
//! almost one to one onto Go. A block, `let` or loop in value position
//! becomes an immediately invoked `func() any`.

use crate::ir::Expr;
use crate::lower::{LowerError, Pass};

use super::writer::{quote, GoWriter};

pub(crate) fn expr(e: &Expr) -> Result<String, LowerError> {
    Ok(match e {
        Expr::Str(text) => quote(text),
        Expr::Int(n) => n.to_string(),
        Expr::Ident(name) => name.clone(),
        Expr::Raw(code) => code.clone(),
        Expr::Group(inner) => format!("({})", expr(inner)?),
        Expr::Index { base, index } => format!("{}[{}]", expr(base)?, expr(index)?),
        Expr::Dot { lhs, rhs } => format!("{}.{}", expr(lhs)?, expr(rhs)?),
        Expr::Call { callee, args } => format!("{callee}({})", args_list(args)?),
        Expr::Block(es) => immediate(es)?,
        Expr::Let { .. } | Expr::For(_) => immediate(std::slice::from_ref(e))?,
        Expr::Markup(_) | Expr::Select(_) => {
            return Err(LowerError::internal(
                Pass::Codegen,
                e.describe(),
                "must be lowered before code generation",
            ))
        }
    })
}

pub(crate) fn args_list(args: &[Expr]) -> Result<String, LowerError> {
    Ok(args.iter().map(expr).collect::<Result<Vec<_>, _>>()?.join(", "))
}

/// `func() any { ... }()` returning the last expression of `body`.
fn immediate(body: &[Expr]) -> Result<String, LowerError> {
    let mut w = GoWriter::new();
    w.open("func() any {");
    returning(&mut w, body)?;
    w.close("}()");
    Ok(w.finish().trim_end().to_string())
}

/// Whether `e` produces a value that can be returned.
pub(crate) fn is_value(e: &Expr) -> bool {
    !matches!(
        e,
        Expr::Let { .. } | Expr::Raw(_) | Expr::For(_) | Expr::Block(_)
    )
}

pub(crate) fn statement(w: &mut GoWriter, e: &Expr) -> Result<(), LowerError> {
    match e {
        Expr::Let { name, value } => {
            w.line(&format!("{name} := {}", expr(value)?));
            w.line(&format!("_ = {name}"));
        }
        Expr::Raw(code) => w.line(code),
        Expr::Block(es) => {
            w.open("{");
            statements(w, es)?;
            w.close("}");
        }
        Expr::For(l) => {
            w.open(&format!(
                "for _, {} := range {} {{",
                l.binding,
                expr(&l.iterable)?
            ));
            w.line(&format!("_ = {}", l.binding));
            match l.body.as_ref() {
                Expr::Block(es) => statements(w, es)?,
                body => statement(w, body)?,
            }
            w.close("}");
        }
        _ => w.line(&format!("_ = {}", expr(e)?)),
    }
    Ok(())
}

pub(crate) fn statements(w: &mut GoWriter, es: &[Expr]) -> Result<(), LowerError> {
    for e in es {
        statement(w, e)?;
    }
    Ok(())
}

/// Statements of `body`, returning the last one if it is a value.
pub(crate) fn returning(w: &mut GoWriter, body: &[Expr]) -> Result<(), LowerError> {
    match body.split_last() {
        Some((last, init)) if is_value(last) => {
            statements(w, init)?;
            w.line(&format!("return {}", expr(last)?));
        }
        _ => {
            statements(w, body)?;
            w.line("return nil");
        }
    }
    Ok(())
}
