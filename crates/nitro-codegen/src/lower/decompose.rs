//! Loop decomposition.
//!
//! Markup that contains a loop cannot be flattened into one op list, because
//! the loop body renders once per element. Such a subtree is instead split
//! node by node: every node becomes its own generated component, a loop
//! becomes a component holding a single [`EmissionOp::ForEach`], and parents
//! render their children through [`EmissionOp::BindComponent`]. Subtrees
//! without loops are flattened normally into leaf components.
//!
//! A generated component takes as parameters the identifiers its body reads
//! from outside, in first-use order.

use crate::ir::visit::{
    self, child_has_loop, contains_markup, has_markup_loop, markup_has_loop,
};
use crate::ir::*;

use super::component::{attribute_args, call, Buffer, Flattener};
use super::{LowerError, Pass};

/// A generated component plus the arguments needed to render it.
pub(super) struct Invocation {
    name: String,
    parameters: Vec<String>,
}

impl Invocation {
    pub(super) fn op(&self) -> EmissionOp {
        EmissionOp::BindComponent {
            name: self.name.clone(),
            args: self
                .parameters
                .iter()
                .cloned()
                .map(Expr::Ident)
                .collect(),
        }
    }
}

impl Flattener<'_> {
    /// Register a component whose parameters are the free identifiers of
    /// its body.
    fn component(&mut self, setup: Vec<Expr>, ops: Vec<EmissionOp>) -> Invocation {
        let parameters = visit::body_free_identifiers(&setup, &ops);
        let name = self.names.component();
        self.generated.push(ComponentDef {
            name: name.clone(),
            parameters: parameters.clone(),
            setup,
            ops,
        });
        Invocation { name, parameters }
    }

    pub(super) fn decompose_expr(&mut self, e: &Expr) -> Result<Invocation, LowerError> {
        match e {
            Expr::For(l) => self.decompose_loop(l),
            Expr::Markup(m) => self.decompose_markup(m),
            Expr::Block(es) if has_markup_loop(e) => {
                let mut setup = Vec::new();
                visit::setup_expressions(e, &mut setup);
                let mut ops = Vec::new();
                for e in es.iter().filter(|e| contains_markup(e)) {
                    ops.push(self.decompose_expr(e)?.op());
                }
                Ok(self.component(setup, ops))
            }
            _ if has_markup_loop(e) => Err(LowerError::unsupported(
                Pass::Decompose,
                format!("a loop producing markup inside a {}", e.describe()),
            )),
            _ => {
                let (setup, ops) = self.body(std::slice::from_ref(e))?;
                Ok(self.component(setup, ops))
            }
        }
    }

    /// `for binding in iterable body` becomes a component that iterates and
    /// renders the body component once per element.
    fn decompose_loop(&mut self, l: &ForLoop) -> Result<Invocation, LowerError> {
        let body = self.decompose_expr(&l.body)?;

        let mut parameters = visit::free_identifiers(&l.iterable);
        for name in &body.parameters {
            if *name != l.binding && !parameters.contains(name) {
                parameters.push(name.clone());
            }
        }
        let ops = vec![EmissionOp::ForEach {
            binding: l.binding.clone(),
            iterable: (*l.iterable).clone(),
            body: vec![body.op()],
        }];

        let name = self.names.component();
        self.generated.push(ComponentDef {
            name: name.clone(),
            parameters: parameters.clone(),
            setup: Vec::new(),
            ops,
        });
        Ok(Invocation { name, parameters })
    }

    pub(super) fn decompose_markup(&mut self, m: &Markup) -> Result<Invocation, LowerError> {
        let el = match m {
            Markup::Element(el) if markup_has_loop(m) => el,
            _ => {
                let mut ops = Vec::new();
                let buffer = self.markup(Buffer::default(), m, &mut ops)?;
                self.flush(buffer, &mut ops);
                return Ok(self.component(Vec::new(), ops));
            }
        };

        if let Some(tag) = el.tag.as_deref().filter(|tag| self.symbols.contains(tag)) {
            let mut child_ops = Vec::new();
            for child in &el.children {
                child_ops.push(self.decompose_child(child)?.op());
            }
            let children = self.component(Vec::new(), child_ops);
            let mut args = attribute_args(&el.attributes);
            args.push(call(&children.name, &children.parameters));
            let ops = vec![EmissionOp::BindComponent {
                name: tag.to_string(),
                args,
            }];
            return Ok(self.component(Vec::new(), ops));
        }

        let mut ops = Vec::new();
        let mut buffer = Buffer::default();
        if let Some(tag) = &el.tag {
            buffer = buffer.push("<").push(tag);
            buffer = self.attributes(buffer, &el.attributes, &mut ops)?.push(">");
        }
        self.flush(buffer, &mut ops);
        for child in &el.children {
            ops.push(self.decompose_child(child)?.op());
        }
        if let Some(tag) = &el.tag {
            let close = Buffer::default().push("</").push(tag).push(">");
            self.flush(close, &mut ops);
        }
        Ok(self.component(Vec::new(), ops))
    }

    fn decompose_child(&mut self, child: &MarkupChild) -> Result<Invocation, LowerError> {
        match child {
            MarkupChild::Markup(m) => self.decompose_markup(m),
            MarkupChild::Capture(e) if child_has_loop(child) => self.decompose_expr(e),
            _ => {
                let mut ops = Vec::new();
                let buffer = self.child(Buffer::default(), child, &mut ops)?;
                self.flush(buffer, &mut ops);
                Ok(self.component(Vec::new(), ops))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::build::parse_module;
    use crate::ir::*;
    use crate::lower::{classify, LowerError, Lowered, NameSource, Pass};

    fn lowered(source: &str) -> Lowered {
        let module = parse_module(source).unwrap();
        classify(&module, &mut NameSource::new()).unwrap()
    }

    fn generated<'a>(l: &'a Lowered, name: &str) -> &'a ComponentDef {
        l.components.iter().find(|c| c.name == name).unwrap()
    }

    fn bind(name: &str, args: &[&str]) -> EmissionOp {
        EmissionOp::BindComponent {
            name: name.to_string(),
            args: args.iter().map(|a| Expr::Ident(a.to_string())).collect(),
        }
    }

    #[test]
    fn loop_inside_list() {
        let l = lowered("func list(xs) <ul>{for x in xs <li>{x}</li>}</ul>");
        let Definition::Component(list) = &l.module.definitions[0] else {
            panic!("expected a component");
        };
        // The whole `<ul>` is decomposed because it holds a loop.
        assert_eq!(list.ops, vec![bind("_component2", &["xs"])]);

        let body = generated(&l, "_component0");
        assert_eq!(body.parameters, vec!["x"]);
        let looped = generated(&l, "_component1");
        assert_eq!(looped.parameters, vec!["xs"]);
        assert_eq!(
            looped.ops,
            vec![EmissionOp::ForEach {
                binding: "x".into(),
                iterable: Expr::Ident("xs".into()),
                body: vec![bind("_component0", &["x"])],
            }]
        );
        let ul = generated(&l, "_component2");
        assert_eq!(
            ul.ops,
            vec![
                EmissionOp::CopyBlob("_blob0".into()),
                bind("_component1", &["xs"]),
                EmissionOp::CopyBlob("_blob3".into()),
            ]
        );
        assert_eq!(l.blobs[0].value, "<ul>");
        assert_eq!(l.blobs[3].value, "</ul>");
    }

    #[test]
    fn loop_body_keeps_outer_names() {
        let l = lowered("func rows(xs, label) <>{for x in xs <p>{label}{x}</p>}</>");
        let looped = l
            .components
            .iter()
            .find(|c| matches!(c.ops.first(), Some(EmissionOp::ForEach { .. })))
            .unwrap();
        assert_eq!(looped.parameters, vec!["xs", "label"]);
    }

    #[test]
    fn loop_at_top_level_of_a_route() {
        let l = lowered("get / () { let xs = __go__ []string{\"a\"}\n for x in xs <b>{x}</b> }");
        let Definition::Http(h) = &l.module.definitions[0] else {
            panic!("expected a route");
        };
        assert_eq!(h.setup.len(), 1);
        assert_eq!(h.ops, vec![bind("_component1", &["xs"])]);
    }

    #[test]
    fn loop_inside_parentheses_is_unsupported() {
        let module = parse_module("func f(xs) <div>{(for x in xs <b>{x}</b>)}</div>").unwrap();
        let err = classify(&module, &mut NameSource::new()).unwrap_err();
        assert!(matches!(
            err,
            LowerError::Unsupported {
                pass: Pass::Decompose,
                ..
            }
        ));
    }
}
