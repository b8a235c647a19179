//! Parameter type guessing.
//!
//! The source language is untyped, so parameter types are guessed from
//! use: `children` is a component, a parameter iterated by a loop is a
//! `[]string`, and everything else is a `string`. A parameter passed
//! straight through to a list parameter of another component is a list as
//! well; that is propagated until nothing changes.

use rustc_hash::FxHashMap;

use crate::ir::*;
use crate::lower::Lowered;

pub(crate) struct Signatures {
    lists: FxHashMap<String, Vec<bool>>,
}

impl Signatures {
    pub(crate) fn infer(lowered: &Lowered) -> Self {
        let components: Vec<&ComponentDef> = lowered
            .module
            .definitions
            .iter()
            .filter_map(|def| match def {
                Definition::Component(c) => Some(c),
                _ => None,
            })
            .chain(&lowered.components)
            .collect();

        let mut lists: FxHashMap<String, Vec<bool>> = FxHashMap::default();
        for c in &components {
            let flags = c
                .parameters
                .iter()
                .map(|p| ops_iterate(&c.ops, p) || c.setup.iter().any(|e| iterates(e, p)))
                .collect();
            lists.insert(c.name.clone(), flags);
        }
        for def in &lowered.module.definitions {
            if let Definition::Function(f) = def {
                let flags = f.parameters.iter().map(|p| iterates(&f.body, p)).collect();
                lists.insert(f.name.clone(), flags);
            }
        }

        let mut signatures = Signatures { lists };
        loop {
            let mut found = Vec::new();
            for c in &components {
                for (i, p) in c.parameters.iter().enumerate() {
                    if !signatures.is_list(&c.name, i) && signatures.ops_forward(&c.ops, p) {
                        found.push((c.name.clone(), i));
                    }
                }
            }
            if found.is_empty() {
                break;
            }
            for (name, i) in found {
                if let Some(flag) = signatures.lists.get_mut(&name).and_then(|f| f.get_mut(i)) {
                    *flag = true;
                }
            }
        }
        signatures
    }

    fn is_list(&self, owner: &str, index: usize) -> bool {
        self.lists
            .get(owner)
            .and_then(|flags| flags.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn param_type(&self, owner: &str, index: usize, name: &str) -> &'static str {
        if name == "children" {
            "Component"
        } else if self.is_list(owner, index) {
            "[]string"
        } else {
            "string"
        }
    }

    /// Whether `ops` pass `name` to a list parameter of some callee.
    fn ops_forward(&self, ops: &[EmissionOp], name: &str) -> bool {
        ops.iter().any(|op| match op {
            EmissionOp::BindComponent { name: callee, args } => {
                self.args_forward(callee, args, name)
            }
            EmissionOp::ForEach { binding, body, .. } => {
                binding != name && self.ops_forward(body, name)
            }
            _ => false,
        })
    }

    fn args_forward(&self, callee: &str, args: &[Expr], name: &str) -> bool {
        args.iter().enumerate().any(|(i, arg)| match arg {
            Expr::Ident(arg) => arg == name && self.is_list(callee, i),
            Expr::Call { callee, args } => self.args_forward(callee, args, name),
            _ => false,
        })
    }
}

fn is_ident(e: &Expr, name: &str) -> bool {
    matches!(e, Expr::Ident(n) if n == name)
}

fn ops_iterate(ops: &[EmissionOp], name: &str) -> bool {
    ops.iter().any(|op| match op {
        EmissionOp::ForEach {
            binding,
            iterable,
            body,
        } => is_ident(iterable, name) || (binding != name && ops_iterate(body, name)),
        _ => false,
    })
}

/// Whether a host-code loop inside `e` iterates `name` directly.
fn iterates(e: &Expr, name: &str) -> bool {
    match e {
        Expr::For(l) => {
            is_ident(&l.iterable, name)
                || iterates(&l.iterable, name)
                || (l.binding != name && iterates(&l.body, name))
        }
        Expr::Block(es) => es.iter().any(|e| iterates(e, name)),
        Expr::Let { value, .. } => iterates(value, name),
        Expr::Group(inner) => iterates(inner, name),
        Expr::Index { base, index } => iterates(base, name) || iterates(index, name),
        Expr::Dot { lhs, rhs } => iterates(lhs, name) || iterates(rhs, name),
        Expr::Call { args, .. } => args.iter().any(|e| iterates(e, name)),
        _ => false,
    }
}
