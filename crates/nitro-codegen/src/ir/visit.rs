//! Read-only queries over IR expressions.

use super::*;

/// Whether `e` contains markup anywhere, including inside captures.
pub fn contains_markup(e: &Expr) -> bool {
    match e {
        Expr::Markup(_) => true,
        Expr::Block(es) => es.iter().any(contains_markup),
        Expr::Let { value, .. } => contains_markup(value),
        Expr::Group(inner) => contains_markup(inner),
        Expr::Index { base, index } => contains_markup(base) || contains_markup(index),
        Expr::Dot { lhs, rhs } => contains_markup(lhs) || contains_markup(rhs),
        Expr::For(l) => contains_markup(&l.iterable) || contains_markup(&l.body),
        Expr::Call { args, .. } => args.iter().any(contains_markup),
        Expr::Select(_) | Expr::Str(_) | Expr::Int(_) | Expr::Ident(_) | Expr::Raw(_) => false,
    }
}

/// Whether `e` holds a loop that produces markup. Such subtrees are split
/// into per-node components instead of being accumulated into blobs.
pub fn has_markup_loop(e: &Expr) -> bool {
    match e {
        Expr::For(l) => contains_markup(&l.body) || has_markup_loop(&l.iterable),
        Expr::Markup(m) => markup_has_loop(m),
        Expr::Block(es) => es.iter().any(has_markup_loop),
        Expr::Let { value, .. } => has_markup_loop(value),
        Expr::Group(inner) => has_markup_loop(inner),
        Expr::Index { base, index } => has_markup_loop(base) || has_markup_loop(index),
        Expr::Dot { lhs, rhs } => has_markup_loop(lhs) || has_markup_loop(rhs),
        Expr::Call { args, .. } => args.iter().any(has_markup_loop),
        Expr::Select(_) | Expr::Str(_) | Expr::Int(_) | Expr::Ident(_) | Expr::Raw(_) => false,
    }
}

pub fn markup_has_loop(m: &Markup) -> bool {
    let (attributes, children): (&[Attribute], &[MarkupChild]) = match m {
        Markup::Element(el) => (el.attributes.as_slice(), el.children.as_slice()),
        Markup::SelfClosing(sc) => (sc.attributes.as_slice(), &[]),
    };
    attributes.iter().any(|a| match &a.value {
        AttrValue::Capture(e) => has_markup_loop(e),
        AttrValue::Literal(_) => false,
    }) || children.iter().any(child_has_loop)
}

pub fn child_has_loop(c: &MarkupChild) -> bool {
    match c {
        MarkupChild::Markup(m) => markup_has_loop(m),
        MarkupChild::Capture(e) => has_markup_loop(e),
        MarkupChild::Text(_) | MarkupChild::Str(_) => false,
    }
}

/// Collect the top-level statements of `e` that produce no markup.
///
/// Blocks are flattened; any other expression that contains markup is
/// dropped whole, since its output is carried by emission ops instead.
pub fn setup_expressions(e: &Expr, out: &mut Vec<Expr>) {
    match e {
        Expr::Block(es) => {
            for e in es {
                setup_expressions(e, out);
            }
        }
        _ if contains_markup(e) => {}
        _ => out.push(e.clone()),
    }
}

// ── Free identifiers ─────────────────────────────────────────────────────

/// Identifiers `e` reads from its environment, in first-use order.
///
/// The member side of `a.b` names a field, not a variable, so only indices
/// inside it count. Raw lines are opaque and contribute nothing.
pub fn free_identifiers(e: &Expr) -> Vec<String> {
    let mut scope = FreeVars::default();
    scope.expr(e);
    scope.found
}

/// Identifiers a component body reads: its setup statements followed by its
/// emission ops, with setup `let`s in scope for the ops.
pub fn body_free_identifiers(setup: &[Expr], ops: &[EmissionOp]) -> Vec<String> {
    let mut scope = FreeVars::default();
    for e in setup {
        scope.statement(e);
    }
    scope.ops(ops);
    scope.found
}

/// Parameters for a component built from `children`.
///
/// Only bare identifiers and loops may be captured here; anything else is
/// returned as the offending expression.
pub fn captured_identifiers(children: &[MarkupChild]) -> Result<Vec<String>, &Expr> {
    let mut found = Vec::new();
    for child in children {
        captured_in_child(child, &mut found)?;
    }
    Ok(found)
}

fn captured_in_child<'a>(
    child: &'a MarkupChild,
    found: &mut Vec<String>,
) -> Result<(), &'a Expr> {
    match child {
        MarkupChild::Capture(e) => captured_in_expr(e, found),
        MarkupChild::Markup(Markup::Element(el)) => {
            captured_in_attributes(&el.attributes, found)?;
            for child in &el.children {
                captured_in_child(child, found)?;
            }
            Ok(())
        }
        MarkupChild::Markup(Markup::SelfClosing(sc)) => {
            captured_in_attributes(&sc.attributes, found)
        }
        MarkupChild::Text(_) | MarkupChild::Str(_) => Ok(()),
    }
}

fn captured_in_attributes<'a>(
    attributes: &'a [Attribute],
    found: &mut Vec<String>,
) -> Result<(), &'a Expr> {
    for attr in attributes {
        if let AttrValue::Capture(e) = &attr.value {
            captured_in_expr(e, found)?;
        }
    }
    Ok(())
}

fn captured_in_expr<'a>(e: &'a Expr, found: &mut Vec<String>) -> Result<(), &'a Expr> {
    match e {
        Expr::Ident(name) => add(found, name),
        Expr::For(_) => {
            for name in free_identifiers(e) {
                add(found, &name);
            }
        }
        Expr::Markup(Markup::Element(el)) => {
            captured_in_attributes(&el.attributes, found)?;
            for child in &el.children {
                captured_in_child(child, found)?;
            }
        }
        Expr::Markup(Markup::SelfClosing(sc)) => captured_in_attributes(&sc.attributes, found)?,
        other => return Err(other),
    }
    Ok(())
}

fn add(found: &mut Vec<String>, name: &str) {
    if !found.iter().any(|n| n == name) {
        found.push(name.to_string());
    }
}

#[derive(Default)]
struct FreeVars {
    bound: Vec<String>,
    found: Vec<String>,
}

impl FreeVars {
    fn use_name(&mut self, name: &str) {
        if !self.bound.iter().any(|b| b == name) {
            add(&mut self.found, name);
        }
    }

    /// Visit `e` as a statement: a `let` stays bound for what follows.
    fn statement(&mut self, e: &Expr) {
        self.expr(e);
        if let Expr::Let { name, .. } = e {
            self.bound.push(name.clone());
        }
    }

    fn expr(&mut self, e: &Expr) {
        match e {
            Expr::Ident(name) => self.use_name(name),
            Expr::Block(es) => {
                let mark = self.bound.len();
                for e in es {
                    self.statement(e);
                }
                self.bound.truncate(mark);
            }
            Expr::Let { value, .. } => self.expr(value),
            Expr::Group(inner) => self.expr(inner),
            Expr::Index { base, index } => {
                self.expr(base);
                self.expr(index);
            }
            Expr::Dot { lhs, rhs } => {
                self.expr(lhs);
                self.member(rhs);
            }
            Expr::For(l) => {
                self.expr(&l.iterable);
                self.bound.push(l.binding.clone());
                self.expr(&l.body);
                self.bound.pop();
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Markup(m) => self.markup(m),
            Expr::Select(s) => self.select(s),
            Expr::Str(_) | Expr::Int(_) | Expr::Raw(_) => {}
        }
    }

    fn member(&mut self, e: &Expr) {
        match e {
            Expr::Ident(_) => {}
            Expr::Dot { lhs, rhs } => {
                self.member(lhs);
                self.member(rhs);
            }
            Expr::Index { base, index } => {
                self.member(base);
                self.expr(index);
            }
            other => self.expr(other),
        }
    }

    fn markup(&mut self, m: &Markup) {
        let (attributes, children): (&[Attribute], &[MarkupChild]) = match m {
            Markup::Element(el) => (el.attributes.as_slice(), el.children.as_slice()),
            Markup::SelfClosing(sc) => (sc.attributes.as_slice(), &[]),
        };
        for attr in attributes {
            if let AttrValue::Capture(e) = &attr.value {
                self.expr(e);
            }
        }
        for child in children {
            match child {
                MarkupChild::Markup(m) => self.markup(m),
                MarkupChild::Capture(e) => self.expr(e),
                MarkupChild::Text(_) | MarkupChild::Str(_) => {}
            }
        }
    }

    fn select(&mut self, s: &Select) {
        let values = s
            .selections
            .iter()
            .map(|sel| &sel.value)
            .chain(s.filter.iter().flat_map(|w| [&w.column, &w.value]));
        for value in values {
            if let SqlValue::Capture(e) = value {
                self.expr(e);
            }
        }
    }

    fn ops(&mut self, ops: &[EmissionOp]) {
        for op in ops {
            match op {
                EmissionOp::CopyString(name) | EmissionOp::NestedComponent(name) => {
                    self.use_name(name)
                }
                EmissionOp::BindComponent { args, .. } => {
                    for arg in args {
                        self.expr(arg);
                    }
                }
                EmissionOp::ForEach {
                    binding,
                    iterable,
                    body,
                } => {
                    self.expr(iterable);
                    self.bound.push(binding.clone());
                    self.ops(body);
                    self.bound.pop();
                }
                EmissionOp::CopyBlob(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    fn dot(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Dot {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn member_names_are_not_free() {
        let e = dot(ident("user"), dot(ident("name"), ident("first")));
        assert_eq!(free_identifiers(&e), vec!["user"]);
    }

    #[test]
    fn indices_inside_members_are_free() {
        let e = dot(
            ident("rows"),
            Expr::Index {
                base: Box::new(ident("items")),
                index: Box::new(ident("i")),
            },
        );
        assert_eq!(free_identifiers(&e), vec!["rows", "i"]);
    }

    #[test]
    fn block_lets_shadow_later_uses() {
        let e = Expr::Block(vec![
            Expr::Let {
                name: "a".into(),
                value: Box::new(ident("b")),
            },
            ident("a"),
            ident("c"),
        ]);
        assert_eq!(free_identifiers(&e), vec!["b", "c"]);
    }

    #[test]
    fn loop_binding_is_not_free() {
        let e = Expr::For(ForLoop {
            binding: "x".into(),
            iterable: Box::new(ident("xs")),
            body: Box::new(Expr::Block(vec![ident("x"), ident("y")])),
        });
        assert_eq!(free_identifiers(&e), vec!["xs", "y"]);
    }

    #[test]
    fn setup_lets_are_bound_for_ops() {
        let setup = vec![Expr::Let {
            name: "n".into(),
            value: Box::new(ident("u")),
        }];
        let ops = vec![
            EmissionOp::CopyBlob("_blob0".into()),
            EmissionOp::CopyString("n".into()),
            EmissionOp::CopyString("m".into()),
        ];
        assert_eq!(body_free_identifiers(&setup, &ops), vec!["u", "m"]);
    }

    #[test]
    fn captured_identifiers_reject_calls() {
        let children = vec![
            MarkupChild::Capture(ident("a")),
            MarkupChild::Capture(dot(ident("a"), ident("b"))),
        ];
        let err = captured_identifiers(&children).unwrap_err();
        assert_eq!(err.describe(), "member access");
    }

    #[test]
    fn setup_drops_markup_statements() {
        let body = Expr::Block(vec![
            Expr::Raw("x := 1".into()),
            Expr::Markup(Markup::SelfClosing(SelfClosing {
                tag: "br".into(),
                attributes: vec![],
            })),
        ]);
        let mut setup = Vec::new();
        setup_expressions(&body, &mut setup);
        assert_eq!(setup, vec![Expr::Raw("x := 1".into())]);
    }
}
