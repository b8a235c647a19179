//! Markup flattening.
//!
//! Each definition that produces markup is walked once with a text buffer.
//! Constant markup is appended to the buffer; anything dynamic first flushes
//! the buffer as a named blob and then emits its own op. A tag that names a
//! known component becomes a [`EmissionOp::BindComponent`] instead of
//! literal text, and its children are flattened into a component of their
//! own that is passed as the trailing argument.
//!
//! Whether a tag names a component depends on definition order: a component
//! generated while flattening one definition is only visible to the
//! definitions after it.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::ir::visit::{self, contains_markup, has_markup_loop, markup_has_loop};
use crate::ir::*;

use super::{Lowered, LowerError, NameSource, Pass};

/// Known component names, in the order they became known.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    order: Vec<String>,
    known: FxHashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `name` was already known.
    pub fn insert(&mut self, name: &str) -> bool {
        if !self.known.insert(name.to_string()) {
            return false;
        }
        self.order.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }
}

/// Flatten every markup-producing definition of `module`.
///
/// # Errors
///
/// Fails on a markup capture that is not a name, a loop, or markup, and on
/// any select that reached this pass.
pub fn classify(module: &Module, names: &mut NameSource) -> Result<Lowered, LowerError> {
    let mut classifier = Classifier::new(module);
    for def in &module.definitions {
        classifier.definition(def, names)?;
    }
    Ok(classifier.finish())
}

/// Stepwise driver for [`classify`]: feeds one definition at a time so the
/// symbol table can be observed between steps.
#[derive(Debug)]
pub struct Classifier {
    symbols: SymbolTable,
    definitions: Vec<Definition>,
    blobs: Vec<Blob>,
    components: Vec<ComponentDef>,
}

impl Classifier {
    /// Seed the symbol table with every component-like definition of
    /// `module`: already-lowered components and functions containing markup.
    pub fn new(module: &Module) -> Self {
        let mut symbols = SymbolTable::new();
        for def in &module.definitions {
            match def {
                Definition::Component(c) => {
                    symbols.insert(&c.name);
                }
                Definition::Function(f) if contains_markup(&f.body) => {
                    symbols.insert(&f.name);
                }
                _ => {}
            }
        }
        Self {
            symbols,
            definitions: Vec::new(),
            blobs: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn definition(
        &mut self,
        def: &Definition,
        names: &mut NameSource,
    ) -> Result<(), LowerError> {
        let lowered = match def {
            Definition::Function(f) if contains_markup(&f.body) => {
                let (setup, ops) = self.flatten(names, std::slice::from_ref(&f.body))?;
                Definition::Component(ComponentDef {
                    name: f.name.clone(),
                    parameters: f.parameters.clone(),
                    setup,
                    ops,
                })
            }
            Definition::Http(h) => {
                let (setup, mut ops) = self.flatten(names, &h.setup)?;
                ops.extend(h.ops.iter().cloned());
                Definition::Http(HttpDef {
                    setup,
                    ops,
                    ..h.clone()
                })
            }
            _ => def.clone(),
        };
        self.definitions.push(lowered);
        Ok(())
    }

    /// Flatten one definition body, then publish what it generated.
    fn flatten(
        &mut self,
        names: &mut NameSource,
        body: &[Expr],
    ) -> Result<(Vec<Expr>, Vec<EmissionOp>), LowerError> {
        let mut flattener = Flattener::new(names, &self.symbols);
        let (setup, ops) = flattener.body(body)?;
        let Flattener {
            blobs, generated, ..
        } = flattener;

        for component in &generated {
            self.symbols.insert(&component.name);
        }
        trace!(
            blobs = blobs.len(),
            components = generated.len(),
            "flattened definition"
        );
        self.blobs.extend(blobs);
        self.components.extend(generated);
        Ok((setup, ops))
    }

    pub fn finish(self) -> Lowered {
        debug!(known = self.symbols.names().len(), "classified definitions");
        Lowered {
            module: Module {
                definitions: self.definitions,
            },
            blobs: self.blobs,
            components: self.components,
        }
    }
}

// ── Flattening ───────────────────────────────────────────────────────────

/// Pending constant markup text. Threaded by value through the walk; every
/// dynamic op is preceded by a flush.
#[derive(Debug, Default)]
pub(super) struct Buffer(String);

impl Buffer {
    pub(super) fn with(text: &str) -> Self {
        Buffer(text.to_string())
    }

    pub(super) fn push(mut self, text: &str) -> Self {
        self.0.push_str(text);
        self
    }
}

/// Per-definition flattening state.
pub(super) struct Flattener<'a> {
    pub(super) names: &'a mut NameSource,
    pub(super) symbols: &'a SymbolTable,
    pub(super) blobs: Vec<Blob>,
    pub(super) generated: Vec<ComponentDef>,
}

impl<'a> Flattener<'a> {
    fn new(names: &'a mut NameSource, symbols: &'a SymbolTable) -> Self {
        Self {
            names,
            symbols,
            blobs: Vec::new(),
            generated: Vec::new(),
        }
    }

    /// Setup statements and ops for a sequence of body expressions.
    pub(super) fn body(
        &mut self,
        body: &[Expr],
    ) -> Result<(Vec<Expr>, Vec<EmissionOp>), LowerError> {
        let mut setup = Vec::new();
        for e in body {
            visit::setup_expressions(e, &mut setup);
        }
        let mut ops = Vec::new();
        let mut buffer = Buffer::default();
        for e in body {
            buffer = self.expr(buffer, e, &mut ops)?;
        }
        self.flush(buffer, &mut ops);
        Ok((setup, ops))
    }

    /// Emit the buffered text as a blob, unless it is empty.
    pub(super) fn flush(&mut self, buffer: Buffer, ops: &mut Vec<EmissionOp>) -> Buffer {
        if !buffer.0.is_empty() {
            let name = self.names.blob();
            ops.push(EmissionOp::CopyBlob(name.clone()));
            self.blobs.push(Blob {
                name,
                value: buffer.0,
            });
        }
        Buffer::default()
    }

    fn expr(
        &mut self,
        buffer: Buffer,
        e: &Expr,
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        match e {
            Expr::Markup(m) => self.markup(buffer, m, ops),
            Expr::Block(es) => es
                .iter()
                .try_fold(buffer, |buffer, e| self.expr(buffer, e, ops)),
            Expr::Let { value, .. } => self.expr(buffer, value, ops),
            Expr::Group(inner) => self.expr(buffer, inner, ops),
            Expr::Index { base, index } => {
                let buffer = self.expr(buffer, base, ops)?;
                self.expr(buffer, index, ops)
            }
            Expr::Dot { lhs, rhs } => {
                let buffer = self.expr(buffer, lhs, ops)?;
                self.expr(buffer, rhs, ops)
            }
            Expr::For(_) if has_markup_loop(e) => {
                let buffer = self.flush(buffer, ops);
                let invocation = self.decompose_expr(e)?;
                ops.push(invocation.op());
                Ok(buffer)
            }
            Expr::Call { args, .. } => {
                args.iter().try_fold(buffer, |buffer, e| self.expr(buffer, e, ops))
            }
            Expr::Select(_) => Err(LowerError::internal(
                Pass::Classify,
                e.describe(),
                "select reached markup flattening",
            )),
            Expr::For(_) | Expr::Str(_) | Expr::Int(_) | Expr::Ident(_) | Expr::Raw(_) => {
                Ok(buffer)
            }
        }
    }

    pub(super) fn markup(
        &mut self,
        buffer: Buffer,
        m: &Markup,
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        if markup_has_loop(m) {
            let buffer = self.flush(buffer, ops);
            let invocation = self.decompose_markup(m)?;
            ops.push(invocation.op());
            return Ok(buffer);
        }
        match m {
            Markup::Element(el) => match &el.tag {
                Some(tag) if self.symbols.contains(tag) => {
                    self.bind(buffer, tag, &el.attributes, &el.children, ops)
                }
                Some(tag) => {
                    let buffer = buffer.push("<").push(tag);
                    let mut buffer = self.attributes(buffer, &el.attributes, ops)?.push(">");
                    for child in &el.children {
                        buffer = self.child(buffer, child, ops)?;
                    }
                    Ok(buffer.push("</").push(tag).push(">"))
                }
                None => el
                    .children
                    .iter()
                    .try_fold(buffer, |buffer, child| self.child(buffer, child, ops)),
            },
            Markup::SelfClosing(sc) if self.symbols.contains(&sc.tag) => {
                self.bind(buffer, &sc.tag, &sc.attributes, &[], ops)
            }
            Markup::SelfClosing(sc) => {
                let buffer = buffer.push("<").push(&sc.tag);
                Ok(self.attributes(buffer, &sc.attributes, ops)?.push(" />"))
            }
        }
    }

    /// ` name="value"` for each attribute of a literal tag. A captured value
    /// is written between the quotes at render time.
    pub(super) fn attributes(
        &mut self,
        mut buffer: Buffer,
        attributes: &[Attribute],
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        for attr in attributes {
            buffer = match &attr.value {
                AttrValue::Literal(value) => buffer.push(&format!(" {}=\"{}\"", attr.name, value)),
                AttrValue::Capture(Expr::Ident(name)) => {
                    let buffer = buffer.push(&format!(" {}=\"", attr.name));
                    self.flush(buffer, ops);
                    ops.push(capture_op(name));
                    Buffer::with("\"")
                }
                AttrValue::Capture(other) => {
                    return Err(LowerError::internal(
                        Pass::Classify,
                        other.describe(),
                        format!("attribute `{}` of a plain tag must capture a name", attr.name),
                    ))
                }
            };
        }
        Ok(buffer)
    }

    pub(super) fn child(
        &mut self,
        buffer: Buffer,
        child: &MarkupChild,
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        match child {
            MarkupChild::Markup(m) => self.markup(buffer, m, ops),
            MarkupChild::Text(text) | MarkupChild::Str(text) => Ok(buffer.push(text.trim())),
            MarkupChild::Capture(e) => self.capture(buffer, e, ops),
        }
    }

    pub(super) fn capture(
        &mut self,
        buffer: Buffer,
        e: &Expr,
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        match e {
            Expr::Ident(name) => {
                let buffer = self.flush(buffer, ops);
                ops.push(capture_op(name));
                Ok(buffer)
            }
            Expr::Markup(m) => self.markup(buffer, m, ops),
            _ if has_markup_loop(e) => {
                let buffer = self.flush(buffer, ops);
                let invocation = self.decompose_expr(e)?;
                ops.push(invocation.op());
                Ok(buffer)
            }
            other => Err(LowerError::internal(
                Pass::Classify,
                other.describe(),
                "markup captures must be a name, a loop, or markup",
            )),
        }
    }

    /// Render a known component: attributes become arguments, and children
    /// are flattened into a component passed last.
    pub(super) fn bind(
        &mut self,
        buffer: Buffer,
        tag: &str,
        attributes: &[Attribute],
        children: &[MarkupChild],
        ops: &mut Vec<EmissionOp>,
    ) -> Result<Buffer, LowerError> {
        let buffer = self.flush(buffer, ops);
        let mut args = attribute_args(attributes);
        if !children.is_empty() {
            let parameters = visit::captured_identifiers(children).map_err(|e| {
                LowerError::internal(
                    Pass::Classify,
                    e.describe(),
                    format!("children of `<{tag}>` may only capture names, loops, or markup"),
                )
            })?;
            let mut child_ops = Vec::new();
            let mut inner = Buffer::default();
            for child in children {
                inner = self.child(inner, child, &mut child_ops)?;
            }
            self.flush(inner, &mut child_ops);

            let name = self.names.component();
            args.push(call(&name, &parameters));
            self.generated.push(ComponentDef {
                name,
                parameters,
                setup: Vec::new(),
                ops: child_ops,
            });
        }
        ops.push(EmissionOp::BindComponent {
            name: tag.to_string(),
            args,
        });
        Ok(buffer)
    }
}

/// A captured name writes its string value, except `children`, which
/// renders the nested component passed in.
fn capture_op(name: &str) -> EmissionOp {
    if name == "children" {
        EmissionOp::NestedComponent(name.to_string())
    } else {
        EmissionOp::CopyString(name.to_string())
    }
}

pub(super) fn attribute_args(attributes: &[Attribute]) -> Vec<Expr> {
    attributes
        .iter()
        .map(|attr| match &attr.value {
            AttrValue::Literal(text) => Expr::Str(text.clone()),
            AttrValue::Capture(e) => e.clone(),
        })
        .collect()
}

/// `name(p1, p2, ...)` passing each parameter through by name.
pub(super) fn call(name: &str, parameters: &[String]) -> Expr {
    Expr::Call {
        callee: name.to_string(),
        args: parameters.iter().cloned().map(Expr::Ident).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::parse_module;

    fn lowered(source: &str) -> Lowered {
        let module = parse_module(source).unwrap();
        classify(&module, &mut NameSource::new()).unwrap()
    }

    fn component<'a>(lowered: &'a Lowered, name: &str) -> &'a ComponentDef {
        lowered
            .module
            .definitions
            .iter()
            .find_map(|d| match d {
                Definition::Component(c) if c.name == name => Some(c),
                _ => None,
            })
            .or_else(|| lowered.components.iter().find(|c| c.name == name))
            .unwrap()
    }

    fn blob(name: &str) -> EmissionOp {
        EmissionOp::CopyBlob(name.to_string())
    }

    #[test]
    fn dynamic_capture_splits_the_buffer() {
        let l = lowered("func f(x) <div>static<b>{x}</b></div>");
        let c = component(&l, "f");
        assert_eq!(
            c.ops,
            vec![
                blob("_blob0"),
                EmissionOp::CopyString("x".into()),
                blob("_blob1")
            ]
        );
        assert_eq!(l.blobs[0].value, "<div>static<b>");
        assert_eq!(l.blobs[1].value, "</b></div>");
    }

    #[test]
    fn closing_text_uses_the_opening_tag() {
        let l = lowered("func f() <div>hello</span>");
        assert_eq!(l.blobs[0].value, "<div>hello</div>");
    }

    #[test]
    fn text_is_trimmed() {
        let l = lowered(r#"func f() <p>  a b  <i>"c"</i></p>"#);
        assert_eq!(component(&l, "f").ops, vec![blob("_blob0")]);
        assert_eq!(l.blobs[0].value, "<p>a b<i>c</i></p>");
    }

    #[test]
    fn captured_attribute_is_quoted() {
        let l = lowered(r#"func f(u) <a href={u} class="x">go</a>"#);
        assert_eq!(l.blobs[0].value, "<a href=\"");
        assert_eq!(l.blobs[1].value, "\" class=\"x\">go</a>");
        assert_eq!(
            component(&l, "f").ops,
            vec![
                blob("_blob0"),
                EmissionOp::CopyString("u".into()),
                blob("_blob1")
            ]
        );
    }

    #[test]
    fn children_attribute_renders_the_nested_component() {
        let l = lowered(r#"func f(children) <div data={children}></div>"#);
        assert_eq!(
            component(&l, "f").ops,
            vec![
                blob("_blob0"),
                EmissionOp::NestedComponent("children".into()),
                blob("_blob1")
            ]
        );
    }

    #[test]
    fn self_closing_tag() {
        let l = lowered(r#"func f() <img src="a.png"/>"#);
        assert_eq!(l.blobs[0].value, "<img src=\"a.png\" />");
    }

    #[test]
    fn known_component_binds_with_children() {
        let l = lowered(
            "func layout(title, children) <main>{children}</main>
             func page(t) <layout title={t}><p>{t}</p></layout>",
        );
        let page = component(&l, "page");
        assert_eq!(
            page.ops,
            vec![EmissionOp::BindComponent {
                name: "layout".into(),
                args: vec![
                    Expr::Ident("t".into()),
                    call("_component0", &["t".to_string()])
                ],
            }]
        );
        let children = component(&l, "_component0");
        assert_eq!(children.parameters, vec!["t"]);
        assert_eq!(
            children.ops,
            vec![
                blob("_blob2"),
                EmissionOp::CopyString("t".into()),
                blob("_blob3")
            ]
        );
        assert_eq!(
            component(&l, "layout").ops[1],
            EmissionOp::NestedComponent("children".into())
        );
    }

    #[test]
    fn no_empty_blobs() {
        let l = lowered("func f(a, b) <>{a}{b}</>");
        assert!(l.blobs.is_empty());
        assert_eq!(
            component(&l, "f").ops,
            vec![
                EmissionOp::CopyString("a".into()),
                EmissionOp::CopyString("b".into())
            ]
        );
    }

    #[test]
    fn route_setup_keeps_host_statements() {
        let l = lowered("get / () { let n = \"x\" <p>{n}</p> }");
        let Definition::Http(h) = &l.module.definitions[0] else {
            panic!("expected a route");
        };
        assert_eq!(h.setup.len(), 1);
        assert_eq!(h.ops.len(), 3);
    }

    #[test]
    fn non_name_capture_is_internal() {
        let module = parse_module("func f(a) <p>{a.b}</p>").unwrap();
        let err = classify(&module, &mut NameSource::new()).unwrap_err();
        assert!(matches!(err, LowerError::Internal { pass: Pass::Classify, .. }));
    }

    #[test]
    fn symbols_grow_after_each_definition() {
        let element = |tag: &str, children: Vec<MarkupChild>| {
            Markup::Element(Element {
                tag: Some(tag.to_string()),
                close_tag: None,
                attributes: vec![],
                children,
            })
        };
        let text = || vec![MarkupChild::Text("x".into())];
        let def = |name: &str, body: Markup| {
            Definition::Function(FunctionDef {
                name: name.to_string(),
                parameters: vec![],
                body: Expr::Markup(body),
            })
        };
        // `first` generates `_component0`; only `third`, flattened after it,
        // may refer to it. `earlier` comes before the generator.
        let module = Module {
            definitions: vec![
                def("earlier", element("_component0", text())),
                def(
                    "first",
                    element(
                        "page",
                        vec![MarkupChild::Markup(element("_component0", text()))],
                    ),
                ),
                def("page", element("div", text())),
                def("third", element("_component0", text())),
            ],
        };

        let mut names = NameSource::new();
        let mut classifier = Classifier::new(&module);
        assert_eq!(
            classifier.symbols().names(),
            ["earlier", "first", "page", "third"]
        );

        classifier.definition(&module.definitions[0], &mut names).unwrap();
        assert!(!classifier.symbols().contains("_component0"));
        classifier.definition(&module.definitions[1], &mut names).unwrap();
        assert!(classifier.symbols().contains("_component0"));
        classifier.definition(&module.definitions[2], &mut names).unwrap();
        classifier.definition(&module.definitions[3], &mut names).unwrap();

        let lowered = classifier.finish();
        let nth = |i: usize| match &lowered.module.definitions[i] {
            Definition::Component(c) => c,
            other => panic!("expected a component, got {other:?}"),
        };
        // Before and inside the generator, `<_component0>` is a plain tag.
        assert_eq!(nth(0).ops, vec![blob("_blob0")]);
        assert_eq!(lowered.blobs[0].value, "<_component0>x</_component0>");
        assert_eq!(lowered.blobs[1].value, "<_component0>x</_component0>");
        assert!(
            matches!(&nth(1).ops[0], EmissionOp::BindComponent { name, .. } if name == "page")
        );
        assert!(matches!(
            &nth(3).ops[0],
            EmissionOp::BindComponent { name, .. } if name == "_component0"
        ));
    }
}
