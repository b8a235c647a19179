//! Owned intermediate representation shared by every pass.
//!
//! [`build`] converts the rowan CST into this tree. The lowering passes
//! consume one `Module` and produce another: SQL lowering replaces every
//! [`Expr::Select`] with an [`Expr::Call`] plus generated [`StructDef`] and
//! [`QueryDef`] definitions, and markup flattening replaces markup with
//! [`ComponentDef`]s whose bodies are [`EmissionOp`] sequences. After
//! lowering, no `Markup` or `Select` node is left.

pub mod build;
pub mod visit;

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Function(FunctionDef),
    Component(ComponentDef),
    Http(HttpDef),
    Struct(StructDef),
    Query(QueryDef),
}

impl Definition {
    /// The Go-level name, if the definition has one. Routes are anonymous.
    pub fn name(&self) -> Option<&str> {
        match self {
            Definition::Function(f) => Some(&f.name),
            Definition::Component(c) => Some(&c.name),
            Definition::Struct(s) => Some(&s.name),
            Definition::Query(q) => Some(&q.name),
            Definition::Http(_) => None,
        }
    }
}

/// A plain host-language function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Expr,
}

/// A function whose output is rendered markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub parameters: Vec<String>,
    /// Host statements evaluated once when the component is constructed.
    pub setup: Vec<Expr>,
    /// Writes performed each time the component renders.
    pub ops: Vec<EmissionOp>,
}

/// A route handler. Before markup flattening the handler body lives in
/// `setup` and `ops` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpDef {
    pub verb: Verb,
    pub path: Vec<PathSegment>,
    pub setup: Vec<Expr>,
    pub ops: Vec<EmissionOp>,
}

impl HttpDef {
    pub fn wildcards(&self) -> impl Iterator<Item = &str> {
        self.path.iter().filter_map(|s| match s {
            PathSegment::Wildcard(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl Verb {
    pub fn from_keyword(word: &str) -> Option<Verb> {
        match word {
            "get" => Some(Verb::Get),
            "put" => Some(Verb::Put),
            "patch" => Some(Verb::Patch),
            "post" => Some(Verb::Post),
            "delete" => Some(Verb::Delete),
            _ => None,
        }
    }

    /// The method name as the router spells it.
    pub fn method(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Literal(String),
    Wildcard(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: String,
}

/// A generated database query function. Each row is scanned into a
/// `record` whose fields are `columns`, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDef {
    pub name: String,
    pub record: String,
    pub parameters: Vec<String>,
    pub sql: String,
    pub columns: Vec<String>,
}

// ── Expressions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Block(Vec<Expr>),
    /// String literal, unquoted.
    Str(String),
    Int(i64),
    Ident(String),
    Let { name: String, value: Box<Expr> },
    /// Verbatim target code.
    Raw(String),
    Group(Box<Expr>),
    Index { base: Box<Expr>, index: Box<Expr> },
    Dot { lhs: Box<Expr>, rhs: Box<Expr> },
    For(ForLoop),
    /// Call of a generated global (`_component3`, `db._query0`). Only
    /// produced by lowering.
    Call { callee: String, args: Vec<Expr> },
    Markup(Markup),
    Select(Select),
}

impl Expr {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::Block(_) => "block",
            Expr::Str(_) => "string literal",
            Expr::Int(_) => "integer literal",
            Expr::Ident(_) => "identifier",
            Expr::Let { .. } => "let binding",
            Expr::Raw(_) => "raw line",
            Expr::Group(_) => "parenthesized expression",
            Expr::Index { .. } => "index expression",
            Expr::Dot { .. } => "member access",
            Expr::For(_) => "for loop",
            Expr::Call { .. } => "call",
            Expr::Markup(_) => "markup",
            Expr::Select(_) => "select",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub binding: String,
    pub iterable: Box<Expr>,
    pub body: Box<Expr>,
}

// ── Markup ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(Element),
    SelfClosing(SelfClosing),
}

/// `<tag ...>children</close>`. Either tag may be absent (`<>...</>`), and
/// the two names are never compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Option<String>,
    pub close_tag: Option<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<MarkupChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfClosing {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Literal(String),
    Capture(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupChild {
    Markup(Markup),
    /// Raw text run, untrimmed.
    Text(String),
    /// Quoted string child, unquoted.
    Str(String),
    Capture(Expr),
}

// ── SQL ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub selections: Vec<Selection>,
    pub from: Option<FromClause>,
    pub filter: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub value: SqlValue,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `'text'`, quotes included.
    Str(String),
    Column { table: Option<String>, name: String },
    Capture(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: SqlValue,
    pub value: SqlValue,
}

// ── Emission ─────────────────────────────────────────────────────────────

/// One write performed while a component renders.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionOp {
    /// Write a named static blob.
    CopyBlob(String),
    /// Write the string value of a variable.
    CopyString(String),
    /// Render a component-valued variable (`children`).
    NestedComponent(String),
    /// Construct the named component with `args` and render it.
    BindComponent { name: String, args: Vec<Expr> },
    /// Run `body` once per element of `iterable`, with `binding` in scope.
    ForEach {
        binding: String,
        iterable: Expr,
        body: Vec<EmissionOp>,
    },
}

/// A named static byte string.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub name: String,
    pub value: String,
}
