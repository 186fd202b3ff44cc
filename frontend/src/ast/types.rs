//! Crate-owned Python AST.
//!
//! The host parser (CPython's `ast` module, see [`crate::python_ast`]) hands
//! us a Python object graph; [`super::converter::AstConverter`] rebuilds it as
//! these owned sums so the lowering engine never touches pyo3 objects. Every
//! node carries the byte range it came from.

use std::path::PathBuf;

use crate::source::SourceRange;

/// A complete Python module.
#[derive(Debug, Clone)]
pub struct Module {
    pub path: PathBuf,
    pub body: Vec<Stmt>,
}

/// One name bound by an import statement.
#[derive(Debug, Clone)]
pub struct ImportName {
    /// Dotted path for `import a.b`, plain name for `from m import x`,
    /// `"*"` for star imports.
    pub name: String,
    /// The `as` alias, if any.
    pub alias: Option<String>,
}

/// A single parameter with its optional default.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

/// Full parameter list of a function definition.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Positional parameters (position-only and regular, in order).
    pub pos: Vec<Param>,
    /// `*args` name, if present.
    pub vararg: Option<String>,
    /// Keyword-only parameters (those after `*`).
    pub kwonly: Vec<Param>,
    /// `**kwargs` name, if present.
    pub kwarg: Option<String>,
}

impl Params {
    /// Parameter names in declaration order: positional, vararg, keyword-only,
    /// kwarg.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pos.iter().map(|p| p.name.clone()).collect();
        if let Some(v) = &self.vararg {
            names.push(v.clone());
        }
        names.extend(self.kwonly.iter().map(|p| p.name.clone()));
        if let Some(k) = &self.kwarg {
            names.push(k.clone());
        }
        names
    }

    /// True when the function takes only plain positional parameters with no
    /// defaults.
    pub fn is_simple_positional(&self) -> bool {
        self.vararg.is_none()
            && self.kwarg.is_none()
            && self.kwonly.is_empty()
            && self.pos.iter().all(|p| p.default.is_none())
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: Option<SourceRange>,
}

impl Stmt {
    pub fn new(kind: StmtKind, range: Option<SourceRange>) -> Self {
        Stmt { kind, range }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    FunctionDef {
        name: String,
        params: Params,
        body: Vec<Stmt>,
    },
    ClassDef {
        name: String,
        bases: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinOperator,
        value: Expr,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    With {
        /// `(context expression, optional as-target)` pairs.
        items: Vec<(Expr, Option<Expr>)>,
        body: Vec<Stmt>,
    },
    Raise(Option<Expr>),
    /// Handlers and the `else` suite are not represented; only the body and
    /// the `finally` suite survive conversion.
    Try {
        body: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Import {
        names: Vec<ImportName>,
    },
    ImportFrom {
        /// Number of leading dots.
        level: usize,
        /// Dotted module path, possibly empty (`from . import x`).
        module: String,
        names: Vec<ImportName>,
    },
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Expr(Expr),
    Del(Vec<Expr>),
    Pass,
    Break,
    Continue,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: Option<SourceRange>,
}

impl Expr {
    pub fn new(kind: ExprKind, range: Option<SourceRange>) -> Self {
        Expr { kind, range }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Constant(Constant),
    Name(String),
    BinOp {
        left: Box<Expr>,
        op: BinOperator,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CompareOp>,
        comparators: Vec<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// `body if test else orelse`.
    Ternary {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        /// `(Some(name), value)` for `name=value`, `(None, value)` for `**value`.
        keywords: Vec<(Option<String>, Expr)>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    /// `(None, value)` entries are `**value` expansions.
    Dict(Vec<(Option<Expr>, Expr)>),
    /// `*value` in a call or destructuring position.
    Starred(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    Ellipsis,
}

/// Binary operators as the host parser reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOperator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    USub,
    UAdd,
    Invert,
}
