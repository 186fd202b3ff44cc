//! ThIR expressions.

use crate::source::SourceRange;

/// Constant values.
#[derive(Debug, Clone, PartialEq)]
pub enum ThConst {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

/// Binary operators. `>` and `>=` do not appear; the lowering engine
/// normalizes them to `Lt`/`Lte` with swapped operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThBinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
    Is,
    In,
    Lt,
    Lte,
    Eq,
    Neq,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThUnaryOp {
    Neg,
    Not,
    Invert,
    Pos,
}

/// The closed set of library-call kinds. The backend defines the semantics of
/// each; the frontend only guarantees the key schema it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibCallKind {
    Import,
    ImportQualified,
    Super,
    SetDefault,
    CallKV,
    GetAttr,
    ExportGlobal,
    GenList,
    GenDict,
    Raise,
    Explicit,
    ObjectClass,
    Debug,
}

impl LibCallKind {
    pub const ALL: [LibCallKind; 13] = [
        LibCallKind::Import,
        LibCallKind::ImportQualified,
        LibCallKind::Super,
        LibCallKind::SetDefault,
        LibCallKind::CallKV,
        LibCallKind::GetAttr,
        LibCallKind::ExportGlobal,
        LibCallKind::GenList,
        LibCallKind::GenDict,
        LibCallKind::Raise,
        LibCallKind::Explicit,
        LibCallKind::ObjectClass,
        LibCallKind::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LibCallKind::Import => "import",
            LibCallKind::ImportQualified => "importQualified",
            LibCallKind::Super => "super",
            LibCallKind::SetDefault => "setDefault",
            LibCallKind::CallKV => "callKV",
            LibCallKind::GetAttr => "getAttr",
            LibCallKind::ExportGlobal => "exportGlobal",
            LibCallKind::GenList => "genList",
            LibCallKind::GenDict => "genDict",
            LibCallKind::Raise => "raise",
            LibCallKind::Explicit => "explicit",
            LibCallKind::ObjectClass => "objectClass",
            LibCallKind::Debug => "DEBUG",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). Unknown strings have no kind.
    pub fn parse(s: &str) -> Option<LibCallKind> {
        LibCallKind::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for LibCallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expression node: a kind plus an optional source reference. Equality
/// compares kinds only.
#[derive(Debug, Clone)]
pub struct ThExpr {
    pub kind: ThExprKind,
    pub source: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThExprKind {
    Const(ThConst),
    /// Fresh empty record.
    Object,
    Tuple(Vec<ThExpr>),
    Name(String),
    Attr(Box<ThExpr>, String),
    Subscr(Box<ThExpr>, Box<ThExpr>),
    /// Positional-only call.
    Call(Box<ThExpr>, Vec<ThExpr>),
    /// Tagged invocation of a backend primitive; keys are significant per kind.
    LibCall(LibCallKind, Vec<(String, ThExpr)>),
    BinOp(ThBinOp, Box<ThExpr>, Box<ThExpr>),
    UnaryOp(ThUnaryOp, Box<ThExpr>),
}

impl PartialEq for ThExpr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl ThExpr {
    pub fn new(kind: ThExprKind) -> Self {
        ThExpr { kind, source: None }
    }

    pub fn with_source(mut self, source: Option<SourceRange>) -> Self {
        self.source = source;
        self
    }

    pub fn int(value: i64) -> Self {
        Self::new(ThExprKind::Const(ThConst::Int(value)))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ThExprKind::Const(ThConst::Float(value)))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ThExprKind::Const(ThConst::Bool(value)))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::new(ThExprKind::Const(ThConst::Str(value.into())))
    }

    pub fn none() -> Self {
        Self::new(ThExprKind::Const(ThConst::None))
    }

    pub fn object() -> Self {
        Self::new(ThExprKind::Object)
    }

    pub fn tuple(elements: Vec<ThExpr>) -> Self {
        Self::new(ThExprKind::Tuple(elements))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(ThExprKind::Name(name.into()))
    }

    pub fn attr(base: ThExpr, name: impl Into<String>) -> Self {
        Self::new(ThExprKind::Attr(Box::new(base), name.into()))
    }

    pub fn subscr(base: ThExpr, index: ThExpr) -> Self {
        Self::new(ThExprKind::Subscr(Box::new(base), Box::new(index)))
    }

    pub fn call(callee: ThExpr, args: Vec<ThExpr>) -> Self {
        Self::new(ThExprKind::Call(Box::new(callee), args))
    }

    pub fn libcall(kind: LibCallKind, params: Vec<(String, ThExpr)>) -> Self {
        Self::new(ThExprKind::LibCall(kind, params))
    }

    pub fn binop(op: ThBinOp, left: ThExpr, right: ThExpr) -> Self {
        Self::new(ThExprKind::BinOp(op, Box::new(left), Box::new(right)))
    }

    pub fn unaryop(op: ThUnaryOp, operand: ThExpr) -> Self {
        Self::new(ThExprKind::UnaryOp(op, Box::new(operand)))
    }

    /// Whether this expression may appear on the left of an `Assign`.
    pub fn is_left_expr(&self) -> bool {
        matches!(
            self.kind,
            ThExprKind::Name(_) | ThExprKind::Attr(..) | ThExprKind::Subscr(..)
        )
    }
}
