//! ThIR statements.

use crate::source::SourceRange;

use super::expr::ThExpr;

/// Statement node: a kind plus an optional source reference. Equality
/// compares kinds only.
#[derive(Debug, Clone)]
pub struct ThStmt {
    pub kind: ThStmtKind,
    pub source: Option<SourceRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThStmtKind {
    Pass,
    /// Evaluate and discard.
    Expr(ThExpr),
    /// Sequential composition, right-associated by convention.
    Seq(Box<ThStmt>, Box<ThStmt>),
    /// Pure store; the left side must be a left-expression.
    Assign(ThExpr, ThExpr),
    If(ThExpr, Box<ThStmt>, Box<ThStmt>),
    /// Binds the identifier in the body's scope while iterating.
    ForIn(String, ThExpr, Box<ThStmt>),
    Break,
    Continue,
    Return(ThExpr),
    /// Introduces the identifier in the scope of the body. Without an
    /// initializer the binding exists but is uninitialized.
    Let(String, Box<ThStmt>, Option<ThExpr>),
    /// Defines `name` as a function value; `rest` is the continuation in
    /// which `name` is bound.
    FunDef {
        name: String,
        params: Vec<String>,
        body: Box<ThStmt>,
        rest: Box<ThStmt>,
    },
}

impl PartialEq for ThStmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl ThStmt {
    pub fn new(kind: ThStmtKind) -> Self {
        ThStmt { kind, source: None }
    }

    pub fn with_source(mut self, source: Option<SourceRange>) -> Self {
        self.source = source;
        self
    }

    pub fn pass() -> Self {
        Self::new(ThStmtKind::Pass)
    }

    pub fn expr(expr: ThExpr) -> Self {
        Self::new(ThStmtKind::Expr(expr))
    }

    pub fn seq(first: ThStmt, second: ThStmt) -> Self {
        Self::new(ThStmtKind::Seq(Box::new(first), Box::new(second)))
    }

    /// Right-associated fold of a statement list. Empty lists become `Pass`.
    pub fn seq_all(stmts: Vec<ThStmt>) -> Self {
        let mut iter = stmts.into_iter().rev();
        let last = match iter.next() {
            Some(s) => s,
            None => return Self::pass(),
        };
        iter.fold(last, |acc, s| Self::seq(s, acc))
    }

    pub fn assign(lhs: ThExpr, rhs: ThExpr) -> Self {
        Self::new(ThStmtKind::Assign(lhs, rhs))
    }

    pub fn if_(cond: ThExpr, then: ThStmt, orelse: ThStmt) -> Self {
        Self::new(ThStmtKind::If(cond, Box::new(then), Box::new(orelse)))
    }

    pub fn for_in(ident: impl Into<String>, iter: ThExpr, body: ThStmt) -> Self {
        Self::new(ThStmtKind::ForIn(ident.into(), iter, Box::new(body)))
    }

    pub fn break_() -> Self {
        Self::new(ThStmtKind::Break)
    }

    pub fn continue_() -> Self {
        Self::new(ThStmtKind::Continue)
    }

    pub fn return_(expr: ThExpr) -> Self {
        Self::new(ThStmtKind::Return(expr))
    }

    pub fn let_(ident: impl Into<String>, body: ThStmt, init: Option<ThExpr>) -> Self {
        Self::new(ThStmtKind::Let(ident.into(), Box::new(body), init))
    }

    pub fn fun_def(
        name: impl Into<String>,
        params: Vec<String>,
        body: ThStmt,
        rest: ThStmt,
    ) -> Self {
        Self::new(ThStmtKind::FunDef {
            name: name.into(),
            params,
            body: Box::new(body),
            rest: Box::new(rest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileId, SourceRange};

    #[test]
    fn test_seq_all_is_right_associated() {
        let s = ThStmt::seq_all(vec![ThStmt::pass(), ThStmt::break_(), ThStmt::continue_()]);
        match s.kind {
            ThStmtKind::Seq(a, b) => {
                assert_eq!(*a, ThStmt::pass());
                match b.kind {
                    ThStmtKind::Seq(c, d) => {
                        assert_eq!(*c, ThStmt::break_());
                        assert_eq!(*d, ThStmt::continue_());
                    }
                    other => panic!("expected Seq, got {other:?}"),
                }
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn test_seq_all_edges() {
        assert_eq!(ThStmt::seq_all(vec![]), ThStmt::pass());
        assert_eq!(ThStmt::seq_all(vec![ThStmt::break_()]), ThStmt::break_());
    }

    #[test]
    fn test_equality_ignores_source() {
        let range = Some(SourceRange::new(FileId(0), 10, 4));
        let a = ThStmt::assign(ThExpr::name("x"), ThExpr::int(1)).with_source(range);
        let b = ThStmt::assign(ThExpr::name("x"), ThExpr::int(1));
        assert_eq!(a, b);
    }
}
