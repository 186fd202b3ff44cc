//! AST to ThIR lowering
//!
//! The translator is a node-dispatched visitor: one match arm per AST node
//! kind, each returning the lowered statement or expression. All desugaring
//! happens here — classes, destructuring, augmented assignment, imports,
//! `with`, `while`, default arguments — so the backend only ever sees the
//! small ThIR core.
//!
//! Statement lists fold into a right-associated `Seq` with one departure from
//! textual order: a function or class definition takes the remaining
//! statements of its block as the *continuation* of the emitted `FunDef`/class
//! block, so the defined name is bound exactly once.

mod def;
mod expr;
mod stmt;

use either::Either;

use crate::ast::types::{Expr, Module, Stmt, StmtKind};
use crate::error::Result;
use crate::names::{extract_local_def, extract_single_import};
use crate::thir::{LibCallKind, ThExpr, ThStmt};

/// Iteration budget used when unrolling `while` loops into bounded `ForIn`.
/// The symbolic engine cannot fix-point arbitrary loops.
pub const WHILE_UNROLL_BOUND: i64 = 300;

/// Prefix of translator-minted temporaries. Reserved; user code must not use it.
pub const IMM_PREFIX: &str = "$Imm";

/// A borrowed AST node of either kind, for the combined [`Translator::visit`]
/// entry point.
#[derive(Debug, Clone, Copy)]
pub enum AstRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// The lowering engine. One instance translates one module at a time; the
/// temporary counter resets on every [`translate_module`](Self::translate_module)
/// call, so fresh translators produce structurally identical output for the
/// same input.
pub struct Translator {
    ignore_assert: bool,
    module_qual: String,
    next_imm: u32,
}

impl Translator {
    /// `ignore_assert` comes from configuration and makes `assert` lower to
    /// `Pass`.
    pub fn new(ignore_assert: bool) -> Self {
        Translator {
            ignore_assert,
            module_qual: String::new(),
            next_imm: 0,
        }
    }

    /// Lower a whole module to `Let("$module", …, Object())`.
    ///
    /// The body is the translated statement list followed by an export pass:
    /// one `exportGlobal` per local definition that is not import-bound, not a
    /// dunder, and not the `LibCall` marker. Every local definition (imports
    /// included) gets an uninitialized `Let` around the body.
    pub fn translate_module(&mut self, qual: &str, module: &Module) -> Result<ThStmt> {
        self.next_imm = 0;
        self.module_qual = qual.to_string();

        let body = self.visit_array(&module.body)?;

        let locals = extract_local_def(&module.body, &[]);
        let imports = extract_single_import(&module.body);

        let mut exports = Vec::new();
        for name in &locals {
            if imports.contains(name) || name.starts_with("__") || name == "LibCall" {
                continue;
            }
            exports.push(ThStmt::expr(ThExpr::libcall(
                LibCallKind::ExportGlobal,
                vec![
                    ("$module".to_string(), ThExpr::name("$module")),
                    (name.clone(), ThExpr::name(name.clone())),
                ],
            )));
        }

        let mut stmt = ThStmt::seq(body, ThStmt::seq_all(exports));
        for name in locals.iter().rev() {
            stmt = ThStmt::let_(name.clone(), stmt, None);
        }

        Ok(ThStmt::let_("$module", stmt, Some(ThExpr::object())))
    }

    /// Combined dispatch: lower either node kind.
    pub fn visit(&mut self, node: AstRef<'_>) -> Result<Either<ThStmt, ThExpr>> {
        match node {
            AstRef::Stmt(stmt) => Ok(Either::Left(self.visit_stmt(stmt)?)),
            AstRef::Expr(expr) => Ok(Either::Right(self.visit_expr(expr)?)),
        }
    }

    /// Fold a statement list into a right-associated `Seq`. Function and
    /// class definitions capture the remaining statements as their
    /// continuation.
    pub(crate) fn visit_array(&mut self, stmts: &[Stmt]) -> Result<ThStmt> {
        let mut lowered = Vec::new();
        for (i, stmt) in stmts.iter().enumerate() {
            match &stmt.kind {
                StmtKind::FunctionDef { .. } => {
                    let rest = self.visit_array(&stmts[i + 1..])?;
                    lowered.push(self.lower_function_def(stmt, rest)?);
                    return Ok(ThStmt::seq_all(lowered));
                }
                StmtKind::ClassDef { .. } => {
                    let rest = self.visit_array(&stmts[i + 1..])?;
                    lowered.push(self.lower_class_def(stmt, rest)?);
                    return Ok(ThStmt::seq_all(lowered));
                }
                _ => lowered.push(self.visit_stmt(stmt)?),
            }
        }
        Ok(ThStmt::seq_all(lowered))
    }

    /// Lower a function suite: translated statements, a trailing
    /// `Return None`, and an uninitialized `Let` per block-local name.
    pub(crate) fn lower_function_body(&mut self, body: &[Stmt], params: &[String]) -> Result<ThStmt> {
        let locals = extract_local_def(body, params);
        let suite = self.visit_array(body)?;

        let mut stmt = ThStmt::seq(suite, ThStmt::return_(ThExpr::none()));
        for name in locals.iter().rev() {
            stmt = ThStmt::let_(name.clone(), stmt, None);
        }
        Ok(stmt)
    }

    /// Mint a fresh `$Imm{n}` temporary, starting at `$Imm1`.
    pub(crate) fn fresh_imm(&mut self) -> String {
        self.next_imm += 1;
        format!("{IMM_PREFIX}{}", self.next_imm)
    }

    pub(crate) fn module_qual(&self) -> &str {
        &self.module_qual
    }

    pub(crate) fn ignore_assert(&self) -> bool {
        self.ignore_assert
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use crate::thir::{ThExprKind, ThStmtKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_module_shape_and_exports() {
        let lowered = lower_module("x = 1\n_y = 2\n__hidden = 3\nimport os\n");

        // Lets wrap in definition order: x, _y, __hidden, os
        let ThStmtKind::Let(module_name, body, _) = &lowered.kind else {
            panic!()
        };
        assert_eq!(module_name, "$module");
        let mut names = Vec::new();
        let mut cursor: &ThStmt = body;
        while let ThStmtKind::Let(name, next, None) = &cursor.kind {
            names.push(name.clone());
            cursor = next;
        }
        assert_eq!(names, ["x", "_y", "__hidden", "os"]);

        // Export pass: x and _y only (dunder and import excluded)
        let (_, exports) = module_body(&lowered);
        let mut exported = Vec::new();
        let mut cursor = exports;
        loop {
            let stmt = match &cursor.kind {
                ThStmtKind::Seq(a, b) => {
                    let s: &ThStmt = a;
                    cursor = b;
                    s
                }
                _ => {
                    exported.push(cursor);
                    break;
                }
            };
            exported.push(stmt);
        }
        let mut seen = Vec::new();
        for stmt in exported {
            let ThStmtKind::Expr(e) = &stmt.kind else {
                panic!("expected Expr export, got {:?}", stmt.kind)
            };
            let ThExprKind::LibCall(kind, params) = &e.kind else {
                panic!()
            };
            assert_eq!(*kind, LibCallKind::ExportGlobal);
            assert_eq!(params[0].0, "$module");
            seen.push(params[1].0.clone());
        }
        assert_eq!(seen, ["x", "_y"]);
    }

    #[test]
    fn test_determinism_across_fresh_translators() {
        let source = "def f(a, b=1):\n    while a < b:\n        a, b = b, a\n    return a\n";
        let module = parse_module(source);
        let first = Translator::new(false).translate_module("m", &module).unwrap();
        let second = Translator::new(false).translate_module("m", &module).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_counter_resets_between_translations() {
        let source = "a, b = t\n";
        let module = parse_module(source);
        let mut translator = Translator::new(true);
        let first = translator.translate_module("m", &module).unwrap();
        let second = translator.translate_module("m", &module).unwrap();
        // Same $Imm numbering both times
        assert_eq!(first, second);
    }

    #[test]
    fn test_visit_dispatches_both_kinds() {
        let module = parse_module("x\npass\n");
        let mut translator = Translator::new(true);
        let StmtKind::Expr(expr) = &module.body[0].kind else {
            panic!()
        };
        assert!(translator
            .visit(AstRef::Expr(expr))
            .unwrap()
            .is_right());
        assert!(translator
            .visit(AstRef::Stmt(&module.body[1]))
            .unwrap()
            .is_left());
    }
}
