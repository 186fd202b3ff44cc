//! Statement lowering.

use crate::ast::types::{BinOperator, Expr, ExprKind, ImportName, Stmt, StmtKind};
use crate::error::{FrontendError, Result};
use crate::names::{parse_bin_op, scan_qual_path};
use crate::thir::{LibCallKind, ThExpr, ThStmt};

use super::{Translator, WHILE_UNROLL_BOUND};

impl Translator {
    pub(crate) fn visit_stmt(&mut self, stmt: &Stmt) -> Result<ThStmt> {
        let lowered = match &stmt.kind {
            StmtKind::Pass => ThStmt::pass(),
            StmtKind::Break => ThStmt::break_(),
            StmtKind::Continue => ThStmt::continue_(),
            StmtKind::Expr(expr) => ThStmt::expr(self.visit_expr(expr)?),

            StmtKind::Return(value) => {
                let expr = match value {
                    Some(v) => self.visit_expr(v)?,
                    None => ThExpr::none(),
                };
                ThStmt::return_(expr)
            }

            StmtKind::Assign { targets, value } => {
                let rhs = self.visit_expr(value)?;
                if let [target] = targets.as_slice() {
                    self.lower_assign_target(target, rhs)?
                } else {
                    // a = b = e shares one temporary
                    let tmp = self.fresh_imm();
                    let mut assigns = Vec::new();
                    for target in targets {
                        assigns.push(self.lower_assign_target(target, ThExpr::name(&tmp))?);
                    }
                    ThStmt::let_(tmp, ThStmt::seq_all(assigns), Some(rhs))
                }
            }

            StmtKind::AugAssign { target, op, value } => self.lower_aug_assign(target, *op, value)?,

            StmtKind::If { test, body, orelse } => {
                let cond = self.visit_expr(test)?;
                let then = self.visit_array(body)?;
                let other = self.visit_array(orelse)?;
                ThStmt::if_(cond, then, other)
            }

            // while cond: body  ==>  bounded iteration; the else suite is dropped
            StmtKind::While { test, body, .. } => {
                let tmp = self.fresh_imm();
                let cond = self.visit_expr(test)?;
                let lowered_body = self.visit_array(body)?;
                ThStmt::for_in(
                    tmp,
                    ThExpr::call(ThExpr::name("range"), vec![ThExpr::int(WHILE_UNROLL_BOUND)]),
                    ThStmt::if_(cond, lowered_body, ThStmt::break_()),
                )
            }

            // The else suite is dropped
            StmtKind::For {
                target, iter, body, ..
            } => {
                let iter = self.visit_expr(iter)?;
                let lowered_body = self.visit_array(body)?;
                match &target.kind {
                    ExprKind::Name(name) => ThStmt::for_in(name.clone(), iter, lowered_body),
                    _ => {
                        // Destructure through a fresh loop variable
                        let tmp = self.fresh_imm();
                        let bind = self.lower_assign_target(target, ThExpr::name(&tmp))?;
                        ThStmt::for_in(tmp, iter, ThStmt::seq(bind, lowered_body))
                    }
                }
            }

            // with e as t: body  ==>  t = e; body   (__enter__/__exit__ are not invoked)
            StmtKind::With { items, body } => {
                let mut parts = Vec::new();
                for (ctx, target) in items {
                    let ctx = self.visit_expr(ctx)?;
                    parts.push(match target {
                        Some(target) => self.lower_assign_target(target, ctx)?,
                        None => ThStmt::expr(ctx),
                    });
                }
                parts.push(self.visit_array(body)?);
                ThStmt::seq_all(parts)
            }

            StmtKind::Raise(exc) => {
                let value = match exc {
                    Some(e) => self.visit_expr(e)?,
                    None => ThExpr::call(ThExpr::name("RuntimeError"), vec![]),
                };
                ThStmt::expr(ThExpr::libcall(
                    LibCallKind::Raise,
                    vec![("value".to_string(), value)],
                ))
            }

            // Handlers and the else suite are not lowered
            StmtKind::Try { body, finalbody } => {
                ThStmt::seq(self.visit_array(body)?, self.visit_array(finalbody)?)
            }

            StmtKind::Assert { test, msg } => {
                if self.ignore_assert() {
                    ThStmt::pass()
                } else {
                    let cond = self.visit_expr(test)?;
                    let mut args = Vec::new();
                    if let Some(msg) = msg {
                        args.push(self.visit_expr(msg)?);
                    }
                    let raise = ThExpr::libcall(
                        LibCallKind::Raise,
                        vec![(
                            "value".to_string(),
                            ThExpr::call(ThExpr::name("AssertionError"), args),
                        )],
                    );
                    ThStmt::if_(cond, ThStmt::pass(), ThStmt::expr(raise))
                }
            }

            StmtKind::Import { names } => {
                let mut parts = Vec::new();
                for import in names {
                    parts.push(self.lower_import(import));
                }
                ThStmt::seq_all(parts)
            }

            StmtKind::ImportFrom {
                level,
                module,
                names,
            } => self.lower_import_from(*level, module, names),

            // Only the name-binding effect matters, and that is handled by
            // the local-definition scan
            StmtKind::Global(_) | StmtKind::Nonlocal(_) => ThStmt::pass(),

            // del is not modeled
            StmtKind::Del(_) => ThStmt::pass(),

            StmtKind::FunctionDef { .. } | StmtKind::ClassDef { .. } => {
                // Definitions are folded with their continuation by visit_array
                self.visit_array(std::slice::from_ref(stmt))?
            }
        };

        Ok(lowered.with_source(stmt.range))
    }

    /// Lower one assignment of `rhs` into `target`. Tuple and list targets
    /// destructure through a fresh temporary; starred elements are skipped.
    pub(crate) fn lower_assign_target(&mut self, target: &Expr, rhs: ThExpr) -> Result<ThStmt> {
        match &target.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => {
                let lhs = self.visit_expr(target)?;
                Ok(ThStmt::assign(lhs, rhs))
            }
            ExprKind::Tuple(elements) | ExprKind::List(elements) => {
                let tmp = self.fresh_imm();
                let mut assigns = Vec::new();
                for (i, element) in elements.iter().enumerate() {
                    if matches!(element.kind, ExprKind::Starred(_)) {
                        assigns.push(ThStmt::pass());
                        continue;
                    }
                    let item = ThExpr::subscr(ThExpr::name(&tmp), ThExpr::int(i as i64));
                    assigns.push(self.lower_assign_target(element, item)?);
                }
                Ok(ThStmt::let_(tmp, ThStmt::seq_all(assigns), Some(rhs)))
            }
            _ => Err(FrontendError::malformed(
                "assignment target must be a name, attribute, subscript, or sequence",
                target.range,
            )),
        }
    }

    // x op= y  ==>  x = x op y, for left-expression targets only
    fn lower_aug_assign(&mut self, target: &Expr, op: BinOperator, value: &Expr) -> Result<ThStmt> {
        if !matches!(
            target.kind,
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. }
        ) {
            return Err(FrontendError::malformed(
                "augmented assignment target must be a name, attribute, or subscript",
                target.range,
            ));
        }

        let lhs = self.visit_expr(target)?;
        let current = self.visit_expr(target)?;
        let rhs = self.visit_expr(value)?;
        let combined = match parse_bin_op(op) {
            Some(op) => ThExpr::binop(op, current, rhs),
            // a @= b goes through the matmul protocol
            None => ThExpr::call(ThExpr::attr(current, "__matmul__"), vec![rhs]),
        };
        Ok(ThStmt::assign(lhs, combined))
    }

    // import a.b.c        ==>  LibCall.importQualified(qualPath="a.b.c")
    // import a as x       ==>  LibCall.import(qualPath="a", assignTo="x")
    // import … LibCall    ==>  pass (pseudo-module marker)
    fn lower_import(&mut self, import: &ImportName) -> ThStmt {
        if import.name.split('.').next_back() == Some("LibCall") {
            return ThStmt::pass();
        }
        match &import.alias {
            None => ThStmt::expr(ThExpr::libcall(
                LibCallKind::ImportQualified,
                vec![("qualPath".to_string(), ThExpr::str(import.name.clone()))],
            )),
            Some(alias) => ThStmt::expr(ThExpr::libcall(
                LibCallKind::Import,
                vec![
                    ("qualPath".to_string(), ThExpr::str(import.name.clone())),
                    ("assignTo".to_string(), ThExpr::str(alias.clone())),
                ],
            )),
        }
    }

    // from m import x as y  ==>  LibCall.import(qualPath="m.x", assignTo="y"), per name
    // from m import *       ==>  LibCall.import(qualPath="m.*")
    fn lower_import_from(&mut self, level: usize, module: &str, names: &[ImportName]) -> ThStmt {
        let qual = format!("{}{}", ".".repeat(level), module);
        let current = self.module_qual().to_string();
        let current = (!current.is_empty()).then_some(current.as_str());
        let base = scan_qual_path(&qual, current).last().cloned().unwrap_or_default();

        let join = |name: &str| {
            if base.is_empty() {
                name.to_string()
            } else {
                format!("{base}.{name}")
            }
        };

        if let [only] = names {
            if only.name == "*" {
                return ThStmt::expr(ThExpr::libcall(
                    LibCallKind::Import,
                    vec![("qualPath".to_string(), ThExpr::str(join("*")))],
                ));
            }
        }

        let mut parts = Vec::new();
        for import in names {
            if import.name == "LibCall" {
                parts.push(ThStmt::pass());
                continue;
            }
            let assign_to = import.alias.clone().unwrap_or_else(|| import.name.clone());
            parts.push(ThStmt::expr(ThExpr::libcall(
                LibCallKind::Import,
                vec![
                    ("qualPath".to_string(), ThExpr::str(join(&import.name))),
                    ("assignTo".to_string(), ThExpr::str(assign_to)),
                ],
            )));
        }
        ThStmt::seq_all(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::thir::{ThBinOp, ThExprKind, ThStmtKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_while_lowers_to_bounded_for() {
        let lowered = lower_module("while x < 10:\n    x = x + 1\n");
        let stmt = module_stmts(&lowered);
        let ThStmtKind::ForIn(ident, iter, body) = &stmt.kind else {
            panic!("expected ForIn, got {:?}", stmt.kind);
        };
        assert_eq!(ident, "$Imm1");
        assert_eq!(
            *iter,
            ThExpr::call(ThExpr::name("range"), vec![ThExpr::int(300)])
        );
        let ThStmtKind::If(cond, then, orelse) = &body.kind else {
            panic!("expected If, got {:?}", body.kind);
        };
        assert_eq!(
            *cond,
            ThExpr::binop(ThBinOp::Lt, ThExpr::name("x"), ThExpr::int(10))
        );
        assert_eq!(
            **then,
            ThStmt::assign(
                ThExpr::name("x"),
                ThExpr::binop(ThBinOp::Add, ThExpr::name("x"), ThExpr::int(1)),
            )
        );
        assert_eq!(**orelse, ThStmt::break_());
    }

    #[test]
    fn test_tuple_destructuring() {
        let lowered = lower_module("a, b = t\n");
        let stmt = module_stmts(&lowered);
        let expected = ThStmt::let_(
            "$Imm1",
            ThStmt::seq(
                ThStmt::assign(
                    ThExpr::name("a"),
                    ThExpr::subscr(ThExpr::name("$Imm1"), ThExpr::int(0)),
                ),
                ThStmt::assign(
                    ThExpr::name("b"),
                    ThExpr::subscr(ThExpr::name("$Imm1"), ThExpr::int(1)),
                ),
            ),
            Some(ThExpr::name("t")),
        );
        assert_eq!(*stmt, expected);
    }

    #[test]
    fn test_nested_destructuring_recurses() {
        let lowered = lower_module("a, (b, c) = t\n");
        let stmt = module_stmts(&lowered);
        let ThStmtKind::Let(outer, body, _) = &stmt.kind else {
            panic!()
        };
        assert_eq!(outer, "$Imm1");
        let (_, second) = as_seq(body);
        let ThStmtKind::Let(inner, inner_body, init) = &second.kind else {
            panic!("expected nested Let, got {:?}", second.kind);
        };
        assert_eq!(inner, "$Imm2");
        assert_eq!(
            init.clone().unwrap(),
            ThExpr::subscr(ThExpr::name("$Imm1"), ThExpr::int(1))
        );
        let (b_assign, _) = as_seq(inner_body);
        assert_eq!(
            *b_assign,
            ThStmt::assign(
                ThExpr::name("b"),
                ThExpr::subscr(ThExpr::name("$Imm2"), ThExpr::int(0)),
            )
        );
    }

    #[test]
    fn test_aug_assign() {
        let lowered = lower_module("x -= 2\n");
        let stmt = module_stmts(&lowered);
        assert_eq!(
            *stmt,
            ThStmt::assign(
                ThExpr::name("x"),
                ThExpr::binop(ThBinOp::Sub, ThExpr::name("x"), ThExpr::int(2)),
            )
        );
    }

    #[test]
    fn test_relative_import_resolves_against_module() {
        let lowered = lower_module_qual("from ..pkg import mod as m\n", "a.b.c");
        let stmt = module_stmts(&lowered);
        assert_eq!(
            *stmt,
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::Import,
                vec![
                    ("qualPath".to_string(), ThExpr::str("a.pkg.mod")),
                    ("assignTo".to_string(), ThExpr::str("m")),
                ],
            ))
        );
    }

    #[test]
    fn test_import_forms() {
        let lowered = lower_module("import a.b.c\nimport a as x\nfrom m import *\n");
        let stmt = module_stmts(&lowered);
        let (qualified, rest) = as_seq(stmt);
        assert_eq!(
            *qualified,
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::ImportQualified,
                vec![("qualPath".to_string(), ThExpr::str("a.b.c"))],
            ))
        );
        let (aliased, star) = as_seq(rest);
        assert_eq!(
            *aliased,
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::Import,
                vec![
                    ("qualPath".to_string(), ThExpr::str("a")),
                    ("assignTo".to_string(), ThExpr::str("x")),
                ],
            ))
        );
        assert_eq!(
            *star,
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::Import,
                vec![("qualPath".to_string(), ThExpr::str("m.*"))],
            ))
        );
    }

    #[test]
    fn test_libcall_import_is_pass() {
        let lowered = lower_module("import LibCall\nfrom .. import LibCall\n");
        let stmt = module_stmts(&lowered);
        let (first, second) = as_seq(stmt);
        assert_eq!(*first, ThStmt::pass());
        assert_eq!(*second, ThStmt::pass());
    }

    #[test]
    fn test_assert_kept() {
        let lowered = lower_module("assert x > 0, \"pos\"\n");
        let stmt = module_stmts(&lowered);
        let ThStmtKind::If(cond, then, orelse) = &stmt.kind else {
            panic!("expected If, got {:?}", stmt.kind);
        };
        // `>` normalizes to `<` with swapped operands
        assert_eq!(
            *cond,
            ThExpr::binop(ThBinOp::Lt, ThExpr::int(0), ThExpr::name("x"))
        );
        assert_eq!(**then, ThStmt::pass());
        assert_eq!(
            **orelse,
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::Raise,
                vec![(
                    "value".to_string(),
                    ThExpr::call(ThExpr::name("AssertionError"), vec![ThExpr::str("pos")]),
                )],
            ))
        );
    }

    #[test]
    fn test_assert_ignored_when_configured() {
        let module = parse_module("assert x > 0\n");
        let lowered = Translator::new(true).translate_module("m", &module).unwrap();
        assert_eq!(*module_stmts(&lowered), ThStmt::pass());
    }

    #[test]
    fn test_bare_raise_becomes_runtime_error() {
        let lowered = lower_module("raise\n");
        assert_eq!(
            *module_stmts(&lowered),
            ThStmt::expr(ThExpr::libcall(
                LibCallKind::Raise,
                vec![(
                    "value".to_string(),
                    ThExpr::call(ThExpr::name("RuntimeError"), vec![]),
                )],
            ))
        );
    }

    #[test]
    fn test_with_lowers_to_assign_then_body() {
        let lowered = lower_module("with open(p) as fh:\n    fh.read()\n");
        let stmt = module_stmts(&lowered);
        let (bind, body) = as_seq(stmt);
        assert_eq!(
            *bind,
            ThStmt::assign(
                ThExpr::name("fh"),
                ThExpr::call(ThExpr::name("open"), vec![ThExpr::name("p")]),
            )
        );
        let ThStmtKind::Expr(call) = &body.kind else {
            panic!()
        };
        assert!(matches!(call.kind, ThExprKind::Call(..)));
    }

    #[test]
    fn test_for_else_is_dropped() {
        let lowered = lower_module("for i in xs:\n    f(i)\nelse:\n    g()\n");
        let stmt = module_stmts(&lowered);
        let ThStmtKind::ForIn(ident, _, body) = &stmt.kind else {
            panic!("expected ForIn, got {:?}", stmt.kind);
        };
        assert_eq!(ident, "i");
        // No trace of the else suite anywhere in the loop body
        assert!(matches!(body.kind, ThStmtKind::Expr(_)));
    }

    #[test]
    fn test_del_and_global_become_pass() {
        let lowered = lower_module("del x\nglobal y\n");
        let (first, second) = as_seq(module_stmts(&lowered));
        assert_eq!(*first, ThStmt::pass());
        assert_eq!(*second, ThStmt::pass());
    }
}
