//! Debug pretty-printer for ThIR trees.
//!
//! The format is for humans reading IR dumps; it is not parsed back.

use std::fmt;

use super::expr::{ThBinOp, ThConst, ThExpr, ThExprKind, ThUnaryOp};
use super::stmt::{ThStmt, ThStmtKind};

impl fmt::Display for ThExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ThExprKind::Const(c) => write!(f, "{c}"),
            ThExprKind::Object => write!(f, "Object()"),
            ThExprKind::Tuple(elements) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                if elements.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ThExprKind::Name(name) => write!(f, "{name}"),
            ThExprKind::Attr(base, name) => write!(f, "{base}.{name}"),
            ThExprKind::Subscr(base, index) => write!(f, "{base}[{index}]"),
            ThExprKind::Call(callee, args) => {
                write!(f, "{callee}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            ThExprKind::LibCall(kind, params) => {
                write!(f, "LibCall.{kind}(")?;
                for (i, (key, value)) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                write!(f, ")")
            }
            ThExprKind::BinOp(op, l, r) => write!(f, "({l} {} {r})", bin_op_str(*op)),
            ThExprKind::UnaryOp(op, e) => write!(f, "({}{e})", unary_op_str(*op)),
        }
    }
}

impl fmt::Display for ThConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThConst::Int(v) => write!(f, "{v}"),
            ThConst::Float(v) => write!(f, "{v:?}"),
            ThConst::Bool(true) => write!(f, "True"),
            ThConst::Bool(false) => write!(f, "False"),
            ThConst::Str(s) => write!(f, "{s:?}"),
            ThConst::None => write!(f, "None"),
        }
    }
}

fn bin_op_str(op: ThBinOp) -> &'static str {
    match op {
        ThBinOp::Add => "+",
        ThBinOp::Sub => "-",
        ThBinOp::Mul => "*",
        ThBinOp::Div => "/",
        ThBinOp::FloorDiv => "//",
        ThBinOp::Mod => "%",
        ThBinOp::Pow => "**",
        ThBinOp::And => "and",
        ThBinOp::Or => "or",
        ThBinOp::Is => "is",
        ThBinOp::In => "in",
        ThBinOp::Lt => "<",
        ThBinOp::Lte => "<=",
        ThBinOp::Eq => "==",
        ThBinOp::Neq => "!=",
        ThBinOp::BitAnd => "&",
        ThBinOp::BitOr => "|",
        ThBinOp::BitXor => "^",
        ThBinOp::LShift => "<<",
        ThBinOp::RShift => ">>",
    }
}

fn unary_op_str(op: ThUnaryOp) -> &'static str {
    match op {
        ThUnaryOp::Neg => "-",
        ThUnaryOp::Not => "not ",
        ThUnaryOp::Invert => "~",
        ThUnaryOp::Pos => "+",
    }
}

impl fmt::Display for ThStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        write!(f, "  ")?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &ThStmt, indent: usize) -> fmt::Result {
    match &stmt.kind {
        ThStmtKind::Pass => {
            write_indent(f, indent)?;
            writeln!(f, "pass")
        }
        ThStmtKind::Expr(e) => {
            write_indent(f, indent)?;
            writeln!(f, "{e}")
        }
        ThStmtKind::Seq(a, b) => {
            write_stmt(f, a, indent)?;
            write_stmt(f, b, indent)
        }
        ThStmtKind::Assign(lhs, rhs) => {
            write_indent(f, indent)?;
            writeln!(f, "{lhs} := {rhs}")
        }
        ThStmtKind::If(cond, then, orelse) => {
            write_indent(f, indent)?;
            writeln!(f, "if {cond}:")?;
            write_stmt(f, then, indent + 1)?;
            write_indent(f, indent)?;
            writeln!(f, "else:")?;
            write_stmt(f, orelse, indent + 1)
        }
        ThStmtKind::ForIn(ident, iter, body) => {
            write_indent(f, indent)?;
            writeln!(f, "for {ident} in {iter}:")?;
            write_stmt(f, body, indent + 1)
        }
        ThStmtKind::Break => {
            write_indent(f, indent)?;
            writeln!(f, "break")
        }
        ThStmtKind::Continue => {
            write_indent(f, indent)?;
            writeln!(f, "continue")
        }
        ThStmtKind::Return(e) => {
            write_indent(f, indent)?;
            writeln!(f, "return {e}")
        }
        ThStmtKind::Let(ident, body, init) => {
            write_indent(f, indent)?;
            match init {
                Some(e) => writeln!(f, "let {ident} = {e} in:")?,
                None => writeln!(f, "let {ident} in:")?,
            }
            write_stmt(f, body, indent + 1)
        }
        ThStmtKind::FunDef {
            name,
            params,
            body,
            rest,
        } => {
            write_indent(f, indent)?;
            writeln!(f, "def {name}({}):", params.join(", "))?;
            write_stmt(f, body, indent + 1)?;
            write_stmt(f, rest, indent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thir::LibCallKind;

    #[test]
    fn test_expr_display() {
        let e = ThExpr::binop(
            ThBinOp::Lt,
            ThExpr::name("x"),
            ThExpr::call(ThExpr::attr(ThExpr::name("t"), "size"), vec![ThExpr::int(0)]),
        );
        assert_eq!(e.to_string(), "(x < t.size(0))");
    }

    #[test]
    fn test_libcall_display() {
        let e = ThExpr::libcall(
            LibCallKind::Import,
            vec![("qualPath".to_string(), ThExpr::str("a.b"))],
        );
        assert_eq!(e.to_string(), "LibCall.import(qualPath=\"a.b\")");
    }

    #[test]
    fn test_stmt_display_nesting() {
        let s = ThStmt::let_(
            "x",
            ThStmt::seq(
                ThStmt::assign(ThExpr::name("x"), ThExpr::int(1)),
                ThStmt::return_(ThExpr::name("x")),
            ),
            None,
        );
        assert_eq!(s.to_string(), "let x in:\n  x := 1\n  return x\n");
    }
}
