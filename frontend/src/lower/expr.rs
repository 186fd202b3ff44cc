//! Expression lowering.

use crate::ast::types::{Constant, Expr, ExprKind};
use crate::error::{FrontendError, Result};
use crate::names::{
    flatten_attr_path, parse_bin_op, parse_bool_op, parse_compare_op, parse_unary_op,
};
use crate::thir::{LibCallKind, ThBinOp, ThExpr, ThUnaryOp};

use super::Translator;

impl Translator {
    pub(crate) fn visit_expr(&mut self, expr: &Expr) -> Result<ThExpr> {
        let lowered = match &expr.kind {
            ExprKind::Constant(c) => lower_constant(c),

            ExprKind::Name(name) => ThExpr::name(name.clone()),

            ExprKind::BinOp { left, op, right } => {
                let l = self.visit_expr(left)?;
                let r = self.visit_expr(right)?;
                match parse_bin_op(*op) {
                    Some(op) => ThExpr::binop(op, l, r),
                    // a @ b goes through the matmul protocol
                    None => ThExpr::call(ThExpr::attr(l, "__matmul__"), vec![r]),
                }
            }

            ExprKind::BoolOp { op, values } => {
                let op = parse_bool_op(*op);
                let mut iter = values.iter();
                let first = iter.next().ok_or_else(|| {
                    FrontendError::malformed("boolean operation without operands", expr.range)
                })?;
                let mut acc = self.visit_expr(first)?;
                for value in iter {
                    acc = ThExpr::binop(op, acc, self.visit_expr(value)?);
                }
                acc
            }

            // a < b < c  ==>  (a < b) and (b < c); > and >= flip their
            // operands, `is not`/`not in` negate
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let mut prev = self.visit_expr(left)?;
                let mut acc: Option<ThExpr> = None;
                for (op, comparator) in ops.iter().zip(comparators) {
                    let cur = self.visit_expr(comparator)?;
                    let norm = parse_compare_op(*op);
                    let (a, b) = if norm.flip {
                        (cur.clone(), prev)
                    } else {
                        (prev, cur.clone())
                    };
                    let mut pair = ThExpr::binop(norm.op, a, b);
                    if norm.negate {
                        pair = ThExpr::unaryop(ThUnaryOp::Not, pair);
                    }
                    acc = Some(match acc {
                        None => pair,
                        Some(joined) => ThExpr::binop(ThBinOp::And, joined, pair),
                    });
                    prev = cur;
                }
                acc.ok_or_else(|| {
                    FrontendError::malformed("comparison without operands", expr.range)
                })?
            }

            ExprKind::UnaryOp { op, operand } => {
                ThExpr::unaryop(parse_unary_op(*op), self.visit_expr(operand)?)
            }

            // body if test else orelse  ==>  (test and body) or orelse
            ExprKind::Ternary { test, body, orelse } => {
                let test = self.visit_expr(test)?;
                let body = self.visit_expr(body)?;
                let orelse = self.visit_expr(orelse)?;
                ThExpr::binop(
                    ThBinOp::Or,
                    ThExpr::binop(ThBinOp::And, test, body),
                    orelse,
                )
            }

            ExprKind::Call {
                func,
                args,
                keywords,
            } => self.lower_call(func, args, keywords)?,

            ExprKind::Attribute { value, attr } => {
                ThExpr::attr(self.visit_expr(value)?, attr.clone())
            }

            ExprKind::Subscript { value, index } => {
                ThExpr::subscr(self.visit_expr(value)?, self.visit_expr(index)?)
            }

            // a[l:u:s] indexes with a slice() value
            ExprKind::Slice { lower, upper, step } => {
                let mut bound = |side: &Option<Box<Expr>>| -> Result<ThExpr> {
                    match side {
                        Some(e) => self.visit_expr(e),
                        None => Ok(ThExpr::none()),
                    }
                };
                let args = vec![bound(lower)?, bound(upper)?, bound(step)?];
                ThExpr::call(ThExpr::name("slice"), args)
            }

            ExprKind::Tuple(elements) => {
                let mut lowered = Vec::with_capacity(elements.len());
                for element in elements {
                    lowered.push(self.visit_expr(element)?);
                }
                ThExpr::tuple(lowered)
            }

            ExprKind::List(elements) => {
                let mut params = Vec::with_capacity(elements.len());
                for (i, element) in elements.iter().enumerate() {
                    params.push((format!("param${i}"), self.visit_expr(element)?));
                }
                ThExpr::libcall(LibCallKind::GenList, params)
            }

            // Expansion entries ({**d}) are dropped
            ExprKind::Dict(entries) => {
                let mut params = Vec::new();
                let mut i = 0;
                for (key, value) in entries {
                    let Some(key) = key else { continue };
                    let pair = ThExpr::tuple(vec![self.visit_expr(key)?, self.visit_expr(value)?]);
                    params.push((format!("param${i}"), pair));
                    i += 1;
                }
                ThExpr::libcall(LibCallKind::GenDict, params)
            }

            // A stray * expression outside a call keeps its inner value
            ExprKind::Starred(inner) => self.visit_expr(inner)?,
        };

        Ok(lowered.with_source(expr.range))
    }

    /// Lower a call site. `super` and the `LibCall` pseudo-module are
    /// recognized syntactically; any keyword argument or unpacking routes the
    /// call through `callKV`; everything else is a plain positional `Call`.
    fn lower_call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        keywords: &[(Option<String>, Expr)],
    ) -> Result<ThExpr> {
        if let ExprKind::Name(name) = &func.kind {
            if name == "super" {
                return self.lower_super(args);
            }
        }

        if let Some(path) = flatten_attr_path(func) {
            if path[0] == "LibCall" && path.len() >= 2 {
                return self.lower_explicit_libcall(&path[1..], args, keywords);
            }
        }

        let has_unpack = args.iter().any(|a| matches!(a.kind, ExprKind::Starred(_)));
        if keywords.is_empty() && !has_unpack {
            let callee = self.visit_expr(func)?;
            let mut lowered = Vec::with_capacity(args.len());
            for arg in args {
                lowered.push(self.visit_expr(arg)?);
            }
            return Ok(ThExpr::call(callee, lowered));
        }

        let mut params = vec![("$func".to_string(), self.visit_expr(func)?)];
        params.extend(self.lower_call_params(args, keywords)?);
        Ok(ThExpr::libcall(LibCallKind::CallKV, params))
    }

    /// Key/value argument encoding shared by `callKV` and explicit LibCalls:
    /// positional arguments as `param$i`, `*e` as `$varargs`, `**e` as
    /// `$kwargs`, keywords under their own names.
    fn lower_call_params(
        &mut self,
        args: &[Expr],
        keywords: &[(Option<String>, Expr)],
    ) -> Result<Vec<(String, ThExpr)>> {
        let mut params = Vec::new();
        let mut position = 0;
        for arg in args {
            match &arg.kind {
                ExprKind::Starred(inner) => {
                    params.push(("$varargs".to_string(), self.visit_expr(inner)?));
                }
                _ => {
                    params.push((format!("param${position}"), self.visit_expr(arg)?));
                    position += 1;
                }
            }
        }
        for (name, value) in keywords {
            match name {
                Some(name) => params.push((name.clone(), self.visit_expr(value)?)),
                None => params.push(("$kwargs".to_string(), self.visit_expr(value)?)),
            }
        }
        Ok(params)
    }

    // super()      ==>  LibCall.super(baseClass=__class__, self=__self__)
    // super(a)     ==>  LibCall.super(baseClass=a, self=__self__)
    // super(a, b)  ==>  LibCall.super(baseClass=a, self=b)
    fn lower_super(&mut self, args: &[Expr]) -> Result<ThExpr> {
        let base_class = match args.first() {
            Some(a) => self.visit_expr(a)?,
            None => ThExpr::name("__class__"),
        };
        let self_value = match args.get(1) {
            Some(a) => self.visit_expr(a)?,
            None => ThExpr::name("__self__"),
        };
        Ok(ThExpr::libcall(
            LibCallKind::Super,
            vec![
                ("baseClass".to_string(), base_class),
                ("self".to_string(), self_value),
            ],
        ))
    }

    // LibCall.getAttr(...) / LibCall.DEBUG(...) / LibCall.objectClass(...)
    // keep their kind; any other path becomes LibCall.explicit with the
    // remaining attribute path as $func.
    fn lower_explicit_libcall(
        &mut self,
        path: &[String],
        args: &[Expr],
        keywords: &[(Option<String>, Expr)],
    ) -> Result<ThExpr> {
        let direct = if let [single] = path {
            match single.as_str() {
                "getAttr" => Some(LibCallKind::GetAttr),
                "DEBUG" => Some(LibCallKind::Debug),
                "objectClass" => Some(LibCallKind::ObjectClass),
                _ => None,
            }
        } else {
            None
        };

        let mut params = Vec::new();
        let kind = match direct {
            Some(kind) => kind,
            None => {
                params.push(("$func".to_string(), ThExpr::str(path.join("."))));
                LibCallKind::Explicit
            }
        };
        params.extend(self.lower_call_params(args, keywords)?);
        Ok(ThExpr::libcall(kind, params))
    }
}

fn lower_constant(constant: &Constant) -> ThExpr {
    match constant {
        Constant::Int(v) => ThExpr::int(*v),
        Constant::Float(v) => ThExpr::float(*v),
        Constant::Str(v) => ThExpr::str(v.clone()),
        Constant::Bool(v) => ThExpr::bool(*v),
        Constant::None => ThExpr::none(),
        // The placeholder value of stub bodies carries no information
        Constant::Ellipsis => ThExpr::none(),
    }
}
