//! Python AST to internal AST conversion
//!
//! Walks the object graph returned by `ast.parse`, dispatching on node class
//! names, and rebuilds it as the owned types in [`super::types`]. Constructs
//! the analyzer cannot model precisely are converted to a harmless
//! approximation here (see the match arms below); truly unknown expression
//! nodes are an error for the file.

use pyo3::prelude::*;
use pyo3::types::{PyAnyMethods, PyList, PyListMethods, PyTypeMethods};

use crate::ast::types::*;
use crate::error::{FrontendError, Result};
use crate::source::{FileId, LineIndex, SourceRange};

/// Converter from Python AST to internal AST
pub struct AstConverter {
    file: FileId,
    line_index: LineIndex,
}

impl AstConverter {
    pub fn new(file: FileId, source: &str) -> Self {
        AstConverter {
            file,
            line_index: LineIndex::new(source),
        }
    }

    // Module(stmt* body, type_ignore* type_ignores)
    pub fn convert_module(
        &self,
        py_ast: &Bound<'_, PyAny>,
        path: std::path::PathBuf,
    ) -> Result<Module> {
        Python::attach(|_py| {
            let py_stmts = self.get_list_attr(py_ast, "body");

            let mut body = Vec::new();
            for py_stmt in py_stmts.iter() {
                body.push(self.convert_stmt(&py_stmt)?);
            }

            Ok(Module { path, body })
        })
    }

    /// Convert a Python statement node. Statement kinds outside the supported
    /// set become `Pass` (with their source range kept) instead of failing.
    fn convert_stmt(&self, py_stmt: &Bound<'_, PyAny>) -> Result<Stmt> {
        Python::attach(|_py| {
            let range = self.range(py_stmt);
            let class_name = py_stmt.get_type().name().unwrap();

            let kind = match class_name.to_string().as_str() {
                "FunctionDef" | "AsyncFunctionDef" => self.convert_function_def(py_stmt)?,
                "ClassDef" => self.convert_class_def(py_stmt)?,
                "Return" => {
                    let py_value = py_stmt.getattr("value").unwrap();
                    let value = if py_value.is_none() {
                        None
                    } else {
                        Some(self.convert_expr(&py_value)?)
                    };
                    StmtKind::Return(value)
                }
                "Assign" => self.convert_assign(py_stmt)?,
                "AnnAssign" => self.convert_ann_assign(py_stmt)?,
                "AugAssign" => self.convert_aug_assign(py_stmt)?,
                "For" | "AsyncFor" => self.convert_for(py_stmt)?,
                "While" => StmtKind::While {
                    test: self.convert_expr(&py_stmt.getattr("test").unwrap())?,
                    body: self.convert_stmt_list(py_stmt, "body")?,
                    orelse: self.convert_stmt_list(py_stmt, "orelse")?,
                },
                "If" => StmtKind::If {
                    test: self.convert_expr(&py_stmt.getattr("test").unwrap())?,
                    body: self.convert_stmt_list(py_stmt, "body")?,
                    orelse: self.convert_stmt_list(py_stmt, "orelse")?,
                },
                "With" | "AsyncWith" => self.convert_with(py_stmt)?,
                "Raise" => {
                    // Raise(expr? exc, expr? cause) - 'cause' is dropped
                    let py_exc = py_stmt.getattr("exc").unwrap();
                    let exc = if py_exc.is_none() {
                        None
                    } else {
                        Some(self.convert_expr(&py_exc)?)
                    };
                    StmtKind::Raise(exc)
                }
                // Try(stmt* body, excepthandler* handlers, stmt* orelse, stmt* finalbody)
                // Handlers and the else suite are not modeled.
                "Try" | "TryStar" => StmtKind::Try {
                    body: self.convert_stmt_list(py_stmt, "body")?,
                    finalbody: self.convert_stmt_list(py_stmt, "finalbody")?,
                },
                "Assert" => {
                    let py_msg = py_stmt.getattr("msg").unwrap();
                    let msg = if py_msg.is_none() {
                        None
                    } else {
                        Some(self.convert_expr(&py_msg)?)
                    };
                    StmtKind::Assert {
                        test: self.convert_expr(&py_stmt.getattr("test").unwrap())?,
                        msg,
                    }
                }
                "Import" => StmtKind::Import {
                    names: self.convert_import_names(py_stmt)?,
                },
                "ImportFrom" => self.convert_import_from(py_stmt)?,
                "Global" => StmtKind::Global(self.convert_name_list(py_stmt)),
                "Nonlocal" => StmtKind::Nonlocal(self.convert_name_list(py_stmt)),
                "Expr" => StmtKind::Expr(self.convert_expr(&py_stmt.getattr("value").unwrap())?),
                "Delete" => {
                    let targets = self.get_list_attr(py_stmt, "targets");
                    let mut exprs = Vec::new();
                    for t in targets.iter() {
                        exprs.push(self.convert_expr(&t)?);
                    }
                    StmtKind::Del(exprs)
                }
                "Pass" => StmtKind::Pass,
                "Break" => StmtKind::Break,
                "Continue" => StmtKind::Continue,
                // Anything else (Match, ...) is out of the modeled subset
                _ => StmtKind::Pass,
            };

            Ok(Stmt::new(kind, range))
        })
    }

    // FunctionDef(identifier name, arguments args, stmt* body, expr* decorator_list,
    //             expr? returns, string? type_comment, type_param* type_params)
    // The decorator list and annotations are dropped.
    fn convert_function_def(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let name = self.get_string_attr(node, "name");
            let params = self.convert_params(&node.getattr("args").unwrap())?;
            let body = self.convert_stmt_list(node, "body")?;

            Ok(StmtKind::FunctionDef { name, params, body })
        })
    }

    // arguments = (arg* posonlyargs, arg* args, arg? vararg, arg* kwonlyargs,
    //              expr* kw_defaults, arg? kwarg, expr* defaults)
    fn convert_params(&self, py_args: &Bound<'_, PyAny>) -> Result<Params> {
        Python::attach(|_py| {
            let mut names: Vec<String> = Vec::new();
            for py_arg in self.get_list_attr(py_args, "posonlyargs").iter() {
                names.push(self.get_string_attr(&py_arg, "arg"));
            }
            for py_arg in self.get_list_attr(py_args, "args").iter() {
                names.push(self.get_string_attr(&py_arg, "arg"));
            }

            // defaults align with the tail of the positional list
            let mut defaults = Vec::new();
            for py_def in self.get_list_attr(py_args, "defaults").iter() {
                defaults.push(self.convert_expr(&py_def)?);
            }
            let pad = names.len() - defaults.len();
            let mut default_iter = defaults.into_iter();
            let mut pos = Vec::new();
            for (i, name) in names.into_iter().enumerate() {
                let default = if i >= pad { default_iter.next() } else { None };
                pos.push(Param { name, default });
            }

            let py_vararg = py_args.getattr("vararg").unwrap();
            let vararg = if py_vararg.is_none() {
                None
            } else {
                Some(self.get_string_attr(&py_vararg, "arg"))
            };

            let kwonly_list = self.get_list_attr(py_args, "kwonlyargs");
            let kwdef_list = self.get_list_attr(py_args, "kw_defaults");
            let mut kwonly = Vec::new();
            for (py_arg, py_def) in kwonly_list.iter().zip(kwdef_list.iter()) {
                let name = self.get_string_attr(&py_arg, "arg");
                let default = if py_def.is_none() {
                    None
                } else {
                    Some(self.convert_expr(&py_def)?)
                };
                kwonly.push(Param { name, default });
            }

            let py_kwarg = py_args.getattr("kwarg").unwrap();
            let kwarg = if py_kwarg.is_none() {
                None
            } else {
                Some(self.get_string_attr(&py_kwarg, "arg"))
            };

            Ok(Params {
                pos,
                vararg,
                kwonly,
                kwarg,
            })
        })
    }

    // ClassDef(identifier name, expr* bases, keyword* keywords, stmt* body,
    //          expr* decorator_list, type_param* type_params)
    // Keywords (metaclass=...) and decorators are dropped.
    fn convert_class_def(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let name = self.get_string_attr(node, "name");

            let mut bases = Vec::new();
            for py_base in self.get_list_attr(node, "bases").iter() {
                bases.push(self.convert_expr(&py_base)?);
            }

            let body = self.convert_stmt_list(node, "body")?;

            Ok(StmtKind::ClassDef { name, bases, body })
        })
    }

    // Assign(expr* targets, expr value, string? type_comment)
    fn convert_assign(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let mut targets = Vec::new();
            for py_target in self.get_list_attr(node, "targets").iter() {
                targets.push(self.convert_expr(&py_target)?);
            }
            let value = self.convert_expr(&node.getattr("value").unwrap())?;
            Ok(StmtKind::Assign { targets, value })
        })
    }

    // AnnAssign(expr target, expr annotation, expr? value, int simple)
    // The annotation is dropped; a bare declaration has no runtime effect.
    fn convert_ann_assign(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let py_value = node.getattr("value").unwrap();
            if py_value.is_none() {
                return Ok(StmtKind::Pass);
            }
            let target = self.convert_expr(&node.getattr("target").unwrap())?;
            let value = self.convert_expr(&py_value)?;
            Ok(StmtKind::Assign {
                targets: vec![target],
                value,
            })
        })
    }

    // AugAssign(expr target, operator op, expr value)
    fn convert_aug_assign(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let target = self.convert_expr(&node.getattr("target").unwrap())?;
            let op = self.convert_bin_operator(&node.getattr("op").unwrap())?;
            let value = self.convert_expr(&node.getattr("value").unwrap())?;
            Ok(StmtKind::AugAssign { target, op, value })
        })
    }

    // For(expr target, expr iter, stmt* body, stmt* orelse, string? type_comment)
    fn convert_for(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            Ok(StmtKind::For {
                target: self.convert_expr(&node.getattr("target").unwrap())?,
                iter: self.convert_expr(&node.getattr("iter").unwrap())?,
                body: self.convert_stmt_list(node, "body")?,
                orelse: self.convert_stmt_list(node, "orelse")?,
            })
        })
    }

    // With(withitem* items, stmt* body) / withitem = (expr context_expr, expr? optional_vars)
    fn convert_with(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let mut items = Vec::new();
            for py_item in self.get_list_attr(node, "items").iter() {
                let ctx = self.convert_expr(&py_item.getattr("context_expr").unwrap())?;
                let py_vars = py_item.getattr("optional_vars").unwrap();
                let target = if py_vars.is_none() {
                    None
                } else {
                    Some(self.convert_expr(&py_vars)?)
                };
                items.push((ctx, target));
            }
            let body = self.convert_stmt_list(node, "body")?;
            Ok(StmtKind::With { items, body })
        })
    }

    // Import(alias* names) / alias = (identifier name, identifier? asname)
    fn convert_import_names(&self, node: &Bound<'_, PyAny>) -> Result<Vec<ImportName>> {
        Python::attach(|_py| {
            let mut names = Vec::new();
            for py_alias in self.get_list_attr(node, "names").iter() {
                let name = self.get_string_attr(&py_alias, "name");
                let py_asname = py_alias.getattr("asname").unwrap();
                let alias = if py_asname.is_none() {
                    None
                } else {
                    Some(py_asname.extract::<String>().unwrap())
                };
                names.push(ImportName { name, alias });
            }
            Ok(names)
        })
    }

    // ImportFrom(identifier? module, alias* names, int? level)
    fn convert_import_from(&self, node: &Bound<'_, PyAny>) -> Result<StmtKind> {
        Python::attach(|_py| {
            let module = node
                .getattr("module")
                .ok()
                .and_then(|m| m.extract::<String>().ok())
                .unwrap_or_default();

            let level = node
                .getattr("level")
                .and_then(|l| l.extract::<usize>())
                .unwrap_or(0);

            Ok(StmtKind::ImportFrom {
                level,
                module,
                names: self.convert_import_names(node)?,
            })
        })
    }

    // Global(identifier* names) / Nonlocal(identifier* names)
    fn convert_name_list(&self, node: &Bound<'_, PyAny>) -> Vec<String> {
        let mut names = Vec::new();
        for py_name in self.get_list_attr(node, "names").iter() {
            names.push(py_name.extract::<String>().unwrap());
        }
        names
    }

    /// Convert a Python expression node. Constructs the analyzer cannot model
    /// convert to approximations; unknown node classes are an error.
    fn convert_expr(&self, py_expr: &Bound<'_, PyAny>) -> Result<Expr> {
        Python::attach(|_py| {
            let range = self.range(py_expr);
            let class_name = py_expr.get_type().name().unwrap();

            let kind = match class_name.to_string().as_str() {
                "Constant" => ExprKind::Constant(self.convert_constant(py_expr)),
                "Name" => ExprKind::Name(self.get_string_attr(py_expr, "id")),
                "BinOp" => ExprKind::BinOp {
                    left: Box::new(self.convert_expr(&py_expr.getattr("left").unwrap())?),
                    op: self.convert_bin_operator(&py_expr.getattr("op").unwrap())?,
                    right: Box::new(self.convert_expr(&py_expr.getattr("right").unwrap())?),
                },
                "BoolOp" => self.convert_boolop(py_expr)?,
                "Compare" => self.convert_compare(py_expr)?,
                "UnaryOp" => self.convert_unaryop(py_expr)?,
                // IfExp(expr test, expr body, expr orelse)
                "IfExp" => ExprKind::Ternary {
                    test: Box::new(self.convert_expr(&py_expr.getattr("test").unwrap())?),
                    body: Box::new(self.convert_expr(&py_expr.getattr("body").unwrap())?),
                    orelse: Box::new(self.convert_expr(&py_expr.getattr("orelse").unwrap())?),
                },
                "Call" => self.convert_call(py_expr)?,
                "Attribute" => ExprKind::Attribute {
                    value: Box::new(self.convert_expr(&py_expr.getattr("value").unwrap())?),
                    attr: self.get_string_attr(py_expr, "attr"),
                },
                "Subscript" => ExprKind::Subscript {
                    value: Box::new(self.convert_expr(&py_expr.getattr("value").unwrap())?),
                    index: Box::new(self.convert_expr(&py_expr.getattr("slice").unwrap())?),
                },
                "Slice" => self.convert_slice(py_expr)?,
                "Tuple" => ExprKind::Tuple(self.convert_expr_list(py_expr, "elts")?),
                "List" => ExprKind::List(self.convert_expr_list(py_expr, "elts")?),
                // Sets are approximated as lists
                "Set" => ExprKind::List(self.convert_expr_list(py_expr, "elts")?),
                "Dict" => self.convert_dict(py_expr)?,
                "Starred" => ExprKind::Starred(Box::new(
                    self.convert_expr(&py_expr.getattr("value").unwrap())?,
                )),
                // Comprehension effects are not modeled; keep the container type
                "ListComp" | "SetComp" | "GeneratorExp" => ExprKind::List(vec![]),
                "DictComp" => ExprKind::Dict(vec![]),
                // F-strings flatten to their literal fragments
                "JoinedStr" => self.convert_joined_str(py_expr),
                "FormattedValue" => ExprKind::Constant(Constant::Str(String::new())),
                "Await" => return self.convert_expr(&py_expr.getattr("value").unwrap()),
                // Walrus drops the binding and keeps the value
                "NamedExpr" => return self.convert_expr(&py_expr.getattr("value").unwrap()),
                // No function-expression form exists downstream
                "Lambda" | "Yield" | "YieldFrom" => ExprKind::Constant(Constant::None),
                _ => {
                    return Err(FrontendError::UnknownNode {
                        kind: class_name.to_string(),
                        range,
                    })
                }
            };

            Ok(Expr::new(kind, range))
        })
    }

    // Constant(constant value, string? kind)
    fn convert_constant(&self, node: &Bound<'_, PyAny>) -> Constant {
        let value = node.getattr("value").unwrap();

        if value.is_none() {
            return Constant::None;
        }
        let type_name = value.get_type().name().unwrap().to_string();
        if type_name == "ellipsis" {
            return Constant::Ellipsis;
        }
        // Check bool BEFORE int because Python's bool is a subclass of int
        if let Ok(bool_val) = value.extract::<bool>() {
            return Constant::Bool(bool_val);
        }
        if let Ok(int_val) = value.extract::<i64>() {
            return Constant::Int(int_val);
        }
        // Integers wider than i64 degrade to floats
        if let Ok(float_val) = value.extract::<f64>() {
            return Constant::Float(float_val);
        }
        if let Ok(str_val) = value.extract::<String>() {
            return Constant::Str(str_val);
        }
        if let Ok(bytes_val) = value.extract::<Vec<u8>>() {
            return Constant::Str(String::from_utf8_lossy(&bytes_val).into_owned());
        }
        Constant::None
    }

    // BoolOp(boolop op, expr* values)
    fn convert_boolop(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let py_op = node.getattr("op").unwrap();
            let op_name = py_op.get_type().name().unwrap();
            let op = match op_name.to_string().as_str() {
                "And" => BoolOp::And,
                "Or" => BoolOp::Or,
                _ => {
                    return Err(FrontendError::UnknownNode {
                        kind: format!("boolean operator {}", op_name),
                        range: self.range(node),
                    })
                }
            };
            Ok(ExprKind::BoolOp {
                op,
                values: self.convert_expr_list(node, "values")?,
            })
        })
    }

    // Compare(expr left, cmpop* ops, expr* comparators)
    fn convert_compare(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let left = self.convert_expr(&node.getattr("left").unwrap())?;

            let mut ops = Vec::new();
            for py_op in self.get_list_attr(node, "ops").iter() {
                ops.push(self.convert_compare_op(&py_op)?);
            }

            Ok(ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators: self.convert_expr_list(node, "comparators")?,
            })
        })
    }

    // UnaryOp(unaryop op, expr operand)
    fn convert_unaryop(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let py_op = node.getattr("op").unwrap();
            let op_name = py_op.get_type().name().unwrap();
            let op = match op_name.to_string().as_str() {
                "Not" => UnaryOperator::Not,
                "USub" => UnaryOperator::USub,
                "UAdd" => UnaryOperator::UAdd,
                "Invert" => UnaryOperator::Invert,
                _ => {
                    return Err(FrontendError::UnknownNode {
                        kind: format!("unary operator {}", op_name),
                        range: self.range(node),
                    })
                }
            };
            Ok(ExprKind::UnaryOp {
                op,
                operand: Box::new(self.convert_expr(&node.getattr("operand").unwrap())?),
            })
        })
    }

    // Call(expr func, expr* args, keyword* keywords)
    // keyword = (identifier? arg, expr value); a missing arg is ** unpacking
    fn convert_call(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let func = self.convert_expr(&node.getattr("func").unwrap())?;
            let args = self.convert_expr_list(node, "args")?;

            let mut keywords = Vec::new();
            for py_kw in self.get_list_attr(node, "keywords").iter() {
                let py_arg = py_kw.getattr("arg").unwrap();
                let name = if py_arg.is_none() {
                    None
                } else {
                    Some(py_arg.extract::<String>().unwrap())
                };
                let value = self.convert_expr(&py_kw.getattr("value").unwrap())?;
                keywords.push((name, value));
            }

            Ok(ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            })
        })
    }

    // Slice(expr? lower, expr? upper, expr? step)
    fn convert_slice(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let get = |attr: &str| -> Result<Option<Box<Expr>>> {
                let py_val = node.getattr(attr).unwrap();
                if py_val.is_none() {
                    Ok(None)
                } else {
                    Ok(Some(Box::new(self.convert_expr(&py_val)?)))
                }
            };
            Ok(ExprKind::Slice {
                lower: get("lower")?,
                upper: get("upper")?,
                step: get("step")?,
            })
        })
    }

    // Dict(expr* keys, expr* values); a missing key is a ** expansion entry
    fn convert_dict(&self, node: &Bound<'_, PyAny>) -> Result<ExprKind> {
        Python::attach(|_py| {
            let keys = self.get_list_attr(node, "keys");
            let values = self.get_list_attr(node, "values");

            let mut entries = Vec::new();
            for (py_key, py_value) in keys.iter().zip(values.iter()) {
                let key = if py_key.is_none() {
                    None
                } else {
                    Some(self.convert_expr(&py_key)?)
                };
                entries.push((key, self.convert_expr(&py_value)?));
            }
            Ok(ExprKind::Dict(entries))
        })
    }

    // JoinedStr(expr* values) - literal fragments only, interpolations dropped
    fn convert_joined_str(&self, node: &Bound<'_, PyAny>) -> ExprKind {
        let mut text = String::new();
        for py_part in self.get_list_attr(node, "values").iter() {
            let part_class = py_part.get_type().name().unwrap();
            if part_class.to_string().as_str() == "Constant" {
                if let Constant::Str(s) = self.convert_constant(&py_part) {
                    text.push_str(&s);
                }
            }
        }
        ExprKind::Constant(Constant::Str(text))
    }

    // operator = Add | Sub | Mult | MatMult | Div | Mod | Pow | LShift
    //          | RShift | BitOr | BitXor | BitAnd | FloorDiv
    fn convert_bin_operator(&self, py_op: &Bound<'_, PyAny>) -> Result<BinOperator> {
        Python::attach(|_py| {
            let class_name = py_op.get_type().name().unwrap();

            match class_name.to_string().as_str() {
                "Add" => Ok(BinOperator::Add),
                "Sub" => Ok(BinOperator::Sub),
                "Mult" => Ok(BinOperator::Mult),
                "MatMult" => Ok(BinOperator::MatMult),
                "Div" => Ok(BinOperator::Div),
                "FloorDiv" => Ok(BinOperator::FloorDiv),
                "Mod" => Ok(BinOperator::Mod),
                "Pow" => Ok(BinOperator::Pow),
                "LShift" => Ok(BinOperator::LShift),
                "RShift" => Ok(BinOperator::RShift),
                "BitOr" => Ok(BinOperator::BitOr),
                "BitXor" => Ok(BinOperator::BitXor),
                "BitAnd" => Ok(BinOperator::BitAnd),
                _ => Err(FrontendError::UnknownNode {
                    kind: format!("binary operator {}", class_name),
                    range: None,
                }),
            }
        })
    }

    // cmpop = Eq | NotEq | Lt | LtE | Gt | GtE | Is | IsNot | In | NotIn
    fn convert_compare_op(&self, py_op: &Bound<'_, PyAny>) -> Result<CompareOp> {
        Python::attach(|_py| {
            let class_name = py_op.get_type().name().unwrap();

            match class_name.to_string().as_str() {
                "Eq" => Ok(CompareOp::Eq),
                "NotEq" => Ok(CompareOp::NotEq),
                "Lt" => Ok(CompareOp::Lt),
                "LtE" => Ok(CompareOp::LtE),
                "Gt" => Ok(CompareOp::Gt),
                "GtE" => Ok(CompareOp::GtE),
                "Is" => Ok(CompareOp::Is),
                "IsNot" => Ok(CompareOp::IsNot),
                "In" => Ok(CompareOp::In),
                "NotIn" => Ok(CompareOp::NotIn),
                _ => Err(FrontendError::UnknownNode {
                    kind: format!("comparison operator {}", class_name),
                    range: None,
                }),
            }
        })
    }

    // Helper: Get string attribute (only call for required fields)
    fn get_string_attr(&self, node: &Bound<'_, PyAny>, attr: &str) -> String {
        node.getattr(attr).unwrap().extract::<String>().unwrap()
    }

    // Helper: Get list attribute (only call for required fields)
    fn get_list_attr<'py>(&self, node: &Bound<'py, PyAny>, attr: &str) -> Bound<'py, PyList> {
        node.getattr(attr).unwrap().cast_into::<PyList>().unwrap()
    }

    // Helper: Convert a list of statements
    fn convert_stmt_list(&self, node: &Bound<'_, PyAny>, attr: &str) -> Result<Vec<Stmt>> {
        let py_list = self.get_list_attr(node, attr);
        let mut stmts = Vec::new();
        for py_stmt in py_list.iter() {
            stmts.push(self.convert_stmt(&py_stmt)?);
        }
        Ok(stmts)
    }

    // Helper: Convert a list of expressions
    fn convert_expr_list(&self, node: &Bound<'_, PyAny>, attr: &str) -> Result<Vec<Expr>> {
        let py_list = self.get_list_attr(node, attr);
        let mut exprs = Vec::new();
        for py_expr in py_list.iter() {
            exprs.push(self.convert_expr(&py_expr)?);
        }
        Ok(exprs)
    }

    /// Byte range of a node, when the parser attached positions to it.
    fn range(&self, node: &Bound<'_, PyAny>) -> Option<SourceRange> {
        let lineno = node.getattr("lineno").ok()?.extract::<usize>().ok()?;
        let col = node.getattr("col_offset").ok()?.extract::<usize>().ok()?;
        let end_lineno = node.getattr("end_lineno").ok()?.extract::<usize>().ok()?;
        let end_col = node.getattr("end_col_offset").ok()?.extract::<usize>().ok()?;

        let start = self.line_index.offset(lineno, col);
        let end = self.line_index.offset(end_lineno, end_col);
        Some(SourceRange::new(self.file, start, end.saturating_sub(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::python_ast::parse_python;

    fn convert(source: &str) -> Module {
        let py_ast = parse_python(source).unwrap();
        let converter = AstConverter::new(FileId::ANON, source);
        Python::attach(|py| {
            converter
                .convert_module(py_ast.bind(py), std::path::PathBuf::from("test.py"))
                .unwrap()
        })
    }

    #[test]
    fn test_convert_simple_assign() {
        let module = convert("x = 5");
        assert_eq!(module.body.len(), 1);
        match &module.body[0].kind {
            StmtKind::Assign { targets, value } => {
                assert_eq!(targets.len(), 1);
                assert!(matches!(&targets[0].kind, ExprKind::Name(n) if n == "x"));
                assert!(matches!(
                    &value.kind,
                    ExprKind::Constant(Constant::Int(5))
                ));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_function_params() {
        let module = convert("def f(a, b=1, *args, c, **kw):\n    return a\n");
        match &module.body[0].kind {
            StmtKind::FunctionDef { name, params, body } => {
                assert_eq!(name, "f");
                assert_eq!(params.names(), ["a", "b", "args", "c", "kw"]);
                assert!(params.pos[0].default.is_none());
                assert!(params.pos[1].default.is_some());
                assert_eq!(params.kwonly.len(), 1);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_relative_import() {
        let module = convert("from ..pkg import mod as m\n");
        match &module.body[0].kind {
            StmtKind::ImportFrom {
                level,
                module: m,
                names,
            } => {
                assert_eq!(*level, 2);
                assert_eq!(m, "pkg");
                assert_eq!(names[0].name, "mod");
                assert_eq!(names[0].alias.as_deref(), Some("m"));
            }
            other => panic!("expected ImportFrom, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_records_ranges() {
        let source = "x = 5\ny = 10\n";
        let module = convert(source);
        let range = module.body[1].range.expect("range");
        assert_eq!(range.start, 6);
        assert_eq!(range.end(), 12);
    }

    #[test]
    fn test_unsupported_statement_becomes_pass() {
        // match statements are outside the modeled subset
        let module = convert("match x:\n    case _:\n        pass\n");
        assert!(matches!(module.body[0].kind, StmtKind::Pass));
    }

    #[test]
    fn test_comprehension_becomes_empty_list() {
        let module = convert("xs = [i for i in range(3)]\n");
        match &module.body[0].kind {
            StmtKind::Assign { value, .. } => {
                assert!(matches!(&value.kind, ExprKind::List(elts) if elts.is_empty()));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }
}
