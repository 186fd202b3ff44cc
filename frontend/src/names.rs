//! Name utilities: local-definition scanning, import extraction, qualified
//! path resolution, and operator mappings.
//!
//! These are pure functions. `scan_qual_path` in particular is shared ground
//! between the frontend (lowering `import` statements) and the backend's
//! symbolic importer, which is why it lives here and not in the translator.

use indexmap::IndexSet;

use crate::ast::types::{
    BinOperator, BoolOp, CompareOp, Expr, ExprKind, Stmt, StmtKind, UnaryOperator,
};
use crate::thir::{ThBinOp, ThUnaryOp};

/// Fixed mapping from parser binary operators to the IR op enum.
/// `@` has no IR operator and is handled by the translator.
pub fn parse_bin_op(op: BinOperator) -> Option<ThBinOp> {
    match op {
        BinOperator::Add => Some(ThBinOp::Add),
        BinOperator::Sub => Some(ThBinOp::Sub),
        BinOperator::Mult => Some(ThBinOp::Mul),
        BinOperator::MatMult => None,
        BinOperator::Div => Some(ThBinOp::Div),
        BinOperator::FloorDiv => Some(ThBinOp::FloorDiv),
        BinOperator::Mod => Some(ThBinOp::Mod),
        BinOperator::Pow => Some(ThBinOp::Pow),
        BinOperator::LShift => Some(ThBinOp::LShift),
        BinOperator::RShift => Some(ThBinOp::RShift),
        BinOperator::BitOr => Some(ThBinOp::BitOr),
        BinOperator::BitXor => Some(ThBinOp::BitXor),
        BinOperator::BitAnd => Some(ThBinOp::BitAnd),
    }
}

/// Fixed mapping from parser unary operators to the IR op enum.
pub fn parse_unary_op(op: UnaryOperator) -> ThUnaryOp {
    match op {
        UnaryOperator::Not => ThUnaryOp::Not,
        UnaryOperator::USub => ThUnaryOp::Neg,
        UnaryOperator::UAdd => ThUnaryOp::Pos,
        UnaryOperator::Invert => ThUnaryOp::Invert,
    }
}

pub fn parse_bool_op(op: BoolOp) -> ThBinOp {
    match op {
        BoolOp::And => ThBinOp::And,
        BoolOp::Or => ThBinOp::Or,
    }
}

/// How a comparison operator renders in the IR: which op to emit, whether the
/// operands swap (`>` becomes `<`), and whether the result is negated
/// (`not in`, `is not`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedCmp {
    pub op: ThBinOp,
    pub flip: bool,
    pub negate: bool,
}

pub fn parse_compare_op(op: CompareOp) -> NormalizedCmp {
    let (op, flip, negate) = match op {
        CompareOp::Eq => (ThBinOp::Eq, false, false),
        CompareOp::NotEq => (ThBinOp::Neq, false, false),
        CompareOp::Lt => (ThBinOp::Lt, false, false),
        CompareOp::LtE => (ThBinOp::Lte, false, false),
        CompareOp::Gt => (ThBinOp::Lt, true, false),
        CompareOp::GtE => (ThBinOp::Lte, true, false),
        CompareOp::Is => (ThBinOp::Is, false, false),
        CompareOp::IsNot => (ThBinOp::Is, false, true),
        CompareOp::In => (ThBinOp::In, false, false),
        CompareOp::NotIn => (ThBinOp::In, false, true),
    };
    NormalizedCmp { op, flip, negate }
}

/// Names a statement block will bind: targets of plain and augmented
/// assignments, `for` targets, `with … as` targets, function/class
/// declarations, and names bound by imports. `global`/`nonlocal` declarations
/// remove names from the set, as does `excluded` (typically the enclosing
/// function's parameters). Nested function and class bodies are not descended.
pub fn extract_local_def(stmts: &[Stmt], excluded: &[String]) -> IndexSet<String> {
    let mut defs = IndexSet::new();
    let mut declared = IndexSet::new();
    walk_block(stmts, &mut defs, &mut declared);

    for name in excluded {
        defs.shift_remove(name);
    }
    for name in &declared {
        defs.shift_remove(name);
    }
    defs
}

/// Names already bound in this scope by single-name imports
/// (`import x`, `import a as x`, `from m import x [as y]`). The module export
/// pass subtracts these so imported names are not re-exported as globals.
pub fn extract_single_import(stmts: &[Stmt]) -> IndexSet<String> {
    let mut names = IndexSet::new();
    walk_imports(stmts, &mut names);
    names
}

fn walk_block(stmts: &[Stmt], defs: &mut IndexSet<String>, declared: &mut IndexSet<String>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { targets, .. } => {
                for target in targets {
                    collect_target(target, defs);
                }
            }
            StmtKind::AugAssign { target, .. } => collect_target(target, defs),
            StmtKind::For {
                target,
                body,
                orelse,
                ..
            } => {
                collect_target(target, defs);
                walk_block(body, defs, declared);
                walk_block(orelse, defs, declared);
            }
            StmtKind::While { body, orelse, .. } | StmtKind::If { body, orelse, .. } => {
                walk_block(body, defs, declared);
                walk_block(orelse, defs, declared);
            }
            StmtKind::With { items, body } => {
                for (_, target) in items {
                    if let Some(target) = target {
                        collect_target(target, defs);
                    }
                }
                walk_block(body, defs, declared);
            }
            StmtKind::Try { body, finalbody } => {
                walk_block(body, defs, declared);
                walk_block(finalbody, defs, declared);
            }
            StmtKind::FunctionDef { name, .. } | StmtKind::ClassDef { name, .. } => {
                defs.insert(name.clone());
            }
            StmtKind::Import { names } => {
                for import in names {
                    match &import.alias {
                        Some(alias) => {
                            defs.insert(alias.clone());
                        }
                        // `import a.b` binds nothing here; the backend binds
                        // the package root through importQualified
                        None if !import.name.contains('.') => {
                            defs.insert(import.name.clone());
                        }
                        None => {}
                    }
                }
            }
            StmtKind::ImportFrom { names, .. } => {
                for import in names {
                    if import.name != "*" {
                        defs.insert(import.alias.clone().unwrap_or_else(|| import.name.clone()));
                    }
                }
            }
            StmtKind::Global(names) | StmtKind::Nonlocal(names) => {
                declared.extend(names.iter().cloned());
            }
            _ => {}
        }
    }
}

fn walk_imports(stmts: &[Stmt], out: &mut IndexSet<String>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Import { names } => {
                for import in names {
                    match &import.alias {
                        Some(alias) => {
                            out.insert(alias.clone());
                        }
                        None if !import.name.contains('.') => {
                            out.insert(import.name.clone());
                        }
                        None => {}
                    }
                }
            }
            StmtKind::ImportFrom { names, .. } => {
                for import in names {
                    if import.name != "*" {
                        out.insert(import.alias.clone().unwrap_or_else(|| import.name.clone()));
                    }
                }
            }
            StmtKind::For { body, orelse, .. }
            | StmtKind::While { body, orelse, .. }
            | StmtKind::If { body, orelse, .. } => {
                walk_imports(body, out);
                walk_imports(orelse, out);
            }
            StmtKind::With { body, .. } => walk_imports(body, out),
            StmtKind::Try { body, finalbody } => {
                walk_imports(body, out);
                walk_imports(finalbody, out);
            }
            _ => {}
        }
    }
}

fn collect_target(expr: &Expr, defs: &mut IndexSet<String>) {
    match &expr.kind {
        ExprKind::Name(name) => {
            defs.insert(name.clone());
        }
        ExprKind::Tuple(elements) | ExprKind::List(elements) => {
            for element in elements {
                collect_target(element, defs);
            }
        }
        ExprKind::Starred(inner) => collect_target(inner, defs),
        // Attribute/subscript targets bind no local name
        _ => {}
    }
}

/// Resolve (possibly relative) import syntax into the cumulative prefix list
/// of qualified paths.
///
/// With no leading dots the result is the plain prefix list:
/// `scan_qual_path("a.b.c", _)` is `["a", "a.b", "a.b.c"]`. Leading dots strip
/// that many trailing components off `current`'s prefix list first;
/// `scan_qual_path("..x", Some("p.q.r"))` is `["p", "p.x"]`. Without a current
/// module the dots are kept verbatim as a literal prefix.
pub fn scan_qual_path(qual: &str, current: Option<&str>) -> Vec<String> {
    let dots = qual.chars().take_while(|c| *c == '.').count();
    let tail: Vec<&str> = qual[dots..].split('.').filter(|s| !s.is_empty()).collect();

    if dots == 0 {
        return prefixes(&tail);
    }

    match current {
        Some(current) => {
            let segments: Vec<&str> = current.split('.').filter(|s| !s.is_empty()).collect();
            let mut result = prefixes(&segments);
            result.truncate(segments.len().saturating_sub(dots));
            let mut last = result.last().cloned();
            for segment in tail {
                let next = match &last {
                    Some(prefix) => format!("{prefix}.{segment}"),
                    None => segment.to_string(),
                };
                result.push(next.clone());
                last = Some(next);
            }
            result
        }
        None => {
            let literal = ".".repeat(dots);
            if tail.is_empty() {
                return vec![literal];
            }
            let mut result = Vec::with_capacity(tail.len());
            let mut prefix = literal;
            for (i, segment) in tail.iter().enumerate() {
                if i == 0 {
                    prefix = format!("{prefix}{segment}");
                } else {
                    prefix = format!("{prefix}.{segment}");
                }
                result.push(prefix.clone());
            }
            result
        }
    }
}

fn prefixes(segments: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(segments.len());
    let mut acc = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            acc.push('.');
        }
        acc.push_str(segment);
        out.push(acc.clone());
    }
    out
}

/// Flatten a chain of attribute accesses rooted at a plain name:
/// `a.b.c` gives `["a", "b", "c"]`. Any other base shape gives `None`.
pub fn flatten_attr_path(expr: &Expr) -> Option<Vec<String>> {
    match &expr.kind {
        ExprKind::Name(name) => Some(vec![name.clone()]),
        ExprKind::Attribute { value, attr } => {
            let mut path = flatten_attr_path(value)?;
            path.push(attr.clone());
            Some(path)
        }
        _ => None,
    }
}
