//! Module resolver, consumed by the backend's symbolic import.
//!
//! The search order is fixed: project `q`, project `q.__init__`, library `q`,
//! library `q.__init__`. The project always shadows the bundled library. A
//! miss is a value, not an error; the backend decides what an unresolved
//! import means.

use indexmap::IndexMap;

use crate::thir::ThStmt;

/// Outcome of a lookup. `from_init` reports whether the `q.__init__` probe
/// matched, which the backend uses to attach `__path__` semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Module {
        stmt: &'a ThStmt,
        from_init: bool,
        from_project: bool,
    },
    Missing,
}

impl<'a> Resolution<'a> {
    pub fn stmt(&self) -> Option<&'a ThStmt> {
        match self {
            Resolution::Module { stmt, .. } => Some(stmt),
            Resolution::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Resolution::Missing)
    }
}

/// Look up `qual` against the project map first, then the library map.
pub fn resolve_module<'a>(
    project: &'a IndexMap<String, ThStmt>,
    library: &'a IndexMap<String, ThStmt>,
    qual: &str,
) -> Resolution<'a> {
    let init_key = format!("{qual}.__init__");
    let probes = [
        (project, qual, false, true),
        (project, init_key.as_str(), true, true),
        (library, qual, false, false),
        (library, init_key.as_str(), true, false),
    ];
    for (map, key, from_init, from_project) in probes {
        if let Some(stmt) = map.get(key) {
            return Resolution::Module {
                stmt,
                from_init,
                from_project,
            };
        }
    }
    Resolution::Missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thir::{ThExpr, ThStmt};

    fn map_of(entries: &[(&str, i64)]) -> IndexMap<String, ThStmt> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), ThStmt::expr(ThExpr::int(*v))))
            .collect()
    }

    #[test]
    fn test_project_shadows_library() {
        let project = map_of(&[("x", 1)]);
        let library = map_of(&[("x", 2)]);
        match resolve_module(&project, &library, "x") {
            Resolution::Module {
                stmt,
                from_init,
                from_project,
            } => {
                assert_eq!(*stmt, ThStmt::expr(ThExpr::int(1)));
                assert!(!from_init);
                assert!(from_project);
            }
            Resolution::Missing => panic!("expected a hit"),
        }
    }

    #[test]
    fn test_init_probe_and_order() {
        let project = map_of(&[]);
        let library = map_of(&[("pkg.__init__", 1), ("pkg.mod", 2)]);
        match resolve_module(&project, &library, "pkg") {
            Resolution::Module {
                from_init,
                from_project,
                ..
            } => {
                assert!(from_init);
                assert!(!from_project);
            }
            Resolution::Missing => panic!("expected a hit"),
        }
        assert!(!resolve_module(&project, &library, "pkg.mod").is_missing());
    }

    #[test]
    fn test_miss_is_a_value() {
        let empty = map_of(&[]);
        let resolution = resolve_module(&empty, &empty, "nope");
        assert!(resolution.is_missing());
        assert_eq!(resolution.stmt(), None);
    }
}
