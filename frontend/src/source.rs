//! Source file registry and byte-offset positions.
//!
//! ThIR nodes carry positions as plain `(file, start, len)` triples copied out
//! of the parser output, so the lowered tree never keeps the Python AST alive.

use std::path::{Path, PathBuf};

/// Index into a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

impl FileId {
    /// File id used for sources that were never registered (tests, snippets).
    pub const ANON: FileId = FileId(u32::MAX);
}

/// Registry of source file paths, handing out dense [`FileId`]s.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<PathBuf>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path and return its id. Registering the same path twice
    /// returns the existing id.
    pub fn intern(&mut self, path: &Path) -> FileId {
        if let Some(pos) = self.files.iter().position(|p| p == path) {
            return FileId(pos as u32);
        }
        self.files.push(path.to_path_buf());
        FileId((self.files.len() - 1) as u32)
    }

    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.files.get(id.0 as usize).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Byte range inside one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub file: FileId,
    pub start: u32,
    pub len: u32,
}

impl SourceRange {
    pub fn new(file: FileId, start: u32, len: u32) -> Self {
        SourceRange { file, start, len }
    }

    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

impl std::fmt::Display for SourceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bytes {}..{}", self.start, self.end())
    }
}

/// Maps 1-based line / 0-based byte-column positions (as reported by the host
/// parser) to absolute byte offsets.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    source_len: u32,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        LineIndex {
            line_starts,
            source_len: source.len() as u32,
        }
    }

    /// Absolute byte offset of `line` (1-based) and `col` (0-based, in bytes).
    /// Positions past the end of the file clamp to the file length.
    pub fn offset(&self, line: usize, col: usize) -> u32 {
        let line_start = match self.line_starts.get(line.saturating_sub(1)) {
            Some(&start) => start,
            None => return self.source_len,
        };
        (line_start + col as u32).min(self.source_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_offsets() {
        let idx = LineIndex::new("ab\ncd\n");
        assert_eq!(idx.offset(1, 0), 0);
        assert_eq!(idx.offset(1, 1), 1);
        assert_eq!(idx.offset(2, 0), 3);
        assert_eq!(idx.offset(2, 2), 5);
        // Past the end clamps
        assert_eq!(idx.offset(9, 0), 6);
    }

    #[test]
    fn test_source_map_intern_is_idempotent() {
        let mut map = SourceMap::new();
        let a = map.intern(Path::new("a.py"));
        let b = map.intern(Path::new("b.py"));
        assert_ne!(a, b);
        assert_eq!(map.intern(Path::new("a.py")), a);
        assert_eq!(map.path(a), Some(Path::new("a.py")));
        assert_eq!(map.len(), 2);
    }
}
