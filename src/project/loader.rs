//! The external-parser abstraction and source resolution.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ast::Program;
use crate::semantic::SymbolTable;

/// The file extension of Quill source modules.
pub const SOURCE_EXTENSION: &str = "ql";

/// What loading a module can fail with. Parse failures carry the parser's
/// own message and pass through the resolver unchanged.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("module file not found: <{0}>")]
    FileNotFound(String),

    #[error("{0}")]
    Parse(String),
}

/// Turns a module path into a parsed program.
///
/// Implementations own the lexer and parser; the resolver hands them the
/// fqn-derived path (`quantum/gates`) and the ordered search paths, and
/// receives a program whose scope has been created in the given symbol
/// table. Tests substitute an in-memory loader.
pub trait ModuleLoader {
    fn parse(
        &mut self,
        fqn_path: &str,
        search_paths: &[PathBuf],
        table: &mut SymbolTable,
    ) -> Result<Program, LoadError>;
}

/// Resolve a module path against the ordered search paths, returning the
/// first existing source file.
pub fn resolve_source(fqn_path: &str, search_paths: &[PathBuf]) -> Result<PathBuf, LoadError> {
    let relative = format!("{fqn_path}.{SOURCE_EXTENSION}");
    for base in search_paths {
        let candidate: PathBuf = Path::new(base).join(&relative);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(LoadError::FileNotFound(fqn_path.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_source_respects_search_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        fs::create_dir_all(second.path().join("quantum")).unwrap();
        fs::write(second.path().join("quantum/gates.ql"), "").unwrap();

        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let resolved = resolve_source("quantum/gates", &paths).unwrap();
        assert!(resolved.starts_with(second.path()));
    }

    #[test]
    fn test_resolve_source_prefers_earlier_path() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("main.ql"), "").unwrap();
        fs::write(second.path().join("main.ql"), "").unwrap();

        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let resolved = resolve_source("main", &paths).unwrap();
        assert!(resolved.starts_with(first.path()));
    }

    #[test]
    fn test_resolve_source_missing_module() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![dir.path().to_path_buf()];
        assert!(matches!(
            resolve_source("missing", &paths),
            Err(LoadError::FileNotFound(_))
        ));
    }
}
