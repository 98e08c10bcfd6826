//! Diagnostics - the error sink.
//!
//! Checker and resolver errors are logged here exactly once, with their
//! source position, before compilation either continues (non-fatal) or
//! unwinds (fatal). The collector is what a driver hands to its reporter.

use std::sync::Arc;

use smol_str::SmolStr;

use super::error::SemanticError;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with its source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub source_path: SmolStr,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    /// Error code (e.g. "E0005").
    pub code: Option<&'static str>,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn error(
        source_path: impl Into<SmolStr>,
        line: usize,
        column: usize,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            line,
            column,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    pub fn warning(
        source_path: impl Into<SmolStr>,
        line: usize,
        column: usize,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            line,
            column,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

/// Standard diagnostic codes for semantic errors.
pub mod codes {
    /// Cyclic import between two modules.
    pub const CYCLIC_IMPORT: &str = "E0001";
    /// Two declarations of conflicting kinds share a name in one namespace.
    pub const SYMBOL_COLLISION: &str = "E0002";
    /// Unresolved reference during checking.
    pub const SYMBOL_NOT_FOUND: &str = "E0003";
    /// A type instance has no builder, or violates an arity/namespace rule.
    pub const INVALID_TYPE: &str = "E0004";
    /// A constructor depends on an invalid or inaccessible type.
    pub const INVALID_CONSTRUCTOR: &str = "E0005";
    /// A function signature failed its header check.
    pub const INVALID_FUNCTION: &str = "E0006";
    /// A module failed to import.
    pub const IMPORT_FAILED: &str = "E0007";
}

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Log a semantic error, attaching the source position of its token
    /// when it carries one.
    pub fn report(&mut self, error: &SemanticError) {
        let (path, line, column) = match error.token() {
            Some(token) => (
                SmolStr::new(token.source_path()),
                token.line(),
                token.column(),
            ),
            None => (SmolStr::default(), 0, 0),
        };
        let code = match error {
            SemanticError::InvalidType { .. } => codes::INVALID_TYPE,
            SemanticError::InvalidConstructor { .. } => codes::INVALID_CONSTRUCTOR,
            SemanticError::InvalidFunction { .. } => codes::INVALID_FUNCTION,
            SemanticError::SymbolNotFound { .. } => codes::SYMBOL_NOT_FOUND,
            SemanticError::SymbolAlreadyDeclared { .. }
            | SemanticError::SymbolCanCollide { .. } => codes::SYMBOL_COLLISION,
            SemanticError::ImportError { .. } => codes::IMPORT_FAILED,
        };
        self.add(Diagnostic::error(path, line, column, error.message()).with_code(code));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Token, TokenKind};

    #[test]
    fn test_report_attaches_position_and_code() {
        let mut collector = DiagnosticCollector::new();
        let token = Token::new(TokenKind::TypeName, "box", 12, 4, "main.ql");
        collector.report(&SemanticError::invalid_type(token, "no builder"));

        let diags = collector.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].source_path, "main.ql");
        assert_eq!(diags[0].line, 12);
        assert_eq!(diags[0].code, Some(codes::INVALID_TYPE));
    }

    #[test]
    fn test_error_counting() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::error("a.ql", 1, 1, "boom"));
        collector.add(Diagnostic::warning("a.ql", 2, 1, "meh"));
        assert_eq!(collector.error_count(), 1);
        assert!(collector.has_errors());

        let taken = collector.take();
        assert_eq!(taken.len(), 2);
        assert!(!collector.has_errors());
    }
}
