//! Semantic analysis.
//!
//! The pipeline: the resolver loads and orders modules, the importer
//! populates each program's scope, and the checkers validate type
//! declarations and resolve every type instance to its builder type,
//! specializing parametric types along the way.

pub mod checker;
pub mod diagnostics;
pub mod error;
pub mod resolver;
pub mod specialize;
pub mod symbol_table;

pub use checker::{
    check_instance, check_instance_bare, check_program_types, check_type, prepare_header,
    resolve_call,
};
pub use diagnostics::{codes, Diagnostic, DiagnosticCollector, Severity};
pub use error::{SemanticError, SemanticResult};
pub use resolver::{GlobalTable, Importer};
pub use specialize::generate;
pub use symbol_table::{CtorTable, DeclKind, DeclTable, Scope, ScopeId, SymbolTable};
