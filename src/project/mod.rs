//! Module loading.
//!
//! The lexer and parser are external collaborators: the resolver only needs
//! something that can turn a module path into a parsed [`Program`]. The
//! search-path resolution used by real front-ends lives here too.

mod loader;

pub use loader::{resolve_source, LoadError, ModuleLoader, SOURCE_EXTENSION};
