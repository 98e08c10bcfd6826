//! Fully-qualified module names.

use std::fmt;

use smol_str::SmolStr;

/// A fully-qualified module name: the dotted name used in source
/// (`quantum.gates`) paired with its file-system-like path
/// (`quantum/gates`).
///
/// The serialized form (the dotted name) is the unique key under which a
/// program is registered in the global table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fqn {
    path: SmolStr,
    name: SmolStr,
}

impl Fqn {
    pub fn new(path: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Build an fqn from a dotted module name, deriving the path.
    pub fn from_name(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        let path: SmolStr = name.replace('.', "/").into();
        Self { path, name }
    }

    /// Build an fqn from a module path, deriving the dotted name.
    pub fn from_path(path: impl Into<SmolStr>) -> Self {
        let path = path.into();
        let name: SmolStr = path.trim_end_matches(".ql").replace('/', ".").into();
        Self { path, name }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unique string form used as a program key.
    pub fn serialize(&self) -> SmolStr {
        self.name.clone()
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
