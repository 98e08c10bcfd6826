//! A lexical scope.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::ctable::CtorTable;
use super::dtable::DeclTable;
use super::ScopeId;

/// A node in the scope tree.
///
/// A scope knows which namespaces it recognizes and owns one declaration
/// table and one constructor table. Program scopes are roots; function
/// bodies hang off them as children.
#[derive(Debug, Default)]
pub struct Scope {
    pub(super) parent: Option<ScopeId>,
    pub(super) start_line: usize,
    pub(super) end_line: usize,
    /// Where this scope came from, e.g. the name of the function owning it.
    pub(super) origin: SmolStr,
    pub(super) namespaces: FxHashSet<SmolStr>,
    pub(super) dtable: DeclTable,
    pub(super) ctable: CtorTable,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn set_start_line(&mut self, line: usize) {
        self.start_line = line;
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn set_end_line(&mut self, line: usize) {
        self.end_line = line;
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: impl Into<SmolStr>) {
        self.origin = origin.into();
    }

    /// Namespaces recognized directly by this scope (parents not consulted).
    pub fn namespaces(&self) -> impl Iterator<Item = &SmolStr> {
        self.namespaces.iter()
    }

    pub fn dtable(&self) -> &DeclTable {
        &self.dtable
    }

    pub fn ctable(&self) -> &CtorTable {
        &self.ctable
    }
}
