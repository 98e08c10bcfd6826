//! The symbol table: scope arena, type arena, and the insertion and lookup
//! rules that tie them together.

use smol_str::SmolStr;
use tracing::trace;

use crate::ast::{DefaultConstructor, Function, RecordConstructor, TypeArena, TypeId, Variable};
use crate::semantic::error::{SemanticError, SemanticResult};

use super::scope::Scope;
use super::ScopeId;

/// Arena storage for all scopes, plus the type arena they reference.
///
/// Insertions target exactly the scope they are given; lookups fall back to
/// the parent chain. Cross-kind collision rules live here because they need
/// both tables of a scope at once.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    types: TypeArena,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(parent));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeArena {
        &mut self.types
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    pub fn add_namespace(&mut self, scope: ScopeId, ns_name: impl Into<SmolStr>) {
        self.scope_mut(scope).namespaces.insert(ns_name.into());
    }

    /// True if this scope or any ancestor recognizes the namespace.
    pub fn has_namespace(&self, scope: ScopeId, ns_name: &str) -> bool {
        let s = self.scope(scope);
        if s.namespaces.contains(ns_name) {
            return true;
        }
        match s.parent {
            Some(parent) => self.has_namespace(parent, ns_name),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Insert a type declaration and every constructor it carries.
    pub fn add_type(&mut self, scope: ScopeId, ns_name: &str, type_decl: TypeId) -> SemanticResult<()> {
        self.scopes[scope.index()]
            .dtable
            .insert_type(ns_name, type_decl, &self.types)?;

        let def_cons: Vec<DefaultConstructor> = self.types[type_decl]
            .default_constructors()
            .cloned()
            .collect();
        for cons in def_cons {
            self.add_default_constructor(scope, ns_name, cons)?;
        }

        let rec_cons: Vec<RecordConstructor> = self.types[type_decl]
            .record_constructors()
            .cloned()
            .collect();
        for cons in rec_cons {
            self.add_record_constructor(scope, ns_name, cons)?;
        }

        Ok(())
    }

    /// All types with the given name in a namespace, irrespective of arity.
    pub fn get_types(&self, scope: ScopeId, ns_name: &str, type_name: &str) -> Vec<TypeId> {
        let s = self.scope(scope);
        let found = s.dtable.get_types(ns_name, type_name);
        if !found.is_empty() {
            return found;
        }
        match s.parent {
            Some(parent) => self.get_types(parent, ns_name, type_name),
            None => found,
        }
    }

    pub fn get_type(
        &self,
        scope: ScopeId,
        ns_name: &str,
        type_name: &str,
        arity: usize,
    ) -> SemanticResult<TypeId> {
        let s = self.scope(scope);
        match s.dtable.get_type(ns_name, type_name, arity) {
            Ok(id) => Ok(id),
            Err(err) => match s.parent {
                Some(parent) => self.get_type(parent, ns_name, type_name, arity),
                None => Err(err),
            },
        }
    }

    pub fn type_exists(&self, scope: ScopeId, ns_name: &str, type_name: &str, arity: usize) -> bool {
        let s = self.scope(scope);
        s.dtable.type_exists(ns_name, type_name, arity)
            || s.parent
                .is_some_and(|parent| self.type_exists(parent, ns_name, type_name, arity))
    }

    /// True if any namespace anywhere in the scope chain declares a matching
    /// type. Guards type parameters against shadowing concrete types.
    pub fn type_exists_any(&self, scope: ScopeId, type_name: &str, arity: usize) -> bool {
        let s = self.scope(scope);
        s.dtable.type_exists_any(type_name, arity)
            || s.parent
                .is_some_and(|parent| self.type_exists_any(parent, type_name, arity))
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn add_default_constructor(
        &mut self,
        scope: ScopeId,
        ns_name: &str,
        cons: DefaultConstructor,
    ) -> SemanticResult<()> {
        self.check_constructor_name(scope, ns_name, cons.name())?;
        self.scopes[scope.index()]
            .ctable
            .insert_default_constructor(ns_name, cons)
    }

    pub fn add_record_constructor(
        &mut self,
        scope: ScopeId,
        ns_name: &str,
        cons: RecordConstructor,
    ) -> SemanticResult<()> {
        self.check_constructor_name(scope, ns_name, cons.name())?;
        self.scopes[scope.index()]
            .ctable
            .insert_record_constructor(ns_name, cons)
    }

    fn check_constructor_name(
        &self,
        scope: ScopeId,
        ns_name: &str,
        cons_name: &str,
    ) -> SemanticResult<()> {
        let s = self.scope(scope);
        if s.namespaces.contains(cons_name) {
            return Err(SemanticError::symbol_can_collide(
                "A constructor cannot share the same name as a namespace available in this scope.",
            ));
        }
        if s.dtable.function_exists_named(ns_name, cons_name) {
            return Err(SemanticError::symbol_can_collide(
                "A constructor cannot share the same name as a function already declared in this scope.",
            ));
        }
        if s.dtable.variable_exists(ns_name, cons_name) {
            return Err(SemanticError::symbol_can_collide(
                "A constructor cannot share the same name as a variable already declared in this scope.",
            ));
        }
        Ok(())
    }

    pub fn get_default_constructor(
        &self,
        scope: ScopeId,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> SemanticResult<DefaultConstructor> {
        let s = self.scope(scope);
        match s.ctable.get_default_constructor(ns_name, cons_name, arity) {
            Ok(cons) => Ok(cons.clone()),
            Err(err) => match s.parent {
                Some(parent) => self.get_default_constructor(parent, ns_name, cons_name, arity),
                None => Err(err),
            },
        }
    }

    pub fn get_record_constructor(
        &self,
        scope: ScopeId,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> SemanticResult<RecordConstructor> {
        let s = self.scope(scope);
        match s.ctable.get_record_constructor(ns_name, cons_name, arity) {
            Ok(cons) => Ok(cons.clone()),
            Err(err) => match s.parent {
                Some(parent) => self.get_record_constructor(parent, ns_name, cons_name, arity),
                None => Err(err),
            },
        }
    }

    pub fn default_constructor_exists(
        &self,
        scope: ScopeId,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> bool {
        let s = self.scope(scope);
        s.ctable.default_constructor_exists(ns_name, cons_name, arity)
            || s.parent.is_some_and(|parent| {
                self.default_constructor_exists(parent, ns_name, cons_name, arity)
            })
    }

    pub fn record_constructor_exists(
        &self,
        scope: ScopeId,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> bool {
        let s = self.scope(scope);
        s.ctable.record_constructor_exists(ns_name, cons_name, arity)
            || s.parent.is_some_and(|parent| {
                self.record_constructor_exists(parent, ns_name, cons_name, arity)
            })
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    pub fn add_function(
        &mut self,
        scope: ScopeId,
        ns_name: &str,
        function: Function,
    ) -> SemanticResult<()> {
        let s = self.scope(scope);
        if s.namespaces.contains(function.name()) {
            return Err(SemanticError::symbol_can_collide(
                "This function has the same name as an existing namespace. This is not allowed.",
            ));
        }
        if s.ctable
            .default_constructor_exists_named(ns_name, function.name())
        {
            return Err(SemanticError::symbol_can_collide(
                "This function has the same name as an existing default constructor. This is not allowed.",
            ));
        }
        if s.ctable
            .record_constructor_exists_named(ns_name, function.name())
        {
            return Err(SemanticError::symbol_can_collide(
                "This function has the same name as an existing record constructor. This is not allowed.",
            ));
        }

        trace!(name = function.name(), ns = ns_name, "inserting function");
        self.scopes[scope.index()]
            .dtable
            .insert_function(ns_name, function, &self.types)
    }

    pub fn get_function(
        &self,
        scope: ScopeId,
        ns_name: &str,
        function_name: &str,
        arity: usize,
    ) -> SemanticResult<Function> {
        let s = self.scope(scope);
        match s.dtable.get_function(ns_name, function_name, arity) {
            Ok(function) => Ok(function.clone()),
            Err(err) => match s.parent {
                Some(parent) => self.get_function(parent, ns_name, function_name, arity),
                None => Err(err),
            },
        }
    }

    /// Every overload with the given name and arity visible from a scope.
    pub fn get_functions(
        &self,
        scope: ScopeId,
        ns_name: &str,
        function_name: &str,
        arity: usize,
    ) -> Vec<Function> {
        let s = self.scope(scope);
        let found = s.dtable.get_functions(ns_name, function_name, arity);
        if !found.is_empty() {
            return found.into_iter().cloned().collect();
        }
        match s.parent {
            Some(parent) => self.get_functions(parent, ns_name, function_name, arity),
            None => Vec::new(),
        }
    }

    pub fn function_exists(
        &self,
        scope: ScopeId,
        ns_name: &str,
        function_name: &str,
        arity: usize,
    ) -> bool {
        let s = self.scope(scope);
        s.dtable.function_exists(ns_name, function_name, arity)
            || s.parent
                .is_some_and(|parent| self.function_exists(parent, ns_name, function_name, arity))
    }

    pub fn function_exists_named(&self, scope: ScopeId, ns_name: &str, function_name: &str) -> bool {
        let s = self.scope(scope);
        s.dtable.function_exists_named(ns_name, function_name)
            || s.parent
                .is_some_and(|parent| self.function_exists_named(parent, ns_name, function_name))
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    /// Variables are the one declaration kind that is scope-local: they are
    /// inserted into the current scope, once per name.
    pub fn add_variable(
        &mut self,
        scope: ScopeId,
        ns_name: &str,
        variable: Variable,
    ) -> SemanticResult<()> {
        let s = self.scope(scope);
        if s.namespaces.contains(variable.name()) {
            return Err(SemanticError::symbol_can_collide(
                "This variable has the same name as an existing namespace. This is not allowed.",
            ));
        }
        if s.ctable
            .default_constructor_exists_named(ns_name, variable.name())
        {
            return Err(SemanticError::symbol_can_collide(
                "This variable has the same name as an existing default constructor. This is not allowed.",
            ));
        }
        if s.ctable
            .record_constructor_exists_named(ns_name, variable.name())
        {
            return Err(SemanticError::symbol_can_collide(
                "This variable has the same name as an existing record constructor. This is not allowed.",
            ));
        }

        self.scopes[scope.index()]
            .dtable
            .insert_variable(ns_name, variable)
    }

    pub fn get_variable(
        &self,
        scope: ScopeId,
        ns_name: &str,
        variable_name: &str,
    ) -> SemanticResult<Variable> {
        let s = self.scope(scope);
        match s.dtable.get_variable(ns_name, variable_name) {
            Ok(variable) => Ok(variable.clone()),
            Err(err) => match s.parent {
                Some(parent) => self.get_variable(parent, ns_name, variable_name),
                None => Err(err),
            },
        }
    }

    pub fn variable_exists(&self, scope: ScopeId, ns_name: &str, variable_name: &str) -> bool {
        let s = self.scope(scope);
        s.dtable.variable_exists(ns_name, variable_name)
            || s.parent
                .is_some_and(|parent| self.variable_exists(parent, ns_name, variable_name))
    }
}
