//! The declaration table: types, functions, and variables, per namespace.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::ast::{Function, TypeArena, TypeId, Variable};
use crate::semantic::error::{SemanticError, SemanticResult};

/// The kind of declaration a name is bound to within one namespace.
///
/// The kind index backs the cross-kind collision checks. One deliberate
/// asymmetry carried over from the language definition: a built-in cast
/// function may share its name with the type it casts to (`string` the
/// function beside `string` the type), so a function name colliding with a
/// type name alone is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Type,
    Function,
    Variable,
}

/// The declarations of a single namespace.
#[derive(Debug, Clone, Default)]
pub struct DeclSymbols {
    /// Kind index over every declared name in this namespace.
    declarations: FxHashMap<SmolStr, DeclKind>,
    types: BTreeMap<(SmolStr, usize), TypeId>,
    /// Overload sets keyed by name and arity.
    functions: BTreeMap<(SmolStr, usize), Vec<Function>>,
    variables: FxHashMap<SmolStr, Variable>,
}

impl DeclSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn insert_type(&mut self, type_decl: TypeId, types: &TypeArena) -> SemanticResult<()> {
        let decl = &types[type_decl];
        let name = SmolStr::new(decl.name());

        if self.declarations.get(&name) == Some(&DeclKind::Variable) {
            return Err(SemanticError::symbol_can_collide(
                "There already exists another declaration with the name given to this type.",
            ));
        }

        let key = (name.clone(), decl.arity());
        if self.types.contains_key(&key) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a locally defined type with the same name and arity.",
            ));
        }

        self.types.insert(key, type_decl);
        self.declarations.entry(name).or_insert(DeclKind::Type);
        Ok(())
    }

    /// All types matching the given name, irrespective of arity.
    pub fn get_types(&self, name: &str) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|((type_name, _), _)| type_name == name)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn get_type(&self, name: &str, arity: usize) -> SemanticResult<TypeId> {
        self.types
            .get(&(SmolStr::new(name), arity))
            .copied()
            .ok_or_else(|| {
                SemanticError::symbol_not_found(format!(
                    "There is no type with the given name <{name}> and arity <{arity}>."
                ))
            })
    }

    pub fn type_exists(&self, name: &str, arity: usize) -> bool {
        self.types.contains_key(&(SmolStr::new(name), arity))
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Insert a function, rejecting overloads that cannot be told apart.
    pub fn insert_function(&mut self, function: Function, types: &TypeArena) -> SemanticResult<()> {
        let name = SmolStr::new(function.name());

        if self.declarations.get(&name) == Some(&DeclKind::Variable) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a variable declaration with the name given to this function.",
            ));
        }

        let key = (name.clone(), function.arity());
        if let Some(overloads) = self.functions.get(&key) {
            for existing in overloads {
                if function.collides_with(existing, types) {
                    return Err(SemanticError::symbol_can_collide(
                        "This function can collide with another function.",
                    ));
                }
            }
        }

        self.functions.entry(key).or_default().push(function);
        self.declarations.entry(name).or_insert(DeclKind::Function);
        Ok(())
    }

    /// The unique function with the given name and arity; an error when
    /// there are none or several.
    pub fn get_function(&self, name: &str, arity: usize) -> SemanticResult<&Function> {
        let overloads = self
            .functions
            .get(&(SmolStr::new(name), arity))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        match overloads {
            [] => Err(SemanticError::symbol_not_found(format!(
                "No function by the name <{name}> with arity <{arity}> could be found."
            ))),
            [function] => Ok(function),
            _ => Err(SemanticError::symbol_can_collide(format!(
                "Multiple functions by the name <{name}> with arity <{arity}> were found when only one was expected."
            ))),
        }
    }

    pub fn get_functions(&self, name: &str, arity: usize) -> Vec<&Function> {
        self.functions
            .get(&(SmolStr::new(name), arity))
            .map(|overloads| overloads.iter().collect())
            .unwrap_or_default()
    }

    pub fn function_exists(&self, name: &str, arity: usize) -> bool {
        self.functions.contains_key(&(SmolStr::new(name), arity))
    }

    pub fn function_exists_named(&self, name: &str) -> bool {
        self.functions
            .keys()
            .any(|(function_name, _)| function_name == name)
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    pub fn insert_variable(&mut self, variable: Variable) -> SemanticResult<()> {
        let name = SmolStr::new(variable.name());

        if let Some(kind) = self.declarations.get(&name) {
            if *kind != DeclKind::Variable {
                return Err(SemanticError::symbol_can_collide(
                    "There already exists another declaration with the name given to this variable.",
                ));
            }
        }
        if self.variables.contains_key(&name) {
            return Err(SemanticError::symbol_already_declared(
                "This variable declaration already exists.",
            ));
        }

        self.variables.insert(name.clone(), variable);
        self.declarations.insert(name, DeclKind::Variable);
        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> SemanticResult<&Variable> {
        self.variables.get(name).ok_or_else(|| {
            SemanticError::symbol_not_found(
                "No variable declaration with the given name was found.",
            )
        })
    }

    pub fn variable_exists(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

/// Per-namespace declaration tables of one scope.
#[derive(Debug, Clone, Default)]
pub struct DeclTable {
    symbols: FxHashMap<SmolStr, DeclSymbols>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, ns_name: &str) -> Option<&DeclSymbols> {
        self.symbols.get(ns_name)
    }

    fn namespace_mut(&mut self, ns_name: &str) -> &mut DeclSymbols {
        self.symbols.entry(SmolStr::new(ns_name)).or_default()
    }

    pub fn insert_type(
        &mut self,
        ns_name: &str,
        type_decl: TypeId,
        types: &TypeArena,
    ) -> SemanticResult<()> {
        self.namespace_mut(ns_name)
            .insert_type(type_decl, types)
            .map_err(|err| match err {
                SemanticError::SymbolAlreadyDeclared { .. } => SemanticError::symbol_already_declared(
                    "There already exists another type with the same name and arity declared in this namespace.",
                ),
                SemanticError::SymbolCanCollide { .. } => SemanticError::symbol_can_collide(
                    "There already exists another declaration (variable) with the same name in this namespace.",
                ),
                other => other,
            })
    }

    pub fn get_types(&self, ns_name: &str, type_name: &str) -> Vec<TypeId> {
        self.namespace(ns_name)
            .map(|symbols| symbols.get_types(type_name))
            .unwrap_or_default()
    }

    pub fn get_type(&self, ns_name: &str, type_name: &str, arity: usize) -> SemanticResult<TypeId> {
        match self.namespace(ns_name) {
            Some(symbols) => symbols.get_type(type_name, arity).map_err(|err| {
                SemanticError::symbol_not_found(format!(
                    "{} Namespace is <{ns_name}>.",
                    err.message()
                ))
            }),
            None => Err(SemanticError::symbol_not_found(
                "There is no type corresponding to the given name and arity in this namespace.",
            )),
        }
    }

    pub fn type_exists(&self, ns_name: &str, type_name: &str, arity: usize) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.type_exists(type_name, arity))
    }

    /// True if any namespace in this table declares a matching type.
    pub fn type_exists_any(&self, type_name: &str, arity: usize) -> bool {
        self.symbols
            .values()
            .any(|symbols| symbols.type_exists(type_name, arity))
    }

    pub fn insert_function(
        &mut self,
        ns_name: &str,
        function: Function,
        types: &TypeArena,
    ) -> SemanticResult<()> {
        self.namespace_mut(ns_name)
            .insert_function(function, types)
            .map_err(|err| match err {
                SemanticError::SymbolCanCollide { .. } => SemanticError::symbol_can_collide(
                    "There already exists another function with the same name and indistinguishable parameters in the current namespace.",
                ),
                SemanticError::SymbolAlreadyDeclared { .. } => SemanticError::symbol_already_declared(
                    "There already exists another declaration (variable) with the same name as this function.",
                ),
                other => other,
            })
    }

    pub fn get_function(
        &self,
        ns_name: &str,
        function_name: &str,
        arity: usize,
    ) -> SemanticResult<&Function> {
        match self.namespace(ns_name) {
            Some(symbols) => symbols.get_function(function_name, arity),
            None => Err(SemanticError::symbol_not_found(
                "There is no function corresponding to the given name and arity in this namespace.",
            )),
        }
    }

    pub fn get_functions(&self, ns_name: &str, function_name: &str, arity: usize) -> Vec<&Function> {
        self.namespace(ns_name)
            .map(|symbols| symbols.get_functions(function_name, arity))
            .unwrap_or_default()
    }

    pub fn function_exists(&self, ns_name: &str, function_name: &str, arity: usize) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.function_exists(function_name, arity))
    }

    pub fn function_exists_named(&self, ns_name: &str, function_name: &str) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.function_exists_named(function_name))
    }

    pub fn insert_variable(&mut self, ns_name: &str, variable: Variable) -> SemanticResult<()> {
        let name = SmolStr::new(variable.name());
        self.namespace_mut(ns_name)
            .insert_variable(variable)
            .map_err(|err| match err {
                SemanticError::SymbolAlreadyDeclared { .. } => {
                    SemanticError::symbol_already_declared(format!(
                        "There already exists another variable with the same name <{name}> declared in the namespace <{ns_name}>."
                    ))
                }
                SemanticError::SymbolCanCollide { .. } => SemanticError::symbol_can_collide(format!(
                    "There already exists another declaration (type or function) with the same name <{name}> in the namespace <{ns_name}>."
                )),
                other => other,
            })
    }

    pub fn get_variable(&self, ns_name: &str, variable_name: &str) -> SemanticResult<&Variable> {
        match self.namespace(ns_name) {
            Some(symbols) => symbols.get_variable(variable_name),
            None => Err(SemanticError::symbol_not_found(
                "No variable declaration with the given name was found in the given namespace because the namespace doesn't exist.",
            )),
        }
    }

    pub fn variable_exists(&self, ns_name: &str, variable_name: &str) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.variable_exists(variable_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TypeDecl, TypeInstance, ValidationState};
    use crate::base::{Token, TokenKind};

    fn type_token(name: &str) -> Token {
        Token::new(TokenKind::TypeName, name, 1, 1, "test.ql")
    }

    fn id_token(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, 1, 1, "test.ql")
    }

    #[test]
    fn test_type_insert_rejects_same_name_and_arity() {
        let mut types = TypeArena::new();
        let mut table = DeclTable::new();
        let first = types.alloc(TypeDecl::new(type_token("box"), ValidationState::Unknown));
        let second = types.alloc(TypeDecl::new(type_token("box"), ValidationState::Unknown));

        table.insert_type("*", first, &types).unwrap();
        assert!(matches!(
            table.insert_type("*", second, &types),
            Err(SemanticError::SymbolAlreadyDeclared { .. })
        ));
    }

    #[test]
    fn test_type_insert_allows_different_arity() {
        let mut types = TypeArena::new();
        let mut table = DeclTable::new();
        let nullary = types.alloc(TypeDecl::new(type_token("box"), ValidationState::Unknown));
        let unary = {
            let mut decl = TypeDecl::new(type_token("box"), ValidationState::Unknown);
            decl.add_param(id_token("a"));
            types.alloc(decl)
        };

        table.insert_type("*", nullary, &types).unwrap();
        table.insert_type("*", unary, &types).unwrap();
        assert!(table.type_exists("*", "box", 0));
        assert!(table.type_exists("*", "box", 1));
    }

    #[test]
    fn test_variable_blocks_type_of_same_name() {
        let mut types = TypeArena::new();
        let mut table = DeclTable::new();
        table
            .insert_variable("*", Variable::new(id_token("box"), false))
            .unwrap();

        let shadowing = types.alloc(TypeDecl::new(type_token("box"), ValidationState::Unknown));
        assert!(matches!(
            table.insert_type("*", shadowing, &types),
            Err(SemanticError::SymbolCanCollide { .. })
        ));
    }

    #[test]
    fn test_function_overloads_by_signature() {
        let mut types = TypeArena::new();
        let mut table = DeclTable::new();
        let int = types.alloc(TypeDecl::new(type_token("int"), ValidationState::Valid));
        let bool_ = types.alloc(TypeDecl::new(type_token("bool"), ValidationState::Valid));

        let with_param = |ty: crate::ast::TypeId, ty_name: &str| {
            let mut f = Function::new(id_token("f"));
            let mut param = Variable::new(id_token("x"), false);
            param.set_type_instance(TypeInstance::with_builder(type_token(ty_name), ty, "*"));
            f.add_param(param);
            f
        };

        table
            .insert_function("*", with_param(int, "int"), &types)
            .unwrap();
        // A different parameter type is a fine overload.
        table
            .insert_function("*", with_param(bool_, "bool"), &types)
            .unwrap();
        // The same parameter type again is ambiguous.
        assert!(matches!(
            table.insert_function("*", with_param(int, "int"), &types),
            Err(SemanticError::SymbolCanCollide { .. })
        ));
        assert_eq!(table.get_functions("*", "f", 1).len(), 2);
        assert!(table.get_function("*", "f", 1).is_err());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut types = TypeArena::new();
        let mut table = DeclTable::new();
        let ty = types.alloc(TypeDecl::new(type_token("box"), ValidationState::Unknown));
        table.insert_type("quantum", ty, &types).unwrap();

        assert!(table.type_exists("quantum", "box", 0));
        assert!(!table.type_exists("*", "box", 0));
        assert!(table.type_exists_any("box", 0));
        assert!(table.get_type("*", "box", 0).is_err());
    }

    #[test]
    fn test_variable_duplicate_rejected() {
        let mut table = DeclTable::new();
        table
            .insert_variable("*", Variable::new(id_token("x"), false))
            .unwrap();
        assert!(matches!(
            table.insert_variable("*", Variable::new(id_token("x"), true)),
            Err(SemanticError::SymbolAlreadyDeclared { .. })
        ));
    }
}
