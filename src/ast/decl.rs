//! Declarations: variables, functions, namespaces, imports, and programs.

use smol_str::SmolStr;

use crate::base::{Fqn, Token};
use crate::semantic::ScopeId;

use super::expr::Expression;
use super::stmt::{BlockStmt, Stmt};
use super::ty::{strong_compare, TypeArena, TypeId, TypeInstance, ValidationState};

// ============================================================================
// VARIABLES
// ============================================================================

/// A variable declaration: global, local, or function parameter.
#[derive(Debug, Clone)]
pub struct Variable {
    name: SmolStr,
    token: Token,
    is_mutable: bool,
    fqn: Fqn,
    namespace: SmolStr,
    scope: Option<ScopeId>,
    type_instance: Option<TypeInstance>,
    initializer: Option<Expression>,
    state: ValidationState,
    check_initializer: bool,
    is_public: bool,
    is_global: bool,
    is_used: bool,
    is_reference: bool,
    is_temporary: bool,
    is_reachable: bool,
    terminates: bool,
}

impl Variable {
    pub fn new(token: Token, is_mutable: bool) -> Self {
        Self {
            name: token.lexeme_smol(),
            token,
            is_mutable,
            fqn: Fqn::default(),
            namespace: SmolStr::new("*"),
            scope: None,
            type_instance: None,
            initializer: None,
            state: ValidationState::Unknown,
            check_initializer: true,
            is_public: true,
            is_global: false,
            is_used: false,
            is_reference: false,
            is_temporary: false,
            is_reachable: false,
            terminates: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn is_mutable(&self) -> bool {
        self.is_mutable
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn set_fqn(&mut self, fqn: Fqn) {
        self.fqn = fqn;
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<SmolStr>) {
        self.namespace = namespace.into();
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn set_scope(&mut self, scope: ScopeId) {
        self.scope = Some(scope);
    }

    pub fn type_instance(&self) -> Option<&TypeInstance> {
        self.type_instance.as_ref()
    }

    pub fn type_instance_mut(&mut self) -> Option<&mut TypeInstance> {
        self.type_instance.as_mut()
    }

    pub fn set_type_instance(&mut self, instance: TypeInstance) {
        self.type_instance = Some(instance);
    }

    pub fn initializer(&self) -> Option<&Expression> {
        self.initializer.as_ref()
    }

    pub fn set_initializer(&mut self, value: Expression) {
        self.initializer = Some(value);
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn set_state(&mut self, state: ValidationState) {
        self.state = state;
    }

    /// Whether the checker should validate the initializer. Turned off for
    /// parameters whose value arrives at call time.
    pub fn check_initializer(&self) -> bool {
        self.check_initializer
    }

    pub fn set_check_initializer(&mut self, check: bool) {
        self.check_initializer = check;
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn set_public(&mut self, public: bool) {
        self.is_public = public;
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }

    pub fn set_global(&mut self, global: bool) {
        self.is_global = global;
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    pub fn set_used(&mut self, used: bool) {
        self.is_used = used;
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn set_reference(&mut self, reference: bool) {
        self.is_reference = reference;
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    pub fn set_temporary(&mut self, temporary: bool) {
        self.is_temporary = temporary;
    }

    pub fn is_reachable(&self) -> bool {
        self.is_reachable
    }

    pub fn set_reachable(&mut self, reachable: bool) {
        self.is_reachable = reachable;
    }

    pub fn terminates(&self) -> bool {
        self.terminates
    }

    pub fn set_terminates(&mut self, terminates: bool) {
        self.terminates = terminates;
    }
}

// ============================================================================
// FUNCTIONS
// ============================================================================

/// A function declaration.
///
/// Built-in functions have no body; the evaluator dispatches on `old_name`
/// (the original name before any renaming, e.g. `__add__` or `apply`).
#[derive(Debug, Clone)]
pub struct Function {
    name: SmolStr,
    old_name: SmolStr,
    token: Token,
    fqn: Fqn,
    namespace: SmolStr,
    scope: Option<ScopeId>,
    type_params: Vec<Token>,
    params: Vec<Variable>,
    return_type: Option<TypeInstance>,
    body: BlockStmt,
    state: ValidationState,
    is_public: bool,
    is_used: bool,
    is_builtin: bool,
    terminates: bool,
}

impl Function {
    pub fn new(token: Token) -> Self {
        Self {
            name: token.lexeme_smol(),
            old_name: token.lexeme_smol(),
            token,
            fqn: Fqn::default(),
            namespace: SmolStr::new("*"),
            scope: None,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
            body: BlockStmt::new(),
            state: ValidationState::Unknown,
            is_public: false,
            is_used: false,
            is_builtin: false,
            terminates: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    /// The dispatch key the evaluator uses for built-in functions.
    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn set_fqn(&mut self, fqn: Fqn) {
        self.fqn = fqn;
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<SmolStr>) {
        self.namespace = namespace.into();
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn set_scope(&mut self, scope: ScopeId) {
        self.scope = Some(scope);
    }

    pub fn add_type_param(&mut self, param: Token) {
        self.type_params.push(param);
    }

    pub fn type_params(&self) -> &[Token] {
        &self.type_params
    }

    pub fn add_param(&mut self, param: Variable) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[Variable] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [Variable] {
        &mut self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn return_type(&self) -> Option<&TypeInstance> {
        self.return_type.as_ref()
    }

    pub fn return_type_mut(&mut self) -> Option<&mut TypeInstance> {
        self.return_type.as_mut()
    }

    pub fn set_return_type(&mut self, instance: TypeInstance) {
        self.return_type = Some(instance);
    }

    pub fn body(&self) -> &BlockStmt {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BlockStmt {
        &mut self.body
    }

    pub fn set_body(&mut self, body: BlockStmt) {
        self.body = body;
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn set_state(&mut self, state: ValidationState) {
        self.state = state;
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn set_public(&mut self, public: bool) {
        self.is_public = public;
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    pub fn set_used(&mut self, used: bool) {
        self.is_used = used;
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    pub fn set_builtin(&mut self, builtin: bool) {
        self.is_builtin = builtin;
    }

    pub fn terminates(&self) -> bool {
        self.terminates
    }

    pub fn set_terminates(&mut self, terminates: bool) {
        self.terminates = terminates;
    }

    /// True when this function and another carry the same name, arity, and
    /// strongly equal parameter instances: the pair could never be told
    /// apart, so such overloads are rejected at insertion. A parametric
    /// overload and a concrete one may coexist; overload resolution
    /// discriminates them by weight.
    pub fn collides_with(&self, other: &Function, types: &TypeArena) -> bool {
        if self.name != other.name || self.params.len() != other.params.len() {
            return false;
        }
        self.params
            .iter()
            .zip(&other.params)
            .all(
                |(a, b)| match (a.type_instance(), b.type_instance()) {
                    (Some(ai), Some(bi)) => strong_compare(ai, bi, types),
                    (None, None) => true,
                    _ => false,
                },
            )
    }

    /// Exact signature equality under strong comparison.
    pub fn same_signature(&self, other: &Function, types: &TypeArena) -> bool {
        if self.name != other.name || self.params.len() != other.params.len() {
            return false;
        }
        let params_match = self.params.iter().zip(&other.params).all(|(a, b)| {
            match (a.type_instance(), b.type_instance()) {
                (Some(ai), Some(bi)) => strong_compare(ai, bi, types),
                (None, None) => true,
                _ => false,
            }
        });
        let returns_match = match (&self.return_type, &other.return_type) {
            (Some(a), Some(b)) => strong_compare(a, b, types),
            (None, None) => true,
            _ => false,
        };
        params_match && returns_match
    }
}

// ============================================================================
// NAMESPACES, IMPORTS, PROGRAMS
// ============================================================================

/// A namespace: the unit of declaration grouping inside a program. The
/// global namespace is named `*`.
#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    token: Token,
    fqn: Fqn,
    declarations: Vec<Decl>,
}

impl NamespaceDecl {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            fqn: Fqn::default(),
            declarations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.token.lexeme()
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn set_fqn(&mut self, fqn: Fqn) {
        self.fqn = fqn;
    }

    pub fn add_declaration(&mut self, decl: Decl) {
        self.declarations.push(decl);
    }

    pub fn declarations(&self) -> &[Decl] {
        &self.declarations
    }
}

/// An import declaration naming the module to pull in.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    token: Token,
    fqn_name: SmolStr,
}

impl ImportDecl {
    pub fn new(token: Token, fqn_name: impl Into<SmolStr>) -> Self {
        Self {
            token,
            fqn_name: fqn_name.into(),
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn fqn_name(&self) -> &str {
        &self.fqn_name
    }
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Type(TypeId),
    Function(Function),
    Variable(Variable),
    Import(ImportDecl),
    Namespace(NamespaceDecl),
    /// A bare statement at the top level of a script-style module. Never
    /// importable; it only runs when its own module is evaluated.
    Statement(Stmt),
}

impl Decl {
    pub fn is_import(&self) -> bool {
        matches!(self, Decl::Import(_))
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, Decl::Namespace(_))
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Decl::Statement(_))
    }
}

/// A compilation unit: an fqn, a scope, and top-level declarations.
#[derive(Debug, Clone)]
pub struct Program {
    fqn: Fqn,
    scope: ScopeId,
    declarations: Vec<Decl>,
    is_builtin: bool,
}

impl Program {
    pub fn new(fqn: Fqn, scope: ScopeId) -> Self {
        Self {
            fqn,
            scope,
            declarations: Vec::new(),
            is_builtin: false,
        }
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn add_declaration(&mut self, decl: Decl) {
        self.declarations.push(decl);
    }

    pub fn declarations(&self) -> &[Decl] {
        &self.declarations
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    pub fn set_builtin(&mut self, builtin: bool) {
        self.is_builtin = builtin;
    }

    /// The fqn names this program imports, in declaration order.
    pub fn import_names(&self) -> Vec<SmolStr> {
        self.declarations
            .iter()
            .filter_map(|decl| match decl {
                Decl::Import(import) => Some(SmolStr::new(import.fqn_name())),
                _ => None,
            })
            .collect()
    }
}
