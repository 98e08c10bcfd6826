//! Shared construction helpers for built-in modules.

use crate::ast::{
    Decl, Function, NamespaceDecl, Program, TypeDecl, TypeId, TypeInstance, ValidationState,
    Variable,
};
use crate::base::{star_token, Fqn, Token, TokenKind};
use crate::semantic::error::SemanticResult;
use crate::semantic::{ScopeId, SymbolTable};

/// Positional parameter names for built-in function stubs.
const PARAM_NAMES: [&str; 4] = ["x", "y", "z", "w"];

pub(crate) fn type_token(name: &str) -> Token {
    Token::new(TokenKind::TypeName, name, 0, 0, "__bit__")
}

pub(crate) fn function_token(name: &str) -> Token {
    Token::new(TokenKind::Identifier, name, 0, 0, "__bif__")
}

/// Allocate a valid primitive type and a concrete instance of it.
pub fn primitive_type(table: &mut SymbolTable, name: &str) -> (TypeId, TypeInstance) {
    let mut decl = TypeDecl::new(type_token(name), ValidationState::Valid);
    decl.set_namespace("*");
    let id = table.types_mut().alloc(decl);
    (id, TypeInstance::with_builder(type_token(name), id, "*"))
}

/// Wrap an instance in the `ref` pseudo-type representing indirection.
pub fn ref_instance(table: &mut SymbolTable, payload: TypeInstance) -> TypeInstance {
    let mut decl = TypeDecl::new(type_token("ref"), ValidationState::Valid);
    decl.set_namespace("*");
    let id = table.types_mut().alloc(decl);

    let mut instance = TypeInstance::with_builder(type_token("ref"), id, "*");
    instance.set_reference(true);
    instance.add_param(payload);
    instance
}

/// Builds one built-in module: a program with its own scope, one outer
/// (global) namespace, and the declarations added through it.
pub(crate) struct BuiltinModule {
    fqn: Fqn,
    scope: ScopeId,
    namespace: NamespaceDecl,
    program: Program,
}

impl BuiltinModule {
    pub(crate) fn new(table: &mut SymbolTable, name: &str) -> Self {
        let fqn = super::builtin_fqn(name);
        let scope = table.new_scope(None);
        table.scope_mut(scope).set_origin(fqn.serialize());
        table.add_namespace(scope, star_token().lexeme());

        let mut program = Program::new(fqn.clone(), scope);
        program.set_builtin(true);

        let mut namespace = NamespaceDecl::new(star_token().clone());
        namespace.set_fqn(fqn.clone());

        Self {
            fqn,
            scope,
            namespace,
            program,
        }
    }

    /// Declare a type in this module's namespace: it lands in the module
    /// scope and is exported to importers.
    pub(crate) fn define_type(
        &mut self,
        table: &mut SymbolTable,
        type_decl: TypeId,
    ) -> SemanticResult<()> {
        table.types_mut()[type_decl].set_fqn(self.fqn.clone());
        table.add_type(self.scope, self.namespace.name(), type_decl)?;
        self.namespace.add_declaration(Decl::Type(type_decl));
        Ok(())
    }

    /// Make a foreign primitive visible to this module's signatures without
    /// exporting it.
    pub(crate) fn use_type(
        &mut self,
        table: &mut SymbolTable,
        type_decl: TypeId,
    ) -> SemanticResult<()> {
        table.add_type(self.scope, self.namespace.name(), type_decl)
    }

    /// Add a built-in function stub. No body: the evaluator dispatches on
    /// the function's old name.
    pub(crate) fn function(
        &mut self,
        table: &mut SymbolTable,
        name: &str,
        params: &[TypeInstance],
        return_type: TypeInstance,
    ) {
        let mut function = Function::new(function_token(name));
        function.set_fqn(self.fqn.clone());
        function.set_public(true);
        function.set_builtin(true);
        function.set_namespace(self.namespace.name());

        let function_scope = table.new_scope(Some(self.scope));
        function.set_scope(function_scope);

        for (index, instance) in params.iter().enumerate() {
            let param_name = PARAM_NAMES.get(index).copied().unwrap_or("v");
            let mut param = Variable::new(function_token(param_name), false);
            param.set_check_initializer(false);
            param.set_type_instance(instance.clone());
            function.add_param(param);
        }
        function.set_return_type(return_type);

        self.namespace.add_declaration(Decl::Function(function));
    }

    pub(crate) fn finish(mut self) -> Program {
        self.program.add_declaration(Decl::Namespace(self.namespace));
        self.program
    }
}
