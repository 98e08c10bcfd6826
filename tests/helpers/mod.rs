//! Shared fixtures for the integration tests: hand-built programs standing
//! in for parser output, and an in-memory module loader.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use quill::ast::{
    Decl, DefaultConstructor, Function, ImportDecl, NamespaceDecl, Program, Stmt, TypeDecl,
    TypeId, TypeInstance, ValidationState, Variable,
};
use quill::base::{star_token, Fqn, Token, TokenKind};
use quill::project::{LoadError, ModuleLoader};
use quill::semantic::{ScopeId, SymbolTable};

/// Every fixture token is an identifier; lookups go by lexeme and the
/// checker compares tokens by `(kind, lexeme)`, so one kind keeps stand-in
/// matching consistent.
pub fn tok(name: &str) -> Token {
    Token::new(TokenKind::Identifier, name, 1, 1, "test.ql")
}

/// An unresolved use-site instance in the wildcard namespace.
pub fn user_instance(name: &str, params: Vec<TypeInstance>) -> TypeInstance {
    let mut instance = TypeInstance::new(tok(name), "*");
    for param in params {
        instance.add_param(param);
    }
    instance
}

/// Declare an unchecked parametric type.
pub fn type_decl(table: &mut SymbolTable, name: &str, params: &[&str]) -> TypeId {
    let mut decl = TypeDecl::new(tok(name), ValidationState::Unknown);
    decl.set_namespace("*");
    for param in params {
        decl.add_param(tok(param));
    }
    table.types_mut().alloc(decl)
}

pub fn add_default_ctor(
    table: &mut SymbolTable,
    owner: TypeId,
    name: &str,
    params: Vec<TypeInstance>,
) {
    let mut cons = DefaultConstructor::new(tok(name), owner);
    for param in params {
        cons.add_param(param);
    }
    table.types_mut()[owner].add_default_constructor(cons).unwrap();
}

/// A function with typed parameters, as the parser would hand it over.
pub fn function_decl(name: &str, params: &[TypeInstance], return_type: TypeInstance) -> Function {
    let mut function = Function::new(tok(name));
    for (index, instance) in params.iter().enumerate() {
        let mut param = Variable::new(tok(&format!("p{index}")), false);
        param.set_type_instance(instance.clone());
        function.add_param(param);
    }
    function.set_return_type(return_type);
    function
}

/// Builds a user module: a program with one global namespace.
pub struct ModuleBuilder {
    scope: ScopeId,
    namespace: NamespaceDecl,
    program: Program,
}

impl ModuleBuilder {
    pub fn new(table: &mut SymbolTable, name: &str) -> Self {
        let fqn = Fqn::from_name(name);
        let scope = table.new_scope(None);
        table.scope_mut(scope).set_origin(fqn.serialize());

        let program = Program::new(fqn.clone(), scope);
        let mut namespace = NamespaceDecl::new(star_token().clone());
        namespace.set_fqn(fqn);

        Self {
            scope,
            namespace,
            program,
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn import(&mut self, module: &str) {
        self.program
            .add_declaration(Decl::Import(ImportDecl::new(tok("import"), module)));
    }

    pub fn declare_type(&mut self, type_decl: TypeId) {
        self.namespace.add_declaration(Decl::Type(type_decl));
    }

    pub fn declare_function(&mut self, function: Function) {
        self.namespace.add_declaration(Decl::Function(function));
    }

    pub fn declare_variable(&mut self, variable: Variable) {
        self.namespace.add_declaration(Decl::Variable(variable));
    }

    /// A bare top-level statement, as a script-style module carries.
    pub fn declare_statement(&mut self, stmt: Stmt) {
        self.namespace.add_declaration(Decl::Statement(stmt));
    }

    pub fn finish(mut self) -> Program {
        self.program.add_declaration(Decl::Namespace(self.namespace));
        self.program
    }
}

type ProgramFactory = Box<dyn FnMut(&mut SymbolTable) -> Program>;

/// A loader serving hand-built programs instead of parsing files.
#[derive(Default)]
pub struct MemoryLoader {
    modules: HashMap<String, ProgramFactory>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        fqn_path: &str,
        build: impl FnMut(&mut SymbolTable) -> Program + 'static,
    ) {
        self.modules.insert(fqn_path.to_owned(), Box::new(build));
    }
}

impl ModuleLoader for MemoryLoader {
    fn parse(
        &mut self,
        fqn_path: &str,
        _search_paths: &[PathBuf],
        table: &mut SymbolTable,
    ) -> Result<Program, LoadError> {
        match self.modules.get_mut(fqn_path) {
            Some(build) => Ok(build(table)),
            None => Err(LoadError::FileNotFound(fqn_path.to_owned())),
        }
    }
}
