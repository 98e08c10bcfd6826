//! The maybe module: the one parametric built-in.
//!
//! `maybe(a) = None | Just(a)` is declared exactly the way a user would
//! write it, so the checker and the specialization engine treat it like any
//! other parametric type.

use crate::ast::{DefaultConstructor, Program, TypeDecl, TypeInstance, ValidationState};
use crate::base::{Token, TokenKind};
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{type_token, BuiltinModule};

pub fn maybe_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let param = Token::new(TokenKind::Identifier, "a", 0, 0, "__bit__");

    let mut decl = TypeDecl::new(type_token("maybe"), ValidationState::Valid);
    decl.set_namespace("*");
    decl.add_param(param.clone());
    let maybe_type = table.types_mut().alloc(decl);

    let none = DefaultConstructor::new(type_token("None"), maybe_type);
    table.types_mut()[maybe_type].add_default_constructor(none)?;

    let mut just = DefaultConstructor::new(type_token("Just"), maybe_type);
    just.add_param(TypeInstance::new(param, "*"));
    just.set_parametrized(true);
    table.types_mut()[maybe_type].add_default_constructor(just)?;

    let mut module = BuiltinModule::new(table, "maybe");
    module.define_type(table, maybe_type)?;

    Ok(module.finish())
}
