//! The io module.

use crate::ast::Program;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{primitive_type, BuiltinModule};

pub fn io_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (string_type, string) = primitive_type(table, "string");
    let (void_type, void) = primitive_type(table, "void");

    let mut module = BuiltinModule::new(table, "io");
    module.use_type(table, string_type)?;
    module.use_type(table, void_type)?;

    module.function(table, "print", &[string.clone()], void.clone());
    module.function(table, "println", &[string.clone()], void);
    module.function(table, "readln", &[], string);

    Ok(module.finish())
}
