//! The trigonometry module.

use crate::ast::Program;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{primitive_type, BuiltinModule};

/// The trig module exports no type of its own; it operates on floats.
pub fn trig_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (float_type, float) = primitive_type(table, "float");

    let mut module = BuiltinModule::new(table, "trig");
    module.use_type(table, float_type)?;

    for function in ["sin", "cos", "tan"] {
        module.function(table, function, &[float.clone()], float.clone());
    }

    Ok(module.finish())
}
