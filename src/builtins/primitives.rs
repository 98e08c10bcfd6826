//! The scalar built-in modules: string, void, bool, int, and float.

use crate::ast::Program;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{primitive_type, BuiltinModule};

/// The string module: the `string` type, concatenation, and comparison.
pub fn string_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (string_type, string) = primitive_type(table, "string");
    let (_, bool_) = primitive_type(table, "bool");

    let mut module = BuiltinModule::new(table, "string");
    module.define_type(table, string_type)?;
    if let Some(id) = bool_.builder() {
        module.use_type(table, id)?;
    }

    module.function(table, "__add__", &[string.clone(), string.clone()], string.clone());
    module.function(table, "__eq__", &[string.clone(), string.clone()], bool_.clone());
    module.function(table, "__ne__", &[string.clone(), string.clone()], bool_);

    Ok(module.finish())
}

/// The void module: the unit type. No operators.
pub fn void_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (void_type, _) = primitive_type(table, "void");

    let mut module = BuiltinModule::new(table, "void");
    module.define_type(table, void_type)?;

    Ok(module.finish())
}

/// The bool module: logical operators and the string cast.
pub fn bool_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (bool_type, bool_) = primitive_type(table, "bool");
    let (_, string) = primitive_type(table, "string");

    let mut module = BuiltinModule::new(table, "bool");
    module.define_type(table, bool_type)?;
    if let Some(id) = string.builder() {
        module.use_type(table, id)?;
    }

    module.function(table, "__and__", &[bool_.clone(), bool_.clone()], bool_.clone());
    module.function(table, "__or__", &[bool_.clone(), bool_.clone()], bool_.clone());
    module.function(table, "__not__", &[bool_.clone()], bool_.clone());
    module.function(table, "__eq__", &[bool_.clone(), bool_.clone()], bool_.clone());
    module.function(table, "__ne__", &[bool_.clone(), bool_.clone()], bool_.clone());
    // Cast to string: the operator form and the function form.
    module.function(table, "__cast__", &[bool_.clone()], string.clone());
    module.function(table, "string", &[bool_], string);

    Ok(module.finish())
}

/// The int module: arithmetic, comparison, and casts.
pub fn int_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (int_type, int) = primitive_type(table, "int");
    let (_, string) = primitive_type(table, "string");
    let (_, float) = primitive_type(table, "float");
    let (_, bool_) = primitive_type(table, "bool");

    let mut module = BuiltinModule::new(table, "int");
    module.define_type(table, int_type)?;
    for instance in [&string, &float, &bool_] {
        if let Some(id) = instance.builder() {
            module.use_type(table, id)?;
        }
    }

    module.function(table, "__pos__", &[int.clone()], int.clone());
    module.function(table, "__neg__", &[int.clone()], int.clone());
    for arithmetic in ["__add__", "__sub__", "__mul__", "__div__", "__mod__", "__pow__"] {
        module.function(table, arithmetic, &[int.clone(), int.clone()], int.clone());
    }
    for comparison in ["__eq__", "__ne__", "__lt__", "__le__", "__gt__", "__ge__"] {
        module.function(table, comparison, &[int.clone(), int.clone()], bool_.clone());
    }
    module.function(table, "__cast__", &[int.clone()], string.clone());
    module.function(table, "string", &[int.clone()], string);
    module.function(table, "float", &[int], float);

    Ok(module.finish())
}

/// The float module: arithmetic, comparison, and casts.
pub fn float_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (float_type, float) = primitive_type(table, "float");
    let (_, string) = primitive_type(table, "string");
    let (_, int) = primitive_type(table, "int");
    let (_, bool_) = primitive_type(table, "bool");

    let mut module = BuiltinModule::new(table, "float");
    module.define_type(table, float_type)?;
    for instance in [&string, &int, &bool_] {
        if let Some(id) = instance.builder() {
            module.use_type(table, id)?;
        }
    }

    module.function(table, "__pos__", &[float.clone()], float.clone());
    module.function(table, "__neg__", &[float.clone()], float.clone());
    for arithmetic in ["__add__", "__sub__", "__mul__", "__div__"] {
        module.function(table, arithmetic, &[float.clone(), float.clone()], float.clone());
    }
    for comparison in ["__eq__", "__ne__", "__lt__", "__le__", "__gt__", "__ge__"] {
        module.function(table, comparison, &[float.clone(), float.clone()], bool_.clone());
    }
    module.function(table, "__cast__", &[float.clone()], string.clone());
    module.function(table, "string", &[float.clone()], string);
    module.function(table, "int", &[float], int);

    Ok(module.finish())
}
