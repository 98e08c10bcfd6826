//! The classical bit modules: bit and its sized variants.

use crate::ast::Program;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{primitive_type, ref_instance, BuiltinModule};

pub fn bit_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_bit_program(table, "bit")
}

pub fn bit2_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_bit_program(table, "bit2")
}

pub fn bit4_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_bit_program(table, "bit4")
}

pub fn bit8_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_bit_program(table, "bit8")
}

/// Every bit width carries the same operator set: bitwise logic, equality,
/// string casts, and subscript access by reference. Subscripting any width
/// yields a single-bit reference.
fn sized_bit_program(table: &mut SymbolTable, name: &str) -> SemanticResult<Program> {
    let (bits_type, bits) = primitive_type(table, name);
    let (_, string) = primitive_type(table, "string");
    let (_, bool_) = primitive_type(table, "bool");
    let (_, int) = primitive_type(table, "int");
    let (bit_type, bit) = if name == "bit" {
        (bits_type, bits.clone())
    } else {
        primitive_type(table, "bit")
    };

    let mut module = BuiltinModule::new(table, name);
    module.define_type(table, bits_type)?;
    for instance in [&string, &bool_, &int] {
        if let Some(id) = instance.builder() {
            module.use_type(table, id)?;
        }
    }
    if bit_type != bits_type {
        module.use_type(table, bit_type)?;
    }

    for bitwise in ["__band__", "__bor__", "__xor__"] {
        module.function(table, bitwise, &[bits.clone(), bits.clone()], bits.clone());
    }
    module.function(table, "__bnot__", &[bits.clone()], bits.clone());
    module.function(table, "__cast__", &[bits.clone()], string.clone());
    module.function(table, "string", &[bits.clone()], string);
    module.function(table, "__eq__", &[bits.clone(), bits.clone()], bool_.clone());
    module.function(table, "__ne__", &[bits.clone(), bits.clone()], bool_);

    let ref_bits = ref_instance(table, bits);
    let ref_bit = ref_instance(table, bit);
    module.function(table, "__refitem__", &[ref_bits, int], ref_bit);

    Ok(module.finish())
}
