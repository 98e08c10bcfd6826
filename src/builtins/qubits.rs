//! The quantum modules: gate, qubit, and the sized qubit variants.
//!
//! Quantum values can never be copied, so every quantum operator works
//! through a reference: `apply` evolves a register in place and `measure`
//! collapses it into classical bits.

use crate::ast::Program;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

use super::support::{primitive_type, ref_instance, BuiltinModule};

/// The gate module: the opaque `gate` type.
pub fn gate_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    let (gate_type, _) = primitive_type(table, "gate");

    let mut module = BuiltinModule::new(table, "gate");
    module.define_type(table, gate_type)?;

    Ok(module.finish())
}

pub fn qubit_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_qubit_program(table, "qubit", "bit")
}

pub fn qubit2_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_qubit_program(table, "qubit2", "bit2")
}

pub fn qubit4_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_qubit_program(table, "qubit4", "bit4")
}

pub fn qubit8_program(table: &mut SymbolTable) -> SemanticResult<Program> {
    sized_qubit_program(table, "qubit8", "bit8")
}

/// A qubit register of some width: gate application, measurement into the
/// matching classical width, and subscript access to single qubits.
fn sized_qubit_program(
    table: &mut SymbolTable,
    name: &str,
    measured_name: &str,
) -> SemanticResult<Program> {
    let (qubits_type, qubits) = primitive_type(table, name);
    let (gate_type, gate) = primitive_type(table, "gate");
    let (void_type, void) = primitive_type(table, "void");
    let (measured_type, measured) = primitive_type(table, measured_name);
    let (int_type, int) = primitive_type(table, "int");
    let (qubit_type, qubit) = if name == "qubit" {
        (qubits_type, qubits.clone())
    } else {
        primitive_type(table, "qubit")
    };

    let mut module = BuiltinModule::new(table, name);
    module.define_type(table, qubits_type)?;
    for foreign in [gate_type, void_type, measured_type, int_type] {
        module.use_type(table, foreign)?;
    }
    if qubit_type != qubits_type {
        module.use_type(table, qubit_type)?;
    }

    let ref_qubits = ref_instance(table, qubits);
    module.function(table, "apply", &[gate, ref_qubits.clone()], void);
    module.function(table, "measure", &[ref_qubits.clone()], measured);

    let ref_qubit = ref_instance(table, qubit);
    module.function(table, "__refitem__", &[ref_qubits, int], ref_qubit);

    Ok(module.finish())
}
