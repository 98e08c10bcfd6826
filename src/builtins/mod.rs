//! The built-in module registry.
//!
//! Every user module implicitly imports these. Each built-in is a complete
//! program: an fqn of the form `__bifqn_<name>__`, one global namespace,
//! the primitive type (if the module exports one), and the operator
//! function stubs the evaluator dispatches by `old_name`.
//!
//! Construction pre-populates each module's scope with every type its
//! signatures mention, so function headers resolve no matter when in the
//! import order the module is consumed.

mod bits;
mod io;
mod math;
mod maybe;
mod primitives;
mod qubits;
mod support;

pub use bits::{bit2_program, bit4_program, bit8_program, bit_program};
pub use io::io_program;
pub use math::trig_program;
pub use maybe::maybe_program;
pub use primitives::{bool_program, float_program, int_program, string_program, void_program};
pub use qubits::{gate_program, qubit2_program, qubit4_program, qubit8_program, qubit_program};

use crate::ast::Program;
use crate::base::Fqn;
use crate::semantic::error::SemanticResult;
use crate::semantic::SymbolTable;

pub use support::{primitive_type, ref_instance};

/// The order built-in programs are seeded into the import queue. Some
/// built-ins lean on earlier ones (`maybe` uses `void`-shaped
/// placeholders), so this order is part of the contract.
pub const BUILTIN_SEED_ORDER: [&str; 17] = [
    "string", "maybe", "void", "bool", "float", "gate", "trig", "bit", "bit2", "bit4", "bit8",
    "qubit", "qubit2", "qubit4", "qubit8", "int", "io",
];

/// The fqn of a built-in module.
pub fn builtin_fqn(name: &str) -> Fqn {
    let wrapped = format!("__bifqn_{name}__");
    Fqn::new(wrapped.clone(), wrapped)
}

/// Construct every built-in program, in seed order.
pub fn builtin_programs(table: &mut SymbolTable) -> SemanticResult<Vec<Program>> {
    BUILTIN_SEED_ORDER
        .iter()
        .map(|name| builtin_program(table, name))
        .collect()
}

fn builtin_program(table: &mut SymbolTable, name: &str) -> SemanticResult<Program> {
    match name {
        "string" => string_program(table),
        "maybe" => maybe_program(table),
        "void" => void_program(table),
        "bool" => bool_program(table),
        "float" => float_program(table),
        "gate" => gate_program(table),
        "trig" => trig_program(table),
        "bit" => bit_program(table),
        "bit2" => bit2_program(table),
        "bit4" => bit4_program(table),
        "bit8" => bit8_program(table),
        "qubit" => qubit_program(table),
        "qubit2" => qubit2_program(table),
        "qubit4" => qubit4_program(table),
        "qubit8" => qubit8_program(table),
        "int" => int_program(table),
        "io" => io_program(table),
        other => Err(crate::semantic::SemanticError::symbol_not_found(format!(
            "There is no built-in module named <{other}>."
        ))),
    }
}
