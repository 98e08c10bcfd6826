//! Checkers: type instances, type declarations and their constructors, and
//! function headers.
//!
//! Checking is fail-fast per declaration: the first unrecoverable error
//! aborts that declaration's validation and unwinds to the driver. The one
//! recoverable site is the wildcard-namespace retry in
//! [`check_instance`](instance::check_instance).

mod decl;
mod header;
mod instance;
mod overload;

pub use decl::check_type;
pub use header::prepare_header;
pub use instance::{check_instance, check_instance_bare};
pub use overload::resolve_call;

use crate::ast::{Decl, ValidationState};
use crate::semantic::error::SemanticResult;
use crate::semantic::resolver::GlobalTable;
use crate::semantic::symbol_table::SymbolTable;

/// Validate every type declaration of every user program.
///
/// Instance checks validate types lazily on first contact; this pass picks
/// up the declarations nothing referenced, so that after it every type in
/// the global table is either `Valid` or has been reported `Invalid`.
pub fn check_program_types(gtable: &GlobalTable, table: &mut SymbolTable) -> SemanticResult<()> {
    for program in gtable.programs() {
        if program.is_builtin() {
            continue;
        }
        let scope = program.scope();
        for decl in program.declarations() {
            let Decl::Namespace(namespace) = decl else {
                continue;
            };
            for inner in namespace.declarations() {
                if let Decl::Type(type_decl) = inner {
                    if table.types()[*type_decl].state() == ValidationState::Unknown {
                        check_type(*type_decl, table, scope, namespace.name())?;
                    }
                }
            }
        }
    }
    Ok(())
}
