//! The function header checker.
//!
//! Signatures are resolved before a function is inserted into a scope so
//! that overload collision checks compare resolved type instances, not raw
//! parser output.

use tracing::debug;

use crate::ast::Function;
use crate::semantic::error::{SemanticError, SemanticResult};
use crate::semantic::symbol_table::{ScopeId, SymbolTable};

use super::instance::check_instance;

/// Resolve every type instance in a function's signature, with the
/// function's own type parameters as the permissible stand-ins.
pub fn prepare_header(
    function: &mut Function,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<()> {
    let standins = function.type_params().to_vec();
    let function_token = function.token().clone();
    let function_name = function.name().to_owned();
    debug!(name = %function_name, ns = ns_name, "checking function header");

    for param in function.params_mut() {
        if let Some(instance) = param.type_instance_mut() {
            check_instance(instance, table, scope, ns_name, &standins).map_err(|err| {
                SemanticError::invalid_function(
                    function_token.clone(),
                    format!(
                        "The signature of function <{}> failed checking: {}",
                        function_name,
                        err.message()
                    ),
                )
            })?;
        }
    }

    if let Some(return_type) = function.return_type_mut() {
        check_instance(return_type, table, scope, ns_name, &standins).map_err(|err| {
            SemanticError::invalid_function(
                function_token,
                format!(
                    "The return type of function <{}> failed checking: {}",
                    function_name,
                    err.message()
                ),
            )
        })?;
    }

    Ok(())
}
