//! Call-site overload selection.
//!
//! A call is matched against every visible overload of the callee's name
//! and arity. Candidates whose parameters do not all weakly match the
//! arguments are discarded; among the rest, the heaviest one - the one
//! binding the most concrete information - wins. An exact tie between two
//! surviving candidates is ambiguous.

use tracing::trace;

use crate::ast::{weight, Function, TypeInstance};
use crate::semantic::error::{SemanticError, SemanticResult};
use crate::semantic::symbol_table::{ScopeId, SymbolTable};

/// Pick the overload of `name` that best matches the argument instances.
pub fn resolve_call(
    table: &SymbolTable,
    scope: ScopeId,
    ns_name: &str,
    name: &str,
    args: &[TypeInstance],
) -> SemanticResult<Function> {
    let candidates = table.get_functions(scope, ns_name, name, args.len());
    if candidates.is_empty() {
        return Err(SemanticError::symbol_not_found(format!(
            "No function by the name <{}> with arity <{}> could be found.",
            name,
            args.len()
        )));
    }

    let mut best: Option<(usize, Function)> = None;
    let mut ambiguous = false;
    for candidate in candidates {
        let Some(total) = candidate_weight(&candidate, args, table) else {
            continue;
        };
        trace!(name, weight = total, "overload candidate");
        match &best {
            Some((best_weight, _)) if total == *best_weight => ambiguous = true,
            Some((best_weight, _)) if total < *best_weight => {}
            _ => {
                best = Some((total, candidate));
                ambiguous = false;
            }
        }
    }

    match best {
        Some((_, function)) if !ambiguous => Ok(function),
        Some(_) => Err(SemanticError::symbol_can_collide(format!(
            "The call to <{name}> is ambiguous: multiple overloads match the arguments equally well."
        ))),
        None => Err(SemanticError::symbol_not_found(format!(
            "No overload of <{name}> matches the given arguments."
        ))),
    }
}

/// The total weight of a candidate against the arguments, or `None` when
/// any parameter fails even the weak comparison.
fn candidate_weight(function: &Function, args: &[TypeInstance], table: &SymbolTable) -> Option<usize> {
    let mut total = 0;
    for (param, arg) in function.params().iter().zip(args) {
        let instance = param.type_instance()?;
        let arg_weight = weight(instance, arg, table.types());
        if arg_weight == 0 {
            return None;
        }
        total += arg_weight;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TypeDecl, TypeId, ValidationState, Variable};
    use crate::base::{Token, TokenKind};

    fn tok(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, 1, 1, "test.ql")
    }

    fn concrete_instance(table: &mut SymbolTable, name: &str) -> TypeInstance {
        let id = table
            .types_mut()
            .alloc(TypeDecl::new(tok(name), ValidationState::Valid));
        TypeInstance::with_builder(tok(name), id, "*")
    }

    fn function_with_params(name: &str, params: &[TypeInstance]) -> Function {
        let mut function = Function::new(tok(name));
        for (index, instance) in params.iter().enumerate() {
            let mut param = Variable::new(tok(&format!("p{index}")), false);
            param.set_type_instance(instance.clone());
            function.add_param(param);
        }
        function
    }

    fn setup() -> (SymbolTable, ScopeId, TypeInstance, TypeInstance) {
        let mut table = SymbolTable::new();
        let root = table.new_scope(None);
        table.add_namespace(root, "*");
        let int = concrete_instance(&mut table, "int");
        let bool_ = concrete_instance(&mut table, "bool");
        (table, root, int, bool_)
    }

    #[test]
    fn test_concrete_overload_beats_parametric() {
        let (mut table, root, int, _) = setup();
        let standin = TypeInstance::new(tok("a"), "*");

        table
            .add_function(root, "*", function_with_params("f", &[standin.clone(), standin]))
            .unwrap();
        table
            .add_function(root, "*", function_with_params("f", &[int.clone(), int.clone()]))
            .unwrap();

        let chosen = resolve_call(&table, root, "*", "f", &[int.clone(), int]).unwrap();
        assert!(chosen.params()[0].type_instance().unwrap().builder().is_some());
    }

    #[test]
    fn test_parametric_overload_catches_other_types() {
        let (mut table, root, int, bool_) = setup();
        let standin = TypeInstance::new(tok("a"), "*");

        table
            .add_function(root, "*", function_with_params("f", &[standin.clone(), standin]))
            .unwrap();
        table
            .add_function(root, "*", function_with_params("f", &[int.clone(), int]))
            .unwrap();

        let chosen = resolve_call(&table, root, "*", "f", &[bool_.clone(), bool_]).unwrap();
        assert!(chosen.params()[0].type_instance().unwrap().is_abstract());
    }

    #[test]
    fn test_no_matching_overload() {
        let (mut table, root, int, bool_) = setup();
        table
            .add_function(root, "*", function_with_params("f", &[int]))
            .unwrap();

        assert!(matches!(
            resolve_call(&table, root, "*", "f", &[bool_]),
            Err(SemanticError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn test_equal_weights_are_ambiguous() {
        let (mut table, root, int, bool_) = setup();
        // f(int, b) and f(a, bool): a call f(int, bool) weighs both at 3.
        let standin_a = TypeInstance::new(tok("a"), "*");
        let standin_b = TypeInstance::new(tok("b"), "*");
        table
            .add_function(root, "*", function_with_params("f", &[int.clone(), standin_b]))
            .unwrap();
        table
            .add_function(root, "*", function_with_params("f", &[standin_a, bool_.clone()]))
            .unwrap();

        assert!(matches!(
            resolve_call(&table, root, "*", "f", &[int, bool_]),
            Err(SemanticError::SymbolCanCollide { .. })
        ));
    }

    #[test]
    fn test_unknown_name_reports_not_found() {
        let (table, root, int, _) = setup();
        let err = resolve_call(&table, root, "*", "ghost", &[int]).unwrap_err();
        assert!(err.message().contains("<ghost>"));
    }

    #[test]
    fn test_type_ids_do_not_leak_across_arenas() {
        // Structural equality: the same type name allocated twice still
        // weighs as an exact match.
        let (mut table, root, int, _) = setup();
        table
            .add_function(root, "*", function_with_params("f", &[int]))
            .unwrap();

        let other_int = {
            let id: TypeId = table
                .types_mut()
                .alloc(TypeDecl::new(tok("int"), ValidationState::Valid));
            TypeInstance::with_builder(tok("int"), id, "*")
        };
        let chosen = resolve_call(&table, root, "*", "f", &[other_int]).unwrap();
        assert_eq!(chosen.name(), "f");
    }
}
