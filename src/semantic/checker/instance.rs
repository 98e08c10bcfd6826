//! The type-instance checker.
//!
//! For every type instance appearing anywhere, find the unique builder type
//! in scope or establish that the instance is a stand-in, recursing into
//! nested parameters. Complete instances trigger the specialization engine
//! on the way out.

use tracing::trace;

use crate::ast::{InstanceCategory, TypeInstance, ValidationState};
use crate::base::Token;
use crate::mangle;
use crate::semantic::error::{SemanticError, SemanticResult};
use crate::semantic::specialize;
use crate::semantic::symbol_table::{ScopeId, SymbolTable};

use super::decl::check_type;

/// Outcome of checking one instance: `(is_standin, is_parametrized)`.
type CheckOutcome = (bool, bool);

/// Check a type instance under its namespace search rules.
///
/// A `*` namespace means the builder lives either in the namespace of the
/// holder declaration (`ns_name`) or in the global namespace; the holder
/// namespace is tried first and the failure reported on a double miss is
/// the second one. An explicit namespace is searched alone, and a stand-in
/// found through one is an error: stand-ins cannot be namespaced.
pub fn check_instance(
    instance: &mut TypeInstance,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
    standins: &[Token],
) -> SemanticResult<CheckOutcome> {
    let instance_ns = instance.namespace().to_owned();

    if instance_ns == "*" {
        match check_in_namespace(instance, table, scope, ns_name, standins) {
            Ok(outcome) => Ok(outcome),
            Err(first) => {
                trace!(
                    instance = %mangle::mangle_type_instance(instance),
                    holder_ns = ns_name,
                    error = %first,
                    "holder namespace failed, retrying global"
                );
                check_in_namespace(instance, table, scope, &instance_ns, standins)
            }
        }
    } else {
        match check_in_namespace(instance, table, scope, &instance_ns, standins) {
            Ok((true, _)) => Err(SemanticError::invalid_type(
                instance.token().clone(),
                "An abstract type instance cannot be constrained to a namespace.",
            )),
            Ok(outcome) => Ok(outcome),
            Err(_) => Err(SemanticError::invalid_type(
                instance.token().clone(),
                format!(
                    "The type instance <{}> has no type that builds it in the namespace <{}>.",
                    mangle::mangle_type_instance(instance),
                    ns_name
                ),
            )),
        }
    }
}

/// [`check_instance`] with no permissible stand-ins.
pub fn check_instance_bare(
    instance: &mut TypeInstance,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<CheckOutcome> {
    check_instance(instance, table, scope, ns_name, &[])
}

/// Check a type instance against one namespace.
fn check_in_namespace(
    instance: &mut TypeInstance,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
    standins: &[Token],
) -> SemanticResult<CheckOutcome> {
    instance.set_parametrized(false);

    // The star instance matches any type; there is nothing to look up.
    if instance.is_star() {
        return Ok((true, true));
    }

    // A reference is checked through its payload.
    if instance.is_reference() {
        if instance.params().is_empty() {
            return Err(SemanticError::invalid_type(
                instance.token().clone(),
                "A reference type instance must wrap exactly one type instance.",
            ));
        }
        return check_instance(&mut instance.params_mut()[0], table, scope, ns_name, standins);
    }

    match instance.category() {
        InstanceCategory::User => check_user_instance(instance, table, scope, ns_name, standins),
        _ => check_builtin_instance(instance, table, scope, ns_name, standins),
    }
}

/// Check a user-category instance: resolve its builder type or classify it
/// as a stand-in.
fn check_user_instance(
    instance: &mut TypeInstance,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
    standins: &[Token],
) -> SemanticResult<CheckOutcome> {
    let mut outcome = (false, false);

    let lookup = table.get_type(scope, ns_name, instance.name(), instance.params().len());
    let builder = match lookup {
        Ok(builder) => builder,
        Err(_) => {
            // Not in scope under this namespace. A bare name may still be a
            // stand-in; anything with parameters cannot be.
            if instance.params().is_empty() && standins.contains(instance.token()) {
                return Ok((true, false));
            }
            return Err(SemanticError::invalid_type(
                instance.token().clone(),
                format!(
                    "The type instance <{}> has no type that builds it in the namespace <{}>.",
                    mangle::mangle_type_instance(instance),
                    ns_name
                ),
            ));
        }
    };

    match table.types()[builder].state() {
        // An unvalidated builder is checked on first contact.
        ValidationState::Unknown => check_type(builder, table, scope, ns_name)?,
        ValidationState::Invalid => {
            let decl = &table.types()[builder];
            return Err(SemanticError::invalid_type(
                decl.token().clone(),
                format!(
                    "Type <{}> is not valid. Please make sure all the type instances its constructors depend on are valid.",
                    mangle::mangle_type(decl)
                ),
            ));
        }
        // Validating means we got here through the type currently being
        // checked; attach it without re-entering.
        ValidationState::Validating | ValidationState::Valid => {}
    }

    // Walk the instance parameters alongside the type's formal parameters,
    // recording on each the formal it instantiates.
    let formals: Vec<Token> = table.types()[builder].params().to_vec();
    let mut parametrized = false;
    for (param, formal) in instance.params_mut().iter_mut().zip(formals) {
        let (param_standin, param_parametrized) =
            check_instance(param, table, scope, ns_name, standins)?;
        if param_standin || param_parametrized {
            parametrized = true;
        }
        param.set_old_token(formal);
    }
    if parametrized {
        instance.set_parametrized(true);
        outcome.1 = true;
    }

    instance.set_builder(builder);

    if instance.is_complete() {
        specialize_instance(instance, table, builder)?;
    }

    Ok(outcome)
}

/// Check a tuple, list, or map instance: enforce the arity the shape
/// demands, recurse into parameters, and synthesize a valid builder so
/// downstream code treats every instance uniformly.
fn check_builtin_instance(
    instance: &mut TypeInstance,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
    standins: &[Token],
) -> SemanticResult<CheckOutcome> {
    let mut outcome = (false, false);

    if instance.category() == InstanceCategory::List && instance.params().len() != 1 {
        return Err(SemanticError::invalid_type(
            instance.token().clone(),
            format!(
                "The type instance <{}> is a list but has more or less than 1 parameter.",
                mangle::mangle_type_instance(instance)
            ),
        ));
    }
    if instance.category() == InstanceCategory::Map && instance.params().len() != 2 {
        return Err(SemanticError::invalid_type(
            instance.token().clone(),
            format!(
                "The type instance <{}> is a map but has more or less than 2 parameters.",
                mangle::mangle_type_instance(instance)
            ),
        ));
    }

    let mut parametrized = false;
    for param in instance.params_mut() {
        let (param_standin, param_parametrized) =
            check_instance(param, table, scope, ns_name, standins)?;
        if param_standin || param_parametrized {
            parametrized = true;
        }
    }
    if parametrized {
        instance.set_parametrized(true);
        outcome.1 = true;
    }

    let builder = table.types_mut().alloc(crate::ast::TypeDecl::new(
        instance.token().clone(),
        ValidationState::Valid,
    ));
    instance.set_builder(builder);

    Ok(outcome)
}

/// Generate (or reuse) the specialization for a complete instance and mark
/// its builder used.
fn specialize_instance(
    instance: &TypeInstance,
    table: &mut SymbolTable,
    builder: crate::ast::TypeId,
) -> SemanticResult<()> {
    let mangled = instance.mangled_name()?;
    if table.types()[builder].specializations().contains_key(&mangled) {
        trace!(specialization = %mangled, "specialization cache hit");
    } else {
        let generated = specialize::generate(instance, table.types_mut())?;
        table.types_mut()[builder].add_specialization(mangled, generated);
    }
    table.types_mut()[builder].set_used(true);
    Ok(())
}
