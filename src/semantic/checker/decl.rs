//! The type and constructor checkers.

use tracing::debug;

use crate::ast::{DefaultConstructor, RecordConstructor, TypeId, ValidationState};
use crate::semantic::error::{SemanticError, SemanticResult};
use crate::semantic::symbol_table::{ScopeId, SymbolTable};

use super::instance::check_instance;

/// Validate a type declaration: its parameters and every constructor.
///
/// The declaration is `Validating` for the duration so that recursive
/// constructors (`Node(Tree(a), Tree(a))` inside `Tree(a)`) terminate; a
/// failure leaves it `Invalid` so later references report a secondary
/// error instead of re-running the check.
pub fn check_type(
    type_decl: TypeId,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<()> {
    table.types_mut()[type_decl].set_state(ValidationState::Validating);
    debug!(name = table.types()[type_decl].name(), ns = ns_name, "checking type");

    match check_type_inner(type_decl, table, scope, ns_name) {
        Ok(()) => {
            table.types_mut()[type_decl].set_state(ValidationState::Valid);
            Ok(())
        }
        Err(err) => {
            table.types_mut()[type_decl].set_state(ValidationState::Invalid);
            Err(err)
        }
    }
}

fn check_type_inner(
    type_decl: TypeId,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<()> {
    // No parameter may appear twice, and none may shadow a concrete type
    // visible anywhere in the scope, whatever the namespace.
    let params = table.types()[type_decl].params().to_vec();
    for param in &params {
        if params.iter().filter(|other| *other == param).count() > 1 {
            return Err(SemanticError::invalid_type(
                param.clone(),
                format!(
                    "The type parameter <{}> cannot be used more than once inside type parameters.",
                    param.lexeme()
                ),
            ));
        }
        if table.type_exists_any(scope, param.lexeme(), 0) {
            return Err(SemanticError::invalid_type(
                param.clone(),
                format!(
                    "The type parameter <{}> has the same name as a concrete type available in the current scope.",
                    param.lexeme()
                ),
            ));
        }
    }

    // Constructors are checked on copies and the mutated copies written
    // back, so their parameter instances end up carrying resolved builders.
    let def_constructors: Vec<DefaultConstructor> = table.types()[type_decl]
        .default_constructors()
        .cloned()
        .collect();
    for mut cons in def_constructors {
        check_default_constructor(&mut cons, type_decl, table, scope, ns_name)
            .map_err(|err| SemanticError::invalid_type(cons.token().clone(), err.message().to_owned()))?;
        table.types_mut()[type_decl].replace_default_constructor(cons)?;
    }

    let rec_constructors: Vec<RecordConstructor> = table.types()[type_decl]
        .record_constructors()
        .cloned()
        .collect();
    for mut cons in rec_constructors {
        check_record_constructor(&mut cons, type_decl, table, scope, ns_name)
            .map_err(|err| SemanticError::invalid_type(cons.token().clone(), err.message().to_owned()))?;
        table.types_mut()[type_decl].replace_record_constructor(cons)?;
    }

    Ok(())
}

/// Validate one default constructor of `type_decl`.
pub(super) fn check_default_constructor(
    cons: &mut DefaultConstructor,
    type_decl: TypeId,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<()> {
    let formals = table.types()[type_decl].params().to_vec();
    let cons_name = cons.name().to_owned();
    let mut parametrized = false;

    for param in cons.params_mut() {
        let param_ns = param.namespace().to_owned();
        let mut builder: Option<TypeId> = None;

        match check_instance(param, table, scope, ns_name, &formals) {
            Ok((is_standin, is_parametrized)) => {
                if !is_standin {
                    builder = param.builder();
                }
                if is_standin || is_parametrized {
                    parametrized = true;
                }
            }
            Err(_) => {
                // The one designed escape: a parameter naming the type this
                // constructor itself builds, mid-validation.
                if param.is_builtby(type_decl, table.types()) {
                    builder = Some(type_decl);
                    param.set_builder(type_decl);
                } else {
                    return Err(SemanticError::invalid_constructor(
                        "This constructor depends on a type instance that does not exist either in the attached namespace or the local namespace or the global namespace.",
                    ));
                }
            }
        }

        check_parameter_builder(builder, param_ns.as_str(), &cons_name, "Default", type_decl, table, ns_name)?;
    }

    cons.set_parametrized(parametrized);
    Ok(())
}

/// Validate one record constructor of `type_decl`.
pub(super) fn check_record_constructor(
    cons: &mut RecordConstructor,
    type_decl: TypeId,
    table: &mut SymbolTable,
    scope: ScopeId,
    ns_name: &str,
) -> SemanticResult<()> {
    let formals = table.types()[type_decl].params().to_vec();
    let cons_name = cons.name().to_owned();
    let mut parametrized = false;

    for (_label, param) in cons.params_mut() {
        let param_ns = param.namespace().to_owned();
        let mut builder: Option<TypeId> = None;

        match check_instance(param, table, scope, ns_name, &formals) {
            Ok((is_standin, is_parametrized)) => {
                if !is_standin {
                    builder = param.builder();
                }
                if is_standin || is_parametrized {
                    parametrized = true;
                }
            }
            Err(_) => {
                if param.is_builtby(type_decl, table.types()) {
                    builder = Some(type_decl);
                    param.set_builder(type_decl);
                } else {
                    return Err(SemanticError::invalid_constructor(
                        "This constructor depends on a type instance that does not exist either in the attached namespace or the local namespace or the global namespace.",
                    ));
                }
            }
        }

        check_parameter_builder(builder, param_ns.as_str(), &cons_name, "Record", type_decl, table, ns_name)?;
    }

    cons.set_parametrized(parametrized);
    Ok(())
}

/// Shared tail of the per-parameter constructor checks: visibility
/// coherence, then validity of the resolved builder.
fn check_parameter_builder(
    builder: Option<TypeId>,
    param_ns: &str,
    cons_name: &str,
    cons_kind: &str,
    type_decl: TypeId,
    table: &SymbolTable,
    ns_name: &str,
) -> SemanticResult<()> {
    let Some(builder) = builder else {
        return Ok(());
    };

    // A public type cannot expose a constructor over a private parameter
    // type; both must be public or both private.
    if !table.types()[builder].is_public() && table.types()[type_decl].is_public() {
        return Err(SemanticError::invalid_constructor(
            "This constructor depends on a type instance that's private while the type it builds is public. Both must be public or both must be private.",
        ));
    }

    // A parameter built by the very type being validated is temporarily
    // fine; anything else must not be invalid.
    let same_type = ns_name == param_ns && table.types().type_eq(builder, type_decl);
    if !same_type && table.types()[builder].state() == ValidationState::Invalid {
        return Err(SemanticError::invalid_constructor(format!(
            "{} constructor <{}> failed type checking because the type <{}> is not valid.",
            cons_kind,
            cons_name,
            table.types()[builder].name()
        )));
    }

    Ok(())
}
