//! The type specialization engine.
//!
//! From a complete type instance, materialize a concrete type declaration:
//! the original type with every formal parameter substituted by the
//! corresponding concrete parameter, named by the instance's mangled form.

use tracing::debug;

use crate::ast::{
    DefaultConstructor, RecordConstructor, TypeArena, TypeDecl, TypeId, TypeInstance,
    ValidationState,
};
use crate::mangle;
use crate::semantic::error::{SemanticError, SemanticResult};

/// Generate the concrete type a complete instance describes.
///
/// Reference instances do not materialize as distinct types; generation
/// recurses into the payload. The caller registers the returned type in the
/// owner's specialization map.
pub fn generate(instance: &TypeInstance, types: &mut TypeArena) -> SemanticResult<TypeId> {
    if instance.is_reference() {
        return match instance.params().first() {
            Some(payload) => generate(payload, types),
            None => Err(SemanticError::invalid_type(
                instance.token().clone(),
                "A reference type instance must wrap exactly one type instance.",
            )),
        };
    }

    if !instance.is_complete() {
        return Err(SemanticError::invalid_type(
            instance.token().clone(),
            format!(
                "The type instance <{}> must be complete before generating a type declaration from it.",
                mangle::mangle_type_instance(instance)
            ),
        ));
    }

    let new_name = instance.mangled_name()?;
    let owner = instance.builder().ok_or_else(|| {
        SemanticError::invalid_type(
            instance.token().clone(),
            "A complete type instance must carry the type that builds it.",
        )
    })?;
    debug!(specialization = %new_name, "generating specialization");

    let mut new_type = TypeDecl::new(instance.token().clone(), ValidationState::Valid);
    new_type.set_name(new_name);
    new_type.set_fqn(types[owner].fqn().clone());
    new_type.set_namespace(types[owner].namespace());
    new_type.set_builder_instance(instance.clone());
    let new_id = types.alloc(new_type);

    let def_constructors: Vec<DefaultConstructor> =
        types[owner].default_constructors().cloned().collect();
    for old_cons in def_constructors {
        let new_cons = substitute_default(&old_cons, instance, new_id, types);
        types[new_id].add_default_constructor(new_cons)?;
    }

    let rec_constructors: Vec<RecordConstructor> =
        types[owner].record_constructors().cloned().collect();
    for old_cons in rec_constructors {
        let new_cons = substitute_record(&old_cons, instance, new_id, types);
        types[new_id].add_record_constructor(new_cons)?;
    }

    Ok(new_id)
}

/// Substitute one constructor parameter.
///
/// An abstract parameter is replaced outright by the instance parameter
/// that instantiated its formal (matched through the recorded old token).
/// A parametrized parameter - a recursive occurrence like `tree(a)` inside
/// `tree(a)`'s own constructors - keeps its shape but has its nested
/// parameters substituted, so the rebuilt constructor mentions the concrete
/// form (`tree(bool)`) and resolves to the same specialization.
fn substitute_instance(cons_param: &TypeInstance, instance: &TypeInstance) -> TypeInstance {
    if cons_param.is_abstract() {
        for ins_param in instance.params() {
            if ins_param.old_token() == cons_param.token() {
                return ins_param.clone();
            }
        }
        return cons_param.clone();
    }

    if cons_param.is_parametrized() {
        let substituted: Vec<TypeInstance> = cons_param
            .params()
            .iter()
            .map(|nested| substitute_instance(nested, instance))
            .collect();
        let still_open = substituted
            .iter()
            .any(|nested| nested.is_abstract() || nested.is_parametrized());
        let mut rebuilt = cons_param.clone();
        rebuilt.set_params(substituted);
        rebuilt.set_parametrized(still_open);
        return rebuilt;
    }

    cons_param.clone()
}

/// Rebuild a default constructor for the specialized type.
fn substitute_default(
    old_cons: &DefaultConstructor,
    instance: &TypeInstance,
    new_type: TypeId,
    types: &TypeArena,
) -> DefaultConstructor {
    let mut new_cons = DefaultConstructor::new(old_cons.token().clone(), new_type);

    for cons_param in old_cons.params() {
        new_cons.add_param(substitute_instance(cons_param, instance));
    }

    let mangled = new_cons.mangled_name(types);
    new_cons.set_name(mangled);
    new_cons
}

/// Rebuild a record constructor, preserving field labels.
fn substitute_record(
    old_cons: &RecordConstructor,
    instance: &TypeInstance,
    new_type: TypeId,
    types: &TypeArena,
) -> RecordConstructor {
    let mut new_cons = RecordConstructor::new(old_cons.token().clone(), new_type);

    for (label, cons_param) in old_cons.params() {
        new_cons.add_param(label.clone(), substitute_instance(cons_param, instance));
    }

    let mangled = new_cons.mangled_name(types);
    new_cons.set_name(mangled);
    new_cons
}
