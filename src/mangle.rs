//! Deterministic name mangling.
//!
//! Mangled names are the stable string identity of types, type instances,
//! and constructors: they key the specialization cache and the constructor
//! tables, and downstream consumers look declarations up by them. Mangling
//! is purely structural - same input, same output - and never inspects
//! validation state.

use crate::ast::{
    DefaultConstructor, InstanceCategory, RecordConstructor, TypeArena, TypeDecl, TypeInstance,
};

/// The mangled form of a type declaration: `Name(param1,param2,…)`.
///
/// Tuple, list, and map types are declared under the names `(`, `[` and `{`;
/// their mangles use the matching delimiters with the name omitted.
pub fn mangle_type(decl: &TypeDecl) -> String {
    let name = decl.name();
    let mut mangled = String::new();

    let closer = match name {
        "(" => {
            mangled.push('(');
            ')'
        }
        "[" => {
            mangled.push('[');
            ']'
        }
        "{" => {
            mangled.push('{');
            '}'
        }
        _ => {
            mangled.push_str(name);
            mangled.push('(');
            ')'
        }
    };

    for (i, param) in decl.params().iter().enumerate() {
        if i > 0 {
            mangled.push(',');
        }
        mangled.push_str(param.lexeme());
    }
    mangled.push(closer);

    mangled
}

/// The mangled form of a type instance.
///
/// - reference: `ref'<payload>`
/// - abstract: `Name*` (the star instance mangles to a bare `*`)
/// - user: `Name` or `Name(p1,p2,…)`
/// - tuple: `(p1,p2,…)`, list: `[p]`, map: `{k:v}`
pub fn mangle_type_instance(instance: &TypeInstance) -> String {
    let params = instance.params();
    let mut mangled = String::new();

    // Reference type instances never carry their own shape; they wrap their
    // single payload.
    if instance.is_reference() {
        mangled.push_str("ref'");
        if let Some(payload) = params.first() {
            mangled.push_str(&mangle_type_instance(payload));
        }
        return mangled;
    }

    if instance.is_abstract() {
        if instance.is_star() {
            mangled.push('*');
        } else {
            mangled.push_str(instance.name());
            mangled.push('*');
        }
        return mangled;
    }

    match instance.category() {
        InstanceCategory::User => {
            mangled.push_str(instance.name());
            if !params.is_empty() {
                mangled.push('(');
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        mangled.push(',');
                    }
                    mangled.push_str(&mangle_type_instance(param));
                }
                mangled.push(')');
            }
        }
        InstanceCategory::Tuple => {
            mangled.push('(');
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    mangled.push(',');
                }
                mangled.push_str(&mangle_type_instance(param));
            }
            mangled.push(')');
        }
        InstanceCategory::List => {
            mangled.push('[');
            if let Some(element) = params.first() {
                mangled.push_str(&mangle_type_instance(element));
            }
            mangled.push(']');
        }
        InstanceCategory::Map => {
            mangled.push('{');
            if let Some(key) = params.first() {
                mangled.push_str(&mangle_type_instance(key));
            }
            mangled.push(':');
            if let Some(value) = params.get(1) {
                mangled.push_str(&mangle_type_instance(value));
            }
            mangled.push('}');
        }
    }

    mangled
}

/// The raw constructor mangle: `Name(p1, p2)` for non-nullary constructors,
/// the bare `Name` otherwise.
pub fn mangle_constructor(name: &str, params: &[TypeInstance]) -> String {
    let mut mangled = String::from(name);

    if !params.is_empty() {
        mangled.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                mangled.push_str(", ");
            }
            mangled.push_str(&mangle_type_instance(param));
        }
        mangled.push(')');
    }

    mangled
}

/// A constructor mangle suffixed with the builder instance of the type it
/// belongs to: `Name(p1):Box(int)`.
pub fn mangle_constructor_with_instance(
    name: &str,
    params: &[TypeInstance],
    builder_instance: &TypeInstance,
) -> String {
    let mut mangled = mangle_constructor(name, params);
    mangled.push(':');
    mangled.push_str(&mangle_type_instance(builder_instance));
    mangled
}

/// Mangle a default constructor; the builder-instance suffix appears when
/// the owning type is a specialization.
pub fn mangle_default_constructor(cons: &DefaultConstructor, types: &TypeArena) -> String {
    match types[cons.owner()].builder_instance() {
        Some(instance) => mangle_constructor_with_instance(cons.name(), cons.params(), instance),
        None => mangle_constructor(cons.name(), cons.params()),
    }
}

/// Mangle a record constructor, viewing its labeled fields positionally.
pub fn mangle_record_constructor(cons: &RecordConstructor, types: &TypeArena) -> String {
    let params = cons.params_as_vec();
    match types[cons.owner()].builder_instance() {
        Some(instance) => mangle_constructor_with_instance(cons.name(), &params, instance),
        None => mangle_constructor(cons.name(), &params),
    }
}
