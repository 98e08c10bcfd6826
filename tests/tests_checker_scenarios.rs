//! End-to-end checker scenarios: parametric specialization, recursive
//! constructors, visibility, overload weight, and the boundary behaviors of
//! the instance checker.

mod helpers;

use helpers::{add_default_ctor, function_decl, tok, type_decl, user_instance};
use quill::ast::{weight, InstanceCategory, ValidationState};
use rstest::rstest;
use quill::builtins::primitive_type;
use quill::semantic::{
    check_instance, check_instance_bare, check_type, resolve_call, SemanticError, SymbolTable,
};
use quill::ScopeId;

/// A table with one root scope carrying the `int` and `bool` primitives.
fn fixture() -> (SymbolTable, ScopeId) {
    let mut table = SymbolTable::new();
    let root = table.new_scope(None);
    table.add_namespace(root, "*");

    for name in ["int", "bool"] {
        let (type_id, _) = primitive_type(&mut table, name);
        table.add_type(root, "*", type_id).unwrap();
    }
    (table, root)
}

#[test]
fn test_parametric_box_specialization() {
    let (mut table, root) = fixture();

    // type box(a) = Box(a)
    let box_id = type_decl(&mut table, "box", &["a"]);
    add_default_ctor(&mut table, box_id, "Box", vec![user_instance("a", vec![])]);
    table.add_type(root, "*", box_id).unwrap();

    check_type(box_id, &mut table, root, "*").unwrap();
    assert_eq!(table.types()[box_id].state(), ValidationState::Valid);

    let mut instance = user_instance("box", vec![user_instance("int", vec![])]);
    let (is_standin, is_parametrized) =
        check_instance_bare(&mut instance, &mut table, root, "*").unwrap();
    assert!(!is_standin);
    assert!(!is_parametrized);
    assert_eq!(instance.builder(), Some(box_id));

    // box gained the specialization and is now marked used.
    assert!(table.types()[box_id].is_used());
    assert!(table.types()[box_id].specializations().contains_key("box(int)"));

    let spec = instance.generated_type(table.types()).unwrap();
    let decl = &table.types()[spec];
    assert_eq!(decl.name(), "box(int)");
    assert_eq!(decl.state(), ValidationState::Valid);

    let cons = decl.default_constructor("Box(int):box(int)", 1).unwrap();
    assert_eq!(cons.params().len(), 1);
    assert_eq!(cons.params()[0].name(), "int");
}

#[test]
fn test_mutually_recursive_constructors() {
    let (mut table, root) = fixture();

    // type tree(a) = Leaf(a) | Node(tree(a), tree(a))
    let tree_id = type_decl(&mut table, "tree", &["a"]);
    add_default_ctor(&mut table, tree_id, "Leaf", vec![user_instance("a", vec![])]);
    add_default_ctor(
        &mut table,
        tree_id,
        "Node",
        vec![
            user_instance("tree", vec![user_instance("a", vec![])]),
            user_instance("tree", vec![user_instance("a", vec![])]),
        ],
    );
    table.add_type(root, "*", tree_id).unwrap();

    // Validation terminates despite the self-reference.
    check_type(tree_id, &mut table, root, "*").unwrap();
    assert_eq!(table.types()[tree_id].state(), ValidationState::Valid);

    let mut instance = user_instance("tree", vec![user_instance("bool", vec![])]);
    check_instance_bare(&mut instance, &mut table, root, "*").unwrap();

    let spec = instance.generated_type(table.types()).unwrap();
    let decl = &table.types()[spec];
    assert_eq!(decl.name(), "tree(bool)");
    assert!(decl.default_constructor("Leaf(bool):tree(bool)", 1).is_ok());

    // Both nested tree(bool) parameters are complete and resolve to the
    // same generated specialization.
    let node = decl
        .default_constructor("Node(tree(bool), tree(bool)):tree(bool)", 2)
        .unwrap();
    for param in node.params() {
        assert!(param.is_complete());
        assert_eq!(param.generated_type(table.types()).unwrap(), spec);
    }
}

#[test]
fn test_specialization_cache_is_idempotent() {
    let (mut table, root) = fixture();

    let box_id = type_decl(&mut table, "box", &["a"]);
    add_default_ctor(&mut table, box_id, "Box", vec![user_instance("a", vec![])]);
    table.add_type(root, "*", box_id).unwrap();
    check_type(box_id, &mut table, root, "*").unwrap();

    let mut first = user_instance("box", vec![user_instance("int", vec![])]);
    check_instance_bare(&mut first, &mut table, root, "*").unwrap();
    let generated = first.generated_type(table.types()).unwrap();

    let mut second = user_instance("box", vec![user_instance("int", vec![])]);
    check_instance_bare(&mut second, &mut table, root, "*").unwrap();

    // One entry per mangled name; the second check reused it.
    let specializations = table.types()[box_id].specializations();
    assert_eq!(specializations.len(), 1);
    assert_eq!(second.generated_type(table.types()).unwrap(), generated);
}

#[test]
fn test_visibility_mismatch_in_constructor() {
    let (mut table, root) = fixture();

    let secret = type_decl(&mut table, "secret", &[]);
    table.types_mut()[secret].set_public(false);
    table.add_type(root, "*", secret).unwrap();

    let envelope = type_decl(&mut table, "envelope", &[]);
    add_default_ctor(
        &mut table,
        envelope,
        "Envelope",
        vec![user_instance("secret", vec![])],
    );
    table.add_type(root, "*", envelope).unwrap();

    let err = check_type(envelope, &mut table, root, "*").unwrap_err();
    assert!(err.message().contains("private"));
    assert_eq!(table.types()[envelope].state(), ValidationState::Invalid);
}

#[test]
fn test_overload_discrimination_by_weight() {
    let (mut table, root) = fixture();
    let int_instance = {
        let mut instance = user_instance("int", vec![]);
        check_instance_bare(&mut instance, &mut table, root, "*").unwrap();
        instance
    };
    let standin = user_instance("a", vec![]);

    // f(a, a) and f(int, int) are both admissible overloads.
    let generic = function_decl(
        "f",
        &[standin.clone(), standin.clone()],
        int_instance.clone(),
    );
    let concrete = function_decl(
        "f",
        &[int_instance.clone(), int_instance.clone()],
        int_instance.clone(),
    );
    table.add_function(root, "*", generic).unwrap();
    table.add_function(root, "*", concrete).unwrap();

    // A call site f(1, 2) weighs each candidate against the argument types
    // and picks the heaviest.
    let args = [int_instance.clone(), int_instance];
    let candidates = table.get_functions(root, "*", "f", 2);
    assert_eq!(candidates.len(), 2);

    let weigh = |function: &quill::ast::Function| -> usize {
        function
            .params()
            .iter()
            .zip(&args)
            .map(|(param, arg)| {
                weight(param.type_instance().unwrap(), arg, table.types())
            })
            .sum()
    };

    let generic_weight: usize = candidates
        .iter()
        .find(|f| f.params()[0].type_instance().unwrap().is_abstract())
        .map(|f| weigh(f))
        .unwrap();
    let concrete_weight: usize = candidates
        .iter()
        .find(|f| !f.params()[0].type_instance().unwrap().is_abstract())
        .map(|f| weigh(f))
        .unwrap();
    assert!(concrete_weight > generic_weight);

    // Overload resolution agrees with the raw weights.
    let chosen = resolve_call(&table, root, "*", "f", &args).unwrap();
    assert!(chosen.params()[0].type_instance().unwrap().builder().is_some());
}

// ----------------------------------------------------------------------
// Boundary behaviors
// ----------------------------------------------------------------------

#[rstest]
#[case::empty_list(InstanceCategory::List, 0)]
#[case::oversized_list(InstanceCategory::List, 2)]
#[case::undersized_map(InstanceCategory::Map, 1)]
#[case::oversized_map(InstanceCategory::Map, 3)]
fn test_builtin_shape_arity_violations(
    #[case] category: InstanceCategory,
    #[case] arity: usize,
) {
    let (mut table, root) = fixture();

    let params = (0..arity).map(|_| user_instance("int", vec![])).collect();
    let mut instance = user_instance("[", params);
    instance.set_category(category);
    assert!(matches!(
        check_instance_bare(&mut instance, &mut table, root, "*"),
        Err(SemanticError::InvalidType { .. })
    ));
}

#[test]
fn test_well_formed_list_and_map_instances() {
    let (mut table, root) = fixture();

    let mut list = user_instance("[", vec![user_instance("int", vec![])]);
    list.set_category(InstanceCategory::List);
    check_instance_bare(&mut list, &mut table, root, "*").unwrap();
    assert!(list.builder().is_some());

    let mut map = user_instance(
        "{",
        vec![user_instance("int", vec![]), user_instance("bool", vec![])],
    );
    map.set_category(InstanceCategory::Map);
    check_instance_bare(&mut map, &mut table, root, "*").unwrap();
    assert!(map.is_complete());
}

#[test]
fn test_duplicate_type_parameters_are_rejected() {
    let (mut table, root) = fixture();
    let dup = type_decl(&mut table, "pair", &["a", "a"]);
    table.add_type(root, "*", dup).unwrap();

    let err = check_type(dup, &mut table, root, "*").unwrap_err();
    assert!(err.message().contains("more than once"));
    assert_eq!(table.types()[dup].state(), ValidationState::Invalid);
}

#[test]
fn test_type_parameter_shadowing_concrete_type_is_rejected() {
    let (mut table, root) = fixture();
    let shadowing = type_decl(&mut table, "box", &["int"]);
    table.add_type(root, "*", shadowing).unwrap();

    let err = check_type(shadowing, &mut table, root, "*").unwrap_err();
    assert!(err.message().contains("concrete type"));
}

#[test]
fn test_standin_cannot_be_namespaced() {
    let (mut table, root) = fixture();
    table.add_namespace(root, "lib");

    let mut standin = user_instance("a", vec![]);
    standin.set_namespace("lib");
    let err = check_instance(&mut standin, &mut table, root, "*", &[tok("a")]).unwrap_err();
    assert!(err.message().contains("cannot be constrained to a namespace"));
}

#[test]
fn test_wildcard_lookup_reports_second_failure() {
    let (mut table, root) = fixture();

    // The holder namespace is tried first, the global namespace second; the
    // surviving error comes from the second attempt.
    let mut ghost = user_instance("ghost", vec![]);
    let err = check_instance_bare(&mut ghost, &mut table, root, "space").unwrap_err();
    assert!(err.message().contains("<*>"), "{}", err.message());
}

#[test]
fn test_self_referential_constructor_uses_escape_hatch() {
    let (mut table, root) = fixture();

    // type nat = Zero | Succ(nat): the recursive parameter names the very
    // type being validated before it is in a resolvable state.
    let nat = type_decl(&mut table, "nat", &[]);
    add_default_ctor(&mut table, nat, "Zero", vec![]);
    add_default_ctor(&mut table, nat, "Succ", vec![user_instance("nat", vec![])]);

    // The type is checked before insertion into scope, so the lookup misses
    // and only is_builtby saves the recursive parameter.
    check_type(nat, &mut table, root, "*").unwrap();
    assert_eq!(table.types()[nat].state(), ValidationState::Valid);

    let succ = table.types()[nat].default_constructor("Succ", 1).unwrap();
    assert_eq!(succ.params()[0].builder(), Some(nat));
}

#[test]
fn test_reference_instances_check_through_payload() {
    let (mut table, root) = fixture();

    let mut reference = user_instance("ref", vec![user_instance("int", vec![])]);
    reference.set_reference(true);
    check_instance_bare(&mut reference, &mut table, root, "*").unwrap();
    assert!(reference.params()[0].builder().is_some());
    assert!(reference.is_complete());

    let mut bad = user_instance("ref", vec![user_instance("ghost", vec![])]);
    bad.set_reference(true);
    assert!(check_instance_bare(&mut bad, &mut table, root, "*").is_err());
}
