//! End-to-end resolver scenarios: dependency ordering, cycle detection,
//! built-in auto-imports, and declaration propagation between modules.

mod helpers;

use helpers::{
    add_default_ctor, function_decl, tok, type_decl, user_instance, MemoryLoader, ModuleBuilder,
};
use quill::ast::{Stmt, ValidationState};
use quill::semantic::{
    check_instance_bare, check_program_types, Importer, SemanticError, SymbolTable,
};

#[test]
fn test_import_cycle_is_fatal() {
    let mut table = SymbolTable::new();
    let mut loader = MemoryLoader::new();
    loader.add("a", |table| {
        let mut module = ModuleBuilder::new(table, "a");
        module.import("main");
        module.finish()
    });

    let mut main = ModuleBuilder::new(&mut table, "main");
    main.import("a");

    let err = Importer::new(&mut loader, vec![])
        .import_all(main.finish(), &mut table)
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(err.message().contains("cycle"));
    assert!(err.message().contains("<a>") && err.message().contains("<main>"));
}

#[test]
fn test_missing_import_is_fatal() {
    let mut table = SymbolTable::new();
    let mut loader = MemoryLoader::new();

    let mut main = ModuleBuilder::new(&mut table, "main");
    main.import("ghost");

    let err = Importer::new(&mut loader, vec![])
        .import_all(main.finish(), &mut table)
        .unwrap_err();
    assert!(matches!(err, SemanticError::ImportError { fatal: true, .. }));
    assert!(err.message().contains("<ghost>"));
}

#[test]
fn test_builtins_are_implicitly_imported() {
    let mut table = SymbolTable::new();
    let mut builder = ModuleBuilder::new(&mut table, "main");
    let scope = builder.scope();

    // fn f(x: int) -> int, with no explicit import anywhere.
    builder.declare_function(function_decl(
        "f",
        &[user_instance("int", vec![])],
        user_instance("int", vec![]),
    ));

    let mut loader = MemoryLoader::new();
    let gtable = Importer::new(&mut loader, vec![])
        .import_all(builder.finish(), &mut table)
        .unwrap();

    // The int module flowed into main's scope and the header check of f
    // resolved its signature against it.
    assert!(table.type_exists(scope, "*", "int", 0));
    assert!(table.function_exists(scope, "*", "f", 1));
    let f = table.get_function(scope, "*", "f", 1).unwrap();
    assert!(f.params()[0].type_instance().unwrap().builder().is_some());
    assert!(f.return_type().unwrap().builder().is_some());

    // Built-in operator stubs came along too.
    assert!(table.function_exists(scope, "*", "__add__", 2));
    assert!(table.function_exists(scope, "*", "measure", 1));
    assert!(gtable.program_exists("main"));
}

#[test]
fn test_parametric_builtin_specializes_in_user_scope() {
    let mut table = SymbolTable::new();
    let builder = ModuleBuilder::new(&mut table, "main");
    let scope = builder.scope();

    let mut loader = MemoryLoader::new();
    Importer::new(&mut loader, vec![])
        .import_all(builder.finish(), &mut table)
        .unwrap();

    let mut instance = user_instance("maybe", vec![user_instance("int", vec![])]);
    check_instance_bare(&mut instance, &mut table, scope, "*").unwrap();

    let spec = instance.generated_type(table.types()).unwrap();
    let decl = &table.types()[spec];
    assert_eq!(decl.name(), "maybe(int)");
    assert!(decl.default_constructor("None:maybe(int)", 0).is_ok());

    let just = decl.default_constructor("Just(int):maybe(int)", 1).unwrap();
    assert_eq!(just.params()[0].name(), "int");
}

#[test]
fn test_public_declarations_propagate_to_importer() {
    let mut table = SymbolTable::new();
    let mut loader = MemoryLoader::new();
    loader.add("lib", |table| {
        let mut module = ModuleBuilder::new(table, "lib");

        let exported = type_decl(table, "pair", &[]);
        add_default_ctor(
            table,
            exported,
            "Pair",
            vec![user_instance("int", vec![]), user_instance("int", vec![])],
        );
        module.declare_type(exported);

        let hidden = type_decl(table, "secret", &[]);
        table.types_mut()[hidden].set_public(false);
        module.declare_type(hidden);

        // A bare statement only runs when lib itself is evaluated; it must
        // not affect the import.
        module.declare_statement(Stmt::Pass(tok("pass")));

        module.finish()
    });

    let mut main = ModuleBuilder::new(&mut table, "main");
    main.import("lib");
    let main_scope = main.scope();

    Importer::new(&mut loader, vec![])
        .import_all(main.finish(), &mut table)
        .unwrap();

    // The public type arrived with its constructors; the private one only
    // exists in lib's own scope.
    assert!(table.type_exists(main_scope, "*", "pair", 0));
    assert!(table.default_constructor_exists(main_scope, "*", "Pair", 2));
    assert!(!table.type_exists(main_scope, "*", "secret", 0));
}

#[test]
fn test_diamond_imports_resolve_in_dependency_order() {
    let mut table = SymbolTable::new();
    let mut loader = MemoryLoader::new();

    // b defines a type and a function whose header resolves in b's own
    // scope; a imports b; main imports both. The header check of b's
    // function can only succeed if b's imports ran before a's and main's.
    loader.add("b", |table| {
        let mut module = ModuleBuilder::new(table, "b");

        let coord = type_decl(table, "coord", &[]);
        add_default_ctor(table, coord, "Coord", vec![user_instance("int", vec![])]);
        module.declare_type(coord);

        let mut wrap = function_decl(
            "wrap",
            &[user_instance("coord", vec![])],
            user_instance("coord", vec![]),
        );
        wrap.set_public(true);
        let function_scope = table.new_scope(Some(module.scope()));
        wrap.set_scope(function_scope);
        module.declare_function(wrap);

        module.finish()
    });
    loader.add("a", |table| {
        let mut module = ModuleBuilder::new(table, "a");
        module.import("b");
        module.finish()
    });

    let mut main = ModuleBuilder::new(&mut table, "main");
    main.import("a");
    main.import("b");
    let main_scope = main.scope();

    Importer::new(&mut loader, vec![])
        .import_all(main.finish(), &mut table)
        .unwrap();

    assert!(table.type_exists(main_scope, "*", "coord", 0));
    assert!(table.function_exists(main_scope, "*", "wrap", 1));

    // The imported signature is fully resolved.
    let wrap = table.get_function(main_scope, "*", "wrap", 1).unwrap();
    let param = wrap.params()[0].type_instance().unwrap();
    assert!(param.builder().is_some());
    assert_eq!(
        table.types()[param.builder().unwrap()].state(),
        ValidationState::Valid
    );
}

#[test]
fn test_unreferenced_types_are_validated_by_the_final_pass() {
    let mut table = SymbolTable::new();
    let mut builder = ModuleBuilder::new(&mut table, "main");

    // Nothing references box(a), so the lazy path never checks it.
    let box_id = type_decl(&mut table, "box", &["a"]);
    add_default_ctor(&mut table, box_id, "Box", vec![user_instance("a", vec![])]);
    builder.declare_type(box_id);

    let mut loader = MemoryLoader::new();
    let gtable = Importer::new(&mut loader, vec![])
        .import_all(builder.finish(), &mut table)
        .unwrap();
    assert_eq!(table.types()[box_id].state(), ValidationState::Unknown);

    check_program_types(&gtable, &mut table).unwrap();
    assert_eq!(table.types()[box_id].state(), ValidationState::Valid);
}

#[test]
fn test_reimporting_a_program_is_a_no_op() {
    let mut table = SymbolTable::new();
    let mut loader = MemoryLoader::new();
    loader.add("shared", |table| {
        let mut module = ModuleBuilder::new(table, "shared");
        let unit = type_decl(table, "unit", &[]);
        module.declare_type(unit);
        module.finish()
    });
    loader.add("a", |table| {
        let mut module = ModuleBuilder::new(table, "a");
        module.import("shared");
        module.finish()
    });
    loader.add("b", |table| {
        let mut module = ModuleBuilder::new(table, "b");
        module.import("shared");
        module.finish()
    });

    let mut main = ModuleBuilder::new(&mut table, "main");
    main.import("a");
    main.import("b");

    // shared is reached twice through the graph but parsed and registered
    // once; both paths see the same declaration.
    let gtable = Importer::new(&mut loader, vec![])
        .import_all(main.finish(), &mut table)
        .unwrap();
    assert!(gtable.program_exists("shared"));
    assert_eq!(
        gtable.programs().filter(|p| p.fqn().name() == "shared").count(),
        1
    );
}
