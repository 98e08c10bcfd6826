//! The dependency resolver and importer.
//!
//! The resolver loads every module reachable from the entry program, orders
//! the resulting graph topologically (built-ins first, cycles fatal), and
//! then executes the imports: public declarations of imported programs flow
//! into the importing scope, every non-built-in program implicitly imports
//! the built-in modules, and each program finally self-imports its own
//! declarations so its body can resolve local names.

use std::collections::VecDeque;
use std::path::PathBuf;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::ast::{Decl, Program};
use crate::base::{Fqn, Token, TokenKind};
use crate::builtins;
use crate::project::{LoadError, ModuleLoader};

use super::checker::prepare_header;
use super::error::{SemanticError, SemanticResult};
use super::symbol_table::SymbolTable;

/// The global program table: every compiled program keyed by its serialized
/// fqn, in registration order.
#[derive(Debug, Default)]
pub struct GlobalTable {
    programs: IndexMap<SmolStr, Program>,
}

impl GlobalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program_exists(&self, fqn_name: &str) -> bool {
        self.programs.contains_key(fqn_name)
    }

    pub fn add_program(&mut self, program: Program) {
        let key = program.fqn().serialize();
        self.programs.entry(key).or_insert(program);
    }

    pub fn get_program(&self, fqn_name: &str) -> SemanticResult<&Program> {
        self.programs.get(fqn_name).ok_or_else(|| {
            SemanticError::symbol_not_found(format!(
                "There is no program with the fqn <{fqn_name}> in the global table."
            ))
        })
    }

    pub fn get_program_mut(&mut self, fqn_name: &str) -> SemanticResult<&mut Program> {
        self.programs.get_mut(fqn_name).ok_or_else(|| {
            SemanticError::symbol_not_found(format!(
                "There is no program with the fqn <{fqn_name}> in the global table."
            ))
        })
    }

    /// Programs in registration order.
    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.values()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Colors of the dependency DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepState {
    NotVisited,
    Visiting,
    Visited,
}

/// Drives dependency resolution for one compilation.
pub struct Importer<'a, L: ModuleLoader> {
    loader: &'a mut L,
    search_paths: Vec<PathBuf>,
    gtable: GlobalTable,
    /// Adjacency: importer fqn → imported fqns, in discovery order.
    deps: IndexMap<SmolStr, Vec<SmolStr>>,
    dep_states: FxHashMap<SmolStr, DepState>,
    /// Topologically sorted fqns, built-ins first.
    sorted: VecDeque<SmolStr>,
}

impl<'a, L: ModuleLoader> Importer<'a, L> {
    pub fn new(loader: &'a mut L, search_paths: Vec<PathBuf>) -> Self {
        Self {
            loader,
            search_paths,
            gtable: GlobalTable::new(),
            deps: IndexMap::new(),
            dep_states: FxHashMap::default(),
            sorted: VecDeque::new(),
        }
    }

    /// The entry point: build the dependency graph rooted at `entry`, sort
    /// it, run every import, and hand back the populated global table.
    pub fn import_all(
        mut self,
        entry: Program,
        table: &mut SymbolTable,
    ) -> SemanticResult<GlobalTable> {
        self.generate_deps(entry, table)?;
        self.sort_deps(table)?;
        self.run_imports(table)?;
        Ok(self.gtable)
    }

    // ------------------------------------------------------------------
    // Phase 1: dependency generation
    // ------------------------------------------------------------------

    /// Register a program and recursively parse everything it imports.
    /// A second call for an already-registered fqn is a no-op.
    fn generate_deps(&mut self, program: Program, table: &mut SymbolTable) -> SemanticResult<()> {
        let key = program.fqn().serialize();
        if self.gtable.program_exists(&key) {
            return Ok(());
        }
        debug!(program = %key, "generating dependencies");

        let imports: Vec<(Token, SmolStr)> = program
            .declarations()
            .iter()
            .filter_map(|decl| match decl {
                Decl::Import(import) => {
                    Some((import.token().clone(), SmolStr::new(import.fqn_name())))
                }
                _ => None,
            })
            .collect();

        self.gtable.add_program(program);
        self.deps.insert(key.clone(), Vec::new());
        self.dep_states.insert(key.clone(), DepState::NotVisited);

        for (import_token, import_name) in imports {
            if let Some(edges) = self.deps.get_mut(&key) {
                edges.push(import_name.clone());
            }

            if self.gtable.program_exists(&import_name) {
                continue;
            }

            let import_fqn = Fqn::from_name(import_name.clone());
            let imported = self
                .loader
                .parse(import_fqn.path(), &self.search_paths, table)
                .map_err(|err| match err {
                    LoadError::FileNotFound(_) => SemanticError::import_error(
                        Some(import_token.clone()),
                        true,
                        format!(
                            "Failed to import <{import_name}>. Does the file associated with it exist?"
                        ),
                    ),
                    LoadError::Parse(message) => {
                        SemanticError::import_error(Some(import_token.clone()), true, message)
                    }
                })?;
            self.generate_deps(imported, table)?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 2: topological sort
    // ------------------------------------------------------------------

    /// Seed the queue with the built-in programs, then DFS the user graph.
    fn sort_deps(&mut self, table: &mut SymbolTable) -> SemanticResult<()> {
        for program in builtins::builtin_programs(table)? {
            let key = program.fqn().serialize();
            self.sorted.push_back(key);
            self.gtable.add_program(program);
        }

        let roots: Vec<SmolStr> = self.deps.keys().cloned().collect();
        for root in roots {
            if self.dep_states.get(&root) == Some(&DepState::NotVisited) {
                self.sort_visit(&root)?;
            }
        }
        Ok(())
    }

    fn sort_visit(&mut self, dep: &SmolStr) -> SemanticResult<()> {
        self.dep_states.insert(dep.clone(), DepState::Visiting);

        let sub_deps = self.deps.get(dep).cloned().unwrap_or_default();
        for sub_dep in &sub_deps {
            match self
                .dep_states
                .get(sub_dep)
                .copied()
                .unwrap_or(DepState::NotVisited)
            {
                DepState::NotVisited => self.sort_visit(sub_dep)?,
                // A back-edge to an open node closes a cycle.
                DepState::Visiting => {
                    return Err(SemanticError::import_error(
                        None,
                        true,
                        format!(
                            "There is a cycle between importer <{dep}> and importee <{sub_dep}>."
                        ),
                    ));
                }
                DepState::Visited => {}
            }
        }

        self.sorted.push_back(dep.clone());
        self.dep_states.insert(dep.clone(), DepState::Visited);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 3: import execution
    // ------------------------------------------------------------------

    fn run_imports(&mut self, table: &mut SymbolTable) -> SemanticResult<()> {
        while let Some(key) = self.sorted.pop_front() {
            self.run_imports_for(&key, table)?;
        }
        Ok(())
    }

    fn run_imports_for(&mut self, key: &SmolStr, table: &mut SymbolTable) -> SemanticResult<()> {
        trace!(program = %key, "running imports");
        let is_builtin = self.gtable.get_program(key)?.is_builtin();

        // Built-in modules are implicitly available in every user module.
        if !is_builtin {
            self.add_builtin_imports(key)?;
        }

        let import_names = self.gtable.get_program(key)?.import_names();
        for import_name in import_names {
            self.import_declarations(&import_name, key, false, table)?;
        }

        // The self-import puts the program's own declarations, private ones
        // included, into its own scope.
        if !is_builtin {
            self.import_declarations(key, key, true, table)?;
        }

        Ok(())
    }

    /// Append an import declaration for every built-in module.
    fn add_builtin_imports(&mut self, key: &SmolStr) -> SemanticResult<()> {
        let import_token = Token::new(TokenKind::Identifier, "import", 0, 0, "__bid__");
        let program = self.gtable.get_program_mut(key)?;
        for name in builtins::BUILTIN_SEED_ORDER {
            program.add_declaration(Decl::Import(crate::ast::ImportDecl::new(
                import_token.clone(),
                builtins::builtin_fqn(name).serialize(),
            )));
        }
        Ok(())
    }

    /// Pull declarations of program `from` into the scope of program `to`.
    /// Private declarations travel only on the self-import.
    fn import_declarations(
        &mut self,
        from: &str,
        to: &str,
        include_private: bool,
        table: &mut SymbolTable,
    ) -> SemanticResult<()> {
        let from_decls: Vec<Decl> = self.gtable.get_program(from)?.declarations().to_vec();
        let to_scope = self.gtable.get_program(to)?.scope();

        let namespaces: Vec<&crate::ast::NamespaceDecl> = from_decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Namespace(ns) => Some(ns),
                _ => None,
            })
            .collect();
        for ns in &namespaces {
            table.add_namespace(to_scope, ns.name());
        }

        for ns in namespaces {
            let ns_name = ns.name();
            for decl in ns.declarations() {
                match decl {
                    Decl::Type(type_decl) => {
                        if include_private || table.types()[*type_decl].is_public() {
                            let token = table.types()[*type_decl].token().clone();
                            table.add_type(to_scope, ns_name, *type_decl).map_err(|err| {
                                SemanticError::import_error(
                                    Some(token),
                                    true,
                                    err.message().to_owned(),
                                )
                            })?;
                        }
                    }
                    Decl::Function(function) => {
                        if include_private || function.is_public() {
                            let mut function = function.clone();
                            // Resolve the signature in the function's own
                            // scope so the overload comparison below sees
                            // builder-attached instances.
                            let header_scope = function.scope().unwrap_or(to_scope);
                            let header_ns = function.namespace().to_owned();
                            prepare_header(&mut function, table, header_scope, &header_ns)
                                .map_err(|err| {
                                    SemanticError::import_error(
                                        err.token().cloned(),
                                        true,
                                        err.message().to_owned(),
                                    )
                                })?;
                            let token = function.token().clone();
                            table.add_function(to_scope, ns_name, function).map_err(|err| {
                                SemanticError::import_error(
                                    Some(token),
                                    true,
                                    err.message().to_owned(),
                                )
                            })?;
                        }
                    }
                    Decl::Variable(variable) => {
                        if include_private || variable.is_public() {
                            let token = variable.token().clone();
                            table
                                .add_variable(to_scope, ns_name, variable.clone())
                                .map_err(|err| {
                                    SemanticError::import_error(
                                        Some(token),
                                        true,
                                        err.message().to_owned(),
                                    )
                                })?;
                        }
                    }
                    // Imports and nested namespaces were handled above;
                    // statements never travel across module boundaries.
                    Decl::Import(_) | Decl::Namespace(_) | Decl::Statement(_) => {}
                }
            }
        }

        Ok(())
    }
}
