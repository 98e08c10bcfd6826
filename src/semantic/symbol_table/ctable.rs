//! The constructor table: default and record constructors, per namespace.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::ast::{DefaultConstructor, RecordConstructor};
use crate::semantic::error::{SemanticError, SemanticResult};

/// The constructors of a single namespace. Default and record constructors
/// occupy separate `(name, arity)` key spaces.
#[derive(Debug, Clone, Default)]
pub struct CtorSymbols {
    defaults: BTreeMap<(SmolStr, usize), DefaultConstructor>,
    records: BTreeMap<(SmolStr, usize), RecordConstructor>,
}

impl CtorSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_default_constructor(&mut self, cons: DefaultConstructor) -> SemanticResult<()> {
        let key = cons.key();
        if self.defaults.contains_key(&key) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a default constructor with the same name and arity.",
            ));
        }
        self.defaults.insert(key, cons);
        Ok(())
    }

    pub fn insert_record_constructor(&mut self, cons: RecordConstructor) -> SemanticResult<()> {
        let key = cons.key();
        if self.records.contains_key(&key) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a record constructor with the same name and arity.",
            ));
        }
        self.records.insert(key, cons);
        Ok(())
    }

    pub fn get_default_constructor(
        &self,
        name: &str,
        arity: usize,
    ) -> SemanticResult<&DefaultConstructor> {
        self.defaults
            .get(&(SmolStr::new(name), arity))
            .ok_or_else(|| {
                SemanticError::symbol_not_found(
                    "There is no default constructor with the same name and arity declared.",
                )
            })
    }

    pub fn get_record_constructor(
        &self,
        name: &str,
        arity: usize,
    ) -> SemanticResult<&RecordConstructor> {
        self.records
            .get(&(SmolStr::new(name), arity))
            .ok_or_else(|| {
                SemanticError::symbol_not_found(
                    "There is no record constructor with the same name and arity declared.",
                )
            })
    }

    pub fn default_constructor_exists(&self, name: &str, arity: usize) -> bool {
        self.defaults.contains_key(&(SmolStr::new(name), arity))
    }

    pub fn record_constructor_exists(&self, name: &str, arity: usize) -> bool {
        self.records.contains_key(&(SmolStr::new(name), arity))
    }

    pub fn default_constructor_exists_named(&self, name: &str) -> bool {
        self.defaults.keys().any(|(cons_name, _)| cons_name == name)
    }

    pub fn record_constructor_exists_named(&self, name: &str) -> bool {
        self.records.keys().any(|(cons_name, _)| cons_name == name)
    }
}

/// Per-namespace constructor tables of one scope.
#[derive(Debug, Clone, Default)]
pub struct CtorTable {
    symbols: FxHashMap<SmolStr, CtorSymbols>,
}

impl CtorTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, ns_name: &str) -> Option<&CtorSymbols> {
        self.symbols.get(ns_name)
    }

    fn namespace_mut(&mut self, ns_name: &str) -> &mut CtorSymbols {
        self.symbols.entry(SmolStr::new(ns_name)).or_default()
    }

    pub fn insert_default_constructor(
        &mut self,
        ns_name: &str,
        cons: DefaultConstructor,
    ) -> SemanticResult<()> {
        self.namespace_mut(ns_name).insert_default_constructor(cons)
    }

    pub fn insert_record_constructor(
        &mut self,
        ns_name: &str,
        cons: RecordConstructor,
    ) -> SemanticResult<()> {
        self.namespace_mut(ns_name).insert_record_constructor(cons)
    }

    pub fn get_default_constructor(
        &self,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> SemanticResult<&DefaultConstructor> {
        match self.namespace(ns_name) {
            Some(symbols) => symbols.get_default_constructor(cons_name, arity),
            None => Err(SemanticError::symbol_not_found(
                "There is no default constructor in the given namespace because the namespace doesn't exist.",
            )),
        }
    }

    pub fn get_record_constructor(
        &self,
        ns_name: &str,
        cons_name: &str,
        arity: usize,
    ) -> SemanticResult<&RecordConstructor> {
        match self.namespace(ns_name) {
            Some(symbols) => symbols.get_record_constructor(cons_name, arity),
            None => Err(SemanticError::symbol_not_found(
                "There is no record constructor in the given namespace because the namespace doesn't exist.",
            )),
        }
    }

    pub fn default_constructor_exists(&self, ns_name: &str, cons_name: &str, arity: usize) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.default_constructor_exists(cons_name, arity))
    }

    pub fn record_constructor_exists(&self, ns_name: &str, cons_name: &str, arity: usize) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.record_constructor_exists(cons_name, arity))
    }

    pub fn default_constructor_exists_named(&self, ns_name: &str, cons_name: &str) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.default_constructor_exists_named(cons_name))
    }

    pub fn record_constructor_exists_named(&self, ns_name: &str, cons_name: &str) -> bool {
        self.namespace(ns_name)
            .is_some_and(|symbols| symbols.record_constructor_exists_named(cons_name))
    }
}
