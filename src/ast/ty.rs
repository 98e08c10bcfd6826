//! Type declarations, type instances, and constructors.
//!
//! Type declarations live in a [`TypeArena`] and are addressed by
//! [`TypeId`]; a declaration is shared between every use site that resolved
//! to it, and the checker is the only mutator (validation state, the
//! specialization map, the used flag). Type instances are value types: each
//! AST node owns its own copy and comparisons are structural.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{star_token, Fqn, Token};
use crate::mangle;
use crate::semantic::error::{SemanticError, SemanticResult};

// ============================================================================
// VALIDATION STATE
// ============================================================================

/// Where a declaration stands in the checking pipeline.
///
/// Transitions are monotone: `Unknown → Validating → (Valid | Invalid)`.
/// `Validating` is observable on recursive entry and doubles as the cycle
/// guard: an instance checker that reaches a `Validating` type attaches it
/// without re-entering the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationState {
    #[default]
    Unknown,
    Validating,
    Valid,
    Invalid,
}

/// The built-in shape of a type instance use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstanceCategory {
    #[default]
    User,
    Tuple,
    List,
    Map,
}

// ============================================================================
// TYPE ARENA
// ============================================================================

/// Identifier of a type declaration in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena storage for all type declarations - single source of truth.
///
/// Instances reference declarations through [`TypeId`], which breaks the
/// cyclic borrows that recursive data constructors would otherwise create.
#[derive(Debug, Default)]
pub struct TypeArena {
    types: Vec<TypeDecl>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(decl);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeDecl> {
        self.types.get_mut(id.index())
    }

    /// Two type declarations are equal when they share a name and arity.
    pub fn type_eq(&self, a: TypeId, b: TypeId) -> bool {
        self[a].same_signature(&self[b])
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Index<TypeId> for TypeArena {
    type Output = TypeDecl;

    fn index(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }
}

impl IndexMut<TypeId> for TypeArena {
    fn index_mut(&mut self, id: TypeId) -> &mut TypeDecl {
        &mut self.types[id.index()]
    }
}

// ============================================================================
// TYPE DECLARATIONS
// ============================================================================

/// A type declaration: a name, formal type parameters, and the constructors
/// that build values of the type.
///
/// A declaration whose `builder_instance` is set is a specialization: a
/// concrete type generated from a complete type instance, named by that
/// instance's mangled form.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: SmolStr,
    token: Token,
    fqn: Fqn,
    namespace: SmolStr,
    params: Vec<Token>,
    def_constructors: BTreeMap<(SmolStr, usize), DefaultConstructor>,
    rec_constructors: BTreeMap<(SmolStr, usize), RecordConstructor>,
    state: ValidationState,
    is_public: bool,
    is_used: bool,
    specializations: FxHashMap<SmolStr, TypeId>,
    builder_instance: Option<Box<TypeInstance>>,
}

impl TypeDecl {
    pub fn new(token: Token, state: ValidationState) -> Self {
        Self {
            name: token.lexeme_smol(),
            token,
            fqn: Fqn::default(),
            namespace: SmolStr::default(),
            params: Vec::new(),
            def_constructors: BTreeMap::new(),
            rec_constructors: BTreeMap::new(),
            state,
            is_public: true,
            is_used: false,
            specializations: FxHashMap::default(),
            builder_instance: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn set_fqn(&mut self, fqn: Fqn) {
        self.fqn = fqn;
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<SmolStr>) {
        self.namespace = namespace.into();
    }

    pub fn add_param(&mut self, param: Token) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[Token] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn set_state(&mut self, state: ValidationState) {
        self.state = state;
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn set_public(&mut self, public: bool) {
        self.is_public = public;
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    pub fn set_used(&mut self, used: bool) {
        self.is_used = used;
    }

    /// Equal name and arity; the identity used by instance comparison.
    pub fn same_signature(&self, other: &TypeDecl) -> bool {
        self.name == other.name && self.params.len() == other.params.len()
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn add_default_constructor(&mut self, cons: DefaultConstructor) -> SemanticResult<()> {
        let key = cons.key();
        if self.def_constructors.contains_key(&key) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a default constructor with the given name and arity.",
            ));
        }
        self.def_constructors.insert(key, cons);
        Ok(())
    }

    pub fn add_record_constructor(&mut self, cons: RecordConstructor) -> SemanticResult<()> {
        let key = cons.key();
        if self.rec_constructors.contains_key(&key) {
            return Err(SemanticError::symbol_already_declared(
                "There already exists a record constructor with the given name and arity.",
            ));
        }
        self.rec_constructors.insert(key, cons);
        Ok(())
    }

    /// Swap in a checked copy of an existing default constructor.
    pub fn replace_default_constructor(&mut self, cons: DefaultConstructor) -> SemanticResult<()> {
        let key = cons.key();
        match self.def_constructors.get_mut(&key) {
            Some(slot) => {
                *slot = cons;
                Ok(())
            }
            None => Err(SemanticError::symbol_not_found(
                "No such default constructor belongs to this type.",
            )),
        }
    }

    /// Swap in a checked copy of an existing record constructor.
    pub fn replace_record_constructor(&mut self, cons: RecordConstructor) -> SemanticResult<()> {
        let key = cons.key();
        match self.rec_constructors.get_mut(&key) {
            Some(slot) => {
                *slot = cons;
                Ok(())
            }
            None => Err(SemanticError::symbol_not_found(
                "No such record constructor belongs to this type.",
            )),
        }
    }

    pub fn default_constructors(&self) -> impl Iterator<Item = &DefaultConstructor> {
        self.def_constructors.values()
    }

    pub fn record_constructors(&self) -> impl Iterator<Item = &RecordConstructor> {
        self.rec_constructors.values()
    }

    pub fn default_constructors_named(&self, name: &str) -> Vec<&DefaultConstructor> {
        self.def_constructors
            .iter()
            .filter(|((cons_name, _), _)| cons_name == name)
            .map(|(_, cons)| cons)
            .collect()
    }

    pub fn record_constructors_named(&self, name: &str) -> Vec<&RecordConstructor> {
        self.rec_constructors
            .iter()
            .filter(|((cons_name, _), _)| cons_name == name)
            .map(|(_, cons)| cons)
            .collect()
    }

    pub fn default_constructor(
        &self,
        name: &str,
        arity: usize,
    ) -> SemanticResult<&DefaultConstructor> {
        self.def_constructors
            .get(&(SmolStr::new(name), arity))
            .ok_or_else(|| {
                SemanticError::symbol_not_found(
                    "This type has no default constructor with the given name and arity.",
                )
            })
    }

    pub fn record_constructor(
        &self,
        name: &str,
        arity: usize,
    ) -> SemanticResult<&RecordConstructor> {
        self.rec_constructors
            .get(&(SmolStr::new(name), arity))
            .ok_or_else(|| {
                SemanticError::symbol_not_found(
                    "This type has no record constructor with the given name and arity.",
                )
            })
    }

    // ------------------------------------------------------------------
    // Specializations
    // ------------------------------------------------------------------

    /// Register a generated specialization under its mangled name.
    ///
    /// First write wins: a later instance with the same mangled form reuses
    /// the cached entry. The cache never evicts; this is a batch compiler.
    pub fn add_specialization(&mut self, name: SmolStr, specialization: TypeId) {
        self.specializations.entry(name).or_insert(specialization);
    }

    pub fn specialization(&self, name: &str) -> SemanticResult<TypeId> {
        self.specializations.get(name).copied().ok_or_else(|| {
            SemanticError::invalid_type(
                self.token.clone(),
                format!(
                    "There is no specialization by the name <{}> for type <{}>.",
                    name,
                    mangle::mangle_type(self)
                ),
            )
        })
    }

    pub fn specializations(&self) -> &FxHashMap<SmolStr, TypeId> {
        &self.specializations
    }

    /// The complete instance this specialization was generated from, if any.
    pub fn builder_instance(&self) -> Option<&TypeInstance> {
        self.builder_instance.as_deref()
    }

    pub fn set_builder_instance(&mut self, instance: TypeInstance) {
        self.builder_instance = Some(Box::new(instance));
    }

    /// A type is a specialization iff its builder instance is set.
    pub fn is_specialization(&self) -> bool {
        self.builder_instance.is_some()
    }
}

// ============================================================================
// TYPE INSTANCES
// ============================================================================

/// A use-site occurrence of a type.
///
/// An instance is *abstract* while no builder type is attached (it names a
/// type parameter, not a constructed type), *parametrized* while it
/// transitively depends on a stand-in, and *complete* once it is neither.
#[derive(Debug, Clone)]
pub struct TypeInstance {
    name: SmolStr,
    token: Token,
    /// The formal parameter token this instance replaced, recorded when an
    /// abstract instance is updated to a concrete one.
    old_token: Token,
    /// Nominal marker distinguishing structurally identical named tuples,
    /// e.g. `(measure: float, unit: string)` vs `(height: float, unit: string)`.
    tag: Token,
    category: InstanceCategory,
    namespace: SmolStr,
    builder: Option<TypeId>,
    /// Element count for fixed-size list and map instances.
    count: Option<usize>,
    params: Vec<TypeInstance>,
    is_parametrized: bool,
    is_reference: bool,
}

impl Default for TypeInstance {
    fn default() -> Self {
        Self::star()
    }
}

impl TypeInstance {
    /// A fresh copy of the star (wildcard) instance.
    pub fn star() -> Self {
        let star = star_token().clone();
        Self {
            name: star.lexeme_smol(),
            token: star.clone(),
            old_token: star.clone(),
            tag: star,
            category: InstanceCategory::User,
            namespace: SmolStr::new("*"),
            builder: None,
            count: None,
            params: Vec::new(),
            is_parametrized: false,
            is_reference: false,
        }
    }

    pub fn new(token: Token, namespace: impl Into<SmolStr>) -> Self {
        Self {
            name: token.lexeme_smol(),
            old_token: token.clone(),
            tag: star_token().clone(),
            token,
            namespace: namespace.into(),
            ..Self::star()
        }
    }

    pub fn with_builder(token: Token, builder: TypeId, namespace: impl Into<SmolStr>) -> Self {
        let mut instance = Self::new(token, namespace);
        instance.builder = Some(builder);
        instance
    }

    /// Selective copy, mirroring instance assignment in the checker: the old
    /// token survives (it records the formal parameter this instance
    /// replaced) and the count is not propagated.
    pub fn copy_from(&mut self, other: &TypeInstance) {
        self.name = other.name.clone();
        self.token = other.token.clone();
        self.tag = other.tag.clone();
        self.category = other.category;
        self.namespace = other.namespace.clone();
        self.builder = other.builder;
        self.is_parametrized = other.is_parametrized;
        self.is_reference = other.is_reference;
        self.params = other.params.clone();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Changes the token and the name of this type instance.
    pub fn set_token(&mut self, token: Token) {
        self.name = token.lexeme_smol();
        self.token = token;
    }

    pub fn old_token(&self) -> &Token {
        &self.old_token
    }

    pub fn set_old_token(&mut self, token: Token) {
        self.old_token = token;
    }

    pub fn tag(&self) -> &Token {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: Token) {
        self.tag = tag;
    }

    pub fn category(&self) -> InstanceCategory {
        self.category
    }

    pub fn set_category(&mut self, category: InstanceCategory) {
        self.category = category;
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<SmolStr>) {
        self.namespace = namespace.into();
    }

    pub fn builder(&self) -> Option<TypeId> {
        self.builder
    }

    pub fn set_builder(&mut self, builder: TypeId) {
        self.builder = Some(builder);
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = Some(count);
    }

    pub fn add_param(&mut self, param: TypeInstance) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[TypeInstance] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [TypeInstance] {
        &mut self.params
    }

    pub fn set_params(&mut self, params: Vec<TypeInstance>) {
        self.params = params;
    }

    pub fn is_parametrized(&self) -> bool {
        self.is_parametrized
    }

    pub fn set_parametrized(&mut self, parametrized: bool) {
        self.is_parametrized = parametrized;
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn set_reference(&mut self, reference: bool) {
        self.is_reference = reference;
    }

    /// True if this instance or any nested parameter is a reference.
    pub fn has_reference(&self) -> bool {
        self.is_reference || self.params.iter().any(TypeInstance::has_reference)
    }

    /// Abstract instances name a type parameter rather than a constructed
    /// type: no builder is attached.
    pub fn is_abstract(&self) -> bool {
        self.builder.is_none()
    }

    /// Complete instances are neither abstract nor parametrized; a reference
    /// is complete when its payload is.
    pub fn is_complete(&self) -> bool {
        if self.is_reference {
            !self.is_parametrized
        } else {
            self.builder.is_some() && !self.is_parametrized
        }
    }

    pub fn is_star(&self) -> bool {
        self.name == "*"
    }

    /// True if this instance or any nested parameter token appears among the
    /// given constraint tokens.
    pub fn depends_on(&self, constraints: &[Token]) -> bool {
        if self.params.is_empty() {
            return constraints.contains(&self.token);
        }
        self.params
            .iter()
            .any(|param| constraints.contains(param.token()) || param.depends_on(constraints))
    }

    /// True if the given type declaration builds this instance.
    pub fn is_builtby(&self, ty: TypeId, types: &TypeArena) -> bool {
        let decl = &types[ty];
        decl.name() == self.name && decl.arity() == self.params.len()
    }

    /// The mangled name of this instance. Callers expect a complete
    /// instance, so abstract or parametrized inputs are errors.
    pub fn mangled_name(&self) -> SemanticResult<SmolStr> {
        if self.builder.is_none() {
            return Err(SemanticError::invalid_type(
                self.token.clone(),
                "Unable to return the mangled name of an abstract type instance.",
            ));
        }
        if self.is_parametrized {
            return Err(SemanticError::invalid_type(
                self.token.clone(),
                "Unable to return the mangled name of an incomplete type instance.",
            ));
        }
        Ok(mangle::mangle_type_instance(self).into())
    }

    /// The unique specialization generated from this instance, if one has
    /// been registered on the builder type.
    pub fn generated_type(&self, types: &TypeArena) -> SemanticResult<TypeId> {
        let builder = self.builder.ok_or_else(|| {
            SemanticError::invalid_type(
                self.token.clone(),
                "Unable to return the generated type of an abstract type instance.",
            )
        })?;
        if self.is_parametrized {
            return Err(SemanticError::invalid_type(
                self.token.clone(),
                "Unable to return the generated type of an incomplete type instance.",
            ));
        }
        let mangled = self.mangled_name()?;
        types[builder].specialization(&mangled)
    }
}

impl fmt::Display for TypeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mangle::mangle_type_instance(self))
    }
}

/// The shared star (placeholder) instance.
pub fn star_instance() -> &'static TypeInstance {
    static STAR: Lazy<TypeInstance> = Lazy::new(TypeInstance::star);
    &STAR
}

// ============================================================================
// INSTANCE COMPARISON
// ============================================================================

/// Strong structural equality: an abstract instance never matches a
/// concrete one. Two abstract instances compare equal.
pub fn strong_compare(a: &TypeInstance, b: &TypeInstance, types: &TypeArena) -> bool {
    compare(a, b, types, false)
}

/// Weak structural equality: an abstract instance matches any concrete
/// instance on the opposite side. Checker look-ups use this when a stand-in
/// means "any".
pub fn weak_compare(a: &TypeInstance, b: &TypeInstance, types: &TypeArena) -> bool {
    compare(a, b, types, true)
}

fn compare(a: &TypeInstance, b: &TypeInstance, types: &TypeArena, weak: bool) -> bool {
    if a.category() != b.category() {
        return false;
    }

    // References compare by their payloads.
    if a.is_reference() && b.is_reference() {
        return match (a.params().first(), b.params().first()) {
            (Some(ap), Some(bp)) => compare(ap, bp, types, weak),
            _ => false,
        };
    }
    if a.is_reference() != b.is_reference() {
        return false;
    }

    match (a.builder(), b.builder()) {
        (None, None) => true,
        (None, _) | (_, None) => weak,
        (Some(at), Some(bt)) => {
            if a.params().is_empty() && b.params().is_empty() {
                return types.type_eq(at, bt);
            }
            if a.params().len() != b.params().len() {
                return false;
            }
            if !types.type_eq(at, bt) {
                return false;
            }
            a.params()
                .iter()
                .zip(b.params())
                .all(|(ap, bp)| compare(ap, bp, types, weak))
        }
    }
}

/// The weight of one instance relative to another: how much information the
/// candidate binds against the template. Zero when the two do not even
/// compare weakly; overload resolution picks the heaviest candidate.
pub fn weight(a: &TypeInstance, b: &TypeInstance, types: &TypeArena) -> usize {
    if !weak_compare(a, b, types) {
        return 0;
    }

    if a.params().is_empty() && b.params().is_empty() {
        // Either both are the exact same type or one of them is abstract.
        if a.is_abstract() || b.is_abstract() { 1 } else { 2 }
    } else if !a.params().is_empty() && !b.params().is_empty() {
        a.params()
            .iter()
            .zip(b.params())
            .map(|(ap, bp)| 1 + weight(ap, bp, types))
            .sum()
    } else {
        // One side admits parameters and the other does not; the weak
        // comparison above guarantees that side is abstract.
        1
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

/// A constructor with positional fields.
#[derive(Debug, Clone)]
pub struct DefaultConstructor {
    name: SmolStr,
    token: Token,
    owner: TypeId,
    params: Vec<TypeInstance>,
    is_parametrized: bool,
}

impl DefaultConstructor {
    pub fn new(token: Token, owner: TypeId) -> Self {
        Self {
            name: token.lexeme_smol(),
            token,
            owner,
            params: Vec::new(),
            is_parametrized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn add_param(&mut self, param: TypeInstance) {
        self.params.push(param);
    }

    pub fn params(&self) -> &[TypeInstance] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [TypeInstance] {
        &mut self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_parametrized(&self) -> bool {
        self.is_parametrized
    }

    pub fn set_parametrized(&mut self, parametrized: bool) {
        self.is_parametrized = parametrized;
    }

    pub fn mangled_name(&self, types: &TypeArena) -> SmolStr {
        mangle::mangle_default_constructor(self, types).into()
    }

    pub fn key(&self) -> (SmolStr, usize) {
        (self.name.clone(), self.params.len())
    }
}

/// A constructor with labeled, insertion-ordered fields.
#[derive(Debug, Clone)]
pub struct RecordConstructor {
    name: SmolStr,
    token: Token,
    owner: TypeId,
    params: IndexMap<Token, TypeInstance>,
    is_parametrized: bool,
}

impl RecordConstructor {
    pub fn new(token: Token, owner: TypeId) -> Self {
        Self {
            name: token.lexeme_smol(),
            token,
            owner,
            params: IndexMap::new(),
            is_parametrized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    /// Labels are tokens rather than plain strings so error reporting keeps
    /// the source position of the field name.
    pub fn add_param(&mut self, label: Token, param: TypeInstance) {
        self.params.insert(label, param);
    }

    pub fn params(&self) -> &IndexMap<Token, TypeInstance> {
        &self.params
    }

    pub fn params_mut(&mut self) -> impl Iterator<Item = (&Token, &mut TypeInstance)> {
        self.params.iter_mut()
    }

    /// The parameter type instances in declaration order, viewing this
    /// record constructor as a default constructor.
    pub fn params_as_vec(&self) -> Vec<TypeInstance> {
        self.params.values().cloned().collect()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_parametrized(&self) -> bool {
        self.is_parametrized
    }

    pub fn set_parametrized(&mut self, parametrized: bool) {
        self.is_parametrized = parametrized;
    }

    pub fn mangled_name(&self, types: &TypeArena) -> SmolStr {
        mangle::mangle_record_constructor(self, types).into()
    }

    pub fn key(&self) -> (SmolStr, usize) {
        (self.name.clone(), self.params.len())
    }
}
