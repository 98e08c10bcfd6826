//! In-memory program representation.
//!
//! Declarations are tagged with their validation state, visibility,
//! namespace, and originating fqn. Type declarations live in the
//! [`TypeArena`]; everything else is value-typed and owned by the program
//! (or the scope) holding it.

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod ty;

pub use decl::{Decl, Function, ImportDecl, NamespaceDecl, Program, Variable};
pub use expr::{BinaryOperator, Expression, LiteralKind, UnaryOperator};
pub use stmt::{BlockStmt, IfStmt, Stmt, WhileStmt};
pub use ty::{
    star_instance, strong_compare, weak_compare, weight, DefaultConstructor, InstanceCategory,
    RecordConstructor, TypeArena, TypeDecl, TypeId, TypeInstance, ValidationState,
};
