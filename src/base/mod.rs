//! Foundation types for the Quill front-end.
//!
//! This module provides the primitives everything else is built on:
//! - [`Token`], [`TokenKind`] - source tokens with position information
//! - [`NumberToken`], [`StringToken`] - decorated literal tokens
//! - [`Fqn`] - fully-qualified module names
//!
//! This module has NO dependencies on other quill modules.

mod fqn;
mod token;

pub use fqn::Fqn;
pub use token::{star_token, NumberToken, StringToken, Token, TokenKind};
