//! The semantic error taxonomy.

use thiserror::Error;

use crate::base::Token;

pub type SemanticResult<T> = Result<T, SemanticError>;

/// An error surfaced by the semantic front-end.
///
/// Variants that point at source carry the offending token for caret-style
/// reporting; resolver errors additionally carry a fatality flag - a fatal
/// import error aborts compilation, anything else leaves the affected
/// declaration `Invalid` and checking continues elsewhere.
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    #[error("{message}")]
    InvalidType { token: Token, message: String },

    #[error("{message}")]
    InvalidConstructor { message: String },

    #[error("{message}")]
    InvalidFunction { token: Token, message: String },

    #[error("{message}")]
    SymbolNotFound { message: String },

    #[error("{message}")]
    SymbolAlreadyDeclared { message: String },

    #[error("{message}")]
    SymbolCanCollide { message: String },

    #[error("{message}")]
    ImportError {
        token: Option<Token>,
        fatal: bool,
        message: String,
    },
}

impl SemanticError {
    pub fn invalid_type(token: Token, message: impl Into<String>) -> Self {
        Self::InvalidType {
            token,
            message: message.into(),
        }
    }

    pub fn invalid_constructor(message: impl Into<String>) -> Self {
        Self::InvalidConstructor {
            message: message.into(),
        }
    }

    pub fn invalid_function(token: Token, message: impl Into<String>) -> Self {
        Self::InvalidFunction {
            token,
            message: message.into(),
        }
    }

    pub fn symbol_not_found(message: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            message: message.into(),
        }
    }

    pub fn symbol_already_declared(message: impl Into<String>) -> Self {
        Self::SymbolAlreadyDeclared {
            message: message.into(),
        }
    }

    pub fn symbol_can_collide(message: impl Into<String>) -> Self {
        Self::SymbolCanCollide {
            message: message.into(),
        }
    }

    pub fn import_error(token: Option<Token>, fatal: bool, message: impl Into<String>) -> Self {
        Self::ImportError {
            token,
            fatal,
            message: message.into(),
        }
    }

    /// The token to point diagnostics at, when one is attached.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::InvalidType { token, .. } | Self::InvalidFunction { token, .. } => Some(token),
            Self::ImportError { token, .. } => token.as_ref(),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidType { message, .. }
            | Self::InvalidConstructor { message }
            | Self::InvalidFunction { message, .. }
            | Self::SymbolNotFound { message }
            | Self::SymbolAlreadyDeclared { message }
            | Self::SymbolCanCollide { message }
            | Self::ImportError { message, .. } => message,
        }
    }

    /// Fatal errors abort compilation outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ImportError { fatal: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TokenKind;

    #[test]
    fn test_token_attachment() {
        let tok = Token::new(TokenKind::TypeName, "box", 3, 7, "main.ql");
        let err = SemanticError::invalid_type(tok.clone(), "no builder");
        assert_eq!(err.token(), Some(&tok));
        assert_eq!(err.message(), "no builder");

        let err = SemanticError::symbol_not_found("missing");
        assert!(err.token().is_none());
    }

    #[test]
    fn test_only_fatal_imports_abort() {
        assert!(SemanticError::import_error(None, true, "cycle").is_fatal());
        assert!(!SemanticError::import_error(None, false, "later").is_fatal());
        assert!(!SemanticError::symbol_can_collide("dup").is_fatal());
    }
}
