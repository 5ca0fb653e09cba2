//! Error taxonomy for definition resolution and validation.
//!
//! Two terminal failures cover the whole engine: a referenced descriptor has
//! no backing source of the expected kind, or a definition violates a
//! structural rule. Message text is part of the compatibility surface (the
//! serving layer forwards it verbatim), so messages are constructed once,
//! here or at the failure site, and never rewrapped.

use crate::base::{DefKind, Descriptor};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DefError>;

/// A terminal resolution or validation failure.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum DefError {
    /// A referenced descriptor has no backing source of the expected kind.
    #[error("No {kind} named {name} found")]
    DefinitionNotFound { kind: DefKind, name: String },

    /// A definition is structurally invalid: cyclic extension, non-extensible
    /// base, disallowed explicit-empty, foreign local theme misuse, malformed
    /// qualified name, unmatched dependency filter.
    #[error("{message}")]
    InvalidDefinition { message: String },
}

impl DefError {
    /// A not-found error for the given descriptor.
    pub fn not_found(descriptor: &Descriptor) -> Self {
        DefError::DefinitionNotFound {
            kind: descriptor.kind(),
            name: descriptor.qualified_name(),
        }
    }

    /// An invalid-definition error with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        DefError::InvalidDefinition {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DefError::DefinitionNotFound { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, DefError::InvalidDefinition { .. })
    }
}
