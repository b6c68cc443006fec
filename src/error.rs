//! Error types for the deepkey library.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// The main error type for the deepkey library.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Error {
    /// A declared field of a reflected value could not be read.
    ///
    /// Dropping the field instead would let distinct arguments share a key,
    /// so this is reported rather than skipped.
    #[error("cannot read field `{field}` of `{type_name}`")]
    FieldAccess {
        /// Fully-qualified name of the type that declares the field.
        type_name: String,
        /// Name of the unreadable field.
        field: String,
    },

    /// An array index was outside the array's fixed length.
    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The array's length.
        len: usize,
    },

    /// A value of the wrong kind was stored into a primitive array.
    #[error("array of {expected} cannot hold {found}")]
    ElementKind {
        /// The array's element kind.
        expected: String,
        /// Description of the rejected value.
        found: String,
    },

    /// The key includes signature information the invocation did not supply.
    #[error("invocation carries no method signature but the key includes the {0}")]
    MissingSignature(String),

    /// The generator configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new field access error.
    pub fn field_access(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldAccess {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<E: fmt::Display>(error: E) -> Self {
        Self::Config(error.to_string())
    }
}

/// A specialized `Result` type for key generation.
pub type Result<T> = std::result::Result<T, Error>;
