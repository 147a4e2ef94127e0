//! Error types for model definition and construction.

use thiserror::Error;

/// Errors that can occur while defining model types or constructing models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A strict field received a value of the wrong type.
    #[error("value of type {found} is not assignable to field '{field}' (expected {expected})")]
    TypeMismatch {
        /// Qualified field name (`Model.field`).
        field: String,
        /// The declared field type.
        expected: String,
        /// The runtime type of the value.
        found: String,
    },

    /// The field type is ambiguous for nested construction.
    #[error("multiple options for loading '{field}': {candidates}")]
    Configuration {
        /// Qualified field name.
        field: String,
        /// The competing model types.
        candidates: String,
    },

    /// More positional arguments than declared fields.
    #[error("'{model}' has {expected} field(s) but {given} were given")]
    Arity {
        /// The model type name.
        model: String,
        /// Number of declared fields.
        expected: usize,
        /// Number of positional arguments.
        given: usize,
    },

    /// Lookup of a field name the model does not declare.
    #[error("unknown field name '{field}' on '{model}'")]
    UnknownField {
        /// The model type name.
        model: String,
        /// The requested field name.
        field: String,
    },

    /// A configured cast function failed.
    #[error("cast failed for field '{field}': {source}")]
    Cast {
        /// Qualified field name.
        field: String,
        /// The cast error.
        #[source]
        source: CastError,
    },

    /// A forward reference names no known model.
    #[error("unresolved reference '{reference}' in model '{model}'")]
    UnresolvedReference {
        /// The model being defined.
        model: String,
        /// The unresolved name.
        reference: String,
    },

    /// A model declares the same field twice.
    #[error("field '{field}' declared twice in model '{model}'")]
    DuplicateField {
        /// The model type name.
        model: String,
        /// The duplicated field name.
        field: String,
    },

    /// A namespace already defines a model with this name.
    #[error("model '{0}' is already defined")]
    DuplicateModel(String),

    /// Input text is not valid JSON.
    #[error("invalid json input: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Creates a [`TypeMismatch`](Self::TypeMismatch).
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Error returned by cast functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CastError(String);

impl CastError {
    /// Creates a cast error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}
