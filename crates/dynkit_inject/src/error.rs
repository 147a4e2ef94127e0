//! Error types for the dependency library.

use thiserror::Error;

/// Errors that can occur while storing, looking up or injecting dependencies.
#[derive(Debug, Error)]
pub enum InjectError {
    /// An instance of the exact same type is already stored.
    #[error("dependency of type {type_name} already exists")]
    DuplicateDependency {
        /// The duplicated type.
        type_name: &'static str,
    },

    /// No stored instance provides the requested type.
    #[error("no dependency provides type {type_name}")]
    DependencyNotFound {
        /// The requested type.
        type_name: &'static str,
    },

    /// A parameter of a dynamic callable declares no type.
    #[error("parameter '{parameter}' has no type annotation")]
    MissingAnnotation {
        /// Name of the parameter.
        parameter: String,
    },

    /// The resolved arguments do not bind to the callable's signature.
    #[error("failed to bind injected arguments: {0}")]
    Binding(#[from] BindError),

    /// A type handle was passed where an instance is expected.
    #[error("types cannot be stored as dependencies, got {type_name}")]
    TypeAsDependency {
        /// The rejected type-handle type.
        type_name: &'static str,
    },
}

impl InjectError {
    /// Returns `true` for [`DependencyNotFound`](Self::DependencyNotFound).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DependencyNotFound { .. })
    }
}

/// Errors produced when binding arguments to a [`Signature`](crate::Signature).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// More positional arguments than positional parameters.
    #[error("too many positional arguments: expected at most {expected}, got {given}")]
    TooManyPositional {
        /// Number of parameters accepting positional arguments.
        expected: usize,
        /// Number of positional arguments supplied.
        given: usize,
    },

    /// A positional argument would land in the slot of a different parameter,
    /// because an earlier positional-only parameter was left out.
    #[error("positional argument for '{argument}' would bind to parameter '{parameter}'")]
    PositionalGap {
        /// The parameter occupying the slot.
        parameter: String,
        /// The parameter the argument was resolved for.
        argument: String,
    },

    /// A positional-only parameter was passed by name.
    #[error("positional-only parameter '{0}' passed by name")]
    PositionalOnlyByName(String),

    /// A named argument matches no parameter.
    #[error("unexpected argument '{0}'")]
    UnknownParameter(String),

    /// A parameter received more than one value.
    #[error("multiple values for parameter '{0}'")]
    DuplicateArgument(String),

    /// A parameter without default received no value.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),
}
