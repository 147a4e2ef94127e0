//! Error types for module resolution and attribute loading.

use thiserror::Error;

/// Boxed error returned by handler actions.
pub type HandlerError = Box<dyn core::error::Error + Send + Sync>;

/// Errors that can occur while resolving modules or loading attributes.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No module with the given absolute name is registered.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// A module with the given name is already registered.
    #[error("module already registered: {0}")]
    DuplicateModule(String),

    /// The module name is empty or contains an empty segment.
    #[error("invalid module name: '{0}'")]
    InvalidName(String),

    /// Submodule enumeration was requested on a leaf module.
    #[error("module '{0}' is not a container")]
    NotAContainer(String),

    /// Parent lookup was requested on a top-level module.
    #[error("'{0}' does not have a parent")]
    NoParent(String),

    /// A relative name could not be resolved.
    #[error("invalid relative name '{name}': {reason}")]
    InvalidRelativeName {
        /// The name as supplied by the caller.
        name: String,
        /// Why resolution failed.
        reason: &'static str,
    },

    /// Call-origin traversal was exhausted without satisfying the predicate.
    #[error("no eligible frame in call stack")]
    NoEligibleFrame,

    /// No frame outside the caller's originating package could be found.
    #[error("could not find any foreign module in the call stack")]
    NoForeignFrame,

    /// A registered handler failed while processing an attribute.
    #[error("handler failed on attribute '{attribute}' of module '{module}': {source}")]
    Handler {
        /// The module being visited.
        module: String,
        /// The attribute being dispatched.
        attribute: String,
        /// The error returned by the handler action.
        #[source]
        source: HandlerError,
    },
}

impl LoaderError {
    /// Creates an [`InvalidRelativeName`](Self::InvalidRelativeName).
    pub fn invalid_relative_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidRelativeName {
            name: name.into(),
            reason,
        }
    }
}
