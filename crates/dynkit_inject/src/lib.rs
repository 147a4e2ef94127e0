//! Typed dependency library for dynkit.
//!
//! A [`DependencyLibrary`] stores singleton instances, at most one per
//! concrete type, and injects them into function parameters:
//!
//! - statically, through [`DependencyLibrary::inject`] and the [`Dep<T>`]
//!   parameter type
//! - dynamically, through [`DependencyLibrary::inject_dynamic`] for callables
//!   described at runtime by a [`Signature`]
//!
//! Instances can be looked up by their own type or by any view declared at
//! registration (see [`Dependency::provides`]), which is how trait-object
//! lookups work.

pub mod error;
pub mod key;
pub mod library;
pub mod param;
pub mod signature;

pub use error::{BindError, InjectError};
pub use key::TypeKey;
pub use library::{Dependency, DependencyLibrary, Resolved};
pub use param::{Dep, InjectFn, InjectParam};
pub use signature::{Arguments, BoundArguments, DynamicCallable, ParamKind, Parameter, Signature};

/// Commonly used injection types.
pub mod prelude {
    pub use crate::error::InjectError;
    pub use crate::key::TypeKey;
    pub use crate::library::{Dependency, DependencyLibrary};
    pub use crate::param::Dep;
    pub use crate::signature::{DynamicCallable, Parameter, Signature};
}
