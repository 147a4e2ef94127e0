//! Typed parameter injection.
//!
//! Any function whose parameters all implement [`InjectParam`] can be called
//! through [`DependencyLibrary::inject`]:
//!
//! - [`Dep<T>`] - a required dependency, fails with
//!   [`InjectError::DependencyNotFound`] when missing
//! - `Option<P>` - an optional parameter, `None` when `P` cannot be found
//!
//! ```
//! use dynkit_inject::{Dep, DependencyLibrary};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct Cache;
//!
//! let mut library = DependencyLibrary::new();
//! library.add(Database { url: "postgres://db".into() }).unwrap();
//!
//! let url = library
//!     .inject(|db: Dep<Database>, cache: Option<Dep<Cache>>| {
//!         assert!(cache.is_none());
//!         db.url.clone()
//!     })
//!     .unwrap();
//! assert_eq!(url, "postgres://db");
//! ```

use core::fmt;
use core::ops::Deref;
use std::sync::Arc;

use tracing::debug;
use variadics_please::all_tuples;

use crate::error::InjectError;
use crate::library::DependencyLibrary;

/// A parameter that can be fetched from a [`DependencyLibrary`].
pub trait InjectParam: Sized {
    /// Fetches the parameter.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DependencyNotFound`] if a required dependency
    /// is missing.
    fn fetch(library: &DependencyLibrary) -> Result<Self, InjectError>;
}

/// A shared dependency of type `T`.
pub struct Dep<T: ?Sized>(Arc<T>);

impl<T: ?Sized> Dep<T> {
    /// Returns the underlying shared handle.
    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }

    /// Returns a reference to the shared handle.
    #[must_use]
    pub fn arc(&self) -> &Arc<T> {
        &self.0
    }
}

impl<T: ?Sized> Clone for Dep<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Dep<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Dep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dep").field(&&*self.0).finish()
    }
}

impl<T: ?Sized + Send + Sync + 'static> InjectParam for Dep<T> {
    fn fetch(library: &DependencyLibrary) -> Result<Self, InjectError> {
        library.get::<T>().map(Dep)
    }
}

impl<P: InjectParam> InjectParam for Option<P> {
    fn fetch(library: &DependencyLibrary) -> Result<Self, InjectError> {
        match P::fetch(library) {
            Ok(param) => Ok(Some(param)),
            Err(InjectError::DependencyNotFound { type_name }) => {
                debug!(type_name, "optional dependency missing, passing None");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// A function whose parameters can all be injected.
///
/// Implemented for every `FnOnce` of up to eight [`InjectParam`] parameters.
/// `Marker` only disambiguates the implementations.
pub trait InjectFn<Marker> {
    /// The function's return type.
    type Output;

    /// Fetches every parameter and calls the function.
    ///
    /// # Errors
    ///
    /// Returns the first parameter fetch error; the function is not called.
    fn call_injected(self, library: &DependencyLibrary) -> Result<Self::Output, InjectError>;
}

macro_rules! impl_inject_fn {
    ($(($param:ident, $value:ident)),*) => {
        impl<Func, Out, $($param: InjectParam),*> InjectFn<fn($($param,)*) -> Out> for Func
        where
            Func: FnOnce($($param),*) -> Out,
        {
            type Output = Out;

            fn call_injected(self, library: &DependencyLibrary) -> Result<Out, InjectError> {
                $(let $value = $param::fetch(library)?;)*
                Ok(self($($value),*))
            }
        }
    };
}

// Functions without parameters
impl<Func, Out> InjectFn<fn() -> Out> for Func
where
    Func: FnOnce() -> Out,
{
    type Output = Out;

    fn call_injected(self, _library: &DependencyLibrary) -> Result<Out, InjectError> {
        Ok(self())
    }
}

// Generate impls for functions of 1 to 8 parameters
all_tuples!(impl_inject_fn, 1, 8, P, p);
