//! Singleton dependency storage.
//!
//! The [`DependencyLibrary`] holds at most one instance per concrete type, in
//! insertion order. Each stored instance can be retrieved as its own type and
//! as any additional *view* declared when it was registered, typically a
//! trait object:
//!
//! ```
//! use dynkit_inject::{Dependency, DependencyLibrary};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".into()
//!     }
//! }
//!
//! let mut library = DependencyLibrary::new();
//! library
//!     .insert(Dependency::new(English).provides::<dyn Greeter>(|english| english))
//!     .unwrap();
//!
//! let greeter: Arc<dyn Greeter> = library.get::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! assert!(library.contains::<English>());
//! ```
//!
//! # Lookup Semantics
//!
//! Duplicate detection compares exact concrete types. Lookup returns the first
//! entry, in insertion order, that provides the requested view. Two entries of
//! different concrete types may therefore both provide `dyn Greeter`; the
//! earlier one wins.

use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::error::InjectError;
use crate::key::{TypeKey, is_type_handle};
use crate::param::InjectFn;
use crate::signature::{Arguments, DynamicCallable, ParamKind};

// ─────────────────────────────────────────────────────────────────────────────
// Resolved
// ─────────────────────────────────────────────────────────────────────────────

/// A type-erased view of a stored dependency.
///
/// Holds an `Arc<V>` for the view type `V` it was resolved as.
#[derive(Clone)]
pub struct Resolved {
    key: TypeKey,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Resolved {
    fn new<V: ?Sized + Send + Sync + 'static>(value: Arc<V>) -> Self {
        Self {
            key: TypeKey::of::<V>(),
            handle: Arc::new(value),
        }
    }

    /// Returns the key of the view this value was resolved as.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns the view as `Arc<V>` if it was resolved as `V`.
    #[must_use]
    pub fn downcast<V: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<V>> {
        self.handle.downcast_ref::<Arc<V>>().cloned()
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("key", &self.key.name())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dependency
// ─────────────────────────────────────────────────────────────────────────────

/// A dependency instance together with the views it provides.
///
/// The concrete type `T` is always a view. Add more with
/// [`provides`](Self::provides).
pub struct Dependency<T: Send + Sync + 'static> {
    value: Arc<T>,
    views: Vec<Resolved>,
}

impl<T: Send + Sync + 'static> Dependency<T> {
    /// Wraps a value.
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value.
    pub fn from_arc(value: Arc<T>) -> Self {
        let views = vec![Resolved::new(Arc::clone(&value))];
        Self { value, views }
    }

    /// Builder pattern: declares that this instance can be retrieved as `V`.
    ///
    /// The closure converts the shared instance into the view, usually by
    /// unsizing it: `.provides::<dyn Trait>(|value| value)`.
    #[must_use]
    pub fn provides<V: ?Sized + Send + Sync + 'static>(
        mut self,
        view: impl FnOnce(Arc<T>) -> Arc<V>,
    ) -> Self {
        let resolved = Resolved::new(view(Arc::clone(&self.value)));
        self.views.retain(|existing| existing.key != resolved.key);
        self.views.push(resolved);
        self
    }

    /// Returns the shared instance.
    #[must_use]
    pub fn value(&self) -> &Arc<T> {
        &self.value
    }
}

struct Entry {
    key: TypeKey,
    instance: Arc<dyn Any + Send + Sync>,
    views: HashMap<TypeId, Resolved>,
    view_order: Vec<TypeKey>,
}

impl Entry {
    fn view(&self, id: TypeId) -> Option<&Resolved> {
        self.views.get(&id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DependencyLibrary
// ─────────────────────────────────────────────────────────────────────────────

/// An insertion-ordered collection of singleton dependency instances.
#[derive(Default)]
pub struct DependencyLibrary {
    entries: Vec<Entry>,
}

impl DependencyLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance, retrievable as its own type.
    ///
    /// # Errors
    ///
    /// - [`InjectError::TypeAsDependency`] if `T` is a type handle
    ///   ([`TypeKey`] or [`TypeId`])
    /// - [`InjectError::DuplicateDependency`] if a `T` is already stored
    pub fn add<T: Send + Sync + 'static>(&mut self, value: T) -> Result<Arc<T>, InjectError> {
        self.insert(Dependency::new(value))
    }

    /// Adds an instance with its declared views.
    ///
    /// On error the library is left unchanged.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn insert<T: Send + Sync + 'static>(
        &mut self,
        dependency: Dependency<T>,
    ) -> Result<Arc<T>, InjectError> {
        let key = TypeKey::of::<T>();
        if is_type_handle::<T>() {
            return Err(InjectError::TypeAsDependency {
                type_name: key.name(),
            });
        }
        if self.entries.iter().any(|entry| entry.key == key) {
            return Err(InjectError::DuplicateDependency {
                type_name: key.name(),
            });
        }

        let Dependency { value, views } = dependency;
        let view_order: Vec<TypeKey> = views.iter().map(Resolved::key).collect();
        debug!(
            type_name = key.name(),
            views = view_order.len(),
            "adding dependency"
        );

        let instance: Arc<dyn Any + Send + Sync> = value.clone();
        self.entries.push(Entry {
            key,
            instance,
            views: views
                .into_iter()
                .map(|resolved| (resolved.key.id(), resolved))
                .collect(),
            view_order,
        });
        Ok(value)
    }

    /// Returns the first stored instance that provides `T`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DependencyNotFound`] if no entry provides `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectError> {
        let resolved = self.get_by_key(TypeKey::of::<T>())?;
        resolved
            .downcast::<T>()
            .ok_or(InjectError::DependencyNotFound {
                type_name: core::any::type_name::<T>(),
            })
    }

    /// Type-erased form of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DependencyNotFound`] if no entry provides `key`.
    pub fn get_by_key(&self, key: TypeKey) -> Result<Resolved, InjectError> {
        match self.entries.iter().find_map(|entry| entry.view(key.id())) {
            Some(resolved) => Ok(resolved.clone()),
            None => {
                trace!(type_name = key.name(), "dependency lookup missed");
                Err(InjectError::DependencyNotFound {
                    type_name: key.name(),
                })
            }
        }
    }

    /// Returns `true` if [`get::<T>`](Self::get) would succeed.
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(TypeKey::of::<T>())
    }

    /// Returns `true` if some entry provides `key`.
    #[must_use]
    pub fn contains_key(&self, key: TypeKey) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.view(key.id()).is_some())
    }

    /// Returns `true` if `instance` is the very allocation of a stored entry.
    #[must_use]
    pub fn contains_instance<T: ?Sized>(&self, instance: &Arc<T>) -> bool {
        self.entries
            .iter()
            .any(|entry| core::ptr::addr_eq(Arc::as_ptr(&entry.instance), Arc::as_ptr(instance)))
    }

    /// Returns the number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the concrete type names of the stored instances in insertion order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.key.name()).collect()
    }

    /// Returns the views provided by the instance of concrete type `T`.
    #[must_use]
    pub fn views_of<T: 'static>(&self) -> Vec<TypeKey> {
        let key = TypeKey::of::<T>();
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.view_order.clone())
            .unwrap_or_default()
    }

    /// Calls `f` with every parameter fetched from the library.
    ///
    /// Parameters are [`Dep<T>`](crate::Dep) (required) or
    /// `Option<Dep<T>>` (`None` when missing).
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DependencyNotFound`] for the first required
    /// parameter that cannot be resolved. `f` is not called in that case.
    pub fn inject<Marker, F: InjectFn<Marker>>(&self, f: F) -> Result<F::Output, InjectError> {
        f.call_injected(self)
    }

    /// Calls a runtime-described callable with its parameters resolved from
    /// the library.
    ///
    /// Each parameter is resolved by its annotation. Positional-only
    /// parameters are passed positionally, all others by name. A parameter
    /// that cannot be resolved but has a default is left out so the callable
    /// applies its own default.
    ///
    /// # Errors
    ///
    /// - [`InjectError::MissingAnnotation`] if a parameter has no annotation
    /// - [`InjectError::DependencyNotFound`] if a parameter without default
    ///   cannot be resolved
    /// - [`InjectError::Binding`] if the arguments do not bind to the signature
    pub fn inject_dynamic<R>(&self, callable: &DynamicCallable<R>) -> Result<R, InjectError> {
        let mut arguments = Arguments::new();

        for parameter in callable.signature().parameters() {
            let Some(annotation) = parameter.annotation() else {
                return Err(InjectError::MissingAnnotation {
                    parameter: parameter.name().to_string(),
                });
            };

            match self.get_by_key(annotation) {
                Ok(value) if parameter.kind() == ParamKind::PositionalOnly => {
                    arguments.push_positional(parameter.name(), value);
                }
                Ok(value) => arguments.push_named(parameter.name(), value),
                Err(err) if err.is_not_found() && parameter.has_default() => {
                    debug!(
                        parameter = parameter.name(),
                        type_name = annotation.name(),
                        "dependency missing, leaving parameter to its default"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        let bound = callable.signature().bind(arguments)?;
        Ok(callable.call(bound))
    }
}

impl fmt::Debug for DependencyLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyLibrary")
            .field("dependencies", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    #[derive(Debug, PartialEq)]
    struct Config {
        name: String,
    }

    impl Named for Config {
        fn name(&self) -> &str {
            &self.name
        }
    }

    struct Other;

    impl Named for Other {
        fn name(&self) -> &str {
            "other"
        }
    }

    #[test]
    fn add_and_get_exact_type() {
        let mut library = DependencyLibrary::new();
        library.add(Config { name: "a".into() }).unwrap();
        library.add(5_u32).unwrap();

        assert_eq!(library.get::<Config>().unwrap().name, "a");
        assert_eq!(*library.get::<u32>().unwrap(), 5);
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn add_returns_the_stored_instance() {
        let mut library = DependencyLibrary::new();
        let stored = library.add(Config { name: "a".into() }).unwrap();

        assert!(Arc::ptr_eq(&stored, &library.get::<Config>().unwrap()));
        assert!(library.contains_instance(&stored));
    }

    #[test]
    fn duplicate_leaves_library_unchanged() {
        let mut library = DependencyLibrary::new();
        library.add(Config { name: "first".into() }).unwrap();

        let err = library.add(Config { name: "second".into() }).unwrap_err();
        assert!(matches!(err, InjectError::DuplicateDependency { .. }));
        assert_eq!(library.len(), 1);
        assert_eq!(library.get::<Config>().unwrap().name, "first");
    }

    #[test]
    fn type_handles_are_rejected() {
        let mut library = DependencyLibrary::new();

        let err = library.add(TypeKey::of::<Config>()).unwrap_err();
        assert!(matches!(err, InjectError::TypeAsDependency { .. }));
        let err = library.add(TypeId::of::<Config>()).unwrap_err();
        assert!(matches!(err, InjectError::TypeAsDependency { .. }));
        assert!(library.is_empty());
    }

    #[test]
    fn first_provider_of_a_view_wins() {
        let mut library = DependencyLibrary::new();
        library
            .insert(Dependency::new(Other).provides::<dyn Named>(|other| other))
            .unwrap();
        library
            .insert(Dependency::new(Config { name: "cfg".into() }).provides::<dyn Named>(|c| c))
            .unwrap();

        assert_eq!(library.get::<dyn Named>().unwrap().name(), "other");
        assert_eq!(library.get::<Config>().unwrap().name(), "cfg");
    }

    #[test]
    fn missing_view_is_not_found() {
        let mut library = DependencyLibrary::new();
        library.add(Config { name: "a".into() }).unwrap();

        // not declared as a view
        assert!(!library.contains::<dyn Named>());
        let err = library.get::<dyn Named>().map(|_| ()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn membership_by_identity() {
        let mut library = DependencyLibrary::new();
        let stored = library.add(Config { name: "a".into() }).unwrap();

        assert!(library.contains_instance(&stored));
        assert!(!library.contains_instance(&Arc::new(Config { name: "a".into() })));

        let view: Arc<dyn Any + Send + Sync> = stored;
        assert!(library.contains_instance(&view));
    }

    #[test]
    fn views_are_listed_in_declaration_order() {
        let mut library = DependencyLibrary::new();
        library
            .insert(Dependency::new(Other).provides::<dyn Named>(|other| other))
            .unwrap();

        assert_eq!(
            library.views_of::<Other>(),
            vec![TypeKey::of::<Other>(), TypeKey::of::<dyn Named>()]
        );
        assert!(library.views_of::<Config>().is_empty());
        assert_eq!(library.type_names().len(), 1);
    }
}
