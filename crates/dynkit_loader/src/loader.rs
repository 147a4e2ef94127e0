//! Recursive attribute loading with selector/action dispatch.
//!
//! An [`AttributeLoader`] walks a module tree through a [`ModuleResolver`]
//! and offers every public attribute to its registered handlers. A handler
//! is a selector over `(name, attribute)` paired with an action that runs
//! when the selector accepts.
//!
//! # Visit Order
//!
//! For each module, child modules are loaded first (sorted by name, private
//! children skipped), then the module's own public attributes are visited.
//! For each attribute, handlers run in registration order. The first handler
//! error aborts the whole load.
//!
//! # Example
//!
//! ```
//! use dynkit_loader::loader::{AttributeLoader, Depth};
//! use dynkit_loader::module::{Module, ModuleTree};
//! use std::sync::{Arc, Mutex};
//!
//! let mut tree = ModuleTree::new();
//! tree.insert(Module::container("app").with_attribute("answer", 42_i64)).unwrap();
//! tree.insert(Module::leaf("app.more").with_attribute("other", 7_i64)).unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let mut loader = AttributeLoader::new(tree);
//! loader.register_type::<i64>(move |_, value| {
//!     sink.lock().unwrap().push(*value);
//!     Ok(())
//! });
//!
//! loader.load("app", None, Depth::Unbounded).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![7, 42]);
//! ```

use core::fmt;

use tracing::{debug, trace};

use crate::error::{HandlerError, LoaderError};
use crate::module::{Attribute, ModuleHandle, ScanMode, is_private};
use crate::resolver::{ModuleResolver, parent_name};
use crate::stack::CallStack;

// ─────────────────────────────────────────────────────────────────────────────
// Depth
// ─────────────────────────────────────────────────────────────────────────────

/// How many container levels a load descends below its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Depth {
    /// Descend into every descendant container.
    #[default]
    Unbounded,
    /// Descend at most this many levels; `Limited(0)` visits only the target.
    Limited(usize),
}

impl Depth {
    /// Returns the depth to use for children, or `None` if descent stops here.
    #[must_use]
    pub fn descend(self) -> Option<Depth> {
        match self {
            Depth::Unbounded => Some(Depth::Unbounded),
            Depth::Limited(0) => None,
            Depth::Limited(k) => Some(Depth::Limited(k - 1)),
        }
    }
}

impl From<Option<usize>> for Depth {
    fn from(depth: Option<usize>) -> Self {
        depth.map_or(Depth::Unbounded, Depth::Limited)
    }
}

impl From<usize> for Depth {
    fn from(depth: usize) -> Self {
        Depth::Limited(depth)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Options and report
// ─────────────────────────────────────────────────────────────────────────────

/// Options for [`AttributeLoader::load_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Recursion depth below the target.
    pub depth: Depth,
    /// Package that a relative target is resolved against.
    pub within: Option<String>,
    /// Which attributes of each module are visited.
    pub mode: ScanMode,
}

impl LoadOptions {
    /// Creates options with unbounded depth, no package and namespace scanning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: sets the recursion depth.
    #[must_use]
    pub fn with_depth(mut self, depth: impl Into<Depth>) -> Self {
        self.depth = depth.into();
        self
    }

    /// Builder pattern: sets the package relative targets resolve against.
    #[must_use]
    pub fn with_within(mut self, package: impl Into<String>) -> Self {
        self.within = Some(package.into());
        self
    }

    /// Builder pattern: sets the scan mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Summary of a completed load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Absolute names of the visited modules, in visit order.
    pub modules: Vec<String>,
    /// Number of public attributes offered to the handlers.
    pub attributes: usize,
    /// Number of actions invoked.
    pub invocations: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Boxed selector deciding whether a handler applies to an attribute.
pub type Selector = Box<dyn Fn(&str, &Attribute) -> bool + Send + Sync>;

/// Boxed action invoked for every attribute its selector accepts.
pub type Action = Box<dyn FnMut(&str, &Attribute) -> Result<(), HandlerError> + Send>;

/// A registered (selector, action) pair.
pub struct Handler {
    selector: Selector,
    action: Action,
}

impl Handler {
    /// Creates a handler from a selector and an action.
    pub fn new<S, A>(selector: S, action: A) -> Self
    where
        S: Fn(&str, &Attribute) -> bool + Send + Sync + 'static,
        A: FnMut(&str, &Attribute) -> Result<(), HandlerError> + Send + 'static,
    {
        Self {
            selector: Box::new(selector),
            action: Box::new(action),
        }
    }

    /// Returns `true` if the selector accepts the attribute.
    #[must_use]
    pub fn accepts(&self, name: &str, attribute: &Attribute) -> bool {
        (self.selector)(name, attribute)
    }

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns whatever error the action returns.
    pub fn invoke(&mut self, name: &str, attribute: &Attribute) -> Result<(), HandlerError> {
        (self.action)(name, attribute)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AttributeLoader
// ─────────────────────────────────────────────────────────────────────────────

/// Walks module trees and dispatches public attributes to handlers.
pub struct AttributeLoader<R: ModuleResolver> {
    resolver: R,
    handlers: Vec<Handler>,
}

impl<R: ModuleResolver> AttributeLoader<R> {
    /// Creates a loader with no handlers.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            handlers: Vec::new(),
        }
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Returns the resolver mutably, e.g. to register more modules.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Consumes the loader and returns its resolver.
    #[must_use]
    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Registers an action for every attribute.
    pub fn register<A>(&mut self, action: A) -> &mut Self
    where
        A: FnMut(&str, &Attribute) -> Result<(), HandlerError> + Send + 'static,
    {
        self.register_with(|_, _| true, action)
    }

    /// Registers an action for the attributes accepted by `selector`.
    pub fn register_with<S, A>(&mut self, selector: S, action: A) -> &mut Self
    where
        S: Fn(&str, &Attribute) -> bool + Send + Sync + 'static,
        A: FnMut(&str, &Attribute) -> Result<(), HandlerError> + Send + 'static,
    {
        self.handlers.push(Handler::new(selector, action));
        self
    }

    /// Registers an action for attributes whose value is exactly a `T`.
    pub fn register_type<T: 'static>(
        &mut self,
        mut action: impl FnMut(&str, &T) -> Result<(), HandlerError> + Send + 'static,
    ) -> &mut Self {
        self.register_with(
            |_, attribute| attribute.is::<T>(),
            move |name, attribute| match attribute.downcast_ref::<T>() {
                Some(value) => action(name, value),
                None => Ok(()),
            },
        )
    }

    /// Loads `target`, resolved relative to `within` if given.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if any module cannot be resolved, or
    /// [`LoaderError::Handler`] for the first failing action.
    pub fn load(
        &mut self,
        target: &str,
        within: Option<&str>,
        depth: impl Into<Depth>,
    ) -> Result<LoadReport, LoaderError> {
        let options = LoadOptions {
            depth: depth.into(),
            within: within.map(str::to_string),
            mode: ScanMode::Namespace,
        };
        self.load_with(target, &options)
    }

    /// Loads `target` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with(
        &mut self,
        target: &str,
        options: &LoadOptions,
    ) -> Result<LoadReport, LoaderError> {
        let handle = self.resolver.resolve(target, options.within.as_deref())?;
        let mut report = LoadReport::default();
        search(
            &self.resolver,
            &mut self.handlers,
            &handle,
            options.depth,
            options.mode,
            &mut report,
        )?;

        debug!(
            module = target,
            modules = report.modules.len(),
            attributes = report.attributes,
            invocations = report.invocations,
            "load complete"
        );
        Ok(report)
    }

    /// Loads `target` relative to the package of the nearest foreign frame.
    ///
    /// The innermost frame of `stack` is the code performing the load. The
    /// first frame from another top-level package is the origin. If the
    /// origin is a container, relative targets resolve against it, otherwise
    /// against its parent package.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NoForeignFrame`] if the stack has no foreign
    /// frame, plus any error of [`load`](Self::load).
    pub fn load_from(
        &mut self,
        stack: &CallStack,
        target: &str,
        depth: impl Into<Depth>,
    ) -> Result<LoadReport, LoaderError> {
        let origin = stack.foreign_module(false)?;
        let within = match self.resolver.resolve(origin, None) {
            Ok(handle) if self.resolver.is_container(&handle) => Some(origin.to_string()),
            _ => parent_name(origin).ok(),
        };
        debug!(origin, ?within, module = target, "resolved load origin");

        let options = LoadOptions {
            depth: depth.into(),
            within,
            mode: ScanMode::Namespace,
        };
        self.load_with(target, &options)
    }
}

impl<R: ModuleResolver + fmt::Debug> fmt::Debug for AttributeLoader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeLoader")
            .field("resolver", &self.resolver)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

fn search<R: ModuleResolver>(
    resolver: &R,
    handlers: &mut [Handler],
    handle: &ModuleHandle,
    depth: Depth,
    mode: ScanMode,
    report: &mut LoadReport,
) -> Result<(), LoaderError> {
    debug!(module = handle.name(), ?depth, "visiting module");

    if let Some(child_depth) = depth.descend()
        && resolver.is_container(handle)
    {
        for spec in resolver.children(handle)? {
            if is_private(spec.short_name()) {
                debug!(module = %spec.name, "skipping private submodule");
                continue;
            }
            let child = resolver.resolve(&spec.name, None)?;
            search(resolver, handlers, &child, child_depth, mode, report)?;
        }
    }

    report.modules.push(handle.name().to_string());
    for (name, attribute) in handle.public_attributes(mode) {
        report.attributes += 1;
        for (index, handler) in handlers.iter_mut().enumerate() {
            if !handler.accepts(&name, &attribute) {
                continue;
            }
            trace!(module = handle.name(), attribute = %name, handler = index, "dispatching");
            handler
                .invoke(&name, &attribute)
                .map_err(|source| LoaderError::Handler {
                    module: handle.name().to_string(),
                    attribute: name.clone(),
                    source,
                })?;
            report.invocations += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_descend() {
        assert_eq!(Depth::Unbounded.descend(), Some(Depth::Unbounded));
        assert_eq!(Depth::Limited(2).descend(), Some(Depth::Limited(1)));
        assert_eq!(Depth::Limited(0).descend(), None);
    }

    #[test]
    fn depth_conversions() {
        assert_eq!(Depth::from(None::<usize>), Depth::Unbounded);
        assert_eq!(Depth::from(Some(3_usize)), Depth::Limited(3));
        assert_eq!(Depth::from(0_usize), Depth::Limited(0));
        assert_eq!(Depth::default(), Depth::Unbounded);
    }

    #[test]
    fn load_options_builder() {
        let options = LoadOptions::new()
            .with_depth(Depth::Limited(1))
            .with_within("app")
            .with_mode(ScanMode::Reflective);

        assert_eq!(options.depth, Depth::Limited(1));
        assert_eq!(options.within.as_deref(), Some("app"));
        assert_eq!(options.mode, ScanMode::Reflective);
    }

    #[test]
    fn handler_accepts_and_invokes() {
        let mut handler = Handler::new(|name, _| name == "x", |_, _| Err("boom".into()));
        let attribute = Attribute::new(1_u8);

        assert!(handler.accepts("x", &attribute));
        assert!(!handler.accepts("y", &attribute));
        assert_eq!(
            handler.invoke("x", &attribute).unwrap_err().to_string(),
            "boom"
        );
    }
}
