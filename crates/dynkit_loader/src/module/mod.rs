//! Module handles, attributes and the in-memory module tree.
//!
//! A module is a named namespace node. Containers (packages) may hold child
//! modules; leaves may not. Both expose named [`Attribute`]s. Attribute names
//! starting with `_` are private and never reach loader handlers.
//!
//! # Example
//!
//! ```
//! use dynkit_loader::module::{Module, ModuleTree};
//! use dynkit_loader::resolver::ModuleResolver;
//!
//! let mut tree = ModuleTree::new();
//! tree.insert(Module::container("app").with_attribute("VERSION", "1.0")).unwrap();
//! tree.insert(Module::leaf("app.commands").with_attribute("greet", 42_i64)).unwrap();
//!
//! let app = tree.resolve("app", None).unwrap();
//! let children = tree.children(&app).unwrap();
//! assert_eq!(children[0].name, "app.commands");
//! ```

mod tree;

pub use tree::ModuleTree;

use core::any::{Any, TypeId};
use core::fmt;
use indexmap::IndexMap;
use std::sync::Arc;

/// Shared handle to a registered module.
pub type ModuleHandle = Arc<Module>;

/// Returns `true` if `name` is private (starts with `_`).
#[must_use]
pub fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

/// Returns the final segment of a dotted module name.
#[must_use]
pub fn short_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}

// ─────────────────────────────────────────────────────────────────────────────
// Attribute
// ─────────────────────────────────────────────────────────────────────────────

/// A type-erased attribute value.
///
/// Cloning an `Attribute` is cheap: the value is reference counted.
#[derive(Clone)]
pub struct Attribute {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Attribute {
    /// Wraps a value as an attribute.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value as an attribute.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns `true` if the value is exactly of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns a reference to the value if it is exactly of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns the [`TypeId`] of the wrapped value.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(&*self.value)
    }

    /// Returns the type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if both attributes share the same value allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Attribute) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A visitor-based supplier of attributes that are not part of a module's own
/// namespace, such as inherited or class-level attributes of a scanned type.
///
/// Sources are only consulted by [`ScanMode::Reflective`] loads.
pub trait AttributeSource: Send + Sync + 'static {
    /// Calls `visitor` once per attribute this source exposes.
    fn visit_attributes(&self, visitor: &mut dyn FnMut(&str, Attribute));
}

/// Which attributes of a module a load visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Only the module's own namespace.
    #[default]
    Namespace,
    /// The module's own namespace plus every registered [`AttributeSource`].
    Reflective,
}

// ─────────────────────────────────────────────────────────────────────────────
// Module
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a module may hold children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// A package: may hold child modules.
    Container,
    /// A plain module without children.
    Leaf,
}

/// A named namespace node with attributes.
pub struct Module {
    name: String,
    kind: ModuleKind,
    attributes: IndexMap<String, Attribute>,
    sources: Vec<Arc<dyn AttributeSource>>,
}

impl Module {
    fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: IndexMap::new(),
            sources: Vec::new(),
        }
    }

    /// Creates a container (package) module with the given absolute name.
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, ModuleKind::Container)
    }

    /// Creates a leaf module with the given absolute name.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, ModuleKind::Leaf)
    }

    /// Builder pattern: sets an attribute and returns self.
    ///
    /// Setting an existing name replaces its value but keeps its position.
    #[must_use]
    pub fn with_attribute<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        value: T,
    ) -> Self {
        self.set_attribute(name, Attribute::new(value));
        self
    }

    /// Builder pattern: adds an attribute source and returns self.
    #[must_use]
    pub fn with_source(mut self, source: impl AttributeSource) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Sets an attribute in the module's own namespace.
    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: Attribute) {
        self.attributes.insert(name.into(), attribute);
    }

    /// Returns the absolute dotted name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the final segment of the name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Returns the module kind.
    #[must_use]
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Returns `true` if this module may hold children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind == ModuleKind::Container
    }

    /// Looks up an attribute of the module's own namespace.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Iterates over the module's own namespace in insertion order,
    /// private names included.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes
            .iter()
            .map(|(name, attribute)| (name.as_str(), attribute))
    }

    /// Collects the public attributes visible under `mode`.
    ///
    /// Own attributes come first in insertion order. In reflective mode,
    /// source attributes follow in visit order; a source attribute whose name
    /// is already present is shadowed.
    #[must_use]
    pub fn public_attributes(&self, mode: ScanMode) -> Vec<(String, Attribute)> {
        let mut visible: IndexMap<String, Attribute> = self
            .attributes
            .iter()
            .filter(|(name, _)| !is_private(name))
            .map(|(name, attribute)| (name.clone(), attribute.clone()))
            .collect();

        if mode == ScanMode::Reflective {
            for source in &self.sources {
                source.visit_attributes(&mut |name, attribute| {
                    if !is_private(name) && !visible.contains_key(name) {
                        visible.insert(name.to_string(), attribute);
                    }
                });
            }
        }

        visible.into_iter().collect()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// Description of a child module, as returned by submodule enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Absolute dotted name of the child.
    pub name: String,
    /// Kind of the child.
    pub kind: ModuleKind,
}

impl ModuleSpec {
    /// Returns the final segment of the child's name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}
