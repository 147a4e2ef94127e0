//! In-memory [`ModuleResolver`] backed by explicitly registered modules.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Module, ModuleHandle, ModuleSpec};
use crate::error::LoaderError;
use crate::resolver::{ModuleResolver, parent_name, resolve_name};

/// A registry of modules addressed by absolute dotted name.
///
/// Modules must be inserted parent first. Children of a container are
/// enumerated sorted by name.
#[derive(Debug, Default)]
pub struct ModuleTree {
    modules: IndexMap<String, ModuleHandle>,
    children: IndexMap<String, BTreeSet<String>>,
}

impl ModuleTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module and returns its handle.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::InvalidName`] if the name has an empty segment
    /// - [`LoaderError::DuplicateModule`] if the name is already registered
    /// - [`LoaderError::ModuleNotFound`] if the parent package is not registered
    /// - [`LoaderError::NotAContainer`] if the parent is a leaf
    pub fn insert(&mut self, module: Module) -> Result<ModuleHandle, LoaderError> {
        let name = module.name().to_string();
        if name.split('.').any(str::is_empty) {
            return Err(LoaderError::InvalidName(name));
        }
        if self.modules.contains_key(&name) {
            return Err(LoaderError::DuplicateModule(name));
        }

        if let Some((parent, _)) = name.rsplit_once('.') {
            let parent_handle = self
                .modules
                .get(parent)
                .ok_or_else(|| LoaderError::ModuleNotFound(parent.to_string()))?;
            if !parent_handle.is_container() {
                return Err(LoaderError::NotAContainer(parent.to_string()));
            }
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(name.clone());
        }

        if module.is_container() {
            self.children.entry(name.clone()).or_default();
        }

        let handle = Arc::new(module);
        self.modules.insert(name, Arc::clone(&handle));
        Ok(handle)
    }

    /// Returns the handle for an absolute name, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleHandle> {
        self.modules.get(name)
    }

    /// Returns the parent package of a module.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::NoParent`] if the module is top-level
    /// - [`LoaderError::ModuleNotFound`] if the parent is not registered
    pub fn parent(&self, handle: &ModuleHandle) -> Result<ModuleHandle, LoaderError> {
        let parent = parent_name(handle.name())?;
        self.resolve(&parent, None)
    }

    /// Returns the names of all registered modules in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleResolver for ModuleTree {
    fn resolve(&self, name: &str, relative_to: Option<&str>) -> Result<ModuleHandle, LoaderError> {
        let absolute = resolve_name(name, relative_to)?;
        self.modules
            .get(&absolute)
            .cloned()
            .ok_or(LoaderError::ModuleNotFound(absolute))
    }

    fn children(&self, handle: &ModuleHandle) -> Result<Vec<ModuleSpec>, LoaderError> {
        if !handle.is_container() {
            return Err(LoaderError::NotAContainer(handle.name().to_string()));
        }

        let Some(names) = self.children.get(handle.name()) else {
            return Ok(Vec::new());
        };

        Ok(names
            .iter()
            .filter_map(|name| {
                self.modules.get(name).map(|child| ModuleSpec {
                    name: name.clone(),
                    kind: child.kind(),
                })
            })
            .collect())
    }
}
