//! Module discovery and attribute loading for dynkit.
//!
//! This crate walks trees of named modules and hands every public attribute
//! to registered handlers. Modules are resolved through the
//! [`ModuleResolver`] capability; [`ModuleTree`] is the bundled in-memory
//! resolver where applications register their modules explicitly.
//!
//! # Architecture
//!
//! - [`ModuleResolver`] - resolves names and enumerates children
//! - [`ModuleTree`] / [`Module`] / [`Attribute`] - in-memory module namespace
//! - [`AttributeSource`] - visitor for inherited attributes (reflective scans)
//! - [`AttributeLoader`] - recursive walk with selector/action handlers
//! - [`CallStack`] - explicit call-origin context for relative loads
//!
//! # Example
//!
//! ```
//! use dynkit_loader::prelude::*;
//!
//! let mut tree = ModuleTree::new();
//! tree.insert(Module::container("plugins")).unwrap();
//! tree.insert(Module::leaf("plugins.greet").with_attribute("NAME", "greet")).unwrap();
//! tree.insert(Module::leaf("plugins._internal").with_attribute("NAME", "hidden")).unwrap();
//!
//! let mut loader = AttributeLoader::new(tree);
//! loader.register_type::<&'static str>(|_, _| Ok(()));
//!
//! let report = loader.load("plugins", None, Depth::Unbounded).unwrap();
//! assert_eq!(report.modules, vec!["plugins.greet", "plugins"]);
//! assert_eq!(report.invocations, 1);
//! ```

pub mod error;
pub mod loader;
pub mod module;
pub mod resolver;
pub mod stack;

pub use error::{HandlerError, LoaderError};
pub use loader::{AttributeLoader, Depth, Handler, LoadOptions, LoadReport};
pub use module::{
    Attribute, AttributeSource, Module, ModuleHandle, ModuleKind, ModuleSpec, ModuleTree, ScanMode,
};
pub use resolver::{ModuleResolver, parent_name, resolve_name};
pub use stack::{CallStack, FrameGuard};

/// Commonly used loader types.
pub mod prelude {
    pub use crate::error::{HandlerError, LoaderError};
    pub use crate::loader::{AttributeLoader, Depth, LoadOptions, LoadReport};
    pub use crate::module::{Attribute, AttributeSource, Module, ModuleTree, ScanMode};
    pub use crate::resolver::ModuleResolver;
    pub use crate::stack::CallStack;
}
