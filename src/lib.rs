//! Reflection-style building blocks for Rust applications: module discovery
//! with attribute handlers, a typed dependency library with parameter
//! injection, and declarative value models.
//!
//! ```
//! use dynkit::prelude::*;
//!
//! // Models: validate untyped input.
//! let point = ModelType::builder("Point")
//!     .field("x", FieldType::Int)
//!     .field("y", FieldType::Int)
//!     .build()
//!     .unwrap();
//! let p = point.from_json(&serde_json::json!({"x": 1, "y": 2})).unwrap();
//!
//! // Dependencies: inject by type.
//! let mut library = DependencyLibrary::new();
//! library.add(p).unwrap();
//! let x = library
//!     .inject(|p: Dep<Model>| p.get("x").cloned())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(x, Value::Int(1));
//!
//! // Loader: visit public attributes of a module tree.
//! let mut tree = ModuleTree::new();
//! tree.insert(Module::container("app")).unwrap();
//! tree.insert(Module::leaf("app.shapes").with_attribute("ORIGIN", (0_i64, 0_i64))).unwrap();
//! let mut loader = AttributeLoader::new(tree);
//! loader.register_type::<(i64, i64)>(|_, _| Ok(()));
//! assert_eq!(loader.load("app", None, Depth::Unbounded).unwrap().invocations, 1);
//! ```

pub use dynkit_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use dynkit_internal::prelude::*;
}
