//! Declarative value models for dynkit.
//!
//! A model type is declared as an ordered list of typed fields. Constructing
//! a model validates every value against its field type, applies cast
//! functions, and builds nested models from plain mappings:
//!
//! ```
//! use dynkit_model::prelude::*;
//! use dynkit_model::casts;
//!
//! let mut ns = ModelNamespace::new();
//! ns.define(ModelType::builder("Owner").field("name", FieldType::Str)).unwrap();
//! let repo = ns
//!     .define(
//!         ModelType::builder("Repo")
//!             .field("owner", FieldType::forward("Owner"))
//!             .field_with("stars", FieldType::Int, field().default(0_i64).cast(casts::to_int)),
//!     )
//!     .unwrap();
//!
//! let model = repo
//!     .from_json(&serde_json::json!({"owner": {"name": "ada"}, "stars": "12"}))
//!     .unwrap();
//! assert_eq!(model.to_string(), r#"Repo(owner=Owner(name="ada"), stars=12)"#);
//! ```

pub mod casts;
pub mod error;
pub mod field;
pub mod model;
pub mod namespace;
pub mod value;

pub use error::{CastError, ModelError};
pub use field::{CastFn, FieldMetadata, FieldOptions, FieldType, field};
pub use model::{Model, ModelType, ModelTypeBuilder};
pub use namespace::ModelNamespace;
pub use value::{Value, ValueMap};

/// Commonly used model types.
pub mod prelude {
    pub use crate::error::ModelError;
    pub use crate::field::{FieldOptions, FieldType, field};
    pub use crate::model::{Model, ModelType};
    pub use crate::namespace::ModelNamespace;
    pub use crate::value::{Value, ValueMap};
}
