//! Named collections of model types.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::model::{ModelType, ModelTypeBuilder};

/// The set of model types defined together, against which forward references
/// are resolved.
///
/// A type may refer to itself and to any type defined before it.
///
/// ```
/// use dynkit_model::{FieldType, ModelNamespace, ModelType};
///
/// let mut ns = ModelNamespace::new();
/// ns.define(ModelType::builder("Tag").field("label", FieldType::Str)).unwrap();
/// let post = ns
///     .define(
///         ModelType::builder("Post").field("tags", FieldType::list(FieldType::forward("Tag"))),
///     )
///     .unwrap();
///
/// assert_eq!(post.fields()[0].field_type().to_string(), "List[Tag]");
/// ```
#[derive(Debug, Default)]
pub struct ModelNamespace {
    models: IndexMap<String, Arc<ModelType>>,
}

impl ModelNamespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a model type and adds it to the namespace.
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateModel`] if the name is taken
    /// - any error of [`ModelTypeBuilder::build`], with forward references
    ///   resolved against this namespace
    pub fn define(&mut self, builder: ModelTypeBuilder) -> Result<Arc<ModelType>, ModelError> {
        if self.models.contains_key(builder.name()) {
            return Err(ModelError::DuplicateModel(builder.name().to_string()));
        }

        let model_type = builder.build_with(|name| self.models.get(name).cloned())?;
        self.models
            .insert(model_type.name().to_string(), Arc::clone(&model_type));
        Ok(model_type)
    }

    /// Returns the model type with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ModelType>> {
        self.models.get(name)
    }

    /// Returns `true` if a model type with this name is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Returns the number of model types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no model type is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns the defined names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
