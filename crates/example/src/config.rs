//! Host configuration, parsed from JSON into validated models.

use std::sync::Arc;

use dynkit_model::prelude::*;
use dynkit_model::casts;

/// Configuration used when no file is given.
pub const DEFAULT_CONFIG: &str = r#"{
    "name": "demo-host",
    "greeting": "hello",
    "retries": "3",
    "owner": {"name": "ada", "email": null}
}"#;

/// Defines the `Owner` and `HostConfig` model types and returns `HostConfig`.
///
/// # Errors
///
/// Returns a [`ModelError`] if a definition is invalid.
pub fn config_model() -> Result<Arc<ModelType>, ModelError> {
    let mut ns = ModelNamespace::new();
    ns.define(
        ModelType::builder("Owner")
            .field("name", FieldType::Str)
            .field_with(
                "email",
                FieldType::optional(FieldType::Str),
                FieldOptions::with_default(Value::Null),
            ),
    )?;
    ns.define(
        ModelType::builder("HostConfig")
            .field("name", FieldType::Str)
            .field_with("greeting", FieldType::Str, field().default("hello"))
            .field_with(
                "retries",
                FieldType::Int,
                field().default(1_i64).cast(casts::to_int),
            )
            .field_with(
                "verbose",
                FieldType::Bool,
                field().default(false).cast(casts::to_bool),
            )
            .field_with(
                "owner",
                FieldType::optional(FieldType::forward("Owner")),
                field(),
            )
            .field_with(
                "tags",
                FieldType::list(FieldType::Str),
                field().default(Value::List(Vec::new())),
            ),
    )
}

/// Settings shared with commands through the dependency library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Host name.
    pub name: String,
    /// Greeting prefix.
    pub greeting: String,
    /// Retry budget.
    pub retries: i64,
    /// Owner name, if configured.
    pub owner: Option<String>,
}

impl HostSettings {
    /// Parses JSON text into a `HostConfig` model and extracts the settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the text is not valid JSON or fails
    /// validation.
    pub fn parse(config_type: &Arc<ModelType>, text: &str) -> Result<(Model, Self), ModelError> {
        let model = config_type.from_json_str(text)?;
        let settings = Self::from_model(&model)?;
        Ok((model, settings))
    }

    /// Extracts the settings from a constructed `HostConfig`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if a field is missing.
    pub fn from_model(model: &Model) -> Result<Self, ModelError> {
        let text = |name: &str| -> Result<String, ModelError> {
            Ok(model.get(name)?.as_str().unwrap_or_default().to_string())
        };

        let owner = match model.get("owner")? {
            Value::Model(owner) => owner.get("name")?.as_str().map(str::to_string),
            _ => None,
        };

        Ok(Self {
            name: text("name")?,
            greeting: text("greeting")?,
            retries: model.get("retries")?.as_i64().unwrap_or_default(),
            owner,
        })
    }
}
