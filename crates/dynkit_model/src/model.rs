//! Model types and model instances.
//!
//! A [`ModelType`] is an ordered list of [`FieldMetadata`], built once with a
//! [`ModelTypeBuilder`] and shared behind an [`Arc`]. Instances ([`Model`])
//! keep a handle to their type and an ordered map of processed field values.
//!
//! ```
//! use dynkit_model::{FieldOptions, FieldType, ModelType, Value};
//!
//! let point = ModelType::builder("Point")
//!     .field("x", FieldType::Int)
//!     .field_with("y", FieldType::Int, FieldOptions::with_default(0_i64))
//!     .build()
//!     .unwrap();
//!
//! let p = point.construct(vec![Value::from(3_i64)], Default::default()).unwrap();
//! assert_eq!(p.to_string(), "Point(x=3, y=0)");
//! ```

use core::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::ModelError;
use crate::field::{FieldMetadata, FieldOptions, FieldType, field};
use crate::value::{Value, ValueMap};

// ─────────────────────────────────────────────────────────────────────────────
// ModelType
// ─────────────────────────────────────────────────────────────────────────────

/// A defined model type.
#[derive(Debug)]
pub struct ModelType {
    name: String,
    fields: Vec<FieldMetadata>,
}

impl ModelType {
    /// Starts declaring a model type.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldMetadata::name)
    }

    /// Constructs an instance.
    ///
    /// Positional arguments bind to fields in declaration order. Named
    /// arguments bind by field name and override positional ones. Named
    /// arguments that match no field are ignored.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Arity`] if more positional arguments than fields are
    ///   given
    /// - any error of [`FieldMetadata::process`]
    pub fn construct(
        self: &Arc<Self>,
        args: Vec<Value>,
        named: ValueMap,
    ) -> Result<Model, ModelError> {
        if args.len() > self.fields.len() {
            return Err(ModelError::Arity {
                model: self.name.clone(),
                expected: self.fields.len(),
                given: args.len(),
            });
        }

        let mut values: ValueMap = self
            .fields
            .iter()
            .zip(args)
            .map(|(field, value)| (field.name().to_string(), value))
            .collect();
        values.extend(named);

        self.process(values)
    }

    /// Constructs an instance from a mapping of named arguments.
    ///
    /// # Errors
    ///
    /// See [`construct`](Self::construct).
    pub fn from_dict(self: &Arc<Self>, values: ValueMap) -> Result<Model, ModelError> {
        self.process(values)
    }

    /// Constructs an instance from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TypeMismatch`] if `json` is not an object, or
    /// any error of [`from_dict`](Self::from_dict).
    pub fn from_json(self: &Arc<Self>, json: &serde_json::Value) -> Result<Model, ModelError> {
        match Value::from(json.clone()) {
            Value::Map(values) => self.from_dict(values),
            other => Err(ModelError::type_mismatch(
                &self.name,
                "map",
                other.type_name(),
            )),
        }
    }

    /// Parses JSON text and constructs an instance from it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] for malformed input, or any error of
    /// [`from_json`](Self::from_json).
    pub fn from_json_str(self: &Arc<Self>, text: &str) -> Result<Model, ModelError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.from_json(&json)
    }

    fn process(self: &Arc<Self>, mut values: ValueMap) -> Result<Model, ModelError> {
        let mut processed = ValueMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = field.process(&mut values, self)?;
            processed.insert(field.name().to_string(), value);
        }

        if !values.is_empty() {
            debug!(
                model = %self.name,
                ignored = ?values.keys().collect::<Vec<_>>(),
                "ignoring arguments that match no field"
            );
        }

        Ok(Model {
            model_type: Arc::clone(self),
            values: processed,
        })
    }
}

/// Declares the fields of a [`ModelType`].
#[derive(Debug)]
pub struct ModelTypeBuilder {
    name: String,
    fields: Vec<(String, FieldType, FieldOptions)>,
}

impl ModelTypeBuilder {
    /// Returns the name of the type being declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a strict field without default.
    #[must_use]
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_with(name, field_type, field())
    }

    /// Declares a field with options.
    ///
    /// Names starting with `_` are not fields and are skipped.
    #[must_use]
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        options: FieldOptions,
    ) -> Self {
        let name = name.into();
        if name.starts_with('_') {
            debug!(model = %self.name, field = %name, "skipping private attribute");
            return self;
        }
        self.fields.push((name, field_type, options));
        self
    }

    /// Defines the model type. Forward references may only name the type
    /// itself; use a [`ModelNamespace`](crate::ModelNamespace) to refer to
    /// other types by name.
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateField`] if a field is declared twice
    /// - [`ModelError::UnresolvedReference`] for forward references to other
    ///   names
    pub fn build(self) -> Result<Arc<ModelType>, ModelError> {
        self.build_with(|_| None)
    }

    pub(crate) fn build_with(
        self,
        lookup: impl Fn(&str) -> Option<Arc<ModelType>>,
    ) -> Result<Arc<ModelType>, ModelError> {
        let Self { name, fields } = self;

        let resolve = |reference: &str| {
            if reference == name {
                Some(None)
            } else {
                lookup(reference).map(Some)
            }
        };

        let mut resolved: Vec<FieldMetadata> = Vec::with_capacity(fields.len());
        for (field_name, field_type, options) in fields {
            if resolved.iter().any(|f| f.name() == field_name) {
                return Err(ModelError::DuplicateField {
                    model: name.clone(),
                    field: field_name,
                });
            }
            let field_type =
                field_type
                    .resolve(&resolve)
                    .map_err(|reference| ModelError::UnresolvedReference {
                        model: name.clone(),
                        reference,
                    })?;
            resolved.push(FieldMetadata::new(&name, field_name, field_type, options));
        }

        debug!(model = %name, fields = resolved.len(), "defined model type");
        Ok(Arc::new(ModelType {
            name,
            fields: resolved,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────────────────────────────────────

/// A constructed model: an ordered, read-only mapping of field values.
#[derive(Clone)]
pub struct Model {
    model_type: Arc<ModelType>,
    values: ValueMap,
}

impl Model {
    /// Returns the model type.
    #[must_use]
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Returns the value of a field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] if the type has no such field.
    pub fn get(&self, name: &str) -> Result<&Value, ModelError> {
        self.values
            .get(name)
            .ok_or_else(|| ModelError::UnknownField {
                model: self.model_type.name.clone(),
                field: name.to_string(),
            })
    }

    /// Returns `true` if the type has a field with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the type has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates field values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Converts to a JSON object of the field values.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Consumes the model, returning its field values.
    #[must_use]
    pub fn into_values(self) -> ValueMap {
        self.values
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model_type, &other.model_type) && self.values == other.values
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.model_type.name)?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Arc<ModelType> {
        ModelType::builder("Pair")
            .field("a", FieldType::Int)
            .field_with("b", FieldType::Str, FieldOptions::with_default("x"))
            .build()
            .unwrap()
    }

    #[test]
    fn private_names_are_not_fields() {
        let ty = ModelType::builder("M")
            .field("a", FieldType::Int)
            .field("_cache", FieldType::Any)
            .build()
            .unwrap();

        assert_eq!(ty.field_names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let err = ModelType::builder("M")
            .field("a", FieldType::Int)
            .field("a", FieldType::Str)
            .build()
            .unwrap_err();

        assert!(matches!(err, ModelError::DuplicateField { ref field, .. } if field == "a"));
    }

    #[test]
    fn forward_reference_to_self_resolves() {
        let ty = ModelType::builder("Node")
            .field("next", FieldType::optional(FieldType::forward("Node")))
            .build()
            .unwrap();

        assert!(matches!(
            ty.field("next").unwrap().field_type(),
            FieldType::Optional(inner) if matches!(**inner, FieldType::SelfRef)
        ));
    }

    #[test]
    fn forward_reference_to_unknown_fails() {
        let err = ModelType::builder("Node")
            .field("other", FieldType::forward("Missing"))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ModelError::UnresolvedReference { ref reference, .. } if reference == "Missing"
        ));
    }

    #[test]
    fn unknown_named_arguments_are_ignored() {
        let mut named = ValueMap::new();
        named.insert("a".into(), Value::Int(1));
        named.insert("zzz".into(), Value::Bool(true));

        let model = pair().construct(Vec::new(), named).unwrap();
        assert_eq!(model.len(), 2);
        assert!(!model.contains("zzz"));
    }

    #[test]
    fn from_json_requires_object() {
        let err = pair().from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { ref found, .. } if found == "list"));
    }

    #[test]
    fn from_json_str_reports_parse_errors() {
        let err = pair().from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn serializes_as_object() {
        let model = pair().construct(vec![Value::Int(2)], ValueMap::new()).unwrap();
        assert_eq!(serde_json::to_string(&model).unwrap(), r#"{"a":2,"b":"x"}"#);
    }
}
