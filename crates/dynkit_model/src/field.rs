//! Field descriptors: declared types, per-field options and processing.
//!
//! A field is declared with a [`FieldType`] and [`FieldOptions`]. When a model
//! type is defined, each declaration becomes an immutable [`FieldMetadata`]
//! owned by the model type. Construction runs every field's
//! [`process`](FieldMetadata::process) in declaration order:
//!
//! 1. take the supplied value, or the configured default
//! 2. non-strict fields accept the value as is
//! 3. strict fields type-check it; on mismatch a mapping is built into a
//!    nested model if exactly one model type is eligible, else the cast
//!    function is applied, else the field fails with a type mismatch

use core::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{CastError, ModelError};
use crate::model::ModelType;
use crate::value::{Value, ValueMap};

// ─────────────────────────────────────────────────────────────────────────────
// FieldType
// ─────────────────────────────────────────────────────────────────────────────

/// The declared shape of a field.
#[derive(Clone)]
pub enum FieldType {
    /// Accepts every value.
    Any,
    /// Accepts only `null`.
    Null,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// A float; integers are accepted too.
    Float,
    /// A string.
    Str,
    /// `null` or the inner type.
    Optional(Box<FieldType>),
    /// Any of the branches.
    Union(Vec<FieldType>),
    /// A list whose items all have the inner type.
    List(Box<FieldType>),
    /// A string-keyed map whose values all have the inner type.
    Map(Box<FieldType>),
    /// An instance of exactly this model type.
    Model(Arc<ModelType>),
    /// A model referenced by name, resolved when the owning type is defined.
    Forward(String),
    /// An instance of the owning model type.
    SelfRef,
}

impl FieldType {
    /// Creates an [`Optional`](Self::Optional) type.
    #[must_use]
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Creates a [`Union`](Self::Union) type.
    #[must_use]
    pub fn union(branches: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Union(branches.into_iter().collect())
    }

    /// Creates a [`List`](Self::List) type.
    #[must_use]
    pub fn list(item: FieldType) -> Self {
        Self::List(Box::new(item))
    }

    /// Creates a [`Map`](Self::Map) type.
    #[must_use]
    pub fn map(value: FieldType) -> Self {
        Self::Map(Box::new(value))
    }

    /// Creates a [`Model`](Self::Model) type.
    #[must_use]
    pub fn model(model_type: &Arc<ModelType>) -> Self {
        Self::Model(Arc::clone(model_type))
    }

    /// Creates a [`Forward`](Self::Forward) reference.
    #[must_use]
    pub fn forward(name: impl Into<String>) -> Self {
        Self::Forward(name.into())
    }

    /// Returns `true` if `value` has this type. `owner` stands in for
    /// [`SelfRef`](Self::SelfRef).
    #[must_use]
    pub fn check(&self, value: &Value, owner: &ModelType) -> bool {
        match (self, value) {
            (FieldType::Any, _)
            | (FieldType::Null, Value::Null)
            | (FieldType::Bool, Value::Bool(_))
            | (FieldType::Int, Value::Int(_))
            | (FieldType::Float, Value::Float(_) | Value::Int(_))
            | (FieldType::Str, Value::Str(_))
            | (FieldType::Optional(_), Value::Null) => true,
            (FieldType::Optional(inner), _) => inner.check(value, owner),
            (FieldType::Union(branches), _) => {
                branches.iter().any(|branch| branch.check(value, owner))
            }
            (FieldType::List(item), Value::List(items)) => {
                items.iter().all(|v| item.check(v, owner))
            }
            (FieldType::Map(inner), Value::Map(map)) => {
                map.values().all(|v| inner.check(v, owner))
            }
            (FieldType::Model(expected), Value::Model(model)) => {
                core::ptr::eq(model.model_type().as_ref(), expected.as_ref())
            }
            (FieldType::SelfRef, Value::Model(model)) => {
                core::ptr::eq(model.model_type().as_ref(), owner)
            }
            _ => false,
        }
    }

    /// Collects the model types able to build this field from a mapping:
    /// the type itself, or the branches of an optional or union type.
    fn factories(&self, owner: &Arc<ModelType>, out: &mut Vec<Arc<ModelType>>) {
        match self {
            FieldType::Model(model_type) => out.push(Arc::clone(model_type)),
            FieldType::SelfRef => out.push(Arc::clone(owner)),
            FieldType::Optional(inner) => inner.factories(owner, out),
            FieldType::Union(branches) => {
                for branch in branches {
                    branch.factories(owner, out);
                }
            }
            _ => {}
        }
    }

    /// Replaces forward references. `lookup` returns `None` for unknown names
    /// and `Some(None)` for the owning model itself.
    pub(crate) fn resolve(
        self,
        lookup: &dyn Fn(&str) -> Option<Option<Arc<ModelType>>>,
    ) -> Result<FieldType, String> {
        Ok(match self {
            FieldType::Forward(name) => match lookup(&name) {
                Some(Some(model_type)) => FieldType::Model(model_type),
                Some(None) => FieldType::SelfRef,
                None => return Err(name),
            },
            FieldType::Optional(inner) => FieldType::Optional(Box::new(inner.resolve(lookup)?)),
            FieldType::Union(branches) => FieldType::Union(
                branches
                    .into_iter()
                    .map(|branch| branch.resolve(lookup))
                    .collect::<Result<_, _>>()?,
            ),
            FieldType::List(item) => FieldType::List(Box::new(item.resolve(lookup)?)),
            FieldType::Map(inner) => FieldType::Map(Box::new(inner.resolve(lookup)?)),
            other => other,
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => f.write_str("any"),
            FieldType::Null => f.write_str("null"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int => f.write_str("int"),
            FieldType::Float => f.write_str("float"),
            FieldType::Str => f.write_str("str"),
            FieldType::Optional(inner) => write!(f, "Optional[{inner}]"),
            FieldType::Union(branches) => {
                f.write_str("Union[")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{branch}")?;
                }
                f.write_str("]")
            }
            FieldType::List(item) => write!(f, "List[{item}]"),
            FieldType::Map(inner) => write!(f, "Map[str, {inner}]"),
            FieldType::Model(model_type) => f.write_str(model_type.name()),
            FieldType::Forward(name) => write!(f, "'{name}'"),
            FieldType::SelfRef => f.write_str("Self"),
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldType({self})")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldOptions
// ─────────────────────────────────────────────────────────────────────────────

/// A cast function applied when a strict field's value has the wrong type.
pub type CastFn = Arc<dyn Fn(Value) -> Result<Value, CastError> + Send + Sync>;

/// Per-field configuration.
#[derive(Clone)]
pub struct FieldOptions {
    default: Value,
    strict: bool,
    cast: Option<CastFn>,
}

/// Starts a field configuration: default `null`, strict, no cast.
///
/// ```
/// use dynkit_model::{casts, field};
///
/// let options = field().default(0_i64).cast(casts::to_int);
/// assert!(options.is_strict());
/// ```
#[must_use]
pub fn field() -> FieldOptions {
    <FieldOptions as Default>::default()
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            default: Value::Null,
            strict: true,
            cast: None,
        }
    }
}

impl FieldOptions {
    /// Options holding only a plain default value.
    #[must_use]
    pub fn with_default(value: impl Into<Value>) -> Self {
        field().default(value)
    }

    /// Builder pattern: sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Builder pattern: sets whether type mismatches are fatal.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder pattern: sets the cast function.
    #[must_use]
    pub fn cast(
        mut self,
        cast: impl Fn(Value) -> Result<Value, CastError> + Send + Sync + 'static,
    ) -> Self {
        self.cast = Some(Arc::new(cast));
        self
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns `true` if type mismatches are fatal.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns `true` if a cast function is configured.
    #[must_use]
    pub fn has_cast(&self) -> bool {
        self.cast.is_some()
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("default", &self.default)
            .field("strict", &self.strict)
            .field("cast", &self.cast.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldMetadata
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved field of a model type.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    name: String,
    qualified_name: String,
    field_type: FieldType,
    options: FieldOptions,
}

impl FieldMetadata {
    pub(crate) fn new(
        model: &str,
        name: String,
        field_type: FieldType,
        options: FieldOptions,
    ) -> Self {
        Self {
            qualified_name: format!("{model}.{name}"),
            name,
            field_type,
            options,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `Model.field`.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Returns the resolved field type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns the field options.
    #[must_use]
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Produces the field's value from the merged construction arguments.
    ///
    /// The value is removed from `values`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Configuration`] if a mapping could build more than one
    ///   model type
    /// - [`ModelError::Cast`] if the cast function fails
    /// - [`ModelError::TypeMismatch`] if the value has the wrong type and
    ///   cannot be converted
    /// - any error of a nested model construction
    pub fn process(
        &self,
        values: &mut ValueMap,
        owner: &Arc<ModelType>,
    ) -> Result<Value, ModelError> {
        let value = values
            .shift_remove(&self.name)
            .unwrap_or_else(|| self.options.default.clone());

        if !self.options.strict || self.field_type.check(&value, owner) {
            return Ok(value);
        }

        let value = match value {
            Value::Map(map) => match self.factory(owner)? {
                Some(factory) => {
                    trace!(
                        field = %self.qualified_name,
                        model = factory.name(),
                        "constructing nested model"
                    );
                    return factory.from_dict(map).map(Value::from);
                }
                None => Value::Map(map),
            },
            other => other,
        };

        if let Some(cast) = &self.options.cast {
            trace!(field = %self.qualified_name, from = value.type_name(), "applying cast");
            return cast(value).map_err(|source| ModelError::Cast {
                field: self.qualified_name.clone(),
                source,
            });
        }

        Err(ModelError::type_mismatch(
            &self.qualified_name,
            self.field_type.to_string(),
            value.type_name(),
        ))
    }

    fn factory(&self, owner: &Arc<ModelType>) -> Result<Option<Arc<ModelType>>, ModelError> {
        let mut factories = Vec::new();
        self.field_type.factories(owner, &mut factories);
        if factories.len() > 1 {
            let candidates: Vec<&str> = factories.iter().map(|f| f.name()).collect();
            return Err(ModelError::Configuration {
                field: self.qualified_name.clone(),
                candidates: candidates.join(", "),
            });
        }
        Ok(factories.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_owner() -> Arc<ModelType> {
        ModelType::builder("Owner").build().unwrap()
    }

    #[test]
    fn primitive_checks() {
        let owner = empty_owner();

        assert!(FieldType::Int.check(&Value::Int(1), &owner));
        assert!(!FieldType::Int.check(&Value::Bool(true), &owner));
        assert!(FieldType::Float.check(&Value::Int(1), &owner));
        assert!(!FieldType::Str.check(&Value::Int(1), &owner));
        assert!(FieldType::Any.check(&Value::Null, &owner));
    }

    #[test]
    fn container_checks() {
        let owner = empty_owner();
        let ints = FieldType::list(FieldType::Int);

        assert!(ints.check(&Value::List(vec![Value::Int(1), Value::Int(2)]), &owner));
        assert!(!ints.check(&Value::List(vec![Value::Int(1), Value::from("x")]), &owner));

        let optional = FieldType::optional(FieldType::Str);
        assert!(optional.check(&Value::Null, &owner));
        assert!(optional.check(&Value::from("x"), &owner));

        let union = FieldType::union([FieldType::Int, FieldType::Str]);
        assert!(union.check(&Value::from("x"), &owner));
        assert!(!union.check(&Value::Bool(false), &owner));
    }

    #[test]
    fn display_names() {
        let ty = FieldType::optional(FieldType::union([
            FieldType::list(FieldType::Int),
            FieldType::map(FieldType::Str),
            FieldType::SelfRef,
        ]));
        assert_eq!(ty.to_string(), "Optional[Union[List[int], Map[str, str], Self]]");
    }

    #[test]
    fn non_strict_accepts_anything() {
        let owner = empty_owner();
        let meta = FieldMetadata::new("M", "n".into(), FieldType::Int, field().strict(false));
        let mut values = ValueMap::new();
        values.insert("n".into(), Value::from("text"));

        assert_eq!(meta.process(&mut values, &owner).unwrap(), Value::from("text"));
        assert!(values.is_empty());
    }

    #[test]
    fn missing_value_uses_default() {
        let owner = empty_owner();
        let meta = FieldMetadata::new(
            "M",
            "n".into(),
            FieldType::Int,
            FieldOptions::with_default(7_i64),
        );

        assert_eq!(
            meta.process(&mut ValueMap::new(), &owner).unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn mismatch_names_qualified_field() {
        let owner = empty_owner();
        let meta = FieldMetadata::new("M", "n".into(), FieldType::Int, field());
        let mut values = ValueMap::new();
        values.insert("n".into(), Value::from("5"));

        let err = meta.process(&mut values, &owner).unwrap_err();
        let ModelError::TypeMismatch { field, found, .. } = err else {
            panic!("expected a type mismatch");
        };
        assert_eq!(field, "M.n");
        assert_eq!(found, "str");
    }
}
