//! Runtime-described callables.
//!
//! Functions whose parameters are only known at runtime (plugins, scripted
//! handlers) describe themselves with a [`Signature`]. The library resolves
//! each annotated [`Parameter`], collects the values into [`Arguments`] and
//! binds them with [`Signature::bind`] before calling the body.

use core::fmt;

use crate::error::BindError;
use crate::key::TypeKey;
use crate::library::Resolved;

/// How a parameter accepts its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Only by position.
    PositionalOnly,
    /// By position or by name.
    PositionalOrKeyword,
    /// Only by name.
    KeywordOnly,
}

/// A declared parameter of a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    annotation: Option<TypeKey>,
    has_default: bool,
}

impl Parameter {
    /// Creates a positional-or-keyword parameter without annotation or default.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            annotation: None,
            has_default: false,
        }
    }

    /// Creates a positional-only parameter.
    #[must_use]
    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(ParamKind::PositionalOnly)
    }

    /// Creates a keyword-only parameter.
    #[must_use]
    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(ParamKind::KeywordOnly)
    }

    /// Builder pattern: sets the parameter kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder pattern: annotates the parameter with `T`.
    #[must_use]
    pub fn annotated<T: ?Sized + 'static>(self) -> Self {
        self.with_annotation(TypeKey::of::<T>())
    }

    /// Builder pattern: sets the annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: TypeKey) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Builder pattern: marks the parameter as having a default value.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter kind.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns the annotation, if declared.
    #[must_use]
    pub fn annotation(&self) -> Option<TypeKey> {
        self.annotation
    }

    /// Returns `true` if the callable supplies a default for this parameter.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.has_default
    }

    fn accepts_positional(&self) -> bool {
        self.kind != ParamKind::KeywordOnly
    }
}

/// Arguments collected for a call, before binding.
///
/// Positional arguments remember which parameter they were resolved for, so
/// binding can detect when an omitted positional-only parameter would shift
/// them into the wrong slot.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positional: Vec<(String, Resolved)>,
    named: Vec<(String, Resolved)>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument resolved for `parameter`.
    pub fn push_positional(&mut self, parameter: impl Into<String>, value: Resolved) {
        self.positional.push((parameter.into(), value));
    }

    /// Appends a named argument.
    pub fn push_named(&mut self, name: impl Into<String>, value: Resolved) {
        self.named.push((name.into(), value));
    }

    /// Returns the total number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arguments bound to parameters, in signature order.
#[derive(Debug, Clone, Default)]
pub struct BoundArguments {
    values: Vec<(String, Resolved)>,
}

impl BoundArguments {
    /// Returns the value bound to `name` as `Arc<T>`.
    ///
    /// `None` if the parameter was left to its default or resolved as a
    /// different type.
    #[must_use]
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<std::sync::Arc<T>> {
        self.resolved(name).and_then(Resolved::downcast::<T>)
    }

    /// Returns the type-erased value bound to `name`.
    #[must_use]
    pub fn resolved(&self, name: &str) -> Option<&Resolved> {
        self.values
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// Returns `true` if a value is bound to `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolved(name).is_some()
    }

    /// Returns the bound parameter names in signature order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The ordered parameter list of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    /// Creates a signature from parameters in declaration order.
    #[must_use]
    pub fn new(parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Builder pattern: appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Binds arguments to parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if there are too many positional arguments, a
    /// positional argument lands in another parameter's slot, a name is
    /// unknown, positional-only or given twice, or a parameter without
    /// default receives nothing.
    pub fn bind(&self, arguments: Arguments) -> Result<BoundArguments, BindError> {
        let Arguments { positional, named } = arguments;
        let mut slots: Vec<Option<Resolved>> = vec![None; self.parameters.len()];

        let positional_params: Vec<usize> = self
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, parameter)| parameter.accepts_positional())
            .map(|(index, _)| index)
            .collect();

        if positional.len() > positional_params.len() {
            return Err(BindError::TooManyPositional {
                expected: positional_params.len(),
                given: positional.len(),
            });
        }

        for ((argument, value), &index) in positional.into_iter().zip(&positional_params) {
            let parameter = &self.parameters[index];
            if parameter.name != argument {
                return Err(BindError::PositionalGap {
                    parameter: parameter.name.clone(),
                    argument,
                });
            }
            slots[index] = Some(value);
        }

        for (name, value) in named {
            let Some(index) = self.parameters.iter().position(|p| p.name == name) else {
                return Err(BindError::UnknownParameter(name));
            };
            if self.parameters[index].kind == ParamKind::PositionalOnly {
                return Err(BindError::PositionalOnlyByName(name));
            }
            if slots[index].is_some() {
                return Err(BindError::DuplicateArgument(name));
            }
            slots[index] = Some(value);
        }

        let mut values = Vec::new();
        for (parameter, slot) in self.parameters.iter().zip(slots) {
            match slot {
                Some(value) => values.push((parameter.name.clone(), value)),
                None if parameter.has_default => {}
                None => return Err(BindError::MissingArgument(parameter.name.clone())),
            }
        }

        Ok(BoundArguments { values })
    }
}

/// A callable described at runtime by its [`Signature`].
pub struct DynamicCallable<R> {
    signature: Signature,
    body: Box<dyn Fn(BoundArguments) -> R + Send + Sync>,
}

impl<R> DynamicCallable<R> {
    /// Creates a callable from a signature and a body.
    pub fn new(
        signature: Signature,
        body: impl Fn(BoundArguments) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            body: Box::new(body),
        }
    }

    /// Returns the signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the body with already bound arguments.
    pub fn call(&self, arguments: BoundArguments) -> R {
        (self.body)(arguments)
    }
}

impl<R> fmt::Debug for DynamicCallable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicCallable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DependencyLibrary;

    fn resolved(value: u32) -> Resolved {
        let mut library = DependencyLibrary::new();
        library.add(value).unwrap();
        library.get_by_key(TypeKey::of::<u32>()).unwrap()
    }

    fn signature() -> Signature {
        Signature::new([
            Parameter::positional_only("a"),
            Parameter::new("b").with_default(),
            Parameter::keyword_only("c"),
        ])
    }

    #[test]
    fn binds_positional_and_named() {
        let mut arguments = Arguments::new();
        arguments.push_positional("a", resolved(1));
        arguments.push_named("c", resolved(3));

        let bound = signature().bind(arguments).unwrap();
        assert_eq!(bound.names(), vec!["a", "c"]);
        assert_eq!(*bound.get::<u32>("c").unwrap(), 3);
        assert!(!bound.contains("b"));
        assert!(bound.get::<String>("a").is_none());
    }

    #[test]
    fn missing_required_argument() {
        let mut arguments = Arguments::new();
        arguments.push_positional("a", resolved(1));

        let err = signature().bind(arguments).unwrap_err();
        assert_eq!(err, BindError::MissingArgument("c".into()));
    }

    #[test]
    fn positional_gap_is_rejected() {
        let signature = Signature::new([
            Parameter::positional_only("a").with_default(),
            Parameter::positional_only("b"),
        ]);
        let mut arguments = Arguments::new();
        arguments.push_positional("b", resolved(2));

        let err = signature.bind(arguments).unwrap_err();
        assert_eq!(
            err,
            BindError::PositionalGap {
                parameter: "a".into(),
                argument: "b".into(),
            }
        );
    }

    #[test]
    fn named_errors() {
        let mut unknown = Arguments::new();
        unknown.push_named("zzz", resolved(0));
        assert_eq!(
            signature().bind(unknown).unwrap_err(),
            BindError::UnknownParameter("zzz".into())
        );

        let mut by_name = Arguments::new();
        by_name.push_named("a", resolved(0));
        assert_eq!(
            signature().bind(by_name).unwrap_err(),
            BindError::PositionalOnlyByName("a".into())
        );

        let mut twice = Arguments::new();
        twice.push_named("c", resolved(0));
        twice.push_named("c", resolved(1));
        assert_eq!(
            Signature::new([Parameter::keyword_only("c")])
                .bind(twice)
                .unwrap_err(),
            BindError::DuplicateArgument("c".into())
        );
    }

    #[test]
    fn too_many_positional() {
        let mut arguments = Arguments::new();
        arguments.push_positional("a", resolved(0));
        arguments.push_positional("b", resolved(0));
        arguments.push_positional("c", resolved(0));

        assert_eq!(
            signature().bind(arguments).unwrap_err(),
            BindError::TooManyPositional {
                expected: 2,
                given: 3,
            }
        );
    }
}
