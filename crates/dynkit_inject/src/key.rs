//! Runtime type keys.

use core::any::TypeId;
use core::fmt;

/// Identifies a type at runtime: its [`TypeId`] plus its name for messages.
///
/// Works for unsized types too, so `TypeKey::of::<dyn Trait>()` names a
/// trait-object view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Creates the key for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this key is for `T`.
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Returns `true` if `T` is a type handle rather than an instance type.
pub(crate) fn is_type_handle<T: ?Sized + 'static>() -> bool {
    TypeKey::of::<T>().is::<TypeKey>() || TypeKey::of::<T>().is::<TypeId>()
}
