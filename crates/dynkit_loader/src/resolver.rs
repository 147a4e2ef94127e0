//! The module resolution capability consumed by the loader.
//!
//! [`ModuleResolver`] is the seam between the loader and whatever owns the
//! module namespace. [`ModuleTree`](crate::module::ModuleTree) is the bundled
//! in-memory implementation; embedding applications may supply their own.
//!
//! # Relative Names
//!
//! Names starting with dots are relative to a package. One leading dot means
//! the package itself, each further dot climbs one level:
//!
//! | Name | Package | Result |
//! |------|---------|--------|
//! | `.cmd` | `app.plugins` | `app.plugins.cmd` |
//! | `..cmd` | `app.plugins` | `app.cmd` |
//! | `..` | `app.plugins` | `app` |

use crate::error::LoaderError;
use crate::module::{ModuleHandle, ModuleSpec};

/// Resolves names to module handles and enumerates children.
pub trait ModuleResolver {
    /// Resolves `name`, optionally relative to the package `relative_to`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::ModuleNotFound`] if no such module exists, or
    /// [`LoaderError::InvalidRelativeName`] if a relative name cannot be
    /// resolved against `relative_to`.
    fn resolve(&self, name: &str, relative_to: Option<&str>) -> Result<ModuleHandle, LoaderError>;

    /// Returns `true` if the handle is a container (package).
    fn is_container(&self, handle: &ModuleHandle) -> bool {
        handle.is_container()
    }

    /// Lists the direct children of a container.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NotAContainer`] if the handle is a leaf.
    fn children(&self, handle: &ModuleHandle) -> Result<Vec<ModuleSpec>, LoaderError>;
}

/// Resolves a possibly relative module name into an absolute one.
///
/// # Errors
///
/// Returns [`LoaderError::InvalidRelativeName`] if `name` is relative and no
/// package is given, or if it climbs beyond the top-level package.
pub fn resolve_name(name: &str, package: Option<&str>) -> Result<String, LoaderError> {
    if !name.starts_with('.') {
        return Ok(name.to_string());
    }

    let package = match package {
        Some(package) if !package.is_empty() => package,
        _ => {
            return Err(LoaderError::invalid_relative_name(
                name,
                "a package is required for relative module names",
            ));
        }
    };

    let level = name.chars().take_while(|c| *c == '.').count();
    let rest = &name[level..];

    let bits: Vec<&str> = package.rsplitn(level, '.').collect();
    if bits.len() < level {
        return Err(LoaderError::invalid_relative_name(
            name,
            "attempted relative import beyond top-level package",
        ));
    }

    // rsplitn yields the remaining prefix last
    let base = bits[bits.len() - 1];
    if rest.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}.{rest}"))
    }
}

/// Returns the name of the package containing `module`.
///
/// # Errors
///
/// Returns [`LoaderError::NoParent`] if `module` is a top-level module.
pub fn parent_name(module: &str) -> Result<String, LoaderError> {
    resolve_name("..", Some(module)).map_err(|_| LoaderError::NoParent(module.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_names_pass_through() {
        assert_eq!(resolve_name("app.cmd", None).unwrap(), "app.cmd");
        assert_eq!(resolve_name("app.cmd", Some("other")).unwrap(), "app.cmd");
    }

    #[test]
    fn single_dot_is_the_package() {
        assert_eq!(
            resolve_name(".cmd", Some("app.plugins")).unwrap(),
            "app.plugins.cmd"
        );
        assert_eq!(resolve_name(".", Some("app.plugins")).unwrap(), "app.plugins");
    }

    #[test]
    fn extra_dots_climb() {
        assert_eq!(resolve_name("..cmd", Some("app.plugins")).unwrap(), "app.cmd");
        assert_eq!(resolve_name("...x", Some("a.b.c")).unwrap(), "a.x");
    }

    #[test]
    fn climbing_past_top_level_fails() {
        let result = resolve_name("...cmd", Some("app.plugins"));
        assert!(matches!(result, Err(LoaderError::InvalidRelativeName { .. })));
    }

    #[test]
    fn relative_without_package_fails() {
        assert!(matches!(
            resolve_name(".cmd", None),
            Err(LoaderError::InvalidRelativeName { .. })
        ));
        assert!(matches!(
            resolve_name(".cmd", Some("")),
            Err(LoaderError::InvalidRelativeName { .. })
        ));
    }

    #[test]
    fn parent_names() {
        assert_eq!(parent_name("a.b.c").unwrap(), "a.b");
        assert_eq!(parent_name("a.b").unwrap(), "a");
        assert!(matches!(parent_name("a"), Err(LoaderError::NoParent(name)) if name == "a"));
    }
}
