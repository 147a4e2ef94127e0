//! Explicit call-origin context.
//!
//! Rust has no portable way to ask which module a call originates from, so
//! callers record it themselves. A [`CallStack`] is a sequence of module
//! names, innermost frame first. Entering a module pushes a frame and returns
//! a [`FrameGuard`] that pops it again when dropped.
//!
//! ```
//! use dynkit_loader::stack::CallStack;
//!
//! let mut stack = CallStack::new();
//! let mut app = stack.enter("app.main");
//! let lib = app.enter("dynkit.loader");
//!
//! assert_eq!(lib.module_up(0).unwrap(), "dynkit.loader");
//! assert_eq!(lib.foreign_module(false).unwrap(), "app.main");
//! ```

use core::ops::{Deref, DerefMut};

use crate::error::LoaderError;

/// An explicit stack of originating module names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    // outermost first, so push/pop work at the end
    frames: Vec<String>,
}

impl CallStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from frames listed innermost first.
    #[must_use]
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        frames.reverse();
        Self { frames }
    }

    /// Pushes a frame for `module` and returns a guard that pops it on drop.
    pub fn enter(&mut self, module: impl Into<String>) -> FrameGuard<'_> {
        self.frames.push(module.into());
        FrameGuard { stack: self }
    }

    /// Iterates over the frames, innermost first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().rev().map(String::as_str)
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the first frame, innermost first, accepted by `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NoEligibleFrame`] if no frame is accepted.
    pub fn traverse<F>(&self, mut predicate: F) -> Result<&str, LoaderError>
    where
        F: FnMut(&str) -> bool,
    {
        self.iter()
            .find(|module| predicate(module))
            .ok_or(LoaderError::NoEligibleFrame)
    }

    /// Returns the module of the frame `amount` steps up the stack.
    ///
    /// `module_up(0)` is the innermost frame.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NoEligibleFrame`] if the stack is not that deep.
    pub fn module_up(&self, amount: usize) -> Result<&str, LoaderError> {
        self.iter().nth(amount).ok_or(LoaderError::NoEligibleFrame)
    }

    /// Returns the nearest frame that belongs to a different top-level
    /// package than the innermost frame.
    ///
    /// With `just_module` set, any frame naming a different module qualifies,
    /// including siblings in the same package.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NoForeignFrame`] if every frame belongs to the
    /// caller's package (or module).
    pub fn foreign_module(&self, just_module: bool) -> Result<&str, LoaderError> {
        let caller = self.module_up(0).map_err(|_| LoaderError::NoForeignFrame)?;
        let location = if just_module {
            caller
        } else {
            caller.split('.').next().unwrap_or(caller)
        };

        self.traverse(|module| {
            module != location && (just_module || !is_within(module, location))
        })
        .map_err(|_| LoaderError::NoForeignFrame)
    }
}

fn is_within(module: &str, package: &str) -> bool {
    module
        .strip_prefix(package)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Guard returned by [`CallStack::enter`].
///
/// Dereferences to the stack, so nested calls can enter further frames.
/// The frame is popped when the guard is dropped.
#[derive(Debug)]
pub struct FrameGuard<'a> {
    stack: &'a mut CallStack,
}

impl Deref for FrameGuard<'_> {
    type Target = CallStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_pops_frame_on_drop() {
        let mut stack = CallStack::new();
        {
            let mut outer = stack.enter("a");
            {
                let inner = outer.enter("b");
                assert_eq!(inner.iter().collect::<Vec<_>>(), vec!["b", "a"]);
            }
            assert_eq!(outer.len(), 1);
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn traverse_finds_first_match() {
        let stack = CallStack::from_frames(["pkg.inner", "pkg.outer", "app.main"]);

        assert_eq!(stack.traverse(|m| m.starts_with("app")).unwrap(), "app.main");
        assert!(matches!(
            stack.traverse(|m| m == "missing"),
            Err(LoaderError::NoEligibleFrame)
        ));
    }

    #[test]
    fn module_up_counts_from_innermost() {
        let stack = CallStack::from_frames(["c", "b", "a"]);

        assert_eq!(stack.module_up(0).unwrap(), "c");
        assert_eq!(stack.module_up(2).unwrap(), "a");
        assert!(matches!(stack.module_up(3), Err(LoaderError::NoEligibleFrame)));
    }

    #[test]
    fn foreign_module_skips_own_package() {
        let stack = CallStack::from_frames(["lib.loader", "lib.util", "lib", "app.main"]);

        assert_eq!(stack.foreign_module(false).unwrap(), "app.main");
        assert_eq!(stack.foreign_module(true).unwrap(), "lib.util");
    }

    #[test]
    fn foreign_module_does_not_match_prefix_packages() {
        // "library" is not inside "lib"
        let stack = CallStack::from_frames(["lib.loader", "library.main"]);

        assert_eq!(stack.foreign_module(false).unwrap(), "library.main");
    }

    #[test]
    fn foreign_module_missing() {
        let stack = CallStack::from_frames(["lib.a", "lib.b"]);
        assert!(matches!(
            stack.foreign_module(false),
            Err(LoaderError::NoForeignFrame)
        ));

        assert!(matches!(
            CallStack::new().foreign_module(true),
            Err(LoaderError::NoForeignFrame)
        ));
    }
}
