//! # dynkit Internal Library
//!
//! Re-exports the core dynkit crates for convenience.

/// Module discovery and attribute loading.
pub use dynkit_loader;

/// Typed dependency library and injection.
pub use dynkit_inject;

/// Declarative value models.
pub use dynkit_model;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use dynkit_inject::prelude::*;
    pub use dynkit_loader::prelude::*;
    pub use dynkit_model::prelude::*;
}
