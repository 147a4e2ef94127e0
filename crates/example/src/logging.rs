//! Log subscriber setup for the demo binary.
//!
//! The libraries only emit `tracing` events; installing a subscriber is up to
//! the embedding application. [`TracingConfig`] collects the settings and
//! [`TracingConfig::init`] installs a `tracing_subscriber` registry with an
//! [`EnvFilter`] and a formatting layer.
//!
//! ```
//! use example::logging::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! let config = TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("dynkit_loader=trace,dynkit_model=debug");
//! assert_eq!(config.format, TracingFormat::Compact);
//! ```

use core::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive string.
pub const LOG_ENV: &str = "DYNKIT_LOG";

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output.
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level used when no filter directive is set.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Filter directives (e.g. `dynkit_loader=debug`), overriding `level`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Creates the default configuration, taking filter directives from
    /// [`LOG_ENV`] when set.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(LOG_ENV) {
            Ok(filter) if !filter.trim().is_empty() => config.with_env_filter(filter),
            _ => config,
        }
    }

    /// Sets the fallback level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the filter. Invalid directives fall back to `level`.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber. Does nothing if one is already set.
    pub fn init(&self) {
        let registry = tracing_subscriber::registry().with(self.filter());

        // try_init fails only when a subscriber is already installed
        let _ = match self.format {
            TracingFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init(),
            TracingFormat::Compact => registry
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init(),
            TracingFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init(),
        };

        tracing::debug!(level = %self.level, format = ?self.format, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pretty_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, TracingFormat::Pretty);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn builder_setters() {
        let config = TracingConfig::default()
            .with_level(Level::TRACE)
            .with_format(TracingFormat::Json)
            .with_env_filter("dynkit_inject=debug");

        assert_eq!(config.level, Level::TRACE);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("dynkit_inject=debug"));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert_eq!("compact".parse::<TracingFormat>(), Ok(TracingFormat::Compact));
        assert!("xml".parse::<TracingFormat>().is_err());
    }
}
