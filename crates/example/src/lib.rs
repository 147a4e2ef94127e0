//! Example plugin host built with dynkit.
//!
//! The host wires the three dynkit components together:
//!
//! ```text
//! config JSON ──▶ HostConfig model ──▶ HostSettings ─┐
//!                                                    ▼
//! plugin tree ──▶ AttributeLoader ──▶ [Command] ──▶ DependencyLibrary::inject
//! ```
//!
//! 1. The configuration is validated by a `HostConfig` model (casts, defaults
//!    and a nested `Owner` model).
//! 2. Commands are discovered by loading `.plugins` relative to the caller's
//!    package from an in-memory module tree.
//! 3. Each command runs with its parameters injected from the library.

pub mod commands;
pub mod config;
pub mod logging;

use std::path::Path;

use dynkit_inject::prelude::*;
use dynkit_loader::prelude::*;
use dynkit_model::ModelError;
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::{ConfiguredGreeter, Greeter, InvocationLog};
use crate::config::HostSettings;

/// Errors surfaced by the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The configuration is invalid.
    #[error("configuration: {0}")]
    Config(#[from] ModelError),
    /// Plugin discovery failed.
    #[error("plugin discovery: {0}")]
    Loader(#[from] LoaderError),
    /// A command could not be injected.
    #[error("command: {0}")]
    Inject(#[from] InjectError),
    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Output of one host run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// The validated configuration, as JSON.
    pub config: serde_json::Value,
    /// `(command, output)` pairs in discovery order.
    pub results: Vec<(String, String)>,
    /// Commands recorded by the invocation log.
    pub invoked: Vec<String>,
}

/// Reads the configuration file, or returns the built-in configuration.
///
/// # Errors
///
/// Returns [`HostError::Io`] if the file cannot be read.
pub fn read_config(path: Option<&Path>) -> Result<String, HostError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(config::DEFAULT_CONFIG.to_string()),
    }
}

/// Validates `config_text`, discovers the plugin commands and runs them.
///
/// # Errors
///
/// Returns a [`HostError`] if any stage fails.
pub fn run(config_text: &str) -> Result<RunOutput, HostError> {
    let config_type = config::config_model()?;
    let (model, settings) = HostSettings::parse(&config_type, config_text)?;
    info!(host = %settings.name, "configuration loaded");

    let mut library = DependencyLibrary::new();
    library.insert(
        Dependency::new(ConfiguredGreeter::new(settings.greeting.clone()))
            .provides::<dyn Greeter>(|greeter| greeter),
    )?;
    library.add(settings)?;
    let log = library.add(InvocationLog::default())?;
    debug!(dependencies = ?library.type_names(), "dependency library ready");

    let mut stack = CallStack::new();
    let mut entry = stack.enter("app.main");
    let frame = entry.enter("host.run");
    let commands = commands::discover(commands::plugin_tree()?, &frame)?;

    let mut results = Vec::with_capacity(commands.len());
    for command in commands {
        let output = (command.run)(&library)?;
        info!(command = command.name, %output, "command finished");
        results.push((command.name.to_string(), output));
    }

    Ok(RunOutput {
        config: model.to_json(),
        results,
        invoked: log.entries(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_runs_all_commands() {
        let output = run(config::DEFAULT_CONFIG).unwrap();

        assert_eq!(
            output.results,
            vec![
                ("greet".to_string(), "hello, ada!".to_string()),
                ("status".to_string(), "demo-host is up (retries: 3)".to_string()),
            ]
        );
        assert_eq!(output.invoked, vec!["greet", "status"]);
        assert_eq!(output.config["retries"], serde_json::json!(3));
        assert_eq!(output.config["owner"]["name"], serde_json::json!("ada"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_config(Some(Path::new("/nonexistent/dynkit.json"))).unwrap_err();
        assert!(matches!(err, HostError::Io(_)));
        assert_eq!(read_config(None).unwrap(), config::DEFAULT_CONFIG);
    }

    #[test]
    fn invalid_configuration_stops_the_host() {
        let err = run(r#"{"name": "h", "retries": "many"}"#).unwrap_err();
        assert!(matches!(err, HostError::Config(ModelError::Cast { .. })));
    }
}
