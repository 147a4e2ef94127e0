//! Commands discovered from the plugin module tree.
//!
//! Each plugin module exposes a [`Command`] attribute. Command bodies take
//! their collaborators from the [`DependencyLibrary`].

use std::sync::Arc;

use dynkit_inject::prelude::*;
use dynkit_inject::BoundArguments;
use dynkit_loader::prelude::*;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::HostSettings;

/// Produces greetings.
pub trait Greeter: Send + Sync {
    /// Greets `name`.
    fn greet(&self, name: &str) -> String;
}

/// Greets using the configured greeting.
#[derive(Debug)]
pub struct ConfiguredGreeter {
    greeting: String,
}

impl ConfiguredGreeter {
    /// Creates a greeter with the given greeting word.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
        }
    }
}

impl Greeter for ConfiguredGreeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {name}!", self.greeting)
    }
}

/// Counts command invocations.
#[derive(Debug, Default)]
pub struct InvocationLog {
    entries: Mutex<Vec<String>>,
}

impl InvocationLog {
    /// Records an invocation.
    pub fn record(&self, command: &str) {
        self.entries.lock().push(command.to_string());
    }

    /// Returns the recorded invocations.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command
// ─────────────────────────────────────────────────────────────────────────────

/// A runnable command exported by a plugin module.
#[derive(Clone, Copy)]
pub struct Command {
    /// Command name.
    pub name: &'static str,
    /// Command body.
    pub run: fn(&DependencyLibrary) -> Result<String, InjectError>,
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

fn greet(library: &DependencyLibrary) -> Result<String, InjectError> {
    library.inject(
        |greeter: Dep<dyn Greeter>, settings: Dep<HostSettings>, log: Option<Dep<InvocationLog>>| {
            if let Some(log) = log {
                log.record("greet");
            }
            let name = settings.owner.as_deref().unwrap_or(&settings.name);
            greeter.greet(name)
        },
    )
}

fn status(library: &DependencyLibrary) -> Result<String, InjectError> {
    let callable = DynamicCallable::new(
        Signature::new([
            Parameter::positional_only("settings").annotated::<HostSettings>(),
            Parameter::keyword_only("log")
                .annotated::<InvocationLog>()
                .with_default(),
        ]),
        |args: BoundArguments| {
            let settings = args.get::<HostSettings>("settings");
            if let Some(log) = args.get::<InvocationLog>("log") {
                log.record("status");
            }
            settings.map_or_else(
                || "no settings".to_string(),
                |s| format!("{} is up (retries: {})", s.name, s.retries),
            )
        },
    );
    library.inject_dynamic(&callable)
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the demo module tree:
///
/// ```text
/// app
/// ├── main
/// └── plugins
///     ├── greet      (COMMAND)
///     ├── status     (COMMAND)
///     └── _draft     (private, never visited)
/// ```
///
/// # Errors
///
/// Returns a [`LoaderError`] if a module cannot be inserted.
pub fn plugin_tree() -> Result<ModuleTree, LoaderError> {
    let mut tree = ModuleTree::new();
    tree.insert(Module::container("app"))?;
    tree.insert(Module::leaf("app.main").with_attribute("VERSION", "0.0.1"))?;
    tree.insert(Module::container("app.plugins"))?;
    tree.insert(Module::leaf("app.plugins.greet").with_attribute(
        "COMMAND",
        Command {
            name: "greet",
            run: greet,
        },
    ))?;
    tree.insert(
        Module::leaf("app.plugins.status")
            .with_attribute(
                "COMMAND",
                Command {
                    name: "status",
                    run: status,
                },
            )
            .with_attribute("_helper", "ignored"),
    )?;
    tree.insert(Module::leaf("app.plugins._draft").with_attribute(
        "COMMAND",
        Command {
            name: "draft",
            run: |_| Ok(String::new()),
        },
    ))?;
    Ok(tree)
}

/// Collects every [`Command`] below `.plugins`, relative to the package of
/// the first caller outside `host`.
///
/// # Errors
///
/// Returns a [`LoaderError`] if the stack has no foreign frame or the
/// plugins package cannot be loaded.
pub fn discover(tree: ModuleTree, stack: &CallStack) -> Result<Vec<Command>, LoaderError> {
    let found = Arc::new(Mutex::new(Vec::new()));

    let mut loader = AttributeLoader::new(tree);
    let sink = Arc::clone(&found);
    loader.register_type::<Command>(move |_, command| {
        sink.lock().push(*command);
        Ok(())
    });

    let report = loader.load_from(stack, ".plugins", Depth::Unbounded)?;
    debug!(
        modules = ?report.modules,
        attributes = report.attributes,
        "plugin discovery finished"
    );

    let commands = found.lock().clone();
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> DependencyLibrary {
        let mut library = DependencyLibrary::new();
        library
            .add(HostSettings {
                name: "host".into(),
                greeting: "hi".into(),
                retries: 2,
                owner: None,
            })
            .unwrap();
        library
            .insert(Dependency::new(ConfiguredGreeter::new("hi")).provides::<dyn Greeter>(|g| g))
            .unwrap();
        library
    }

    #[test]
    fn discovery_skips_private_modules() {
        let stack = CallStack::from_frames(["host.run", "app.main"]);
        let commands = discover(plugin_tree().unwrap(), &stack).unwrap();

        let names: Vec<_> = commands.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["greet", "status"]);
    }

    #[test]
    fn discovery_needs_foreign_caller() {
        let stack = CallStack::from_frames(["host.run", "host.main"]);
        let err = discover(plugin_tree().unwrap(), &stack).unwrap_err();
        assert!(matches!(err, LoaderError::NoForeignFrame));
    }

    #[test]
    fn commands_use_injected_dependencies() {
        let library = library();

        assert_eq!(greet(&library).unwrap(), "hi, host!");
        assert_eq!(status(&library).unwrap(), "host is up (retries: 2)");
    }

    #[test]
    fn optional_log_records_when_present() {
        let mut library = library();
        let log = library.add(InvocationLog::default()).unwrap();

        greet(&library).unwrap();
        status(&library).unwrap();

        assert_eq!(log.entries(), vec!["greet", "status"]);
    }
}
