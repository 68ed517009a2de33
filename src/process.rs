//! Process-wide initialization followed by the entry point.

use tracing::{error, info};

use crate::config::Config;
use crate::error::Fatal;
use crate::runtime::Runtime;
use crate::Result;

type Initializer = Box<dyn FnOnce(&mut Runtime) -> Result<()>>;

/// A program: an ordered init phase, then `main`.
///
/// A payload escaping an initializer is treated exactly like one escaping
/// the entry point: fatal, and `main` never runs.
///
/// ```
/// use raise_this::{Process, Fatal, Result, Runtime};
///
/// fn global_init(rt: &mut Runtime) -> Result<()> {
///     Err(rt.raise(0))
/// }
///
/// let result = Process::new()
///     .init("global_init", global_init)
///     .run("main", |_| Ok(0));
///
/// assert!(matches!(result, Err(Fatal::Init { name: "global_init", .. })));
/// ```
pub struct Process {
    config: Config,
    initializers: Vec<(&'static str, Initializer)>,
}

impl Default for Process {
    fn default() -> Self {
        Self::new()
    }
}

impl Process {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            initializers: Vec::new(),
        }
    }

    /// Add an initializer. They run in the order added, each in its own frame.
    pub fn init(
        mut self,
        name: &'static str,
        f: impl FnOnce(&mut Runtime) -> Result<()> + 'static,
    ) -> Self {
        self.initializers.push((name, Box::new(f)));
        self
    }

    /// Run the init phase, then `main` as entry point `entry`.
    pub fn run<T>(
        self,
        entry: &'static str,
        main: impl FnOnce(&mut Runtime) -> Result<T>,
    ) -> core::result::Result<T, Fatal> {
        let mut rt = Runtime::with_config(self.config);

        for (name, init) in self.initializers {
            if let Err(raised) = rt.call(name, init) {
                error!(raise = %raised.id(), initializer = name, payload = %raised.payload(), "uncaught during init");
                return Err(Fatal::Init { name, raised });
            }
        }

        rt.entry(entry, main)
    }
}

impl core::fmt::Debug for Process {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<_> = self.initializers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("Process")
            .field("config", &self.config)
            .field("initializers", &names)
            .finish()
    }
}

/// Abnormal termination for a fatal result; passes a success through.
///
/// Logs the payload and its trail, then aborts. Nothing downstream runs.
pub fn terminate_on_fatal<T>(result: core::result::Result<T, Fatal>) -> T {
    match result {
        Ok(value) => value,
        Err(fatal) => {
            error!("{}", fatal);
            error!("{}", fatal.raised());
            info!("terminating");
            std::process::abort()
        }
    }
}
