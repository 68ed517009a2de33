//! The raise/propagate engine.

use tracing::{debug, error, trace};

use crate::config::Config;
use crate::error::Fatal;
use crate::frame::{CallStack, Frame, Resource};
use crate::payload::Payload;
use crate::raised::{Hop, RaiseId, Raised, Site};
use crate::region::{ActiveRegion, Guarded, RegionId};
use crate::Result;

/// Single-threaded engine: the call stack, the regions whose bodies are
/// running, and the identity counters.
///
/// Failures travel as `Err(Raised)`. Every [`call`](Self::call) pops its frame
/// on the way out, so by the time a clause sees a payload every frame between
/// the raise and the region is gone and its resources are released.
#[derive(Debug)]
pub struct Runtime {
    config: Config,
    stack: CallStack,
    regions: Vec<ActiveRegion>,
    next_raise: u64,
    next_region: u64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            stack: CallStack::new(config.root_name),
            config,
            regions: Vec::new(),
            next_raise: 0,
            next_region: 0,
        }
    }

    // ========================================================
    // Frames
    // ========================================================

    /// Run `f` in a new frame named `name`.
    ///
    /// The frame is popped and its resources released newest first whether
    /// `f` returns or raises.
    pub fn call<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Runtime) -> Result<T>,
    ) -> Result<T> {
        self.stack.push(name);
        let depth = self.stack.depth();
        let result = f(self);

        let mut released = 0;
        while self.stack.depth() >= depth {
            released += self.stack.pop();
        }

        match result {
            Ok(value) => Ok(value),
            Err(mut raised) => {
                debug!(raise = %raised.id(), function = name, released, "unwound");
                raised.record(Hop::Unwound { function: name, released });
                Err(raised)
            }
        }
    }

    /// Register a scoped resource on the current frame.
    ///
    /// Inside a guarded body it belongs to that region and is released when
    /// the region's body ends.
    pub fn defer(&mut self, label: &'static str, release: impl FnOnce() + 'static) {
        trace!(function = self.stack.current_name(), resource = label, "defer");
        self.stack.defer(Resource::new(label, release));
    }

    // ========================================================
    // Raising
    // ========================================================

    /// Start a failure carrying `payload` from the current frame.
    ///
    /// Returns the in-flight value; the caller hands it straight to `Err`
    /// (see [`raise!`](crate::raise)).
    #[track_caller]
    pub fn raise(&mut self, payload: impl Into<Payload>) -> Raised {
        let payload = payload.into();
        self.next_raise += 1;
        let raised = Raised::new(
            RaiseId(self.next_raise),
            payload,
            self.stack.current_name(),
            Site::caller(),
            self.config.hop_limit,
        );
        debug!(
            raise = %raised.id(),
            %payload,
            function = raised.origin(),
            site = %raised.site(),
            "raise"
        );
        raised
    }

    // ========================================================
    // Regions
    // ========================================================

    /// Run `body` as a guarded region and return its clause dispatcher.
    ///
    /// Before any clause runs, resources acquired inside the body are
    /// released and the region leaves the active set, so a clause that
    /// raises or rethrows is never offered to its own region again.
    #[track_caller]
    pub fn guard<T>(&mut self, body: impl FnOnce(&mut Runtime) -> Result<T>) -> Guarded<'_, T> {
        self.next_region += 1;
        let id = RegionId(self.next_region);
        let mark = self.stack.mark();
        self.regions.push(ActiveRegion {
            id,
            frame_depth: mark.depth(),
            site: Site::caller(),
        });
        trace!(region = %id, function = self.stack.current_name(), "enter region");

        let result = body(self);

        let released = self.stack.release_to(mark);
        self.regions.retain(|r| r.id != id);
        trace!(region = %id, released, "leave region");

        match result {
            Ok(value) => Guarded::completed(self, id, value),
            Err(mut raised) => {
                if released > 0 {
                    raised.record(Hop::Released { region: id, released });
                }
                Guarded::pending(self, id, raised)
            }
        }
    }

    // ========================================================
    // Entry
    // ========================================================

    /// Run an entry point. A payload that escapes it is fatal.
    pub fn entry<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Runtime) -> Result<T>,
    ) -> core::result::Result<T, Fatal> {
        self.call(name, f).map_err(|raised| {
            error!(raise = %raised.id(), entry = name, payload = %raised.payload(), "uncaught");
            Fatal::Uncaught { entry: name, raised }
        })
    }

    // ========================================================
    // Introspection
    // ========================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of frames, the root included.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Frames, outermost first.
    pub fn frames(&self) -> &[Frame] {
        self.stack.frames()
    }

    /// Regions whose bodies are running, outermost first.
    pub fn active_regions(&self) -> &[ActiveRegion] {
        &self.regions
    }
}
