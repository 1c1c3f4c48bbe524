//! The owned application context.
//!
//! [`Frontend`] replaces what older revisions of this system kept as static
//! process-wide singletons: the engine instance, the slot registry and the
//! memoized project root all live here, constructor-injected and testable in
//! isolation. Construct one at startup, before concurrent request handling
//! begins, and share it.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::Settings;
use crate::engine::Engine;
use crate::locate::{self, Resolution};
use crate::module::ModuleRegistry;
use crate::render;
use crate::root::RootResolver;
use crate::slots::SlotRegistry;
use crate::Context;

pub struct Frontend {
    modules: ModuleRegistry,
    resolver: RootResolver,
    settings: Settings,
    slots: Arc<SlotRegistry>,
    engine: Mutex<Option<Arc<Engine>>>,
}

impl Frontend {
    /// Creates a frontend with deployment defaults: root resolution per
    /// [`RootResolver::default`] and settings from the environment.
    pub fn new(modules: ModuleRegistry) -> Self {
        Self::with(modules, RootResolver::default(), Settings::from_env())
    }

    /// Creates a frontend with explicit root resolution and settings.
    pub fn with(modules: ModuleRegistry, resolver: RootResolver, settings: Settings) -> Self {
        Self {
            modules,
            resolver,
            settings,
            slots: Arc::new(SlotRegistry::new()),
            engine: Mutex::new(None),
        }
    }

    /// The resolved project root (memoized on first use).
    pub fn root(&self) -> &Path {
        self.resolver.resolve()
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The slot registry, for contribution registration at module bootstrap.
    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    /// Returns the engine, building it on first access.
    pub fn engine(&self) -> Arc<Engine> {
        let mut cell = self.engine.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(engine) = cell.as_ref() {
            return engine.clone();
        }
        let engine = Arc::new(Engine::build(
            self.resolver.resolve(),
            &self.modules,
            self.slots.clone(),
            &self.settings,
        ));
        *cell = Some(engine.clone());
        engine
    }

    /// Drops the engine singleton so the next access rebuilds it from
    /// current module state. For test isolation and re-registration.
    pub fn reset_engine(&self) {
        *self.engine.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Resolves a layout handle against the module tree.
    pub fn locate(&self, handle: &str) -> Option<Resolution> {
        locate::locate(self.root(), handle)
    }

    /// Renders the layout for `handle`. Total: a missing handle or a failing
    /// render yields a diagnostic HTML page, never an error.
    ///
    /// The template sees `layout_handle` and `layout_module` plus the caller
    /// context; caller-supplied keys of the same name win.
    pub fn render(&self, handle: &str, context: Context) -> String {
        render::render_layout(self, handle, context)
    }
}
