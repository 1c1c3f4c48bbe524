//! # Montage - Layout Resolution and Slot Composition
//!
//! `montage` is the template-resolution layer for a modular web-application
//! frontend. Given a symbolic *layout handle*, it locates the template file
//! contributed by one of several pluggable modules or themes, renders it
//! through MiniJinja, and lets other modules inject fragments into named
//! extension points (*slots*) of the rendered layout.
//!
//! ## Core Concepts
//!
//! - [`Frontend`]: the owned application context tying everything together —
//!   project root, module registry, slot registry and the engine singleton
//! - [`ModuleDescriptor`]: a module or theme contributing template directories
//! - [`SlotRegistry`] / [`SlotBinding`]: registration of slot contributions
//! - [`locate`]: handle → template resolution across the module tree
//! - [`Engine`]: the bootstrapped MiniJinja environment with namespaced
//!   template references (`@alias/relative/path`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use montage::{Frontend, ModuleRegistry, ModuleDescriptor, PackageKind, SlotBinding};
//!
//! let mut modules = ModuleRegistry::new();
//! modules.register(
//!     ModuleDescriptor::new("blog", PackageKind::Module)
//!         .with_template_path("/srv/app/src/modules/Blog/templates"),
//! );
//!
//! let frontend = Frontend::new(modules);
//! SlotBinding::new("home", "main.sidebar", "@blog/slots/recent.html.jinja")
//!     .with_priority(10)
//!     .apply(frontend.slots());
//!
//! // Always returns a page; misses and render failures become diagnostic HTML.
//! let html = frontend.render("home", montage::Context::new());
//! ```
//!
//! ## Layout Resolution
//!
//! Modules live under `{root}/src/modules/{Module}/`. A handle resolves to
//! `src/Application/View/templates/{handle}.html.jinja` (optionally one
//! category subdirectory deep), falling back to the legacy
//! `Layout/{handle}.html.jinja`. The first module in sorted order wins and
//! the result is addressed as `@project-layouts-{Module}/{relative}`.
//!
//! ## Slots
//!
//! Inside any rendered layout, `{{ slot("name") }}` concatenates every
//! registered contribution for `(layout_handle, name)` in ascending priority
//! order. Each contribution renders with three context layers: the layout's
//! own context, the contribution's stored context, then the inline mapping
//! passed to `slot()` — later layers win.

pub mod config;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod locate;
pub mod module;
pub mod root;
pub mod slots;

mod render;

pub use config::{Settings, THEME_ENV};
pub use engine::Engine;
pub use error::RenderError;
pub use frontend::Frontend;
pub use locate::{alias_for_module, locate, Resolution, TEMPLATE_EXT};
pub use module::{ModuleDescriptor, ModuleRegistry, PackageKind};
pub use root::RootResolver;
pub use slots::{SlotBinding, SlotRegistry};

/// Context mapping passed to templates and slot contributions.
///
/// Keys are template variable names; value semantics are opaque to this crate
/// and flow through to the engine unchanged.
pub type Context = std::collections::HashMap<String, serde_json::Value>;

/// Context key carrying the rendering layout's handle.
///
/// Injected by [`Frontend::render`] and read back by the in-template
/// `slot()` function to find the contributions for the current layout.
pub const LAYOUT_HANDLE_KEY: &str = "layout_handle";

/// Context key carrying the name of the module that supplied the layout.
pub const LAYOUT_MODULE_KEY: &str = "layout_module";
