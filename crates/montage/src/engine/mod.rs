//! Template-engine bootstrap.
//!
//! Builds the MiniJinja environment once per [`crate::Frontend`]: one
//! namespace binding per module/theme template directory (themes first,
//! filtered to the active theme when one is configured), one
//! `project-layouts-{Module}` binding per module owning layout templates, a
//! writable scratch directory for compiled artifacts, lenient undefined
//! variables, HTML auto-escaping, and the in-template `slot()` function.
//!
//! Namespace conflicts resolve in favor of the earliest registration (the
//! loader tries an alias's directories in registration order), which is why
//! the theme group is bound before regular modules.

mod cache;
mod functions;
mod loader;

pub use cache::{writable_cache_dir, CACHE_SUBDIR, FALLBACK_CACHE_DIR};
pub use loader::NamespaceLoader;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::config::Settings;
use crate::error::RenderError;
use crate::locate::{alias_for_module, discover_layout_paths};
use crate::module::{ModuleDescriptor, ModuleRegistry};
use crate::slots::SlotRegistry;
use crate::Context;

use functions::{ContextGuard, RenderShared};

/// The bootstrapped template engine.
///
/// Namespace bindings are fixed once built; rebuild through
/// [`crate::Frontend::reset_engine`] after module (re)registration.
pub struct Engine {
    env: Mutex<Environment<'static>>,
    shared: Arc<RenderShared>,
    cache_dir: PathBuf,
    namespaces: Vec<String>,
    auto_reload: bool,
}

impl Engine {
    /// Builds the engine from the current module state.
    pub fn build(
        root: &Path,
        modules: &ModuleRegistry,
        slots: Arc<SlotRegistry>,
        settings: &Settings,
    ) -> Self {
        let mut loader = NamespaceLoader::new();
        let mut namespaces = Vec::new();

        for module in ordered_modules(modules, settings) {
            for path in module.template_paths() {
                if !path.is_dir() {
                    log::debug!(
                        "skipping missing template dir {} of module '{}'",
                        path.display(),
                        module.name()
                    );
                    continue;
                }
                for alias in module.aliases() {
                    loader.add_path(alias, path);
                    record_namespace(&mut namespaces, alias);
                }
            }
        }

        for (module, dir) in discover_layout_paths(root) {
            let alias = alias_for_module(&module);
            loader.add_path(&alias, dir);
            record_namespace(&mut namespaces, &alias);
        }

        let cache_dir = writable_cache_dir(root);

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_auto_escape_callback(|name| {
            if name.contains(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        env.set_loader(move |name| loader.load(name));

        let shared = Arc::new(RenderShared::new(slots));
        functions::register(&mut env, shared.clone());

        Self {
            env: Mutex::new(env),
            shared,
            cache_dir,
            namespaces,
            auto_reload: settings.auto_reload,
        }
    }

    /// Renders a namespaced template reference with the given context.
    pub fn render(&self, template: &str, context: &Context) -> Result<String, RenderError> {
        let mut env = self.env.lock().unwrap_or_else(|p| p.into_inner());
        if self.auto_reload {
            // Drop compiled templates so the loader re-reads changed sources.
            env.clear_templates();
        }
        let _guard = ContextGuard::push(&self.shared, context.clone());
        let tmpl = env.get_template(template)?;
        Ok(tmpl.render(Value::from_serialize(context))?)
    }

    /// Renders every contribution registered for `(handle, slot)`.
    ///
    /// Same semantics as the in-template `slot()` call, driven from outside a
    /// template. Contribution failures propagate.
    pub fn render_slot(
        &self,
        handle: &str,
        slot: &str,
        base: &Context,
        inline: &Context,
    ) -> Result<String, RenderError> {
        let env = self.env.lock().unwrap_or_else(|p| p.into_inner());
        self.shared
            .slots
            .render_with(handle, slot, base, inline, |template, context| {
                let tmpl = env.get_template(template)?;
                let _guard = ContextGuard::push(&self.shared, context.clone());
                Ok(tmpl.render(Value::from_serialize(context))?)
            })
    }

    /// Scratch directory resolved for compiled-template artifacts.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Registered namespace aliases, in registration order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }
}

/// Enabled modules in registration order: themes first (filtered to the
/// active theme when configured), then the rest, each group keeping its
/// relative order.
fn ordered_modules<'a>(
    modules: &'a ModuleRegistry,
    settings: &Settings,
) -> Vec<&'a ModuleDescriptor> {
    let enabled: Vec<&ModuleDescriptor> = modules
        .modules()
        .iter()
        .filter(|m| m.is_enabled())
        .collect();

    let mut themes: Vec<&ModuleDescriptor> =
        enabled.iter().copied().filter(|m| m.is_theme()).collect();
    if let Some(active) = settings.active_theme.as_deref() {
        themes.retain(|m| m.matches(active));
    }

    let others = enabled.iter().copied().filter(|m| !m.is_theme());
    themes.into_iter().chain(others).collect()
}

fn record_namespace(namespaces: &mut Vec<String>, alias: &str) {
    if !namespaces.iter().any(|n| n == alias) {
        namespaces.push(alias.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::PackageKind;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn build_engine(
        root: &Path,
        modules: &ModuleRegistry,
        slots: Arc<SlotRegistry>,
        settings: &Settings,
    ) -> Engine {
        Engine::build(root, modules, slots, settings)
    }

    fn ctx(pairs: &[(&str, serde_json::Value)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn renders_module_namespace_template() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mods/blog/nav.html.jinja", "<nav>{{ title }}</nav>");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        let html = engine
            .render("@blog/nav.html.jinja", &ctx(&[("title", json!("Blog"))]))
            .unwrap();
        assert_eq!(html, "<nav>Blog</nav>");
    }

    #[test]
    fn theme_namespace_wins_over_module() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "theme/header.html.jinja", "themed");
        write(tmp.path(), "module/header.html.jinja", "plain");

        let mut modules = ModuleRegistry::new();
        // Registered after the theme-owning alias would be, and even listed
        // first here: group ordering, not registration order, must win.
        modules.register(
            ModuleDescriptor::new("chrome", PackageKind::Module)
                .with_template_path(tmp.path().join("module")),
        );
        modules.register(
            ModuleDescriptor::new("midnight", PackageKind::Theme)
                .with_alias("chrome")
                .with_template_path(tmp.path().join("theme")),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        let html = engine
            .render("@chrome/header.html.jinja", &Context::new())
            .unwrap();
        assert_eq!(html, "themed");
    }

    #[test]
    fn active_theme_filters_other_themes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "midnight/header.html.jinja", "midnight");
        write(tmp.path(), "aurora/header.html.jinja", "aurora");
        write(tmp.path(), "module/header.html.jinja", "plain");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("midnight", PackageKind::Theme)
                .with_alias("chrome")
                .with_template_path(tmp.path().join("midnight")),
        );
        modules.register(
            ModuleDescriptor::new("aurora", PackageKind::Theme)
                .with_alias("chrome")
                .with_template_path(tmp.path().join("aurora")),
        );
        modules.register(
            ModuleDescriptor::new("chrome", PackageKind::Module)
                .with_template_path(tmp.path().join("module")),
        );

        let settings = Settings::default().with_theme("aurora");
        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &settings,
        );
        let html = engine
            .render("@chrome/header.html.jinja", &Context::new())
            .unwrap();
        assert_eq!(html, "aurora");
    }

    #[test]
    fn disabled_modules_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "off/header.html.jinja", "off");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("off", PackageKind::Module)
                .with_template_path(tmp.path().join("off"))
                .disabled(),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        assert!(engine.render("@off/header.html.jinja", &Context::new()).is_err());
    }

    #[test]
    fn project_layout_alias_is_registered_from_module_tree() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "src/modules/Blog/src/Application/View/templates/home.html.jinja",
            "home of {{ layout_module }}",
        );

        let engine = build_engine(
            tmp.path(),
            &ModuleRegistry::new(),
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        assert!(engine
            .namespaces()
            .iter()
            .any(|n| n == "project-layouts-Blog"));

        let html = engine
            .render(
                "@project-layouts-Blog/home.html.jinja",
                &ctx(&[("layout_module", json!("Blog"))]),
            )
            .unwrap();
        assert_eq!(html, "home of Blog");
    }

    #[test]
    fn undefined_variables_render_empty() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mods/blog/nav.html.jinja", "[{{ missing }}]");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        let html = engine.render("@blog/nav.html.jinja", &Context::new()).unwrap();
        assert_eq!(html, "[]");
    }

    #[test]
    fn html_templates_escape_variables() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mods/blog/nav.html.jinja", "{{ title }}");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        let html = engine
            .render(
                "@blog/nav.html.jinja",
                &ctx(&[("title", json!("<b>hi</b>"))]),
            )
            .unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn slot_function_composes_contributions() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "mods/blog/page.html.jinja",
            "<main>{{ slot(\"sidebar\") }}</main>",
        );
        write(
            tmp.path(),
            "mods/blog/slots/one.html.jinja",
            "<p>{{ label }}:{{ n }}</p>",
        );
        write(tmp.path(), "mods/blog/slots/two.html.jinja", "<p>two</p>");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let slots = Arc::new(SlotRegistry::new());
        slots.register(
            "home",
            "sidebar",
            "@blog/slots/one.html.jinja",
            ctx(&[("label", json!("posts"))]),
            1,
        );
        slots.register(
            "home",
            "sidebar",
            "@blog/slots/two.html.jinja",
            Context::new(),
            5,
        );

        let engine = build_engine(tmp.path(), &modules, slots, &Settings::default());
        let html = engine
            .render(
                "@blog/page.html.jinja",
                &ctx(&[("layout_handle", json!("home")), ("n", json!(3))]),
            )
            .unwrap();

        // Base context (n) flows into the contribution; stored context
        // (label) layers over it; slot output is not double-escaped.
        assert_eq!(html, "<main><p>posts:3</p><p>two</p></main>");
    }

    #[test]
    fn slot_function_inline_context_wins() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "mods/blog/page.html.jinja",
            "{{ slot(\"sidebar\", {\"label\": \"inline\"}) }}",
        );
        write(tmp.path(), "mods/blog/slots/one.html.jinja", "{{ label }}");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let slots = Arc::new(SlotRegistry::new());
        slots.register(
            "home",
            "sidebar",
            "@blog/slots/one.html.jinja",
            ctx(&[("label", json!("stored"))]),
            0,
        );

        let engine = build_engine(tmp.path(), &modules, slots, &Settings::default());
        let html = engine
            .render(
                "@blog/page.html.jinja",
                &ctx(&[("layout_handle", json!("home"))]),
            )
            .unwrap();
        assert_eq!(html, "inline");
    }

    #[test]
    fn slot_function_without_layout_handle_is_empty() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "mods/blog/page.html.jinja",
            "[{{ slot(\"sidebar\") }}]",
        );

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let slots = Arc::new(SlotRegistry::new());
        slots.register("home", "sidebar", "@blog/slots/one.html.jinja", Context::new(), 0);

        let engine = build_engine(tmp.path(), &modules, slots, &Settings::default());
        let html = engine.render("@blog/page.html.jinja", &Context::new()).unwrap();
        assert_eq!(html, "[]");
    }

    #[test]
    fn render_slot_outside_templates_matches_function() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mods/blog/slots/one.html.jinja", "({{ label }})");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let slots = Arc::new(SlotRegistry::new());
        slots.register(
            "home",
            "sidebar",
            "@blog/slots/one.html.jinja",
            Context::new(),
            0,
        );

        let engine = build_engine(tmp.path(), &modules, slots, &Settings::default());
        let html = engine
            .render_slot(
                "home",
                "sidebar",
                &ctx(&[("label", json!("base"))]),
                &Context::new(),
            )
            .unwrap();
        assert_eq!(html, "(base)");
    }

    #[test]
    fn auto_reload_picks_up_template_edits() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mods/blog/nav.html.jinja", "v1");

        let mut modules = ModuleRegistry::new();
        modules.register(
            ModuleDescriptor::new("blog", PackageKind::Module)
                .with_template_path(tmp.path().join("mods/blog")),
        );

        let engine = build_engine(
            tmp.path(),
            &modules,
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        assert_eq!(
            engine.render("@blog/nav.html.jinja", &Context::new()).unwrap(),
            "v1"
        );

        write(tmp.path(), "mods/blog/nav.html.jinja", "v2");
        assert_eq!(
            engine.render("@blog/nav.html.jinja", &Context::new()).unwrap(),
            "v2"
        );
    }

    #[test]
    fn cache_dir_is_resolved_under_root() {
        let tmp = TempDir::new().unwrap();
        let engine = build_engine(
            tmp.path(),
            &ModuleRegistry::new(),
            Arc::new(SlotRegistry::new()),
            &Settings::default(),
        );
        assert_eq!(engine.cache_dir(), tmp.path().join(CACHE_SUBDIR));
        assert!(engine.cache_dir().is_dir());
    }
}
