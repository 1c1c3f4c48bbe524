//! A worked example: a small site composed from two modules and a theme.
//!
//! Scaffolds a project tree in a temp directory, registers the modules and
//! their slot contributions, then renders two pages — one resolved from a
//! module's standard template directory, one from a legacy `Layout/`
//! directory — plus the diagnostic page for a handle no module supplies.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_json::json;

use montage::{
    Context, Frontend, ModuleDescriptor, ModuleRegistry, PackageKind, RootResolver, Settings,
    SlotBinding,
};

fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Lays out the site: a Pages module owning the layouts, a blog module
/// contributing slot templates under the `blog` namespace, and a theme
/// owning the `chrome` namespace.
fn scaffold(root: &Path) -> Result<()> {
    write(
        root,
        "src/modules/Pages/src/Application/View/templates/home.html.jinja",
        "<!doctype html>\n<html>\n<head><title>{{ title }}</title></head>\n<body>\n\
         {% include \"@chrome/header.html.jinja\" %}\n\
         <main>\n<h1>{{ title }}</h1>\n{{ slot(\"main.sidebar\") }}\n</main>\n\
         </body>\n</html>\n",
    )?;
    write(
        root,
        "src/modules/Checkout/Layout/checkout.html.jinja",
        "<!doctype html>\n<html><body><h1>Checkout ({{ layout_module }})</h1></body></html>\n",
    )?;
    write(
        root,
        "mods/blog/slots/recent.html.jinja",
        "<aside><h2>{{ heading }}</h2><p>Shown on '{{ layout_handle }}'</p></aside>\n",
    )?;
    write(
        root,
        "themes/midnight/header.html.jinja",
        "<header class=\"midnight\">{{ title }}</header>\n",
    )?;
    Ok(())
}

fn modules(root: &Path) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(
        ModuleDescriptor::new("blog", PackageKind::Module)
            .with_template_path(root.join("mods/blog")),
    );
    registry.register(
        ModuleDescriptor::new("midnight", PackageKind::Theme)
            .with_alias("chrome")
            .with_template_path(root.join("themes/midnight")),
    );
    registry
}

fn main() -> Result<()> {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;

    let frontend = Frontend::with(
        modules(dir.path()),
        RootResolver::fixed(dir.path()),
        Settings::from_env(),
    );

    SlotBinding::new("home", "main.sidebar", "@blog/slots/recent.html.jinja")
        .with_value("heading", json!("Recent posts"))
        .with_priority(10)
        .apply(frontend.slots());

    println!("== home (standard module layout, theme header, slot) ==");
    println!(
        "{}",
        frontend.render("home", Context::from([("title".to_string(), json!("Front"))]))
    );

    println!("== checkout (legacy Layout/ directory) ==");
    println!("{}", frontend.render("checkout", Context::new()));

    println!("== pricing (not activated anywhere) ==");
    println!("{}", frontend.render("pricing", Context::new()));

    Ok(())
}
