//! Layout location across the module tree.
//!
//! A handle resolves against each module directory under `{root}/src/modules`
//! in sorted order: the standard template directory first (directly, then one
//! category subdirectory deep), then the legacy `Layout/` directory. The
//! first match wins and resolution stops.
//!
//! Every call re-walks the filesystem. Lookups happen once per page render
//! and module trees are small, so freshness wins over speed here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::root::MODULES_ROOT;

/// Extension of layout template files.
pub const TEMPLATE_EXT: &str = ".html.jinja";

/// Standard template directory inside a module.
pub const STANDARD_TEMPLATES_DIR: &str = "src/Application/View/templates";

/// Legacy single-level layout directory at the module root.
pub const LEGACY_LAYOUT_DIR: &str = "Layout";

/// A successful handle resolution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Resolution {
    /// Namespace-qualified template reference, `@project-layouts-{Module}/...`.
    pub template: String,
    /// Name of the module that supplied the template.
    pub module: String,
    /// Absolute path of the resolved file.
    pub path: PathBuf,
}

/// Namespace alias under which a module's layout templates are exposed.
///
/// Pure and deterministic; the engine bootstrap registers directories under
/// the same alias so locator results always resolve.
pub fn alias_for_module(module: &str) -> String {
    format!("project-layouts-{module}")
}

/// Locates the layout template for `handle`.
///
/// Returns `None` when no module supplies the handle; a warning naming the
/// handle and the remediation command is logged. Never errors.
pub fn locate(root: &Path, handle: &str) -> Option<Resolution> {
    if !is_safe_handle(handle) {
        log::warn!("rejecting unsafe layout handle {handle:?}");
        return None;
    }

    let modules_root = root.join(MODULES_ROOT);
    for module_dir in sorted_subdirs(&modules_root) {
        let Some(module) = dir_name(&module_dir) else {
            continue;
        };

        let templates_dir = module_dir.join(STANDARD_TEMPLATES_DIR);
        if templates_dir.is_dir() {
            if let Some((path, relative)) = find_in_templates(&templates_dir, handle) {
                return Some(Resolution {
                    template: format!("@{}/{relative}", alias_for_module(&module)),
                    module,
                    path,
                });
            }
        }

        let legacy = module_dir.join(LEGACY_LAYOUT_DIR).join(template_file(handle));
        if legacy.is_file() {
            return Some(Resolution {
                template: format!("@{}/{}", alias_for_module(&module), template_file(handle)),
                module,
                path: legacy,
            });
        }
    }

    log::warn!(
        "layout '{handle}' is not activated; run `montage layout generate {handle}` \
         to copy it into {MODULES_ROOT}"
    );
    None
}

/// Discovers, per module, the directory to bind under the module's
/// `project-layouts-` alias.
///
/// The standard template directory is preferred whenever it exists so that
/// `@project-layouts-{Module}/{category}/{handle}` references resolve; the
/// legacy `Layout/` directory is used only when the standard one is absent.
pub fn discover_layout_paths(root: &Path) -> Vec<(String, PathBuf)> {
    let mut paths = Vec::new();
    for module_dir in sorted_subdirs(&root.join(MODULES_ROOT)) {
        let Some(module) = dir_name(&module_dir) else {
            continue;
        };
        let templates_dir = module_dir.join(STANDARD_TEMPLATES_DIR);
        let legacy_dir = module_dir.join(LEGACY_LAYOUT_DIR);
        if templates_dir.is_dir() {
            paths.push((module, templates_dir));
        } else if legacy_dir.is_dir() {
            paths.push((module, legacy_dir));
        }
    }
    paths
}

/// Looks for `{handle}.html.jinja` directly in `dir`, then in each immediate
/// subdirectory (depth exactly one). Returns the full path and the relative
/// path with the category prefix when matched in a subdirectory.
fn find_in_templates(dir: &Path, handle: &str) -> Option<(PathBuf, String)> {
    let file = template_file(handle);
    let direct = dir.join(&file);
    if direct.is_file() {
        return Some((direct, file));
    }

    for subdir in sorted_subdirs(dir) {
        let candidate = subdir.join(&file);
        if candidate.is_file() {
            let category = dir_name(&subdir)?;
            return Some((candidate, format!("{category}/{file}")));
        }
    }
    None
}

fn template_file(handle: &str) -> String {
    format!("{handle}{TEMPLATE_EXT}")
}

/// A handle joins into filesystem paths, so it must not be empty and must not
/// smuggle separators or parent-directory components.
fn is_safe_handle(handle: &str) -> bool {
    !handle.is_empty()
        && !handle.contains('/')
        && !handle.contains('\\')
        && !handle.contains("..")
}

/// Immediate subdirectories of `dir`, sorted ascending by name so resolution
/// order is reproducible across filesystems.
fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
