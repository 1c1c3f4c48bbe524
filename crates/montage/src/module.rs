//! Module and theme descriptors consumed by the engine bootstrap.
//!
//! Descriptors are produced by module discovery (outside this crate) and are
//! read-only here: constructed once, immutable for the process.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Package type tag distinguishing themes from regular modules.
///
/// Themes take namespace-override precedence: their template directories are
/// registered ahead of regular modules'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    Module,
    Theme,
}

fn default_enabled() -> bool {
    true
}

/// A module or theme contributing template directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    template_paths: Vec<PathBuf>,
    kind: PackageKind,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

impl ModuleDescriptor {
    /// Creates an enabled descriptor with no aliases or template paths.
    pub fn new(name: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            template_paths: Vec::new(),
            kind,
            enabled: true,
        }
    }

    /// Adds a namespace alias. Without any, the module name is the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds an absolute template directory.
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_paths.push(path.into());
        self
    }

    /// Marks the module as inactive; the bootstrap skips it.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    pub fn is_theme(&self) -> bool {
        self.kind == PackageKind::Theme
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn template_paths(&self) -> &[PathBuf] {
        &self.template_paths
    }

    /// Namespace aliases, defaulting to the module's own name when none are
    /// declared.
    pub fn aliases(&self) -> Vec<&str> {
        if self.aliases.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.aliases.iter().map(String::as_str).collect()
        }
    }

    /// True when `theme` matches this module's name or one of its aliases.
    pub fn matches(&self, theme: &str) -> bool {
        self.name == theme || self.aliases.iter().any(|a| a == theme)
    }
}

/// The list of discovered modules, in discovery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: ModuleDescriptor) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Looks up a module by name.
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name() == name)
    }
}
