//! Runtime settings consumed by the engine bootstrap.

use std::env;

/// Environment key selecting the active theme by name or alias.
///
/// Empty or unset means no theme filtering: every theme module's namespaces
/// are registered.
pub const THEME_ENV: &str = "THEME";

/// Settings for the engine bootstrap.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Active theme, matched against theme module names and aliases.
    pub active_theme: Option<String>,

    /// When true (the default), the engine drops its compiled-template cache
    /// before each top-level render so on-disk template edits are picked up.
    pub auto_reload: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_theme: None,
            auto_reload: true,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            active_theme: env::var(THEME_ENV).ok().filter(|v| !v.is_empty()),
            ..Self::default()
        }
    }

    /// Sets the active theme.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.active_theme = Some(theme.into());
        self
    }

    /// Enables or disables template auto-reload.
    pub fn with_auto_reload(mut self, auto_reload: bool) -> Self {
        self.auto_reload = auto_reload;
        self
    }
}
