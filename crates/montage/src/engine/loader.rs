//! Namespaced template loading.
//!
//! MiniJinja has no native template namespaces, so references of the form
//! `@alias/relative/path` are resolved here: each alias maps to an ordered
//! list of directories, and the first directory containing the file wins.
//! Later registrations for an alias append — they never override earlier
//! ones — which is why themes are registered before regular modules.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::ErrorKind;

/// Alias → ordered directory list table backing the engine's loader.
#[derive(Debug, Default)]
pub struct NamespaceLoader {
    paths: HashMap<String, Vec<PathBuf>>,
}

impl NamespaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `dir` to the list bound under `alias`.
    pub fn add_path(&mut self, alias: impl Into<String>, dir: impl Into<PathBuf>) {
        self.paths.entry(alias.into()).or_default().push(dir.into());
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.paths.contains_key(alias)
    }

    /// Loads the source for a namespaced reference.
    ///
    /// Unknown aliases, unparseable names and missing files all yield
    /// `Ok(None)` so the engine reports them uniformly as template-not-found;
    /// only an unreadable existing file is an error.
    pub fn load(&self, name: &str) -> Result<Option<String>, minijinja::Error> {
        let Some((alias, relative)) = split_reference(name) else {
            return Ok(None);
        };
        let Some(dirs) = self.paths.get(alias) else {
            return Ok(None);
        };
        let Some(relative) = safe_relative(relative) else {
            return Ok(None);
        };

        for dir in dirs {
            let candidate = dir.join(&relative);
            if candidate.is_file() {
                return fs::read_to_string(&candidate).map(Some).map_err(|err| {
                    minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        format!("failed to read template {}: {err}", candidate.display()),
                    )
                });
            }
        }
        Ok(None)
    }
}

/// Splits `@alias/relative/path` into its alias and relative parts.
pub(crate) fn split_reference(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix('@')?;
    let (alias, relative) = rest.split_once('/')?;
    if alias.is_empty() || relative.is_empty() {
        return None;
    }
    Some((alias, relative))
}

/// Rebuilds a relative reference as a path, refusing empty, parent and
/// backslash components so references cannot escape their namespace roots.
fn safe_relative(relative: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for part in relative.split('/') {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return None;
        }
        path.push(part);
    }
    Some(path)
}
