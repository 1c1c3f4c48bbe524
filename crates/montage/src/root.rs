//! Project-root resolution.
//!
//! The application root is the directory holding both the project manifest
//! and the module source tree. Resolution tries known deployment locations
//! and the working directory first, then walks upward from a start directory,
//! and finally degrades to a fixed fallback rather than failing — downstream
//! directory-existence checks absorb the consequence.

use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

/// Manifest file that marks a project root.
pub const PROJECT_MANIFEST: &str = "Cargo.toml";

/// Module source tree, relative to the project root.
pub const MODULES_ROOT: &str = "src/modules";

/// Container deployment root, used as a known candidate and as the
/// unverified last-resort fallback.
pub const DEPLOY_ROOT: &str = "/srv/app";

/// Returns true when `dir` contains both the project manifest and the module
/// source tree.
pub fn is_project_root(dir: &Path) -> bool {
    dir.join(PROJECT_MANIFEST).is_file() && dir.join(MODULES_ROOT).is_dir()
}

/// Locates the application root once per instance.
///
/// All probe inputs are constructor-injectable so tests (and deployments with
/// unusual layouts) can control the search. [`RootResolver::default`] wires
/// the deployment candidates: `/srv/app`, the current working directory, and
/// an upward walk from the running executable's directory.
#[derive(Debug)]
pub struct RootResolver {
    candidates: Vec<PathBuf>,
    start_dir: Option<PathBuf>,
    fallback: PathBuf,
    cached: OnceCell<PathBuf>,
}

impl Default for RootResolver {
    fn default() -> Self {
        let mut candidates = vec![PathBuf::from(DEPLOY_ROOT)];
        if let Ok(cwd) = env::current_dir() {
            candidates.push(cwd);
        }
        let start_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(candidates, start_dir, DEPLOY_ROOT)
    }
}

impl RootResolver {
    /// Creates a resolver with explicit probe inputs.
    ///
    /// `candidates` are checked first in order; `start_dir` (when given) is
    /// the origin of the upward walk; `fallback` is returned unverified when
    /// nothing matches.
    pub fn new(
        candidates: Vec<PathBuf>,
        start_dir: Option<PathBuf>,
        fallback: impl Into<PathBuf>,
    ) -> Self {
        Self {
            candidates,
            start_dir,
            fallback: fallback.into(),
            cached: OnceCell::new(),
        }
    }

    /// Convenience constructor for a resolver pinned to a known root.
    pub fn fixed(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::new(vec![root.clone()], None, root)
    }

    /// Resolves the project root, memoizing the first successful probe.
    ///
    /// Never errors: an undetectable root degrades to the fallback path.
    pub fn resolve(&self) -> &Path {
        self.cached.get_or_init(|| self.probe()).as_path()
    }

    fn probe(&self) -> PathBuf {
        for candidate in &self.candidates {
            if is_project_root(candidate) {
                return candidate.clone();
            }
        }

        if let Some(start) = &self.start_dir {
            let mut dir = start.as_path();
            loop {
                if is_project_root(dir) {
                    return dir.to_path_buf();
                }
                match dir.parent() {
                    Some(parent) => dir = parent,
                    None => break,
                }
            }
        }

        log::debug!(
            "project root not detected, falling back to {}",
            self.fallback.display()
        );
        self.fallback.clone()
    }
}
