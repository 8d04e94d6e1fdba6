//! Workspace-relative path resolution and the sensitive-path predicate.

use std::path::{Component, Path, PathBuf};

/// Resolves raw tool-supplied paths against the active workspace root.
///
/// Resolution is lexical: `.` and `..` components fold without touching the
/// filesystem, so paths that do not exist yet normalize the same way as
/// existing ones.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    workspace_root: Option<PathBuf>,
}

impl PathResolver {
    #[must_use]
    pub fn new(workspace_root: Option<PathBuf>) -> Self {
        Self { workspace_root }
    }

    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// Canonical absolute form of a raw path string.
    ///
    /// Relative paths join the workspace root when one is set, otherwise
    /// the process working directory.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let candidate = Path::new(raw);
        let absolute = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir().join(candidate)
        };

        lexical_normalize(&absolute)
    }

    /// True when a resolved path falls outside the active workspace root.
    /// Always false when no root is set.
    #[must_use]
    pub fn is_outside_workspace(&self, resolved: &Path) -> bool {
        match &self.workspace_root {
            Some(root) => !resolved.starts_with(root),
            None => false,
        }
    }

    fn base_dir(&self) -> PathBuf {
        match &self.workspace_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Folds `.` and `..` components without resolving symlinks.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Clamp at the root for absolute paths; keep leading `..`
                // for relative ones.
                if !normalized.pop() && !path.has_root() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }

    normalized
}

/// Top-level system locations: absolute paths with at most one component
/// under the filesystem root (`/etc`, `/bin`, `/new-file`). Writes there
/// require explicit interactive confirmation.
#[must_use]
pub fn is_sensitive_system_path(path: &Path) -> bool {
    if !path.is_absolute() {
        return false;
    }

    let normal_components = path
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .count();

    normal_components <= 1
}
