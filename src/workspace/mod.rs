//! Workspace discovery
//!
//! Supplies the list of workspace locations for a pass. The engine does
//! not enforce any particular monorepo layout: an explicit list in config
//! wins; otherwise directories matching the configured globs that carry an
//! example or local env file are treated as workspaces.

use globset::{Glob, GlobSetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SyncConfig;

/// One workspace in the monorepo tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Display name (path relative to the monorepo root)
    pub name: String,

    /// Absolute directory of the workspace
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn example_file(&self, config: &SyncConfig) -> PathBuf {
        self.root.join(&config.example_file)
    }

    pub fn local_file(&self, config: &SyncConfig) -> PathBuf {
        self.root.join(&config.local_file)
    }
}

/// Errors during workspace discovery
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Invalid workspace glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
}

/// Discover workspaces under a monorepo root
///
/// Explicitly configured workspace paths are taken as-is (they need not
/// hold env files yet). Otherwise every directory within glob-matched
/// locations that contains the example or local file becomes a workspace.
/// The root itself is always a workspace. Order is deterministic: root
/// first, then sorted relative paths.
pub fn discover_workspaces(
    root: &Path,
    config: &SyncConfig,
) -> Result<Vec<Workspace>, WorkspaceError> {
    let mut workspaces = vec![Workspace::new("root", root)];

    if !config.workspaces.is_empty() {
        for rel in &config.workspaces {
            workspaces.push(Workspace::new(rel.clone(), root.join(rel)));
        }
        return Ok(workspaces);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &config.workspace_globs {
        let glob = Glob::new(pattern).map_err(|source| WorkspaceError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    let globs = builder.build().map_err(|source| WorkspaceError::InvalidGlob {
        pattern: config.workspace_globs.join(","),
        source,
    })?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(3)
        .into_iter()
        .filter_entry(|e| !is_hidden_or_vendored(e.file_name().to_string_lossy().as_ref()))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => continue,
        };
        if !globs.is_match(&rel) {
            continue;
        }
        let has_env_file = entry.path().join(&config.example_file).exists()
            || entry.path().join(&config.local_file).exists();
        if has_env_file {
            found.push((rel, entry.path().to_path_buf()));
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, path) in found {
        workspaces.push(Workspace::new(name, path));
    }

    Ok(workspaces)
}

fn is_hidden_or_vendored(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}
