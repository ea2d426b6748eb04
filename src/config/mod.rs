//! Configuration for a monorepo (`envsync.toml`)
//!
//! Typed TOML config with serde field defaults and a validation pass.
//! CLI flags override individual fields after loading. The raw file
//! digest is recorded for provenance in pass summaries.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Default config file name (also denylisted by the source scanner to
/// avoid self-matching)
pub const CONFIG_FILE_NAME: &str = "envsync.toml";

/// Errors for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Source scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File extensions to scan
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names skipped during the walk (dot-dirs always skip)
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Additional glob patterns excluded from scanning
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Used-but-undeclared names to ignore in diagnostics
    #[serde(default)]
    pub ignore_missing: Vec<String>,

    /// Declared-but-unused names to ignore in diagnostics
    #[serde(default)]
    pub ignore_unused: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_dirs: default_skip_dirs(),
            exclude: Vec::new(),
            ignore_missing: Vec::new(),
            ignore_unused: Vec::new(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", "dist", "build", "coverage", "out", "target"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Monorepo configuration from `envsync.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Example (schema) file name within each workspace
    #[serde(default = "default_example_file")]
    pub example_file: String,

    /// Local values file name within each workspace
    #[serde(default = "default_local_file")]
    pub local_file: String,

    /// Explicit workspace paths relative to the root. When set, glob
    /// discovery is skipped.
    #[serde(default)]
    pub workspaces: Vec<String>,

    /// Globs for workspace discovery when no explicit list is given
    #[serde(default = "default_workspace_globs")]
    pub workspace_globs: Vec<String>,

    #[serde(default)]
    pub scan: ScanConfig,
}

fn default_example_file() -> String {
    ".env.example".to_string()
}

fn default_local_file() -> String {
    ".env.local".to_string()
}

fn default_workspace_globs() -> Vec<String> {
    ["apps/*", "packages/*", "services/*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            example_file: default_example_file(),
            local_file: default_local_file(),
            workspaces: Vec::new(),
            workspace_globs: default_workspace_globs(),
            scan: ScanConfig::default(),
        }
    }
}

/// A loaded config plus provenance
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SyncConfig,

    /// Path the config was read from (None when defaults were used)
    pub path: Option<std::path::PathBuf>,

    /// SHA-256 of the raw config file bytes (None when defaults were used)
    pub digest: Option<String>,
}

impl SyncConfig {
    /// Load config from a file, or defaults when the file is absent
    pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
        if !path.exists() {
            return Ok(LoadedConfig {
                config: SyncConfig::default(),
                path: None,
                digest: None,
            });
        }

        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8_lossy(&bytes);
        let config = Self::from_toml(&contents)?;

        Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
            digest: Some(digest),
        })
    }

    /// Parse config from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.example_file.is_empty() {
            return Err(ConfigError::Validation(
                "'example_file' cannot be empty".to_string(),
            ));
        }
        if self.local_file.is_empty() {
            return Err(ConfigError::Validation(
                "'local_file' cannot be empty".to_string(),
            ));
        }
        if self.example_file == self.local_file {
            return Err(ConfigError::Validation(
                "'example_file' and 'local_file' must differ".to_string(),
            ));
        }
        for ext in &self.scan.extensions {
            if ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "Scan extension '{}' must not include the leading dot",
                    ext
                )));
            }
        }
        Ok(())
    }
}
