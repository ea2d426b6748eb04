//! Source usage scanner
//!
//! Walks a workspace's source tree and extracts env variable *references*
//! (not declarations) with line-by-line regex matching. Three access
//! patterns are recognized: dotted access (`process.env.NAME`),
//! bracket-quoted access (`process.env["NAME"]`), and the bundler dotted
//! convention (`import.meta.env.NAME`). This is an independent read path
//! consumed by the diagnose workflow; it never touches the reconciler.

mod diagnose;

pub use diagnose::{builtin_ignore_missing, diagnose, DiagnosisReport};

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use regex_lite::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ScanConfig, CONFIG_FILE_NAME};

/// Errors during a source scan
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid exclude glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
}

/// One reference to a variable in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub matched_text: String,
}

/// Result of scanning one workspace's source tree
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Usages grouped by variable name, in encounter order
    pub usages_by_name: IndexMap<String, Vec<Usage>>,

    pub files_scanned: usize,
    pub lines_scanned: usize,
}

impl ScanResult {
    /// Names referenced at least once, in encounter order
    pub fn used_names(&self) -> Vec<&str> {
        self.usages_by_name.keys().map(|k| k.as_str()).collect()
    }
}

/// File names never scanned, to avoid matching the tool's own config
const FILE_DENYLIST: &[&str] = &[CONFIG_FILE_NAME];

/// The three reference patterns, each capturing the variable name
fn usage_patterns() -> Vec<Regex> {
    vec![
        Regex::new(r"process\.env\.([A-Za-z_][A-Za-z0-9_]*)").unwrap(),
        Regex::new(r#"process\.env\[["']([A-Za-z_][A-Za-z0-9_]*)["']\]"#).unwrap(),
        Regex::new(r"import\.meta\.env\.([A-Za-z_][A-Za-z0-9_]*)").unwrap(),
    ]
}

/// Scan a workspace source tree for env variable references
///
/// Directories named in `skip_dirs` or starting with `.` are pruned.
/// Files are scanned only when their extension is configured and their
/// name is not denylisted. Unreadable files (e.g. binary or permission
/// issues) are skipped rather than failing the scan.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<ScanResult, ScanError> {
    let excludes = build_excludes(&config.exclude)?;
    let patterns = usage_patterns();

    let mut result = ScanResult::default();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if !entry.file_type().is_dir() {
            return true;
        }
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !name.starts_with('.') && !config.skip_dirs.iter().any(|d| d == name.as_ref())
    });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let name = entry.file_name().to_string_lossy();
        if FILE_DENYLIST.iter().any(|d| *d == name.as_ref()) {
            continue;
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.extensions.iter().any(|e| e == extension) {
            continue;
        }

        if let Ok(rel) = path.strip_prefix(root) {
            if excludes.is_match(rel) {
                continue;
            }
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => continue,
        };

        result.files_scanned += 1;

        for (index, line) in contents.lines().enumerate() {
            result.lines_scanned += 1;
            for pattern in &patterns {
                for caps in pattern.captures_iter(line) {
                    let name = caps[1].to_string();
                    let usage = Usage {
                        file: path.to_path_buf(),
                        line: index + 1,
                        matched_text: caps[0].to_string(),
                    };
                    result.usages_by_name.entry(name).or_default().push(usage);
                }
            }
        }
    }

    Ok(result)
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidGlob {
        pattern: patterns.join(","),
        source,
    })
}
