//! Local values - the actual `NAME=value` pairs a workspace holds
//!
//! Reads `.env.local` into a name-to-value map plus the raw text. The raw
//! text is kept verbatim so the updater can preserve formatting and
//! comments for lines it does not touch.

mod update;

pub use update::{apply_updates, PendingUpdate};

use regex_lite::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors for local-values files
#[derive(Debug, thiserror::Error)]
pub enum ValuesError {
    #[error("Failed to read values file: {0}")]
    Read(std::io::Error),

    #[error("Failed to write values file: {0}")]
    Write(std::io::Error),
}

/// Parsed contents of one local values file
#[derive(Debug, Clone, Default)]
pub struct EnvLocalValues {
    /// Where this file was read from
    pub source_path: PathBuf,

    /// Current values by name
    pub values: HashMap<String, String>,

    /// Single-line comment immediately preceding each declaration
    pub comments: HashMap<String, String>,

    /// File contents verbatim, for non-destructive rewriting
    pub original_text: String,
}

impl EnvLocalValues {
    /// Non-empty value for a name, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    /// Whether the file declares the name at all (even with empty value)
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Read a local values file
///
/// A missing file yields empty values, not an error.
pub fn read_local_values(path: &Path) -> Result<EnvLocalValues, ValuesError> {
    if !path.exists() {
        return Ok(EnvLocalValues {
            source_path: path.to_path_buf(),
            ..Default::default()
        });
    }

    let text = fs::read_to_string(path).map_err(ValuesError::Read)?;
    let mut parsed = parse_values_text(&text);
    parsed.source_path = path.to_path_buf();
    Ok(parsed)
}

/// Parse values-file text (no I/O)
pub fn parse_values_text(text: &str) -> EnvLocalValues {
    let declaration = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").unwrap();

    let mut values = HashMap::new();
    let mut comments = HashMap::new();
    // Single pending comment line; blank lines clear it (comments are not
    // accumulated across blanks in values files)
    let mut pending_comment: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending_comment = None;
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            pending_comment = Some(comment.trim().to_string());
            continue;
        }

        if let Some(caps) = declaration.captures(trimmed) {
            let name = caps[1].to_string();
            if let Some(comment) = pending_comment.take() {
                comments.insert(name.clone(), comment);
            }
            values.insert(name, caps[2].to_string());
        } else {
            pending_comment = None;
        }
    }

    EnvLocalValues {
        source_path: PathBuf::new(),
        values,
        comments,
        original_text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        let parsed = parse_values_text("A=1\nB=two words\n");

        assert_eq!(parsed.get("A"), Some("1"));
        assert_eq!(parsed.get("B"), Some("two words"));
    }

    #[test]
    fn test_comment_attaches_to_next_declaration() {
        let parsed = parse_values_text("# database connection\nDB_URL=postgres://x\n");

        assert_eq!(
            parsed.comments.get("DB_URL"),
            Some(&"database connection".to_string())
        );
    }

    #[test]
    fn test_comment_not_accumulated_across_blank() {
        let parsed = parse_values_text("# orphan\n\nA=1\n");

        assert!(parsed.comments.get("A").is_none());
    }

    #[test]
    fn test_last_comment_line_wins() {
        let parsed = parse_values_text("# first\n# second\nA=1\n");

        assert_eq!(parsed.comments.get("A"), Some(&"second".to_string()));
    }

    #[test]
    fn test_empty_value_is_declared() {
        let parsed = parse_values_text("EMPTY=\n");

        assert!(parsed.contains("EMPTY"));
        assert_eq!(parsed.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_original_text_verbatim() {
        let text = "# keep me\nA=1\n\n\nB=2";
        let parsed = parse_values_text(text);

        assert_eq!(parsed.original_text, text);
    }

    #[test]
    fn test_missing_file_yields_empty_values() {
        let parsed = read_local_values(Path::new("/nonexistent/.env.local")).unwrap();

        assert!(parsed.values.is_empty());
        assert!(parsed.original_text.is_empty());
    }
}
