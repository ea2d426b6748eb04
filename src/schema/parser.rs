//! Example-file parser
//!
//! Scans an example file (`.env.example`) line by line, accumulating
//! consecutive `#` comment lines into a pending block. A blank line
//! discards the pending block - comments attach only to the immediately
//! following declaration. A `NAME=value` line consumes the block: the
//! requirement tag and directive tag are extracted, the remainder becomes
//! the description, and a definition is emitted.

use regex_lite::Regex;
use std::fs;
use std::path::Path;

use super::directive::{extract_directive, extract_requirement, normalize_whitespace};
use super::{EnvSchema, EnvVarDefinition};
use crate::plugin::PluginRegistry;

/// Errors for example-file parsing
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read example file: {0}")]
    Io(#[from] std::io::Error),
}

/// Comment-accumulation states for the line scanner
enum ScanState {
    Idle,
    Accumulating(String),
}

/// Parse an example file into a schema
///
/// A missing file yields an empty schema: a workspace with no
/// app-specific variables is a legitimate state, not an error.
pub fn parse_example_file(
    path: &Path,
    registry: &PluginRegistry,
) -> Result<EnvSchema, SchemaError> {
    if !path.exists() {
        return Ok(EnvSchema {
            source_path: path.to_path_buf(),
            definitions: Vec::new(),
        });
    }

    let text = fs::read_to_string(path)?;
    let mut schema = parse_example_text(&text, registry);
    schema.source_path = path.to_path_buf();
    Ok(schema)
}

/// Parse example-file text into a schema (no I/O)
pub fn parse_example_text(text: &str, registry: &PluginRegistry) -> EnvSchema {
    let declaration = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").unwrap();

    let mut schema = EnvSchema::default();
    let mut state = ScanState::Idle;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Blank line severs the comment/declaration association
            state = ScanState::Idle;
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            let comment = comment.trim();
            state = match state {
                ScanState::Idle => ScanState::Accumulating(comment.to_string()),
                ScanState::Accumulating(mut pending) => {
                    if !pending.is_empty() && !comment.is_empty() {
                        pending.push(' ');
                    }
                    pending.push_str(comment);
                    ScanState::Accumulating(pending)
                }
            };
            continue;
        }

        if let Some(caps) = declaration.captures(trimmed) {
            let raw_comment = match state {
                ScanState::Accumulating(ref pending) => pending.clone(),
                ScanState::Idle => String::new(),
            };

            let (requirement, rest) = extract_requirement(&raw_comment);
            let (directive, rest) = extract_directive(&rest, registry);

            let definition = EnvVarDefinition {
                name: caps[1].to_string(),
                example_value: caps[2].to_string(),
                requirement,
                directive,
                description: normalize_whitespace(&rest),
                raw_comment,
            };

            // Last-write-wins for duplicate names
            if let Some(existing) = schema
                .definitions
                .iter_mut()
                .find(|d| d.name == definition.name)
            {
                *existing = definition;
            } else {
                schema.definitions.push(definition);
            }

            state = ScanState::Idle;
            continue;
        }

        // Neither comment, blank, nor declaration: drop the pending block
        state = ScanState::Idle;
    }

    schema
}
