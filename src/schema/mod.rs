//! Schema model - declared env variables and their directives
//!
//! A schema is the ordered set of variable definitions declared by one
//! example file (`.env.example`). Each definition carries a requirement
//! level and a resolution directive parsed from the comment block
//! immediately above the declaration.

mod directive;
mod merge;
mod parser;

pub use directive::{extract_directive, extract_requirement, DirectiveRule};
pub use merge::merge_schemas;
pub use parser::{parse_example_file, parse_example_text, SchemaError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How strongly a variable is expected to be present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementLevel {
    Required,
    Optional,
    Deprecated,
}

impl Default for RequirementLevel {
    fn default() -> Self {
        RequirementLevel::Optional
    }
}

/// How a missing variable's value should be obtained
///
/// One variant per directive kind; plugin-registered kinds carry the raw
/// matched comment text for pass-through to the external resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Directive {
    /// Ask interactively
    Prompt,
    /// Use the example value as-is
    Placeholder,
    /// Generate programmatically (currently always falls back to the
    /// example value with a warning)
    Computed { compute_kind: String },
    /// Value equals another variable's current value
    Copy { source: String },
    /// Literal fallback value
    Default { value: String },
    /// Yes/no prompt mapped to two literal strings
    Boolean { yes: String, no: String },
    /// Only meaningful outside CI; skipped when non-interactive
    LocalOnly,
    /// Registered by an external plugin; `raw` is the matched comment text
    Plugin { plugin_kind: String, raw: String },
}

impl Directive {
    /// Tag used for dispatch and reporting
    pub fn kind(&self) -> &str {
        match self {
            Directive::Prompt => "prompt",
            Directive::Placeholder => "placeholder",
            Directive::Computed { .. } => "computed",
            Directive::Copy { .. } => "copy",
            Directive::Default { .. } => "default",
            Directive::Boolean { .. } => "boolean",
            Directive::LocalOnly => "local-only",
            Directive::Plugin { plugin_kind, .. } => plugin_kind,
        }
    }
}

/// One declared variable from an example file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarDefinition {
    /// Variable name - unique key within a schema
    pub name: String,

    /// Value on the declaration line (may be empty)
    pub example_value: String,

    pub requirement: RequirementLevel,

    pub directive: Directive,

    /// Comment text with requirement/directive tags removed,
    /// whitespace-normalized
    pub description: String,

    /// The full comment block as accumulated, before tag extraction
    pub raw_comment: String,
}

/// Ordered definitions parsed from one example file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvSchema {
    /// Where this schema was read from
    pub source_path: PathBuf,

    /// Definitions in declaration order (last-write-wins for duplicates)
    pub definitions: Vec<EnvVarDefinition>,
}

impl EnvSchema {
    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&EnvVarDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Declared names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
