//! Schema merge
//!
//! Combines the shared (root) schema with a workspace-specific schema into
//! one effective definition list. Merge is keyed by name and all-or-nothing
//! per definition: a name present in both sources yields the specific
//! definition in its entirety. Field-level mixing across sources would be
//! ambiguous.

use indexmap::IndexMap;

use super::{EnvSchema, EnvVarDefinition};

/// Merge shared and workspace-specific schemas
///
/// Shared definitions are inserted first, then specific definitions
/// overwrite by key. Iteration order is insertion order; a re-inserted key
/// keeps its original (shared-pass) position, which is IndexMap's `insert`
/// behavior.
pub fn merge_schemas(shared: &EnvSchema, specific: &EnvSchema) -> Vec<EnvVarDefinition> {
    let mut merged: IndexMap<String, EnvVarDefinition> = IndexMap::new();

    for def in &shared.definitions {
        merged.insert(def.name.clone(), def.clone());
    }
    for def in &specific.definitions {
        merged.insert(def.name.clone(), def.clone());
    }

    merged.into_values().collect()
}
