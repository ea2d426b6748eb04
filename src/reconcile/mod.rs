//! Reconciler - classifies every schema variable against actual values
//!
//! This is a pure function: (effective schema, local values, shared
//! context) -> ReconciliationResult. The result is produced once per
//! workspace per pass and consumed by reporting and by the resolution
//! pipeline's "which variables need resolving" input.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::schema::{EnvVarDefinition, RequirementLevel};
use crate::values::EnvLocalValues;

/// Classification of one workspace's variables for one pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// Workspace name this result belongs to
    pub workspace: String,

    /// Declared variables holding a non-empty value
    pub valid: Vec<EnvVarDefinition>,

    /// Declared variables absent or empty (deprecated entries exempt)
    pub missing: Vec<EnvVarDefinition>,

    /// Actual names not declared by any schema (order-independent)
    pub extra: BTreeSet<String>,

    /// Deprecated names still present in actual values
    pub deprecated_still_present: Vec<String>,

    /// Shared variables whose workspace value diverges from the canonical
    /// shared value (name -> this workspace's value)
    pub overrides: HashMap<String, String>,
}

impl ReconciliationResult {
    /// Missing variables with requirement `required`
    pub fn missing_required(&self) -> Vec<&EnvVarDefinition> {
        self.missing
            .iter()
            .filter(|d| d.requirement == RequirementLevel::Required)
            .collect()
    }

    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare an effective schema against a workspace's actual values
///
/// `shared_values`/`shared_names` carry the canonical shared values and the
/// set of names declared by the shared schema; when supplied, divergent
/// non-empty values for shared names are recorded as overrides. Equal
/// values are never overrides.
pub fn compare(
    schema: &[EnvVarDefinition],
    actual: &EnvLocalValues,
    workspace: &str,
    shared_values: Option<&HashMap<String, String>>,
    shared_names: Option<&HashSet<String>>,
) -> ReconciliationResult {
    let mut valid = Vec::new();
    let mut missing = Vec::new();
    let mut deprecated_still_present = Vec::new();
    let mut overrides = HashMap::new();

    for def in schema {
        if def.requirement == RequirementLevel::Deprecated {
            // Removing a deprecated variable is never an error; holding any
            // entry for it (even empty) is flagged
            if actual.contains(&def.name) {
                deprecated_still_present.push(def.name.clone());
            }
            continue;
        }

        match actual.get(&def.name) {
            Some(value) if !value.is_empty() => {
                if let (Some(canonical), Some(names)) = (shared_values, shared_names) {
                    if names.contains(&def.name) {
                        if let Some(shared) = canonical.get(&def.name) {
                            if shared != value {
                                overrides.insert(def.name.clone(), value.to_string());
                            }
                        }
                    }
                }
                valid.push(def.clone());
            }
            _ => missing.push(def.clone()),
        }
    }

    let declared: HashSet<&str> = schema.iter().map(|d| d.name.as_str()).collect();
    let extra: BTreeSet<String> = actual
        .values
        .keys()
        .filter(|name| !declared.contains(name.as_str()))
        .cloned()
        .collect();

    ReconciliationResult {
        workspace: workspace.to_string(),
        valid,
        missing,
        extra,
        deprecated_still_present,
        overrides,
    }
}

/// Compute canonical shared values across all workspaces
///
/// For each shared name, the canonical value is the most common non-empty
/// value across the supplied workspace value sets. Ties break
/// first-encountered-wins in workspace iteration order, so the result is
/// deterministic given a stable workspace order.
pub fn canonical_shared_values(
    shared_names: &HashSet<String>,
    workspace_values: &[&EnvLocalValues],
) -> HashMap<String, String> {
    let mut canonical = HashMap::new();

    for name in shared_names {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for values in workspace_values {
            if let Some(value) = values.get(name) {
                if !value.is_empty() {
                    *counts.entry(value).or_insert(0) += 1;
                }
            }
        }

        // max_by_key keeps the last max; iterate manually so the first
        // encountered value wins ties
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in &counts {
            if best.map_or(true, |(_, n)| *count > n) {
                best = Some((*value, *count));
            }
        }

        if let Some((value, _)) = best {
            canonical.insert(name.clone(), value.to_string());
        }
    }

    canonical
}
