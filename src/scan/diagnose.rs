//! Diagnostic cross-check between scanned usages and declared schemas
//!
//! A used name with no declaration is undocumented (`missing`); a declared
//! name with zero usages is `unused`. Static regex scanning cannot prove a
//! variable is truly unused (indirect access, dynamic keys), so `unused`
//! is best-effort and advisory.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use super::{ScanResult, Usage};

/// Platform-injected names exempt from missing-usage diagnostics
pub const BUILTIN_IGNORE_MISSING: &[&str] =
    &["NODE_ENV", "CI", "VERCEL", "VERCEL_ENV", "VERCEL_URL"];

/// The built-in ignore set unioned with extra exclusions (configured and
/// plugin-contributed)
pub fn builtin_ignore_missing(extra: &[String]) -> HashSet<String> {
    BUILTIN_IGNORE_MISSING
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned())
        .collect()
}

/// Result of cross-checking usages against declarations
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosisReport {
    /// Used but undeclared, with usage evidence, in encounter order
    pub missing: IndexMap<String, Vec<Usage>>,

    /// Declared but never referenced (best-effort)
    pub unused: Vec<String>,

    /// Used and declared, in encounter order
    pub defined: Vec<String>,
}

impl DiagnosisReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unused.is_empty()
    }
}

/// Cross-check scanned usages against the declared names
pub fn diagnose(
    scan: &ScanResult,
    declared_names: &[String],
    ignore_missing: &HashSet<String>,
    ignore_unused: &HashSet<String>,
) -> DiagnosisReport {
    let declared: HashSet<&str> = declared_names.iter().map(|n| n.as_str()).collect();

    let mut report = DiagnosisReport::default();

    for (name, usages) in &scan.usages_by_name {
        if declared.contains(name.as_str()) {
            report.defined.push(name.clone());
        } else if !ignore_missing.contains(name) {
            report.missing.insert(name.clone(), usages.clone());
        }
    }

    for name in declared_names {
        if !scan.usages_by_name.contains_key(name) && !ignore_unused.contains(name) {
            report.unused.push(name.clone());
        }
    }

    report
}
