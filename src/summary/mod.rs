//! Pass summaries - plain data consumed by reporting
//!
//! The engine exposes results as serializable data and leaves all
//! formatting to the reporting layer; the human renderings here are the
//! default CLI output, with `--json` emitting the structures verbatim.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

use crate::reconcile::ReconciliationResult;
use crate::resolve::ValueSourceTag;
use crate::scan::DiagnosisReport;

/// Schema identifier for pass summaries
pub const PASS_SUMMARY_SCHEMA_ID: &str = "envsync/pass_summary@1";

/// A warning accumulated during a pass, reported in aggregate at the end
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub workspace: String,
    pub variable: String,
    pub message: String,
}

/// Per-workspace outcome of a sync/check pass
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceOutcome {
    pub workspace: String,

    /// Classification for this workspace
    pub reconciliation: ReconciliationResult,

    /// Variables written this pass (name, source tag)
    pub written: Vec<(String, ValueSourceTag)>,

    /// Variables explicitly skipped (no update written)
    pub skipped: Vec<String>,

    /// Required variables that ended up skipped - a caller-visible
    /// failure signal in check workflows
    pub required_skipped: Vec<String>,
}

/// Aggregate result of one multi-workspace pass
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub schema_id: String,

    pub created_at: DateTime<Utc>,

    /// Config file digest when one was loaded
    pub config_digest: Option<String>,

    pub outcomes: Vec<WorkspaceOutcome>,

    pub warnings: Vec<Warning>,
}

impl PassSummary {
    pub fn new(config_digest: Option<String>) -> Self {
        Self {
            schema_id: PASS_SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config_digest,
            outcomes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether a check-style workflow should fail
    pub fn check_failed(&self) -> bool {
        self.outcomes.iter().any(|o| {
            !o.required_skipped.is_empty()
                || o.reconciliation
                    .missing_required()
                    .iter()
                    .any(|d| !o.written.iter().any(|(name, _)| name == &d.name))
        })
    }

    pub fn total_missing(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.reconciliation.missing.len())
            .sum()
    }

    pub fn total_written(&self) -> usize {
        self.outcomes.iter().map(|o| o.written.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Default human rendering
    pub fn to_human(&self) -> String {
        let mut out = String::new();

        for outcome in &self.outcomes {
            let rec = &outcome.reconciliation;
            let _ = writeln!(
                out,
                "{}: {} ok, {} missing, {} extra",
                outcome.workspace,
                rec.valid.len(),
                rec.missing.len(),
                rec.extra.len()
            );
            for (name, source) in &outcome.written {
                let _ = writeln!(out, "  + {} ({:?})", name, source);
            }
            for name in &outcome.skipped {
                let _ = writeln!(out, "  ~ {} skipped", name);
            }
            for name in &rec.deprecated_still_present {
                let _ = writeln!(out, "  ! {} is deprecated but still set", name);
            }
            for (name, value) in &rec.overrides {
                let _ = writeln!(out, "  * {} overrides shared value ({})", name, value);
            }
        }

        if !self.warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings:");
            for warning in &self.warnings {
                let _ = writeln!(
                    out,
                    "  {}/{}: {}",
                    warning.workspace, warning.variable, warning.message
                );
            }
        }

        out
    }
}

/// Aggregate diagnose output across workspaces
#[derive(Debug, Clone, Serialize)]
pub struct DiagnoseSummary {
    pub created_at: DateTime<Utc>,

    /// (workspace name, report) pairs in pass order
    pub reports: Vec<(String, DiagnosisReport)>,

    pub files_scanned: usize,
    pub lines_scanned: usize,
}

impl DiagnoseSummary {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            reports: Vec::new(),
            files_scanned: 0,
            lines_scanned: 0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(|(_, r)| r.is_clean())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let mut out = String::new();

        for (workspace, report) in &self.reports {
            let _ = writeln!(
                out,
                "{}: {} defined, {} undocumented, {} unused",
                workspace,
                report.defined.len(),
                report.missing.len(),
                report.unused.len()
            );
            for (name, usages) in &report.missing {
                let _ = writeln!(out, "  ? {} ({} usages)", name, usages.len());
                if let Some(first) = usages.first() {
                    let _ = writeln!(out, "      e.g. {}:{}", first.file.display(), first.line);
                }
            }
            for name in &report.unused {
                let _ = writeln!(out, "  - {} declared but never referenced", name);
            }
        }

        let _ = writeln!(
            out,
            "\nScanned {} files, {} lines.",
            self.files_scanned, self.lines_scanned
        );

        out
    }
}

impl Default for DiagnoseSummary {
    fn default() -> Self {
        Self::new()
    }
}
