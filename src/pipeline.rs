//! Pass orchestration
//!
//! One reconciliation pass runs parse -> merge -> compare -> resolve ->
//! write over the discovered workspaces, strictly sequentially: a
//! workspace is fully resolved (including any interactive prompts) before
//! the next begins. Warnings accumulate across the whole pass and never
//! interrupt it; I/O failures are fatal.

use std::collections::HashSet;
use std::fs;
use std::io;

use crate::config::{ConfigError, LoadedConfig};
use crate::plugin::PluginRegistry;
use crate::prompt::Prompter;
use crate::reconcile::{canonical_shared_values, compare};
use crate::resolve::{resolve, ResolverContext};
use crate::scan::{builtin_ignore_missing, diagnose, scan, ScanError};
use crate::schema::{merge_schemas, parse_example_file, EnvSchema, SchemaError};
use crate::summary::{DiagnoseSummary, PassSummary, Warning, WorkspaceOutcome};
use crate::values::{apply_updates, read_local_values, EnvLocalValues, PendingUpdate, ValuesError};
use crate::workspace::{discover_workspaces, Workspace, WorkspaceError};

/// Pipeline errors - all fatal; expected conditions surface as warnings
/// in the summary instead
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("workspace discovery error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("values file error: {0}")]
    Values(#[from] ValuesError),

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Workspace(_) => 2,
            PipelineError::Schema(_) => 1,
            PipelineError::Values(_) => 1,
            PipelineError::Scan(_) => 1,
            PipelineError::Io(_) => 1,
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// How a pass behaves
#[derive(Debug, Clone, Copy)]
pub struct PassOptions {
    /// Whether prompting is allowed
    pub interactive: bool,

    /// Whether resolved values are written back (false for check)
    pub write: bool,
}

/// One loaded workspace: its specific schema and current values
struct WorkspaceState {
    workspace: Workspace,
    schema: EnvSchema,
    values: EnvLocalValues,
}

/// Run a sync or check pass over all workspaces
pub fn run_pass(
    root: &std::path::Path,
    loaded: &LoadedConfig,
    registry: &PluginRegistry,
    prompter: &dyn Prompter,
    options: PassOptions,
) -> Result<PassSummary, PipelineError> {
    let config = &loaded.config;
    let workspaces = discover_workspaces(root, config)?;

    // The root workspace's example file is the shared schema
    let shared = parse_example_file(&workspaces[0].example_file(config), registry)?;
    let shared_names: HashSet<String> = shared.names().into_iter().collect();

    // Read everything up front: canonical shared values need every
    // workspace's values before any comparison runs
    let mut states = Vec::with_capacity(workspaces.len());
    for workspace in workspaces {
        let schema = parse_example_file(&workspace.example_file(config), registry)?;
        let values = read_local_values(&workspace.local_file(config))?;
        states.push(WorkspaceState {
            workspace,
            schema,
            values,
        });
    }

    let all_values: Vec<&EnvLocalValues> = states.iter().map(|s| &s.values).collect();
    let canonical = canonical_shared_values(&shared_names, &all_values);

    let mut summary = PassSummary::new(loaded.digest.clone());

    for state in &states {
        let merged = merge_schemas(&shared, &state.schema);
        let reconciliation = compare(
            &merged,
            &state.values,
            &state.workspace.name,
            Some(&canonical),
            Some(&shared_names),
        );

        let mut outcome = WorkspaceOutcome {
            workspace: state.workspace.name.clone(),
            reconciliation,
            written: Vec::new(),
            skipped: Vec::new(),
            required_skipped: Vec::new(),
        };

        if options.write {
            let mut ctx = ResolverContext::new(
                state.workspace.clone(),
                state.values.values.clone(),
                options.interactive,
                config,
                prompter,
            );

            let mut updates: Vec<PendingUpdate> = Vec::new();
            let missing = outcome.reconciliation.missing.clone();

            for def in &missing {
                let resolved = resolve(def, &mut ctx, registry);

                if let Some(message) = &resolved.warning {
                    summary.warnings.push(Warning {
                        workspace: state.workspace.name.clone(),
                        variable: def.name.clone(),
                        message: message.clone(),
                    });
                }

                if resolved.skipped {
                    outcome.skipped.push(def.name.clone());
                    if def.requirement == crate::schema::RequirementLevel::Required {
                        outcome.required_skipped.push(def.name.clone());
                    }
                    continue;
                }

                // Later copy directives in this batch must observe the value
                ctx.current_values
                    .insert(def.name.clone(), resolved.value.clone());

                // Writing an unchanged value would be churn: only declare
                // updates for values the file does not already hold
                let unchanged = state.values.values.get(&def.name) == Some(&resolved.value);
                if !unchanged {
                    updates.push(PendingUpdate {
                        name: def.name.clone(),
                        value: resolved.value.clone(),
                        description: if def.description.is_empty() {
                            None
                        } else {
                            Some(def.description.clone())
                        },
                    });
                    outcome.written.push((def.name.clone(), resolved.source));
                }
            }

            if !updates.is_empty() {
                let rewritten = apply_updates(&state.values.original_text, &updates);
                fs::write(state.workspace.local_file(config), rewritten)
                    .map_err(ValuesError::Write)?;
            }
        }

        summary.outcomes.push(outcome);
    }

    Ok(summary)
}

/// Run the diagnose workflow: scan every workspace's source tree and
/// cross-check against its effective schema
pub fn run_diagnose(
    root: &std::path::Path,
    loaded: &LoadedConfig,
    registry: &PluginRegistry,
) -> Result<DiagnoseSummary, PipelineError> {
    let config = &loaded.config;
    let workspaces = discover_workspaces(root, config)?;

    let shared = parse_example_file(&workspaces[0].example_file(config), registry)?;

    let mut ignore_missing_extra = config.scan.ignore_missing.clone();
    ignore_missing_extra.extend(registry.ignore_missing());
    let ignore_missing = builtin_ignore_missing(&ignore_missing_extra);
    let ignore_unused: HashSet<String> = config.scan.ignore_unused.iter().cloned().collect();

    // When scanning the root workspace, prune the directories that hold
    // the other workspaces so their code is not double-counted
    let mut root_scan_config = config.scan.clone();
    for workspace in workspaces.iter().skip(1) {
        if let Some(first) = workspace.name.split('/').next() {
            if !root_scan_config.skip_dirs.iter().any(|d| d == first) {
                root_scan_config.skip_dirs.push(first.to_string());
            }
        }
    }

    let mut summary = DiagnoseSummary::new();

    for (index, workspace) in workspaces.iter().enumerate() {
        let schema = parse_example_file(&workspace.example_file(config), registry)?;
        let merged = merge_schemas(&shared, &schema);
        let declared: Vec<String> = merged.iter().map(|d| d.name.clone()).collect();

        let scan_config = if index == 0 {
            &root_scan_config
        } else {
            &config.scan
        };
        let scanned = scan(&workspace.root, scan_config)?;

        summary.files_scanned += scanned.files_scanned;
        summary.lines_scanned += scanned.lines_scanned;

        let report = diagnose(&scanned, &declared, &ignore_missing, &ignore_unused);
        summary.reports.push((workspace.name.clone(), report));
    }

    Ok(summary)
}
