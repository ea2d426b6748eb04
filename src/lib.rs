//! envsync - schema-driven env file reconciliation
//!
//! envsync keeps a declarative env-variable schema (a commented
//! `.env.example`) and the actual values a workspace holds (`.env.local`)
//! consistent across a multi-project workspace tree: a shared root schema
//! merges with per-workspace overrides, every variable is classified
//! (valid / missing / extra / deprecated / overridden), missing values
//! are resolved through a pluggable strategy pipeline, and a static
//! source scanner cross-checks declared variables against the variables
//! code actually references.

pub mod config;
pub mod pipeline;
pub mod plugin;
pub mod prompt;
pub mod reconcile;
pub mod resolve;
pub mod scan;
pub mod schema;
pub mod summary;
pub mod values;
pub mod workspace;

pub use config::{LoadedConfig, SyncConfig};
pub use pipeline::{run_diagnose, run_pass, PassOptions, PipelineError};
pub use plugin::{Deployment, PluginRegistry, ValueSource};
pub use reconcile::{canonical_shared_values, compare, ReconciliationResult};
pub use resolve::{resolve, ResolvedValue, ResolverContext, ValueSourceTag};
pub use schema::{
    merge_schemas, parse_example_file, parse_example_text, Directive, EnvSchema,
    EnvVarDefinition, RequirementLevel,
};
pub use values::{apply_updates, read_local_values, EnvLocalValues};
pub use workspace::{discover_workspaces, Workspace};
