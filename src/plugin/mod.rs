//! Plugin registry - externally registered value sources and deploy targets
//!
//! The registry is an explicit value constructed once at startup and passed
//! by reference into the parser, the resolution pipeline, and diagnostics.
//! It is never ambient global state, and it is not mutated after
//! initialization.

use regex_lite::Regex;
use std::collections::HashMap;

use crate::resolve::{ResolvedValue, ResolverContext};
use crate::schema::EnvVarDefinition;
use crate::workspace::Workspace;

/// A plugin-supplied value source for one directive kind
///
/// The parser consults `match_pattern` when classifying comment blocks;
/// the resolution pipeline dispatches matching definitions to `resolve`,
/// gated by `is_available`.
pub trait ValueSource {
    /// Directive kind tag this source claims (e.g. "vercel-oidc")
    fn directive_kind(&self) -> &str;

    /// Pattern tested against the finished comment block
    fn match_pattern(&self) -> &Regex;

    /// Produce a value for a definition claimed by this source
    fn resolve(&self, definition: &EnvVarDefinition, ctx: &mut ResolverContext) -> ResolvedValue;

    /// Whether the source can currently produce values (e.g. CLI logged in)
    fn is_available(&self, _ctx: &ResolverContext) -> bool {
        true
    }

    /// Warning attached when the source is unavailable
    fn unavailable_message(&self) -> Option<&str> {
        None
    }

    /// Platform-injected names this source exempts from missing-usage
    /// diagnostics
    fn ignore_missing(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A plugin-supplied deployment target (consumed at the CLI boundary only)
pub trait Deployment {
    fn name(&self) -> &str;

    /// Deploy targets applicable to a workspace (e.g. environments)
    fn targets(&self, workspace: &Workspace) -> Vec<String>;

    /// Push resolved values to one target
    fn deploy(
        &self,
        workspace: &Workspace,
        values: &HashMap<String, String>,
        target: &str,
    ) -> Result<(), String>;

    fn is_available(&self) -> bool {
        true
    }

    fn unavailable_message(&self) -> Option<&str> {
        None
    }
}

/// Process-lifetime registry of plugins, populated at startup
#[derive(Default)]
pub struct PluginRegistry {
    value_sources: Vec<Box<dyn ValueSource>>,
    deployments: Vec<Box<dyn Deployment>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value source. Registration order is match priority.
    pub fn register_value_source(&mut self, source: Box<dyn ValueSource>) {
        self.value_sources.push(source);
    }

    pub fn register_deployment(&mut self, deployment: Box<dyn Deployment>) {
        self.deployments.push(deployment);
    }

    /// Registered value sources in registration order
    pub fn value_sources(&self) -> impl Iterator<Item = &dyn ValueSource> {
        self.value_sources.iter().map(|s| s.as_ref())
    }

    pub fn deployments(&self) -> impl Iterator<Item = &dyn Deployment> {
        self.deployments.iter().map(|d| d.as_ref())
    }

    /// Find the value source claiming a directive kind
    pub fn value_source_for(&self, kind: &str) -> Option<&dyn ValueSource> {
        self.value_sources
            .iter()
            .find(|s| s.directive_kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Union of all plugin-contributed ignore-missing names
    pub fn ignore_missing(&self) -> Vec<String> {
        self.value_sources
            .iter()
            .flat_map(|s| s.ignore_missing())
            .collect()
    }
}
