//! Value resolution pipeline
//!
//! Given a missing variable's directive, produce a value or an explicit
//! skip. Never fails for expected conditions (unavailability, absence,
//! skips) - those surface as warnings on the `ResolvedValue`. Registered
//! external resolvers are consulted before the built-in strategies, so
//! plugins override built-ins without runtime type inspection.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::SyncConfig;
use crate::plugin::PluginRegistry;
use crate::prompt::Prompter;
use crate::schema::{Directive, EnvVarDefinition, RequirementLevel};
use crate::workspace::Workspace;

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSourceTag {
    /// Value already present at the start of the pass
    Existing,
    Prompt,
    Boolean,
    Computed,
    Copy,
    Default,
    LocalOnly,
    Placeholder,
    /// Produced by the named external resolver
    Plugin(String),
}

/// Outcome of resolving one variable
///
/// `skipped` means no update will be written; it is distinct from an
/// empty string value, which is a valid (if unusual) resolved value.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedValue {
    pub value: String,
    pub source: ValueSourceTag,
    pub skipped: bool,
    pub warning: Option<String>,
}

impl ResolvedValue {
    pub fn value(value: impl Into<String>, source: ValueSourceTag) -> Self {
        Self {
            value: value.into(),
            source,
            skipped: false,
            warning: None,
        }
    }

    pub fn skipped(source: ValueSourceTag) -> Self {
        Self {
            value: String::new(),
            source,
            skipped: true,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// The pipeline's only interaction with the outside world
///
/// Created once per workspace per pass and threaded through every
/// resolution call; never shared across workspaces. `current_values` is
/// mutated as sibling variables resolve so later `copy` directives
/// observe freshly-resolved values within the same pass.
pub struct ResolverContext<'a> {
    pub workspace: Workspace,

    /// Currently-known values, updated after each resolution
    pub current_values: HashMap<String, String>,

    /// False under check-only workflows or when no terminal is attached
    pub interactive: bool,

    /// Whether a CI environment was detected
    pub in_ci: bool,

    pub config: &'a SyncConfig,

    pub prompter: &'a dyn Prompter,
}

impl<'a> ResolverContext<'a> {
    pub fn new(
        workspace: Workspace,
        current_values: HashMap<String, String>,
        interactive: bool,
        config: &'a SyncConfig,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            workspace,
            current_values,
            interactive,
            in_ci: crate::prompt::running_in_ci(),
            config,
            prompter,
        }
    }

    fn current(&self, name: &str) -> Option<&str> {
        self.current_values.get(name).map(|v| v.as_str())
    }
}

/// Resolve one variable's value
///
/// A non-empty value already present at the start of the pass wins
/// unconditionally - strategies never override existing values, which
/// makes re-running sync on a satisfied workspace a no-op.
pub fn resolve(
    definition: &EnvVarDefinition,
    ctx: &mut ResolverContext,
    registry: &PluginRegistry,
) -> ResolvedValue {
    if let Some(existing) = ctx.current(&definition.name) {
        if !existing.is_empty() {
            return ResolvedValue::value(existing, ValueSourceTag::Existing);
        }
    }

    // External resolvers claim kinds ahead of the built-in switch
    if let Some(source) = registry.value_source_for(definition.directive.kind()) {
        if !source.is_available(ctx) {
            let message = source
                .unavailable_message()
                .unwrap_or("resolver unavailable")
                .to_string();
            let resolved =
                ResolvedValue::value(&definition.example_value, ValueSourceTag::Placeholder)
                    .with_warning(message);
            return flag_required_empty(definition, resolved);
        }
        return source.resolve(definition, ctx);
    }

    let resolved = match &definition.directive {
        Directive::Prompt => resolve_prompt(definition, ctx),
        Directive::Boolean { yes, no } => resolve_boolean(definition, yes, no, ctx),
        Directive::Computed { compute_kind } => {
            ResolvedValue::value(&definition.example_value, ValueSourceTag::Computed)
                .with_warning(format!(
                    "compute kind '{}' is not supported; using the example value for {}",
                    compute_kind, definition.name
                ))
        }
        Directive::Copy { source } => {
            // Absent source yields an empty value; callers treat this as
            // still-missing
            let value = ctx.current(source).unwrap_or("").to_string();
            ResolvedValue::value(value, ValueSourceTag::Copy)
        }
        Directive::Default { value } => {
            let value = if value.is_empty() && !definition.example_value.is_empty() {
                definition.example_value.clone()
            } else {
                value.clone()
            };
            ResolvedValue::value(value, ValueSourceTag::Default)
        }
        Directive::LocalOnly => {
            if !ctx.interactive || ctx.in_ci {
                ResolvedValue::skipped(ValueSourceTag::LocalOnly)
            } else {
                ResolvedValue::value(&definition.example_value, ValueSourceTag::LocalOnly)
            }
        }
        Directive::Placeholder => {
            ResolvedValue::value(&definition.example_value, ValueSourceTag::Placeholder)
        }
        Directive::Plugin { plugin_kind, .. } => {
            // Parsed by a plugin pattern but no resolver claims the kind
            ResolvedValue::value(&definition.example_value, ValueSourceTag::Placeholder)
                .with_warning(format!(
                    "no resolver registered for directive kind '{}'",
                    plugin_kind
                ))
        }
    };

    flag_required_empty(definition, resolved)
}

fn resolve_prompt(definition: &EnvVarDefinition, ctx: &mut ResolverContext) -> ResolvedValue {
    if !ctx.interactive {
        // Must not block: emit a clearly-marked placeholder instead of an
        // empty string
        return ResolvedValue::value(
            format!("REPLACE_ME_{}", definition.name),
            ValueSourceTag::Prompt,
        )
        .with_warning(format!(
            "{} needs a value; non-interactive mode wrote a placeholder",
            definition.name
        ));
    }

    let question = if definition.description.is_empty() {
        format!("Value for {}", definition.name)
    } else {
        format!("Value for {} ({})", definition.name, definition.description)
    };
    let answer = ctx.prompter.ask(&question);
    ResolvedValue::value(answer, ValueSourceTag::Prompt)
}

fn resolve_boolean(
    definition: &EnvVarDefinition,
    yes: &str,
    no: &str,
    ctx: &mut ResolverContext,
) -> ResolvedValue {
    let example = definition.example_value.trim();
    let default_yes = example.eq_ignore_ascii_case(yes)
        || example.eq_ignore_ascii_case("true")
        || example.eq_ignore_ascii_case("yes");

    if !ctx.interactive {
        let value = if default_yes { yes } else { no };
        return ResolvedValue::value(value, ValueSourceTag::Boolean);
    }

    let question = if definition.description.is_empty() {
        format!("Enable {}?", definition.name)
    } else {
        format!("Enable {}? ({})", definition.name, definition.description)
    };
    let answer = ctx.prompter.confirm(&question, default_yes);
    let value = if answer { yes } else { no };
    ResolvedValue::value(value, ValueSourceTag::Boolean)
}

/// Attach a warning when a required variable comes out empty and unskipped
fn flag_required_empty(definition: &EnvVarDefinition, resolved: ResolvedValue) -> ResolvedValue {
    if definition.requirement == RequirementLevel::Required
        && resolved.value.is_empty()
        && !resolved.skipped
        && resolved.warning.is_none()
    {
        let name = definition.name.clone();
        return resolved.with_warning(format!("required variable {} has no value", name));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::schema::{parse_example_text, EnvSchema};

    fn definition(text: &str) -> EnvVarDefinition {
        let schema: EnvSchema = parse_example_text(text, &PluginRegistry::new());
        schema.definitions.into_iter().next().unwrap()
    }

    fn context<'a>(
        config: &'a SyncConfig,
        prompter: &'a dyn Prompter,
        interactive: bool,
    ) -> ResolverContext<'a> {
        ResolverContext {
            workspace: Workspace::new("web", "/tmp/web"),
            current_values: HashMap::new(),
            interactive,
            in_ci: false,
            config,
            prompter,
        }
    }

    #[test]
    fn test_existing_value_short_circuits() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&["should-not-be-used"]);
        let mut ctx = context(&config, &prompter, true);
        ctx.current_values
            .insert("KEY".to_string(), "already-set".to_string());

        let def = definition("# [prompt]\nKEY=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "already-set");
        assert_eq!(resolved.source, ValueSourceTag::Existing);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_empty_existing_does_not_short_circuit() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);
        ctx.current_values.insert("KEY".to_string(), String::new());

        let def = definition("# [default:fallback]\nKEY=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "fallback");
        assert_eq!(resolved.source, ValueSourceTag::Default);
    }

    #[test]
    fn test_prompt_interactive() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&["typed-value"]);
        let mut ctx = context(&config, &prompter, true);

        let def = definition("# API token [prompt]\nTOKEN=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "typed-value");
        assert_eq!(resolved.source, ValueSourceTag::Prompt);
        assert!(prompter.asked()[0].contains("TOKEN"));
        assert!(prompter.asked()[0].contains("API token"));
    }

    #[test]
    fn test_prompt_non_interactive_marks_placeholder() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [prompt]\nTOKEN=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "REPLACE_ME_TOKEN");
        assert!(resolved.warning.is_some());
        assert!(!resolved.skipped);
    }

    #[test]
    fn test_boolean_non_interactive_uses_example_default() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [boolean:on/off]\nFLAG=on\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "on");

        let def = definition("# [boolean:on/off]\nFLAG=off\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "off");
    }

    #[test]
    fn test_boolean_true_yes_affirmative() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [boolean:on/off]\nFLAG=TRUE\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "on");
    }

    #[test]
    fn test_boolean_interactive_maps_literals() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&["n"]);
        let mut ctx = context(&config, &prompter, true);

        let def = definition("# [boolean:enabled/disabled]\nFLAG=enabled\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "disabled");
    }

    #[test]
    fn test_computed_falls_back_with_warning() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, true);

        let def = definition("# [computed:uuid]\nID=example-id\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "example-id");
        assert_eq!(resolved.source, ValueSourceTag::Computed);
        assert!(resolved.warning.as_ref().unwrap().contains("uuid"));
    }

    #[test]
    fn test_copy_reads_current_values() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);
        ctx.current_values
            .insert("SOURCE".to_string(), "copied".to_string());

        let def = definition("# [copy:SOURCE]\nTARGET=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "copied");
        assert_eq!(resolved.source, ValueSourceTag::Copy);
    }

    #[test]
    fn test_copy_absent_source_yields_empty() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [copy:NOWHERE]\nTARGET=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.value, "");
        assert!(!resolved.skipped);
    }

    #[test]
    fn test_default_literal() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [default:8080]\nPORT=3000\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "8080");
    }

    #[test]
    fn test_default_empty_literal_uses_example() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [default:]\nPORT=3000\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "3000");
    }

    #[test]
    fn test_local_only_skipped_non_interactive() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# [local-only]\nDEV_PORT=5173\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert!(resolved.skipped);
        assert_eq!(resolved.value, "");
    }

    #[test]
    fn test_local_only_skipped_in_ci() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, true);
        ctx.in_ci = true;

        let def = definition("# [local-only]\nDEV_PORT=5173\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert!(resolved.skipped);
    }

    #[test]
    fn test_local_only_interactive_uses_example() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, true);

        let def = definition("# [local-only]\nDEV_PORT=5173\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert!(!resolved.skipped);
        assert_eq!(resolved.value, "5173");
    }

    #[test]
    fn test_placeholder_uses_example() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("EXAMPLE=sample\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());
        assert_eq!(resolved.value, "sample");
        assert_eq!(resolved.source, ValueSourceTag::Placeholder);
    }

    #[test]
    fn test_required_empty_placeholder_warns() {
        let config = SyncConfig::default();
        let prompter = ScriptedPrompter::new(&[]);
        let mut ctx = context(&config, &prompter, false);

        let def = definition("# API key [required]\nAPI_KEY=\n");
        let resolved = resolve(&def, &mut ctx, &PluginRegistry::new());

        assert_eq!(resolved.source, ValueSourceTag::Placeholder);
        assert_eq!(resolved.value, "");
        assert!(resolved.warning.as_ref().unwrap().contains("API_KEY"));
    }

    mod plugin_dispatch {
        use super::*;
        use regex_lite::Regex;

        struct StubSource {
            pattern: Regex,
            available: bool,
        }

        impl crate::plugin::ValueSource for StubSource {
            fn directive_kind(&self) -> &str {
                "stub"
            }

            fn match_pattern(&self) -> &Regex {
                &self.pattern
            }

            fn resolve(
                &self,
                _def: &EnvVarDefinition,
                _ctx: &mut ResolverContext,
            ) -> ResolvedValue {
                ResolvedValue::value("plugin-value", ValueSourceTag::Plugin("stub".to_string()))
            }

            fn is_available(&self, _ctx: &ResolverContext) -> bool {
                self.available
            }

            fn unavailable_message(&self) -> Option<&str> {
                Some("stub CLI is not logged in")
            }
        }

        fn registry(available: bool) -> PluginRegistry {
            let mut registry = PluginRegistry::new();
            registry.register_value_source(Box::new(StubSource {
                pattern: Regex::new(r"\[stub\]").unwrap(),
                available,
            }));
            registry
        }

        #[test]
        fn test_plugin_claims_kind() {
            let registry = registry(true);
            let config = SyncConfig::default();
            let prompter = ScriptedPrompter::new(&[]);
            let mut ctx = context(&config, &prompter, false);

            let schema = parse_example_text("# [stub]\nKEY=example\n", &registry);
            let resolved = resolve(&schema.definitions[0], &mut ctx, &registry);

            assert_eq!(resolved.value, "plugin-value");
            assert_eq!(
                resolved.source,
                ValueSourceTag::Plugin("stub".to_string())
            );
        }

        #[test]
        fn test_unavailable_plugin_degrades_to_placeholder() {
            let registry = registry(false);
            let config = SyncConfig::default();
            let prompter = ScriptedPrompter::new(&[]);
            let mut ctx = context(&config, &prompter, false);

            let schema = parse_example_text("# [stub]\nKEY=example\n", &registry);
            let resolved = resolve(&schema.definitions[0], &mut ctx, &registry);

            assert_eq!(resolved.value, "example");
            assert_eq!(resolved.source, ValueSourceTag::Placeholder);
            assert_eq!(
                resolved.warning.as_deref(),
                Some("stub CLI is not logged in")
            );
        }

        #[test]
        fn test_unclaimed_plugin_directive_falls_back() {
            // Parsed with the plugin registered, resolved without it
            let parse_registry = registry(true);
            let schema = parse_example_text("# [stub]\nKEY=example\n", &parse_registry);

            let config = SyncConfig::default();
            let prompter = ScriptedPrompter::new(&[]);
            let mut ctx = context(&config, &prompter, false);

            let resolved = resolve(&schema.definitions[0], &mut ctx, &PluginRegistry::new());
            assert_eq!(resolved.value, "example");
            assert!(resolved.warning.as_ref().unwrap().contains("stub"));
        }
    }
}
