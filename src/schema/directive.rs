//! Directive-tag extraction from comment blocks
//!
//! Operates on the finished comment string produced by the line scanner.
//! Tags are bracket-delimited tokens anywhere in the text, e.g.
//! `[required]`, `[default:8080]`, `[boolean:on/off]`. Plugin-registered
//! patterns are tested before built-ins, in registration order; built-ins
//! are tested in a fixed priority order. Matched text is removed from the
//! description (first occurrence per tag only).

use regex_lite::Regex;

use super::{Directive, RequirementLevel};
use crate::plugin::PluginRegistry;

/// One built-in extraction rule: tag name, pattern, and a builder that
/// turns the captures into a directive.
pub struct DirectiveRule {
    pub tag: &'static str,
    pattern: Regex,
    build: fn(&regex_lite::Captures) -> Directive,
}

/// Built-in rules in priority order. First match wins.
pub(crate) fn builtin_rules() -> Vec<DirectiveRule> {
    vec![
        DirectiveRule {
            tag: "prompt",
            pattern: Regex::new(r"\[prompt\]").unwrap(),
            build: |_| Directive::Prompt,
        },
        DirectiveRule {
            tag: "computed",
            pattern: Regex::new(r"\[computed:([^\]]+)\]").unwrap(),
            build: |c| Directive::Computed {
                compute_kind: c[1].trim().to_string(),
            },
        },
        DirectiveRule {
            tag: "copy",
            pattern: Regex::new(r"\[copy:([A-Za-z_][A-Za-z0-9_]*)\]").unwrap(),
            build: |c| Directive::Copy {
                source: c[1].to_string(),
            },
        },
        DirectiveRule {
            tag: "default",
            // Value is everything up to the closing bracket, so it cannot
            // itself contain `]`.
            pattern: Regex::new(r"\[default:([^\]]*)\]").unwrap(),
            build: |c| Directive::Default {
                value: c[1].to_string(),
            },
        },
        DirectiveRule {
            tag: "boolean",
            pattern: Regex::new(r"\[boolean(?::([^\]/]*)/([^\]]*))?\]").unwrap(),
            build: |c| Directive::Boolean {
                yes: c.get(1).map_or("true", |m| m.as_str()).to_string(),
                no: c.get(2).map_or("false", |m| m.as_str()).to_string(),
            },
        },
        DirectiveRule {
            tag: "local-only",
            pattern: Regex::new(r"\[local-only\]").unwrap(),
            build: |_| Directive::LocalOnly,
        },
        DirectiveRule {
            tag: "placeholder",
            pattern: Regex::new(r"\[placeholder\]").unwrap(),
            build: |_| Directive::Placeholder,
        },
    ]
}

/// Extract the requirement level from a comment, removing the first
/// occurrence of the tag from the text. Defaults to `optional`.
pub fn extract_requirement(comment: &str) -> (RequirementLevel, String) {
    let pattern = Regex::new(r"\[(required|optional|deprecated)\]").unwrap();

    if let Some(m) = pattern.captures(comment) {
        let level = match &m[1] {
            "required" => RequirementLevel::Required,
            "deprecated" => RequirementLevel::Deprecated,
            _ => RequirementLevel::Optional,
        };
        let full = m.get(0).unwrap();
        let mut rest = String::with_capacity(comment.len());
        rest.push_str(&comment[..full.start()]);
        rest.push_str(&comment[full.end()..]);
        return (level, rest);
    }

    (RequirementLevel::Optional, comment.to_string())
}

/// Extract the resolution directive from a comment, removing the matched
/// substring from the text.
///
/// Registered plugin patterns are consulted first (registration order);
/// then built-ins in priority order. No match falls back to `placeholder`
/// with the text unchanged.
pub fn extract_directive(comment: &str, registry: &PluginRegistry) -> (Directive, String) {
    for source in registry.value_sources() {
        if let Some(m) = source.match_pattern().find(comment) {
            let directive = Directive::Plugin {
                plugin_kind: source.directive_kind().to_string(),
                raw: m.as_str().to_string(),
            };
            let mut rest = String::with_capacity(comment.len());
            rest.push_str(&comment[..m.start()]);
            rest.push_str(&comment[m.end()..]);
            return (directive, rest);
        }
    }

    for rule in builtin_rules() {
        if let Some(caps) = rule.pattern.captures(comment) {
            let directive = (rule.build)(&caps);
            let full = caps.get(0).unwrap();
            let mut rest = String::with_capacity(comment.len());
            rest.push_str(&comment[..full.start()]);
            rest.push_str(&comment[full.end()..]);
            return (directive, rest);
        }
    }

    (Directive::Placeholder, comment.to_string())
}

/// Collapse runs of whitespace into single spaces and trim
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
