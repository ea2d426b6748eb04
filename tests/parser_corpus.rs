//! Example-file grammar corpus tests
//!
//! Each case is a realistic example file exercising the comment
//! accumulation, tag extraction, and declaration rules end to end.

use envsync::{parse_example_text, Directive, PluginRegistry, RequirementLevel};

fn parse(text: &str) -> envsync::EnvSchema {
    parse_example_text(text, &PluginRegistry::new())
}

#[test]
fn test_realistic_example_file() {
    let text = r#"
# Postgres connection string [required] [prompt]
DATABASE_URL=postgres://localhost:5432/app

# Direct connection for migrations [copy:DATABASE_URL]
DIRECT_URL=

# Emit verbose logs [boolean]
DEBUG=false

# Dev server port, ignored in deployed environments [local-only] [default:3000]
PORT=3000

# Old auth secret, superseded by AUTH_SECRET [deprecated]
LEGACY_SECRET=

# Public URL injected at build time [computed:deploy-url]
PUBLIC_URL=
"#;

    let schema = parse(text);
    assert_eq!(schema.definitions.len(), 6);

    let db = schema.get("DATABASE_URL").unwrap();
    assert_eq!(db.requirement, RequirementLevel::Required);
    assert_eq!(db.directive, Directive::Prompt);
    assert_eq!(db.description, "Postgres connection string");
    assert_eq!(db.example_value, "postgres://localhost:5432/app");

    let direct = schema.get("DIRECT_URL").unwrap();
    assert_eq!(
        direct.directive,
        Directive::Copy {
            source: "DATABASE_URL".to_string()
        }
    );

    let debug = schema.get("DEBUG").unwrap();
    assert_eq!(
        debug.directive,
        Directive::Boolean {
            yes: "true".to_string(),
            no: "false".to_string()
        }
    );

    // default is tested before local-only, so it wins; the local-only tag
    // stays in the description text
    let port = schema.get("PORT").unwrap();
    assert_eq!(
        port.directive,
        Directive::Default {
            value: "3000".to_string()
        }
    );
    assert!(port.description.contains("[local-only]"));

    let legacy = schema.get("LEGACY_SECRET").unwrap();
    assert_eq!(legacy.requirement, RequirementLevel::Deprecated);

    let public = schema.get("PUBLIC_URL").unwrap();
    assert_eq!(
        public.directive,
        Directive::Computed {
            compute_kind: "deploy-url".to_string()
        }
    );
}

#[test]
fn test_builtin_priority_order() {
    // When multiple directive tags appear, the fixed priority decides:
    // prompt > computed > copy > default > boolean > local-only > placeholder
    let cases: Vec<(&str, &str)> = vec![
        ("# [prompt] [computed:x] [default:v]\nA=\n", "prompt"),
        ("# [computed:x] [copy:B] [default:v]\nA=\n", "computed"),
        ("# [copy:B] [default:v] [boolean]\nA=\n", "copy"),
        ("# [default:v] [boolean] [local-only]\nA=\n", "default"),
        ("# [boolean] [local-only] [placeholder]\nA=\n", "boolean"),
        ("# [local-only] [placeholder]\nA=\n", "local-only"),
        ("# [placeholder]\nA=\n", "placeholder"),
    ];

    for (text, expected_kind) in cases {
        let schema = parse(text);
        let def = schema.get("A").unwrap();
        assert_eq!(def.directive.kind(), expected_kind, "input: {:?}", text);
    }
}

#[test]
fn test_default_value_variants() {
    let schema = parse(
        "# [default:https://api.example.com/v2?q=a,b]\nURL=\n# [default: padded ]\nPADDED=\n",
    );

    assert_eq!(
        schema.get("URL").unwrap().directive,
        Directive::Default {
            value: "https://api.example.com/v2?q=a,b".to_string()
        }
    );
    // Everything between the colon and the bracket is the value
    assert_eq!(
        schema.get("PADDED").unwrap().directive,
        Directive::Default {
            value: " padded ".to_string()
        }
    );
}

#[test]
fn test_malformed_tags_fall_back_to_placeholder() {
    // Unknown or malformed bracket tokens are not errors; the parse
    // silently falls back to placeholder
    let schema = parse("# [defaults:typo] [unknown-tag]\nA=x\n");

    let def = schema.get("A").unwrap();
    assert_eq!(def.directive, Directive::Placeholder);
    assert!(def.description.contains("[defaults:typo]"));
}

#[test]
fn test_comment_block_association_rules() {
    let text = "# first block\n# continues [required]\nFIRST=\n\n# orphaned by blank\n\nSECOND=\n# attached\nTHIRD=\n";
    let schema = parse(text);

    assert_eq!(
        schema.get("FIRST").unwrap().requirement,
        RequirementLevel::Required
    );
    assert_eq!(schema.get("FIRST").unwrap().description, "first block continues");
    assert_eq!(schema.get("SECOND").unwrap().raw_comment, "");
    assert_eq!(schema.get("THIRD").unwrap().description, "attached");
}

#[test]
fn test_plugin_pattern_beats_builtin() {
    use envsync::{EnvVarDefinition, ResolvedValue, ResolverContext, ValueSource, ValueSourceTag};
    use regex_lite::Regex;

    struct SecretStore {
        pattern: Regex,
    }

    impl ValueSource for SecretStore {
        fn directive_kind(&self) -> &str {
            "secret-store"
        }

        fn match_pattern(&self) -> &Regex {
            &self.pattern
        }

        fn resolve(&self, _d: &EnvVarDefinition, _c: &mut ResolverContext) -> ResolvedValue {
            ResolvedValue::value("s3cr3t", ValueSourceTag::Plugin("secret-store".to_string()))
        }
    }

    let mut registry = PluginRegistry::new();
    registry.register_value_source(Box::new(SecretStore {
        // Overlaps the builtin prompt tag on purpose
        pattern: Regex::new(r"\[secret(?::[^\]]*)?\]").unwrap(),
    }));

    // Plugin pattern and builtin prompt both present: plugin wins
    let schema = parse_example_text("# [secret:prod] [prompt]\nTOKEN=\n", &registry);
    let def = schema.get("TOKEN").unwrap();
    match &def.directive {
        Directive::Plugin { plugin_kind, raw } => {
            assert_eq!(plugin_kind, "secret-store");
            assert_eq!(raw, "[secret:prod]");
        }
        other => panic!("expected plugin directive, got {:?}", other),
    }
}
