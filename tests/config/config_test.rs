//! Coverage for policy config parsing, validation and path resolution.

use std::io::Write;

use classgate::config::{config_dir, default_config_path, load_config, PolicyConfig};
use classgate::policy::builtin::EMPTY_LIST_ID;
use classgate::policy::class_list::{DEFAULT_ALLOW_OVERRIDE, DEFAULT_BLACKLIST};
use classgate::policy::AdmissionPolicy;

fn parse(toml_str: &str) -> PolicyConfig {
    match toml::from_str::<PolicyConfig>(toml_str) {
        Ok(config) => config,
        Err(err) => panic!("config should parse: {err}"),
    }
}

fn validation_error(toml_str: &str) -> String {
    match parse(toml_str).validate() {
        Ok(()) => panic!("config should fail validation"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn config_dir_resolves() {
    let path = match config_dir() {
        Ok(path) => path,
        Err(err) => panic!("config dir should resolve: {err}"),
    };
    assert!(path.ends_with(".classgate"));

    let file = match default_config_path() {
        Ok(file) => file,
        Err(err) => panic!("config path should resolve: {err}"),
    };
    assert!(file.ends_with(".classgate/policy.toml"));
}

#[test]
fn omitted_sections_use_builtin_lists() {
    let config = parse("");
    assert_eq!(config.blacklist.types.len(), DEFAULT_BLACKLIST.len());
    assert_eq!(config.allow_override.types.len(), DEFAULT_ALLOW_OVERRIDE.len());
    assert!(config.whitelist.types.is_empty());
    assert!(!config.whitelist.trust_all);
    assert_eq!(config.builtin_aliases().first().map(|b| b.id), Some(EMPTY_LIST_ID));
}

#[test]
fn parse_full_config() {
    let config = parse(
        r#"
[blacklist]
types = ["java.util.HashSet", "java.lang.Thread"]

[allow_override]
types = ["java.util.LinkedHashSet"]

[whitelist]
types = ["com.acme.Order", "com.acme.Invoice"]

[[builtins]]
canonical = "java.util.Collections$EmptyList"
id = 10
aliases = ["kotlin.collections.EmptyList"]
"#,
    );
    assert!(config.validate().is_ok());
    assert_eq!(config.blacklist.types, vec!["java.util.HashSet", "java.lang.Thread"]);
    assert_eq!(config.builtins.len(), 1);

    let context = config.trust_context();
    assert!(context.is_whitelisted("com.acme.Order"));
    assert!(!context.is_whitelisted("com.acme.Shipment"));
}

#[test]
fn trust_all_flag_builds_trusting_context() {
    let config = parse("[whitelist]\ntrust_all = true\n");
    assert!(config.trust_context().trusts_all());
}

#[test]
fn builtin_without_id_is_rejected() {
    let parsed = toml::from_str::<PolicyConfig>("[[builtins]]\ncanonical = \"x\"\n");
    assert!(parsed.is_err(), "builtin without id should not parse");
}

#[test]
fn contradictory_lists_fail_validation() {
    let message = validation_error(
        r#"
[blacklist]
types = ["java.util.HashSet"]

[allow_override]
types = ["java.util.HashSet"]
"#,
    );
    assert_eq!(message, "type java.util.HashSet is both blacklisted and force-allowed");
}

#[test]
fn builtin_id_outside_reserved_range_fails_validation() {
    let message = validation_error(
        r#"
[[builtins]]
canonical = "java.util.Collections$EmptyList"
id = 40
"#,
    );
    assert!(message.contains("outside the reserved range 10..32"), "{message}");
}

#[test]
fn duplicate_builtin_id_fails_validation() {
    let message = validation_error(
        r#"
[[builtins]]
canonical = "java.util.Collections$EmptyList"
id = 10

[[builtins]]
canonical = "java.util.Collections$EmptySet"
id = 10
"#,
    );
    assert_eq!(
        message,
        "builtin id 10 is used by both java.util.Collections$EmptyList and \
         java.util.Collections$EmptySet"
    );
}

#[test]
fn alias_claimed_twice_fails_validation() {
    let message = validation_error(
        r#"
[[builtins]]
canonical = "java.util.Collections$EmptyList"
id = 10
aliases = ["com.acme.Empty"]

[[builtins]]
canonical = "java.util.Collections$EmptySet"
id = 11
aliases = ["com.acme.Empty"]
"#,
    );
    assert!(message.starts_with("alias com.acme.Empty is claimed by both"), "{message}");
}

#[test]
fn load_config_reads_file() {
    let mut file = match tempfile::NamedTempFile::new() {
        Ok(file) => file,
        Err(err) => panic!("should create temp file: {err}"),
    };
    if let Err(err) = writeln!(file, "[whitelist]\ntypes = [\"com.acme.Order\"]") {
        panic!("should write config: {err}");
    }

    let config = match load_config(file.path()) {
        Ok(config) => config,
        Err(err) => panic!("config should load: {err}"),
    };
    assert_eq!(config.whitelist.types, vec!["com.acme.Order"]);
}

#[test]
fn load_config_reports_missing_file() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("should create temp dir: {err}"),
    };
    let missing = dir.path().join("policy.toml");
    let message = match load_config(&missing) {
        Ok(_) => panic!("missing file should not load"),
        Err(err) => err.to_string(),
    };
    assert!(message.starts_with("failed to read config at"), "{message}");
}

#[test]
fn load_config_reports_parse_errors() {
    let mut file = match tempfile::NamedTempFile::new() {
        Ok(file) => file,
        Err(err) => panic!("should create temp file: {err}"),
    };
    if let Err(err) = writeln!(file, "[whitelist\ntypes = 3") {
        panic!("should write config: {err}");
    }
    let message = match load_config(file.path()) {
        Ok(_) => panic!("malformed file should not load"),
        Err(err) => err.to_string(),
    };
    assert!(message.starts_with("failed to parse config at"), "{message}");
}

#[test]
fn policy_from_config_applies_lists() {
    let config = parse(
        r#"
[blacklist]
types = ["com.acme.Dangerous"]

[allow_override]
types = []
"#,
    );
    let policy = match AdmissionPolicy::from_config(&config) {
        Ok(policy) => policy,
        Err(err) => panic!("policy should build: {err}"),
    };
    assert!(policy.blacklist().is_blacklisted("com.acme.Dangerous"));
    assert!(!policy.blacklist().is_blacklisted("java.util.HashSet"));
    assert!(policy.allow_override().is_empty());
    assert!(policy.builtins().is_alias("kotlin.collections.EmptyList"));
}

#[test]
fn policy_from_invalid_config_fails() {
    let config = parse(
        r#"
[blacklist]
types = ["com.acme.Both"]

[allow_override]
types = ["com.acme.Both"]
"#,
    );
    assert!(AdmissionPolicy::from_config(&config).is_err());
}
