//! Integration tests for stylesniff

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use stylesniff::{formatter_for, Config, Engine, LintResult, Severity};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn lint_fixture(config: Config, name: &str) -> LintResult {
    Engine::with_builtin_rules(config).lint_file(&fixtures_path().join(name))
}

fn codes(result: &LintResult) -> Vec<&str> {
    result.diagnostics.iter().map(|d| d.code.as_str()).collect()
}

#[test]
fn test_clean_file_has_no_diagnostics() {
    let result = lint_fixture(Config::default(), "clean.php");
    assert!(result.is_clean(), "{:?}", codes(&result));
    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.rule_failures, 0);
}

#[test]
fn test_relinting_is_stable() {
    let engine = Engine::with_builtin_rules(Config::default());
    let path = fixtures_path().join("short_description.php");

    let first = engine.lint_file(&path);
    let second = engine.lint_file(&path);
    assert_eq!(codes(&first), codes(&second));
}

#[test]
fn test_blank_line_after_class_opener() {
    let result = lint_fixture(Config::default(), "open_brace_blank_line.php");

    let found: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == "OpenBraceBlankLines")
        .collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].location.line, 3);
    assert_eq!(
        found[0].message,
        "Opening brace of a class must not be followed by a blank line; found 1"
    );
    assert_eq!(found[0].source_line.as_deref(), Some("{"));
    assert_eq!(result.exit_code(), 2);
}

#[test]
fn test_empty_var_type() {
    let result = lint_fixture(Config::default(), "missing_var_type.php");
    let found = codes(&result);

    assert!(found.contains(&"MissingVarType"), "{:?}", found);
    assert!(!found.contains(&"IncorrectVarType"));
}

#[test]
fn test_second_class_reported_once() {
    let result = lint_fixture(Config::default(), "multiple_classes.php");

    assert_eq!(codes(&result), vec!["MultipleClasses"]);
    let diag = &result.diagnostics[0];
    assert_eq!((diag.location.line, diag.location.column), (7, 1));
    assert_eq!(diag.location.length, 5);
}

#[test]
fn test_short_description_findings() {
    let result = lint_fixture(Config::default(), "short_description.php");
    let found = codes(&result);

    for code in ["ShortNotCapital", "ShortFullStop", "VariableNameInComment"] {
        assert!(found.contains(&code), "{} missing from {:?}", code, found);
    }
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.rule_id == "variable-comment"));
}

#[test]
fn test_line_comment_stops_checks() {
    let result = lint_fixture(Config::default(), "line_comment.php");
    assert_eq!(codes(&result), vec!["WrongStyle"]);
    assert_eq!(result.diagnostics[0].location.line, 6);
}

#[test]
fn test_inline_suppressions() {
    let result = lint_fixture(Config::default(), "suppressed.php");
    assert!(result.is_clean(), "{:?}", codes(&result));

    // Same source without the directives still reports
    let content = std::fs::read_to_string(fixtures_path().join("suppressed.php")).unwrap();
    let stripped = content.replace("stylesniff-disable", "note");
    let result =
        Engine::with_builtin_rules(Config::default()).lint_source(&stripped, Path::new("x.php"));
    assert_eq!(codes(&result), vec!["OpenBraceBlankLines", "WrongStyle"]);
}

#[test]
fn test_config_file_disables_and_overrides() {
    let config = Config::load(&fixtures_path().join("stylesniff.yaml")).unwrap();
    let result = lint_fixture(config, "open_brace_blank_line.php");

    assert_eq!(codes(&result), vec!["OpenBraceBlankLines"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    assert_eq!(result.warning_count, 1);
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn test_lint_many_files() {
    let names = [
        "clean.php",
        "line_comment.php",
        "multiple_classes.php",
        "missing.php",
    ];
    let files: Vec<PathBuf> = names.iter().map(|n| fixtures_path().join(n)).collect();

    let result = Engine::with_builtin_rules(Config::default()).lint(&files);

    assert_eq!(result.files_processed, 4);
    let read_errors = result
        .diagnostics
        .iter()
        .filter(|d| d.code == "ReadError")
        .count();
    assert_eq!(read_errors, 1);
    assert_eq!(result.error_count, 3);
}

#[test]
fn test_json_report() {
    let result = lint_fixture(Config::default(), "line_comment.php");
    let output = formatter_for(stylesniff::config::OutputFormat::Json, false).format(&result);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["diagnostics"][0]["code"], "WrongStyle");
    assert_eq!(value["diagnostics"][0]["rule_id"], "variable-comment");
    assert_eq!(value["summary"]["error_count"], 1);
}
