//! Configuration for the checker
//!
//! Reads configuration from:
//! - `.stylesniff.yaml` / `.stylesniff.yml` / `.stylesniff.json` (project-level)
//! - the same names in the home directory (user-level)

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lint files in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
    /// Print per-rule timings after the report
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Github,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "github" => Ok(OutputFormat::Github),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include patterns
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.php".to_string(), "**/*.inc".to_string()],
            exclude: vec![
                "**/vendor/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
        }
    }
}

/// Rule configuration.
///
/// Entries name a rule (`variable-comment`), a code (`SpacingAfter`) or a
/// qualified code (`variable-comment.SpacingAfter`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules and codes
    pub disabled: Vec<String>,

    /// Enabled rules (empty = all)
    pub enabled: Vec<String>,

    /// Severity overrides
    pub severity: HashMap<String, Severity>,

    /// Per-file ignores (glob pattern -> rules or codes, `all` for everything)
    pub per_file: HashMap<String, Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
    pub files: FilesConfig,
    pub rules: RulesConfig,
}

const CONFIG_NAMES: [&str; 3] = [".stylesniff.yaml", ".stylesniff.yml", ".stylesniff.json"];

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut dirs_to_search = vec![PathBuf::from(".")];
        if let Some(home) = dirs::home_dir() {
            dirs_to_search.push(home);
        }

        for dir in dirs_to_search {
            for name in &CONFIG_NAMES {
                let path = dir.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        enabled_rules: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if let Some(enabled) = enabled_rules {
            self.rules.enabled = enabled;
        }
    }

    /// Check if a rule is enabled
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.rules.disabled.iter().any(|r| r == rule_id) {
            return false;
        }

        if !self.rules.enabled.is_empty() {
            return self.rules.enabled.iter().any(|r| r == rule_id);
        }

        true
    }

    /// Check if a single code of an enabled rule is switched off
    pub fn is_code_disabled(&self, rule_id: &str, code: &str) -> bool {
        self.rules
            .disabled
            .iter()
            .any(|entry| matches_code(entry, rule_id, code))
    }

    /// Get severity override for a code, falling back to its rule
    pub fn get_severity_override(&self, rule_id: &str, code: &str) -> Option<Severity> {
        let qualified = format!("{}.{}", rule_id, code);
        self.rules
            .severity
            .get(&qualified)
            .or_else(|| self.rules.severity.get(code))
            .or_else(|| self.rules.severity.get(rule_id))
            .copied()
    }

    /// Check if a rule (or one of its codes) should be ignored for a file
    pub fn should_ignore_rule_for_file(&self, rule_id: &str, code: &str, file_path: &Path) -> bool {
        let file_str = file_path.to_string_lossy();

        for (pattern, entries) in &self.rules.per_file {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(file_str.as_ref())
                    && entries
                        .iter()
                        .any(|e| e == "all" || e == rule_id || matches_code(e, rule_id, code))
                {
                    return true;
                }
            }
        }

        false
    }
}

/// `entry` names `code` bare or qualified with `rule_id`
fn matches_code(entry: &str, rule_id: &str, code: &str) -> bool {
    match entry.split_once('.') {
        Some((rule, c)) => rule == rule_id && c == code,
        None => entry == code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.files.include.contains(&"**/*.php".to_string()));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("github".parse::<OutputFormat>().unwrap(), OutputFormat::Github);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec!["class-declaration".to_string()]),
            None,
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_rule_enabled("class-declaration"));
    }

    #[test]
    fn test_rule_enabled() {
        let mut config = Config::new();
        assert!(config.is_rule_enabled("any-rule"));

        config.rules.disabled.push("disabled-rule".to_string());
        assert!(!config.is_rule_enabled("disabled-rule"));
        assert!(config.is_rule_enabled("other-rule"));

        config.rules.enabled = vec!["only-this".to_string()];
        assert!(!config.is_rule_enabled("other-rule"));
        assert!(config.is_rule_enabled("only-this"));
    }

    #[test]
    fn test_code_disabled() {
        let mut config = Config::new();
        config.rules.disabled = vec![
            "SpacingAfter".to_string(),
            "class-declaration.MultipleClasses".to_string(),
        ];

        assert!(config.is_code_disabled("variable-comment", "SpacingAfter"));
        assert!(config.is_code_disabled("class-declaration", "MultipleClasses"));
        assert!(!config.is_code_disabled("variable-comment", "MultipleClasses"));
        assert!(config.is_rule_enabled("class-declaration"));
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::new();
        config
            .rules
            .severity
            .insert("variable-comment".to_string(), Severity::Warning);
        config
            .rules
            .severity
            .insert("variable-comment.Missing".to_string(), Severity::Info);

        assert_eq!(
            config.get_severity_override("variable-comment", "Missing"),
            Some(Severity::Info)
        );
        assert_eq!(
            config.get_severity_override("variable-comment", "Empty"),
            Some(Severity::Warning)
        );
        assert_eq!(config.get_severity_override("class-declaration", "Empty"), None);
    }

    #[test]
    fn test_per_file_ignore() {
        let mut config = Config::new();
        config.rules.per_file.insert(
            "legacy/**".to_string(),
            vec!["variable-comment".to_string(), "SpaceBeforeBrace".to_string()],
        );

        let legacy = Path::new("legacy/old.php");
        assert!(config.should_ignore_rule_for_file("variable-comment", "Missing", legacy));
        assert!(config.should_ignore_rule_for_file(
            "class-declaration",
            "SpaceBeforeBrace",
            legacy
        ));
        assert!(!config.should_ignore_rule_for_file("class-declaration", "MultipleClasses", legacy));
        assert!(!config.should_ignore_rule_for_file(
            "variable-comment",
            "Missing",
            Path::new("src/new.php")
        ));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: github
  color: never
rules:
  disabled:
    - SpacingAfter
  severity:
    variable-comment: warning
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.format, OutputFormat::Github);
        assert_eq!(config.output.color, ColorMode::Never);
        assert_eq!(config.rules.disabled, vec!["SpacingAfter"]);
        assert_eq!(
            config.get_severity_override("variable-comment", "Missing"),
            Some(Severity::Warning)
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".stylesniff.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"rules": {{"enabled": ["class-declaration"]}}}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.is_rule_enabled("class-declaration"));
        assert!(!config.is_rule_enabled("variable-comment"));

        let bad = dir.path().join("config.toml");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Invalid(_))));
    }
}
