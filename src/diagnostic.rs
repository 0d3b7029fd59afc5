//! Diagnostic types for linting results

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite violation
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Source code location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of the highlighted region
    pub length: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            length: 0,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

/// Substitute `%s` placeholders in `template` with `args`, in order.
///
/// Surplus placeholders are left as-is; surplus args are ignored.
pub fn render_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut parts = template.split("%s").peekable();

    while let Some(part) = parts.next() {
        out.push_str(part);
        if parts.peek().is_some() {
            match args.next() {
                Some(arg) => out.push_str(arg),
                None => out.push_str("%s"),
            }
        }
    }

    out
}

/// A single reported rule violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule ID that triggered this diagnostic
    pub rule_id: String,
    /// Stable violation code (e.g. `MultipleClasses`)
    pub code: String,
    /// Severity level
    pub severity: Severity,
    /// Message template with `%s` placeholders
    pub template: String,
    /// Values substituted into the template
    pub args: Vec<String>,
    /// Rendered message
    pub message: String,
    /// Token index the diagnostic points at
    pub position: usize,
    /// Source location, resolved from `position` by the engine
    pub location: Location,
    /// The source line (for display)
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: &str,
        code: &str,
        severity: Severity,
        template: &str,
        args: &[String],
        position: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            code: code.to_string(),
            severity,
            template: template.to_string(),
            args: args.to_vec(),
            message: render_message(template, args),
            position,
            location: Location::default(),
            source_line: None,
        }
    }

    /// Set the resolved location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Add source line for display
    pub fn with_source_line(mut self, line: &str) -> Self {
        self.source_line = Some(line.to_string());
        self
    }

    /// Fully qualified code, `rule-id.Code`
    pub fn qualified_code(&self) -> String {
        format!("{}.{}", self.rule_id, self.code)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Receiver for rule violations.
///
/// Rules report through this trait and never fail because of a finding.
pub trait DiagnosticSink {
    fn report(
        &mut self,
        code: &str,
        template: &str,
        args: &[String],
        position: usize,
        severity: Severity,
    );

    fn error(&mut self, code: &str, template: &str, args: &[String], position: usize) {
        self.report(code, template, args, position, Severity::Error);
    }

    fn warning(&mut self, code: &str, template: &str, args: &[String], position: usize) {
        self.report(code, template, args, position, Severity::Warning);
    }
}

/// Sink that collects diagnostics for one file
#[derive(Debug, Default)]
pub struct Collector {
    rule_id: String,
    diagnostics: Vec<Diagnostic>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector attributing every report to `rule_id`
    pub fn for_rule(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            diagnostics: Vec::new(),
        }
    }

    /// Attribute subsequent reports to `rule_id`
    pub fn set_rule(&mut self, rule_id: &str) {
        if self.rule_id != rule_id {
            self.rule_id = rule_id.to_string();
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Codes reported so far, in report order
    pub fn codes(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for Collector {
    fn report(
        &mut self,
        code: &str,
        template: &str,
        args: &[String],
        position: usize,
        severity: Severity,
    ) {
        self.diagnostics.push(Diagnostic::new(
            &self.rule_id,
            code,
            severity,
            template,
            args,
            position,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("hint".parse::<Severity>(), Ok(Severity::Info));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warning), "warning");
        assert_eq!(format!("{}", Severity::Info), "info");
    }

    #[test]
    fn test_render_message() {
        let args = vec!["class".to_string(), "3".to_string()];
        assert_eq!(
            render_message("Expected 0 spaces before %s keyword; %s found", &args),
            "Expected 0 spaces before class keyword; 3 found"
        );
        assert_eq!(render_message("No placeholders", &args), "No placeholders");
        assert_eq!(render_message("%s and %s", &args[..1]), "class and %s");
    }

    #[test]
    fn test_collector() {
        let mut sink = Collector::for_rule("class-declaration");
        sink.error("MultipleClasses", "Only one class", &[], 7);
        sink.warning("MissingBrace", "Missing %s", &["brace".to_string()], 2);

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.codes(), vec!["MultipleClasses", "MissingBrace"]);

        let diags = sink.into_diagnostics();
        assert!(diags[0].is_error());
        assert_eq!(diags[0].position, 7);
        assert_eq!(diags[0].qualified_code(), "class-declaration.MultipleClasses");
        assert!(diags[1].is_warning());
        assert_eq!(diags[1].message, "Missing brace");
    }

    #[test]
    fn test_location_with_length() {
        let loc = Location::new(PathBuf::from("test.php"), 1, 1).with_length(10);
        assert_eq!(loc.length, 10);
    }
}
