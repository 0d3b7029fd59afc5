//! GitHub Actions output formatter
//!
//! Outputs diagnostics in GitHub Actions workflow command format:
//! ::error file={name},line={line},col={col},title={rule.Code}::{message}

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;

/// Formatter for GitHub Actions annotations
pub struct GithubFormatter {
    /// Whether to include summary
    pub show_summary: bool,
}

impl GithubFormatter {
    /// Create a new GitHub formatter
    pub fn new() -> Self {
        Self { show_summary: true }
    }

    /// Disable summary output
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }
}

impl Default for GithubFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape workflow command data
fn escape(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl OutputFormatter for GithubFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for diag in &result.diagnostics {
            output.push_str(&self.format_diagnostic(diag));
            output.push('\n');
        }

        if self.show_summary && !result.diagnostics.is_empty() {
            output.push_str(&format!(
                "::notice::Style check complete: {} error(s), {} warning(s) in {} file(s)\n",
                result.error_count, result.warning_count, result.files_processed
            ));
        }

        output
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let level = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "notice",
        };

        format!(
            "::{} file={},line={},col={},title={}::{}",
            level,
            diagnostic.location.file.display(),
            diagnostic.location.line.max(1),
            diagnostic.location.column.max(1),
            diagnostic.qualified_code(),
            escape(&diagnostic.message)
        )
    }
}
