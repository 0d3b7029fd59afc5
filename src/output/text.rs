//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;
use colored::*;
use std::collections::BTreeMap;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Apply `style` only when colors are on
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        match severity {
            Severity::Error => self.paint(&s, |s| s.red().bold()),
            Severity::Warning => self.paint(&s, |s| s.yellow().bold()),
            Severity::Info => self.paint(&s, |s| s.blue()),
        }
    }

    fn count_str(&self, count: usize, noun: &str, style: fn(&str) -> ColoredString) -> String {
        let s = format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" });
        self.paint(&s, style)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        let mut by_file: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for diag in &result.diagnostics {
            by_file.entry(&diag.location.file).or_default().push(diag);
        }

        for (file, diagnostics) in &by_file {
            output.push_str(&self.paint(&file.display().to_string(), |s| s.underline()));
            output.push('\n');

            for diag in diagnostics {
                output.push_str(&self.format_diagnostic(diag));
                output.push('\n');
            }
        }

        if self.show_stats {
            output.push_str(&format!(
                "\n{} {} processed",
                result.files_processed,
                if result.files_processed == 1 {
                    "file"
                } else {
                    "files"
                }
            ));

            let mut counts = Vec::new();
            if result.error_count > 0 {
                counts.push(self.count_str(result.error_count, "error", |s| s.red()));
            }
            if result.warning_count > 0 {
                counts.push(self.count_str(result.warning_count, "warning", |s| s.yellow()));
            }
            if result.info_count > 0 {
                counts.push(self.count_str(result.info_count, "info", |s| s.blue()));
            }

            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut output = format!(
            "{}:{}:{}: {}[{}]: {}\n",
            diag.location.file.display(),
            diag.location.line,
            diag.location.column,
            self.severity_str(diag.severity),
            self.paint(&diag.qualified_code(), |s| s.cyan()),
            diag.message
        );

        if !self.show_source {
            return output;
        }

        if let Some(source) = &diag.source_line {
            let bar = self.paint("|", |s| s.blue());
            output.push_str(&format!(
                "{} {} {}\n",
                self.paint(&format!("{:>4}", diag.location.line), |s| s.blue()),
                bar,
                source
            ));

            if diag.location.column > 0 {
                let padding = " ".repeat(diag.location.column - 1);
                let underline = "^".repeat(diag.location.length.max(1));
                output.push_str(&format!(
                    "     {} {}{}\n",
                    bar,
                    padding,
                    self.paint(&underline, |s| s.red())
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Location;
    use std::path::PathBuf;

    fn diagnostic(severity: Severity) -> Diagnostic {
        Diagnostic::new(
            "variable-comment",
            "Missing",
            severity,
            "Missing variable doc comment",
            &[],
            7,
        )
        .with_location(Location::new(PathBuf::from("src/Foo.php"), 10, 12).with_length(2))
        .with_source_line("    public $x;")
    }

    #[test]
    fn test_format_diagnostic() {
        let formatter = TextFormatter::new().without_color();
        let output = formatter.format_diagnostic(&diagnostic(Severity::Error));

        assert!(output.starts_with(
            "src/Foo.php:10:12: error[variable-comment.Missing]: Missing variable doc comment\n"
        ));
        assert!(output.contains("  10 |     public $x;\n"));
        assert!(output.contains(&format!("| {}^^\n", " ".repeat(11))));
    }

    #[test]
    fn test_format_result() {
        let formatter = TextFormatter::new().without_color();
        let result = LintResult {
            diagnostics: vec![diagnostic(Severity::Warning)],
            files_processed: 1,
            warning_count: 1,
            ..Default::default()
        };

        let output = formatter.format(&result);
        assert!(output.starts_with("src/Foo.php\n"));
        assert!(output.contains("1 file processed: 1 warning\n"));
    }
}
