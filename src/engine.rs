//! Core checker engine

use crate::config::Config;
use crate::diagnostic::{Collector, Diagnostic, Location, Severity};
use crate::rule::Rule;
use crate::rules::builtin_rules;
use crate::suppress::Suppressions;
use crate::token::{TokenKind, TokenStream};
use crate::tokenizer::tokenize;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-rule timing statistics
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    /// Rule ID
    pub rule_id: String,
    /// Total time spent on this rule
    pub total_time: Duration,
    /// Number of times the rule was invoked
    pub evaluation_count: usize,
    /// Number of diagnostics it reported
    pub match_count: usize,
}

impl RuleTiming {
    /// Create a new timing entry
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            ..Default::default()
        }
    }

    /// Average time per invocation
    pub fn avg_time(&self) -> Duration {
        if self.evaluation_count > 0 {
            self.total_time / self.evaluation_count as u32
        } else {
            Duration::ZERO
        }
    }
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Internal rule failures (logged, never reported as findings)
    pub rule_failures: usize,

    /// Processing duration
    pub duration: Duration,

    /// Per-rule timing statistics (rule_id -> timing)
    pub rule_timings: HashMap<String, RuleTiming>,
}

impl LintResult {
    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
        self.rule_failures += other.rule_failures;

        for (rule_id, timing) in other.rule_timings {
            let entry = self
                .rule_timings
                .entry(rule_id)
                .or_insert_with(|| RuleTiming::new(&timing.rule_id));
            entry.total_time += timing.total_time;
            entry.evaluation_count += timing.evaluation_count;
            entry.match_count += timing.match_count;
        }
    }

    /// Get rule timings sorted by total time (descending)
    pub fn sorted_timings(&self) -> Vec<&RuleTiming> {
        let mut timings: Vec<_> = self.rule_timings.values().collect();
        timings.sort_by(|a, b| b.total_time.cmp(&a.total_time));
        timings
    }

    /// Format timing statistics as a string
    pub fn format_timings(&self) -> String {
        let timings = self.sorted_timings();

        if timings.is_empty() {
            return "No timing data available".to_string();
        }

        let mut output = String::new();
        output.push_str("Rule Timing Statistics:\n");
        output.push_str(&format!(
            "{:<30} {:>12} {:>12} {:>10} {:>12}\n",
            "Rule ID", "Total", "Avg", "Calls", "Reports"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for timing in timings {
            let total_ms = timing.total_time.as_secs_f64() * 1000.0;
            let avg_us = timing.avg_time().as_secs_f64() * 1_000_000.0;

            output.push_str(&format!(
                "{:<30} {:>10.2}ms {:>10.2}µs {:>10} {:>12}\n",
                timing.rule_id, total_ms, avg_us, timing.evaluation_count, timing.match_count
            ));
        }

        output
    }

    fn count(&mut self, diagnostics: Vec<Diagnostic>) {
        for diag in &diagnostics {
            match diag.severity {
                Severity::Error => self.error_count += 1,
                Severity::Warning => self.warning_count += 1,
                Severity::Info => self.info_count += 1,
            }
        }

        if self.error_count > 0 {
            self.files_with_errors = 1;
        }
        if self.warning_count > 0 {
            self.files_with_warnings = 1;
        }
        self.diagnostics = diagnostics;
    }
}

/// The main checker engine
pub struct Engine {
    config: Config,
    rules: Vec<Arc<dyn Rule>>,
}

impl Engine {
    /// Create an engine with no rules
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rules: Vec::new(),
        }
    }

    /// Create an engine with every built-in rule registered
    pub fn with_builtin_rules(config: Config) -> Self {
        let mut engine = Self::new(config);
        for rule in builtin_rules() {
            engine.register_rule(rule);
        }
        engine
    }

    /// Register a rule
    pub fn register_rule(&mut self, rule: Arc<dyn Rule>) {
        log::debug!("registered rule {}", rule.id());
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lint multiple files
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = if self.config.engine.parallel {
            let jobs = if self.config.engine.jobs > 0 {
                self.config.engine.jobs
            } else {
                num_cpus::get()
            };

            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
                Err(e) => {
                    log::warn!("could not start {} worker threads ({}), linting sequentially", jobs, e);
                    files.iter().map(|f| self.lint_file(f)).collect()
                }
            }
        } else {
            files.iter().map(|f| self.lint_file(f)).collect()
        };

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }

        combined.duration = start.elapsed();
        combined
    }

    /// Lint a single file
    pub fn lint_file(&self, path: &Path) -> LintResult {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("failed to read {}: {}", path.display(), e);
                let diag = Diagnostic::new(
                    "file-read-error",
                    "ReadError",
                    Severity::Error,
                    "Failed to read file: %s",
                    &[e.to_string()],
                    0,
                )
                .with_location(Location::new(path.to_path_buf(), 0, 0));

                let mut result = LintResult {
                    files_processed: 1,
                    ..LintResult::default()
                };
                result.count(vec![diag]);
                return result;
            }
        };

        self.lint_source(&content, path)
    }

    /// Lint source text as if it were the file at `path`
    pub fn lint_source(&self, content: &str, path: &Path) -> LintResult {
        let start = Instant::now();
        log::debug!("checking {}", path.display());

        let stream = tokenize(content);
        let (collector, timings, failures) = self.run_rules(&stream, path);

        let suppressions = Suppressions::scan(&stream);
        let source_lines: Vec<&str> = content.lines().collect();

        let mut diagnostics: Vec<Diagnostic> = collector
            .into_diagnostics()
            .into_iter()
            .filter_map(|diag| {
                let location = resolve_location(&stream, diag.position, path);
                if self.config.is_code_disabled(&diag.rule_id, &diag.code)
                    || self
                        .config
                        .should_ignore_rule_for_file(&diag.rule_id, &diag.code, path)
                    || suppressions.is_suppressed(&diag.rule_id, &diag.code, location.line)
                {
                    return None;
                }

                let mut diag = diag.with_location(location);
                if let Some(severity) = self.config.get_severity_override(&diag.rule_id, &diag.code) {
                    diag.severity = severity;
                }
                if let Some(line) = diag
                    .location
                    .line
                    .checked_sub(1)
                    .and_then(|i| source_lines.get(i))
                {
                    diag = diag.with_source_line(line);
                }
                Some(diag)
            })
            .collect();

        diagnostics.sort_by_key(|d| (d.location.line, d.location.column));

        let mut result = LintResult {
            files_processed: 1,
            rule_failures: failures,
            rule_timings: timings,
            ..LintResult::default()
        };
        result.count(diagnostics);
        result.duration = start.elapsed();
        result
    }

    /// Invoke every enabled rule at every token of a kind it registers for
    fn run_rules(
        &self,
        stream: &TokenStream,
        path: &Path,
    ) -> (Collector, HashMap<String, RuleTiming>, usize) {
        let mut dispatch: HashMap<TokenKind, Vec<&dyn Rule>> = HashMap::new();
        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.id()) {
                continue;
            }
            for kind in rule.register() {
                dispatch.entry(*kind).or_default().push(rule.as_ref());
            }
        }

        let mut sink = Collector::new();
        let mut timings: HashMap<String, RuleTiming> = HashMap::new();
        let mut failures = 0;

        for token in stream.tokens() {
            let Some(rules) = dispatch.get(&token.kind) else {
                continue;
            };

            for rule in rules {
                sink.set_rule(rule.id());
                let reported = sink.len();

                let start = Instant::now();
                let outcome = rule.process(stream, token.index, &mut sink);
                let elapsed = start.elapsed();

                let timing = timings
                    .entry(rule.id().to_string())
                    .or_insert_with(|| RuleTiming::new(rule.id()));
                timing.total_time += elapsed;
                timing.evaluation_count += 1;
                timing.match_count += sink.len() - reported;

                if let Err(e) = outcome {
                    failures += 1;
                    log::warn!(
                        "{}:{}: rule {} failed: {}",
                        path.display(),
                        token.line,
                        rule.id(),
                        e
                    );
                }
            }
        }

        (sink, timings, failures)
    }
}

/// Map a token index to a file location
fn resolve_location(stream: &TokenStream, position: usize, path: &Path) -> Location {
    match stream.get(position) {
        Some(token) => {
            let length = token.text.trim_end_matches(['\r', '\n']).chars().count();
            Location::new(path.to_path_buf(), token.line, token.column).with_length(length)
        }
        None => Location::new(path.to_path_buf(), 0, 0),
    }
}
