//! Inline suppression comments
//!
//! ```text
//! // stylesniff-disable SpaceBeforeKeyword          same line
//! // stylesniff-disable-next-line variable-comment  following line
//! // stylesniff-disable-file all                    whole file
//! ```
//!
//! Each directive takes a comma-separated list of rule ids, codes or
//! qualified codes (`variable-comment.Missing`); `all` matches everything.

use crate::token::{TokenKind, TokenStream};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"stylesniff-disable(?:-(next-line|file))?\s+([\w.\-]+(?:\s*,\s*[\w.\-]+)*)")
        .unwrap()
});

/// Suppressions found in one file
#[derive(Debug, Default)]
pub struct Suppressions {
    /// Line -> entries suppressed on that line
    lines: HashMap<usize, HashSet<String>>,
    /// Entries suppressed for the whole file
    file: HashSet<String>,
}

impl Suppressions {
    /// Collect directives from every comment in `stream`
    pub fn scan(stream: &TokenStream) -> Self {
        let mut suppressions = Self::default();

        let comments = stream
            .tokens()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Comment | TokenKind::DocComment));

        for token in comments {
            for cap in DIRECTIVE.captures_iter(&token.text) {
                let entries = cap[2].split(',').map(|e| e.trim().to_string());
                match cap.get(1).map(|m| m.as_str()) {
                    Some("file") => suppressions.file.extend(entries),
                    Some(_) => suppressions
                        .lines
                        .entry(token.line + 1)
                        .or_default()
                        .extend(entries),
                    None => suppressions
                        .lines
                        .entry(token.line)
                        .or_default()
                        .extend(entries),
                }
            }
        }

        if !suppressions.is_empty() {
            log::debug!(
                "{} line and {} file suppressions",
                suppressions.lines.len(),
                suppressions.file.len()
            );
        }
        suppressions
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.file.is_empty()
    }

    /// Whether a diagnostic for `rule_id`/`code` on `line` is suppressed
    pub fn is_suppressed(&self, rule_id: &str, code: &str, line: usize) -> bool {
        let qualified = format!("{}.{}", rule_id, code);
        let matches = |entries: &HashSet<String>| {
            ["all", rule_id, code, qualified.as_str()]
                .iter()
                .any(|name| entries.contains(*name))
        };

        matches(&self.file) || self.lines.get(&line).is_some_and(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_same_and_next_line() {
        let stream = tokenize(
            "<?php\nclass A // stylesniff-disable SpaceBeforeKeyword\n// stylesniff-disable-next-line variable-comment, class-declaration.MultipleClasses\n$x;\n",
        );
        let s = Suppressions::scan(&stream);

        assert!(s.is_suppressed("class-declaration", "SpaceBeforeKeyword", 2));
        assert!(!s.is_suppressed("class-declaration", "SpaceBeforeKeyword", 3));
        assert!(s.is_suppressed("variable-comment", "Missing", 4));
        assert!(s.is_suppressed("class-declaration", "MultipleClasses", 4));
        assert!(!s.is_suppressed("class-declaration", "OpenBraceBlankLines", 4));
    }

    #[test]
    fn test_file_wide() {
        let stream = tokenize("<?php\n/* stylesniff-disable-file all */\n");
        let s = Suppressions::scan(&stream);
        assert!(s.is_suppressed("variable-comment", "Empty", 120));
    }

    #[test]
    fn test_directives_outside_comments_are_ignored() {
        let stream = tokenize("<?php\n$x = 'stylesniff-disable-file all';\n");
        assert!(Suppressions::scan(&stream).is_empty());
    }
}
