//! Opening-brace placement shared by declaration rules

use crate::diagnostic::DiagnosticSink;
use crate::rule::RuleError;
use crate::token::{columns_after_break, TokenKind, TokenStream};

/// A reusable structural check run by a rule before its own checks
pub trait StructuralCheck: Send + Sync {
    fn check(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError>;
}

/// Opening brace of a declaration goes on its own line, directly below the
/// declaration and indented like it:
///
/// ```text
/// class Foo extends Bar
/// {
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationBraces;

impl StructuralCheck for DeclarationBraces {
    fn check(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError> {
        let keyword = stream.require(ptr)?;
        let name = keyword.text.to_lowercase();

        let Some(scope) = keyword.scope else {
            sink.warning(
                "MissingBrace",
                "Possible parse error: %s missing opening or closing brace",
                &[name],
                ptr,
            );
            return Ok(());
        };

        let opener = stream.require(scope.opener)?;
        let before_brace = scope
            .opener
            .checked_sub(1)
            .and_then(|from| stream.find_previous(&[TokenKind::Whitespace], from, Some(ptr), true))
            .unwrap_or(ptr);
        let declaration_line = stream.require(before_brace)?.line;

        if opener.line == declaration_line {
            sink.error(
                "OpenBraceNewLine",
                "Opening brace of a %s must be on the line after the definition",
                &[name],
                scope.opener,
            );
            return Ok(());
        }

        if opener.line > declaration_line + 1 {
            let blank = opener.line - declaration_line - 1;
            sink.error(
                "OpenBraceWrongLine",
                "Opening brace of a %s must be on the line following the %s declaration; found %s line(s)",
                &[name.clone(), name, blank.to_string()],
                scope.opener,
            );
            return Ok(());
        }

        if !stream
            .get(scope.opener + 1)
            .is_some_and(|next| next.is_line_break())
        {
            sink.error(
                "OpenBraceNotAlone",
                "Opening %s brace must be on a line by itself",
                &[name],
                scope.opener,
            );
        }

        if let Some(prev) = stream.token_before(scope.opener, 1) {
            if prev.is_whitespace() {
                let found = if prev.is_line_break() {
                    0
                } else {
                    columns_after_break(&prev.text)
                };
                let first = stream
                    .find_next(&[TokenKind::Whitespace], stream.line_start(ptr), None, true)
                    .unwrap_or(ptr);
                let expected = stream.require(first)?.column - 1;

                if found != expected {
                    sink.error(
                        "SpaceBeforeBrace",
                        "Expected %s spaces before opening brace; %s found",
                        &[expected.to_string(), found.to_string()],
                        scope.opener,
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Collector;
    use crate::tokenizer::tokenize;

    fn check(source: &str) -> Collector {
        let stream = tokenize(source);
        let ptr = stream
            .find_next(&[TokenKind::Class, TokenKind::Interface], 0, None, false)
            .unwrap();
        let mut sink = Collector::for_rule("class-declaration");
        DeclarationBraces.check(&stream, ptr, &mut sink).unwrap();
        sink
    }

    #[test]
    fn test_well_placed_brace() {
        assert!(check("<?php\nclass Foo extends Bar\n{\n}\n").is_empty());
        assert!(check("<?php\nif ($x) {\n    class Foo\n    {\n    }\n}\n").is_empty());
    }

    #[test]
    fn test_brace_on_declaration_line() {
        let sink = check("<?php\nclass Foo {\n}\n");
        assert_eq!(sink.codes(), vec!["OpenBraceNewLine"]);
        assert_eq!(
            sink.diagnostics()[0].message,
            "Opening brace of a class must be on the line after the definition"
        );
    }

    #[test]
    fn test_brace_too_far_below() {
        let sink = check("<?php\ninterface Foo\n\n\n{\n}\n");
        assert_eq!(sink.codes(), vec!["OpenBraceWrongLine"]);
        assert_eq!(
            sink.diagnostics()[0].message,
            "Opening brace of a interface must be on the line following the interface declaration; found 2 line(s)"
        );
    }

    #[test]
    fn test_brace_not_alone_and_indented() {
        let sink = check("<?php\nclass Foo\n  { public $x;\n}\n");
        assert_eq!(sink.codes(), vec!["OpenBraceNotAlone", "SpaceBeforeBrace"]);
        assert_eq!(
            sink.diagnostics()[1].message,
            "Expected 0 spaces before opening brace; 2 found"
        );
    }

    #[test]
    fn test_missing_brace_is_a_warning() {
        let sink = check("<?php\nclass Foo\n");
        assert_eq!(sink.codes(), vec!["MissingBrace"]);
        assert!(sink.diagnostics()[0].is_warning());
    }
}
