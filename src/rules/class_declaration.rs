//! Class and interface declaration layout

use super::brace_layout::{DeclarationBraces, StructuralCheck};
use crate::diagnostic::DiagnosticSink;
use crate::rule::{Rule, RuleCategory, RuleError};
use crate::token::{columns_after_break, Token, TokenKind, TokenStream};

const CODES: &[&str] = &[
    "MissingBrace",
    "OpenBraceNewLine",
    "OpenBraceWrongLine",
    "OpenBraceNotAlone",
    "SpaceBeforeBrace",
    "MultipleClasses",
    "SpaceBeforeKeyword",
    "SpacesBeforeKeyword",
    "OpenBraceBlankLines",
    "NewLineBeforeCloseBrace",
    "SpaceBeforeCloseBrace",
    "NoNewlineAfterCloseBrace",
    "NewlinesAfterCloseBrace",
    "CloseBraceSameLine",
];

const REGISTER: &[TokenKind] = &[
    TokenKind::Class,
    TokenKind::Interface,
    TokenKind::OpenCurlyBracket,
    TokenKind::CloseCurlyBracket,
];

/// Checks the keyword, the opening brace and the closing brace of every
/// class or interface declaration, one phase per trigger token.
pub struct ClassDeclarationRule {
    base: Box<dyn StructuralCheck>,
}

impl ClassDeclarationRule {
    pub fn new() -> Self {
        Self::with_base(Box::new(DeclarationBraces))
    }

    /// Use a different structural check in place of [`DeclarationBraces`]
    pub fn with_base(base: Box<dyn StructuralCheck>) -> Self {
        Self { base }
    }
}

impl Default for ClassDeclarationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ClassDeclarationRule {
    fn id(&self) -> &str {
        "class-declaration"
    }

    fn description(&self) -> &str {
        "Class and interface declarations: keyword spacing, brace placement, one per file"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Layout
    }

    fn codes(&self) -> &[&'static str] {
        CODES
    }

    fn register(&self) -> &[TokenKind] {
        REGISTER
    }

    fn process(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError> {
        let token = stream.require(ptr)?;
        match token.kind {
            TokenKind::Class | TokenKind::Interface => self.process_open(stream, ptr, sink),
            TokenKind::OpenCurlyBracket => match declaration_owner(stream, token) {
                Some(owner) => process_body(stream, ptr, owner, sink),
                None => Ok(()),
            },
            TokenKind::CloseCurlyBracket => match declaration_owner(stream, token) {
                Some(owner) => process_close(stream, ptr, owner, sink),
                None => Ok(()),
            },
            found => Err(RuleError::UnexpectedToken {
                ptr,
                expected: "class, interface or curly brace",
                found,
            }),
        }
    }
}

impl ClassDeclarationRule {
    fn process_open(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError> {
        self.base.check(stream, ptr, sink)?;

        if let Some(next) =
            stream.find_next(&[TokenKind::Class, TokenKind::Interface], ptr + 1, None, false)
        {
            sink.error(
                "MultipleClasses",
                "Only one interface or class is allowed in a file",
                &[],
                next,
            );
        }

        let keyword = stream.require(ptr)?;
        let Some(prev) = stream.token_before(ptr, 1) else {
            return Ok(());
        };
        if !prev.is_whitespace() || prev.is_line_break() {
            return Ok(());
        }

        let name = keyword.text.to_lowercase();
        let spaces = columns_after_break(&prev.text);
        let modifier = stream
            .token_before(ptr, 2)
            .filter(|t| matches!(t.kind, TokenKind::Abstract | TokenKind::Final));

        match modifier {
            None if spaces != 0 => sink.error(
                "SpaceBeforeKeyword",
                "Expected 0 spaces before %s keyword; %s found",
                &[name, spaces.to_string()],
                ptr,
            ),
            Some(modifier) if spaces != 1 => sink.error(
                "SpacesBeforeKeyword",
                "Expected 1 space between %s and %s keywords; %s found",
                &[modifier.text.to_lowercase(), name, spaces.to_string()],
                ptr,
            ),
            _ => {}
        }

        Ok(())
    }
}

/// Class or interface keyword owning the scope of `brace`
fn declaration_owner<'a>(stream: &'a TokenStream, brace: &Token) -> Option<&'a Token> {
    let owner = stream.get(brace.scope?.owner?)?;
    matches!(owner.kind, TokenKind::Class | TokenKind::Interface).then_some(owner)
}

fn process_body(
    stream: &TokenStream,
    ptr: usize,
    owner: &Token,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), RuleError> {
    let opener = stream.require(ptr)?;
    let Some(next) = stream.find_next(&[TokenKind::Whitespace], ptr + 1, None, true) else {
        return Ok(());
    };

    let next_line = stream.require(next)?.line;
    if next_line > opener.line + 1 {
        let blank = next_line - opener.line - 1;
        sink.error(
            "OpenBraceBlankLines",
            "Opening brace of a %s must not be followed by a blank line; found %s",
            &[owner.text.to_lowercase(), blank.to_string()],
            ptr,
        );
    }

    Ok(())
}

fn process_close(
    stream: &TokenStream,
    ptr: usize,
    owner: &Token,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), RuleError> {
    let closer = stream.require(ptr)?;
    let name = owner.text.to_lowercase();

    if let Some(prev) = stream.token_before(ptr, 1) {
        if prev.is_whitespace() && !prev.is_line_break() {
            let spaces = columns_after_break(&prev.text);
            if spaces != 0 {
                if prev.line != closer.line {
                    sink.error(
                        "NewLineBeforeCloseBrace",
                        "Expected 0 spaces before closing brace; newline found",
                        &[],
                        ptr,
                    );
                } else {
                    sink.error(
                        "SpaceBeforeCloseBrace",
                        "Expected 0 spaces before closing brace; %s found",
                        &[spaces.to_string()],
                        ptr,
                    );
                }
            }
        }
    }

    // End of file after the closer is fine
    if let Some(next) = stream.find_next(
        &[TokenKind::Whitespace, TokenKind::Comment],
        ptr + 1,
        None,
        true,
    ) {
        let next_line = stream.require(next)?.line;
        if next_line == closer.line {
            sink.error(
                "NoNewlineAfterCloseBrace",
                "Closing brace of a %s must be followed by a single blank line",
                &[name.clone()],
                ptr,
            );
        } else if next_line != closer.line + 2 {
            let found = next_line - closer.line - 1;
            sink.error(
                "NewlinesAfterCloseBrace",
                "Closing brace of a %s must be followed by a single blank line; found %s",
                &[name.clone(), found.to_string()],
                ptr,
            );
        }
    }

    // Trailing comments like `}//end class` are allowed
    if let Some(next) = stream.find_next(&[TokenKind::Comment], ptr + 1, None, true) {
        let next = stream.require(next)?;
        if next.line == closer.line && !next.is_line_break() {
            sink.error(
                "CloseBraceSameLine",
                "Closing %s brace must be on a line by itself",
                &[name],
                ptr,
            );
        }
    }

    Ok(())
}
