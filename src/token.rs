//! Token stream consumed by the rules
//!
//! A [`TokenStream`] is an immutable, indexed sequence of tokens for one file,
//! together with the scope map (matching braces and their owners). Rules only
//! read from it through the lookup helpers below.

use crate::rule::RuleError;
use serde::Serialize;
use std::fmt;

/// Closed set of token kinds produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `<?php`
    OpenTag,
    /// `?>`
    CloseTag,
    /// Spaces, tabs and at most one trailing line break
    Whitespace,
    /// `//`, `#` or `/* */` comment
    Comment,
    /// One line of a `/** */` comment
    DocComment,
    /// `$name`
    Variable,
    /// Bare name that is not a recognized keyword
    Identifier,
    /// Other reserved word (`return`, `new`, `extends`, ...)
    Keyword,
    /// Quoted string literal
    ConstantString,
    /// Numeric literal
    Number,
    Class,
    Interface,
    Abstract,
    Final,
    Function,
    Public,
    Protected,
    Private,
    Static,
    Var,
    Const,
    /// `if`, `foreach`, `while`, `try`, ... (anything that owns a brace block)
    ControlStructure,
    OpenCurlyBracket,
    CloseCurlyBracket,
    OpenParenthesis,
    CloseParenthesis,
    OpenSquareBracket,
    CloseSquareBracket,
    Semicolon,
    Comma,
    /// `::`
    DoubleColon,
    /// `->`
    ObjectOperator,
    /// Any other punctuation
    Operator,
}

impl TokenKind {
    /// Kinds that can own a brace-delimited scope
    pub fn is_scope_owner(self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Function
                | TokenKind::ControlStructure
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Brace pair delimiting a scope, plus the keyword that owns it (if any)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeSpan {
    pub owner: Option<usize>,
    pub opener: usize,
    pub closer: usize,
}

/// A single token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Position in the stream
    pub index: usize,
    pub kind: TokenKind,
    /// Raw source text
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Scope span, set on scope owners and on both braces
    pub scope: Option<ScopeSpan>,
    /// Opener index of the innermost scope this token sits in
    pub enclosing: Option<usize>,
}

impl Token {
    /// Whitespace consisting of nothing but a line break
    pub fn is_line_break(&self) -> bool {
        self.text == "\n" || self.text == "\r\n"
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}

/// Number of characters after the last line break of `text`
/// (the whole length when there is no line break).
pub fn columns_after_break(text: &str) -> usize {
    text.rsplit('\n').next().map_or(0, |tail| tail.chars().count())
}

/// Immutable token sequence for one file
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Build a stream from raw `(kind, text)` pairs.
    ///
    /// Assigns indexes, lines and columns, then links braces into scope spans.
    /// Unbalanced braces are tolerated: an unmatched brace simply gets no span.
    pub fn build<S: Into<String>>(raw: Vec<(TokenKind, S)>) -> Self {
        let mut tokens = Vec::with_capacity(raw.len());
        let mut line = 1;
        let mut column = 1;

        for (index, (kind, text)) in raw.into_iter().enumerate() {
            let text = text.into();
            tokens.push(Token {
                index,
                kind,
                text: text.clone(),
                line,
                column,
                scope: None,
                enclosing: None,
            });

            for ch in text.chars() {
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
        }

        link_scopes(&mut tokens);
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Like [`get`](Self::get), but a missing token is an internal invariant failure
    pub fn require(&self, index: usize) -> Result<&Token, RuleError> {
        self.tokens.get(index).ok_or(RuleError::OutOfBounds(index))
    }

    /// Token `distance` positions before `index`, bounds-checked
    pub fn token_before(&self, index: usize, distance: usize) -> Option<&Token> {
        index.checked_sub(distance).and_then(|i| self.tokens.get(i))
    }

    /// Find the next token at or after `from` whose kind is in `kinds`.
    ///
    /// With `exclude`, finds the next token whose kind is *not* in `kinds`.
    /// The search stops before `until` when given.
    pub fn find_next(
        &self,
        kinds: &[TokenKind],
        from: usize,
        until: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        let end = until.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (from..end).find(|&i| kinds.contains(&self.tokens[i].kind) != exclude)
    }

    /// Find the previous token at or before `from` whose kind is in `kinds`.
    ///
    /// With `exclude`, finds the previous token whose kind is *not* in `kinds`.
    /// The search does not go below `until` (inclusive) when given.
    pub fn find_previous(
        &self,
        kinds: &[TokenKind],
        from: usize,
        until: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = from.min(self.tokens.len() - 1);
        let stop = until.unwrap_or(0);
        if stop > start {
            return None;
        }
        (stop..=start)
            .rev()
            .find(|&i| kinds.contains(&self.tokens[i].kind) != exclude)
    }

    /// Previous token before `index` that is not whitespace or a comment
    pub fn previous_code(&self, index: usize) -> Option<usize> {
        let from = index.checked_sub(1)?;
        self.find_previous(
            &[
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::DocComment,
            ],
            from,
            None,
            true,
        )
    }

    /// Concatenated text of tokens `from..=to`
    pub fn tokens_as_text(&self, from: usize, to: usize) -> String {
        if from > to || from >= self.tokens.len() {
            return String::new();
        }
        let to = to.min(self.tokens.len() - 1);
        self.tokens[from..=to]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Owner keyword of the innermost scope `index` sits in
    pub fn enclosing_owner(&self, index: usize) -> Option<&Token> {
        let opener = self.tokens.get(index)?.enclosing?;
        let owner = self.tokens.get(opener)?.scope?.owner?;
        self.tokens.get(owner)
    }

    /// First token on the same line as `index`
    pub fn line_start(&self, index: usize) -> usize {
        let Some(line) = self.tokens.get(index).map(|t| t.line) else {
            return index;
        };
        let mut start = index;
        while start > 0 {
            let prev = &self.tokens[start - 1];
            if prev.line != line || prev.text.contains('\n') {
                break;
            }
            start -= 1;
        }
        start
    }
}

/// Match braces and attach scope spans.
///
/// The owner of a block is the last scope-owning keyword seen in the current
/// statement; a `;` outside parentheses ends the statement.
fn link_scopes(tokens: &mut [Token]) {
    let mut stack: Vec<(usize, Option<usize>)> = Vec::new();
    let mut pending_owner: Option<usize> = None;
    let mut paren_depth: usize = 0;

    for i in 0..tokens.len() {
        tokens[i].enclosing = stack.last().map(|&(opener, _)| opener);

        match tokens[i].kind {
            kind if kind.is_scope_owner() => pending_owner = Some(i),
            TokenKind::OpenParenthesis => paren_depth += 1,
            TokenKind::CloseParenthesis => paren_depth = paren_depth.saturating_sub(1),
            TokenKind::Semicolon if paren_depth == 0 => pending_owner = None,
            TokenKind::OpenCurlyBracket => {
                stack.push((i, pending_owner.take()));
                paren_depth = 0;
            }
            TokenKind::CloseCurlyBracket => {
                if let Some((opener, owner)) = stack.pop() {
                    let span = ScopeSpan {
                        owner,
                        opener,
                        closer: i,
                    };
                    tokens[opener].scope = Some(span);
                    tokens[i].scope = Some(span);
                    if let Some(owner) = owner {
                        tokens[owner].scope = Some(span);
                    }
                    tokens[i].enclosing = stack.last().map(|&(opener, _)| opener);
                }
                pending_owner = None;
            }
            _ => {}
        }
    }
}
