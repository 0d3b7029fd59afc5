//! Lexer for PHP-style source files
//!
//! Produces the [`TokenStream`] the rules consume. This is a lexer with brace
//! matching only; it never builds a syntax tree.
//!
//! Token layout follows a few conventions the rules rely on:
//! - a whitespace token never continues past a line break, so every `\n` ends
//!   its whitespace token;
//! - line comments do not include their line break;
//! - block and doc comments are split into one token per line, each keeping
//!   its trailing `\n`.

use crate::token::{TokenKind, TokenStream};

/// Tokenize `source` into a stream
pub fn tokenize(source: &str) -> TokenStream {
    let mut lexer = Lexer::new(source);
    lexer.run();
    TokenStream::build(lexer.raw)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    raw: Vec<(TokenKind, String)>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, kind: TokenKind, len: usize) {
        let text = &self.src[self.pos..self.pos + len];
        self.raw.push((kind, text.to_string()));
        self.pos += len;
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            let rest = self.rest();

            if ch == ' ' || ch == '\t' || ch == '\r' || ch == '\n' {
                self.lex_whitespace();
            } else if rest.get(..5).is_some_and(|tag| tag.eq_ignore_ascii_case("<?php")) {
                self.push(TokenKind::OpenTag, 5);
            } else if rest.starts_with("?>") {
                self.push(TokenKind::CloseTag, 2);
            } else if rest.starts_with("/*") {
                self.lex_block_comment();
            } else if rest.starts_with("//") || (ch == '#' && !rest.starts_with("#[")) {
                let len = rest.find('\n').unwrap_or(rest.len());
                let len = if rest[..len].ends_with('\r') { len - 1 } else { len };
                self.push(TokenKind::Comment, len);
            } else if ch == '$' && rest[1..].starts_with(is_ident_start) {
                let len = 1 + ident_len(&rest[1..]);
                self.push(TokenKind::Variable, len);
            } else if is_ident_start(ch) || ch == '\\' {
                self.lex_word();
            } else if ch.is_ascii_digit() {
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                    .unwrap_or(rest.len());
                self.push(TokenKind::Number, len);
            } else if ch == '\'' || ch == '"' {
                let len = string_len(rest, ch);
                self.push(TokenKind::ConstantString, len);
            } else {
                self.lex_punctuation(ch);
            }
        }
    }

    fn lex_whitespace(&mut self) {
        let rest = self.rest();
        let mut len = 0;
        for (i, c) in rest.char_indices() {
            match c {
                '\n' => {
                    len = i + 1;
                    break;
                }
                ' ' | '\t' | '\r' => len = i + c.len_utf8(),
                _ => break,
            }
        }
        self.push(TokenKind::Whitespace, len);
    }

    fn lex_block_comment(&mut self) {
        let rest = self.rest();
        let kind = if rest.starts_with("/**") && !rest.starts_with("/**/") {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        let end = rest[2..].find("*/").map_or(rest.len(), |i| i + 4);

        let mut remaining = end;
        while remaining > 0 {
            let chunk = &self.rest()[..remaining];
            let len = chunk.find('\n').map_or(remaining, |i| i + 1);
            self.push(kind, len);
            remaining -= len;
        }
    }

    fn lex_word(&mut self) {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\\'))
            .unwrap_or(rest.len());
        let word = &rest[..len];

        // `Foo::class`, `$a->class` and `new class {}` are not declarations
        let not_declaration = match self.last_code() {
            Some((TokenKind::DoubleColon | TokenKind::ObjectOperator, _)) => true,
            Some((TokenKind::Keyword, text)) => text.eq_ignore_ascii_case("new"),
            _ => false,
        };
        let kind = if not_declaration {
            TokenKind::Identifier
        } else {
            keyword_kind(word)
        };
        self.push(kind, len);
    }

    fn lex_punctuation(&mut self, ch: char) {
        let rest = self.rest();
        let (kind, len) = if rest.starts_with("::") {
            (TokenKind::DoubleColon, 2)
        } else if rest.starts_with("->") {
            (TokenKind::ObjectOperator, 2)
        } else {
            let kind = match ch {
                '{' => TokenKind::OpenCurlyBracket,
                '}' => TokenKind::CloseCurlyBracket,
                '(' => TokenKind::OpenParenthesis,
                ')' => TokenKind::CloseParenthesis,
                '[' => TokenKind::OpenSquareBracket,
                ']' => TokenKind::CloseSquareBracket,
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                _ => TokenKind::Operator,
            };
            (kind, ch.len_utf8())
        };
        self.push(kind, len);
    }

    fn last_code(&self) -> Option<(TokenKind, &str)> {
        self.raw
            .iter()
            .rev()
            .map(|(kind, text)| (*kind, text.as_str()))
            .find(|(kind, _)| {
                !matches!(
                    kind,
                    TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
                )
            })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len())
}

/// Length of a quoted string starting at the quote, honouring backslash escapes.
/// An unterminated string runs to the end of input.
fn string_len(s: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + 1;
        }
    }
    s.len()
}

fn keyword_kind(word: &str) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "function" => TokenKind::Function,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "static" => TokenKind::Static,
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "if" | "else" | "elseif" | "for" | "foreach" | "while" | "do" | "switch" | "try"
        | "catch" | "finally" | "declare" => TokenKind::ControlStructure,
        "extends" | "implements" | "return" | "new" | "namespace" | "use" | "echo" | "print"
        | "throw" | "trait" | "instanceof" | "as" | "case" | "default" | "break"
        | "continue" | "global" | "require" | "require_once" | "include" | "include_once" => {
            TokenKind::Keyword
        }
        _ => TokenKind::Identifier,
    }
}
