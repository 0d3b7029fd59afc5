//! stylesniff - PHP declaration and doc comment style checker
//!
//! Tokenizes PHP sources and runs token-triggered rules over them.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> tokenizer -> TokenStream -> Rule::process -> Diagnostic
//! ```
//!
//! Each rule registers the token kinds it cares about. The engine calls it
//! once per matching token, then filters the collected diagnostics through
//! configuration and inline `stylesniff-disable` comments.
//!
//! # Example
//!
//! ```
//! use stylesniff::{Config, Engine};
//! use std::path::Path;
//!
//! let engine = Engine::with_builtin_rules(Config::default());
//! let result = engine.lint_source("<?php\nclass Foo\n{\n\n    public $x;\n}\n", Path::new("Foo.php"));
//! assert!(result.has_errors());
//! ```

pub mod comment;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod output;
pub mod rule;
pub mod rules;
pub mod suppress;
pub mod token;
pub mod tokenizer;
pub mod types;

// Re-export main types
pub use comment::{Comment, Tag, TagBody};
pub use config::Config;
pub use diagnostic::{Diagnostic, DiagnosticSink, Location, Severity};
pub use engine::{Engine, LintResult, RuleTiming};
pub use output::{formatter_for, GithubFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use rule::{Rule, RuleCategory, RuleError};
pub use rules::{builtin_rules, ClassDeclarationRule, DeclarationBraces, StructuralCheck, VariableCommentRule};
pub use token::{Token, TokenKind, TokenStream};
pub use tokenizer::tokenize;
pub use types::{ShortTypeNames, TypeNormalizer};
