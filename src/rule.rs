//! Rule interface and metadata

use crate::diagnostic::DiagnosticSink;
use crate::token::{TokenKind, TokenStream};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rule category for grouping related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Declaration layout, braces and blank lines
    #[default]
    Layout,
    /// Documentation comments
    Commenting,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Layout => write!(f, "layout"),
            RuleCategory::Commenting => write!(f, "commenting"),
        }
    }
}

impl std::str::FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "layout" | "structure" => Ok(RuleCategory::Layout),
            "commenting" | "docs" => Ok(RuleCategory::Commenting),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Internal invariant failure inside a single rule invocation.
///
/// These are never user findings: the engine logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("token {0} is out of bounds")]
    OutOfBounds(usize),

    #[error("token {ptr} has no scope span")]
    MissingScope { ptr: usize },

    #[error("expected {expected} at token {ptr}, found {found}")]
    UnexpectedToken {
        ptr: usize,
        expected: &'static str,
        found: TokenKind,
    },
}

/// A style rule.
///
/// The engine calls [`process`](Rule::process) once for every token whose kind
/// is listed by [`register`](Rule::register). Implementations keep no state
/// between calls.
pub trait Rule: Send + Sync {
    /// Unique rule identifier (e.g. "class-declaration")
    fn id(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    fn category(&self) -> RuleCategory {
        RuleCategory::default()
    }

    /// Every code this rule can report
    fn codes(&self) -> &[&'static str];

    /// Token kinds that trigger this rule
    fn register(&self) -> &[TokenKind];

    /// Check the token at `ptr`, reporting violations to `sink`
    fn process(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError>;
}
