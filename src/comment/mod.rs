//! Structured doc comments
//!
//! A doc comment is split into a short description, an optional long
//! description and an ordered list of tags:
//!
//! ```text
//! /**
//!  * Short description.
//!  *
//!  * Long description.
//!  *
//!  * @var int
//!  * @see Other::$thing
//!  */
//! ```

mod parser;

pub use parser::CommentParser;

use thiserror::Error;

/// Failure to make sense of a doc comment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// Line within the comment (0 = the line holding `/**`)
    pub line_within_comment: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line_within_comment: usize) -> Self {
        Self {
            message: message.into(),
            line_within_comment,
        }
    }
}

/// Position and text shared by every tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBody {
    /// Line within the comment the tag starts on
    pub line_within_comment: usize,
    /// Text after the tag name and its whitespace run
    pub content: String,
    /// Whitespace between the tag name and the content
    pub whitespace_before_content: String,
}

/// A tagged entry of a doc comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `@var`
    Var(TagBody),
    /// `@see`
    See(TagBody),
    /// Any other tag, kept for ordering only
    Other { name: String, body: TagBody },
}

impl Tag {
    pub fn new(name: &str, body: TagBody) -> Self {
        match name {
            "var" => Tag::Var(body),
            "see" => Tag::See(body),
            _ => Tag::Other {
                name: name.to_string(),
                body,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Var(_) => "var",
            Tag::See(_) => "see",
            Tag::Other { name, .. } => name,
        }
    }

    pub fn body(&self) -> &TagBody {
        match self {
            Tag::Var(body) | Tag::See(body) | Tag::Other { body, .. } => body,
        }
    }
}

/// Parsed doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Short description, with one leading `\n` per blank line before it
    pub short: String,
    /// Long description (empty when absent)
    pub long: String,
    /// Line breaks between short and long description
    pub whitespace_between: String,
    pub tags: Vec<Tag>,
    /// Tag names in appearance order
    pub tag_order: Vec<String>,
    /// Line breaks between the end of the description and the first tag
    pub newline_after_description: usize,
    /// Line the short description text starts on
    pub short_line: usize,
    /// Line the long description starts on
    pub long_line: Option<usize>,
    /// Decoration-stripped text of every line, opener line first
    pub lines: Vec<String>,
}

impl Comment {
    pub fn has_short(&self) -> bool {
        !self.short.trim().is_empty()
    }

    pub fn has_long(&self) -> bool {
        !self.long.trim().is_empty()
    }

    /// No description and no tags
    pub fn is_empty(&self) -> bool {
        !self.has_short() && self.tags.is_empty()
    }

    pub fn vars(&self) -> impl Iterator<Item = &TagBody> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Var(body) => Some(body),
            _ => None,
        })
    }

    pub fn sees(&self) -> impl Iterator<Item = &TagBody> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::See(body) => Some(body),
            _ => None,
        })
    }
}
