//! Recursive-descent parser for doc comments

use super::{Comment, ParseError, Tag, TagBody};
use regex::Regex;
use std::sync::LazyLock;

/// `@name`, the whitespace run after it, and the rest of the line
static TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_\-\\]*)(\s*)(.*)$").unwrap());

/// Parser over the decoration-stripped lines of one doc comment
pub struct CommentParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> CommentParser<'a> {
    /// Parse the text of one doc comment, `/**` through `*/` inclusive
    pub fn parse(raw: &'a str) -> Result<Comment, ParseError> {
        let mut parser = Self::new(raw)?;
        parser.parse_comment()
    }

    fn new(raw: &'a str) -> Result<Self, ParseError> {
        let last_line = raw.matches('\n').count();
        let body = raw
            .strip_prefix("/**")
            .ok_or_else(|| ParseError::new("Doc comment must start with /**", 0))?;
        let body = body
            .trim_end()
            .strip_suffix("*/")
            .ok_or_else(|| ParseError::new("Doc comment is not closed with */", last_line))?;

        let lines = body
            .split('\n')
            .enumerate()
            .map(|(i, line)| strip_decoration(line, i == 0))
            .collect();

        Ok(Self { lines, pos: 0 })
    }

    fn parse_comment(&mut self) -> Result<Comment, ParseError> {
        let mut comment = Comment {
            lines: self.lines.iter().map(|l| l.to_string()).collect(),
            ..Comment::default()
        };
        self.parse_description(&mut comment);
        self.parse_tags(&mut comment)?;
        Ok(comment)
    }

    fn parse_description(&mut self, comment: &mut Comment) {
        let end = self
            .lines
            .iter()
            .position(|l| l.starts_with('@'))
            .unwrap_or(self.lines.len());

        // Text on the opener line is part of the description
        let first = match self.lines.first() {
            Some(line) if line.is_empty() => 1,
            _ => 0,
        };
        let start = self.skip_blank(first, end);
        self.pos = end;

        if start >= end {
            comment.newline_after_description = end;
            return;
        }

        let short_end = self.skip_text(start, end);
        comment.short_line = start;
        comment.short = format!(
            "{}{}",
            "\n".repeat(start - first),
            self.lines[start..short_end].join("\n")
        );
        let mut last_text = short_end - 1;

        let long_start = self.skip_blank(short_end, end);
        if long_start < end {
            let long_end = (long_start..end)
                .rev()
                .find(|&i| !self.lines[i].is_empty())
                .unwrap_or(long_start);
            comment.whitespace_between = "\n".repeat(long_start - short_end + 1);
            comment.long = self.lines[long_start..=long_end].join("\n");
            comment.long_line = Some(long_start);
            last_text = long_end;
        }

        if end < self.lines.len() {
            comment.newline_after_description = end - last_text;
        }
    }

    fn parse_tags(&mut self, comment: &mut Comment) -> Result<(), ParseError> {
        while self.pos < self.lines.len() {
            if self.lines[self.pos].starts_with('@') {
                self.parse_tag(comment)?;
            } else {
                self.pos += 1;
            }
        }
        Ok(())
    }

    fn parse_tag(&mut self, comment: &mut Comment) -> Result<(), ParseError> {
        let line = self.pos;
        let text = self.lines[line];
        let caps = TAG_LINE
            .captures(text)
            .ok_or_else(|| ParseError::new(format!("Invalid doc comment tag \"{}\"", text), line))?;

        let name = caps.get(1).map_or("", |m| m.as_str());
        let whitespace = caps.get(2).map_or("", |m| m.as_str());
        let mut parts = vec![caps.get(3).map_or("", |m| m.as_str())];

        self.pos += 1;
        let continuation_end = self.skip_text(self.pos, self.lines.len());
        while self.pos < continuation_end && !self.lines[self.pos].starts_with('@') {
            parts.push(self.lines[self.pos]);
            self.pos += 1;
        }

        let body = TagBody {
            line_within_comment: line,
            content: parts.join(" ").trim().to_string(),
            whitespace_before_content: whitespace.to_string(),
        };
        comment.tag_order.push(name.to_string());
        comment.tags.push(Tag::new(name, body));
        Ok(())
    }

    /// First line at or after `from` (and before `end`) that is not blank
    fn skip_blank(&self, from: usize, end: usize) -> usize {
        (from..end)
            .find(|&i| !self.lines[i].is_empty())
            .unwrap_or(end)
    }

    /// First line at or after `from` (and before `end`) that is blank
    fn skip_text(&self, from: usize, end: usize) -> usize {
        (from..end)
            .find(|&i| self.lines[i].is_empty())
            .unwrap_or(end)
    }
}

/// Trim a comment line and drop one leading `*` (not on the opener line)
fn strip_decoration(line: &str, opener: bool) -> &str {
    let line = line.trim();
    if opener {
        return line;
    }
    line.strip_prefix('*').map_or(line, str::trim)
}
