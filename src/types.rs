//! Type-name normalization for `@var` tags

/// Maps a raw type spelling to its canonical form
pub trait TypeNormalizer: Send + Sync {
    fn suggest(&self, raw: &str) -> String;
}

/// Canonical short built-in names (`bool`, `int`, `float`, ...).
/// Class names pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortTypeNames;

const BUILTIN: &[&str] = &[
    "string", "array", "mixed", "object", "resource", "callable", "iterable", "null", "void",
    "false", "true", "self", "static", "never",
];

impl TypeNormalizer for ShortTypeNames {
    fn suggest(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        let union = split_top_level(raw, '|');
        if union.len() > 1 {
            return union
                .iter()
                .map(|part| self.suggest(part))
                .collect::<Vec<_>>()
                .join("|");
        }

        if let Some(inner) = raw.strip_prefix('?') {
            return format!("?{}", self.suggest(inner));
        }

        if let Some(inner) = raw.strip_suffix("[]") {
            return format!("{}[]", self.suggest(inner));
        }

        if let (Some(open), true) = (raw.find('<'), raw.ends_with('>')) {
            let base = self.suggest(&raw[..open]);
            let args = split_top_level(&raw[open + 1..raw.len() - 1], ',')
                .iter()
                .map(|arg| self.suggest(arg))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("{}<{}>", base, args);
        }

        let lower = raw.to_lowercase();
        match lower.as_str() {
            "bool" | "boolean" => "bool".to_string(),
            "int" | "integer" => "int".to_string(),
            "float" | "double" | "real" => "float".to_string(),
            "array()" => "array".to_string(),
            name if BUILTIN.contains(&name) => lower,
            _ => raw.to_string(),
        }
    }
}

/// Split on `sep` outside of `<>`, `{}`, `()` and `[]` nesting.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' | '}' | ')' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Length of a leading bracketed group (`<..>`, `{..}`, `(..)`, `[..]`), if any
fn bracket_group_len(s: &str) -> Option<usize> {
    if !s.starts_with(['<', '{', '(', '[']) {
        return None;
    }
    let mut depth: usize = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' | '}' | ')' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `@var` content into the type token and the description after it.
///
/// Whitespace inside brackets belongs to the type, so `array<string, int> Map.`
/// yields `("array<string, int>", "Map.")`.
pub fn split_type(content: &str) -> (&str, &str) {
    let content = content.trim();
    let mut depth: usize = 0;

    for (i, c) in content.char_indices() {
        match c {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' | '}' | ')' | ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                return (&content[..i], content[i..].trim());
            }
            _ => {}
        }
    }
    (content, "")
}

/// Drop a leading array-shape group from a description (`[key => value] Items.`)
pub fn strip_array_shape(description: &str) -> &str {
    let description = description.trim();
    match bracket_group_len(description) {
        Some(len) => description[len..].trim(),
        None => description,
    }
}
