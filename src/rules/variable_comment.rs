//! Doc comments on member variables
//!
//! Every class member variable carries a doc comment of the form:
//!
//! ```text
//! /**
//!  * Short description.
//!  *
//!  * Optional long description.
//!  *
//!  * @var int
//!  * @see Other::$thing
//!  */
//! ```

use crate::comment::{Comment, CommentParser, TagBody};
use crate::diagnostic::DiagnosticSink;
use crate::rule::{Rule, RuleCategory, RuleError};
use crate::token::{TokenKind, TokenStream};
use crate::types::{split_type, strip_array_shape, ShortTypeNames, TypeNormalizer};

const CODES: &[&str] = &[
    "Missing",
    "WrongStyle",
    "ErrorParsing",
    "Empty",
    "ContentAfterOpen",
    "SpacingBeforeShort",
    "ShortSingleLine",
    "ShortNotCapital",
    "ShortFullStop",
    "SpacingBetween",
    "LongNotCapital",
    "BadMultilineVariable",
    "SpacingBeforeTags",
    "MissingVar",
    "DuplicateVar",
    "VarOrder",
    "MissingVarType",
    "IncorrectVarType",
    "VarIndent",
    "VariableNameInComment",
    "VariableComment",
    "EmptySees",
    "SeesIndent",
    "SpacingAfter",
];

/// Validates the doc comment preceding each class member variable
pub struct VariableCommentRule {
    types: Box<dyn TypeNormalizer>,
}

impl VariableCommentRule {
    pub fn new() -> Self {
        Self::with_types(Box::new(ShortTypeNames))
    }

    /// Use a different canonical spelling for `@var` types
    pub fn with_types(types: Box<dyn TypeNormalizer>) -> Self {
        Self { types }
    }
}

impl Default for VariableCommentRule {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed doc comment and the token range it came from
struct DocBlock {
    comment: Comment,
    start: usize,
    end: usize,
}

impl DocBlock {
    /// Token holding comment line `line`
    fn line_token(&self, line: usize) -> usize {
        (self.start + line).min(self.end)
    }
}

impl Rule for VariableCommentRule {
    fn id(&self) -> &str {
        "variable-comment"
    }

    fn description(&self) -> &str {
        "Member variables need a well-formed doc comment with one @var tag"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Commenting
    }

    fn codes(&self) -> &[&'static str] {
        CODES
    }

    fn register(&self) -> &[TokenKind] {
        &[TokenKind::Variable]
    }

    fn process(
        &self,
        stream: &TokenStream,
        ptr: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), RuleError> {
        let token = stream.require(ptr)?;
        if token.kind != TokenKind::Variable {
            return Err(RuleError::UnexpectedToken {
                ptr,
                expected: "variable",
                found: token.kind,
            });
        }
        if !is_member(stream, ptr) {
            return Ok(());
        }

        let Some(doc) = locate(stream, ptr, sink)? else {
            return Ok(());
        };
        self.check(stream, &doc, sink);
        Ok(())
    }
}

/// Class or interface member: declared directly in the body after a modifier.
/// Type declarations between the modifier and the variable are skipped.
fn is_member(stream: &TokenStream, ptr: usize) -> bool {
    let in_declaration = stream
        .enclosing_owner(ptr)
        .is_some_and(|owner| matches!(owner.kind, TokenKind::Class | TokenKind::Interface));
    if !in_declaration {
        return false;
    }

    let mut prev = stream.previous_code(ptr);
    while let Some(index) = prev {
        let Some(token) = stream.get(index) else {
            return false;
        };
        match token.kind {
            TokenKind::Public
            | TokenKind::Protected
            | TokenKind::Private
            | TokenKind::Static
            | TokenKind::Var => return true,
            TokenKind::Identifier => prev = stream.previous_code(index),
            TokenKind::Operator if matches!(token.text.as_str(), "?" | "|" | "&") => {
                prev = stream.previous_code(index)
            }
            _ => return false,
        }
    }
    false
}

/// Find and parse the doc comment belonging to the variable at `ptr`.
///
/// Returns `None` once a fatal finding has been reported.
fn locate(
    stream: &TokenStream,
    ptr: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<Option<DocBlock>, RuleError> {
    let end = ptr.checked_sub(1).and_then(|from| {
        stream.find_previous(&[TokenKind::Comment, TokenKind::DocComment], from, None, false)
    });
    let Some(end) = end else {
        sink.error("Missing", "Missing variable doc comment", &[], ptr);
        return Ok(None);
    };

    if stream.require(end)?.kind == TokenKind::Comment {
        sink.error(
            "WrongStyle",
            "You must use \"/**\" style comments for a variable comment",
            &[],
            ptr,
        );
        return Ok(None);
    }

    let owner = stream.find_next(
        &[
            TokenKind::Variable,
            TokenKind::Class,
            TokenKind::Interface,
            TokenKind::Function,
        ],
        end + 1,
        None,
        false,
    );
    if owner != Some(ptr) {
        sink.error("Missing", "Missing variable doc comment", &[], ptr);
        return Ok(None);
    }

    let start = stream
        .find_previous(&[TokenKind::DocComment], end, None, true)
        .map_or(0, |i| i + 1);
    let raw = stream.tokens_as_text(start, end);

    match CommentParser::parse(&raw) {
        Ok(comment) => Ok(Some(DocBlock {
            comment,
            start,
            end,
        })),
        Err(err) => {
            log::debug!("doc comment at token {} did not parse: {}", start, err);
            let position = (start + err.line_within_comment).min(end);
            sink.error("ErrorParsing", "%s", &[err.message], position);
            Ok(None)
        }
    }
}

impl VariableCommentRule {
    fn check(&self, stream: &TokenStream, doc: &DocBlock, sink: &mut dyn DiagnosticSink) {
        let comment = &doc.comment;

        if comment.is_empty() {
            sink.error("Empty", "Variable doc comment is empty", &[], doc.start);
            return;
        }

        let opener = stream.get(doc.start).map_or("", |t| t.text.trim_end());
        if opener != "/**" {
            sink.error(
                "ContentAfterOpen",
                "The open comment tag must be the only content on the line",
                &[],
                doc.start,
            );
        }

        check_descriptions(doc, sink);

        if comment.tags.len() > 1 && comment.has_short() && comment.newline_after_description != 2
        {
            let first_tag = comment.tags[0].body().line_within_comment;
            sink.error(
                "SpacingBeforeTags",
                "There must be exactly one blank line before the tags in variable comment",
                &[],
                doc.line_token(first_tag),
            );
        }

        self.check_var(doc, sink);
        check_sees(doc, sink);

        let lines = &comment.lines;
        if lines.len() > 2 && lines[lines.len() - 1].is_empty() && lines[lines.len() - 2].is_empty()
        {
            sink.error(
                "SpacingAfter",
                "Additional blank lines found at end of variable comment",
                &[],
                doc.end,
            );
        }
    }

    fn check_var(&self, doc: &DocBlock, sink: &mut dyn DiagnosticSink) {
        let comment = &doc.comment;
        let vars: Vec<&TagBody> = comment.vars().collect();

        let Some(var) = vars.first() else {
            sink.error(
                "MissingVar",
                "Missing @var tag in variable comment",
                &[],
                doc.end,
            );
            return;
        };
        if let Some(duplicate) = vars.get(1) {
            sink.error(
                "DuplicateVar",
                "Only 1 @var tag is allowed in variable comment",
                &[],
                doc.line_token(duplicate.line_within_comment),
            );
            return;
        }

        let position = doc.line_token(var.line_within_comment);
        if comment.tag_order.first().map(String::as_str) != Some("var") {
            sink.error(
                "VarOrder",
                "The @var tag must be the first tag in a variable comment",
                &[],
                position,
            );
        }

        if var.content.is_empty() {
            sink.error(
                "MissingVarType",
                "Var type missing for @var tag in variable comment",
                &[],
                position,
            );
            return;
        }

        let (found, description) = split_type(&var.content);
        let expected = self.types.suggest(found);
        if expected != found {
            sink.error(
                "IncorrectVarType",
                "Expected \"%s\"; found \"%s\" for @var tag in variable comment",
                &[expected, found.to_string()],
                position,
            );
        }

        if var.whitespace_before_content != " " {
            let spaces = space_count(&var.whitespace_before_content);
            sink.error(
                "VarIndent",
                "@var tag indented incorrectly; expected 1 space but found %s",
                &[spaces.to_string()],
                position,
            );
        }

        let description = strip_array_shape(description);
        if description.is_empty() {
            return;
        }
        if description.starts_with('$') {
            sink.error(
                "VariableNameInComment",
                "@var description must not start with the variable name; found \"%s\"",
                &[description.to_string()],
                position,
            );
            return;
        }
        if !description.ends_with(['.', '?', '!']) {
            sink.error(
                "VariableComment",
                "@var comment must end in a full-stop, exclamation mark, or question mark",
                &[],
                position,
            );
        }
        if !starts_upper(description) {
            sink.error(
                "VariableComment",
                "@var comment must start with a capital letter",
                &[],
                position,
            );
        }
    }
}

fn check_descriptions(doc: &DocBlock, sink: &mut dyn DiagnosticSink) {
    let comment = &doc.comment;
    if !comment.has_short() {
        return;
    }

    if comment.short.starts_with('\n') {
        sink.error(
            "SpacingBeforeShort",
            "Extra newline(s) found before variable comment short description",
            &[],
            doc.line_token(1),
        );
    }

    let short = comment.short.trim_start_matches('\n');
    let short_position = doc.line_token(comment.short_line);
    if short.contains('\n') {
        sink.error(
            "ShortSingleLine",
            "Variable comment short description must be on a single line",
            &[],
            short_position,
        );
    }
    if !starts_upper(short) {
        sink.error(
            "ShortNotCapital",
            "Variable comment short description must start with a capital letter",
            &[],
            short_position,
        );
    }
    if !short.ends_with('.') {
        sink.error(
            "ShortFullStop",
            "Variable comment short description must end with a full stop",
            &[],
            short_position,
        );
    }

    if comment.has_long() {
        let newlines = comment.whitespace_between.matches('\n').count();
        if newlines != 2 {
            sink.error(
                "SpacingBetween",
                "There must be exactly one blank line between descriptions in variable comment",
                &[],
                doc.line_token(comment.short_line + short.lines().count()),
            );
        }

        if !starts_upper(&comment.long) {
            let long_line = comment.long_line.unwrap_or(comment.short_line);
            sink.error(
                "LongNotCapital",
                "Variable comment long description must start with a capital letter",
                &[],
                doc.line_token(long_line),
            );
        }
    } else if let Some(var) = comment.vars().next() {
        let (_, description) = split_type(&var.content);
        if !description.is_empty() {
            sink.error(
                "BadMultilineVariable",
                "Variable comment must describe the variable once; found both a short description and an @var description",
                &[],
                doc.line_token(var.line_within_comment),
            );
        }
    }
}

fn check_sees(doc: &DocBlock, sink: &mut dyn DiagnosticSink) {
    for see in doc.comment.sees() {
        let position = doc.line_token(see.line_within_comment);
        if see.content.is_empty() {
            sink.error(
                "EmptySees",
                "Content missing for @see tag in variable comment",
                &[],
                position,
            );
            continue;
        }

        if see.whitespace_before_content != " " {
            let spaces = space_count(&see.whitespace_before_content);
            sink.error(
                "SeesIndent",
                "@see tag indented incorrectly; expected 1 space but found %s",
                &[spaces.to_string()],
                position,
            );
        }
    }
}

/// Literal spaces only; tabs do not count
fn space_count(whitespace: &str) -> usize {
    whitespace.chars().filter(|&c| c == ' ').count()
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Collector;
    use crate::rules::run_rule;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    /// Wrap a member declaration (with its comment) in a class body
    fn member(doc: &str) -> String {
        format!("<?php\n\n/**\n * Holds things.\n */\nclass Foo\n{{\n{}\n}}\n", doc)
    }

    fn check(source: &str) -> Collector {
        run_rule(&VariableCommentRule::new(), &tokenize(source))
    }

    fn codes(doc: &str) -> Vec<String> {
        check(&member(doc))
            .codes()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_clean_comment() {
        let doc = "    /**\n     * The number of items.\n     *\n     * @var int\n     */\n    public $count = 0;";
        assert!(codes(doc).is_empty());

        let doc = "    /**\n     * A.\n     *\n     * @var int\n     */\n    private static ?int $count;";
        assert!(codes(doc).is_empty());
    }

    #[test]
    fn test_missing_var_type_stops_var_checks() {
        let doc = "    /**\n     * invalid\n     * @var\n     */\n    public $x;";
        let found = codes(doc);
        assert!(found.contains(&"MissingVarType".to_string()));
        assert!(!found.contains(&"IncorrectVarType".to_string()));
        assert!(!found.contains(&"VarIndent".to_string()));
    }

    #[test]
    fn test_short_description_and_name_leak() {
        let doc = "    /**\n     * returns nothing\n     *\n     * @var int $count the number\n     */\n    public $count;";
        let found = codes(doc);
        for code in ["ShortNotCapital", "ShortFullStop", "VariableNameInComment"] {
            assert!(found.contains(&code.to_string()), "{} in {:?}", code, found);
        }
        assert!(!found.contains(&"VariableComment".to_string()));
    }

    #[test]
    fn test_line_comment_is_wrong_style() {
        assert_eq!(codes("    // x\n    public $x;"), vec!["WrongStyle"]);
    }

    #[test]
    fn test_missing_comment() {
        assert_eq!(codes("    public $x;"), vec!["Missing"]);

        // The class comment belongs to the class
        let sink = check("<?php\n/**\n * Foo.\n */\nclass Foo\n{\n    public $x;\n}\n");
        assert_eq!(sink.codes(), vec!["Missing"]);
    }

    #[test]
    fn test_non_members_are_skipped() {
        let source = "<?php\n$top = 1;\nclass Foo\n{\n    /**\n     * Bar.\n     *\n     * @var int\n     */\n    public $bar;\n\n    public function baz($arg)\n    {\n        $local = $this->bar;\n    }\n}\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_parse_error_position() {
        let source = member("    /**\n     * Short.\n     * @1\n     */\n    public $x;");
        let stream = tokenize(&source);
        let sink = run_rule(&VariableCommentRule::new(), &stream);

        assert_eq!(sink.codes(), vec!["ErrorParsing"]);
        let diag = &sink.diagnostics()[0];
        assert_eq!(diag.message, "Invalid doc comment tag \"@1\"");
        assert_eq!(stream.get(diag.position).unwrap().text, "     * @1\n");
    }

    #[test]
    fn test_empty_comment() {
        assert_eq!(codes("    /**\n     *\n     */\n    public $x;"), vec!["Empty"]);
    }

    #[test]
    fn test_content_after_open() {
        assert_eq!(
            codes("    /** Short.\n     * @var int\n     */\n    public $x;"),
            vec!["ContentAfterOpen"]
        );
    }

    #[test]
    fn test_description_layout() {
        let doc = "    /**\n     *\n     * Short\n     * text.\n     *\n     *\n     * long text.\n     *\n     * @var int\n     */\n    public $x;";
        assert_eq!(
            codes(doc),
            vec![
                "SpacingBeforeShort",
                "ShortSingleLine",
                "SpacingBetween",
                "LongNotCapital"
            ]
        );
    }

    #[test]
    fn test_var_tag_checks() {
        let doc = "    /**\n     * Short.\n     *\n     * @var  integer the count\n     */\n    public $x;";
        let sink = check(&member(doc));
        assert_eq!(
            sink.codes(),
            vec![
                "BadMultilineVariable",
                "IncorrectVarType",
                "VarIndent",
                "VariableComment",
                "VariableComment"
            ]
        );
        assert_eq!(
            sink.diagnostics()[1].message,
            "Expected \"int\"; found \"integer\" for @var tag in variable comment"
        );
        assert_eq!(
            sink.diagnostics()[2].message,
            "@var tag indented incorrectly; expected 1 space but found 2"
        );
    }

    #[test]
    fn test_var_tag_presence_and_order() {
        let doc = "    /**\n     * Short.\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["MissingVar"]);

        let doc = "    /**\n     * Short.\n     *\n     * @see Foo\n     * @var int\n     * @var string\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["DuplicateVar"]);

        let doc = "    /**\n     * Short.\n     *\n     * @see Foo\n     * @var int\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["VarOrder"]);
    }

    #[test]
    fn test_see_tags() {
        let doc = "    /**\n     * Short.\n     *\n     * @var int\n     * @see\n     * @see   Foo\n     */\n    public $x;";
        let sink = check(&member(doc));
        assert_eq!(sink.codes(), vec!["EmptySees", "SeesIndent"]);
        assert_eq!(sink.diagnostics()[1].args, vec!["3"]);
    }

    #[test]
    fn test_tag_spacing_must_be_one_space() {
        let doc = "    /**\n     * Short.\n     *\n     * @var\tint\n     */\n    public $x;";
        let sink = check(&member(doc));
        assert_eq!(sink.codes(), vec!["VarIndent"]);
        assert_eq!(sink.diagnostics()[0].args, vec!["0"]);

        let doc = "    /**\n     * Short.\n     *\n     * @var int\n     * @see\tFoo\n     */\n    public $x;";
        let sink = check(&member(doc));
        assert_eq!(sink.codes(), vec!["SeesIndent"]);
        assert_eq!(sink.diagnostics()[0].args, vec!["0"]);
    }

    #[test]
    fn test_var_description_terminators() {
        let cases = [
            ("Count?", vec![]),
            ("Count!", vec![]),
            ("Count.", vec![]),
            ("Count", vec!["VariableComment"]),
            ("count.", vec!["VariableComment"]),
        ];

        for (description, expected) in cases {
            let doc = format!(
                "    /**\n     * Short.\n     *\n     * Long text.\n     *\n     * @var int {}\n     */\n    public $x;",
                description
            );
            assert_eq!(codes(&doc), expected, "description {:?}", description);
        }
    }

    #[test]
    fn test_intersection_type_member() {
        let doc = "    /**\n     * Short.\n     *\n     * @var Foo&Bar\n     */\n    public Foo&Bar $x;";
        assert!(codes(doc).is_empty());

        assert_eq!(codes("    public Foo&Bar $x;"), vec!["Missing"]);
    }

    #[test]
    fn test_spacing_before_tags() {
        let doc = "    /**\n     * Short.\n     * @var int\n     * @see Foo\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["SpacingBeforeTags"]);

        // A single tag is not checked
        let doc = "    /**\n     * Short.\n     * @var int\n     */\n    public $x;";
        assert!(codes(doc).is_empty());
    }

    #[test]
    fn test_spacing_after() {
        let doc = "    /**\n     * Short.\n     *\n     * @var int\n     *\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["SpacingAfter"]);
    }

    #[test]
    fn test_array_shape_description() {
        let doc = "    /**\n     * Short.\n     *\n     * @var array [key => value] Map of values.\n     */\n    public $x;";
        assert_eq!(codes(doc), vec!["BadMultilineVariable"]);
    }

    #[test]
    fn test_custom_type_normalizer() {
        struct Upper;
        impl TypeNormalizer for Upper {
            fn suggest(&self, raw: &str) -> String {
                raw.to_uppercase()
            }
        }

        let rule = VariableCommentRule::with_types(Box::new(Upper));
        let source = member("    /**\n     * Short.\n     *\n     * @var int\n     */\n    public $x;");
        let sink = run_rule(&rule, &tokenize(&source));
        assert_eq!(sink.codes(), vec!["IncorrectVarType"]);
        assert_eq!(sink.diagnostics()[0].args, vec!["INT", "int"]);
    }
}
