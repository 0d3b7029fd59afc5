//! Built-in rules

mod brace_layout;
mod class_declaration;
mod variable_comment;

pub use brace_layout::{DeclarationBraces, StructuralCheck};
pub use class_declaration::ClassDeclarationRule;
pub use variable_comment::VariableCommentRule;

use crate::rule::Rule;
use std::sync::Arc;

/// Get all built-in rules
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(ClassDeclarationRule::new()),
        Arc::new(VariableCommentRule::new()),
    ]
}

/// Run one rule over every token it registers for
#[cfg(test)]
pub(crate) fn run_rule(
    rule: &dyn Rule,
    stream: &crate::token::TokenStream,
) -> crate::diagnostic::Collector {
    let mut sink = crate::diagnostic::Collector::for_rule(rule.id());
    for token in stream.tokens() {
        if rule.register().contains(&token.kind) {
            rule.process(stream, token.index, &mut sink)
                .expect("rule invariant failure");
        }
    }
    sink
}
