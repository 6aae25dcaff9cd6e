//! Completion results and their ranking.

use crate::ast::Span;

/// Completions for the cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    /// Candidate names, best first.
    pub identifiers: Vec<String>,
    /// The source range a chosen candidate replaces.
    pub replace_span: Span,
}

impl Suggestions {
    pub fn new(identifiers: Vec<String>, replace_span: Span) -> Self {
        Self {
            identifiers,
            replace_span,
        }
    }
}

/// Orders `choices` by how well they match what the user typed.
///
/// Choices starting with the (trimmed) input come first, then choices
/// containing it further in; others are dropped. Each group keeps the
/// original order. Empty input returns every choice.
///
/// # Example
///
/// ```
/// use hydrui_script::suggest::fuzzy_suggest;
///
/// let choices = vec!["height".to_string(), "hash".to_string(), "hasLike".to_string()];
/// assert_eq!(fuzzy_suggest("has", &choices), vec!["hash", "hasLike"]);
/// ```
pub fn fuzzy_suggest(input: &str, choices: &[String]) -> Vec<String> {
    let input = input.trim();
    if input.is_empty() {
        return choices.to_vec();
    }
    let (prefixed, inner): (Vec<&String>, Vec<&String>) = choices
        .iter()
        .filter(|choice| choice.contains(input))
        .partition(|choice| choice.starts_with(input));
    prefixed.into_iter().chain(inner).cloned().collect()
}
