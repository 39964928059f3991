//! Placeholder discovery for template authoring feedback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^}]+)\s*\}\}").expect("Invalid regex pattern"));
static EXERCISE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"exercise-\w+").expect("Invalid regex pattern"));

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateVariables {
    /// Distinct names found in `{{ name }}` syntax.
    pub template_variables: Vec<String>,
    /// Distinct `exercise-*` identifiers found anywhere in the text.
    pub exercise_variables: Vec<String>,
    pub content_preview: String,
}

/// Scan the text of every block of a template.
pub fn discover<S: AsRef<str>>(blocks: &[S]) -> TemplateVariables {
    let all_text = blocks
        .iter()
        .map(|b| b.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    let template_variables: BTreeSet<String> = VARIABLE
        .captures_iter(&all_text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let exercise_variables: BTreeSet<String> = EXERCISE_NAME
        .find_iter(&all_text)
        .map(|m| m.as_str().to_string())
        .collect();

    TemplateVariables {
        template_variables: template_variables.into_iter().collect(),
        exercise_variables: exercise_variables.into_iter().collect(),
        content_preview: preview(&all_text),
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
