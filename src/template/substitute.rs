//! Text substitution for a single block.

use once_cell::sync::Lazy;
use regex::Regex;

use super::placeholder::PlaceholderTable;

static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}").expect("Invalid regex pattern"));
static DOUBLE_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*[^}]*\s*\}\}").expect("Invalid regex pattern"));
static SINGLE_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*[^}]*\s*\}").expect("Invalid regex pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

/// Substitute `table` into `text`.
///
/// Returns `None` when the block must be left untouched: either it carries
/// no placeholder syntax and no token at all, or the result is identical to
/// the input. Callers only rewrite (and lose formatting on) blocks for which
/// this returns `Some`.
pub fn substitute(text: &str, table: &PlaceholderTable) -> Option<String> {
    if !TEMPLATE_VAR.is_match(text) && !table.matches_any(text) {
        return None;
    }

    let replaced = replace_tokens(text, table);
    let stripped = DOUBLE_BRACE.replace_all(&replaced, "");
    let stripped = SINGLE_BRACE.replace_all(&stripped, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let result = collapsed.trim();

    (result != text).then(|| result.to_string())
}

/// Replace every literal token occurrence in one left-to-right scan.
///
/// Inserted values are never rescanned, so a value that happens to contain
/// another token's syntax is not substituted a second time. Where the text
/// already holds an entry's full value and that value extends its own token
/// (the date label), the value is copied through unchanged.
fn replace_tokens(text: &str, table: &PlaceholderTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while let Some(ch) = rest.chars().next() {
        for (token, value) in table.iter() {
            if token.is_empty() {
                continue;
            }
            if value.starts_with(token) && rest.starts_with(value) {
                out.push_str(value);
                rest = &rest[value.len()..];
                continue 'scan;
            }
            if rest.starts_with(token) {
                out.push_str(value);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}
