//! Expression normalizer and safety filter.
//!
//! DESIGN
//! ======
//! Runs on raw learner text before anything reaches the parser. The deny
//! list is a string-level screen only; the real guarantee is that the
//! parser accepts nothing outside a fixed arithmetic grammar.

use std::sync::LazyLock;

use regex::Regex;

/// Keywords that mark text as math even without an operator.
static MATH_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(sin|cos|tan|sqrt|log|ln|exp|abs)\s*\(|(^|[^a-z])pi([^a-z]|$)").unwrap());

/// Code-injection-shaped substrings: import-like keywords, call and lambda
/// markers, brace/bracket/semicolon punctuation, `new X` constructors.
static UNSAFE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(import|exec|eval|compile|open|lambda|def|class|subprocess|system|getattr|setattr|globals|locals|require|function)\b
        | \bnew\s+[a-z_]
        | __
        | =>
        | ::
        | [;{}\[\]`$\\@\#]
        | \.\s*[a-z_]
        ",
    )
    .unwrap()
});

/// Trim, map unicode operators to ASCII, collapse runs of whitespace.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '×' | '·' | '∙' => '*',
            '÷' => '/',
            '−' | '–' => '-',
            other => other,
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// At least one digit, and at least one operator, function keyword or pi.
#[must_use]
pub fn looks_like_math(s: &str) -> bool {
    let has_digit = s.chars().any(|c| c.is_ascii_digit());
    if !has_digit {
        return false;
    }
    s.chars().any(|c| matches!(c, '+' | '-' | '*' | '/' | '^' | '=' | 'π')) || MATH_KEYWORD.is_match(s)
}

#[must_use]
pub fn contains_unsafe_tokens(s: &str) -> bool {
    UNSAFE_TOKEN.is_match(s)
}

/// Replace the `π` glyph with the grammar's `pi` constant.
#[must_use]
pub fn substitute_pi(s: &str) -> String {
    s.replace('π', "pi")
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
