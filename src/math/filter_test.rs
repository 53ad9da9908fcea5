use super::*;

// =============================================================================
// normalize
// =============================================================================

#[test]
fn normalize_maps_unicode_operators() {
    assert_eq!(normalize("2 × 3 ÷ 1"), "2 * 3 / 1");
}

#[test]
fn normalize_maps_unicode_minus() {
    assert_eq!(normalize("7 − 2"), "7 - 2");
}

#[test]
fn normalize_trims_and_collapses_whitespace() {
    assert_eq!(normalize("   2 +\t\t 3 \n = x  "), "2 + 3 = x");
}

#[test]
fn normalize_empty_stays_empty() {
    assert_eq!(normalize("   "), "");
}

// =============================================================================
// looks_like_math
// =============================================================================

#[test]
fn looks_like_math_digit_and_operator() {
    assert!(looks_like_math("2 + 2"));
    assert!(looks_like_math("2x = 10"));
    assert!(looks_like_math("3^2"));
}

#[test]
fn looks_like_math_function_keyword() {
    assert!(looks_like_math("sin(30)"));
    assert!(looks_like_math("2sqrt(16)"));
}

#[test]
fn looks_like_math_pi() {
    assert!(looks_like_math("2π"));
    assert!(looks_like_math("2 pi"));
}

#[test]
fn looks_like_math_requires_digit() {
    assert!(!looks_like_math("sin(x)"));
    assert!(!looks_like_math("what is a + b"));
}

#[test]
fn looks_like_math_rejects_prose_with_numbers() {
    assert!(!looks_like_math("I have 3 cats"));
    assert!(!looks_like_math("chapter 12 pizza party"));
}

// =============================================================================
// contains_unsafe_tokens
// =============================================================================

#[test]
fn unsafe_semicolon() {
    assert!(contains_unsafe_tokens("2+2; DROP"));
}

#[test]
fn unsafe_import_keywords() {
    assert!(contains_unsafe_tokens("import os"));
    assert!(contains_unsafe_tokens("eval(1+1)"));
    assert!(contains_unsafe_tokens("lambda x: x"));
}

#[test]
fn unsafe_dunder_and_attribute_access() {
    assert!(contains_unsafe_tokens("__class__"));
    assert!(contains_unsafe_tokens("os.system(1)"));
}

#[test]
fn unsafe_brackets_and_braces() {
    assert!(contains_unsafe_tokens("[1, 2]"));
    assert!(contains_unsafe_tokens("{1}"));
}

#[test]
fn unsafe_constructor() {
    assert!(contains_unsafe_tokens("new Function(2)"));
}

#[test]
fn safe_math_passes() {
    assert!(!contains_unsafe_tokens("2x + 4 = 10"));
    assert!(!contains_unsafe_tokens("sin(30) * 2.5"));
    assert!(!contains_unsafe_tokens("sqrt(16) / (3 - 1)"));
}

// =============================================================================
// substitute_pi
// =============================================================================

#[test]
fn substitute_pi_replaces_glyph() {
    assert_eq!(substitute_pi("2π + π"), "2pi + pi");
}
