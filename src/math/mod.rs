//! Symbolic resolver: deterministic, explainable answers for math input.
//!
//! DESIGN
//! ======
//! `resolve` is a pure function from learner text to an optional worked
//! answer. Every failure (prose, unsafe text, parse error, unsolvable or
//! non-real result) collapses to `None`, which the conversation layer reads
//! as "defer to the model". Nothing here touches the network or disk.
//!
//! Pipeline: normalize → math gate → deny-list gate → `π` substitution →
//! parse into the restricted grammar (`ln` aliases the natural log) →
//! degree-mode rewrite for literal trig arguments → solve or evaluate.

pub mod ast;
pub mod eval;
pub mod filter;
pub mod parse;
pub mod solve;

use std::fmt::Write;

use tracing::debug;

use crate::error::ErrorCode;
use ast::Expr;
use parse::Token;

/// Solve-variable priority. The first one present in the equation wins.
pub const SOLVE_VARIABLES: [&str; 8] = ["x", "y", "z", "t", "n", "a", "b", "c"];

// =============================================================================
// ERROR
// =============================================================================

/// Why the resolver declined. Never leaves this module as an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MathError {
    #[error("input does not look like math")]
    NotMath,
    #[error("input contains unsafe tokens")]
    Unsafe,
    #[error("input longer than {0} tokens")]
    TooLong(usize),
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("malformed number: {0}")]
    BadNumber(String),
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),
    #[error("expected exactly one '=', found {0}")]
    EquationShape(usize),
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("free variable: {0}")]
    FreeVariable(String),
    #[error("result is not a real number")]
    Complex,
    #[error("result is not finite")]
    NonFinite,
    #[error("not a polynomial in the solve variable")]
    NotPolynomial,
    #[error("polynomial degree {0} is not supported")]
    DegreeTooHigh(usize),
    #[error("equation has no unique solution set")]
    Degenerate,
    #[error("empty result")]
    Empty,
}

impl ErrorCode for MathError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotMath | Self::Unsafe | Self::TooLong(_) => "E_INPUT_REJECTED",
            Self::UnexpectedChar(_)
            | Self::BadNumber(_)
            | Self::UnexpectedToken(_)
            | Self::UnexpectedEnd
            | Self::UnknownIdentifier(_)
            | Self::EquationShape(_)
            | Self::TooDeep => "E_PARSE",
            Self::FreeVariable(_) | Self::NotPolynomial | Self::DegreeTooHigh(_) | Self::Degenerate => {
                "E_UNSUPPORTED"
            }
            Self::Complex | Self::NonFinite | Self::Empty => "E_REJECTED_RESULT",
        }
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// A worked deterministic answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub problem: String,
    pub steps: Vec<String>,
    pub answer: String,
}

impl Resolution {
    /// Render the fixed tutor template: problem, numbered steps, answer.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("Problem: {}\n\nSteps:\n", self.problem);
        for (i, step) in self.steps.iter().enumerate() {
            let _ = writeln!(out, "- Step {}: {step}", i + 1);
        }
        let _ = write!(out, "\nAnswer: {}", self.answer);
        out
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Try to answer `user_text` deterministically. `None` means "no match".
#[must_use]
pub fn resolve(user_text: &str) -> Option<Resolution> {
    match try_resolve(user_text) {
        Ok(resolution) => Some(resolution),
        Err(e) => {
            debug!(error = %e, code = e.error_code(), "resolver: no match");
            None
        }
    }
}

fn try_resolve(user_text: &str) -> Result<Resolution, MathError> {
    let canonical = filter::normalize(user_text);
    if !filter::looks_like_math(&canonical) {
        return Err(MathError::NotMath);
    }
    if filter::contains_unsafe_tokens(&canonical) {
        return Err(MathError::Unsafe);
    }
    let canonical = filter::substitute_pi(&canonical);
    let problem = user_text.trim().to_string();

    if canonical.contains('=') {
        solve_equation(&canonical, problem)
    } else {
        evaluate_expression(&canonical, problem)
    }
}

/// Pick the solve variable: the first of [`SOLVE_VARIABLES`] that appears
/// as a whole token, else the first entry.
#[must_use]
pub fn choose_variable(canonical: &str) -> &'static str {
    let names: Vec<String> = parse::tokenize(canonical)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| match t {
            Token::Ident(name) => Some(name),
            _ => None,
        })
        .collect();
    SOLVE_VARIABLES
        .iter()
        .find(|v| names.iter().any(|n| n.as_str() == **v))
        .copied()
        .unwrap_or(SOLVE_VARIABLES[0])
}

fn solve_equation(canonical: &str, problem: String) -> Result<Resolution, MathError> {
    let equation = parse::parse_equation(canonical)?;
    let lhs = equation.lhs.with_degree_literals();
    let rhs = equation.rhs.with_degree_literals();
    let var = choose_variable(canonical);

    let poly = solve::collect(&lhs, var)?.add_scaled(&solve::collect(&rhs, var)?, -1.0);
    if !poly.is_finite() {
        return Err(MathError::NonFinite);
    }
    let roots = solve::real_roots(&poly)?;
    let answer = format!("{var} = {}", solve::render_roots(&roots));

    Ok(Resolution {
        problem,
        steps: vec![
            "Move every term to one side so the equation equals zero.".into(),
            format!("Combine like terms in {var}."),
            format!("Solve for {var}."),
        ],
        answer,
    })
}

fn evaluate_expression(canonical: &str, problem: String) -> Result<Resolution, MathError> {
    let expr = parse::parse_expr(canonical)?.with_degree_literals();
    let answer = match expr.variables().as_slice() {
        [] => numeric_answer(&expr)?,
        [var] => {
            let poly = solve::collect(&expr, var)?;
            if !poly.is_finite() {
                return Err(MathError::NonFinite);
            }
            poly.render(var)
        }
        _ => return Err(MathError::NotPolynomial),
    };
    if answer.trim().is_empty() {
        return Err(MathError::Empty);
    }

    Ok(Resolution {
        problem,
        steps: vec![
            format!("Rewrite the expression in standard form: {canonical}."),
            "Apply the order of operations: parentheses, exponents, multiplication and division, then addition and subtraction.".into(),
            "Simplify to get the final result.".into(),
        ],
        answer,
    })
}

fn numeric_answer(expr: &Expr) -> Result<String, MathError> {
    let value = eval::evaluate(expr)?;
    if !value.is_finite() {
        return Err(MathError::NonFinite);
    }
    Ok(eval::format_number(value))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
