//! Single-variable polynomial collection, simplification and solving.
//!
//! DESIGN
//! ======
//! Both sides of an equation are folded into dense coefficient vectors over
//! one variable, subtracted, and solved in closed form for degree 1 and 2.
//! Subtrees with no variable collapse to constants through the numeric
//! evaluator, so `sin(30) x = 2` still folds. Anything that is not a
//! polynomial in the chosen variable is declined.

use super::MathError;
use super::ast::{BinOp, Expr};
use super::eval::{evaluate, format_number, round_noise};

/// Highest degree collected before giving up.
const MAX_DEGREE: usize = 8;

/// Coefficients below this magnitude are treated as zero.
const EPSILON: f64 = 1e-12;

/// Dense polynomial, lowest degree first.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly(pub Vec<f64>);

impl Poly {
    fn constant(c: f64) -> Self {
        Self(vec![c])
    }

    fn trimmed(mut self) -> Self {
        while self.0.len() > 1 && self.0.last().is_some_and(|c| c.abs() < EPSILON) {
            self.0.pop();
        }
        if self.0.is_empty() {
            self.0.push(0.0);
        }
        self
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    fn as_constant(&self) -> Option<f64> {
        (self.degree() == 0).then(|| self.0[0])
    }

    /// `self + sign * other`.
    #[must_use]
    pub fn add_scaled(&self, other: &Self, sign: f64) -> Self {
        let len = self.0.len().max(other.0.len());
        let coeffs = (0..len)
            .map(|i| self.0.get(i).copied().unwrap_or(0.0) + sign * other.0.get(i).copied().unwrap_or(0.0))
            .collect();
        Self(coeffs).trimmed()
    }

    fn mul(&self, other: &Self) -> Result<Self, MathError> {
        let degree = self.degree() + other.degree();
        if degree > MAX_DEGREE {
            return Err(MathError::DegreeTooHigh(degree));
        }
        let mut coeffs = vec![0.0; degree + 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in other.0.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Ok(Self(coeffs).trimmed())
    }

    fn scale(&self, k: f64) -> Self {
        Self(self.0.iter().map(|c| c * k).collect()).trimmed()
    }

    /// Render highest degree first, e.g. `x^2 - 3*x + 1`.
    #[must_use]
    pub fn render(&self, var: &str) -> String {
        let mut out = String::new();
        for (degree, &coeff) in self.0.iter().enumerate().rev() {
            let coeff = round_noise(coeff);
            if coeff == 0.0 && !(degree == 0 && out.is_empty()) {
                continue;
            }
            let magnitude = coeff.abs();
            let body = match degree {
                0 => format_number(magnitude),
                _ => {
                    let power = if degree == 1 { var.to_string() } else { format!("{var}^{degree}") };
                    if (magnitude - 1.0).abs() < EPSILON { power } else { format!("{}*{power}", format_number(magnitude)) }
                }
            };
            if out.is_empty() {
                if coeff < 0.0 {
                    out.push('-');
                }
            } else {
                out.push_str(if coeff < 0.0 { " - " } else { " + " });
            }
            out.push_str(&body);
        }
        out
    }
}

/// Fold `expr` into a polynomial in `var`.
///
/// # Errors
///
/// Fails on any other free variable, division by a non-constant, a
/// non-integer or negative power of the variable, or a function applied to
/// the variable.
pub fn collect(expr: &Expr, var: &str) -> Result<Poly, MathError> {
    if !expr.variables().iter().any(|v| v == var) {
        return evaluate(expr).map(Poly::constant);
    }
    match expr {
        Expr::Var(name) if name == var => Ok(Poly(vec![0.0, 1.0])),
        Expr::Neg(inner) => Ok(collect(inner, var)?.scale(-1.0)),
        Expr::Binary(BinOp::Add, lhs, rhs) => Ok(collect(lhs, var)?.add_scaled(&collect(rhs, var)?, 1.0)),
        Expr::Binary(BinOp::Sub, lhs, rhs) => Ok(collect(lhs, var)?.add_scaled(&collect(rhs, var)?, -1.0)),
        Expr::Binary(BinOp::Mul, lhs, rhs) => collect(lhs, var)?.mul(&collect(rhs, var)?),
        Expr::Binary(BinOp::Div, lhs, rhs) => {
            let divisor = collect(rhs, var)?
                .as_constant()
                .ok_or(MathError::NotPolynomial)?;
            if divisor == 0.0 {
                return Err(MathError::NonFinite);
            }
            Ok(collect(lhs, var)?.scale(1.0 / divisor))
        }
        Expr::Binary(BinOp::Pow, base, exponent) => {
            let exponent = collect(exponent, var)?
                .as_constant()
                .ok_or(MathError::NotPolynomial)?;
            if exponent < 0.0 || exponent.fract() != 0.0 {
                return Err(MathError::NotPolynomial);
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let exponent = exponent as usize;
            if exponent > MAX_DEGREE {
                return Err(MathError::DegreeTooHigh(exponent));
            }
            let base = collect(base, var)?;
            let mut result = Poly::constant(1.0);
            for _ in 0..exponent {
                result = result.mul(&base)?;
            }
            Ok(result)
        }
        _ => Err(MathError::NotPolynomial),
    }
}

/// Real roots of `poly = 0`, ascending and noise-rounded.
///
/// # Errors
///
/// Declines identities, contradictions, complex roots and degrees above two.
pub fn real_roots(poly: &Poly) -> Result<Vec<f64>, MathError> {
    match poly.degree() {
        0 => Err(MathError::Degenerate),
        1 => Ok(vec![round_noise(-poly.0[0] / poly.0[1])]),
        2 => {
            let (c, b, a) = (poly.0[0], poly.0[1], poly.0[2]);
            let discriminant = round_noise(b * b - 4.0 * a * c);
            if discriminant < 0.0 {
                return Err(MathError::Complex);
            }
            if discriminant == 0.0 {
                return Ok(vec![round_noise(-b / (2.0 * a))]);
            }
            let root = discriminant.sqrt();
            let mut roots = vec![round_noise((-b - root) / (2.0 * a)), round_noise((-b + root) / (2.0 * a))];
            roots.sort_by(f64::total_cmp);
            Ok(roots)
        }
        other => Err(MathError::DegreeTooHigh(other)),
    }
}

/// Render a root set: a single root bare, several as `{a, b}`.
#[must_use]
pub fn render_roots(roots: &[f64]) -> String {
    match roots {
        [single] => format_number(*single),
        many => {
            let parts: Vec<String> = many.iter().map(|r| format_number(*r)).collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "solve_test.rs"]
mod tests;
