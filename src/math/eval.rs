//! Numeric evaluation over real numbers.

use std::f64::consts::PI;

use super::MathError;
use super::ast::{BinOp, Expr, Func};

/// Decimal places kept when rendering, to hide floating-point noise.
pub const ROUND_DIGITS: i32 = 12;

/// Evaluate a variable-free expression.
///
/// # Errors
///
/// Returns [`MathError::FreeVariable`] if the tree names a variable and
/// [`MathError::Complex`] when a step leaves the real numbers.
pub fn evaluate(expr: &Expr) -> Result<f64, MathError> {
    match expr {
        Expr::Num(value) => Ok(*value),
        Expr::Pi => Ok(PI),
        Expr::Var(name) => Err(MathError::FreeVariable(name.clone())),
        Expr::Neg(inner) => Ok(-evaluate(inner)?),
        Expr::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs)?;
            let b = evaluate(rhs)?;
            apply_binary(*op, a, b)
        }
        Expr::Call(func, arg) => apply_func(*func, evaluate(arg)?),
    }
}

fn apply_binary(op: BinOp, a: f64, b: f64) -> Result<f64, MathError> {
    Ok(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Pow => {
            if a < 0.0 && b.fract() != 0.0 {
                return Err(MathError::Complex);
            }
            a.powf(b)
        }
    })
}

fn apply_func(func: Func, x: f64) -> Result<f64, MathError> {
    Ok(match func {
        Func::Sin => x.sin(),
        Func::Cos => x.cos(),
        Func::Tan => x.tan(),
        Func::SinDeg => x.to_radians().sin(),
        Func::CosDeg => x.to_radians().cos(),
        Func::TanDeg => {
            // tan is undefined at odd multiples of 90 degrees.
            if ((x - 90.0) / 180.0).fract() == 0.0 {
                return Err(MathError::NonFinite);
            }
            x.to_radians().tan()
        }
        Func::Sqrt => {
            if x < 0.0 {
                return Err(MathError::Complex);
            }
            x.sqrt()
        }
        Func::Log | Func::Log10 if x < 0.0 => return Err(MathError::Complex),
        Func::Log => x.ln(),
        Func::Log10 => x.log10(),
        Func::Exp => x.exp(),
        Func::Abs => x.abs(),
    })
}

/// Round to [`ROUND_DIGITS`] decimal places. Values too large to carry
/// that many fractional digits are returned unchanged.
#[must_use]
pub fn round_noise(value: f64) -> f64 {
    if value.abs() >= 1e15 {
        return value;
    }
    let scale = 10f64.powi(ROUND_DIGITS);
    let rounded = (value * scale).round() / scale;
    // Fold negative zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Render a finite number: integers without a fractional part, everything
/// else in the shortest round-tripping decimal form.
#[must_use]
pub fn format_number(value: f64) -> String {
    let value = round_noise(value);
    if value.fract() == 0.0 && value.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        return whole.to_string();
    }
    value.to_string()
}

#[cfg(test)]
#[path = "eval_test.rs"]
mod tests;
