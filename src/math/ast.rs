//! AST types for the restricted arithmetic grammar.

/// Functions the grammar admits. Anything else is a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    /// Degree-mode variants, produced only by the literal-argument rewrite.
    SinDeg,
    CosDeg,
    TanDeg,
    Sqrt,
    /// Natural logarithm.
    Log,
    Log10,
    Exp,
    Abs,
}

impl Func {
    /// Look up a function by its source name. `ln` and `log` are both the
    /// natural logarithm; degree-mode variants have no source spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "sqrt" => Self::Sqrt,
            "ln" | "log" => Self::Log,
            "log10" => Self::Log10,
            "exp" => Self::Exp,
            "abs" => Self::Abs,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    /// The constant pi.
    Pi,
    Var(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Rewrite `sin`/`cos`/`tan` calls whose sole argument is a bare numeric
    /// literal into degree mode. Calls over anything else keep radians.
    #[must_use]
    pub fn with_degree_literals(self) -> Self {
        match self {
            Self::Call(func, arg) => {
                let literal = matches!(*arg, Self::Num(_))
                    || matches!(&*arg, Self::Neg(inner) if matches!(**inner, Self::Num(_)));
                let func = match func {
                    Func::Sin if literal => Func::SinDeg,
                    Func::Cos if literal => Func::CosDeg,
                    Func::Tan if literal => Func::TanDeg,
                    other => other,
                };
                Self::Call(func, Box::new((*arg).with_degree_literals()))
            }
            Self::Neg(inner) => Self::Neg(Box::new((*inner).with_degree_literals())),
            Self::Binary(op, lhs, rhs) => {
                Self::Binary(op, Box::new((*lhs).with_degree_literals()), Box::new((*rhs).with_degree_literals()))
            }
            leaf => leaf,
        }
    }

    /// Collect free variable names in first-appearance order.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Self::Num(_) | Self::Pi => {}
            Self::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Neg(inner) | Self::Call(_, inner) => inner.collect_vars(out),
            Self::Binary(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

/// A parsed equation `lhs = rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}
