//! Recursive descent parser for the restricted arithmetic grammar.
//!
//! Grammar (juxtaposition is multiplication, so `2x` is `2 * x`):
//!
//! ```text
//! equation := expr '=' expr
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary | unary)*
//! unary    := ('-' | '+') unary | power
//! power    := atom ('^' unary)?
//! atom     := number | 'pi' | letter | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! Anything outside this grammar is rejected, including multi-letter names
//! that are not a known function.

use super::MathError;
use super::ast::{BinOp, Equation, Expr, Func};

/// Deepest nesting accepted before the input is rejected.
const MAX_DEPTH: usize = 64;

/// Longest token stream accepted. Operator chains build one tree level per
/// operand, so this also bounds the depth every recursive pass walks.
pub(crate) const MAX_TOKENS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eq,
}

/// Split canonical text into tokens.
///
/// # Errors
///
/// Returns [`MathError::UnexpectedChar`] for any character outside the
/// grammar and [`MathError::TooLong`] past [`MAX_TOKENS`] tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if tokens.len() == MAX_TOKENS {
            return Err(MathError::TooLong(MAX_TOKENS));
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| MathError::BadNumber(text.clone()))?;
            tokens.push(Token::Num(value));
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Caret
            }
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' => Token::Eq,
            other => return Err(MathError::UnexpectedChar(other)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// Parse a standalone expression. An `=` anywhere is an error.
///
/// # Errors
///
/// Returns a [`MathError`] if the text is outside the grammar.
pub fn parse_expr(input: &str) -> Result<Expr, MathError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0 };
    let expr = parser.expr()?;
    parser.finish()?;
    Ok(expr)
}

/// Parse `lhs = rhs`. Exactly one `=` is accepted.
///
/// # Errors
///
/// Returns a [`MathError`] if either side is outside the grammar or the
/// `=` count is not one.
pub fn parse_equation(input: &str) -> Result<Equation, MathError> {
    let tokens = tokenize(input)?;
    let eq_count = tokens.iter().filter(|t| **t == Token::Eq).count();
    if eq_count != 1 {
        return Err(MathError::EquationShape(eq_count));
    }
    let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0 };
    let lhs = parser.expr()?;
    parser.expect(&Token::Eq)?;
    let rhs = parser.expr()?;
    parser.finish()?;
    Ok(Equation { lhs, rhs })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, want: &Token) -> Result<(), MathError> {
        match self.next() {
            Some(t) if t == want => Ok(()),
            Some(t) => Err(MathError::UnexpectedToken(format!("{t:?}"))),
            None => Err(MathError::UnexpectedEnd),
        }
    }

    fn finish(&self) -> Result<(), MathError> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(MathError::UnexpectedToken(format!("{t:?}"))),
        }
    }

    fn enter(&mut self) -> Result<(), MathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, MathError> {
        self.enter()?;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= 1;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    BinOp::Mul
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    BinOp::Div
                }
                // Juxtaposition: `2x`, `3(x + 1)`, `(a)(b)`.
                Some(Token::Num(_) | Token::Ident(_) | Token::LParen) => BinOp::Mul,
                _ => break,
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, MathError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary();
                self.depth -= 1;
                inner
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, MathError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.pos += 1;
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, MathError> {
        let Some(token) = self.next().cloned() else {
            return Err(MathError::UnexpectedEnd);
        };
        match token {
            Token::Num(value) => Ok(Expr::Num(value)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.identifier(&name),
            other => Err(MathError::UnexpectedToken(format!("{other:?}"))),
        }
    }

    fn identifier(&mut self, name: &str) -> Result<Expr, MathError> {
        if let Some(func) = Func::from_name(&name.to_ascii_lowercase()) {
            self.expect(&Token::LParen)?;
            let arg = self.expr()?;
            self.expect(&Token::RParen)?;
            return Ok(Expr::Call(func, Box::new(arg)));
        }
        if name.eq_ignore_ascii_case("pi") {
            return Ok(Expr::Pi);
        }
        if name.len() == 1 {
            return Ok(Expr::Var(name.to_string()));
        }
        Err(MathError::UnknownIdentifier(name.to_string()))
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
