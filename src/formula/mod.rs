//! Infix arithmetic formulas: parsing, canonicalization, and evaluation.
//!
//! A [`Formula`] is constructed once from source text and a cell-naming
//! policy, and is immutable afterwards - evaluation takes only a variable
//! lookup and never mutates or re-validates the formula itself.

pub mod token;

use std::fmt;
use std::hash::{Hash, Hasher};

use token::Token;

use crate::error::{Error, Result};

/// An immutable, validated, normalized infix arithmetic expression.
///
/// Two formulas are equal iff their canonical text is byte-equal; this is
/// also what `Display`, `Hash`, and `Eq` are derived from, per the
/// requirement that a formula round-trips through its own string form.
#[derive(Debug, Clone)]
pub struct Formula {
    canonical: String,
    variables: Vec<String>,
}

/// The outcome of a failed evaluation: division by zero, or a reference to
/// a variable the lookup function could not resolve.
///
/// This is a plain value, not a `std::error::Error` thrown partway through
/// evaluation - [`Formula::evaluate`] always returns, and a `FormulaError`
/// is just the "not a number" branch of that return value. Callers store it
/// directly as a cell's value and let it propagate through dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaError(pub String);

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for FormulaError {}

impl Formula {
    /// Parse, validate, and canonicalize `source` against a cell-naming
    /// policy. `normalize` maps a raw variable spelling to its canonical
    /// form; `is_valid` decides whether an already-normalized name is
    /// acceptable beyond the base `[A-Za-z_][A-Za-z0-9_]*` regex.
    pub fn new(source: &str, normalize: &dyn Fn(&str) -> String, is_valid: &dyn Fn(&str) -> bool) -> Result<Formula> {
        let tokens = token::tokenize(source);
        if tokens.is_empty() {
            return Err(Error::FormulaFormat("formula is empty".to_string()));
        }

        let mut canonical = String::new();
        let mut variables = Vec::new();
        let mut paren_depth: i32 = 0;
        // Whether the next token is expected to start an operand (number,
        // variable, or open paren) rather than continue one (operator or
        // close paren). Also the sole invariant checked at end-of-input.
        let mut expect_operand = true;

        for tok in &tokens {
            match tok {
                Token::Num(text) => {
                    if !expect_operand {
                        return Err(Error::FormulaFormat(format!("unexpected number '{text}'")));
                    }
                    canonical.push_str(&render_number(text)?);
                    expect_operand = false;
                },
                Token::Var(raw) => {
                    if !expect_operand {
                        return Err(Error::FormulaFormat(format!("unexpected variable '{raw}'")));
                    }
                    let normalized = normalize(raw);
                    if !crate::name::is_well_formed(&normalized) || !is_valid(&normalized) {
                        return Err(Error::FormulaFormat(format!("invalid variable '{raw}'")));
                    }
                    canonical.push_str(&normalized);
                    if !variables.contains(&normalized) {
                        variables.push(normalized);
                    }
                    expect_operand = false;
                },
                Token::LParen => {
                    if !expect_operand {
                        return Err(Error::FormulaFormat("unexpected '('".to_string()));
                    }
                    paren_depth += 1;
                    canonical.push('(');
                    // expect_operand stays true: '(' must be followed by an operand.
                },
                Token::RParen => {
                    if expect_operand {
                        return Err(Error::FormulaFormat("unexpected ')'".to_string()));
                    }
                    paren_depth -= 1;
                    if paren_depth < 0 {
                        return Err(Error::FormulaFormat("unmatched ')'".to_string()));
                    }
                    canonical.push(')');
                    // expect_operand stays false: ')' is itself operand-like.
                },
                Token::Plus | Token::Minus | Token::Star | Token::Slash => {
                    if expect_operand {
                        return Err(Error::FormulaFormat("unexpected operator".to_string()));
                    }
                    canonical.push(operator_char(tok));
                    expect_operand = true;
                },
                Token::Unknown(c) => {
                    return Err(Error::FormulaFormat(format!("unrecognized character '{c}'")));
                },
            }
        }

        if expect_operand {
            return Err(Error::FormulaFormat("formula ends mid-expression".to_string()));
        }
        if paren_depth != 0 {
            return Err(Error::FormulaFormat("unbalanced parentheses".to_string()));
        }

        Ok(Formula { canonical, variables })
    }

    /// The canonical, whitespace-free textual form. This is what `Display`
    /// prints and what equality/hashing compare.
    pub fn canonical_text(&self) -> &str {
        &self.canonical
    }

    /// Distinct variable names referenced by this formula, in
    /// first-occurrence order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate against `lookup`, which resolves a normalized variable name
    /// to its current numeric value, or `None` if undefined or non-numeric.
    ///
    /// Re-tokenizes the canonical text rather than keeping the original
    /// token vector around: the canonical form is already whitespace-free
    /// and variable-normalized, so lexing it is cheap and lets `Formula`
    /// avoid storing two parallel representations of the same expression.
    pub fn evaluate(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> std::result::Result<f64, FormulaError> {
        let tokens = token::tokenize(&self.canonical);

        let mut operands: Vec<f64> = Vec::new();
        let mut operators: Vec<char> = Vec::new();

        for tok in &tokens {
            match tok {
                Token::Num(text) | Token::Var(text) => {
                    let value = match tok {
                        Token::Num(_) => fast_float2::parse::<f64, _>(text.as_str())
                            .map_err(|_| FormulaError(format!("malformed number literal '{text}'")))?,
                        Token::Var(_) => lookup(text)
                            .ok_or_else(|| FormulaError(format!("undefined variable '{text}'")))?,
                        _ => unreachable!(),
                    };
                    if matches!(operators.last(), Some('*') | Some('/')) {
                        let op = operators.pop().expect("checked non-empty above");
                        let l = operands.pop().expect("canonical formula is well-formed");
                        operands.push(apply(l, op, value)?);
                    } else {
                        operands.push(value);
                    }
                },
                Token::Plus | Token::Minus => {
                    if matches!(operators.last(), Some('+') | Some('-')) {
                        reduce(&mut operands, &mut operators)?;
                    }
                    operators.push(operator_char(tok));
                },
                Token::Star | Token::Slash | Token::LParen => {
                    operators.push(operator_char(tok));
                },
                Token::RParen => {
                    if matches!(operators.last(), Some('+') | Some('-')) {
                        reduce(&mut operands, &mut operators)?;
                    }
                    operators.pop(); // discard the matching '('
                    if matches!(operators.last(), Some('*') | Some('/')) {
                        reduce(&mut operands, &mut operators)?;
                    }
                },
                Token::Unknown(_) => unreachable!("canonical text is already validated"),
            }
        }

        if !operators.is_empty() {
            reduce(&mut operands, &mut operators)?;
        }

        Ok(operands.pop().expect("canonical formula yields exactly one result"))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

fn operator_char(tok: &Token) -> char {
    match tok {
        Token::Plus => '+',
        Token::Minus => '-',
        Token::Star => '*',
        Token::Slash => '/',
        Token::LParen => '(',
        _ => unreachable!("operator_char called on a non-operator token"),
    }
}

/// Pop one operator and its two operands, apply it, and push the result.
/// Used both for `+`/`-` reductions and for the `*`/`/` reduction that
/// follows a closing parenthesis.
fn reduce(operands: &mut Vec<f64>, operators: &mut Vec<char>) -> std::result::Result<(), FormulaError> {
    let op = operators.pop().expect("reduce called with a non-empty operator stack");
    let r = operands.pop().expect("canonical formula is well-formed");
    let l = operands.pop().expect("canonical formula is well-formed");
    operands.push(apply(l, op, r)?);
    Ok(())
}

fn apply(l: f64, op: char, r: f64) -> std::result::Result<f64, FormulaError> {
    match op {
        '+' => Ok(l + r),
        '-' => Ok(l - r),
        '*' => Ok(l * r),
        '/' => {
            if r == 0.0 {
                Err(FormulaError("division by zero".to_string()))
            } else {
                Ok(l / r)
            }
        },
        _ => unreachable!("apply called with a non-arithmetic operator"),
    }
}

/// Re-render a number literal's raw text through a parse/format round trip
/// so that `2.0` and `2.000` collapse to the same canonical spelling.
fn render_number(raw: &str) -> Result<String> {
    let value: f64 = fast_float2::parse(raw).map_err(|_| Error::FormulaFormat(format!("malformed number '{raw}'")))?;
    let mut buffer = ryu::Buffer::new();
    Ok(buffer.format(value).to_string())
}

#[cfg(test)]
mod tests;