//! Lexer for infix arithmetic formula expressions.
//!
//! Produces a finite, single-pass sequence of raw tokens from an input
//! string. Whitespace runs are dropped rather than emitted; any character
//! that doesn't belong to a recognized token class becomes [`Token::Unknown`]
//! so that the parser (not the lexer) is the single place that reports
//! `FormulaFormat` errors.
//!
//! Hand-rolled over `char`s rather than built on the `regex` crate - the
//! token classes are fixed and small, so a direct scan is both simpler and
//! avoids pulling in a regex engine for three character classes, the same
//! tradeoff `sheet::eval::parser::expr` makes for its own tokenizer.

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    /// An identifier matching `[A-Za-z_][A-Za-z0-9_]*`, in its original
    /// (un-normalized) spelling.
    Var(String),
    /// The raw text of a number literal, exactly as it appeared in the
    /// source (e.g. `"2.000"`, `"6.6e-3"`).
    Num(String),
    /// A character that didn't match any recognized token class.
    Unknown(char),
}

/// Tokenize `input`, dropping whitespace. This is eager rather than a lazy
/// iterator type because formula construction needs to look at the whole
/// token stream more than once (syntax validation, then canonical
/// rendering); a `Vec<Token>` keeps both passes simple.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.peek().copied() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        match ch {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            },
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            },
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            },
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            },
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            },
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            },
            c if c.is_ascii_digit() || c == '.' => {
                tokens.push(lex_number(&mut chars));
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                tokens.push(lex_variable(&mut chars));
            },
            other => {
                tokens.push(Token::Unknown(other));
                chars.next();
            },
        }
    }

    tokens
}

/// Lex `(\d+\.\d* | \d*\.\d+ | \d+)([eE][+-]?\d+)?`.
///
/// The leading character has already been confirmed to be a digit or `.`
/// by the caller; this just greedily consumes the rest of the pattern.
fn lex_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Token {
    let mut buf = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            buf.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if let Some(&'.') = chars.peek() {
        buf.push('.');
        chars.next();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                buf.push(c);
                chars.next();
            } else {
                break;
            }
        }
    }

    if let Some(&e @ ('e' | 'E')) = chars.peek() {
        // Only consume the exponent marker if it's actually followed by a
        // (possibly signed) digit sequence; otherwise leave it for the
        // next token (e.g. a variable named `e2`).
        let mut lookahead = chars.clone();
        lookahead.next();
        let mut sign_len = 0;
        if matches!(lookahead.peek(), Some('+') | Some('-')) {
            sign_len = 1;
            lookahead.next();
        }
        if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
            buf.push(e);
            chars.next();
            if sign_len == 1 {
                buf.push(*chars.peek().unwrap());
                chars.next();
            }
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    buf.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }

    Token::Num(buf)
}

/// Lex `[A-Za-z_][A-Za-z0-9_]*`.
fn lex_variable(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Token {
    let mut buf = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            buf.push(c);
            chars.next();
        } else {
            break;
        }
    }
    Token::Var(buf)
}
