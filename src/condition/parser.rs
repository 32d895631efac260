//! Condition line parser
//!
//! Parses lines like:
//! - `width > 5.0 in`
//! - `4.0 in < height > 50.0 in`
//! - `weight >= 10`
//!
//! Every non-blank line is one condition.

use super::ast::{Bound, CompareOp, Condition, ConditionSet};
use crate::error::{QueueError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(CompareOp),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Op(op) => write!(f, "{}", op),
        }
    }
}

/// Parse condition text into a set of conditions
pub fn parse(input: &str) -> Result<ConditionSet> {
    let mut conditions = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let tokens = tokenize(line).map_err(|msg| QueueError::syntax(idx + 1, msg))?;
        let condition =
            parse_condition(&tokens).map_err(|msg| QueueError::syntax(idx + 1, msg))?;
        conditions.push(condition);
    }
    Ok(conditions)
}

/// Parse several condition strings as one set, in order
pub fn parse_all<S: AsRef<str>>(lines: &[S]) -> Result<ConditionSet> {
    let joined = lines
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    parse(&joined)
}

fn tokenize(line: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if starts_number(&chars, i) {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            i += exponent_len(&chars, i);
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| format!("invalid numeric literal '{}'", text))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if is_op_char(c) {
            let start = i;
            while i < chars.len() && is_op_char(chars[i]) {
                i += 1;
            }
            let symbol: String = chars[start..i].iter().collect();
            let op = CompareOp::from_symbol(&symbol)
                .ok_or_else(|| format!("unknown comparator '{}'", symbol))?;
            tokens.push(Token::Op(op));
        } else {
            return Err(format!("unexpected character '{}'", c));
        }
    }

    Ok(tokens)
}

fn starts_number(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    let next_is_digit = chars
        .get(i + 1)
        .is_some_and(|n| n.is_ascii_digit() || *n == '.');
    c.is_ascii_digit() || (c == '.' && next_is_digit) || ((c == '-' || c == '+') && next_is_digit)
}

/// Length of an `[eE][+-]?digits` exponent at `i`, or 0 when there is none.
/// A bare `e` not followed by digits is left for a unit like `em`.
fn exponent_len(chars: &[char], i: usize) -> usize {
    if !matches!(chars.get(i), Some('e' | 'E')) {
        return 0;
    }
    let sign = usize::from(matches!(chars.get(i + 1), Some('+' | '-')));
    let digits = chars[i + 1 + sign..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

fn is_op_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

fn parse_condition(tokens: &[Token]) -> std::result::Result<Condition, String> {
    let mut iter = tokens.iter().peekable();

    // [literal [unit] comparator]
    let left = match iter.peek() {
        Some(Token::Number(value)) => {
            let value = *value;
            iter.next();
            let unit = match iter.peek() {
                Some(Token::Ident(unit)) => {
                    let unit = unit.clone();
                    iter.next();
                    Some(unit)
                }
                _ => None,
            };
            let op = match iter.next() {
                Some(Token::Op(op)) => *op,
                Some(other) => return Err(format!("expected comparator, found '{}'", other)),
                None => return Err("unterminated clause: expected comparator".to_string()),
            };
            Some(Bound { op, value, unit })
        }
        _ => None,
    };

    let field = match iter.next() {
        Some(Token::Ident(name)) => name.clone(),
        Some(other) => return Err(format!("missing field name, found '{}'", other)),
        None => return Err("missing field name".to_string()),
    };

    // [comparator literal [unit]]
    let right = match iter.next() {
        Some(Token::Op(op)) => {
            let op = *op;
            let value = match iter.next() {
                Some(Token::Number(value)) => *value,
                Some(other) => {
                    return Err(format!(
                        "expected numeric literal after '{}', found '{}'",
                        op, other
                    ))
                }
                None => {
                    return Err(format!(
                        "unterminated clause: expected numeric literal after '{}'",
                        op
                    ))
                }
            };
            let unit = match iter.peek() {
                Some(Token::Ident(unit)) => {
                    let unit = unit.clone();
                    iter.next();
                    Some(unit)
                }
                _ => None,
            };
            Some(Bound { op, value, unit })
        }
        Some(other) => return Err(format!("expected comparator, found '{}'", other)),
        None => None,
    };

    if let Some(extra) = iter.next() {
        return Err(format!("unexpected '{}' after condition", extra));
    }

    Ok(Condition { field, left, right })
}
