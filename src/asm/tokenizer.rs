//! Expression tokenizer.
//!
//! Reads free-form arithmetic such as `3 * 2.5` and produces a loader
//! program: every operator, then `SAVE` and `END`, then every number.
//! Numbers are runs of digits with an optional `.digits` tail; operators are
//! every `+ - * /` character. Anything else is skipped.

use crate::cpu::decode::ArithOp;
use serde::{Serialize, Deserialize};

/// Operators and numbers found in an expression, each in scan order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expression {
    pub operators: Vec<ArithOp>,
    pub numbers: Vec<String>,
}

impl Expression {
    /// Scan text for numbers and operators.
    pub fn scan(text: &str) -> Self {
        let mut expr = Self::default();
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            if b.is_ascii_digit() {
                let start = i;
                i = skip_digits(bytes, i);
                // Only take the point when digits follow it.
                if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    i = skip_digits(bytes, i + 1);
                }
                expr.numbers.push(text[start..i].to_string());
                continue;
            }
            if let Some(op) = ArithOp::from_symbol(char::from(b)) {
                expr.operators.push(op);
            }
            i += 1;
        }

        expr
    }

    /// Apply the implicit leading `+`: unless the expression opens with `-`
    /// and has one operator per number, the first number is added to zero.
    pub fn with_implicit_add(mut self) -> Self {
        let leading_minus = self.operators.first() == Some(&ArithOp::Subtract);
        if !leading_minus || self.operators.len() != self.numbers.len() {
            self.operators.insert(0, ArithOp::Add);
        }
        self
    }

    /// The loader program: operators, `SAVE`, `END`, numbers.
    pub fn into_tokens(self) -> Vec<String> {
        self.operators
            .iter()
            .map(|op| op.symbol().to_string())
            .chain(["SAVE".to_string(), "END".to_string()])
            .chain(self.numbers)
            .collect()
    }
}

/// Tokenize an expression into a loader program.
pub fn tokenize(text: &str) -> Vec<String> {
    Expression::scan(text).with_implicit_add().into_tokens()
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_one_plus_one() {
        assert_eq!(tokenize("1+1"), vec!["+", "+", "SAVE", "END", "1", "1"]);
    }

    #[test]
    fn test_leading_minus_has_no_implicit_add() {
        let expr = Expression::scan("-5+3").with_implicit_add();
        assert_eq!(expr.operators, vec![ArithOp::Subtract, ArithOp::Add]);
        assert_eq!(expr.numbers, vec!["5", "3"]);
        assert_eq!(tokenize("-5+3"), vec!["-", "+", "SAVE", "END", "5", "3"]);
    }

    #[test]
    fn test_leading_minus_with_count_mismatch_gets_add() {
        assert_eq!(tokenize("-5"), vec!["-", "SAVE", "END", "5"]);
        assert_eq!(tokenize("-5-"), vec!["+", "-", "-", "SAVE", "END", "5"]);
    }

    #[test]
    fn test_decimals_and_spaces() {
        assert_eq!(tokenize(" 3 * 2.5 "), vec!["+", "*", "SAVE", "END", "3", "2.5"]);
    }

    #[test]
    fn test_point_without_digits_is_not_part_of_number() {
        let expr = Expression::scan("1. + .5");
        assert_eq!(expr.numbers, vec!["1", "5"]);
        assert_eq!(Expression::scan("1.2.3").numbers, vec!["1.2", "3"]);
    }

    #[test]
    fn test_letters_are_skipped() {
        assert_eq!(tokenize("4/0 please"), vec!["+", "/", "SAVE", "END", "4", "0"]);
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(tokenize(""), vec!["+", "SAVE", "END"]);
    }

    #[test]
    fn test_operator_order_is_kept() {
        let expr = Expression::scan("8 / 2 * 3 - 1");
        assert_eq!(
            expr.operators,
            vec![ArithOp::Divide, ArithOp::Multiply, ArithOp::Subtract]
        );
        assert_eq!(expr.numbers, vec!["8", "2", "3", "1"]);
    }
}
