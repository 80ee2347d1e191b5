//! Fixed-point operand encoding.
//!
//! Operands are non-negative numbers rounded to the nearest 0.5. A rounded
//! value is written as its binary integer part, followed by `.1` when it
//! carries a half, then left-padded with zeros to a full [`Word`]. The binary
//! point takes up one of the eight characters, so the representable values
//! are the integers `0..=255` and the halves `0.5..=63.5`.

use thiserror::Error;
use super::{Word, WORD_WIDTH};

/// Round to the nearest multiple of 0.5, ties toward positive infinity.
pub fn round_half(value: f64) -> f64 {
    (value * 2.0 + 0.5).floor() / 2.0
}

/// Binary text of an already-rounded non-negative value, without padding.
///
/// `2.0` becomes `10`, `2.5` becomes `10.1`, `0.5` becomes `0.1`.
pub fn binary_text(rounded: f64) -> String {
    let whole = rounded.floor();
    let text = format!("{:b}", whole as u64);
    if rounded > whole {
        text + ".1"
    } else {
        text
    }
}

/// Round and encode a value into an operand word.
pub fn encode(value: f64) -> Result<Word, EncodeError> {
    if !value.is_finite() {
        return Err(EncodeError::NotFinite);
    }

    let rounded = round_half(value);
    if rounded < 0.0 {
        return Err(EncodeError::Negative(rounded));
    }

    let text = binary_text(rounded);
    if text.len() > WORD_WIDTH {
        return Err(EncodeError::Overflow(text));
    }

    // Only bits and one point can come out of binary_text.
    Word::pad(&text).map_err(|_| EncodeError::Overflow(text))
}

/// Decode an operand word back to its numeric value.
///
/// Characters before the point are the integer part, characters after it
/// contribute `2^-1`, `2^-2`, ... in order.
pub fn decode(word: &Word) -> f64 {
    let chars = word.chars();
    let point = chars.iter().position(|&c| c == b'.').unwrap_or(chars.len());

    let integer = chars[..point]
        .iter()
        .fold(0.0, |acc, &c| acc * 2.0 + f64::from(c == b'1'));

    let fraction = chars[point..]
        .iter()
        .skip(1)
        .enumerate()
        .filter(|&(_, &c)| c == b'1')
        .map(|(i, _)| 0.5f64.powi(i as i32 + 1))
        .sum::<f64>();

    integer + fraction
}

/// Text shown on the display for a numeric value: `2`, `2.5`.
pub fn format_value(value: f64) -> String {
    value.to_string()
}

impl Word {
    /// Round and encode a value. See [`encode`].
    pub fn from_value(value: f64) -> Result<Self, EncodeError> {
        encode(value)
    }

    /// The numeric value of an operand word. See [`decode`].
    pub fn value(&self) -> f64 {
        decode(self)
    }
}

/// Errors from encoding a value into a word.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("value {0} is negative")]
    Negative(f64),

    #[error("value is not a finite number")]
    NotFinite,

    #[error("encoding {0} does not fit in 8 characters")]
    Overflow(String),
}
