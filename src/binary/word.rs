//! Eight-character memory words.
//!
//! A word is what one memory cell or one 8-bit register holds. It is either
//! an instruction (4-bit opcode followed by a 4-bit address) or an operand in
//! the fixed-point text encoding of [`super::fixed`], where the binary point
//! occupies one of the eight characters.

use std::fmt::{self, Write};
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use super::{Address, ParseError};

/// Number of characters in a word.
pub const WORD_WIDTH: usize = 8;

/// An 8-character bit string over `0`, `1` and at most one `.`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Word {
    /// ASCII characters, most significant first
    chars: [u8; WORD_WIDTH],
}

impl Word {
    /// The all-zero word `00000000`.
    pub const ZERO: Word = Word { chars: [b'0'; WORD_WIDTH] };

    /// Build a word from an upper and a lower nibble of ASCII bits.
    pub fn from_halves(high: [u8; 4], low: [u8; 4]) -> Self {
        let mut chars = [b'0'; WORD_WIDTH];
        chars[..4].copy_from_slice(&high);
        chars[4..].copy_from_slice(&low);
        Self { chars }
    }

    /// Build an instruction word from an opcode nibble and an operand address.
    pub fn instruction(opcode: [u8; 4], address: Address) -> Self {
        Self::from_halves(opcode, address.bits())
    }

    /// Left-pad `text` with zeros to a full word.
    ///
    /// Fails if the text is longer than a word or contains anything other
    /// than bits and a single binary point.
    pub fn pad(text: &str) -> Result<Self, ParseError> {
        let bytes = text.as_bytes();
        if bytes.is_empty() || bytes.len() > WORD_WIDTH {
            return Err(ParseError::WrongLength { expected: WORD_WIDTH, got: bytes.len() });
        }

        let mut chars = [b'0'; WORD_WIDTH];
        let mut points = 0;
        for (slot, &b) in chars[WORD_WIDTH - bytes.len()..].iter_mut().zip(bytes) {
            match b {
                b'0' | b'1' => {}
                b'.' if points == 0 => points += 1,
                other => return Err(ParseError::InvalidChar(char::from(other))),
            }
            *slot = b;
        }
        Ok(Self { chars })
    }

    /// Parse exactly eight characters.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if s.len() != WORD_WIDTH {
            return Err(ParseError::WrongLength { expected: WORD_WIDTH, got: s.len() });
        }
        Self::pad(s)
    }

    /// The upper four characters (the opcode field of an instruction).
    pub fn high(&self) -> [u8; 4] {
        [self.chars[0], self.chars[1], self.chars[2], self.chars[3]]
    }

    /// The lower four characters (the address field of an instruction).
    pub fn low(&self) -> [u8; 4] {
        [self.chars[4], self.chars[5], self.chars[6], self.chars[7]]
    }

    /// Interpret the lower half as an operand address.
    ///
    /// Operand words that carry a binary point have no valid address field.
    pub fn address_field(&self) -> Result<Address, ParseError> {
        Address::from_bits(&self.low())
    }

    /// Check if every character is `0`.
    pub fn is_zero(&self) -> bool {
        self.chars == Self::ZERO.chars
    }

    /// The raw characters.
    pub fn chars(&self) -> &[u8; WORD_WIDTH] {
        &self.chars
    }
}

impl Default for Word {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.chars {
            f.write_char(char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self)
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Word::parse(&text).map_err(serde::de::Error::custom)
    }
}
