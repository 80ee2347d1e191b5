//! Binary primitives of the calculator.
//!
//! - [`Address`] - a 4-bit memory address / counter value
//! - [`Word`] - an 8-character memory word (instruction or operand)
//! - [`fixed`] - the rounded fixed-point operand encoding

mod address;
mod word;
pub mod fixed;

pub use address::{Address, ADDRESS_SPACE};
pub use word::{Word, WORD_WIDTH};
pub use fixed::{round_half, EncodeError};

use thiserror::Error;

/// Errors from parsing bit-string text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} characters, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("invalid bit character: {0:?}")]
    InvalidChar(char),
}
