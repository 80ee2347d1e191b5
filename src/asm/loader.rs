//! Program loader.
//!
//! Turns a token program into a memory image:
//! ```text
//! +  -  SAVE  END  7  2.5
//! ```
//! Opcode tokens (`+ - / * SAVE END`) become 4-bit opcodes, number tokens
//! become fixed-point operand words. Cells are laid out in token order from
//! address `0000`; with `k` opcode tokens, the opcode in cell `i` receives
//! operand address `k + i`. Writing every operator first and every number
//! after therefore pairs the n-th operator with the n-th number, and SAVE
//! with the first free cell past the numbers.

use crate::binary::{Address, Word, ADDRESS_SPACE};
use crate::cpu::decode::Opcode;
use crate::cpu::memory::MemoryImage;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A classified program token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    /// 4-bit opcode, completed with an address during layout
    Opcode(Opcode),
    /// 8-bit operand, stored as is
    Operand(Word),
}

/// Classify and encode one token.
pub fn encode_token(token: &str) -> Result<Encoded, LoadError> {
    if let Some(opcode) = Opcode::from_token(token) {
        return Ok(Encoded::Opcode(opcode));
    }

    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let value: f64 = match is_decimal(digits).then(|| digits.parse::<f64>()) {
        Some(Ok(value)) => value,
        _ => return Err(LoadError::InvalidInput { token: token.to_string() }),
    };

    if negative && value > 0.0 {
        return Err(LoadError::NegativeNumber { token: token.to_string() });
    }

    Word::from_value(value)
        .map(Encoded::Operand)
        .map_err(|_| LoadError::Overflow { token: token.to_string() })
}

/// Encode every token, stopping at the first rejection.
pub fn encode_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Encoded>, LoadError> {
    tokens.iter().map(|t| encode_token(t.as_ref())).collect()
}

/// Lay an encoded program out in memory.
///
/// All opcodes must come before all operands, and the program must fit both
/// in sixteen cells and in the 4-bit operand address space.
pub fn layout(program: &[Encoded]) -> Result<MemoryImage, LoadError> {
    if program.len() > ADDRESS_SPACE {
        return Err(LoadError::ProgramTooLarge { cells: program.len() });
    }

    // Pass 1: operand addresses start right after the last opcode.
    let opcode_count = program
        .iter()
        .filter(|e| matches!(e, Encoded::Opcode(_)))
        .count();

    // Pass 2: complete each opcode with its operand address.
    let mut image: MemoryImage = [None; ADDRESS_SPACE];
    for (i, (cell, encoded)) in image.iter_mut().zip(program).enumerate() {
        let word = match *encoded {
            Encoded::Opcode(opcode) if i < opcode_count => {
                let operand = Address::from_index(opcode_count + i)
                    .ok_or(LoadError::ProgramTooLarge { cells: opcode_count + i + 1 })?;
                Word::instruction(opcode.bits(), operand)
            }
            Encoded::Operand(word) if i >= opcode_count => word,
            _ => return Err(LoadError::OutOfOrder { position: i }),
        };
        *cell = Some(word);
    }

    Ok(image)
}

/// Encode and lay out a token program.
pub fn assemble<S: AsRef<str>>(tokens: &[S]) -> Result<MemoryImage, LoadError> {
    let program = encode_tokens(tokens)?;
    layout(&program)
}

/// `digits`, `digits.` or `digits.digits`.
fn is_decimal(s: &str) -> bool {
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    !whole.is_empty() && all_digits(whole) && all_digits(fraction)
}

/// Why a program was refused.
///
/// `Display` is the text the calculator shows; [`LoadError::detail`] says
/// which token or cell caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LoadError {
    #[error("INVALID INPUT")]
    InvalidInput { token: String },

    #[error("NEGATIVE NUMBERS ARE NOT ALLOWED")]
    NegativeNumber { token: String },

    #[error("OVERFLOW")]
    Overflow { token: String },

    #[error("INVALID INPUT")]
    OutOfOrder { position: usize },

    #[error("OUT OF MEMORY")]
    ProgramTooLarge { cells: usize },
}

impl LoadError {
    /// Longer explanation for logs and the CLI.
    pub fn detail(&self) -> String {
        match self {
            LoadError::InvalidInput { token } => format!("unrecognized token {:?}", token),
            LoadError::NegativeNumber { token } => format!("negative number {:?}", token),
            LoadError::Overflow { token } => format!("{:?} does not fit in 8 bits", token),
            LoadError::OutOfOrder { position } => {
                format!("token {} is out of place: operators must precede numbers", position)
            }
            LoadError::ProgramTooLarge { cells } => {
                format!("program needs {} cells, memory has {}", cells, ADDRESS_SPACE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::ArithOp;

    fn cells(image: &MemoryImage) -> Vec<String> {
        image
            .iter()
            .map(|c| c.map_or_else(|| "-".to_string(), |w| w.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_tokens() {
        assert_eq!(encode_token("+"), Ok(Encoded::Opcode(Opcode::Arith(ArithOp::Add))));
        assert_eq!(encode_token("SAVE"), Ok(Encoded::Opcode(Opcode::Save)));
        assert_eq!(
            encode_token("2.5"),
            Ok(Encoded::Operand(Word::parse("000010.1").unwrap()))
        );
        assert_eq!(
            encode_token("2.3"),
            Ok(Encoded::Operand(Word::parse("000010.1").unwrap()))
        );
        assert_eq!(encode_token("-0"), Ok(Encoded::Operand(Word::ZERO)));
        assert_eq!(encode_token("1."), Ok(Encoded::Operand(Word::parse("00000001").unwrap())));
    }

    #[test]
    fn test_encode_rejections() {
        assert_eq!(encode_token("abc"), Err(LoadError::InvalidInput { token: "abc".into() }));
        assert_eq!(encode_token("."), Err(LoadError::InvalidInput { token: ".".into() }));
        assert_eq!(encode_token(".5"), Err(LoadError::InvalidInput { token: ".5".into() }));
        assert_eq!(encode_token("1.2.3"), Err(LoadError::InvalidInput { token: "1.2.3".into() }));
        assert_eq!(encode_token("1e3"), Err(LoadError::InvalidInput { token: "1e3".into() }));
        assert_eq!(encode_token("-5"), Err(LoadError::NegativeNumber { token: "-5".into() }));
        assert_eq!(encode_token("256"), Err(LoadError::Overflow { token: "256".into() }));
        assert_eq!(encode_token("64.5"), Err(LoadError::Overflow { token: "64.5".into() }));
    }

    #[test]
    fn test_display_texts() {
        assert_eq!(LoadError::InvalidInput { token: "x".into() }.to_string(), "INVALID INPUT");
        assert_eq!(
            LoadError::NegativeNumber { token: "-1".into() }.to_string(),
            "NEGATIVE NUMBERS ARE NOT ALLOWED"
        );
        assert_eq!(LoadError::Overflow { token: "999".into() }.to_string(), "OVERFLOW");
    }

    #[test]
    fn test_layout_one_plus_one() {
        let image = assemble(&["+", "+", "SAVE", "END", "1", "1"]).unwrap();
        assert_eq!(
            &cells(&image)[..7],
            &["00000100", "00000101", "01000110", "01010111", "00000001", "00000001", "-"]
        );
    }

    #[test]
    fn test_layout_single_operator() {
        let image = assemble(&["*", "SAVE", "END", "3", "2.5"]).unwrap();
        assert_eq!(
            &cells(&image)[..5],
            &["00110011", "01000100", "01010101", "00000011", "000010.1"]
        );
        assert!(image[5..].iter().all(Option::is_none));
    }

    #[test]
    fn test_layout_rejects_operand_first() {
        assert_eq!(assemble(&["5", "+"]), Err(LoadError::OutOfOrder { position: 0 }));
        assert_eq!(assemble(&["+", "5", "-"]), Err(LoadError::OutOfOrder { position: 1 }));
    }

    #[test]
    fn test_layout_rejects_large_programs() {
        let tokens = vec!["1"; 17];
        assert_eq!(assemble(&tokens), Err(LoadError::ProgramTooLarge { cells: 17 }));

        // nine opcodes push operand addresses past 1111
        let mut tokens = vec!["+"; 9];
        tokens.extend(["1"; 7]);
        assert!(matches!(assemble(&tokens), Err(LoadError::ProgramTooLarge { .. })));
    }

    #[test]
    fn test_rejection_happens_before_layout() {
        assert_eq!(
            assemble(&["+", "SAVE", "END", "abc"]),
            Err(LoadError::InvalidInput { token: "abc".into() })
        );
    }

    #[test]
    fn test_empty_program() {
        let image = assemble::<&str>(&[]).unwrap();
        assert!(image.iter().all(Option::is_none));
    }
}
