//! Instruction decoder.
//!
//! An instruction word is a 4-bit opcode followed by a 4-bit operand address.
//! Six opcodes exist; every other bit pattern is invalid.

use crate::binary::{Address, Word};
use crate::cpu::memory::MemoryFault;
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// The four arithmetic operations of the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Subtract,
    Divide,
    Multiply,
}

impl ArithOp {
    /// Every arithmetic operation, in opcode order.
    pub const ALL: [ArithOp; 4] = [ArithOp::Add, ArithOp::Subtract, ArithOp::Divide, ArithOp::Multiply];

    /// Operator character used in expressions.
    pub const fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Subtract => '-',
            ArithOp::Divide => '/',
            ArithOp::Multiply => '*',
        }
    }

    /// Operation for an operator character.
    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == c)
    }
}

/// A 4-bit opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// `0000`..`0011`
    Arith(ArithOp),
    /// `0100`: store the accumulator
    Save,
    /// `0101`: stop
    End,
}

impl Opcode {
    /// The opcode's bit pattern.
    pub const fn bits(self) -> [u8; 4] {
        match self {
            Opcode::Arith(ArithOp::Add) => *b"0000",
            Opcode::Arith(ArithOp::Subtract) => *b"0001",
            Opcode::Arith(ArithOp::Divide) => *b"0010",
            Opcode::Arith(ArithOp::Multiply) => *b"0011",
            Opcode::Save => *b"0100",
            Opcode::End => *b"0101",
        }
    }

    /// Decode a bit pattern, `None` for the ten unused patterns.
    pub fn from_bits(bits: [u8; 4]) -> Option<Self> {
        match &bits {
            b"0000" => Some(Opcode::Arith(ArithOp::Add)),
            b"0001" => Some(Opcode::Arith(ArithOp::Subtract)),
            b"0010" => Some(Opcode::Arith(ArithOp::Divide)),
            b"0011" => Some(Opcode::Arith(ArithOp::Multiply)),
            b"0100" => Some(Opcode::Save),
            b"0101" => Some(Opcode::End),
            _ => None,
        }
    }

    /// The opcode in the upper half of a word.
    pub fn of_word(word: &Word) -> Option<Self> {
        Self::from_bits(word.high())
    }

    /// Symbol shown on the decoder panel: `+ - / * SAVE END`.
    pub fn symbol(self) -> &'static str {
        match self {
            Opcode::Arith(ArithOp::Add) => "+",
            Opcode::Arith(ArithOp::Subtract) => "-",
            Opcode::Arith(ArithOp::Divide) => "/",
            Opcode::Arith(ArithOp::Multiply) => "*",
            Opcode::Save => "SAVE",
            Opcode::End => "END",
        }
    }

    /// Opcode for a program token (`+`, `SAVE`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "SAVE" => Some(Opcode::Save),
            "END" => Some(Opcode::End),
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => ArithOp::from_symbol(c).map(Opcode::Arith),
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A decoded instruction, carrying exactly what each operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// AC := AC op [operand]
    Arith { op: ArithOp, operand: Address },
    /// [target] := AC, then stop
    Save { target: Address },
    /// AC := 0, then stop
    End,
}

impl Instruction {
    /// Decode an instruction word.
    pub fn decode(word: Word) -> Result<Self, DecodeError> {
        let opcode = Opcode::of_word(&word).ok_or(DecodeError::InvalidOpcode(word))?;
        let address = || {
            word.address_field()
                .map_err(|_| DecodeError::Memory(MemoryFault::BadAddress(word)))
        };

        Ok(match opcode {
            Opcode::Arith(op) => Instruction::Arith { op, operand: address()? },
            Opcode::Save => Instruction::Save { target: address()? },
            Opcode::End => Instruction::End,
        })
    }

    /// Encode back to a word. `End` carries a zero address field.
    pub fn encode(&self) -> Word {
        match *self {
            Instruction::Arith { op, operand } => Word::instruction(Opcode::Arith(op).bits(), operand),
            Instruction::Save { target } => Word::instruction(Opcode::Save.bits(), target),
            Instruction::End => Word::instruction(Opcode::End.bits(), Address::ZERO),
        }
    }
}

/// Errors that can occur while decoding an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode in {0}")]
    InvalidOpcode(Word),

    #[error(transparent)]
    Memory(#[from] MemoryFault),
}
