//! Arithmetic unit.
//!
//! Holds the accumulator and performs the four operations on fixed-point
//! operand words. Every operation decodes both sides, computes in `f64`,
//! rounds to the nearest 0.5 and re-encodes. A result that cannot be encoded
//! leaves the accumulator untouched.

use crate::binary::{fixed, Address, EncodeError, Word};
use crate::cpu::decode::ArithOp;
use crate::cpu::memory::Memory;
use crate::cpu::register::WordRegister;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Why an arithmetic operation was refused.
///
/// `Display` is the text the calculator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ArithError {
    #[error("OVERFLOW")]
    Overflow,

    #[error("UNDERFLOW")]
    Underflow,

    #[error("UNDEFINED")]
    DivideByZero,
}

/// The arithmetic logic unit and its accumulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alu {
    ac: WordRegister,
}

impl Alu {
    /// Create an ALU with a zeroed accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current accumulator word.
    pub fn accumulator(&self) -> Word {
        self.ac.read()
    }

    /// Numeric value of the accumulator.
    pub fn value(&self) -> f64 {
        self.ac.read().value()
    }

    /// Apply one arithmetic operation against `operand`.
    ///
    /// Returns the new accumulator on success.
    pub fn apply(&mut self, op: ArithOp, operand: Word) -> Result<Word, ArithError> {
        match op {
            ArithOp::Add => self.add(operand),
            ArithOp::Subtract => self.subtract(operand),
            ArithOp::Divide => self.divide(operand),
            ArithOp::Multiply => self.multiply(operand),
        }
    }

    /// AC := AC + operand
    pub fn add(&mut self, operand: Word) -> Result<Word, ArithError> {
        self.commit(self.value() + operand.value())
    }

    /// AC := AC - operand. Negative results are refused.
    pub fn subtract(&mut self, operand: Word) -> Result<Word, ArithError> {
        self.commit(self.value() - operand.value())
    }

    /// AC := AC * operand
    pub fn multiply(&mut self, operand: Word) -> Result<Word, ArithError> {
        self.commit(self.value() * operand.value())
    }

    /// AC := AC / operand. An all-zero operand is refused before the
    /// accumulator is looked at.
    pub fn divide(&mut self, operand: Word) -> Result<Word, ArithError> {
        if operand.is_zero() {
            return Err(ArithError::DivideByZero);
        }
        self.commit(self.value() / operand.value())
    }

    /// Write the accumulator into memory.
    pub fn store_to_memory(&self, memory: &mut Memory, address: Address) {
        memory.write(address, self.ac.read());
    }

    /// Reset the accumulator to zero.
    pub fn halt(&mut self) {
        self.ac.store(Word::ZERO);
    }

    fn commit(&mut self, result: f64) -> Result<Word, ArithError> {
        let word = fixed::encode(result).map_err(|e| match e {
            EncodeError::Negative(_) => ArithError::Underflow,
            EncodeError::Overflow(_) | EncodeError::NotFinite => ArithError::Overflow,
        })?;
        self.ac.store(word);
        Ok(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn num(value: f64) -> Word {
        Word::from_value(value).unwrap()
    }

    fn alu_with(value: f64) -> Alu {
        let mut alu = Alu::new();
        alu.add(num(value)).unwrap();
        alu
    }

    #[test]
    fn test_add() {
        let mut alu = alu_with(1.0);
        assert_eq!(alu.add(num(1.0)), Ok(num(2.0)));
        assert_eq!(alu.accumulator().to_string(), "00000010");
    }

    #[test]
    fn test_add_halves() {
        let mut alu = alu_with(1.5);
        alu.add(num(1.0)).unwrap();
        assert_eq!(alu.accumulator().to_string(), "000010.1");
        assert_eq!(alu.value(), 2.5);
    }

    #[test]
    fn test_add_overflow_keeps_accumulator() {
        let mut alu = alu_with(200.0);
        assert_eq!(alu.add(num(100.0)), Err(ArithError::Overflow));
        assert_eq!(alu.value(), 200.0);
    }

    #[test]
    fn test_subtract_underflow_keeps_accumulator() {
        let mut alu = alu_with(3.0);
        assert_eq!(alu.subtract(num(5.0)), Err(ArithError::Underflow));
        assert_eq!(alu.value(), 3.0);
    }

    #[test]
    fn test_subtract_to_zero() {
        let mut alu = alu_with(3.0);
        assert_eq!(alu.subtract(num(3.0)), Ok(Word::ZERO));
    }

    #[test]
    fn test_multiply() {
        let mut alu = alu_with(3.0);
        alu.multiply(num(2.5)).unwrap();
        assert_eq!(alu.value(), 7.5);
        assert_eq!(alu.multiply(num(100.0)), Err(ArithError::Overflow));
        assert_eq!(alu.value(), 7.5);
    }

    #[test]
    fn test_divide_rounds() {
        let mut alu = alu_with(1.0);
        alu.divide(num(3.0)).unwrap();
        assert_eq!(alu.value(), 0.5);

        let mut alu = alu_with(2.0);
        alu.divide(num(3.0)).unwrap();
        assert_eq!(alu.value(), 0.5);
    }

    #[test]
    fn test_divide_by_zero() {
        let mut alu = alu_with(9.0);
        assert_eq!(alu.divide(Word::ZERO), Err(ArithError::DivideByZero));
        assert_eq!(alu.value(), 9.0);

        let mut empty = Alu::new();
        assert_eq!(empty.divide(Word::ZERO), Err(ArithError::DivideByZero));
    }

    #[test]
    fn test_divide_overflow() {
        let mut alu = alu_with(200.0);
        assert_eq!(alu.divide(num(0.5)), Err(ArithError::Overflow));
    }

    #[test]
    fn test_store_and_halt() {
        let mut alu = alu_with(2.5);
        let mut mem = Memory::new();
        let addr = Address::new(6).unwrap();

        alu.store_to_memory(&mut mem, addr);
        assert_eq!(mem.read(addr), Some(num(2.5)));
        assert_eq!(alu.accumulator(), num(2.5));

        alu.halt();
        assert_eq!(alu.accumulator(), Word::ZERO);
    }

    #[test]
    fn test_error_display_text() {
        assert_eq!(ArithError::Overflow.to_string(), "OVERFLOW");
        assert_eq!(ArithError::Underflow.to_string(), "UNDERFLOW");
        assert_eq!(ArithError::DivideByZero.to_string(), "UNDEFINED");
    }

    proptest! {
        #[test]
        fn prop_add_matches_rounded_sum(a in 0u32..=255, b in 0u32..=255) {
            let mut alu = alu_with(f64::from(a));
            let sum = f64::from(a + b);
            match alu.add(num(f64::from(b))) {
                Ok(word) => prop_assert_eq!(word.value(), sum),
                Err(e) => {
                    prop_assert_eq!(e, ArithError::Overflow);
                    prop_assert!(sum > 255.0);
                }
            }
        }

        #[test]
        fn prop_subtract_never_goes_negative(a in 0u32..=255, b in 0u32..=255) {
            let mut alu = alu_with(f64::from(a));
            let result = alu.subtract(num(f64::from(b)));
            if b > a {
                prop_assert_eq!(result, Err(ArithError::Underflow));
                prop_assert_eq!(alu.value(), f64::from(a));
            } else {
                prop_assert_eq!(result.map(|w| w.value()), Ok(f64::from(a - b)));
            }
        }

        #[test]
        fn prop_divide_by_zero_ignores_accumulator(a in 0u32..=255) {
            let mut alu = alu_with(f64::from(a));
            prop_assert_eq!(alu.divide(Word::ZERO), Err(ArithError::DivideByZero));
        }
    }
}
