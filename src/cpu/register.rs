//! Calculator registers.
//!
//! The calculator has five registers:
//! - PC: 4-bit program counter
//! - MAR: 4-bit memory address register
//! - IBR: 8-bit instruction buffer register
//! - IR: 8-bit instruction register
//! - AC: 8-bit accumulator (owned by the ALU)

use crate::binary::{Address, Word};
use serde::{Serialize, Deserialize};

/// A single fixed-width register cell.
///
/// `store` replaces the held value unconditionally; width is carried by the
/// value type ([`Address`] for 4-bit registers, [`Word`] for 8-bit ones).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Register<T> {
    value: T,
}

impl<T: Copy> Register<T> {
    /// Create a register holding `value`.
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Replace the held value.
    #[inline]
    pub fn store(&mut self, value: T) {
        self.value = value;
    }

    /// Current value.
    #[inline]
    pub fn read(&self) -> T {
        self.value
    }
}

/// A 4-bit register, initially `0000`.
pub type AddressRegister = Register<Address>;

/// An 8-bit register, initially `00000000`.
pub type WordRegister = Register<Word>;

impl AddressRegister {
    /// Advance by one, wrapping at 4 bits.
    /// Returns the old value.
    pub fn increment(&mut self) -> Address {
        let old = self.value;
        self.value = old.wrapping_next();
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        assert_eq!(AddressRegister::default().read().to_string(), "0000");
        assert_eq!(WordRegister::default().read().to_string(), "00000000");
    }

    #[test]
    fn test_store_replaces() {
        let mut reg = WordRegister::default();
        let word = Word::parse("000010.1").unwrap();
        reg.store(word);
        assert_eq!(reg.read(), word);
    }

    #[test]
    fn test_increment() {
        let mut pc = AddressRegister::default();
        let old = pc.increment();
        assert_eq!(old, Address::ZERO);
        assert_eq!(pc.read().to_string(), "0001");

        pc.store(Address::MAX);
        pc.increment();
        assert_eq!(pc.read(), Address::ZERO);
    }
}
