//! Four-bit memory addresses.

use std::fmt;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use super::ParseError;

/// Number of addressable memory cells.
pub const ADDRESS_SPACE: usize = 16;

/// A 4-bit address, `0000` to `1111`.
///
/// Used for memory cells, the program counter and the memory address register.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u8);

impl Address {
    /// Address `0000`.
    pub const ZERO: Address = Address(0);

    /// Address `1111`.
    pub const MAX: Address = Address(15);

    /// Create from a cell index, `None` if it does not fit in 4 bits.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < ADDRESS_SPACE {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Create from a `usize` index, `None` past cell 15.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::new)
    }

    /// The cell index this address selects.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The next address, wrapping `1111` back to `0000` like a 4-bit counter.
    #[inline]
    pub const fn wrapping_next(self) -> Self {
        Self((self.0 + 1) % ADDRESS_SPACE as u8)
    }

    /// Every address in ascending order.
    pub fn all() -> impl Iterator<Item = Address> {
        (0..ADDRESS_SPACE as u8).map(Address)
    }

    /// Parse four binary digits.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Self::from_bits(s.as_bytes())
    }

    /// Parse four ASCII bits, as found in the low half of an instruction word.
    pub fn from_bits(bits: &[u8]) -> Result<Self, ParseError> {
        if bits.len() != 4 {
            return Err(ParseError::WrongLength { expected: 4, got: bits.len() });
        }

        let mut value = 0u8;
        for &b in bits {
            value = match b {
                b'0' => value << 1,
                b'1' => (value << 1) | 1,
                other => return Err(ParseError::InvalidChar(char::from(other))),
            };
        }
        Ok(Self(value))
    }

    /// The four ASCII bits of this address.
    pub fn bits(self) -> [u8; 4] {
        let mut out = [b'0'; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            if self.0 & (0b1000 >> i) != 0 {
                *slot = b'1';
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:04b})", self.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::parse(&text).map_err(serde::de::Error::custom)
    }
}
