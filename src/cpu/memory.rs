//! Calculator memory.
//!
//! Sixteen cells addressed `0000` to `1111`. A cell is either empty or holds
//! one [`Word`]; cells start empty and are only ever overwritten.

use crate::binary::{Address, Word, ADDRESS_SPACE};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Contents of every cell, indexed by address.
pub type MemoryImage = [Option<Word>; ADDRESS_SPACE];

/// Calculator memory: 16 optional words.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Memory {
    cells: MemoryImage,
}

impl Memory {
    /// Create a memory with every cell empty.
    pub fn new() -> Self {
        Self { cells: [None; ADDRESS_SPACE] }
    }

    /// Create a memory from a prepared image.
    pub fn from_image(cells: MemoryImage) -> Self {
        Self { cells }
    }

    /// Read a cell, `None` if it was never written.
    #[inline]
    pub fn read(&self, addr: Address) -> Option<Word> {
        self.cells[addr.index()]
    }

    /// Read a cell that a running program depends on.
    pub fn fetch(&self, addr: Address) -> Result<Word, MemoryFault> {
        self.read(addr).ok_or(MemoryFault::EmptyCell(addr))
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: Address, value: Word) {
        self.cells[addr.index()] = Some(value);
    }

    /// Copy of every cell, for snapshots.
    pub fn image(&self) -> MemoryImage {
        self.cells
    }

    /// Check if no cell has been written.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Occupied cells in address order.
    pub fn dump(&self) -> Vec<(Address, Word)> {
        Address::all()
            .filter_map(|addr| self.read(addr).map(|word| (addr, word)))
            .collect()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("occupied_cells", &self.cells.iter().filter(|c| c.is_some()).count())
            .field("total_cells", &ADDRESS_SPACE)
            .finish()
    }
}

/// A running program touched memory it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MemoryFault {
    /// The cell at this address was never written.
    #[error("read of empty cell {0}")]
    EmptyCell(Address),

    /// An instruction's address field is not a 4-bit address.
    #[error("instruction {0} has no valid address field")]
    BadAddress(Word),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(i: u8) -> Address {
        Address::new(i).unwrap()
    }

    #[test]
    fn test_memory_starts_empty() {
        let mem = Memory::new();
        assert!(mem.is_blank());
        for a in Address::all() {
            assert_eq!(mem.read(a), None);
        }
    }

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        let word = Word::parse("00000101").unwrap();

        mem.write(addr(10), word);
        assert_eq!(mem.read(addr(10)), Some(word));
        assert_eq!(mem.fetch(addr(10)), Ok(word));
        assert!(!mem.is_blank());
    }

    #[test]
    fn test_fetch_empty_is_fault() {
        let mem = Memory::new();
        assert_eq!(mem.fetch(addr(3)), Err(MemoryFault::EmptyCell(addr(3))));
    }

    #[test]
    fn test_dump_lists_occupied_cells() {
        let mut mem = Memory::new();
        mem.write(addr(1), Word::ZERO);
        mem.write(addr(4), Word::ZERO);

        let cells: Vec<_> = mem.dump().into_iter().map(|(a, _)| a.index()).collect();
        assert_eq!(cells, vec![1, 4]);
    }
}
