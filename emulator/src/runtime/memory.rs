use thiserror::Error;

use crate::constants::{Address, Word, MEMORY_SIZE};

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The given address was invalid
    #[error("invalid address {0:#04x}")]
    InvalidAddress(Address),
}

/// Holds the memory cells of the machine.
///
/// It has 256 byte-sized cells, all zeroed on construction.
#[derive(Clone)]
pub struct Memory {
    inner: Box<[Word; MEMORY_SIZE as usize]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            inner: Box::new([0; MEMORY_SIZE as usize]),
        }
    }
}

impl Memory {
    /// Get the value of a cell at an address
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get(&self, address: Address) -> Result<Word, MemoryError> {
        self.inner
            .get(usize::from(address))
            .copied()
            .ok_or(MemoryError::InvalidAddress(address))
    }

    /// Get a mutable reference to a cell at an address
    ///
    /// # Errors
    ///
    /// It fails if the address is out of bounds.
    pub fn get_mut(&mut self, address: Address) -> Result<&mut Word, MemoryError> {
        self.inner
            .get_mut(usize::from(address))
            .ok_or(MemoryError::InvalidAddress(address))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn get_test() {
        let mut memory = Memory::default();
        assert_eq!(memory.get(0), Ok(0));
        assert_eq!(memory.get(MEMORY_SIZE - 1), Ok(0));
        assert_eq!(
            memory.get(MEMORY_SIZE),
            Err(MemoryError::InvalidAddress(MEMORY_SIZE))
        );

        *memory.get_mut(0x42).unwrap() = 0xFF;
        assert_eq!(memory.get(0x42), Ok(0xFF));
        assert!(memory.get_mut(0x1000).is_err());
    }
}
