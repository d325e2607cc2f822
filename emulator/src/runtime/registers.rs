use bitflags::bitflags;
use thiserror::Error;

use crate::constants::{Word, REGISTER_COUNT, STACK_START};

bitflags! {
    /// Condition flags, set by comparisons and consumed by conditional jumps.
    ///
    /// The bit layout is `00000LGE`: exactly one of the three bits is set
    /// after a comparison.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Flags: Word {
        const EQUAL   = 0b001;
        const GREATER = 0b010;
        const LESS    = 0b100;
    }
}

impl Flags {
    /// Whether the last comparison found both operands equal
    #[must_use]
    pub fn equal(self) -> bool {
        self.contains(Flags::EQUAL)
    }

    /// Whether the last comparison found the first operand greater
    #[must_use]
    pub fn greater(self) -> bool {
        self.contains(Flags::GREATER)
    }

    /// Whether the last comparison found the first operand smaller
    #[must_use]
    pub fn less(self) -> bool {
        self.contains(Flags::LESS)
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#05b}", self.bits())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid register index {0}")]
pub struct RegisterError(pub Word);

/// The general purpose register file.
///
/// Eight word-sized registers. By convention the last one holds the initial
/// stack pointer value on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    inner: [Word; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut inner = [0; REGISTER_COUNT];
        inner[REGISTER_COUNT - 1] = STACK_START as Word;
        Self { inner }
    }
}

impl Registers {
    /// Get the value of a register
    ///
    /// # Errors
    ///
    /// It fails if the register index is out of range.
    pub fn get(&self, index: Word) -> Result<Word, RegisterError> {
        self.inner
            .get(usize::from(index))
            .copied()
            .ok_or(RegisterError(index))
    }

    /// Set the value of a register
    ///
    /// Values are word-sized, so writes are inherently truncated to the
    /// machine word width.
    ///
    /// # Errors
    ///
    /// It fails if the register index is out of range.
    pub fn set(&mut self, index: Word, value: Word) -> Result<(), RegisterError> {
        let cell = self
            .inner
            .get_mut(usize::from(index))
            .ok_or(RegisterError(index))?;
        *cell = value;
        Ok(())
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, value) in self.inner.iter().enumerate() {
            if index != 0 {
                write!(f, " | ")?;
            }
            write!(f, "r{index} = {value:#04x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_test() {
        let registers = Registers::default();
        for index in 0..7 {
            assert_eq!(registers.get(index), Ok(0));
        }
        // The last register holds the initial stack pointer
        assert_eq!(registers.get(7), Ok(0xF4));
    }

    #[test]
    fn get_set_test() {
        let mut registers = Registers::default();
        registers.set(0, 0x42).unwrap();
        assert_eq!(registers.get(0), Ok(0x42));
        assert_eq!(registers.get(8), Err(RegisterError(8)));
        assert_eq!(registers.set(8, 0), Err(RegisterError(8)));
    }

    #[test]
    fn flags_predicates_test() {
        assert!(Flags::EQUAL.equal());
        assert!(!Flags::EQUAL.greater());
        assert!(!Flags::EQUAL.less());
        assert!(!Flags::default().equal());
    }
}
