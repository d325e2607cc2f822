use thiserror::Error;

use crate::constants::Word;

use super::instructions::Opcode;
use super::memory::MemoryError;
use super::registers::RegisterError;

/// Fatal machine faults.
///
/// Any of these halts the machine: the execution engine transitions to the
/// halted state before surfacing the fault to the caller.
#[derive(Debug, Error)]
pub enum Exception {
    #[error("invalid instruction {0:#04x}")]
    InvalidInstruction(Word),

    #[error("unsupported ALU operation {0}")]
    UnsupportedAluOperation(Opcode),

    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),

    #[error("invalid register access ({0})")]
    InvalidRegisterAccess(#[from] RegisterError),

    #[error("stack overflow")]
    StackOverflow,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
