//! Arithmetic logic unit.
//!
//! Operates on register values only. Arithmetic is unsigned and wraps at the
//! machine word width. Comparisons produce a fresh [`Flags`] value with
//! exactly one bit set.

use std::cmp::Ordering;

use tracing::debug;

use crate::constants::Word;

use super::exception::Exception;
use super::instructions::Opcode;
use super::registers::Flags;

/// Apply an arithmetic operation to two register values.
///
/// # Errors
///
/// Opcodes the ALU does not implement fail with
/// [`Exception::UnsupportedAluOperation`], they are never a silent no-op.
pub(crate) fn apply(op: Opcode, a: Word, b: Word) -> Result<Word, Exception> {
    match op {
        Opcode::Mul => {
            let res = a.wrapping_mul(b);
            debug!("{a} * {b} = {res}");
            Ok(res)
        }
        other => Err(Exception::UnsupportedAluOperation(other)),
    }
}

/// Compare two register values
pub(crate) fn compare(a: Word, b: Word) -> Flags {
    let flags = match a.cmp(&b) {
        Ordering::Equal => Flags::EQUAL,
        Ordering::Greater => Flags::GREATER,
        Ordering::Less => Flags::LESS,
    };
    debug!("cmp({a}, {b}) => {flags:?}");
    flags
}
