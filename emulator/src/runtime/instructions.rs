use std::io::Write;

use parse_display::Display;
use tracing::debug;

use crate::constants::{Address, Word};

use super::alu;
use super::exception::Exception;
use super::memory::MemoryError;
use super::{Machine, State};

/// Instruction identities, keyed by their encoded byte.
///
/// The encoding is kept compatible with existing LS-8 program files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "UPPERCASE")]
pub enum Opcode {
    Hlt,
    Ldi,
    Prn,
    Mul,
    Push,
    Pop,
    Call,
    Ret,
    Cmp,
    Jmp,
    Jeq,
    Jne,
}

impl Opcode {
    /// Decode an opcode byte.
    ///
    /// Returns `None` for a byte not present in the dispatch table; the
    /// execution engine turns that into an invalid instruction fault.
    #[must_use]
    pub fn decode(byte: Word) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Hlt),
            0x82 => Some(Self::Ldi),
            0x47 => Some(Self::Prn),
            0xA2 => Some(Self::Mul),
            0x45 => Some(Self::Push),
            0x46 => Some(Self::Pop),
            0x50 => Some(Self::Call),
            0x11 => Some(Self::Ret),
            0xA7 => Some(Self::Cmp),
            0x54 => Some(Self::Jmp),
            0x55 => Some(Self::Jeq),
            0x56 => Some(Self::Jne),
            _ => None,
        }
    }

    /// Number of operand bytes following the opcode in memory
    #[must_use]
    pub const fn operands(self) -> usize {
        match self {
            Self::Hlt | Self::Ret => 0,
            Self::Prn | Self::Push | Self::Pop | Self::Call | Self::Jmp | Self::Jeq | Self::Jne => {
                1
            }
            Self::Ldi | Self::Mul | Self::Cmp => 2,
        }
    }

    /// Whether this instruction routes through the ALU
    #[must_use]
    pub const fn is_alu(self) -> bool {
        matches!(self, Self::Mul | Self::Cmp)
    }
}

/// A decoded instruction, read fresh from memory each cycle.
///
/// Jump and call targets are held in the named register, not in the operand
/// byte itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Instruction {
    /// Halt the machine
    #[display("hlt")]
    Halt,

    /// Load an immediate literal into a register
    #[display("ldi  r{0}, {1}")]
    LoadImmediate(Word, Word),

    /// Print the decimal value of a register
    #[display("prn  r{0}")]
    Print(Word),

    /// Multiply two registers, storing into the first
    #[display("mul  r{0}, r{1}")]
    Multiply(Word, Word),

    /// Push a register value onto the stack
    #[display("push r{0}")]
    Push(Word),

    /// Pop the top of the stack into a register
    #[display("pop  r{0}")]
    Pop(Word),

    /// Push the return address and jump to the address held in a register
    #[display("call r{0}")]
    Call(Word),

    /// Return from a `call`
    #[display("ret")]
    Return,

    /// Compare two registers and set the flags
    #[display("cmp  r{0}, r{1}")]
    Compare(Word, Word),

    /// Jump to the address held in a register, unconditionally
    #[display("jmp  r{0}")]
    Jump(Word),

    /// Jump if the equal flag is set
    #[display("jeq  r{0}")]
    JumpIfEqual(Word),

    /// Jump if the equal flag is clear
    #[display("jne  r{0}")]
    JumpIfNotEqual(Word),
}

impl Instruction {
    /// Build an instruction from a decoded opcode and its operand bytes.
    ///
    /// Opcodes with fewer than two operands ignore the extra bytes.
    pub(crate) fn decode(opcode: Opcode, a: Word, b: Word) -> Self {
        match opcode {
            Opcode::Hlt => Self::Halt,
            Opcode::Ldi => Self::LoadImmediate(a, b),
            Opcode::Prn => Self::Print(a),
            Opcode::Mul => Self::Multiply(a, b),
            Opcode::Push => Self::Push(a),
            Opcode::Pop => Self::Pop(a),
            Opcode::Call => Self::Call(a),
            Opcode::Ret => Self::Return,
            Opcode::Cmp => Self::Compare(a, b),
            Opcode::Jmp => Self::Jump(a),
            Opcode::Jeq => Self::JumpIfEqual(a),
            Opcode::Jne => Self::JumpIfNotEqual(a),
        }
    }

    /// Execute the instruction.
    ///
    /// Each arm either advances the program counter past the instruction or
    /// sets it explicitly, never both.
    pub(crate) fn execute<W: Write>(self, machine: &mut Machine<W>) -> Result<(), Exception> {
        use Instruction::{
            Call, Compare, Halt, Jump, JumpIfEqual, JumpIfNotEqual, LoadImmediate, Multiply, Pop,
            Print, Push, Return,
        };

        match self {
            Halt => {
                machine.pc += 1;
                machine.state = State::Halted;
            }

            LoadImmediate(reg, value) => {
                machine.registers.set(reg, value)?;
                machine.pc += 3;
            }

            Print(reg) => {
                let value = machine.registers.get(reg)?;
                writeln!(machine.output, "{value}")?;
                machine.pc += 2;
            }

            Multiply(reg_a, reg_b) => {
                let a = machine.registers.get(reg_a)?;
                let b = machine.registers.get(reg_b)?;
                let res = alu::apply(Opcode::Mul, a, b)?;
                machine.registers.set(reg_a, res)?;
                machine.pc += 3;
            }

            Push(reg) => {
                let value = machine.registers.get(reg)?;
                debug!("push({value})");
                machine.push(value)?;
                machine.pc += 2;
            }

            Pop(reg) => {
                let value = machine.pop()?;
                machine.registers.set(reg, value)?;
                machine.pc += 2;
            }

            Call(reg) => {
                // Push the address of the instruction following the call
                let ret = machine.pc + 2;
                let ret = Word::try_from(ret)
                    .map_err(|_| Exception::InvalidMemoryAccess(MemoryError::InvalidAddress(ret)))?;
                machine.push(ret)?;

                // The register holds the jump target
                let target = machine.registers.get(reg)?;
                debug!("Calling address {target:#04x}");
                machine.pc = Address::from(target);
            }

            Return => {
                let ret = machine.pop()?;
                debug!("Returning to {ret:#04x}");
                machine.pc = Address::from(ret);
            }

            Compare(reg_a, reg_b) => {
                let a = machine.registers.get(reg_a)?;
                let b = machine.registers.get(reg_b)?;
                machine.flags = alu::compare(a, b);
                machine.pc += 3;
            }

            Jump(reg) => {
                let target = machine.registers.get(reg)?;
                debug!("Jumping to address {target:#04x}");
                machine.pc = Address::from(target);
            }

            JumpIfEqual(reg) => {
                if machine.flags.equal() {
                    let target = machine.registers.get(reg)?;
                    debug!("Jumping to address {target:#04x}");
                    machine.pc = Address::from(target);
                } else {
                    machine.pc += 2;
                }
            }

            JumpIfNotEqual(reg) => {
                if machine.flags.equal() {
                    machine.pc += 2;
                } else {
                    let target = machine.registers.get(reg)?;
                    debug!("Jumping to address {target:#04x}");
                    machine.pc = Address::from(target);
                }
            }
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_table_test() {
        assert_eq!(Opcode::decode(0x01), Some(Opcode::Hlt));
        assert_eq!(Opcode::decode(0x82), Some(Opcode::Ldi));
        assert_eq!(Opcode::decode(0x47), Some(Opcode::Prn));
        assert_eq!(Opcode::decode(0xA2), Some(Opcode::Mul));
        assert_eq!(Opcode::decode(0x45), Some(Opcode::Push));
        assert_eq!(Opcode::decode(0x46), Some(Opcode::Pop));
        assert_eq!(Opcode::decode(0x50), Some(Opcode::Call));
        assert_eq!(Opcode::decode(0x11), Some(Opcode::Ret));
        assert_eq!(Opcode::decode(0xA7), Some(Opcode::Cmp));
        assert_eq!(Opcode::decode(0x54), Some(Opcode::Jmp));
        assert_eq!(Opcode::decode(0x55), Some(Opcode::Jeq));
        assert_eq!(Opcode::decode(0x56), Some(Opcode::Jne));

        assert_eq!(Opcode::decode(0x00), None);
        assert_eq!(Opcode::decode(0xFF), None);
    }

    #[test]
    fn operands_test() {
        assert_eq!(Opcode::Hlt.operands(), 0);
        assert_eq!(Opcode::Ret.operands(), 0);
        assert_eq!(Opcode::Prn.operands(), 1);
        assert_eq!(Opcode::Jeq.operands(), 1);
        assert_eq!(Opcode::Ldi.operands(), 2);
        assert_eq!(Opcode::Cmp.operands(), 2);
    }

    #[test]
    fn is_alu_test() {
        assert!(Opcode::Mul.is_alu());
        assert!(Opcode::Cmp.is_alu());
        assert!(!Opcode::Jmp.is_alu());
        assert!(!Opcode::Hlt.is_alu());
    }

    #[test]
    fn display_test() {
        assert_eq!(Opcode::Ldi.to_string(), "LDI");
        assert_eq!(Instruction::LoadImmediate(0, 8).to_string(), "ldi  r0, 8");
        assert_eq!(Instruction::Multiply(0, 1).to_string(), "mul  r0, r1");
        assert_eq!(Instruction::Return.to_string(), "ret");
    }
}
