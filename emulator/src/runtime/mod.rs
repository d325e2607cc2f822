use std::io::{self, Write};

use tracing::{debug, info};

use crate::constants::{Address, Word, MEMORY_SIZE, STACK_START};

pub(crate) mod alu;
mod exception;
mod instructions;
mod memory;
mod registers;

pub use self::exception::Exception;
pub use self::instructions::{Instruction, Opcode};
pub use self::memory::{Memory, MemoryError};
pub use self::registers::{Flags, RegisterError, Registers};

/// Execution state of the machine.
///
/// Once halted, a machine never runs again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Running,
    Halted,
}

/// The LS-8 machine: register file, memory, flags and the execution engine.
///
/// `W` is the sink for the `prn` instruction; [`Machine::new`] wires it to
/// standard output.
pub struct Machine<W> {
    pub registers: Registers,
    pub memory: Memory,
    flags: Flags,
    pc: Address,
    sp: Address,
    state: State,
    cycles: usize,
    output: W,
}

impl Machine<io::Stdout> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Machine<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> std::fmt::Debug for Machine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Machine {{ registers: {:?}, pc: {:#04x}, sp: {:#04x}, flags: {:?}, memory: [...] }}",
            self.registers, self.pc, self.sp, self.flags
        )
    }
}

impl<W: Write> Machine<W> {
    /// Build a machine with a custom `prn` sink
    pub fn with_output(output: W) -> Self {
        Self {
            registers: Registers::default(),
            memory: Memory::default(),
            flags: Flags::default(),
            pc: 0,
            sp: STACK_START,
            state: State::default(),
            cycles: 0,
            output,
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[must_use]
    pub fn pc(&self) -> Address {
        self.pc
    }

    #[must_use]
    pub fn sp(&self) -> Address {
        self.sp
    }

    /// Number of instructions executed so far
    #[must_use]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Consume the machine and recover the `prn` sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Fetch and decode the instruction at the program counter
    fn decode_instruction(&self) -> Result<Instruction, Exception> {
        let byte = self.memory.get(self.pc)?;
        let opcode = Opcode::decode(byte).ok_or(Exception::InvalidInstruction(byte))?;
        let (a, b) = match opcode.operands() {
            0 => (0, 0),
            1 => (self.memory.get(self.pc + 1)?, 0),
            _ => (self.memory.get(self.pc + 1)?, self.memory.get(self.pc + 2)?),
        };
        Ok(Instruction::decode(opcode, a, b))
    }

    /// Transition to the halted state on a fault, then surface it
    fn fail(&mut self, exception: Exception) -> Exception {
        self.state = State::Halted;
        exception
    }

    /// Execute a single instruction.
    ///
    /// # Errors
    ///
    /// Any fault halts the machine and is returned to the caller.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Result<(), Exception> {
        let inst = match self.decode_instruction() {
            Ok(inst) => inst,
            Err(e) => return Err(self.fail(e)),
        };
        info!("Executing instruction \"{inst}\"");
        if let Err(e) = inst.execute(self) {
            return Err(self.fail(e));
        }
        self.cycles += 1;
        debug!("Register state {:?}", self.registers);
        Ok(())
    }

    /// Run until the machine halts.
    ///
    /// # Errors
    ///
    /// Stops at the first fault, with the machine left halted.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<(), Exception> {
        while self.state == State::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Push a value onto the downward-growing stack
    pub(crate) fn push(&mut self, value: Word) -> Result<(), Exception> {
        if self.sp == 0 {
            return Err(Exception::StackOverflow);
        }
        self.sp -= 1;
        *self.memory.get_mut(self.sp)? = value;
        Ok(())
    }

    /// Pop the value at the top of the stack
    pub(crate) fn pop(&mut self) -> Result<Word, Exception> {
        if self.sp >= MEMORY_SIZE {
            return Err(Exception::StackUnderflow);
        }
        let value = self.memory.get(self.sp)?;
        self.sp += 1;
        debug!("pop => {value}");
        Ok(value)
    }
}
