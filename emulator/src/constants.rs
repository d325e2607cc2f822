/// Width of a memory cell and of a general purpose register
pub type Word = u8;

/// Addresses are wider than a word so that out-of-range program counters and
/// stack pointers are representable instead of silently wrapping
pub type Address = u16;

/// Total size of the machine memory
pub const MEMORY_SIZE: Address = 256;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Initial value of the stack pointer, mirrored in register R7 on startup
pub const STACK_START: Address = 0xF4;

/// Character starting a comment in program files
pub const COMMENT_CHAR: char = '#';
