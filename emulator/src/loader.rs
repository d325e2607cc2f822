//! Program loader.
//!
//! Translates a textual program into memory bytes. Program files hold one
//! base-2 byte literal per line; a `#` starts a comment running to the end of
//! the line. Lines without a valid literal are classified and skipped, they
//! never fail the load.

use nom::bytes::complete::take_while1;
use nom::combinator::{all_consuming, map_res};
use nom::IResult;
use tracing::debug;

use crate::constants::{Address, Word, COMMENT_CHAR, MEMORY_SIZE};
use crate::runtime::{Machine, MemoryError};

/// Classification of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line {
    /// Nothing to load: blank or comment-only
    Blank,

    /// A byte to load into the next memory address
    Byte(Word),

    /// Text that is not a base-2 byte literal, skipped
    Invalid,
}

/// Parse a binary number
fn from_binary(input: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str_radix(input, 2)
}

/// Check if character is a binary digit
fn is_bin_digit(c: char) -> bool {
    c.is_digit(2)
}

/// Parse a base-2 byte literal
fn parse_byte_literal(input: &str) -> IResult<&str, Word> {
    map_res(take_while1(is_bin_digit), from_binary)(input)
}

pub(crate) fn classify_line(line: &str) -> Line {
    // Everything after the comment marker is ignored
    let content = line.split(COMMENT_CHAR).next().unwrap_or("").trim();
    if content.is_empty() {
        return Line::Blank;
    }

    match all_consuming(parse_byte_literal)(content) {
        Ok((_, byte)) => Line::Byte(byte),
        Err(_) => Line::Invalid,
    }
}

/// Translate a program source into its memory bytes, in file order
pub(crate) fn parse_program(source: &str) -> Vec<Word> {
    source
        .lines()
        .filter_map(|line| match classify_line(line) {
            Line::Byte(byte) => Some(byte),
            Line::Blank => None,
            Line::Invalid => {
                debug!(line, "Skipping invalid program line");
                None
            }
        })
        .collect()
}

/// Load a program into the machine memory, starting at address 0.
///
/// Returns the number of bytes loaded.
///
/// # Errors
///
/// It fails only if the program holds more bytes than the memory.
pub fn load<W>(source: &str, machine: &mut Machine<W>) -> Result<usize, MemoryError> {
    let program = parse_program(source);
    if program.len() > usize::from(MEMORY_SIZE) {
        return Err(MemoryError::InvalidAddress(MEMORY_SIZE));
    }

    for (offset, byte) in program.iter().enumerate() {
        *machine.memory.get_mut(offset as Address)? = *byte;
    }

    debug!(bytes = program.len(), "Program loaded");
    Ok(program.len())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::runtime::State;

    #[test]
    fn classify_line_test() {
        assert_eq!(classify_line("10000010"), Line::Byte(0x82));
        assert_eq!(classify_line("00000001 # HLT"), Line::Byte(0x01));
        assert_eq!(classify_line("  00001000  "), Line::Byte(0x08));
        assert_eq!(classify_line(""), Line::Blank);
        assert_eq!(classify_line("   "), Line::Blank);
        assert_eq!(classify_line("# just a comment"), Line::Blank);
        assert_eq!(classify_line("hello"), Line::Invalid);
        assert_eq!(classify_line("0b101"), Line::Invalid);
        // Nine bits do not fit a byte
        assert_eq!(classify_line("100000000"), Line::Invalid);
    }

    #[test]
    fn parse_program_test() {
        let source = indoc! {"
            10100010 # MUL R0,R1
            00000000
            00000001
            #comment
        "};
        assert_eq!(parse_program(source), vec![0xA2, 0x00, 0x01]);
    }

    #[test]
    fn malformed_lines_are_skipped_test() {
        let source = indoc! {"
            10000010
            not a number
            00000000

            00001000
        "};
        // Only the valid literals are loaded, at consecutive addresses
        assert_eq!(parse_program(source), vec![0x82, 0x00, 0x08]);
    }

    #[test]
    fn load_test() {
        let mut machine = Machine::with_output(Vec::new());
        let source = indoc! {"
            10000010 # LDI R0,8
            00000000
            00001000
            # a comment line
            00000001 # HLT
        "};
        let loaded = load(source, &mut machine).unwrap();
        assert_eq!(loaded, 4);
        assert_eq!(machine.memory.get(0), Ok(0x82));
        assert_eq!(machine.memory.get(3), Ok(0x01));
        assert_eq!(machine.memory.get(4), Ok(0));
    }

    #[test]
    fn print8_end_to_end_test() {
        let source = indoc! {"
            10000010 # LDI R0,8
            00000000
            00001000
            01000111 # PRN R0
            00000000
            00000001 # HLT
        "};

        let mut machine = Machine::with_output(Vec::new());
        load(source, &mut machine).unwrap();
        machine.run().unwrap();

        assert_eq!(machine.state(), State::Halted);
        assert_eq!(String::from_utf8(machine.into_output()).unwrap(), "8\n");
    }
}
