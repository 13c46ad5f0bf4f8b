use std::fmt;
use std::ops::Deref;

/// The eight-symbol tape machine instruction set.
///
/// The machine has a growable tape of wrap-around cells, one data pointer,
/// and a single control-flow construct: bracket-delimited zero-test loops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Write,
    Read,
    LoopOpen,
    LoopClose,
}

/// Every significant character, in histogram order.
pub const ALPHABET: [char; 8] = ['>', '<', '+', '-', '.', ',', '[', ']'];

impl Instruction {
    pub const ALL: [Instruction; 8] = [
        Instruction::MoveRight,
        Instruction::MoveLeft,
        Instruction::Increment,
        Instruction::Decrement,
        Instruction::Write,
        Instruction::Read,
        Instruction::LoopOpen,
        Instruction::LoopClose,
    ];

    /// Decode a source character. Anything outside the alphabet is a comment.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Instruction::MoveRight),
            '<' => Some(Instruction::MoveLeft),
            '+' => Some(Instruction::Increment),
            '-' => Some(Instruction::Decrement),
            '.' => Some(Instruction::Write),
            ',' => Some(Instruction::Read),
            '[' => Some(Instruction::LoopOpen),
            ']' => Some(Instruction::LoopClose),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        ALPHABET[self.index()]
    }

    /// Position of this instruction in [`ALPHABET`].
    pub fn index(self) -> usize {
        match self {
            Instruction::MoveRight => 0,
            Instruction::MoveLeft => 1,
            Instruction::Increment => 2,
            Instruction::Decrement => 3,
            Instruction::Write => 4,
            Instruction::Read => 5,
            Instruction::LoopOpen => 6,
            Instruction::LoopClose => 7,
        }
    }
}

/// Returns true if `c` is one of the eight significant characters.
pub fn is_instruction(c: char) -> bool {
    Instruction::from_char(c).is_some()
}

/// An ordered, immutable instruction sequence.
///
/// Building a `Program` only strips comments; bracket structure is checked
/// when the interpreter loads it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn from_source(source: &str) -> Self {
        Self {
            instructions: source.chars().filter_map(Instruction::from_char).collect(),
        }
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl Deref for Program {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self.instructions.iter().map(|i| i.as_char()).collect();
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_roundtrip_covers_alphabet() {
        for (i, &c) in ALPHABET.iter().enumerate() {
            let ins = Instruction::from_char(c).unwrap();
            assert_eq!(ins.as_char(), c);
            assert_eq!(ins.index(), i);
            assert_eq!(Instruction::ALL[i], ins);
        }
    }

    #[test]
    fn test_comments_are_stripped() {
        let program = Program::from_source("add two: ++ then print .\n[-] done");
        assert_eq!(program.to_string(), "++.[-]");
        assert_eq!(program.len(), 6);
    }

    #[test]
    fn test_empty_source() {
        let program = Program::from_source("no instructions here");
        assert!(program.is_empty());
        assert_eq!(program.to_string(), "");
    }

    #[test]
    fn test_unbalanced_source_still_parses() {
        // Structure is the interpreter's concern.
        let program = Program::from_source("]][");
        assert_eq!(
            &program[..],
            &[
                Instruction::LoopClose,
                Instruction::LoopClose,
                Instruction::LoopOpen
            ]
        );
    }

    #[test]
    fn test_collect_and_render() {
        let program: Program = [Instruction::Increment, Instruction::Write]
            .into_iter()
            .collect();
        assert_eq!(program, Program::from_source("+."));
        assert_eq!(program.to_string(), "+.");
    }

    #[test]
    fn test_is_instruction() {
        assert!(is_instruction('>'));
        assert!(is_instruction(']'));
        assert!(!is_instruction('a'));
        assert!(!is_instruction(' '));
    }
}
