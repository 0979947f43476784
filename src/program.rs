//! Loading a program: source filtering and loop-bracket matching.

use tracing::debug;

use crate::error::{TraceError, UnmatchedBracketKind};

/// One of the eight Brainfuck commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Increment,
    Decrement,
    MoveLeft,
    MoveRight,
    LoopStart,
    LoopEnd,
    Output,
    Input,
}

impl Instruction {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '<' => Instruction::MoveLeft,
            '>' => Instruction::MoveRight,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::MoveLeft => '<',
            Instruction::MoveRight => '>',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
            Instruction::Output => '.',
            Instruction::Input => ',',
        }
    }
}

/// Keep only Brainfuck instruction characters
pub fn filter_source(s: &str) -> String {
    s.chars()
        .filter(|c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']'))
        .collect()
}

/// Precompute matching bracket positions.
///
/// The returned vector is parallel to `code`: entry `i` holds the index of the
/// partner bracket for a `[` or `]` at `i`, and `None` everywhere else.
pub fn loop_positions(code: &[Instruction]) -> Result<Vec<Option<usize>>, TraceError> {
    let mut jump_map: Vec<Option<usize>> = vec![None; code.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (i, instr) in code.iter().enumerate() {
        match instr {
            Instruction::LoopStart => stack.push(i),
            Instruction::LoopEnd => {
                let Some(open_index) = stack.pop() else {
                    return Err(TraceError::Malformed {
                        ip: i,
                        kind: UnmatchedBracketKind::Close,
                    });
                };
                jump_map[open_index] = Some(i);
                jump_map[i] = Some(open_index);
            }
            _ => {}
        }
    }

    if let Some(unmatched_open) = stack.last().copied() {
        return Err(TraceError::Malformed {
            ip: unmatched_open,
            kind: UnmatchedBracketKind::Open,
        });
    }

    Ok(jump_map)
}

/// A filtered, bracket-checked instruction sequence.
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    code: Vec<Instruction>,
    jumps: Vec<Option<usize>>,
}

impl Program {
    /// Filter `raw` down to instructions and build the bracket map.
    pub fn parse(raw: &str) -> Result<Self, TraceError> {
        let source = filter_source(raw);
        let code: Vec<Instruction> = source.chars().filter_map(Instruction::from_char).collect();
        let jumps = loop_positions(&code)?;

        debug!(
            instructions = code.len(),
            loops = jumps.iter().flatten().count() / 2,
            "program loaded"
        );

        Ok(Self { source, code, jumps })
    }

    /// The filtered source text, one char per instruction.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    pub fn get(&self, ip: usize) -> Option<Instruction> {
        self.code.get(ip).copied()
    }

    /// Index of the bracket matching the one at `ip`.
    pub fn partner(&self, ip: usize) -> Option<usize> {
        self.jumps.get(ip).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
