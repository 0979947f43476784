//! The step-by-step execution state machine.

use tracing::{debug, trace, warn};

use crate::error::{TraceError, UnmatchedBracketKind};
use crate::input::InputSource;
use crate::program::{Instruction, Program};
use crate::tape::Tape;

/// Everything that changes while a program runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    /// Index of the next instruction to execute.
    pub ip: usize,
    /// Memory cells and the data pointer.
    pub tape: Tape,
    /// Set by `.`; cleared when the emitted character is taken.
    pub output_pending: bool,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute the instruction at `ip` and advance.
    ///
    /// On error the state is left exactly as it was before the call.
    pub fn advance(&mut self, program: &Program, input: &mut dyn InputSource) -> Result<(), TraceError> {
        let ip = self.ip;
        let Some(instr) = program.get(ip) else {
            return Ok(());
        };

        match instr {
            Instruction::Increment => self.tape.increment(),
            Instruction::Decrement => self.tape.decrement(),
            Instruction::MoveRight => self.tape.move_right(),
            Instruction::MoveLeft => {
                if !self.tape.move_left() {
                    return Err(TraceError::PointerUnderflow { ip });
                }
            }
            Instruction::LoopStart => {
                if self.tape.current() == 0 {
                    self.ip = program.partner(ip).ok_or(TraceError::Malformed {
                        ip,
                        kind: UnmatchedBracketKind::Open,
                    })?;
                }
            }
            Instruction::LoopEnd => {
                if self.tape.current() != 0 {
                    self.ip = program.partner(ip).ok_or(TraceError::Malformed {
                        ip,
                        kind: UnmatchedBracketKind::Close,
                    })?;
                }
            }
            Instruction::Output => self.output_pending = true,
            Instruction::Input => {
                let byte = input
                    .read_byte()
                    .map_err(|source| TraceError::Io { ip, source })?;
                self.tape.set_current(byte.unwrap_or(0));
            }
        }

        // Jumps land on the partner bracket; this moves past it.
        self.ip += 1;
        Ok(())
    }
}

/// Drives a [`Program`] one instruction at a time.
///
/// ```
/// use bf_trace::{Interpreter, Program, ScriptedInput};
///
/// let program = Program::parse("+++ print it: .").unwrap();
/// let mut bf = Interpreter::new(program);
/// let output = bf.run(&mut ScriptedInput::default()).unwrap();
/// assert_eq!(output, "\u{3}");
/// assert_eq!(bf.steps(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: Program,
    state: State,
    steps: usize,
    step_limit: Option<usize>,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            state: State::new(),
            steps: 0,
            step_limit: None,
        }
    }

    /// Abort with [`TraceError::StepLimitExceeded`] once `limit` instructions have run.
    pub fn with_step_limit(mut self, limit: Option<usize>) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.state.ip >= self.program.len()
    }

    /// Execute exactly one instruction. Does nothing once halted.
    pub fn step(&mut self, input: &mut dyn InputSource) -> Result<(), TraceError> {
        if self.is_halted() {
            return Ok(());
        }
        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                warn!(limit, ip = self.state.ip, "step limit reached");
                return Err(TraceError::StepLimitExceeded { limit });
            }
        }

        trace!(
            step = self.steps,
            ip = self.state.ip,
            ptr = self.state.tape.pointer(),
            cell = self.state.tape.current(),
            "step"
        );
        self.state.advance(&self.program, input)?;
        self.steps += 1;

        if self.is_halted() {
            debug!(steps = self.steps, cells = self.state.tape.len(), "program halted");
        }
        Ok(())
    }

    /// Take the character emitted by the last `.`, if it has not been taken yet.
    pub fn take_output(&mut self) -> Option<char> {
        if !self.state.output_pending {
            return None;
        }
        self.state.output_pending = false;
        Some(char::from(self.state.tape.current()))
    }

    /// Run to completion without rendering, returning everything emitted.
    pub fn run(&mut self, input: &mut dyn InputSource) -> Result<String, TraceError> {
        let mut output = String::new();
        while !self.is_halted() {
            self.step(input)?;
            output.extend(self.take_output());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;

    fn interpreter(code: &str) -> Interpreter {
        Interpreter::new(Program::parse(code).unwrap())
    }

    fn run(code: &str) -> (Interpreter, String) {
        let mut bf = interpreter(code);
        let output = bf.run(&mut ScriptedInput::default()).unwrap();
        (bf, output)
    }

    #[test]
    fn wrapping_addition() {
        let (bf, _) = run(&"+".repeat(256));
        assert_eq!(bf.state().tape.cells(), &[0]);
    }

    #[test]
    fn wrapping_subtraction() {
        let (bf, _) = run("-");
        assert_eq!(bf.state().tape.current(), 255);
    }

    #[test]
    fn fresh_cell_reads_zero() {
        let (bf, _) = run("+>");
        assert_eq!(bf.state().tape.pointer(), 1);
        assert_eq!(bf.state().tape.current(), 0);
        assert_eq!(bf.state().tape.cells(), &[1, 0]);
    }

    #[test]
    fn left_of_zero_is_an_error_and_leaves_state_alone() {
        let mut bf = interpreter("+<");
        let mut input = ScriptedInput::default();
        bf.step(&mut input).unwrap();
        let before = bf.state().clone();

        let result = bf.step(&mut input);
        assert!(matches!(result, Err(TraceError::PointerUnderflow { ip: 1 })));
        assert_eq!(bf.state(), &before);
        assert_eq!(bf.steps(), 1);
    }

    #[test]
    fn loop_on_zero_cell_is_skipped() {
        let (bf, output) = run("[-]");
        assert!(bf.is_halted());
        assert_eq!(bf.steps(), 1);
        assert_eq!(bf.state().tape.cells(), &[0]);
        assert!(output.is_empty());
    }

    #[test]
    fn skipped_loop_resumes_after_matching_bracket() {
        let (bf, _) = run("[[-]+]+");
        assert_eq!(bf.steps(), 2);
        assert_eq!(bf.state().tape.current(), 1);
    }

    #[test]
    fn output_is_captured_once_per_emit() {
        let (bf, output) = run("+++.");
        assert_eq!(output, "\u{3}");
        assert_eq!(bf.steps(), 4);
    }

    #[test]
    fn decrement_loop_runs_body_twice() {
        // + + [ - ] - ]
        let (bf, _) = run("++[-]");
        assert_eq!(bf.state().tape.current(), 0);
        assert_eq!(bf.steps(), 7);
    }

    #[test]
    fn loop_end_returns_to_instruction_after_loop_start() {
        let mut bf = interpreter("+[-]");
        let mut input = ScriptedInput::default();
        for _ in 0..3 {
            bf.step(&mut input).unwrap();
        }
        // `]` with cell 0 falls through.
        assert_eq!(bf.state().ip, 3);
        bf.step(&mut input).unwrap();
        assert!(bf.is_halted());

        let mut bf = interpreter("++[-]");
        for _ in 0..4 {
            bf.step(&mut input).unwrap();
        }
        // `]` with cell 1 jumps back onto `-`.
        assert_eq!(bf.state().ip, 4);
        bf.step(&mut input).unwrap();
        assert_eq!(bf.state().ip, 3);
    }

    #[test]
    fn take_output_is_a_single_slot() {
        let mut bf = interpreter("+.");
        let mut input = ScriptedInput::default();
        bf.step(&mut input).unwrap();
        assert_eq!(bf.take_output(), None);
        bf.step(&mut input).unwrap();
        assert!(bf.state().output_pending);
        assert_eq!(bf.take_output(), Some('\u{1}'));
        assert_eq!(bf.take_output(), None);
    }

    #[test]
    fn input_is_read_from_the_source() {
        let mut bf = interpreter(",.,.");
        let output = bf.run(&mut ScriptedInput::from("Z")).unwrap();
        // Second `,` hits end of input and stores 0.
        assert_eq!(output, "Z\u{0}");
    }

    #[test]
    fn hello_world() {
        let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
        let (_, output) = run(code);
        assert_eq!(output, "Hello World!\n");
    }

    #[test]
    fn step_limit_aborts_infinite_loop() {
        let mut bf = interpreter("+[]").with_step_limit(Some(50));
        let result = bf.run(&mut ScriptedInput::default());
        assert!(matches!(result, Err(TraceError::StepLimitExceeded { limit: 50 })));
        assert_eq!(bf.steps(), 50);
    }

    #[test]
    fn stepping_a_halted_program_is_a_no_op() {
        let (mut bf, _) = run("+");
        let before = bf.state().clone();
        bf.step(&mut ScriptedInput::default()).unwrap();
        assert_eq!(bf.state(), &before);
        assert_eq!(bf.steps(), 1);
    }

    #[test]
    fn empty_program_is_already_halted() {
        let (bf, output) = run("just a comment");
        assert!(bf.is_halted());
        assert_eq!(bf.steps(), 0);
        assert!(output.is_empty());
    }
}
