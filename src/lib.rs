//! A tiny Brainfuck interpreter that shows its work.
//!
//! Programs run one instruction at a time. Before every instruction the
//! current memory tape and instruction pointer are drawn, so you can watch
//! loops spin and cells change.
//!
//! Features and behaviors:
//! - Any character outside `><+-.,[]` is ignored, so comments need no syntax.
//! - Loop brackets are matched before the first step; an unmatched `[` or `]`
//!   is reported as a malformed program and nothing runs.
//! - The tape starts as a single zero cell and grows by one zero cell each
//!   time the pointer moves past its end. It never shrinks.
//! - Cells wrap: `+` on 255 gives 0, `-` on 0 gives 255.
//! - Moving left of cell 0 is an error that stops the program.
//! - `,` reads one key press (or one byte of redirected stdin); on end of
//!   input the current cell is set to 0.
//! - `.` output is collected and printed once the program finishes.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_trace::{Program, TerminalInput, TraceConfig, Tracer};
//!
//! let program = Program::parse("++++++++[>++++++++<-]>+.").expect("brackets match");
//! let config = TraceConfig::default();
//! let mut tracer = Tracer::new(program, &config, std::io::stdout(), TerminalInput::new());
//! tracer.run().expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod machine;
pub mod program;
pub mod render;
pub mod tape;
pub mod theme;
pub mod tracer;

pub use config::TraceConfig;
pub use error::{TraceError, UnmatchedBracketKind};
pub use input::{InputSource, ScriptedInput, TerminalInput};
pub use machine::{Interpreter, State};
pub use program::{filter_source, loop_positions, Instruction, Program};
pub use render::Renderer;
pub use tape::Tape;
pub use tracer::Tracer;
