//! The render/step loop.

use std::io::Write;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::input::InputSource;
use crate::machine::Interpreter;
use crate::program::Program;
use crate::render::Renderer;

/// Alternates between drawing the interpreter state and executing one
/// instruction, pausing `delay` in between.
pub struct Tracer<W: Write, I: InputSource> {
    interpreter: Interpreter,
    renderer: Renderer,
    delay: Duration,
    out: W,
    input: I,
    output: String,
}

impl<W: Write, I: InputSource> Tracer<W, I> {
    pub fn new(program: Program, config: &TraceConfig, out: W, input: I) -> Self {
        Self {
            interpreter: Interpreter::new(program).with_step_limit(config.max_steps),
            renderer: Renderer::new(config),
            delay: config.delay,
            out,
            input,
            output: String::new(),
        }
    }

    /// Replace the renderer built from the config.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Output captured so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Run until the instruction pointer falls off the end, drawing a frame
    /// before every instruction and once more for the final state. Returns the
    /// collected output, which has also been written after the last frame.
    pub fn run(&mut self) -> Result<String, TraceError> {
        info!(
            instructions = self.interpreter.program().len(),
            delay_ms = self.delay.as_millis() as u64,
            "trace starting"
        );

        loop {
            self.output.extend(self.interpreter.take_output());
            self.renderer.frame(&mut self.out, &self.interpreter)?;
            if self.interpreter.is_halted() {
                break;
            }
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            self.interpreter.step(&mut self.input)?;
        }

        self.renderer.final_output(&mut self.out, &self.output)?;
        info!(
            steps = self.interpreter.steps(),
            output_len = self.output.chars().count(),
            "trace finished"
        );
        Ok(self.output.clone())
    }
}
