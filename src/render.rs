//! Text rendering of a single trace frame.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::config::TraceConfig;
use crate::machine::Interpreter;
use crate::tape::Tape;
use crate::theme;

/// Draws the tape table and the code view for an [`Interpreter`].
#[derive(Debug, Clone)]
pub struct Renderer {
    wrap_width: usize,
    color: bool,
    clear: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&TraceConfig::default())
    }
}

impl Renderer {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            wrap_width: config.wrap_width.max(1),
            color: config.color,
            clear: config.clear,
        }
    }

    /// A renderer that never clears the screen nor emits colour codes.
    pub fn plain(wrap_width: usize) -> Self {
        Self {
            wrap_width: wrap_width.max(1),
            color: false,
            clear: false,
        }
    }

    /// Write one full frame: status line, tape table and code view.
    pub fn frame<W: Write>(&self, out: &mut W, bf: &Interpreter) -> io::Result<()> {
        if self.clear {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        let state = bf.state();
        let status = format!(
            "Step: {} | IP: {} | Ptr: {} | Cell: {}{}",
            bf.steps(),
            state.ip,
            state.tape.pointer(),
            state.tape.current(),
            if bf.is_halted() { " | Halted" } else { "" },
        );
        writeln!(out, "{}", self.paint(theme::heading(), &status))?;
        write!(out, "{}", self.tape_table(&state.tape))?;
        write!(
            out,
            "{}",
            self.code_view(bf.program().source(), state.ip, bf.is_halted())
        )?;
        out.flush()
    }

    /// Write the collected program output after the run has finished.
    pub fn final_output<W: Write>(&self, out: &mut W, output: &str) -> io::Result<()> {
        write!(out, "\n{}\n\n{}", self.paint(theme::heading(), "Output:"), output)?;
        writeln!(out)?;
        out.flush()
    }

    /// A grid table with one column per allocated cell.
    ///
    /// The header row holds addresses (the current one as `[ n ]`), followed by
    /// a row of decimal values and a row of escaped characters.
    pub fn tape_table(&self, tape: &Tape) -> String {
        let columns: Vec<[String; 3]> = tape
            .cells()
            .iter()
            .enumerate()
            .map(|(addr, &byte)| {
                let header = if addr == tape.pointer() {
                    format!("[ {addr} ]")
                } else {
                    addr.to_string()
                };
                [header, byte.to_string(), escape_byte(byte)]
            })
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .map(|col| col.iter().map(|c| c.chars().count()).max().unwrap_or(0))
            .collect();

        let rule = |fill: char| {
            let mut line = String::from("+");
            for w in &widths {
                line.extend(std::iter::repeat_n(fill, w + 2));
                line.push('+');
            }
            line.push('\n');
            line
        };
        let row = |r: usize| {
            let mut line = String::from("|");
            for (addr, (col, w)) in columns.iter().zip(&widths).enumerate() {
                let cell = format!(" {:<w$} ", col[r], w = *w);
                if addr == tape.pointer() {
                    line.push_str(&self.paint(theme::pointer_cell(), &cell));
                } else {
                    line.push_str(&cell);
                }
                line.push('|');
            }
            line.push('\n');
            line
        };

        let mut table = rule('-');
        table.push_str(&row(0));
        table.push_str(&rule('='));
        table.push_str(&row(1));
        table.push_str(&rule('-'));
        table.push_str(&row(2));
        table.push_str(&rule('-'));
        table
    }

    /// The filtered source wrapped at the configured width, with an up-arrow
    /// under the instruction at `ip`. No arrow is drawn once halted.
    pub fn code_view(&self, code: &str, ip: usize, halted: bool) -> String {
        let mut view = format!("\n{}\n\n", self.paint(theme::heading(), "Code:"));
        let chars: Vec<char> = code.chars().collect();

        for (line_no, chunk) in chars.chunks(self.wrap_width).enumerate() {
            view.extend(chunk);
            view.push('\n');
            if !halted && ip / self.wrap_width == line_no {
                let _ = writeln!(
                    view,
                    "{}{}",
                    " ".repeat(ip % self.wrap_width),
                    self.paint(theme::code_arrow(), "\u{2191}")
                );
            }
        }
        view
    }

    fn paint(&self, style: nu_ansi_term::Style, text: &str) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Quote a cell value as a character: printable ASCII as-is, common control
/// characters as escapes, everything else as `\xHH`.
pub fn escape_byte(b: u8) -> String {
    match b {
        b'\\' => "'\\\\'".to_string(),
        b'\'' => "'\\''".to_string(),
        0x20..=0x7E => format!("'{}'", b as char),
        b'\n' => "'\\n'".to_string(),
        b'\r' => "'\\r'".to_string(),
        b'\t' => "'\\t'".to_string(),
        _ => format!("'\\x{:02x}'", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::program::Program;

    #[test]
    fn escapes_bytes_like_a_char_literal() {
        assert_eq!(escape_byte(b'A'), "'A'");
        assert_eq!(escape_byte(b'\n'), "'\\n'");
        assert_eq!(escape_byte(3), "'\\x03'");
        assert_eq!(escape_byte(255), "'\\xff'");
        assert_eq!(escape_byte(b'\''), "'\\''");
    }

    #[test]
    fn table_marks_the_current_cell() {
        let mut tape = Tape::new();
        for _ in 0..65 {
            tape.increment();
        }
        tape.move_right();
        tape.increment();

        let table = Renderer::plain(78).tape_table(&tape);
        let expected = "\
+-----+--------+
| 0   | [ 1 ]  |
+=====+========+
| 65  | 1      |
+-----+--------+
| 'A' | '\\x01' |
+-----+--------+
";
        assert_eq!(table, expected);
    }

    #[test]
    fn arrow_sits_under_the_current_instruction() {
        let view = Renderer::plain(78).code_view("++[-]", 2, false);
        assert_eq!(view, "\nCode:\n\n++[-]\n  \u{2191}\n");
    }

    #[test]
    fn code_wraps_and_arrow_follows_its_line() {
        let view = Renderer::plain(4).code_view("++++----..", 5, false);
        assert_eq!(view, "\nCode:\n\n++++\n----\n \u{2191}\n..\n");
    }

    #[test]
    fn halted_program_has_no_arrow() {
        let view = Renderer::plain(78).code_view("+.", 2, true);
        assert!(!view.contains('\u{2191}'));
    }

    #[test]
    fn frame_without_clear_has_no_escape_codes() {
        let mut bf = Interpreter::new(Program::parse("+>").unwrap());
        bf.step(&mut ScriptedInput::default()).unwrap();

        let mut out = Vec::new();
        Renderer::plain(78).frame(&mut out, &bf).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Step: 1 | IP: 1 | Ptr: 0 | Cell: 1\n"));
        assert!(text.contains("| [ 0 ]  |"));
        assert!(text.contains("+>\n \u{2191}\n"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn colored_frame_highlights_pointer() {
        let config = TraceConfig {
            clear: false,
            ..TraceConfig::default()
        };
        let bf = Interpreter::new(Program::parse("+").unwrap());
        let mut out = Vec::new();
        Renderer::new(&config).frame(&mut out, &bf).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{1b}'));
    }
}
