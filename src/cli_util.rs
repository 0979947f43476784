use std::io::{self, IsTerminal, Write};

use crate::error::TraceError;
use crate::theme;

/// Print a [`TraceError`] to stderr.
/// If `program` is `Some("bf-trace")`, the message is prefixed with "bf-trace: ".
///
/// Errors tied to an instruction also get a caret context window into `code`,
/// the filtered source the instruction indices refer to.
pub fn print_trace_error(program: Option<&str>, code: &str, err: &TraceError) {
    let msg = match program {
        Some(p) => format!("{p}: Error: {err}"),
        None => format!("Error: {err}"),
    };
    let msg = if io::stderr().is_terminal() {
        theme::error().paint(msg).to_string()
    } else {
        msg
    };

    match err.instruction() {
        Some(ip) => print_error_with_context(&msg, code, ip),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Process exit status for an error that stopped a run.
///
/// Ctrl+C read as a key press while `,` waits maps to 130, the same status the
/// SIGINT handler exits with.
pub fn exit_code(err: &TraceError) -> i32 {
    match err {
        TraceError::Io { source, .. } if source.kind() == io::ErrorKind::Interrupted => 130,
        TraceError::InvalidDelay(_) => 2,
        _ => 1,
    }
}

/// Print a concise error followed by a caret context window.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix}");
    eprint!("{}", error_context(code, pos));
    let _ = io::stderr().flush();
}

/// A short window of `code` around `pos` with a caret under it.
fn error_context(code: &str, pos: usize) -> String {
    const WINDOW_CHARS: usize = 32;

    let chars: Vec<char> = code.chars().collect();
    let start = pos.saturating_sub(WINDOW_CHARS);
    let end = (pos + WINDOW_CHARS + 1).min(chars.len());
    let slice: String = chars[start.min(end)..end].iter().collect();

    let underline = format!("{}^", " ".repeat(pos.saturating_sub(start)));
    format!("  {slice}\n  {underline}\n")
}
