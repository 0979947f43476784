use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use bf_trace::cli_util::{exit_code, print_trace_error};
use bf_trace::config::parse_delay;
use bf_trace::logging::init_logging;
use bf_trace::{filter_source, Program, TerminalInput, TraceConfig, TraceError, Tracer};
use clap::Parser;
use crossterm::{cursor::Show, execute, terminal::disable_raw_mode};
use tracing::debug;

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS] <FILE> [DELAY]   # Trace the Brainfuck program in FILE

Arguments:
  FILE    Brainfuck source; every character outside ><+-.,[] is ignored
  DELAY   Seconds to pause between steps, fractions allowed (default 1)

Options:
  --max-steps, -s <N>   Abort after N instructions (fallback BF_TRACE_MAX_STEPS)
  --width,     -w <N>   Wrap the code view at N characters (default 78)
  --no-clear            Do not clear the screen between frames
  --no-color            Do not highlight the current cell and instruction
  --help,      -h       Show this help

Notes:
- Input (`,`) waits for a single key press; Ctrl+D is end of input (cell set to 0).
- DELAY falls back to BF_TRACE_DELAY, then `delay` in the [trace] section
  of $XDG_CONFIG_HOME/bf-trace.toml.
- Set RUST_LOG=bf_trace=trace to log every step to stderr.

Examples:
- Watch a program at half a second per step:
    {0} ./hello.bf 0.5
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(
    name = "bf-trace",
    disable_help_flag = true,
    disable_help_subcommand = true,
    allow_negative_numbers = true
)]
struct Cli {
    /// Brainfuck source file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Seconds between steps
    #[arg(value_name = "DELAY")]
    delay: Option<String>,

    /// Abort after N instructions
    #[arg(short = 's', long = "max-steps", value_name = "N")]
    max_steps: Option<usize>,

    /// Wrap the code view at N characters
    #[arg(short = 'w', long = "width", value_name = "N")]
    width: Option<usize>,

    /// Do not clear the screen between frames
    #[arg(long = "no-clear")]
    no_clear: bool,

    /// Do not highlight the current cell and instruction
    #[arg(long = "no-color")]
    no_color: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

/// Flags -> env -> config file -> defaults.
fn resolve_config(program: &str, cli: &Cli) -> Result<TraceConfig, TraceError> {
    let mut config = TraceConfig::load();
    if let Some(delay) = cli.delay.as_deref() {
        config.delay = parse_delay(delay)?;
    }
    if let Some(n) = cli.max_steps {
        config.max_steps = Some(n);
    }
    if let Some(w) = cli.width {
        config.wrap_width = w.max(1);
    }
    // Escape codes only make sense on a terminal.
    let tty = io::stdout().is_terminal();
    config.clear &= tty && !cli.no_clear;
    config.color &= tty && !cli.no_color;
    debug!(program, ?config, "resolved config");
    Ok(config)
}

fn run(program: &str, path: PathBuf, cli: &Cli) -> i32 {
    let config = match resolve_config(program, cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return exit_code(&e);
        }
    };

    let source = match fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(source) => {
            print_trace_error(Some(program), "", &TraceError::Load { path, source });
            return 1;
        }
    };
    let parsed = match Program::parse(&source) {
        Ok(p) => p,
        Err(err) => {
            print_trace_error(Some(program), &filter_source(&source), &err);
            return exit_code(&err);
        }
    };
    let code = parsed.source().to_string();

    // Install SIGINT (ctrl+c) handler to restore the terminal and exit immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), Show);
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let stdout = io::stdout();
    let mut tracer = Tracer::new(parsed, &config, stdout.lock(), TerminalInput::new());
    match tracer.run() {
        Ok(_) => 0,
        Err(err) => {
            print_trace_error(Some(program), &code, &err);
            exit_code(&err)
        }
    }
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf-trace"));

    let cli = Cli::parse();

    if cli.help {
        usage_and_exit(&program, 0);
    }
    let Some(path) = cli.file.clone() else {
        usage_and_exit(&program, 2);
    };

    init_logging();

    let code = run(&program, path, &cli);
    std::process::exit(code);
}
