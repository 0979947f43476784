use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading, checking or tracing a program.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The program file could not be read.
    #[error("{}", load_reason(.path, .source))]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Malformed program: unmatched bracket {kind} at instruction {ip}")]
    Malformed { ip: usize, kind: UnmatchedBracketKind },

    /// The data pointer attempted to move left of cell 0.
    #[error("Pointer moved left of 0 at instruction {ip}")]
    PointerUnderflow { ip: usize },

    /// Reading a byte for `,` failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Writing a frame to the terminal failed.
    #[error("Render error: {0}")]
    Render(#[from] std::io::Error),

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// A delay that is negative, NaN or infinite.
    #[error("Invalid delay '{0}': expected a non-negative number of seconds")]
    InvalidDelay(String),
}

impl TraceError {
    /// Instruction index the error points at, when there is one.
    pub fn instruction(&self) -> Option<usize> {
        match self {
            TraceError::Malformed { ip, .. }
            | TraceError::PointerUnderflow { ip }
            | TraceError::Io { ip, .. } => Some(*ip),
            _ => None,
        }
    }
}

fn load_reason(path: &Path, source: &io::Error) -> String {
    match source.kind() {
        io::ErrorKind::NotFound => format!("File '{}' not found", path.display()),
        _ => format!("Could not read '{}': {source}", path.display()),
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}
