use std::fmt;

/// Errors raised while reading fragments or building chains.
#[derive(Debug)]
pub enum ChainError {
    /// Malformed record: wrong field count, non-numeric coordinate, unknown strand
    Input {
        /// The line number (1-based), 0 when unknown
        line: usize,
        message: String,
    },
    /// Degenerate geometry or non-finite score
    Validation {
        /// The line number (1-based), 0 when unknown
        line: usize,
        message: String,
    },
    /// Non-finite weights or scores reached the scorer
    Scoring(String),
    /// The exhaustive search hit one of its limits
    ResourceLimit(String),
    Io(std::io::Error),
}

impl ChainError {
    pub fn input(message: impl Into<String>) -> Self {
        ChainError::Input {
            line: 0,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ChainError::Validation {
            line: 0,
            message: message.into(),
        }
    }

    /// Attaches a line number to record-level errors.
    pub fn at_line(self, line_no: usize) -> Self {
        match self {
            ChainError::Input { message, .. } => ChainError::Input {
                line: line_no,
                message,
            },
            ChainError::Validation { message, .. } => ChainError::Validation {
                line: line_no,
                message,
            },
            other => other,
        }
    }

    /// Whether the caller may retry the group with the greedy builder.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ChainError::ResourceLimit(_))
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Input { line: 0, message } => write!(f, "Input error: {}", message),
            ChainError::Input { line, message } => {
                write!(f, "Input error at line {}: {}", line, message)
            }
            ChainError::Validation { line: 0, message } => {
                write!(f, "Validation error: {}", message)
            }
            ChainError::Validation { line, message } => {
                write!(f, "Validation error at line {}: {}", line, message)
            }
            ChainError::Scoring(msg) => write!(f, "Scoring error: {}", msg),
            ChainError::ResourceLimit(msg) => write!(f, "Resource limit exceeded: {}", msg),
            ChainError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err)
    }
}
