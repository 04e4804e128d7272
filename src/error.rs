use thiserror::Error as ThisError;

use crate::validator::ValidationError;

/// The error type for shell link parsing errors.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("An IO error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a shell link: {0}")]
    NotAShellLink(ValidationError),

    #[error("truncated header: need {needed} bytes at 0x{needed_pos:x} but only {available} available", needed_pos = pos)]
    TruncatedHeader {
        pos: usize,
        needed: usize,
        available: usize,
    },

    #[error("truncated string data: need {needed} bytes at 0x{pos:x} but only {available} available")]
    TruncatedStringData {
        pos: usize,
        needed: usize,
        available: usize,
    },

    #[error("truncated read: need {needed} bytes at 0x{pos:x} but only {available} available")]
    Truncated {
        pos: usize,
        needed: usize,
        available: usize,
    },
}
