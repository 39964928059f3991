use std::time::Duration;

use crate::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    #[error("Process exited with code {0}")]
    ExitCode(i32),

    #[error("Process terminated by signal {0}")]
    Signal(i32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// Convert a finished subprocess result into a crate error, keeping a
/// missing program distinct from a program that ran and failed.
pub fn into_conversion_error(err: ProcessError) -> Error {
    match err {
        ProcessError::CommandNotFound(program) => {
            Error::ConversionUnavailable(format!("'{program}' is not installed"))
        }
        other => Error::Conversion(other.to_string()),
    }
}
