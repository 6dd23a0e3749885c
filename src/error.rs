//! Error types for the meter protocol and display.

use std::io;

use thiserror::Error;

/// Errors raised while consuming the input stream.
#[derive(Debug, Error)]
pub enum MeterError {
    /// The first line is not a non-empty JSON array of strings.
    #[error("malformed declaration: {0}")]
    MalformedDeclaration(String),

    /// A value frame contains a token that is not a number.
    #[error("malformed value frame: token {position} ({token:?}) is not a number")]
    MalformedValueFrame { position: usize, token: String },

    /// The renderer could not create or draw the display.
    #[error("display error: {0}")]
    Render(#[from] io::Error),
}

impl MeterError {
    /// Whether the process can keep running after this error.
    ///
    /// Only a bad value frame is recoverable: the frame is dropped and the
    /// meters keep their previous fractions.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MeterError::MalformedValueFrame { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_frame_errors_are_recoverable() {
        let err = MeterError::MalformedValueFrame {
            position: 1,
            token: "abc".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "malformed value frame: token 1 (\"abc\") is not a number"
        );
    }

    #[test]
    fn test_declaration_and_render_errors_are_fatal() {
        assert!(MeterError::MalformedDeclaration("empty".into()).is_fatal());
        let io_err = io::Error::new(io::ErrorKind::Other, "no tty");
        assert!(MeterError::from(io_err).is_fatal());
    }
}
