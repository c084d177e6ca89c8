//! Error types for CodeLitmus core.

use std::{error::Error, fmt, io, str::Utf8Error};

/// Error type for CodeLitmus core operations.
#[derive(Debug)]
pub enum LitmusError {
    /// An underlying I/O error.
    Io(io::Error),
    /// Source bytes were not valid UTF-8.
    Encoding(Utf8Error),
    /// The source could not be parsed as Python.
    Parse {
        /// One-based line of the first syntax error.
        line: usize,
        /// One-based column of the first syntax error.
        column: usize,
    },
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for LitmusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Encoding(err) => write!(f, "invalid utf-8: {err}"),
            Self::Parse { line, column } => {
                write!(f, "invalid syntax at line {line}, column {column}")
            }
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for LitmusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::Parse { .. } | Self::Other(_) => None,
        }
    }
}

impl From<io::Error> for LitmusError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<Utf8Error> for LitmusError {
    fn from(value: Utf8Error) -> Self {
        Self::Encoding(value)
    }
}

/// Convenience result type for CodeLitmus core.
pub type Result<T> = std::result::Result<T, LitmusError>;

#[cfg(test)]
mod tests {
    use super::LitmusError;
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = LitmusError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn parse_error_formats_position() {
        let error = LitmusError::Parse { line: 3, column: 7 };
        assert_eq!(format!("{error}"), "invalid syntax at line 3, column 7");
    }

    #[test]
    fn other_error_formats_message() {
        let error = LitmusError::Other("analysis failed".to_string());
        assert_eq!(format!("{error}"), "analysis failed");
    }

    #[test]
    fn from_utf8_error_maps_variant() {
        let bytes = vec![0xff, 0xfe];
        let utf8 = std::str::from_utf8(&bytes).expect_err("invalid utf-8");
        let error: LitmusError = utf8.into();
        assert!(matches!(error, LitmusError::Encoding(_)));
        assert!(format!("{error}").starts_with("invalid utf-8"));
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: LitmusError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            LitmusError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }
}
