//! Error types for the `rxe` crate.

use thiserror::Error;

/// The result type for the `rxe` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the `rxe` crate.
#[derive(Error, Debug)]
pub struct Error {
    /// The source of the error.
    pub source: Box<ErrorKind>,
}

impl Error {
    /// Create a new `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// A combinator constructor was called with arguments that violate its contract, e.g.
    /// `repn` with a negative bound or `inter`/`compl`/`diff` applied to a non-charset operand.
    #[error("{constructor}: {message}")]
    InvalidConstruction {
        /// Name of the constructor that rejected its arguments.
        constructor: &'static str,
        /// Human readable description of the violation.
        message: String,
    },

    /// A search API was called with an out-of-range `pos`/`len` pair.
    #[error("{api}: {message}")]
    InvalidArgument {
        /// Name of the API that rejected its arguments.
        api: &'static str,
        /// Human readable description of the violation.
        message: String,
    },

    /// No match was found where the caller required one (`exec`, `Group::get`, ...).
    #[error("no match")]
    NotFound,
}

impl Error {
    pub(crate) fn invalid_construction(constructor: &'static str, message: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidConstruction {
            constructor,
            message: message.into(),
        })
    }

    pub(crate) fn invalid_argument(api: &'static str, message: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidArgument {
            api,
            message: message.into(),
        })
    }

    pub(crate) fn not_found() -> Self {
        Error::new(ErrorKind::NotFound)
    }

    /// True if this error represents a "no match" outcome rather than a malformed request.
    pub fn is_not_found(&self) -> bool {
        matches!(*self.source, ErrorKind::NotFound)
    }
}
