//! Global error handling for lmpack
//!
//! Run-level failures are represented by [`PackError`]. Failures tied to a
//! single file's content are [`ContentError`]s; those never abort a run and
//! are rendered as placeholder blocks instead.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Global error type for lmpack operations
#[derive(Error, Debug)]
pub enum PackError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for lmpack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Reasons a single file's content could not be emitted
#[derive(Error, Debug)]
pub enum ContentError {
    /// Opening or reading the file failed
    #[error("{source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bytes are not valid UTF-8
    #[error("{source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
}

impl ContentError {
    /// Path of the file that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            ContentError::Read { path, .. } | ContentError::Decode { path, .. } => path,
        }
    }
}

/// Creates a PackError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::PackError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Lets the binary keep an io::Result signature
impl From<PackError> for io::Error {
    fn from(err: PackError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
