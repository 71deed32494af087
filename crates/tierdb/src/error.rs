use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tierdb_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use tierdb_primitives::JsonValueError;
use tierdb_schema::node::NodeError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Conflict => ErrorKind::Conflict,
            ErrorClass::NotFound => ErrorKind::NotFound,
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::InvariantViolation => ErrorKind::Invalid,
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<NodeError> for Error {
    fn from(err: NodeError) -> Self {
        Self::new(ErrorKind::Invalid, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<JsonValueError> for Error {
    fn from(err: JsonValueError) -> Self {
        Self::new(ErrorKind::Invalid, ErrorOrigin::Contents, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Conflict,
    Internal,
    Invalid,
    NotFound,
    Unsupported,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Contents,
    Insert,
    Populate,
    Schema,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Insert => Self::Insert,
            CoreErrorOrigin::Populate => Self::Populate,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}
