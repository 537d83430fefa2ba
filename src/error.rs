use std::fmt;

use thiserror::Error;

/// Which part of an encoded hash string failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Prefix,
    Cost,
    Salt,
    Digest,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Prefix => write!(f, "prefix"),
            Field::Cost => write!(f, "cost"),
            Field::Salt => write!(f, "salt"),
            Field::Digest => write!(f, "digest"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Cost factor missing, non-numeric or outside `4..=31`.
    #[error("invalid cost '{0}': expected an integer between 4 and 31")]
    Cost(String),

    /// Salt or hash string does not follow the `$2a$NN$...` grammar.
    #[error("invalid salt: bad {field} field ({reason})")]
    Salt { field: Field, reason: &'static str },

    /// The caller combined arguments in a way no entry point accepts.
    #[error("invalid arguments: {0}")]
    Argument(&'static str),

    #[error("no password given")]
    PasswordMissing,

    #[error("OS random generator unavailable")]
    Random,

    /// An asynchronous entry point was used outside a tokio runtime.
    #[error("invalid arguments: asynchronous call made outside an async runtime")]
    Runtime,
}

impl Error {
    pub(crate) fn salt(field: Field, reason: &'static str) -> Self {
        Error::Salt { field, reason }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
