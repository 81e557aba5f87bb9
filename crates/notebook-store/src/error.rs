use std::num::ParseIntError;

use notebook_fs::LineFileError;
use thiserror::Error;

/// A stored line that does not decode into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid id {value:?}: {source}")]
    InvalidId {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown escape sequence \\{0}")]
    BadEscape(char),
    #[error("line ends in the middle of an escape sequence")]
    DanglingEscape,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] LineFileError),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("no ids left after {0}")]
    IdsExhausted(u64),
}

pub type Result<T> = std::result::Result<T, StoreError>;
