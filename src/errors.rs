use std::error::Error;
use std::fmt;

/// Error raised when the destination store cannot be opened, read or committed.
#[derive(Debug)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store Error: {}", self.0)
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError(error.to_string())
    }
}

/// Error raised when source data is missing or malformed.
///
/// Covers missing files, sheets and symbols as well as lookups that come up
/// empty when a value is required, e.g. scaling a unit whose capacity was
/// never imported.
#[derive(Debug)]
pub struct SourceError(pub String);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(error: std::io::Error) -> Self {
        SourceError(error.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(error: csv::Error) -> Self {
        SourceError(error.to_string())
    }
}

/// A single record the destination store refused to accept.
///
/// Rejections are non-fatal: the record is dropped and the rest of the batch
/// still gets imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection(pub String);

impl fmt::Display for ImportRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ImportRejection {}
