use std::io;

use thiserror::Error;

/// Represents the outer-level, user-facing errors of the quoting package.
///
/// Variants:
/// - `InvalidRoute`: The swap route is malformed (e.g. `path/fee length mismatch`). Raised before
///   any network I/O.
/// - `InvalidInput`: An address, fee, amount or decimals value could not be parsed or is out of
///   range.
/// - `FatalError`: There is a problem with the application setup, or a response could not be
///   decoded.
/// - `RecoverableError`: A call to the chain failed. Retrying at a later time may succeed, for
///   example if it failed due to a temporary network problem.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum QuoteError {
    #[error("Invalid route: {0}")]
    InvalidRoute(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Fatal error: {0}")]
    FatalError(String),
    #[error("Recoverable error: {0}")]
    RecoverableError(String),
}

impl From<io::Error> for QuoteError {
    fn from(err: io::Error) -> Self {
        QuoteError::FatalError(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::InvalidInput(err.to_string())
    }
}
