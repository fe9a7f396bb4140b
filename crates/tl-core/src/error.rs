//! Base error type for the `tl-*` crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlError {
    #[error("unknown light state {0:?}")]
    UnknownState(String),
}

/// Shorthand result type for fallible `tl-core` operations.
pub type TlResult<T> = Result<T, TlError>;
