use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when parsing a single armored block or scanning
/// a bundle.
///
/// A block must carry exactly one begin/end marker pair with one of the
/// five recognized labels, and its body must be valid base64.
#[derive(Debug, Error)]
pub enum Error {
    /// More than one begin marker found in a single-block parse
    #[error("more than one PEM block found")]
    MultipleBlocks,

    /// No begin marker found, or the marker label is not recognized
    #[error("unknown PEM type")]
    UnknownType,

    /// The block body is not valid base64
    #[error("base64 decode: {0}")]
    Base64Decode(#[from] DecodeError),

    /// Underlying stream failure while scanning a bundle
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
