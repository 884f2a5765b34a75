//! Error taxonomy for the ingestion pipeline
//!
//! Every error terminates at the notification surface; the pipeline never
//! lets one escape unhandled, and none is swallowed without a logged
//! diagnostic plus a user-visible message.

use thiserror::Error;

/// Pre-upload validation failures
///
/// The two kinds are distinct so callers (and tests) can tell which rule
/// fired; the upload never starts on either.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// File extension is not in the accepted set
    #[error("Unsupported file extension '{extension}' (accepted: {accepted})")]
    Extension {
        extension: String,
        accepted: String,
    },

    /// File exceeds the configured size ceiling
    #[error("File is {size} bytes, exceeding the {limit}-byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// Upload transport failures
///
/// A failed upload surfaces immediately; retry is a user-initiated
/// re-submission, never an internal loop (the batch endpoint is not
/// idempotent).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, or timeout failure before any response
    #[error("Upload request failed: {0}")]
    Network(String),

    /// Non-success HTTP status; message comes from the structured error
    /// body when parseable, otherwise a synthesized generic one
    #[error("Server rejected the upload ({status}): {message}")]
    Http { status: u16, message: String },

    /// Could not read the file to upload
    #[error("Could not read file: {0}")]
    File(#[from] std::io::Error),
}

/// Batch response interpretation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// Response did not match the expected shape; never treated as a
    /// zero-error success
    #[error("Malformed import response: {0}")]
    MalformedResponse(String),
}

/// Umbrella error for one pipeline run
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    /// Shared infrastructure error
    #[error("Common error: {0}")]
    Common(#[from] titres_common::Error),
}

/// Result type for pipeline operations
pub type IngestResult<T> = Result<T, IngestError>;
