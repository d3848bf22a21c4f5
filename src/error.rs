//! # Errors
//!
//! Failure taxonomy for status list operations. Every operation fails
//! atomically: callers receive either a complete, internally consistent
//! result or one of these errors, never a partial result.

use thiserror::Error;

/// Error codes returned by status list operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied arguments that cannot be processed: missing
    /// type-specific options, a credential in an unsupported shape, or a
    /// malformed encoded list.
    #[error("{0}")]
    Validation(String),

    /// The requested proof format is not usable with the requested status
    /// list type. LD-signatures only exist for `StatusList2021`.
    #[error("Invalid proof format '{0}' for OAuthStatusList")]
    InvalidProofFormat(String),

    /// The index lies outside `[0, length)`. Indices are never wrapped or
    /// clamped.
    #[error("status list index {index} out of bounds for list of length {length}")]
    Range {
        /// The offending index.
        index: usize,
        /// The length of the list being addressed.
        length: usize,
    },

    /// The status value does not fit in the list's configured bit width.
    #[error("status value {value} does not fit in {bits} bit(s)")]
    InvalidStatus {
        /// The offending value.
        value: u8,
        /// Bits available per status.
        bits: u8,
    },

    /// The opaque credential string could not be classified as any supported
    /// envelope format. No fallback guess is made.
    #[error("unrecognized status list envelope: {0}")]
    UnrecognizedEnvelope(String),

    /// A failure raised by an external collaborator (signing, verification,
    /// persistence), propagated unchanged. No retry is attempted here.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Shorthand result type for status list operations.
pub type Result<T> = std::result::Result<T, Error>;
