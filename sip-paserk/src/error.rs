//! Error types for PASERK encoding and key identifiers.

use thiserror::Error;

/// Errors that can occur while decoding PASERK strings or key-id footers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaserkError {
    /// The string does not start with the expected PASERK type prefix.
    #[error("not a {expected} key")]
    WrongPrefix {
        /// The prefix that was expected, e.g. `k4.public.`
        expected: &'static str,
    },

    /// The key material is not valid unpadded base64url.
    #[error("failed to decode {kind} key: {reason}")]
    InvalidBase64 {
        /// PASERK type of the key being decoded
        kind: &'static str,
        /// Decoder error message
        reason: String,
    },

    /// The decoded key material has the wrong length for its kind.
    #[error("{kind} key must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// PASERK type of the key being decoded
        kind: &'static str,
        /// Required byte length
        expected: usize,
        /// Decoded byte length
        actual: usize,
    },

    /// The footer is not a JSON object of the expected shape.
    #[error("invalid key id footer: {reason}")]
    InvalidFooter {
        /// Parser error message
        reason: String,
    },

    /// The footer JSON does not carry a `kid` field.
    #[error("key id footer has no kid")]
    MissingKeyId,

    /// The identifier is not a `k4.lid`/`k4.sid`/`k4.pid` value.
    #[error("not a k4.lid/sid/pid key id")]
    InvalidKeyId,
}
