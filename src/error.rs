//! Error types for key handling, key resolution and token verification.

use http::StatusCode;
use sip_paserk::{KeyId, PaserkError};
use thiserror::Error;

/// Errors for Ed25519 public key construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The PASERK string could not be decoded.
    #[error("invalid PASERK public key: {0}")]
    Paserk(#[from] PaserkError),

    /// The bytes are not a valid Ed25519 curve point.
    #[error("invalid Ed25519 public key: {reason}")]
    InvalidPoint {
        /// Description of the key error
        reason: String,
    },
}

/// Errors for SLID canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlidError {
    /// Input is not a base-36 integer that fits in 64 bits.
    #[error("failed to parse SLID '{input}' as base36: {reason}")]
    NotBase36 {
        /// The rejected input
        input: String,
        /// Parser error message
        reason: String,
    },

    /// Input is zero or negative.
    #[error("SLID '{input}' is not a positive 64-bit integer")]
    NotPositive {
        /// The rejected input
        input: String,
    },
}

/// Errors from the trust store and its remote key authorities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// No configured authority knows the key.
    #[error("no such SIPv4 key: {kid}")]
    NoSuchKey {
        /// The identifier that was looked up
        kid: KeyId,
    },

    /// The authority could not be reached or did not answer in time.
    #[error("failed to get key from {host}: {reason}")]
    Transport {
        /// Authority host
        host: String,
        /// Transport error message
        reason: String,
    },

    /// The authority answered with a status other than 200 or 404.
    #[error("non-ok HTTP response code {status} from {host}")]
    Status {
        /// Authority host
        host: String,
        /// HTTP status code
        status: u16,
    },

    /// The authority returned a body that is not a `k4.public` key.
    #[error("failed to parse public key from {host}: {reason}")]
    InvalidKey {
        /// Authority host
        host: String,
        /// Parse error message
        reason: String,
    },

    /// The authority returned a key whose identifier differs from the request.
    #[error("key served by {host} does not match {kid}")]
    KeyMismatch {
        /// Authority host
        host: String,
        /// The identifier that was requested
        kid: KeyId,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build key store HTTP client: {reason}")]
    Client {
        /// Builder error message
        reason: String,
    },
}

impl KeyStoreError {
    /// Returns true if the key is unknown, as opposed to unreachable.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchKey { .. })
    }
}

/// Reasons a SIP token is rejected.
///
/// Each variant maps to one HTTP outcome via [`VerifyError::status`]. The
/// `Display` form carries the detailed cause for logs; callers outside the
/// trust boundary only ever see [`VerifyError::public_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The request carries no token and one is required.
    #[error("missing {param} query parameter")]
    MissingToken {
        /// Name of the query parameter
        param: String,
    },

    /// The token is not a structurally valid `v4.public` token with footer.
    #[error("SIP token parsing failed: {reason}")]
    MalformedToken {
        /// Description of the format error
        reason: String,
    },

    /// The footer does not name a key.
    #[error("SIP token footer parsing failed: {0}")]
    MalformedFooter(#[source] PaserkError),

    /// No authority knows the signing key.
    #[error("SIP key not trusted: {0}")]
    UntrustedKey(#[source] KeyStoreError),

    /// The signing key could not be resolved.
    #[error("could not retrieve SIPv4 key: {0}")]
    KeyUnavailable(#[source] KeyStoreError),

    /// The signature or the token's time claims were rejected.
    #[error("SIP token verification failed: {reason}")]
    Rejected {
        /// Token library error message
        reason: String,
    },

    /// The verified payload is not a valid claims object.
    #[error("claims unmarshalling failed: {reason}")]
    MalformedClaims {
        /// Description of the parsing error
        reason: String,
    },

    /// The claims carry an unsupported schema version.
    #[error("SIP token has wrong version: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version supported by the verifier
        expected: u32,
        /// Version found in the claims
        actual: u64,
    },
}

impl VerifyError {
    /// Returns the HTTP status a request rejected with this error receives.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken { .. }
            | Self::MalformedToken { .. }
            | Self::MalformedFooter(_)
            | Self::VersionMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::UntrustedKey(_) | Self::Rejected { .. } => StatusCode::FORBIDDEN,
            Self::KeyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::MalformedClaims { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message shown to the caller, without internal detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingToken { param } => format!(
                "This server serves responses for Authentic Vision Mobile SDK applications \
                 and cannot be used directly. The {param} query parameter is required."
            ),
            Self::MalformedToken { .. } => "SIP token parsing failed".to_string(),
            Self::MalformedFooter(_) => "SIP token footer parsing failed".to_string(),
            Self::UntrustedKey(_) => "SIP key not trusted".to_string(),
            Self::KeyUnavailable(_) => "SIP key unavailable".to_string(),
            Self::Rejected { .. } | Self::MalformedClaims { .. } => "SIP token invalid".to_string(),
            Self::VersionMismatch { .. } => "SIP token has wrong version".to_string(),
        }
    }
}

impl From<KeyStoreError> for VerifyError {
    fn from(err: KeyStoreError) -> Self {
        if err.is_not_found() {
            Self::UntrustedKey(err)
        } else {
            Self::KeyUnavailable(err)
        }
    }
}
