//! SIP token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slid::Slid36;

/// The claims schema version this crate understands.
pub const SIP_VERSION: u32 = 4;

/// Outcome of the item scan that produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationResult {
    /// The item was verified as genuine.
    Authentic,
    /// The item was identified as a counterfeit.
    Counterfeit,
    /// The scan could not reach a decision.
    Inconclusive,
}

/// Why a scan was not authentic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// No reason given.
    #[default]
    #[serde(rename = "")]
    None,
    /// The item is on a block list.
    Blacklisted,
    /// The item has not been activated.
    Inactive,
    /// The item's signature did not match.
    Signature,
    /// The item was voided.
    Void,
    /// The scan was taken from a screen.
    Display,
}

/// Geographic position of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// Claims carried by a verified SIP token.
///
/// Field names on the wire follow the token format (`_v`, `aud`, `exp`,
/// `iat`, `jti`, ...). The schema version, timestamps, `slid` and `result`
/// must be present; everything else defaults when absent.
///
/// # Example
///
/// ```
/// use sip_attestation::{SipClaims, VerificationResult};
///
/// let claims: SipClaims = serde_json::from_str(r#"{
///     "_v": 4,
///     "exp": "2030-01-01T00:00:00Z",
///     "iat": "2029-12-31T23:00:00Z",
///     "slid": "00abc",
///     "result": "AUTHENTIC"
/// }"#).unwrap();
///
/// assert_eq!(claims.slid.as_str(), "ABC");
/// assert_eq!(claims.result, VerificationResult::Authentic);
/// assert!(claims.is_authentic());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipClaims {
    /// Claims schema version
    #[serde(rename = "_v")]
    pub version: u32,
    /// Intended recipient of the token
    #[serde(rename = "aud", default)]
    pub audience: String,
    /// When the token expires
    #[serde(rename = "exp", with = "crate::rfc3339")]
    pub expiration: DateTime<Utc>,
    /// When the token was issued
    #[serde(rename = "iat", with = "crate::rfc3339")]
    pub issued_at: DateTime<Utc>,
    /// Identifier of the scan session
    #[serde(rename = "jti", default)]
    pub session_id: String,
    /// Scanned item identifier, canonicalized
    pub slid: Slid36,
    /// Global trade item number, if the item has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    /// Scan outcome
    pub result: VerificationResult,
    /// Reason accompanying a non-authentic result
    #[serde(default)]
    pub reason: Reason,
    /// Where the scan took place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Opaque external references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extrefs: Vec<serde_json::Value>,
}

impl SipClaims {
    /// Returns true if the scan result is [`VerificationResult::Authentic`].
    #[must_use]
    pub fn is_authentic(&self) -> bool {
        self.result == VerificationResult::Authentic
    }

    /// Returns true if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}
