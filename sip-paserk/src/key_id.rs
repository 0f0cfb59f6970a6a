//! PASERK key identifiers and the `{"kid": ...}` token footer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PaserkError;
use crate::key::{KeyKind, PaserkKey};

/// Length of the base64url-encoded BLAKE2b-264 digest in an identifier.
pub const KEY_ID_DIGEST_LENGTH: usize = 44;

/// A validated PASERK key identifier such as `k4.pid.S_XQmeEw...`.
///
/// Identifiers are content-addressed: two equal identifiers name the same
/// key kind and the same key bytes.
///
/// # Example
///
/// ```
/// use sip_paserk::{KeyId, KeyKind};
///
/// let id: KeyId = "k4.pid.S_XQmeEwHbbvRmiyfXfHYpLGjXGzjTRSDoT1YtTakWFE".parse().unwrap();
/// assert_eq!(id.kind(), KeyKind::Public);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId {
    id: String,
    kind: KeyKind,
}

impl KeyId {
    /// Parses an identifier, accepting only `k4.lid.`, `k4.sid.` and `k4.pid.`
    /// followed by a 44-character base64url digest.
    ///
    /// # Errors
    ///
    /// Returns `PaserkError::InvalidKeyId` for any other input.
    pub fn parse(s: &str) -> Result<Self, PaserkError> {
        let kind = KeyKind::from_id(s).ok_or(PaserkError::InvalidKeyId)?;
        let digest = &s[kind.id_header().len()..];
        let well_formed = digest.len() == KEY_ID_DIGEST_LENGTH
            && digest
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !well_formed {
            return Err(PaserkError::InvalidKeyId);
        }
        Ok(Self {
            id: s.to_string(),
            kind,
        })
    }

    pub(crate) fn from_derived(id: String, kind: KeyKind) -> Self {
        Self { id, kind }
    }

    /// Returns the key kind named by the identifier header.
    #[must_use]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Returns the base64url digest without the `k4.?id.` header.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.id[self.kind.id_header().len()..]
    }

    /// Returns true if this identifier was derived from `key`.
    #[must_use]
    pub fn matches(&self, key: &PaserkKey) -> bool {
        key.key_id() == *self
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for KeyId {
    type Err = PaserkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyId {
    type Error = PaserkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.id
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct Footer {
    kid: Option<String>,
}

/// Wraps the key identifier of `key` in the JSON footer `{"kid":"..."}`.
///
/// Identifiers only contain base64url characters and dots, so no escaping
/// is needed.
///
/// # Example
///
/// ```
/// use sip_paserk::{PaserkKey, key_id_footer};
///
/// let footer = key_id_footer(&PaserkKey::Local([0u8; 32]));
/// assert_eq!(footer, r#"{"kid":"k4.lid.bqltbNc4JLUAmc9Xtpok-fBuI0dQN5_m3CD9W_nbh559"}"#);
/// ```
#[must_use]
pub fn key_id_footer(key: &PaserkKey) -> String {
    format!(r#"{{"kid":"{}"}}"#, key.key_id())
}

/// Extracts the key identifier from a `{"kid":"..."}` token footer.
///
/// # Errors
///
/// - `InvalidFooter` if `s` is not a JSON object
/// - `MissingKeyId` if the object has no `kid`
/// - `InvalidKeyId` if `kid` is not a `k4.lid`/`k4.sid`/`k4.pid` identifier
pub fn parse_key_id_footer(s: &str) -> Result<KeyId, PaserkError> {
    let footer: Footer = serde_json::from_str(s).map_err(|e| PaserkError::InvalidFooter {
        reason: e.to_string(),
    })?;
    let kid = footer.kid.ok_or(PaserkError::MissingKeyId)?;
    KeyId::parse(&kid)
}
