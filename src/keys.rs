//! Ed25519 public keys trusted for SIP token verification.

use ed25519_dalek::VerifyingKey as DalekVerifyingKey;
use rusty_paseto::prelude::{Key, PasetoAsymmetricPublicKey, Public, V4};
use sip_paserk::{KeyId, PaserkKey};

use crate::error::KeyError;

/// A public key for validating SIP tokens.
///
/// Wraps an Ed25519 public key. The key identifier is always derived from
/// the key bytes, never stored alongside them.
///
/// # Example
///
/// ```
/// use sip_attestation::VerifyingKey;
///
/// let key = VerifyingKey::from_paserk(
///     "k4.public.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
/// ).unwrap();
/// assert_eq!(
///     key.key_id().as_str(),
///     "k4.pid.S_XQmeEwHbbvRmiyfXfHYpLGjXGzjTRSDoT1YtTakWFE",
/// );
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: DalekVerifyingKey,
}

impl VerifyingKey {
    /// Creates a verifying key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidPoint` if the bytes do not encode a point on
    /// the Ed25519 curve.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        DalekVerifyingKey::from_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| KeyError::InvalidPoint {
                reason: e.to_string(),
            })
    }

    /// Loads a `k4.public.` PASERK string.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Paserk` if the string is not a well-formed
    /// `k4.public` key, or `KeyError::InvalidPoint` if the bytes are not a
    /// valid Ed25519 key.
    pub fn from_paserk(s: &str) -> Result<Self, KeyError> {
        let bytes = sip_paserk::parse_public(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Returns the `k4.public.` serialization of this key.
    #[must_use]
    pub fn to_paserk(&self) -> String {
        self.as_paserk().encode()
    }

    /// Derives the `k4.pid.` identifier of this key.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        self.as_paserk().key_id()
    }

    fn as_paserk(&self) -> PaserkKey {
        PaserkKey::Public(self.to_bytes())
    }

    /// Runs `f` with this key in the form the token library expects.
    pub(crate) fn with_paseto_key<T>(
        &self,
        f: impl FnOnce(&PasetoAsymmetricPublicKey<'_, V4, Public>) -> T,
    ) -> T {
        let key_bytes = self.to_bytes();
        let key_wrapper = Key::<32>::from(&key_bytes);
        let paseto_key = PasetoAsymmetricPublicKey::<V4, Public>::from(&key_wrapper);
        f(&paseto_key)
    }
}

impl From<DalekVerifyingKey> for VerifyingKey {
    fn from(inner: DalekVerifyingKey) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", self.key_id())
    }
}
