//! SIP token verification pipeline.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rusty_paseto::prelude::*;
use sip_paserk::KeyId;
use tracing::warn;

use crate::claims::{SIP_VERSION, SipClaims};
use crate::constants::{LOG_TOKEN_PREFIX_LENGTH, MAX_TOKEN_LENGTH, TOKEN_HEADER};
use crate::error::VerifyError;
use crate::key_store::KeyStore;
use crate::keys::VerifyingKey;

/// Verifies SIP tokens against a shared [`KeyStore`].
///
/// Verification runs these steps, stopping at the first failure:
///
/// 1. Read the footer without verifying the token
/// 2. Parse the signing key identifier from the footer
/// 3. Resolve the key through the store
/// 4. Check the signature and time claims
/// 5. Decode the claims
/// 6. Check the claims version
///
/// # Example
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use std::sync::Arc;
/// use sip_attestation::{KeyStore, SipVerifier, VerifyError};
///
/// let store = Arc::new(KeyStore::with_default_hosts().unwrap());
/// let verifier = SipVerifier::new(store);
///
/// let err = verifier.verify("v4.public.bm90LWEtdG9rZW4").await.unwrap_err();
/// assert!(matches!(err, VerifyError::MalformedToken { .. }));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SipVerifier {
    key_store: Arc<KeyStore>,
    version: u32,
}

impl SipVerifier {
    /// Creates a verifier that accepts [`SIP_VERSION`] claims.
    #[must_use]
    pub fn new(key_store: Arc<KeyStore>) -> Self {
        Self {
            key_store,
            version: SIP_VERSION,
        }
    }

    /// Sets the accepted claims version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Returns the key store.
    #[must_use]
    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.key_store
    }

    /// Returns the accepted claims version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Every rejection is logged at `warn` level.
    ///
    /// # Errors
    ///
    /// - `MalformedToken` if the token is not a `v4.public` token with footer
    /// - `MalformedFooter` if the footer does not name a key
    /// - `UntrustedKey` if no authority knows the key
    /// - `KeyUnavailable` if the key could not be resolved
    /// - `Rejected` if the signature or time claims are invalid
    /// - `VersionMismatch` if the claims carry another version
    /// - `MalformedClaims` if the claims cannot be decoded
    pub async fn verify(&self, token: &str) -> Result<SipClaims, VerifyError> {
        let token_prefix = token_prefix(token);

        let footer = untrusted_footer(token).inspect_err(|e| {
            warn!(token_prefix, error = %e, "SIP token parsing failed");
        })?;

        let kid = sip_paserk::parse_key_id_footer(&footer)
            .map_err(VerifyError::MalformedFooter)
            .inspect_err(|e| {
                warn!(token_prefix, error = %e, "SIP token footer parsing failed");
            })?;

        let key = self
            .key_store
            .get_public_key(&kid)
            .await
            .map_err(VerifyError::from)
            .inspect_err(|e| {
                warn!(token_prefix, kid = %kid, error = %e, "SIP key lookup failed");
            })?;

        self.verify_with_key(token, &footer, &key)
            .inspect_err(|e| log_rejection(token_prefix, &kid, e))
    }

    fn verify_with_key(
        &self,
        token: &str,
        footer: &str,
        key: &VerifyingKey,
    ) -> Result<SipClaims, VerifyError> {
        let payload = key
            .with_paseto_key(|paseto_key| {
                PasetoParser::<V4, Public>::default()
                    .set_footer(Footer::from(footer))
                    .parse(token, paseto_key)
            })
            .map_err(|e| VerifyError::Rejected {
                reason: e.to_string(),
            })?;

        // Checked before decoding so that other schemas report the version.
        if let Some(actual) = payload.get("_v").and_then(serde_json::Value::as_u64)
            && actual != u64::from(self.version)
        {
            return Err(VerifyError::VersionMismatch {
                expected: self.version,
                actual,
            });
        }

        let claims: SipClaims =
            serde_json::from_value(payload).map_err(|e| VerifyError::MalformedClaims {
                reason: e.to_string(),
            })?;

        if claims.version != self.version {
            return Err(VerifyError::VersionMismatch {
                expected: self.version,
                actual: u64::from(claims.version),
            });
        }
        Ok(claims)
    }
}

fn log_rejection(token_prefix: &str, kid: &KeyId, error: &VerifyError) {
    match error {
        VerifyError::VersionMismatch { expected, actual } => {
            warn!(token_prefix, kid = %kid, expected, actual, "SIP token has wrong version");
        }
        VerifyError::MalformedClaims { .. } => {
            warn!(token_prefix, kid = %kid, error = %error, "claims unmarshalling failed");
        }
        _ => {
            warn!(token_prefix, kid = %kid, error = %error, "SIP token verification failed");
        }
    }
}

/// Returns the decoded footer of a `v4.public` token without verifying it.
///
/// The footer names the signing key and has to be read before the key is
/// known. Nothing returned here is authenticated.
///
/// # Errors
///
/// Returns `VerifyError::MalformedToken` if the token is too long, lacks
/// the `v4.public.` header, has no footer, or the footer is not base64url
/// encoded UTF-8.
///
/// # Example
///
/// ```
/// use sip_attestation::untrusted_footer;
///
/// // payload "p", footer {"kid":"x"}
/// let footer = untrusted_footer("v4.public.cA.eyJraWQiOiJ4In0").unwrap();
/// assert_eq!(footer, r#"{"kid":"x"}"#);
/// ```
pub fn untrusted_footer(token: &str) -> Result<String, VerifyError> {
    let malformed = |reason: &str| VerifyError::MalformedToken {
        reason: reason.to_string(),
    };

    if token.len() > MAX_TOKEN_LENGTH {
        return Err(malformed("token exceeds maximum length"));
    }
    let body = token
        .strip_prefix(TOKEN_HEADER)
        .ok_or_else(|| malformed("token is not v4.public"))?;

    let (payload, footer) = body
        .split_once('.')
        .ok_or_else(|| malformed("token has no footer"))?;
    if payload.is_empty() {
        return Err(malformed("token has no payload"));
    }
    if footer.is_empty() || footer.contains('.') {
        return Err(malformed("token footer is empty or malformed"));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(footer)
        .map_err(|e| malformed(&format!("footer is not base64url: {e}")))?;
    String::from_utf8(bytes).map_err(|e| malformed(&format!("footer is not UTF-8: {e}")))
}

/// Leading characters of a token, for log records.
fn token_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(LOG_TOKEN_PREFIX_LENGTH)
        .map_or(token, |(i, _)| &token[..i])
}
