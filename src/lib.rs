//! Verifier for SIP attestation tokens.
//!
//! A SIP token is a PASETO v4.public token issued after a product scan. It
//! carries the scan outcome for one item, signed with an Ed25519 key whose
//! PASERK identifier sits in the token footer. This crate resolves that key
//! from a trust store, verifies the token and exposes its claims, either
//! directly through [`SipVerifier`] or as tower middleware through
//! [`SipLayer`].
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() {
//! use std::sync::Arc;
//! use sip_attestation::{KeyStore, KeyStoreConfig, SipVerifier, VerifyError};
//!
//! let store = KeyStore::new(KeyStoreConfig::default().with_hosts(Vec::<String>::new())).unwrap();
//! let verifier = SipVerifier::new(Arc::new(store));
//!
//! // {"kid":"k4.pid.S_XQmeEwHbbvRmiyfXfHYpLGjXGzjTRSDoT1YtTakWFE"}
//! let token = "v4.public.cA.eyJraWQiOiJrNC5waWQuU19YUW1lRXdIYmJ2Um1peWZYZkhZcExHalhHempUUlNEb1QxWXRUYWtXRkUifQ";
//!
//! let err = verifier.verify(token).await.unwrap_err();
//! assert!(matches!(err, VerifyError::UntrustedKey(_)));
//! assert_eq!(err.status(), http::StatusCode::FORBIDDEN);
//! # }
//! ```
//!
//! # Verification Outcomes
//!
//! | Failure | Error | HTTP status |
//! |---------|-------|-------------|
//! | No token on a required route | `MissingToken` | 400 |
//! | Not a `v4.public` token with footer | `MalformedToken` | 400 |
//! | Footer names no key | `MalformedFooter` | 400 |
//! | No authority knows the key | `UntrustedKey` | 403 |
//! | Key could not be fetched | `KeyUnavailable` | 503 |
//! | Bad signature, expired | `Rejected` | 403 |
//! | Claims do not decode | `MalformedClaims` | 500 |
//! | Wrong `_v` | `VersionMismatch` | 400 |
//!
//! Clients only ever see [`VerifyError::public_message`]; the detailed cause
//! is logged with `tracing`.
//!
//! # Key Resolution
//!
//! [`KeyStore`] caches keys forever. On a miss it asks each configured
//! authority in turn for `GET /v4/<kid>` and trusts the first key whose
//! derived identifier equals `<kid>`.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod claims;
mod constants;
mod error;
mod key_store;
mod keys;
mod middleware;
pub mod prelude;
pub mod rfc3339;
mod slid;
mod verifier;

pub use claims::{Location, Reason, SIP_VERSION, SipClaims, VerificationResult};
pub use constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_FETCH_TIMEOUT, DEFAULT_KEY_HOSTS, DEFAULT_KEY_SCHEME,
    DEFAULT_QUERY_PARAM, MAX_TOKEN_LENGTH, TOKEN_HEADER,
};
pub use error::{KeyError, KeyStoreError, SlidError, VerifyError};
pub use key_store::{KeyStore, KeyStoreConfig};
pub use keys::VerifyingKey;
pub use middleware::{
    SipContext, SipLayer, SipLayerConfig, SipService, SipServiceFuture, claims,
};
pub use sip_paserk::{KeyId, KeyKind, PaserkError, PaserkKey};
pub use slid::Slid36;
pub use verifier::{SipVerifier, untrusted_footer};
