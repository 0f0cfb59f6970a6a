//! PASERK `k4` key serialization and key identifiers.
//!
//! This crate implements the subset of PASERK used to name the signing key
//! of a PASETO v4 token in its footer:
//!
//! - `k4.local.` / `k4.secret.` / `k4.public.` key serialization
//! - `k4.lid.` / `k4.sid.` / `k4.pid.` identifiers derived with BLAKE2b-264
//! - the `{"kid":"..."}` JSON footer carrying an identifier
//!
//! # Example
//!
//! ```rust
//! use sip_paserk::{PaserkKey, key_id_footer, parse_key_id_footer};
//!
//! let key = PaserkKey::Public([0u8; 32]);
//! assert_eq!(
//!     key.key_id().as_str(),
//!     "k4.pid.S_XQmeEwHbbvRmiyfXfHYpLGjXGzjTRSDoT1YtTakWFE"
//! );
//!
//! let footer = key_id_footer(&key);
//! assert_eq!(parse_key_id_footer(&footer).unwrap(), key.key_id());
//! ```
//!
//! # Identifier Derivation
//!
//! | Kind | Serialized prefix | Identifier header |
//! |------|-------------------|-------------------|
//! | Symmetric | `k4.local.` | `k4.lid.` |
//! | Ed25519 secret | `k4.secret.` | `k4.sid.` |
//! | Ed25519 public | `k4.public.` | `k4.pid.` |
//!
//! `id = header || base64url(BLAKE2b-264(header || serialized))`

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod key;
mod key_id;

pub use error::PaserkError;
pub use key::{
    KeyKind, LOCAL_KEY_LENGTH, PUBLIC_KEY_LENGTH, PaserkKey, SECRET_KEY_LENGTH, parse_public,
};
pub use key_id::{KEY_ID_DIGEST_LENGTH, KeyId, key_id_footer, parse_key_id_footer};

/// Serializes `key` as `k4.<kind>.<base64url(key)>`.
///
/// Shorthand for [`PaserkKey::encode`].
#[must_use]
pub fn encode(key: &PaserkKey) -> String {
    key.encode()
}

/// Derives the PASERK identifier of `key`.
///
/// Shorthand for [`PaserkKey::key_id`].
#[must_use]
pub fn key_id(key: &PaserkKey) -> KeyId {
    key.key_id()
}
