//! PASERK `k4` key kinds and their serialized form.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use blake2::Blake2b;
use blake2::digest::Digest;
use blake2::digest::consts::U33;

use crate::error::PaserkError;
use crate::key_id::KeyId;

/// Length of a `k4.local` symmetric key.
pub const LOCAL_KEY_LENGTH: usize = 32;

/// Length of a `k4.secret` Ed25519 key (seed followed by public key).
pub const SECRET_KEY_LENGTH: usize = 64;

/// Length of a `k4.public` Ed25519 key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// BLAKE2b with a 264-bit digest, as used for PASERK key identifiers.
type Blake2b264 = Blake2b<U33>;

/// The three kinds of v4 keys that have a PASERK encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Symmetric key (`k4.local`).
    Local,
    /// Asymmetric secret key (`k4.secret`).
    Secret,
    /// Asymmetric public key (`k4.public`).
    Public,
}

impl KeyKind {
    /// All key kinds.
    pub const ALL: [Self; 3] = [Self::Local, Self::Secret, Self::Public];

    /// Returns the PASERK type prefix of the serialized key, e.g. `k4.public.`.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Local => "k4.local.",
            Self::Secret => "k4.secret.",
            Self::Public => "k4.public.",
        }
    }

    /// Returns the header of key identifiers for this kind, e.g. `k4.pid.`.
    #[must_use]
    pub const fn id_header(self) -> &'static str {
        match self {
            Self::Local => "k4.lid.",
            Self::Secret => "k4.sid.",
            Self::Public => "k4.pid.",
        }
    }

    /// Returns the raw key length in bytes.
    #[must_use]
    pub const fn key_length(self) -> usize {
        match self {
            Self::Local => LOCAL_KEY_LENGTH,
            Self::Secret => SECRET_KEY_LENGTH,
            Self::Public => PUBLIC_KEY_LENGTH,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Local => "k4.local",
            Self::Secret => "k4.secret",
            Self::Public => "k4.public",
        }
    }

    /// Finds the kind whose identifier header starts `id`.
    pub(crate) fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| id.starts_with(kind.id_header()))
    }
}

/// A v4 key together with its kind.
///
/// The byte length of each variant is fixed by its type, so encoding and
/// identifier derivation cannot fail.
///
/// # Example
///
/// ```
/// use sip_paserk::PaserkKey;
///
/// let key = PaserkKey::Public([0u8; 32]);
/// assert_eq!(key.encode(), "k4.public.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum PaserkKey {
    /// Symmetric key bytes.
    Local([u8; LOCAL_KEY_LENGTH]),
    /// Ed25519 secret key bytes (seed followed by public key).
    Secret([u8; SECRET_KEY_LENGTH]),
    /// Ed25519 public key bytes.
    Public([u8; PUBLIC_KEY_LENGTH]),
}

impl PaserkKey {
    /// Returns the kind of this key.
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::Local(_) => KeyKind::Local,
            Self::Secret(_) => KeyKind::Secret,
            Self::Public(_) => KeyKind::Public,
        }
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Local(bytes) | Self::Public(bytes) => bytes.as_slice(),
            Self::Secret(bytes) => bytes.as_slice(),
        }
    }

    /// Serializes the key as `k4.<kind>.<base64url(key)>`.
    #[must_use]
    pub fn encode(&self) -> String {
        let kind = self.kind();
        let mut out = String::with_capacity(kind.prefix().len() + 88);
        out.push_str(kind.prefix());
        URL_SAFE_NO_PAD.encode_string(self.as_bytes(), &mut out);
        out
    }

    /// Derives the PASERK key identifier (`k4.lid`, `k4.sid` or `k4.pid`).
    ///
    /// The identifier is the kind header followed by the base64url encoding
    /// of `BLAKE2b-264(header || encode())`.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        let header = self.kind().id_header();
        let digest = Blake2b264::new()
            .chain_update(header.as_bytes())
            .chain_update(self.encode().as_bytes())
            .finalize();

        let mut id = String::with_capacity(header.len() + 44);
        id.push_str(header);
        URL_SAFE_NO_PAD.encode_string(digest, &mut id);
        KeyId::from_derived(id, self.kind())
    }

    /// Parses any of the three `k4` PASERK serializations.
    ///
    /// # Errors
    ///
    /// Returns `PaserkError` if the prefix is unknown, the base64 is malformed,
    /// or the key has the wrong length for its kind.
    pub fn parse(s: &str) -> Result<Self, PaserkError> {
        let kind = KeyKind::ALL
            .into_iter()
            .find(|kind| s.starts_with(kind.prefix()))
            .ok_or(PaserkError::WrongPrefix { expected: "k4.local/secret/public" })?;

        match kind {
            KeyKind::Local => decode_key(s, kind).map(Self::Local),
            KeyKind::Secret => decode_key(s, kind).map(Self::Secret),
            KeyKind::Public => decode_key(s, kind).map(Self::Public),
        }
    }
}

impl fmt::Debug for PaserkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(_) => write!(f, "PaserkKey({})", self.encode()),
            // Only the identifier: never print secret material.
            Self::Local(_) | Self::Secret(_) => write!(f, "PaserkKey({})", self.key_id()),
        }
    }
}

/// Loads a `k4.public` key and returns its raw bytes.
///
/// # Errors
///
/// Returns `PaserkError::WrongPrefix` if `s` does not start with `k4.public.`,
/// `InvalidBase64` if the remainder is not unpadded base64url, and
/// `InvalidLength` if it does not decode to 32 bytes.
///
/// # Example
///
/// ```
/// let key = sip_paserk::parse_public("k4.public.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
/// assert_eq!(key, [0u8; 32]);
/// ```
pub fn parse_public(s: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], PaserkError> {
    decode_key(s, KeyKind::Public)
}

fn decode_key<const N: usize>(s: &str, kind: KeyKind) -> Result<[u8; N], PaserkError> {
    let rest = s.strip_prefix(kind.prefix()).ok_or(PaserkError::WrongPrefix {
        expected: kind.prefix(),
    })?;

    let raw = URL_SAFE_NO_PAD
        .decode(rest)
        .map_err(|e| PaserkError::InvalidBase64 {
            kind: kind.name(),
            reason: e.to_string(),
        })?;

    let actual = raw.len();
    raw.try_into().map_err(|_| PaserkError::InvalidLength {
        kind: kind.name(),
        expected: N,
        actual,
    })
}
