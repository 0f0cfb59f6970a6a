//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use sip_attestation::prelude::*;
//!
//! let slid = Slid36::parse("abc").unwrap();
//! assert_eq!(slid.as_str(), "ABC");
//! ```

pub use crate::{
    // Verification
    SipClaims, SipVerifier, VerificationResult, Reason, Location, SIP_VERSION,
    // Keys
    KeyId, KeyStore, KeyStoreConfig, VerifyingKey,
    // Middleware
    SipContext, SipLayer, SipLayerConfig, claims,
    // Identifiers
    Slid36,
    // Errors
    KeyError, KeyStoreError, PaserkError, SlidError, VerifyError,
};
