//! Tower middleware that verifies SIP tokens on incoming HTTP requests.
//!
//! [`SipLayer`] wraps an inner service with [`SipService`]. For each request
//! the service:
//!
//! 1. reads the token from the query string (`av_sip4` by default)
//! 2. verifies it with a [`SipVerifier`](crate::SipVerifier)
//! 3. on success inserts a [`SipContext`] into the request extensions and
//!    calls the inner service
//! 4. on failure answers with a plain-text error and never calls the inner
//!    service
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tower::ServiceBuilder;
//! use sip_attestation::{KeyStore, SipLayer};
//!
//! let store = Arc::new(KeyStore::with_default_hosts()?);
//! let service = ServiceBuilder::new()
//!     .layer(SipLayer::new(store))
//!     .service(my_handler);
//! ```
//!
//! Handlers read the verified claims with [`claims`]:
//!
//! ```rust,ignore
//! if let Some(claims) = sip_attestation::claims(&req) {
//!     println!("scanned item {}", claims.slid);
//! }
//! ```

mod layer;
mod service;

use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use layer::SipLayer;
pub use service::{SipService, SipServiceFuture};

use crate::claims::{SIP_VERSION, SipClaims};
use crate::constants::DEFAULT_QUERY_PARAM;

/// Configuration for [`SipLayer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SipLayerConfig {
    /// Query parameter carrying the token.
    pub query_param: String,
    /// Whether requests without a token are rejected.
    pub required: bool,
    /// Accepted claims version.
    pub version: u32,
}

impl Default for SipLayerConfig {
    fn default() -> Self {
        Self {
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            required: true,
            version: SIP_VERSION,
        }
    }
}

impl SipLayerConfig {
    /// Sets the query parameter name.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Sets whether a token is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the accepted claims version.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// Verified claims attached to a request by [`SipService`].
#[derive(Debug, Clone, PartialEq)]
pub struct SipContext(Arc<SipClaims>);

impl SipContext {
    /// Wraps verified claims.
    #[must_use]
    pub fn new(claims: SipClaims) -> Self {
        Self(Arc::new(claims))
    }

    /// Returns the claims.
    #[must_use]
    pub fn claims(&self) -> &SipClaims {
        &self.0
    }
}

impl Deref for SipContext {
    type Target = SipClaims;

    fn deref(&self) -> &SipClaims {
        &self.0
    }
}

/// Returns the verified claims of a request that passed [`SipService`].
///
/// Returns `None` if the request carried no token and the layer is
/// optional, or if the request never went through the layer.
#[must_use]
pub fn claims<B>(req: &http::Request<B>) -> Option<&SipClaims> {
    req.extensions().get::<SipContext>().map(SipContext::claims)
}
