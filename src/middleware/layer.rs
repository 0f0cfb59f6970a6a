//! Tower Layer for SIP token verification

use std::sync::Arc;

use tower_layer::Layer;

use super::SipLayerConfig;
use super::service::SipService;
use crate::key_store::KeyStore;
use crate::verifier::SipVerifier;

/// Tower Layer that wraps services with [`SipService`].
///
/// # Example
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use sip_attestation::SipLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(SipLayer::new(key_store).optional())
///     .service(my_inner_service);
/// ```
#[derive(Debug, Clone)]
pub struct SipLayer {
    key_store: Arc<KeyStore>,
    config: SipLayerConfig,
}

impl SipLayer {
    /// Create a layer that requires a token on every request
    #[must_use]
    pub fn new(key_store: Arc<KeyStore>) -> Self {
        Self {
            key_store,
            config: SipLayerConfig::default(),
        }
    }

    /// Set the configuration for this layer
    #[must_use]
    pub fn config(mut self, config: SipLayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Let requests without a token pass through unverified
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.config.required = false;
        self
    }
}

impl<S> Layer<S> for SipLayer {
    type Service = SipService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        let verifier =
            SipVerifier::new(Arc::clone(&self.key_store)).with_version(self.config.version);
        SipService::new(inner, verifier, self.config.clone())
    }
}
