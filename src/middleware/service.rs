//! Tower Service for SIP token verification

use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use http::header::{CONTENT_TYPE, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use tower_service::Service;
use tracing::{Instrument, Span, field, info_span, warn};

use super::{SipContext, SipLayerConfig};
use crate::error::VerifyError;
use crate::verifier::SipVerifier;

/// Tower Service that verifies the SIP token of each request.
///
/// Built by [`SipLayer`](super::SipLayer).
#[derive(Debug, Clone)]
pub struct SipService<S> {
    inner: S,
    verifier: SipVerifier,
    config: SipLayerConfig,
}

impl<S> SipService<S> {
    /// Create a new SIP service
    #[must_use]
    pub fn new(inner: S, verifier: SipVerifier, config: SipLayerConfig) -> Self {
        Self {
            inner,
            verifier,
            config,
        }
    }

    /// Get a reference to the inner service
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get a reference to the verifier
    #[must_use]
    pub fn verifier(&self) -> &SipVerifier {
        &self.verifier
    }

    fn extract_token<B>(&self, req: &http::Request<B>) -> Option<String> {
        let query = req.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| *name == self.config.query_param)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

/// Future returned by [`SipService`].
pub type SipServiceFuture<T, E> = BoxFuture<'static, Result<T, E>>;

impl<S, B, ResBody> Service<http::Request<B>> for SipService<S>
where
    S: Service<http::Request<B>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: From<String> + Send + 'static,
{
    type Response = http::Response<ResBody>;
    type Error = S::Error;
    type Future = SipServiceFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let token = self.extract_token(&req);

        // Take the service that was driven to readiness.
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        let Some(token) = token else {
            if !self.config.required {
                return Box::pin(async move { inner.call(req).await });
            }
            let err = VerifyError::MissingToken {
                param: self.config.query_param.clone(),
            };
            warn!(path = %req.uri().path(), error = %err, "SIP token missing");
            return Box::pin(async move { Ok(error_response(&err)) });
        };

        let verifier = self.verifier.clone();
        let span = info_span!("sip_verify", slid = field::Empty);

        Box::pin(
            async move {
                match verifier.verify(&token).await {
                    Ok(claims) => {
                        Span::current().record("slid", claims.slid.as_str());
                        req.extensions_mut().insert(SipContext::new(claims));
                        inner.call(req).await
                    }
                    Err(err) => Ok(error_response(&err)),
                }
            }
            .instrument(span),
        )
    }
}

/// Plain-text response carrying only the public message of `err`.
fn error_response<ResBody: From<String>>(err: &VerifyError) -> http::Response<ResBody> {
    let mut response = http::Response::new(ResBody::from(format!("{}\n", err.public_message())));
    *response.status_mut() = err.status();

    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
