//! Shared helpers: a token issuer and mock key authorities.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use rusty_paseto::prelude::*;
use serde_json::{Value, json};
use sip_attestation::{KeyId, KeyStore, KeyStoreConfig, VerifyingKey};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

const PASETO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Signs SIP tokens with a freshly generated key.
pub struct TestIssuer {
    signing_key: SigningKey,
}

impl TestIssuer {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key().into()
    }

    pub fn kid(&self) -> KeyId {
        self.verifying_key().key_id()
    }

    pub fn paserk(&self) -> String {
        self.verifying_key().to_paserk()
    }

    pub fn footer(&self) -> String {
        format!(r#"{{"kid":"{}"}}"#, self.kid())
    }

    /// Signs `claims` with this issuer's key id in the footer.
    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with_footer(claims, &self.footer())
    }

    /// Signs `claims` with an arbitrary footer.
    pub fn sign_with_footer(&self, claims: &Value, footer: &str) -> String {
        let key_bytes = self.signing_key.to_keypair_bytes();
        let key_wrapper = Key::<64>::from(&key_bytes);
        let paseto_key = PasetoAsymmetricPrivateKey::<V4, Public>::from(&key_wrapper);

        let claims = claims.as_object().expect("claims must be a JSON object");
        let text = |value: &Value| value.as_str().expect("registered claims are strings").to_string();

        let exp = claims.get("exp").map(text);
        let iat = claims.get("iat").map(text);
        let aud = claims.get("aud").map(text);
        let jti = claims.get("jti").map(text);

        let mut builder = PasetoBuilder::<V4, Public>::default();
        if let Some(exp) = &exp {
            builder.set_claim(ExpirationClaim::try_from(exp.as_str()).unwrap());
        }
        if let Some(iat) = &iat {
            builder.set_claim(IssuedAtClaim::try_from(iat.as_str()).unwrap());
        }
        if let Some(aud) = &aud {
            builder.set_claim(AudienceClaim::from(aud.as_str()));
        }
        if let Some(jti) = &jti {
            builder.set_claim(TokenIdentifierClaim::from(jti.as_str()));
        }
        for (name, value) in claims {
            if !matches!(name.as_str(), "exp" | "iat" | "aud" | "jti") {
                builder.set_claim(CustomClaim::try_from((name.as_str(), value.clone())).unwrap());
            }
        }

        builder
            .set_footer(Footer::from(footer))
            .build(&paseto_key)
            .unwrap()
    }
}

pub fn paseto_time(time: DateTime<Utc>) -> String {
    time.format(PASETO_TIME_FORMAT).to_string()
}

/// Claims for an authentic scan of item `ABC`, valid for an hour.
pub fn valid_claims() -> Value {
    let now = Utc::now();
    json!({
        "_v": 4,
        "aud": "shop.example.com",
        "exp": paseto_time(now + chrono::Duration::hours(1)),
        "iat": paseto_time(now),
        "jti": "session-42",
        "slid": "00abc",
        "result": "AUTHENTIC",
    })
}

/// A store that never leaves the process.
pub fn offline_store() -> Arc<KeyStore> {
    Arc::new(KeyStore::new(KeyStoreConfig::default().with_hosts(Vec::<String>::new())).unwrap())
}

/// A store that queries `hosts` over plain HTTP with short timeouts.
pub fn store_for_hosts<I, S>(hosts: I) -> Arc<KeyStore>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = KeyStoreConfig::default()
        .with_hosts(hosts)
        .with_scheme("http")
        .with_fetch_timeout(Duration::from_millis(500))
        .with_connect_timeout(Duration::from_millis(200));
    Arc::new(KeyStore::new(config).unwrap())
}

/// Authority address that refuses connections.
pub const UNREACHABLE_HOST: &str = "127.0.0.1:1";

/// A mock key authority.
pub struct MockAuthority {
    pub server: MockServer,
}

impl MockAuthority {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// `host:port` to put in a key store's host list.
    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    /// Serve `body` for `kid`, expecting `times` requests.
    pub async fn serve(&self, kid: &KeyId, body: impl Into<String>, times: impl Into<Times>) {
        self.respond(kid, ResponseTemplate::new(200).set_body_string(body.into()), times)
            .await;
    }

    /// Answer requests for `kid` with `status`, expecting `times` requests.
    pub async fn fail(&self, kid: &KeyId, status: u16, times: impl Into<Times>) {
        self.respond(kid, ResponseTemplate::new(status), times).await;
    }

    pub async fn respond(&self, kid: &KeyId, template: ResponseTemplate, times: impl Into<Times>) {
        Mock::given(method("GET"))
            .and(path(format!("/v4/{kid}")))
            .respond_with(template)
            .expect(times)
            .mount(&self.server)
            .await;
    }
}
