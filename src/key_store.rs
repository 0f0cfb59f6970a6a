//! Trust store of SIP signing keys backed by remote key authorities.
//!
//! Keys are cached forever once resolved. A miss walks the configured
//! authorities in order, fetching `<scheme>://<host>/v4/<kid>` from each
//! until one serves a `k4.public` key whose identifier matches the request.

use std::fmt;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sip_paserk::{KeyId, KeyKind};
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_FETCH_TIMEOUT, DEFAULT_KEY_HOSTS, DEFAULT_KEY_SCHEME,
};
use crate::error::KeyStoreError;
use crate::keys::VerifyingKey;

/// Configuration for a [`KeyStore`].
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use std::time::Duration;
/// use sip_attestation::KeyStoreConfig;
///
/// let config: KeyStoreConfig = serde_json::from_str(r#"{
///     "hosts": ["keys.internal.example"],
///     "fetch_timeout": "3s"
/// }"#).unwrap();
///
/// assert_eq!(config.hosts, vec!["keys.internal.example"]);
/// assert_eq!(config.scheme, "https");
/// assert_eq!(config.fetch_timeout, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStoreConfig {
    /// Key authorities, queried in order.
    pub hosts: Vec<String>,

    /// URL scheme for authority requests.
    pub scheme: String,

    /// Total time allowed for one fetch.
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,

    /// Time allowed to connect to an authority.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// `User-Agent` sent to authorities.
    pub user_agent: String,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            hosts: DEFAULT_KEY_HOSTS.iter().map(ToString::to_string).collect(),
            scheme: DEFAULT_KEY_SCHEME.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl KeyStoreConfig {
    /// Replaces the authority list.
    #[must_use]
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the total fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// A cache of trusted public keys indexed by their `k4.pid` identifier.
///
/// Share one store between verifiers with `Arc<KeyStore>`. Keys added
/// locally or fetched from an authority are never evicted. Concurrent
/// lookups of the same missing identifier share a single remote
/// resolution, and failed resolutions are not cached.
///
/// # Example
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use sip_attestation::{KeyStore, KeyStoreConfig, VerifyingKey};
///
/// let store = KeyStore::new(KeyStoreConfig::default().with_hosts(Vec::<String>::new())).unwrap();
/// let key = VerifyingKey::from_paserk(
///     "k4.public.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
/// ).unwrap();
///
/// store.add_public_key(key).await;
/// assert_eq!(store.get_public_key(&key.key_id()).await.unwrap(), key);
/// # }
/// ```
pub struct KeyStore {
    config: KeyStoreConfig,
    client: reqwest::Client,
    cache: Cache<KeyId, VerifyingKey>,
}

impl KeyStore {
    /// Creates an empty store for the configured authorities.
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::Client` if the HTTP client cannot be built.
    pub fn new(config: KeyStoreConfig) -> Result<Self, KeyStoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| KeyStoreError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self {
            config,
            client,
            cache: Cache::builder().build(),
        })
    }

    /// Creates an empty store that queries [`DEFAULT_KEY_HOSTS`].
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::Client` if the HTTP client cannot be built.
    pub fn with_default_hosts() -> Result<Self, KeyStoreError> {
        Self::new(KeyStoreConfig::default())
    }

    /// Returns the configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    /// Trusts `key` under its derived identifier.
    ///
    /// Adding a key that is already present leaves the existing entry as is.
    pub async fn add_public_key(&self, key: VerifyingKey) {
        let kid = key.key_id();
        let entry = self.cache.entry(kid).or_insert(key).await;
        if entry.is_fresh() {
            debug!(kid = %entry.key(), "added trusted key");
        }
    }

    /// Returns true if `kid` is cached.
    #[must_use]
    pub fn contains(&self, kid: &KeyId) -> bool {
        self.cache.contains_key(kid)
    }

    /// Returns the number of cached keys.
    ///
    /// Walks the whole cache, so the cost grows with the number of keys.
    /// Unlike [`Cache::entry_count`] the result is exact right after an
    /// insert.
    #[must_use]
    pub fn cached_key_count(&self) -> usize {
        self.cache.iter().count()
    }

    /// Resolves the key named by `kid`, from cache or from an authority.
    ///
    /// # Errors
    ///
    /// - `NoSuchKey` if no authority is configured, `kid` does not name a
    ///   public key, or the last authority tried answered 404
    /// - otherwise the error from the last authority tried
    pub async fn get_public_key(&self, kid: &KeyId) -> Result<VerifyingKey, KeyStoreError> {
        if let Some(key) = self.cache.get(kid).await {
            return Ok(key);
        }

        self.cache
            .try_get_with_by_ref(kid, self.resolve(kid))
            .await
            .map_err(|e| (*e).clone())
    }

    async fn resolve(&self, kid: &KeyId) -> Result<VerifyingKey, KeyStoreError> {
        let mut last_error = KeyStoreError::NoSuchKey { kid: kid.clone() };
        if kid.kind() != KeyKind::Public {
            return Err(last_error);
        }

        for host in &self.config.hosts {
            match self.fetch_from_host(kid, host).await {
                Ok(key) => {
                    info!(kid = %kid, host = %host, "fetched SIP key");
                    return Ok(key);
                }
                Err(e) => {
                    warn!(kid = %kid, host = %host, error = %e, "SIP key fetch failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Fetches the key named by `kid` from a single authority.
    ///
    /// Does not consult or update the cache.
    ///
    /// # Errors
    ///
    /// - `NoSuchKey` if the authority answers 404
    /// - `Status` for any other non-200 answer
    /// - `Transport` if the request fails or times out
    /// - `InvalidKey` if the body is not a `k4.public` key
    /// - `KeyMismatch` if the served key has a different identifier
    pub async fn fetch_from_host(
        &self,
        kid: &KeyId,
        host: &str,
    ) -> Result<VerifyingKey, KeyStoreError> {
        let url = format!("{}://{host}/v4/{kid}", self.config.scheme);
        let transport = |e: reqwest::Error| KeyStoreError::Transport {
            host: host.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(KeyStoreError::NoSuchKey { kid: kid.clone() });
            }
            status => {
                return Err(KeyStoreError::Status {
                    host: host.to_string(),
                    status: status.as_u16(),
                });
            }
        }

        let body = response.text().await.map_err(transport)?;
        let key = VerifyingKey::from_paserk(body.trim_end_matches(|c: char| c.is_ascii_whitespace()))
            .map_err(|e| KeyStoreError::InvalidKey {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        if key.key_id() != *kid {
            return Err(KeyStoreError::KeyMismatch {
                host: host.to_string(),
                kid: kid.clone(),
            });
        }
        Ok(key)
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("hosts", &self.config.hosts)
            .field("cached_keys", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
