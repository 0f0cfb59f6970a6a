//! Constants for SIP token verification.

use std::time::Duration;

/// Query parameter that carries the token.
pub const DEFAULT_QUERY_PARAM: &str = "av_sip4";

/// Maximum accepted token length in characters.
pub const MAX_TOKEN_LENGTH: usize = 8192;

/// Header every accepted token starts with.
pub const TOKEN_HEADER: &str = "v4.public.";

/// Canonical key authorities, in lookup order.
pub const DEFAULT_KEY_HOSTS: &[&str] = &["sip-keys.authenticvision.com"];

/// URL scheme used to reach key authorities.
pub const DEFAULT_KEY_SCHEME: &str = "https";

/// Total time allowed for one key fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed to establish a connection to a key authority.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Characters of a token included in log records.
pub const LOG_TOKEN_PREFIX_LENGTH: usize = 16;
