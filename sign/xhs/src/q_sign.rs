use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sign_core::codec::query_escape;
use sign_core::hash::{hmac_sha1_hex, sha1_hex};
use sign_core::{Clock, SignError, SignResult};
use tracing::debug;

/**
    Default validity window, in seconds.
*/
pub const DEFAULT_EXPIRES: u64 = 900;

/**
    Inputs of the object-storage upload authorization.

    Map keys keep their original case; they are lowercased only when
    written into the signed strings.
*/
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QSignOptions {
    pub secret_id: String,
    pub secret_key: String,
    pub method: String,
    pub pathname: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub expires: u64,
}

impl Default for QSignOptions {
    fn default() -> Self {
        Self {
            secret_id: String::new(),
            secret_key: String::new(),
            method: "get".to_owned(),
            pathname: "/".to_owned(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            expires: DEFAULT_EXPIRES,
        }
    }
}

impl std::fmt::Debug for QSignOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QSignOptions")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("method", &self.method)
            .field("pathname", &self.pathname)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("expires", &self.expires)
            .finish()
    }
}

impl QSignOptions {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_expires(mut self, expires: u64) -> Self {
        self.expires = expires;
        self
    }
}

// `lower(k)=escape(v)` pairs in original-key order.
fn pairs_string(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}={}", k.to_lowercase(), query_escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn key_list(map: &BTreeMap<String, String>) -> String {
    let mut keys = map.keys().map(|k| k.to_lowercase()).collect::<Vec<_>>();
    keys.sort();
    keys.join(";")
}

/**
    Build the `q-sign-algorithm=sha1&...` authorization string.
*/
pub fn object_storage_query_sign(options: &QSignOptions, clock: &impl Clock) -> SignResult<String> {
    if options.secret_id.is_empty() {
        return Err(SignError::MissingField("secret_id".to_owned()));
    }
    if options.secret_key.is_empty() {
        return Err(SignError::MissingField("secret_key".to_owned()));
    }

    let method = match options.method.to_lowercase() {
        m if m.is_empty() => "get".to_owned(),
        m => m,
    };
    let pathname = if options.pathname.starts_with('/') {
        options.pathname.clone()
    } else {
        format!("/{}", options.pathname)
    };
    let expires = match options.expires {
        0 => DEFAULT_EXPIRES,
        e => e,
    };

    let start = clock.now_secs();
    let end = start
        .checked_add(expires)
        .ok_or_else(|| SignError::invalid("expires", "expiry time overflows"))?;
    let sign_time = format!("{start};{end}");
    let sign_key = hmac_sha1_hex(options.secret_key.as_bytes(), sign_time.as_bytes());

    let http_string = format!(
        "{method}\n{pathname}\n{}\n{}",
        pairs_string(&options.query),
        pairs_string(&options.headers)
    );
    let string_to_sign = format!("sha1\n{sign_time}\n{}", sha1_hex(http_string.as_bytes()));
    let signature = hmac_sha1_hex(sign_key.as_bytes(), string_to_sign.as_bytes());

    debug!(%method, %pathname, %sign_time, "built object-storage query signature");

    Ok([
        "q-sign-algorithm=sha1".to_owned(),
        format!("q-ak={}", options.secret_id),
        format!("q-sign-time={sign_time}"),
        format!("q-key-time={sign_time}"),
        format!("q-header-list={}", key_list(&options.headers)),
        format!("q-url-param-list={}", key_list(&options.query)),
        format!("q-signature={signature}"),
    ]
    .join("&"))
}
