/*!
    SigV4-style canonical request signing for the object-storage upload API.

    The same scheme ships under two naming conventions. [`CanonicalVariant`]
    selects the algorithm label, scope suffix, header names and key prefix;
    everything else is shared.
*/

use core::fmt;
use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sign_core::codec::{query_escape, query_unescape};
use sign_core::hash::{hmac_sha256, sha256_hex};
use sign_core::{Clock, SignError, SignResult};
use tracing::{debug, trace};

const UNSIGNABLE_HEADERS: [&str; 7] = [
    "authorization",
    "content-type",
    "content-length",
    "user-agent",
    "presigned-expires",
    "expect",
    "x-amzn-trace-id",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalVariant {
    #[default]
    Aws,
    Volcengine,
}

impl CanonicalVariant {
    pub const fn algorithm(self) -> &'static str {
        match self {
            Self::Aws => "AWS4-HMAC-SHA256",
            Self::Volcengine => "HMAC-SHA256",
        }
    }

    pub const fn scope_suffix(self) -> &'static str {
        match self {
            Self::Aws => "aws4_request",
            Self::Volcengine => "request",
        }
    }

    pub const fn date_header(self) -> &'static str {
        match self {
            Self::Aws => "X-Amz-Date",
            Self::Volcengine => "X-Date",
        }
    }

    pub const fn token_header(self) -> &'static str {
        match self {
            Self::Aws => "X-Amz-Security-Token",
            Self::Volcengine => "X-Security-Token",
        }
    }

    pub const fn content_header(self) -> &'static str {
        match self {
            Self::Aws => "X-Amz-Content-Sha256",
            Self::Volcengine => "X-Content-Sha256",
        }
    }

    const fn key_prefix(self) -> &'static str {
        match self {
            Self::Aws => "AWS4",
            Self::Volcengine => "",
        }
    }
}

/**
    Access key pair plus optional session token.
*/
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/**
    The parts of an HTTP request that enter the canonical form.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl CanonicalRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /**
        Append the pairs of a raw `k=v&k2=v2` query string, form-unescaped.
    */
    pub fn with_query_string(mut self, raw: &str) -> SignResult<Self> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.query
                .push((query_unescape(key)?, query_unescape(value)?));
        }
        Ok(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

fn is_signable(name: &str) -> bool {
    name.starts_with("x-amz-") || !UNSIGNABLE_HEADERS.contains(&name)
}

fn require<'a>(field: &str, value: &'a str) -> SignResult<&'a str> {
    if value.is_empty() {
        Err(SignError::MissingField(field.to_owned()))
    } else {
        Ok(value)
    }
}

/**
    Sign `request`, returning the headers the caller must add to it.

    The map holds the date header, the token header when a session token is
    set, the content-hash header when the request has a body, and
    `Authorization`.
*/
pub fn canonical_sign(
    request: &CanonicalRequest,
    credentials: &Credentials,
    region: &str,
    service: &str,
    variant: CanonicalVariant,
    clock: &impl Clock,
) -> SignResult<BTreeMap<String, String>> {
    let access_key = require("access_key_id", &credentials.access_key_id)?;
    let secret = require("secret_access_key", &credentials.secret_access_key)?;
    let region = require("region", region)?;
    let service = require("service", service)?;

    let now = i64::try_from(clock.now_millis())
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| SignError::invalid("clock", "timestamp out of range"))?;
    let iso_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = &iso_date[..8];

    let mut added = BTreeMap::new();
    added.insert(variant.date_header().to_owned(), iso_date.clone());
    if let Some(token) = credentials.session_token.as_deref().filter(|t| !t.is_empty()) {
        added.insert(variant.token_header().to_owned(), token.to_owned());
    }
    if let Some(body) = &request.body {
        added.insert(variant.content_header().to_owned(), sha256_hex(body));
    }

    let mut headers: BTreeMap<String, String> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_owned()))
        .collect();
    for (name, value) in &added {
        headers.insert(name.to_ascii_lowercase(), value.clone());
    }

    let signed: Vec<(&String, &String)> = headers
        .iter()
        .filter(|(name, _)| is_signable(name))
        .collect();
    let canonical_headers: String = signed
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = signed
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let mut query: Vec<(&str, &str)> = request
        .query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    query.sort_unstable();
    let canonical_query = query
        .iter()
        .map(|(k, v)| format!("{}={}", query_escape(k), query_escape(v)))
        .collect::<Vec<_>>()
        .join("&");

    let payload_hash = headers
        .get(&variant.content_header().to_ascii_lowercase())
        .cloned()
        .unwrap_or_else(|| sha256_hex(b""));

    let path = if request.path.is_empty() {
        "/"
    } else {
        request.path.as_str()
    };
    let canonical_request = [
        request.method.as_str(),
        path,
        canonical_query.as_str(),
        canonical_headers.as_str(),
        signed_headers.as_str(),
        payload_hash.as_str(),
    ]
    .join("\n");
    trace!(len = canonical_request.len(), "built canonical request");

    let scope = format!("{date}/{region}/{service}/{}", variant.scope_suffix());
    let request_digest = sha256_hex(canonical_request.as_bytes());
    let string_to_sign = [
        variant.algorithm(),
        iso_date.as_str(),
        scope.as_str(),
        request_digest.as_str(),
    ]
    .join("\n");

    let mut key = hmac_sha256(
        format!("{}{secret}", variant.key_prefix()).as_bytes(),
        date.as_bytes(),
    );
    for part in [region, service, variant.scope_suffix()] {
        key = hmac_sha256(&key, part.as_bytes());
    }
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    added.insert(
        "Authorization".to_owned(),
        format!(
            "{} Credential={access_key}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            variant.algorithm()
        ),
    );
    debug!(?variant, region, service, "signed canonical request");
    Ok(added)
}
