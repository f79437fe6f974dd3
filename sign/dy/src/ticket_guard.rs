use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use chrono::DateTime;
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sign_core::hash::hmac_sha256_hex;
use sign_core::rand_core::CryptoRngCore;
use sign_core::{Clock, KeyMaterial, ParseError, SignError, SignResult};
use tracing::debug;

/**
    Common name used for the client CSR and self-signed certificate.
*/
pub const TICKET_GUARD_COMMON_NAME: &str = "bd-ticket-guard";

const REQ_CONTENT: &str = "ticket,path,timestamp";
const MIN_TS_SIGN_LEN: usize = 10;

/**
    Ticket-guard protocol flavour.

    `Tee` and `Ree` sign with ECDSA and differ only in their JSON field
    names. `WebProtect` signs with HMAC under the key derived from the
    server certificate.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketGuardVersion {
    #[default]
    Tee,
    Ree,
    WebProtect,
}

impl TicketGuardVersion {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [Self::Tee, Self::Ree, Self::WebProtect]
            .into_iter()
            .find(|version| version.to_name().eq_ignore_ascii_case(name))
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Tee => "tee",
            Self::Ree => "ree",
            Self::WebProtect => "web_protect",
        }
    }

    const fn field_names(self) -> (&'static str, &'static str) {
        match self {
            Self::Tee | Self::WebProtect => ("ts_sign", "req_sign"),
            Self::Ree => ("ts_sign_ree", "req_sign_ree"),
        }
    }
}

impl fmt::Display for TicketGuardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for TicketGuardVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseError {
            kind: "ticket guard version",
            value: s.to_owned(),
        })
    }
}

/**
    Per-account ticket-guard settings issued by the platform.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketGuardConfig {
    pub version: TicketGuardVersion,
    pub ts_sign: String,
    pub ticket: String,
}

impl TicketGuardConfig {
    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// Field order is the serialized key order.
#[derive(Serialize)]
struct WebProtectClientData<'a> {
    ts_sign: &'a str,
    req_content: &'static str,
    req_sign: String,
    timestamp: u64,
}

/**
    Build the base64 `bd-ticket-guard-client-data` envelope for `path`.

    The ECDSA versions emit their keys sorted. `WebProtect` emits
    `ts_sign`, `req_content`, `req_sign`, `timestamp` in that order.
*/
pub fn ticket_guard_sign(
    keys: &KeyMaterial,
    config: &TicketGuardConfig,
    path: &str,
    clock: &impl Clock,
) -> SignResult<String> {
    if config.ts_sign.len() < MIN_TS_SIGN_LEN {
        return Err(SignError::invalid(
            "ts_sign",
            format!("must be at least {MIN_TS_SIGN_LEN} characters"),
        ));
    }
    if config.ticket.is_empty() {
        return Err(SignError::MissingField("ticket".into()));
    }
    if path.is_empty() {
        return Err(SignError::MissingField("path".into()));
    }

    let timestamp = clock.now_secs();
    let content = format!("ticket={}&path={path}&timestamp={timestamp}", config.ticket);

    let req_sign = match config.version {
        TicketGuardVersion::Tee | TicketGuardVersion::Ree => {
            BASE64.encode(&keys.sign_ecdsa_sha256(content.as_bytes()))
        }
        TicketGuardVersion::WebProtect => {
            let derived = keys.derived_key().ok_or(SignError::MissingDerivedKey)?;
            BASE64.encode(hmac_sha256_hex(derived, content.as_bytes()).as_bytes())
        }
    };

    let json = match config.version {
        TicketGuardVersion::WebProtect => serde_json::to_string(&WebProtectClientData {
            ts_sign: &config.ts_sign,
            req_content: REQ_CONTENT,
            req_sign,
            timestamp,
        })?,
        TicketGuardVersion::Tee | TicketGuardVersion::Ree => {
            let (ts_field, sign_field) = config.version.field_names();
            let mut data = Map::new();
            data.insert("req_content".into(), Value::from(REQ_CONTENT));
            data.insert(ts_field.into(), Value::from(config.ts_sign.as_str()));
            data.insert(sign_field.into(), Value::from(req_sign));
            data.insert("timestamp".into(), Value::from(timestamp));
            serde_json::to_string(&data)?
        }
    };

    debug!(version = %config.version, timestamp, "built ticket-guard client data");
    Ok(BASE64.encode(json.as_bytes()))
}

/**
    Full ticket-guard header set for one request.

    `keys` is the REE key: it signs the client data and is published as
    `bd-ticket-guard-ree-public-key`. The client certificate is self-signed
    by `cert_keys` (the TEE key), or by `keys` when that is `None`. `rng`
    supplies the certificate serial number.
*/
pub fn ticket_guard_headers(
    keys: &KeyMaterial,
    cert_keys: Option<&KeyMaterial>,
    config: &TicketGuardConfig,
    path: &str,
    clock: &impl Clock,
    rng: &mut impl CryptoRngCore,
) -> SignResult<BTreeMap<String, String>> {
    let client_data = ticket_guard_sign(keys, config, path, clock)?;
    let now = i64::try_from(clock.now_millis())
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| SignError::invalid("clock", "timestamp out of range"))?;
    let client_cert = cert_keys
        .unwrap_or(keys)
        .self_signed_certificate(TICKET_GUARD_COMMON_NAME, now, rng)?;

    Ok(BTreeMap::from([
        ("bd-ticket-guard-client-data".to_owned(), client_data),
        (
            "bd-ticket-guard-ree-public-key".to_owned(),
            keys.public_key_base64(),
        ),
        ("bd-ticket-guard-client-cert".to_owned(), client_cert),
        ("bd-ticket-guard-version".to_owned(), "3".to_owned()),
        ("bd-ticket-guard-iteration-version".to_owned(), "2".to_owned()),
    ]))
}
