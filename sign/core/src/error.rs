use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/**
    Coarse failure category shared by every signing operation.

    Callers that only need to decide "bad input" versus "bad key" match
    on this instead of the individual [`SignError`] variants.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UnsupportedAlphabet,
    CryptoFailure,
    EncodingFailure,
}

impl ErrorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            Self::InvalidInput,
            Self::UnsupportedAlphabet,
            Self::CryptoFailure,
            Self::EncodingFailure,
        ]
        .into_iter()
        .find(|kind| kind.to_name().eq_ignore_ascii_case(name))
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::UnsupportedAlphabet => "unsupported_alphabet",
            Self::CryptoFailure => "crypto_failure",
            Self::EncodingFailure => "encoding_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for ErrorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseError {
            kind: "error kind",
            value: s.to_owned(),
        })
    }
}

/**
    Errors produced while building a signature.

    Every error is terminal to the call that raised it; no partially
    assembled token is ever returned alongside one.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    // ── Input ─────────────────────────────────────────────────────────
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid percent escape at byte {0}")]
    InvalidEscape(usize),

    // ── Alphabets / encodings ─────────────────────────────────────────
    #[error("unsupported alphabet '{0}'")]
    UnsupportedAlphabet(String),
    #[error("invalid {alphabet} encoding: {reason}")]
    InvalidEncoding {
        alphabet: &'static str,
        reason: String,
    },
    #[error("the {0} alphabet is encode-only")]
    DecodeUnsupported(&'static str),

    // ── Field table ───────────────────────────────────────────────────
    #[error("field table offset {0} read before it was written")]
    UnwrittenOffset(usize),
    #[error("field table offset {0} is out of range")]
    OffsetOutOfRange(usize),

    // ── Ciphers ───────────────────────────────────────────────────────
    #[error("invalid cipher input: {0}")]
    CipherInput(String),
    #[error("invalid PKCS#7 padding")]
    PaddingInvalid,

    // ── Keys / certificates ───────────────────────────────────────────
    #[error("key parse failed: {0}")]
    KeyParse(String),
    #[error("certificate parse failed: {0}")]
    CertificateParse(String),
    #[error("certificate build failed: {0}")]
    CertificateBuild(String),
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("no derived key, pair the key material with a peer certificate first")]
    MissingDerivedKey,

    // ── Serialization ─────────────────────────────────────────────────
    #[error("JSON serialization failed: {0}")]
    Json(String),
    #[error("DER encoding failed: {0}")]
    Der(String),
}

impl SignError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::InvalidHex(_)
            | Self::InvalidEscape(_) => ErrorKind::InvalidInput,
            Self::UnsupportedAlphabet(_) => ErrorKind::UnsupportedAlphabet,
            Self::CipherInput(_)
            | Self::PaddingInvalid
            | Self::KeyParse(_)
            | Self::CertificateParse(_)
            | Self::CertificateBuild(_)
            | Self::KeyDerivation(_)
            | Self::MissingDerivedKey => ErrorKind::CryptoFailure,
            Self::InvalidEncoding { .. }
            | Self::DecodeUnsupported(_)
            | Self::UnwrittenOffset(_)
            | Self::OffsetOutOfRange(_)
            | Self::Json(_)
            | Self::Der(_) => ErrorKind::EncodingFailure,
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SignError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/**
    Error returned by `FromStr` implementations on enum types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

/**
    Type alias for results that may return a [`SignError`].
*/
pub type SignResult<T> = std::result::Result<T, SignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_taxonomy() {
        assert_eq!(
            SignError::MissingField("a1".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SignError::UnsupportedAlphabet("s9".into()).kind(),
            ErrorKind::UnsupportedAlphabet
        );
        assert_eq!(SignError::MissingDerivedKey.kind(), ErrorKind::CryptoFailure);
        assert_eq!(SignError::UnwrittenOffset(61).kind(), ErrorKind::EncodingFailure);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [
            ErrorKind::InvalidInput,
            ErrorKind::UnsupportedAlphabet,
            ErrorKind::CryptoFailure,
            ErrorKind::EncodingFailure,
        ] {
            assert_eq!(kind.to_string().parse::<ErrorKind>().unwrap(), kind);
        }
        assert_eq!(
            " Crypto_Failure ".parse::<ErrorKind>().unwrap(),
            ErrorKind::CryptoFailure
        );
        let err = "nope".parse::<ErrorKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown error kind 'nope'");
    }

    #[test]
    fn json_errors_are_encoding_failures() {
        let err: SignError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, SignError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::EncodingFailure);
    }
}
