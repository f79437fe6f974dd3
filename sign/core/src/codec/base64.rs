use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use data_encoding::{BASE64, Encoding, Specification};

use crate::constants::{
    CAPTCHA_SYMBOLS, LOOKUP_SYMBOLS, S1_SYMBOLS, S2_SYMBOLS, S3_SYMBOLS, S4_SYMBOLS,
    STANDARD_SYMBOLS,
};
use crate::error::{SignError, SignResult};

/**
    Base64 symbol tables understood by [`encode`] and [`decode`].

    - `S0`..`S4`: device-signature alphabets, no padding; a trailing one or
      two byte group yields two or three symbols.
    - `Lookup`: content-platform alphabet, `=` padded.
    - `Captcha`: short trailing groups are filled with symbol 0 instead of
      `=`, which makes the encoding one-way.
    - `Standard`: RFC 4648 with padding.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Standard,
    S0,
    S1,
    S2,
    S3,
    S4,
    Lookup,
    Captcha,
}

impl Alphabet {
    pub const ALL: [Self; 8] = [
        Self::Standard,
        Self::S0,
        Self::S1,
        Self::S2,
        Self::S3,
        Self::S4,
        Self::Lookup,
        Self::Captcha,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|alphabet| alphabet.to_name().eq_ignore_ascii_case(name))
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::S0 => "s0",
            Self::S1 => "s1",
            Self::S2 => "s2",
            Self::S3 => "s3",
            Self::S4 => "s4",
            Self::Lookup => "lookup",
            Self::Captcha => "captcha",
        }
    }

    /**
        The published symbol table, including any unreachable 65th symbol.
    */
    pub const fn symbols(self) -> &'static str {
        match self {
            Self::Standard | Self::S0 => STANDARD_SYMBOLS,
            Self::S1 => S1_SYMBOLS,
            Self::S2 => S2_SYMBOLS,
            Self::S3 => S3_SYMBOLS,
            Self::S4 => S4_SYMBOLS,
            Self::Lookup => LOOKUP_SYMBOLS,
            Self::Captcha => CAPTCHA_SYMBOLS,
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            Self::Standard => &*STANDARD,
            Self::S0 => &*S0,
            Self::S1 => &*S1,
            Self::S2 => &*S2,
            Self::S3 => &*S3,
            Self::S4 => &*S4,
            Self::Lookup => &*LOOKUP,
            Self::Captcha => &*CAPTCHA,
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for Alphabet {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| SignError::UnsupportedAlphabet(s.to_owned()))
    }
}

static STANDARD: LazyLock<Encoding> = LazyLock::new(|| BASE64.clone());
static S0: LazyLock<Encoding> = LazyLock::new(|| build(STANDARD_SYMBOLS, None));
static S1: LazyLock<Encoding> = LazyLock::new(|| build(S1_SYMBOLS, None));
static S2: LazyLock<Encoding> = LazyLock::new(|| build(S2_SYMBOLS, None));
static S3: LazyLock<Encoding> = LazyLock::new(|| build(S3_SYMBOLS, None));
static S4: LazyLock<Encoding> = LazyLock::new(|| build(S4_SYMBOLS, None));
static LOOKUP: LazyLock<Encoding> = LazyLock::new(|| build(LOOKUP_SYMBOLS, Some('=')));
static CAPTCHA: LazyLock<Encoding> = LazyLock::new(|| build(CAPTCHA_SYMBOLS, None));

fn build(symbols: &str, padding: Option<char>) -> Encoding {
    let mut spec = Specification::new();
    spec.symbols.push_str(&symbols[..64]);
    spec.padding = padding;
    spec.encoding()
        .expect("published alphabets always hold 64 distinct ASCII symbols")
}

/**
    Encode `data` with the given alphabet.
*/
pub fn encode(alphabet: Alphabet, data: &[u8]) -> String {
    let mut out = alphabet.encoding().encode(data);
    if alphabet == Alphabet::Captcha {
        let fill = char::from(CAPTCHA_SYMBOLS.as_bytes()[0]);
        while !out.len().is_multiple_of(4) {
            out.push(fill);
        }
    }
    out
}

/**
    Decode `text` with the given alphabet.

    The captcha alphabet cannot be decoded since its fill symbol is also a
    data symbol.
*/
pub fn decode(alphabet: Alphabet, text: &str) -> SignResult<Vec<u8>> {
    if alphabet == Alphabet::Captcha {
        return Err(SignError::DecodeUnsupported(alphabet.to_name()));
    }
    alphabet
        .encoding()
        .decode(text.as_bytes())
        .map_err(|e| SignError::InvalidEncoding {
            alphabet: alphabet.to_name(),
            reason: e.to_string(),
        })
}

/**
    Encode with an alphabet chosen by name, failing on unknown names.
*/
pub fn encode_named(name: &str, data: &[u8]) -> SignResult<String> {
    Ok(encode(name.parse()?, data))
}

/**
    Rewrite a standard base64 string into the [`Alphabet::Lookup`] table,
    symbol for symbol. Characters outside the standard table pass through.
*/
pub fn remap_standard(text: &str) -> String {
    let standard = &STANDARD_SYMBOLS.as_bytes()[..64];
    let lookup = LOOKUP_SYMBOLS.as_bytes();
    text.chars()
        .map(|c| match standard.iter().position(|&s| char::from(s) == c) {
            Some(idx) => char::from(lookup[idx]),
            None => c,
        })
        .collect()
}
