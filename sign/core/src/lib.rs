/*!
    Shared primitives for the request-signing assemblers.

    Byte codecs, symmetric ciphers, digests, P-256 key agreement, and the
    injected clock and randomness every assembler is parameterized over.
    Nothing here performs I/O.
*/

#![allow(clippy::doc_overindented_list_items)]

mod constants;
mod context;
mod cookies;
mod error;
mod keys;

pub mod cipher;
pub mod codec;
pub mod hash;

pub use self::constants::{
    BASE58_SYMBOLS, CAPTCHA_SYMBOLS, CRC32_IEEE_POLY, LOOKUP_SYMBOLS, S1_SYMBOLS, S2_SYMBOLS,
    S3_SYMBOLS, S4_SYMBOLS, STANDARD_SYMBOLS, XOR_TABLE,
};
pub use self::context::{
    Clock, CyclicDraws, DRAW_RANGE, FixedClock, RandomSource, SystemClock, ThreadRandom,
};
pub use self::cookies::Cookies;
pub use self::error::{ErrorKind, ParseError, SignError, SignResult};
pub use self::keys::{KeyMaterial, RAW_KEY_HEX_LEN};

pub use p256::PublicKey;
pub use p256::elliptic_curve::rand_core;
