/*!
    Request and cookie identifiers minted client-side.
*/

use rand::Rng;
use sign_core::Clock;
use sign_core::codec::crc32_ieee;
use sign_core::hash::md5_hex;

const TRACE_SYMBOLS: &[u8] = b"abcdef0123456789";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const A1_RANDOM_LEN: usize = 30;
const A1_LEN: usize = 52;
const SEARCH_ID_RANGE: u64 = 2_147_483_646;

fn random_string(rng: &mut impl Rng, symbols: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(symbols[rng.random_range(0..symbols.len())]))
        .collect()
}

/**
    16 lowercase hex-alphabet symbols for the `x-b3-traceid` header.
*/
pub fn b3_trace_id(rng: &mut impl Rng) -> String {
    random_string(rng, TRACE_SYMBOLS, 16)
}

/**
    `x-xray-traceid` paired with a b3 trace id.
*/
pub fn xray_trace_id(b3: &str) -> String {
    md5_hex(b3.as_bytes())
}

/**
    The `a1` device cookie and the `webId` derived from it.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieIds {
    pub a1: String,
    pub web_id: String,
}

impl CookieIds {
    pub fn generate(clock: &impl Clock, rng: &mut impl Rng) -> Self {
        let random = random_string(rng, ALPHANUMERIC, A1_RANDOM_LEN);
        Self::from_parts(clock.now_millis(), &random)
    }

    fn from_parts(millis: u64, random: &str) -> Self {
        let seed = format!("{millis:x}{random}50000");
        let mut a1 = format!("{seed}{}", crc32_ieee(seed.as_bytes()));
        a1.truncate(A1_LEN);
        let web_id = md5_hex(a1.as_bytes());
        Self { a1, web_id }
    }
}

/**
    Search session id: base36 of the millisecond clock shifted into the high
    64 bits plus a random low part.
*/
pub fn search_id(clock: &impl Clock, rng: &mut impl Rng) -> String {
    search_id_from(clock.now_millis(), rng.random_range(0..SEARCH_ID_RANGE))
}

fn search_id_from(millis: u64, low: u64) -> String {
    let mut n = (u128::from(millis) << 64) + u128::from(low);
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&d| char::from(d)).collect()
}
