use crate::error::{SignError, SignResult};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/**
    Form-style query escaping.

    Unreserved bytes (`A-Z a-z 0-9 - _ . ~`) pass through, space becomes `+`,
    every other byte becomes an uppercase `%XX` escape.
*/
pub fn query_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for &b in s.as_bytes() {
        match b {
            b' ' => out.push('+'),
            b if is_unreserved(b) => out.push(char::from(b)),
            b => {
                out.push('%');
                out.push(char::from(HEX_UPPER[usize::from(b >> 4)]));
                out.push(char::from(HEX_UPPER[usize::from(b & 0x0F)]));
            }
        }
    }
    out
}

/**
    Inverse of [`query_escape`]: `%XX` becomes its byte, `+` becomes space.
*/
pub fn query_unescape_bytes(s: &str) -> SignResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).and_then(|&c| hex_value(c));
                let lo = bytes.get(i + 2).and_then(|&c| hex_value(c));
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    return Err(SignError::InvalidEscape(i));
                };
                out.push((hi << 4) | lo);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

/**
    [`query_unescape_bytes`] for text that must decode to UTF-8.
*/
pub fn query_unescape(s: &str) -> SignResult<String> {
    String::from_utf8(query_unescape_bytes(s)?)
        .map_err(|e| SignError::invalid("query component", e.to_string()))
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
