use crate::error::{SignError, SignResult};

/**
    Little-endian bytes of `value`, truncated or zero-extended to `len`.
*/
pub fn le_bytes(value: u64, len: usize) -> Vec<u8> {
    let mut out = value.to_le_bytes().to_vec();
    out.resize(len, 0);
    out
}

/**
    Big-endian split of a 32-bit value.
*/
pub const fn be_split_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/**
    One-byte length prefix followed by the UTF-8 bytes of `s`.
*/
pub fn length_prefixed(s: &str) -> SignResult<Vec<u8>> {
    let len = u8::try_from(s.len()).map_err(|_| {
        SignError::invalid(
            "length-prefixed string",
            format!("{} bytes exceeds 255", s.len()),
        )
    })?;
    let mut out = Vec::with_capacity(s.len() + 1);
    out.push(len);
    out.extend_from_slice(s.as_bytes());
    Ok(out)
}

/**
    Number of hex characters accepted by [`fold_hex_parameter`].
*/
pub const HEX_PARAMETER_LEN: usize = 32;

/**
    Reduce a 32-character hex parameter to its first eight bytes, each XORed
    with `xor_key`.
*/
pub fn fold_hex_parameter(hex_str: &str, xor_key: u8) -> SignResult<[u8; 8]> {
    if hex_str.len() != HEX_PARAMETER_LEN {
        return Err(SignError::invalid(
            "hex parameter",
            format!("expected {HEX_PARAMETER_LEN} characters, got {}", hex_str.len()),
        ));
    }
    let bytes = hex::decode(hex_str).map_err(|e| SignError::InvalidHex(e.to_string()))?;
    let mut out = [0u8; 8];
    for (dst, src) in out.iter_mut().zip(&bytes) {
        *dst = src ^ xor_key;
    }
    Ok(out)
}
