use crate::constants::XOR_TABLE;
use crate::error::{SignError, SignResult};

/**
    XOR `data` against the fixed 200-byte table, byte for byte.
*/
pub fn xor_transform(data: &[u8]) -> SignResult<Vec<u8>> {
    if data.len() > XOR_TABLE.len() {
        return Err(SignError::invalid(
            "xor input",
            format!("{} bytes exceeds table length {}", data.len(), XOR_TABLE.len()),
        ));
    }
    Ok(data.iter().zip(XOR_TABLE).map(|(b, k)| b ^ k).collect())
}
