/*!
    Byte codecs shared by both platforms.

    - Custom-alphabet base64 and the standard-to-lookup remap
    - Base58 over the content-platform table
    - CRC-32 and the `mrc` checksum variant
    - Integer and length-prefixed packing
    - Form-style query escaping
*/

mod base58;
mod base64;
mod crc;
mod escape;
mod pack;

pub use self::base58::encode_base58;
pub use self::base64::{Alphabet, decode, encode, encode_named, remap_standard};
pub use self::crc::{crc32_ieee, mrc};
pub use self::escape::{query_escape, query_unescape, query_unescape_bytes};
pub use self::pack::{
    HEX_PARAMETER_LEN, be_split_u32, fold_hex_parameter, le_bytes, length_prefixed,
};
