/*!
    Symmetric primitives: RC4, AES-128-CBC and the fixed-table XOR.
*/

mod aes;
mod rc4;
mod xor;

pub use self::aes::{aes128_cbc_decrypt, aes128_cbc_encrypt};
pub use self::rc4::{Rc4, rc4};
pub use self::xor::xor_transform;
