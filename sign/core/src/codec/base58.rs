use crate::constants::BASE58_SYMBOLS;

/**
    Base58-encode `input` over the content-platform symbol table.

    The input is read as one big-endian integer and repeatedly divided by 58;
    every leading zero byte contributes one copy of the first symbol.
*/
pub fn encode_base58(input: &[u8]) -> String {
    let symbols = BASE58_SYMBOLS.as_bytes();
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Little-endian base-58 digits of the non-zero tail.
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat_n(char::from(symbols[0]), zeros));
    out.extend(digits.iter().rev().map(|&d| char::from(symbols[d as usize])));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(encode_base58(b""), "");
        assert_eq!(encode_base58(b"hello world"), "FnLNXzSW8T7+y+L");
        assert_eq!(encode_base58(&[0xff, 0xff]), "zKp");
    }

    #[test]
    fn leading_zeros_map_to_first_symbol() {
        assert_eq!(encode_base58(&[0, 0, 1]), "NNO");
        assert_eq!(encode_base58(&[0]), "N");
    }
}
