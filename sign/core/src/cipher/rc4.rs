use crate::error::{SignError, SignResult};

/**
    RC4 keystream generator.

    Keys are 1 to 256 bytes. The same instance encrypts and decrypts since
    the keystream is simply XORed into the data.
*/
#[derive(Clone)]
pub struct Rc4 {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    pub fn new(key: &[u8]) -> SignResult<Self> {
        if key.is_empty() || key.len() > 256 {
            return Err(SignError::invalid(
                "rc4 key",
                format!("must be 1 to 256 bytes, got {}", key.len()),
            ));
        }

        let mut state = [0u8; 256];
        for (i, s) in state.iter_mut().enumerate() {
            *s = i as u8;
        }
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, usize::from(j));
        }

        Ok(Self { state, i: 0, j: 0 })
    }

    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.state[usize::from(self.i)]);
            self.state.swap(usize::from(self.i), usize::from(self.j));
            let idx = self.state[usize::from(self.i)].wrapping_add(self.state[usize::from(self.j)]);
            *byte ^= self.state[usize::from(idx)];
        }
    }
}

/**
    One-shot RC4 over a copy of `data`.
*/
pub fn rc4(key: &[u8], data: &[u8]) -> SignResult<Vec<u8>> {
    let mut out = data.to_vec();
    Rc4::new(key)?.apply_keystream(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn reference_vectors() {
        assert_eq!(rc4(b"Key", b"Plaintext").unwrap(), hex!("bbf316e8d940af0ad3"));
        assert_eq!(rc4(b"Wiki", b"pedia").unwrap(), hex!("1021bf0420"));
        assert_eq!(
            rc4(b"Secret", b"Attack at dawn").unwrap(),
            hex!("45a01f645fc35b383552544b9bf5")
        );
    }

    #[test]
    fn rejects_bad_key_lengths() {
        let err = rc4(&[], b"x").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert!(matches!(
            rc4(&[0; 257], b"x"),
            Err(SignError::InvalidField { field: "rc4 key", .. })
        ));
        assert!(rc4(&[0; 256], b"x").is_ok());
    }

    proptest! {
        #[test]
        fn keystream_is_an_involution(
            key in proptest::collection::vec(any::<u8>(), 1..32),
            data in proptest::collection::vec(any::<u8>(), 0..128),
        ) {
            let once = rc4(&key, &data).unwrap();
            prop_assert_eq!(rc4(&key, &once).unwrap(), data);
        }
    }
}
