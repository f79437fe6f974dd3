use sign_core::{SignError, SignResult};

/**
    Number of addressable offsets in a [`FieldTable`].
*/
pub const FIELD_TABLE_LEN: usize = 73;

/**
    Sparse byte table indexed by fixed protocol offsets.

    Only some offsets are ever written. Reading one that was not written is
    an error, never an implicit zero.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    bytes: [u8; FIELD_TABLE_LEN],
    written: u128,
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTable {
    pub const fn new() -> Self {
        Self {
            bytes: [0; FIELD_TABLE_LEN],
            written: 0,
        }
    }

    pub fn set(&mut self, offset: usize, value: u8) -> SignResult<()> {
        if offset >= FIELD_TABLE_LEN {
            return Err(SignError::OffsetOutOfRange(offset));
        }
        self.bytes[offset] = value;
        self.written |= 1u128 << offset;
        Ok(())
    }

    /**
        Write `values` to consecutive offsets starting at `start`.
    */
    pub fn set_all(&mut self, start: usize, values: &[u8]) -> SignResult<()> {
        for (i, &value) in values.iter().enumerate() {
            self.set(start + i, value)?;
        }
        Ok(())
    }

    pub fn get(&self, offset: usize) -> SignResult<u8> {
        if offset >= FIELD_TABLE_LEN {
            return Err(SignError::OffsetOutOfRange(offset));
        }
        if !self.is_written(offset) {
            return Err(SignError::UnwrittenOffset(offset));
        }
        Ok(self.bytes[offset])
    }

    pub fn is_written(&self, offset: usize) -> bool {
        offset < FIELD_TABLE_LEN && self.written & (1u128 << offset) != 0
    }

    /**
        XOR of the bytes at `offsets`.
    */
    pub fn xor_of(&self, offsets: &[usize]) -> SignResult<u8> {
        offsets
            .iter()
            .try_fold(0u8, |acc, &offset| Ok(acc ^ self.get(offset)?))
    }

    /**
        Bytes at `offsets`, in the given order.
    */
    pub fn gather(&self, offsets: &[usize]) -> SignResult<Vec<u8>> {
        offsets.iter().map(|&offset| self.get(offset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_reads_fail() {
        let mut table = FieldTable::new();
        assert_eq!(table.get(18), Err(SignError::UnwrittenOffset(18)));
        table.set(18, 44).unwrap();
        assert_eq!(table.get(18), Ok(44));
        // Writing zero still counts as written.
        table.set(70, 0).unwrap();
        assert_eq!(table.get(70), Ok(0));
    }

    #[test]
    fn out_of_range_offsets() {
        let mut table = FieldTable::new();
        assert_eq!(table.set(73, 1), Err(SignError::OffsetOutOfRange(73)));
        assert_eq!(table.get(200), Err(SignError::OffsetOutOfRange(200)));
        assert!(table.set_all(71, &[1, 2, 3]).is_err());
        assert!(!table.is_written(73));
    }

    #[test]
    fn xor_and_gather() {
        let mut table = FieldTable::new();
        table.set_all(20, &[0x01, 0x02, 0x04]).unwrap();
        assert_eq!(table.xor_of(&[20, 21, 22]), Ok(0x07));
        assert_eq!(table.gather(&[22, 20]), Ok(vec![0x04, 0x01]));
        assert_eq!(table.xor_of(&[20, 23]), Err(SignError::UnwrittenOffset(23)));
    }
}
