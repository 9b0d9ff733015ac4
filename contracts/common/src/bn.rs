//! Big number types

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer, the width of every EVM word.
    pub struct U256(4);
}

impl U256 {
    /// Convert to u64 if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.bits() <= 64 {
            Some(self.low_u64())
        } else {
            None
        }
    }

    /// Read a 32-byte big-endian EVM word.
    pub fn from_word(word: &[u8; 32]) -> Self {
        U256::from_big_endian(word)
    }

    /// Write as a 32-byte big-endian EVM word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        self.to_big_endian(&mut word);
        word
    }
}
