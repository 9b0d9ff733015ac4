//! Contract ABI codec
//!
//! Just enough of the Solidity ABI for the methods the client calls:
//! static `uint256` / `address` arguments, and return data made of
//! those words plus `uint256[]`.

use sha3::{Digest, Keccak256};

use crate::bn::U256;
use crate::errors::{GoldError, GoldResult};
use crate::types::Address;

/// Size of one ABI word
pub const WORD: usize = 32;

/// Static call argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    Address(Address),
}

impl Token {
    fn to_word(self) -> [u8; WORD] {
        match self {
            Token::Uint(value) => value.to_word(),
            Token::Address(address) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(address.as_bytes());
                word
            }
        }
    }
}

/// First four bytes of keccak256 of the canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Encode calldata: selector followed by one word per argument
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}

/// Positional reader over return data
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn word_at(&self, offset: usize) -> GoldResult<&'a [u8; WORD]> {
        let end = offset.checked_add(WORD).ok_or(GoldError::AbiDecode { reason: "offset overflow" })?;
        self.data
            .get(offset..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(GoldError::AbiDecode { reason: "return data too short" })
    }

    /// Head word `index` as an unsigned integer
    pub fn uint(&self, index: usize) -> GoldResult<U256> {
        Ok(U256::from_word(self.word_at(index * WORD)?))
    }

    /// Head word `index` as a u64 (timestamps, small counters)
    pub fn u64(&self, index: usize) -> GoldResult<u64> {
        self.uint(index)?
            .to_u64()
            .ok_or(GoldError::AbiDecode { reason: "value exceeds u64" })
    }

    /// Head word `index` as an address
    pub fn address(&self, index: usize) -> GoldResult<Address> {
        let word = self.word_at(index * WORD)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(GoldError::AbiDecode { reason: "dirty address padding" });
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address(bytes))
    }

    /// Head word `index` as a bool
    pub fn bool(&self, index: usize) -> GoldResult<bool> {
        let value = self.uint(index)?;
        if value.is_zero() {
            Ok(false)
        } else if value == U256::one() {
            Ok(true)
        } else {
            Err(GoldError::AbiDecode { reason: "bool out of range" })
        }
    }

    /// Head word `index` is an offset to a `uint256[]` tail
    pub fn uint_array(&self, index: usize) -> GoldResult<Vec<U256>> {
        let offset = self.usize_word(index * WORD)?;
        let len = self.usize_word(offset)?;

        (0..len)
            .map(|i| {
                let at = offset + WORD + i * WORD;
                Ok(U256::from_word(self.word_at(at)?))
            })
            .collect()
    }

    fn usize_word(&self, offset: usize) -> GoldResult<usize> {
        let value = U256::from_word(self.word_at(offset)?);
        value
            .to_u64()
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v <= self.data.len())
            .ok_or(GoldError::AbiDecode { reason: "offset out of range" })
    }
}

/// Check whether an artifact ABI declares a function with this name
pub fn abi_has_function(abi: &serde_json::Value, name: &str) -> bool {
    abi.as_array()
        .map(|entries| {
            entries.iter().any(|entry| {
                entry.get("type").and_then(|t| t.as_str()).unwrap_or("function") == "function"
                    && entry.get("name").and_then(|n| n.as_str()) == Some(name)
            })
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_erc20_selectors() {
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("allowance(address,address)")), "dd62ed3e");
        assert_eq!(hex::encode(selector("approve(address,uint256)")), "095ea7b3");
    }

    #[test]
    fn test_encode_call_pads_arguments() {
        let spender: Address = "0x6F18cED823e527a229546ccCe72701D0bD082705".parse().unwrap();
        let data = encode_call(
            "approve(address,uint256)",
            &[Token::Address(spender), Token::Uint(U256::from(800_000_000u64))],
        );

        assert_eq!(data.len(), 4 + 2 * WORD);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], spender.as_bytes());
        assert_eq!(U256::from_big_endian(&data[36..68]), U256::from(800_000_000u64));
    }

    fn words(values: &[u64]) -> Vec<u8> {
        values.iter().flat_map(|v| U256::from(*v).to_word()).collect()
    }

    #[test]
    fn test_reader_decodes_static_words() {
        let data = words(&[42, 1_600_000_000, 1]);
        let reader = AbiReader::new(&data);
        assert_eq!(reader.uint(0).unwrap(), U256::from(42));
        assert_eq!(reader.u64(1).unwrap(), 1_600_000_000);
        assert!(reader.bool(2).unwrap());
        assert!(reader.uint(3).is_err());
    }

    #[test]
    fn test_reader_decodes_uint_array() {
        // head: [7, offset=64], tail: [len=3, 10, 11, 12]
        let data = words(&[7, 64, 3, 10, 11, 12]);
        let reader = AbiReader::new(&data);
        assert_eq!(reader.uint(0).unwrap(), U256::from(7));
        assert_eq!(
            reader.uint_array(1).unwrap(),
            vec![U256::from(10), U256::from(11), U256::from(12)]
        );
    }

    #[test]
    fn test_reader_rejects_bad_array_offset() {
        let data = words(&[9_999]);
        assert!(AbiReader::new(&data).uint_array(0).is_err());
    }

    #[test]
    fn test_abi_has_function() {
        let abi = serde_json::json!([
            {"type": "constructor", "inputs": []},
            {"type": "function", "name": "invest"},
            {"type": "event", "name": "Invested"},
        ]);
        assert!(abi_has_function(&abi, "invest"));
        assert!(!abi_has_function(&abi, "Invested"));
        assert!(!abi_has_function(&abi, "withdrawal"));
    }
}
