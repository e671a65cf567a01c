//! # RLP Encoding and Decoding
//!
//! The length-prefixed, self-describing byte scheme used for trie nodes and
//! the transaction wire format. Every format in this workspace is a flat
//! list of byte strings, so the decoder exposes exactly that shape:
//! [`decode_list`] yields the raw payload of each element.

use crate::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("expected a list at the top level")]
    ExpectedList,

    #[error("nested lists are not supported by this format")]
    NestedList,

    #[error("trailing bytes after the encoded item")]
    TrailingBytes,

    #[error("integer field does not fit in 64 bits")]
    IntegerOverflow,

    #[error("integer field does not fit in 256 bits")]
    WideIntegerOverflow,
}

// =============================================================================
// ENCODING
// =============================================================================

/// RLP-encode a byte slice.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else if data.len() < 56 {
        let mut result = vec![0x80 + data.len() as u8];
        result.extend_from_slice(data);
        result
    } else {
        let len_bytes = encode_length(data.len());
        let mut result = vec![0xb7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(data);
        result
    }
}

/// RLP-encode two byte strings as a list.
pub fn encode_two_items(a: &[u8], b: &[u8]) -> Vec<u8> {
    encode_list_items(&[a.to_vec(), b.to_vec()])
}

/// RLP-encode multiple byte strings as a list.
pub fn encode_list_items(items: &[Vec<u8>]) -> Vec<u8> {
    let encoded_items: Vec<Vec<u8>> = items.iter().map(|i| encode_bytes(i)).collect();
    let total_len: usize = encoded_items.iter().map(|e| e.len()).sum();

    let mut result = Vec::with_capacity(total_len + 9);
    if total_len < 56 {
        result.push(0xc0 + total_len as u8);
    } else {
        let len_bytes = encode_length(total_len);
        result.push(0xf7 + len_bytes.len() as u8);
        result.extend_from_slice(&len_bytes);
    }
    for encoded in encoded_items {
        result.extend(encoded);
    }
    result
}

/// Minimal big-endian byte form of a `u64` (empty for zero).
pub fn uint_bytes(value: u64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Minimal big-endian byte form of a `U256` (empty for zero).
pub fn u256_bytes(value: &U256) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Encode a length as minimal big-endian bytes.
fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a top-level RLP list of byte strings.
///
/// Returns the raw payload of each element. Fails on truncated input,
/// nested lists, or bytes past the end of the list.
pub fn decode_list(data: &[u8]) -> Result<Vec<Vec<u8>>, RlpError> {
    let (payload, consumed) = list_payload(data)?;
    if consumed != data.len() {
        return Err(RlpError::TrailingBytes);
    }

    let mut items = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let (item, item_len) = decode_string(&payload[offset..])?;
        items.push(item);
        offset += item_len;
    }
    Ok(items)
}

/// Interpret a minimal big-endian payload as a `u64`.
pub fn decode_uint(bytes: &[u8]) -> Result<u64, RlpError> {
    if bytes.len() > 8 {
        return Err(RlpError::IntegerOverflow);
    }
    let mut value = 0u64;
    for &b in bytes {
        value = (value << 8) | b as u64;
    }
    Ok(value)
}

/// Interpret a minimal big-endian payload as a `U256`.
pub fn decode_u256(bytes: &[u8]) -> Result<U256, RlpError> {
    if bytes.len() > 32 {
        return Err(RlpError::WideIntegerOverflow);
    }
    Ok(U256::from_big_endian(bytes))
}

/// Split off the payload of a list header, returning it and the total
/// encoded length (header + payload).
fn list_payload(data: &[u8]) -> Result<(&[u8], usize), RlpError> {
    let &first = data.first().ok_or(RlpError::UnexpectedEof)?;
    if first < 0xc0 {
        return Err(RlpError::ExpectedList);
    }

    let (payload_len, header_len) = if first <= 0xf7 {
        ((first - 0xc0) as usize, 1)
    } else {
        let len_of_len = (first - 0xf7) as usize;
        let len_bytes = data.get(1..1 + len_of_len).ok_or(RlpError::UnexpectedEof)?;
        (decode_uint(len_bytes)? as usize, 1 + len_of_len)
    };

    let payload = data
        .get(header_len..header_len + payload_len)
        .ok_or(RlpError::UnexpectedEof)?;
    Ok((payload, header_len + payload_len))
}

/// Decode one byte-string element, returning its payload and encoded length.
fn decode_string(data: &[u8]) -> Result<(Vec<u8>, usize), RlpError> {
    let &first = data.first().ok_or(RlpError::UnexpectedEof)?;

    if first < 0x80 {
        return Ok((vec![first], 1));
    }
    if first >= 0xc0 {
        return Err(RlpError::NestedList);
    }

    let (payload_len, header_len) = if first <= 0xb7 {
        ((first - 0x80) as usize, 1)
    } else {
        let len_of_len = (first - 0xb7) as usize;
        let len_bytes = data.get(1..1 + len_of_len).ok_or(RlpError::UnexpectedEof)?;
        (decode_uint(len_bytes)? as usize, 1 + len_of_len)
    };

    let payload = data
        .get(header_len..header_len + payload_len)
        .ok_or(RlpError::UnexpectedEof)?;
    Ok((payload.to_vec(), header_len + payload_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_encodes_as_itself() {
        assert_eq!(encode_bytes(&[0x7F]), vec![0x7F]);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode_bytes(&[]), vec![0x80]);
    }

    #[test]
    fn test_short_string() {
        assert_eq!(encode_bytes(b"dog"), vec![0x83, b'd', b'o', b'g']);
    }

    #[test]
    fn test_long_string_header() {
        let data = vec![0xAA; 60];
        let encoded = encode_bytes(&data);
        assert_eq!(encoded[0], 0xb8);
        assert_eq!(encoded[1], 60);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn test_list_roundtrip() {
        let items = vec![b"cat".to_vec(), b"dog".to_vec(), Vec::new(), vec![0x01]];
        let encoded = encode_list_items(&items);
        let decoded = decode_list(&encoded).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_long_list_roundtrip() {
        let items: Vec<Vec<u8>> = (0..10).map(|i| vec![i; 17]).collect();
        let encoded = encode_list_items(&items);
        assert_eq!(encoded[0], 0xf8);
        let decoded = decode_list(&encoded).unwrap();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_uint_bytes_minimal() {
        assert_eq!(uint_bytes(0), Vec::<u8>::new());
        assert_eq!(uint_bytes(1), vec![1]);
        assert_eq!(uint_bytes(256), vec![1, 0]);
        assert_eq!(uint_bytes(u64::MAX), vec![0xFF; 8]);
    }

    #[test]
    fn test_uint_roundtrip() {
        for value in [0u64, 1, 127, 128, 255, 256, 21_000, u64::MAX] {
            assert_eq!(decode_uint(&uint_bytes(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_u256_roundtrip() {
        for value in [
            U256::zero(),
            U256::from(1u64),
            U256::from(20_000_000_000u64),
            U256::MAX,
        ] {
            assert_eq!(decode_u256(&u256_bytes(&value)).unwrap(), value);
        }
    }

    #[test]
    fn test_truncated_input_fails() {
        let encoded = encode_list_items(&[b"hello".to_vec()]);
        let result = decode_list(&encoded[..encoded.len() - 1]);
        assert_eq!(result, Err(RlpError::UnexpectedEof));
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut encoded = encode_list_items(&[b"hello".to_vec()]);
        encoded.push(0x00);
        assert_eq!(decode_list(&encoded), Err(RlpError::TrailingBytes));
    }

    #[test]
    fn test_top_level_string_rejected() {
        let encoded = encode_bytes(b"not a list");
        assert_eq!(decode_list(&encoded), Err(RlpError::ExpectedList));
    }

    #[test]
    fn test_oversized_uint_rejected() {
        assert_eq!(decode_uint(&[1; 9]), Err(RlpError::IntegerOverflow));
    }
}
