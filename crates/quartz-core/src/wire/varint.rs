//! base-128 varint：每字节 7 bit，小端分组，除末字节外均置续位。

use bytes::BufMut;

use crate::error::{CodecError, Result};

/// 64 位值的最大 varint 长度。
pub const MAX_VARINT_LEN: usize = 10;

/// 追加 `value` 的 varint 编码。
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8(((value & 0x7f) | 0x80) as u8);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// `value` 编码后的字节数。
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    // 每 7 个有效比特占一字节，0 也占一字节。
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// 从 `buf` 开头解码一个 varint，返回值与消费的字节数。
///
/// - 第 10 字节仍带续位，或携带超出 64 位的比特 → [`CodecError::MalformedVarint`]；
/// - 输入在续位未清除前耗尽 → [`CodecError::TruncatedOrOverlongMessage`]。
#[inline]
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (idx, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        if idx == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(CodecError::MalformedVarint);
        }
        value |= u64::from(byte & 0x7f) << (7 * idx);
        if byte & 0x80 == 0 {
            return Ok((value, idx + 1));
        }
    }
    Err(CodecError::TruncatedOrOverlongMessage {
        needed: buf.len() + 1,
        remaining: buf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        buf
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7f]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xac, 0x02]);
        assert_eq!(encode(1_000_000), [0xc0, 0x84, 0x3d]);
        assert_eq!(
            encode(u64::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn roundtrip_and_len() {
        for value in [0u64, 1, 127, 128, 255, 300, 16_384, 1 << 35, u64::MAX - 1, u64::MAX] {
            let bytes = encode(value);
            assert_eq!(bytes.len(), encoded_len(value), "value {value}");
            assert_eq!(decode_varint(&bytes).unwrap(), (value, bytes.len()));
        }
    }

    #[test]
    fn eleven_continuation_bytes_are_malformed() {
        let bytes = [0xffu8; 11];
        assert_eq!(decode_varint(&bytes), Err(CodecError::MalformedVarint));
    }

    #[test]
    fn overflowing_tenth_byte_is_malformed() {
        let mut bytes = [0xffu8; 10];
        bytes[9] = 0x02;
        assert_eq!(decode_varint(&bytes), Err(CodecError::MalformedVarint));
    }

    #[test]
    fn exhausted_input_is_truncation() {
        assert_eq!(
            decode_varint(&[0x80, 0x80]),
            Err(CodecError::TruncatedOrOverlongMessage {
                needed: 3,
                remaining: 2
            })
        );
        assert!(decode_varint(&[]).is_err());
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        assert_eq!(decode_varint(&[0xac, 0x02, 0x7f]).unwrap(), (300, 2));
    }
}
