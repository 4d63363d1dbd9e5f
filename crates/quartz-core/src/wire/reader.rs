use super::{Tag, WireType, varint};
use crate::config::DecodeLimits;
use crate::error::{CodecError, Result};

/// 有界读取器：只能读取 `[pos, end)` 内的字节。
///
/// # 教案式说明
/// - **Why**：嵌套消息的长度前缀决定了子解码器的活动范围，越界读取意味着输入损坏，必须显式失败而不是
///   悄悄读到父消息的字节；
/// - **How**：[`Reader::nested`] 读取长度前缀并切出恰好 `len` 字节的子读取器，父读取器同时前移；
///   子读取器在自身边界内循环解码，因此“子解码结束时位置必须等于 `pos + len`”由构造保证；
/// - **What**：读取器同时携带 [`DecodeLimits`] 与当前嵌套深度，供映射器执行深度与 UTF-8 策略。
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: u32,
    limits: DecodeLimits,
}

impl<'a> Reader<'a> {
    /// 以默认限额创建读取器。
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, DecodeLimits::default())
    }

    /// 以指定限额创建读取器。
    pub fn with_limits(buf: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            limits,
        }
    }

    /// 当前读取位置（相对本读取器起点）。
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 剩余可读字节数。
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 是否已读到边界。
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// 当前嵌套深度，顶层为 0。
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// 读取器携带的限额。
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// 读取一个 varint。
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = varint::decode_varint(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    /// 读取标签字。
    pub fn read_tag(&mut self) -> Result<Tag> {
        let raw = self.read_varint()?;
        Tag::from_raw(raw)
    }

    /// 读取 4 字节小端定长值。
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }

    /// 读取 8 字节小端定长值。
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }

    /// 读取长度前缀并返回对应的原始字节切片。
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| CodecError::TruncatedOrOverlongMessage {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.take(len)
    }

    /// 读取嵌套消息负载，返回深度加一的子读取器。
    pub fn nested(&mut self) -> Result<Reader<'a>> {
        let depth = self.depth + 1;
        if depth > self.limits.max_depth {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.limits.max_depth,
            });
        }
        let payload = self.read_length_delimited()?;
        Ok(Reader {
            buf: payload,
            pos: 0,
            depth,
            limits: self.limits,
        })
    }

    /// 读取 packed 数组负载，子读取器与父读取器同深度。
    pub fn packed(&mut self) -> Result<Reader<'a>> {
        let payload = self.read_length_delimited()?;
        Ok(Reader {
            buf: payload,
            pos: 0,
            depth: self.depth,
            limits: self.limits,
        })
    }

    /// 按线类型跳过一个字段负载。
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::TruncatedOrOverlongMessage {
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }
}
