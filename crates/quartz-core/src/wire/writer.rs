use bytes::{BufMut, Bytes, BytesMut};

use super::{Tag, WireType, varint};
use crate::error::Result;

/// 追加式写入器，编码期间只向内部缓冲追加，从不修改源消息。
///
/// # 教案式说明
/// - **Why**：嵌套消息的长度要在子消息写完后才可知，`fork`/`ldelim` 在写入流中预留位置并回填长度前缀；
/// - **How**：`fork` 记录当前偏移并返回 [`Fork`] 凭据，`ldelim` 截下凭据之后的字节、写入其长度的 varint
///   再接回原处；凭据按值消费，静态保证每次 `fork` 恰好对应一次 `ldelim`；
/// - **What**：`finish` 冻结为只读 [`Bytes`]。
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
}

/// 一次 `fork` 的凭据，交回 [`Writer::ldelim`] 完成长度回填。
#[derive(Debug)]
#[must_use = "每个 fork 必须交给 Writer::ldelim 回填长度"]
pub struct Fork {
    start: usize,
}

impl Writer {
    /// 创建空写入器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以预留容量创建写入器。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// 已写入的字节数。
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否尚未写入任何字节。
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 当前已写入内容的只读视图。
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// 写入标签字；字段号越界时返回 `InvalidFieldNumber`。
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) -> Result<()> {
        let tag = Tag::new(field_number, wire_type)?;
        self.write_varint(tag.to_raw());
        Ok(())
    }

    /// 写入无符号 varint。
    pub fn write_varint(&mut self, value: u64) {
        varint::encode_varint(value, &mut self.buf);
    }

    /// 写入 bool（0/1 varint）。
    pub fn write_bool(&mut self, value: bool) {
        self.write_varint(u64::from(value));
    }

    /// 写入 int32；负数按 64 位符号扩展，占满 10 字节。
    pub fn write_int32(&mut self, value: i32) {
        self.write_varint(i64::from(value) as u64);
    }

    /// 写入 int64（非 zig-zag）。
    pub fn write_int64(&mut self, value: i64) {
        self.write_varint(value as u64);
    }

    /// 写入 uint32。
    pub fn write_uint32(&mut self, value: u32) {
        self.write_varint(u64::from(value));
    }

    /// 写入 uint64。
    pub fn write_uint64(&mut self, value: u64) {
        self.write_varint(value);
    }

    /// 写入 4 字节小端定长值。
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// 写入 8 字节小端定长值。
    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    /// 写入长度前缀 + 原始字节。
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_varint(value.len() as u64);
        self.buf.put_slice(value);
    }

    /// 写入长度前缀 + UTF-8 字节。
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// 开启一段长度前缀负载。
    pub fn fork(&mut self) -> Fork {
        Fork {
            start: self.buf.len(),
        }
    }

    /// 结束 `fork` 开启的负载：在其起点前插入负载长度。
    pub fn ldelim(&mut self, fork: Fork) {
        let payload = self.buf.split_off(fork.start);
        varint::encode_varint(payload.len() as u64, &mut self.buf);
        self.buf.put_slice(&payload);
    }

    /// 冻结为只读字节。
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_ldelim_prefixes_length() {
        let mut writer = Writer::new();
        writer.write_tag(1, WireType::LengthDelimited).unwrap();
        let fork = writer.fork();
        writer.write_tag(1, WireType::Varint).unwrap();
        writer.write_uint64(150);
        writer.ldelim(fork);
        assert_eq!(&writer.finish()[..], &[0x0a, 0x03, 0x08, 0x96, 0x01]);
    }

    #[test]
    fn nested_forks_unwind_in_order() {
        let mut writer = Writer::new();
        let outer = writer.fork();
        writer.write_tag(2, WireType::LengthDelimited).unwrap();
        let inner = writer.fork();
        writer.write_string("ab");
        writer.ldelim(inner);
        writer.ldelim(outer);
        // outer: len 5 = tag(1) + inner len(1) + "ab" prefix(1) + 2
        assert_eq!(&writer.finish()[..], &[0x05, 0x12, 0x03, 0x02, b'a', b'b']);
    }

    #[test]
    fn empty_fork_writes_zero_length() {
        let mut writer = Writer::new();
        writer.write_tag(1, WireType::LengthDelimited).unwrap();
        let fork = writer.fork();
        writer.ldelim(fork);
        assert_eq!(writer.as_slice(), &[0x0a, 0x00]);
    }

    #[test]
    fn negative_int32_sign_extends() {
        let mut writer = Writer::new();
        writer.write_int32(-1);
        assert_eq!(writer.len(), 10);
        assert_eq!(
            writer.as_slice(),
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn invalid_field_number_is_rejected_at_encode() {
        let mut writer = Writer::new();
        assert!(writer.write_tag(0, WireType::Varint).is_err());
        assert!(writer.is_empty());
    }
}
