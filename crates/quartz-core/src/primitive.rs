//! 标量字段编解码：把 [`Value`] 写成线格式负载，或按 [`FieldKind`] 读回。
//!
//! # 教案式说明
//! - **Why**：整数、bool、枚举共享 varint，字符串与字节共享长度前缀，把这些规则集中在一处，
//!   映射器只需关心“哪个字段、出现几次”；
//! - **What**：整数一律按普通 varint 编码（非 zig-zag），负的 int32/枚举符号扩展为 10 字节；
//!   解码 32 位整数时截断到低 32 位，与 protobuf 运行时一致；
//! - **How**：消息种类不在此处理，由映射器借助 [`Writer::fork`] 与 [`Reader::nested`] 递归完成。

use crate::config::Utf8Policy;
use crate::descriptor::FieldKind;
use crate::error::{CodecError, Result};
use crate::value::Value;
use crate::wire::{Reader, Writer};

/// 写入标量负载（不含标签）。
///
/// 消息值不由本函数负责，传入时返回 [`CodecError::TypeMismatch`]。
pub fn write_scalar(writer: &mut Writer, value: &Value, field: &str) -> Result<()> {
    match value {
        Value::Bool(v) => writer.write_bool(*v),
        Value::Int32(v) | Value::Enum(v) => writer.write_int32(*v),
        Value::Int64(v) => writer.write_int64(*v),
        Value::Uint32(v) => writer.write_uint32(*v),
        Value::Uint64(v) => writer.write_uint64(*v),
        Value::String(v) => writer.write_string(v),
        Value::Bytes(v) => writer.write_bytes(v),
        Value::Message(_) => {
            return Err(CodecError::TypeMismatch {
                field: field.to_owned(),
                expected: "scalar",
                actual: "message",
            });
        }
    }
    Ok(())
}

/// 按字段种类读取标量负载（标签已由调用方读取并校验）。
///
/// `field` 为 `Message.field` 形式的路径，用于错误定位。
pub fn read_scalar(reader: &mut Reader<'_>, kind: FieldKind, field: &str) -> Result<Value> {
    Ok(match kind {
        FieldKind::Bool => Value::Bool(reader.read_varint()? != 0),
        FieldKind::Int32 => Value::Int32(reader.read_varint()? as i32),
        FieldKind::Enum(_) => Value::Enum(reader.read_varint()? as i32),
        FieldKind::Int64 => Value::Int64(reader.read_varint()? as i64),
        FieldKind::Uint32 => Value::Uint32(reader.read_varint()? as u32),
        FieldKind::Uint64 => Value::Uint64(reader.read_varint()?),
        FieldKind::Bytes => Value::Bytes(reader.read_length_delimited()?.to_vec()),
        FieldKind::String => {
            let policy = reader.limits().utf8;
            let raw = reader.read_length_delimited()?;
            Value::String(decode_utf8(raw, policy, field)?)
        }
        FieldKind::Message(_) => {
            return Err(CodecError::TypeMismatch {
                field: field.to_owned(),
                expected: "scalar",
                actual: "message",
            });
        }
    })
}

/// 按 [`Utf8Policy`] 解码字符串字节。
pub fn decode_utf8(raw: &[u8], policy: Utf8Policy, field: &str) -> Result<String> {
    match policy {
        Utf8Policy::Strict => String::from_utf8(raw.to_vec()).map_err(|_| {
            CodecError::InvalidEncoding {
                field: field.to_owned(),
            }
        }),
        Utf8Policy::Lossy => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeLimits;

    fn roundtrip(value: Value, kind: FieldKind) -> Value {
        let mut writer = Writer::new();
        write_scalar(&mut writer, &value, "T.f").unwrap();
        let bytes = writer.finish();
        let mut reader = Reader::new(&bytes);
        let decoded = read_scalar(&mut reader, kind, "T.f").unwrap();
        assert!(reader.is_empty());
        decoded
    }

    #[test]
    fn negative_int32_survives_sign_extension() {
        assert_eq!(roundtrip(Value::Int32(-5), FieldKind::Int32), Value::Int32(-5));
        assert_eq!(roundtrip(Value::Int64(i64::MIN), FieldKind::Int64), Value::Int64(i64::MIN));
    }

    #[test]
    fn uint64_keeps_full_precision() {
        let big = (1u64 << 53) + 1;
        assert_eq!(roundtrip(Value::Uint64(big), FieldKind::Uint64), Value::Uint64(big));
        assert_eq!(
            roundtrip(Value::Uint64(u64::MAX), FieldKind::Uint64),
            Value::Uint64(u64::MAX)
        );
    }

    #[test]
    fn int32_decode_truncates_to_low_bits() {
        // 2^32 + 7 作为 int32 读取时只保留低 32 位。
        let mut writer = Writer::new();
        writer.write_uint64((1 << 32) + 7);
        let bytes = writer.finish();
        let value = read_scalar(&mut Reader::new(&bytes), FieldKind::Int32, "T.f").unwrap();
        assert_eq!(value, Value::Int32(7));
    }

    #[test]
    fn invalid_utf8_follows_policy() {
        let bytes = [0x02, 0xff, 0xfe];
        let err = read_scalar(&mut Reader::new(&bytes), FieldKind::String, "ZoneDrop.chain_id")
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidEncoding {
                field: "ZoneDrop.chain_id".into()
            }
        );

        let limits = DecodeLimits {
            utf8: Utf8Policy::Lossy,
            ..DecodeLimits::default()
        };
        let value =
            read_scalar(&mut Reader::with_limits(&bytes, limits), FieldKind::String, "T.f").unwrap();
        assert_eq!(value, Value::String("\u{fffd}\u{fffd}".into()));
    }

    #[test]
    fn bytes_and_bool_payloads() {
        assert_eq!(
            roundtrip(Value::Bytes(vec![0, 1, 2]), FieldKind::Bytes),
            Value::Bytes(vec![0, 1, 2])
        );
        assert_eq!(roundtrip(Value::Bool(true), FieldKind::Bool), Value::Bool(true));
    }
}
