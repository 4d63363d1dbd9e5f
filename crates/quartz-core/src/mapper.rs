//! # mapper 模块说明
//!
//! ## 角色定位（Why）
//! - 把“描述符 + 实例”与“线格式字节”双向映射，是所有 Quicksilver 消息共用的唯一编解码路径；
//! - 同一路径也负责把稀疏的 [`Partial`] 合并到基准实例上，替代逐消息手写的 `fromPartial`。
//!
//! ## 设计要求（What）
//! - 单值标量等于默认值时不写入线格式；带存在位的字段（`Optional` 与单值消息字段）存在即写入；
//! - 重复的数值/bool/枚举字段以 packed 形式写出，解码同时接受 packed 与逐元素形式；
//! - map 条目按键序写出，条目内默认标量省略、消息值总是写入；解码容忍任意顺序与重复键（后者覆盖）；
//! - 未知字段按线类型跳过并记录 `trace` 日志，已知字段线类型不符即失败，绝不静默退化为默认值。
//!
//! ## 执行方式（How）
//! - 编码遍历描述符字段表，嵌套消息通过 [`Writer::fork`]/[`Writer::ldelim`] 回填长度；
//! - 解码在有界 [`Reader`] 上循环读取标签，嵌套消息在子读取器中递归，深度由 [`DecodeLimits`] 约束。
//!
//! [`DecodeLimits`]: crate::config::DecodeLimits

use std::collections::BTreeMap;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::descriptor::{Cardinality, FieldDescriptor, FieldKind, MapKeyKind, MessageDescriptor};
use crate::error::{CodecError, Result};
use crate::primitive::{read_scalar, write_scalar};
use crate::value::{FieldValue, MapKey, Message, Partial, PartialValue, Value};
use crate::wire::{Reader, WireType, Writer};

const MAP_KEY_FIELD: u32 = 1;
const MAP_VALUE_FIELD: u32 = 2;

/// 全默认值实例。
pub fn defaults(descriptor: &'static MessageDescriptor) -> Message {
    Message::new(descriptor)
}

/// 编码为独立的字节序列。
///
/// ```rust
/// use quartz_core::descriptor::MessageDescriptor;
/// use quartz_core::{mapper, Message};
///
/// static PARAMS: MessageDescriptor = MessageDescriptor::new("/quicksilver.airdrop.v1.Params", &[]);
///
/// let bytes = mapper::encode(&Message::new(&PARAMS))?;
/// assert!(bytes.is_empty());
/// # Ok::<(), quartz_core::CodecError>(())
/// ```
pub fn encode(message: &Message) -> Result<Bytes> {
    let mut writer = Writer::new();
    encode_into(message, &mut writer)?;
    Ok(writer.finish())
}

/// 把消息字段追加写入已有的写入器（不含外层长度前缀）。
pub fn encode_into(message: &Message, writer: &mut Writer) -> Result<()> {
    for (field, slot) in message.fields() {
        match slot {
            FieldValue::Singular(value) => {
                if !value.is_default() {
                    write_field(writer, field.number, field.kind, value, field.name)?;
                }
            }
            FieldValue::Optional(Some(value)) => {
                write_field(writer, field.number, field.kind, value, field.name)?;
            }
            FieldValue::Optional(None) => {}
            FieldValue::Repeated(values) if values.is_empty() => {}
            FieldValue::Repeated(values) if field.kind.is_packable() => {
                writer.write_tag(field.number, WireType::LengthDelimited)?;
                let fork = writer.fork();
                for value in values {
                    write_scalar(writer, value, field.name)?;
                }
                writer.ldelim(fork);
            }
            FieldValue::Repeated(values) => {
                for value in values {
                    write_field(writer, field.number, field.kind, value, field.name)?;
                }
            }
            FieldValue::Map(entries) => {
                let Cardinality::Map(key_kind) = field.cardinality else {
                    continue;
                };
                for (key, value) in entries {
                    write_map_entry(writer, field, key_kind, key, value)?;
                }
            }
        }
    }
    Ok(())
}

fn write_field(
    writer: &mut Writer,
    number: u32,
    kind: FieldKind,
    value: &Value,
    name: &str,
) -> Result<()> {
    writer.write_tag(number, kind.wire_type())?;
    match value {
        Value::Message(nested) => {
            let fork = writer.fork();
            encode_into(nested, writer)?;
            writer.ldelim(fork);
            Ok(())
        }
        scalar => write_scalar(writer, scalar, name),
    }
}

fn write_map_entry(
    writer: &mut Writer,
    field: &FieldDescriptor,
    key_kind: MapKeyKind,
    key: &MapKey,
    value: &Value,
) -> Result<()> {
    writer.write_tag(field.number, WireType::LengthDelimited)?;
    let fork = writer.fork();
    let key = key.to_value();
    if !key.is_default() {
        write_field(writer, MAP_KEY_FIELD, key_kind.as_field_kind(), &key, field.name)?;
    }
    if !value.is_default() {
        write_field(writer, MAP_VALUE_FIELD, field.kind, value, field.name)?;
    }
    writer.ldelim(fork);
    Ok(())
}

/// 以默认配置解码。
pub fn decode(descriptor: &'static MessageDescriptor, bytes: &[u8]) -> Result<Message> {
    decode_with(descriptor, bytes, &CodecConfig::default())
}

/// 以指定配置解码；任何结构性错误都使整次调用失败，不返回部分结果。
pub fn decode_with(
    descriptor: &'static MessageDescriptor,
    bytes: &[u8],
    config: &CodecConfig,
) -> Result<Message> {
    let limits = config.decode;
    let result = if bytes.len() > limits.max_message_bytes {
        Err(CodecError::MessageTooLarge {
            size: bytes.len(),
            limit: limits.max_message_bytes,
        })
    } else {
        decode_from(descriptor, &mut Reader::with_limits(bytes, limits))
    };
    if let Err(err) = &result {
        debug!(
            type_url = descriptor.type_url,
            code = err.code(),
            error = %err,
            "decode failed"
        );
    }
    result
}

/// 从有界读取器解码，读到读取器边界为止。
pub fn decode_from(descriptor: &'static MessageDescriptor, reader: &mut Reader<'_>) -> Result<Message> {
    let mut message = Message::new(descriptor);
    while !reader.is_empty() {
        let tag = reader.read_tag()?;
        let Some((idx, field)) = descriptor.field_by_number(tag.field_number) else {
            trace!(
                message = descriptor.full_name(),
                field_number = tag.field_number,
                wire_type = ?tag.wire_type,
                "skipping unknown field"
            );
            reader.skip_field(tag.wire_type)?;
            continue;
        };
        decode_field(&mut message, idx, descriptor, field, tag.wire_type, reader)?;
    }
    Ok(message)
}

fn decode_field(
    message: &mut Message,
    idx: usize,
    descriptor: &MessageDescriptor,
    field: &'static FieldDescriptor,
    wire_type: WireType,
    reader: &mut Reader<'_>,
) -> Result<()> {
    let mismatch = |expected: WireType| CodecError::WireTypeMismatch {
        field: field_path(descriptor, field),
        expected,
        actual: wire_type,
    };

    match field.cardinality {
        Cardinality::Map(key_kind) => {
            if wire_type != WireType::LengthDelimited {
                return Err(mismatch(WireType::LengthDelimited));
            }
            let (key, value) = read_map_entry(descriptor, field, key_kind, reader)?;
            if let FieldValue::Map(entries) = message.slot_mut(idx) {
                entries.insert(key, value);
            }
        }
        Cardinality::Repeated => {
            let FieldValue::Repeated(values) = message.slot_mut(idx) else {
                return Ok(());
            };
            if wire_type == WireType::LengthDelimited && field.kind.is_packable() {
                let mut packed = reader.packed()?;
                while !packed.is_empty() {
                    values.push(read_value(&mut packed, descriptor, field, field.kind)?);
                }
            } else if wire_type == field.kind.wire_type() {
                values.push(read_value(reader, descriptor, field, field.kind)?);
            } else {
                return Err(mismatch(field.kind.wire_type()));
            }
        }
        Cardinality::Singular | Cardinality::Optional => {
            if wire_type != field.kind.wire_type() {
                return Err(mismatch(field.kind.wire_type()));
            }
            let value = read_value(reader, descriptor, field, field.kind)?;
            *message.slot_mut(idx) = if field.has_presence() {
                FieldValue::Optional(Some(value))
            } else {
                FieldValue::Singular(value)
            };
        }
    }
    Ok(())
}

fn read_value(
    reader: &mut Reader<'_>,
    descriptor: &MessageDescriptor,
    field: &FieldDescriptor,
    kind: FieldKind,
) -> Result<Value> {
    match kind {
        FieldKind::Message(nested) => {
            let mut child = reader.nested()?;
            Ok(Value::Message(Box::new(decode_from(nested, &mut child)?)))
        }
        scalar => read_scalar(reader, scalar, field.name).map_err(|err| match err {
            CodecError::InvalidEncoding { .. } => CodecError::InvalidEncoding {
                field: field_path(descriptor, field),
            },
            other => other,
        }),
    }
}

fn read_map_entry(
    descriptor: &MessageDescriptor,
    field: &FieldDescriptor,
    key_kind: MapKeyKind,
    reader: &mut Reader<'_>,
) -> Result<(MapKey, Value)> {
    let mut entry = reader.nested()?;
    let mut key = MapKey::default_for(key_kind);
    let mut value = None;

    while !entry.is_empty() {
        let tag = entry.read_tag()?;
        let expected = match tag.field_number {
            MAP_KEY_FIELD => key_kind.as_field_kind(),
            MAP_VALUE_FIELD => field.kind,
            _ => {
                entry.skip_field(tag.wire_type)?;
                continue;
            }
        };
        if tag.wire_type != expected.wire_type() {
            return Err(CodecError::WireTypeMismatch {
                field: field_path(descriptor, field),
                expected: expected.wire_type(),
                actual: tag.wire_type,
            });
        }
        let decoded = read_value(&mut entry, descriptor, field, expected)?;
        if tag.field_number == MAP_KEY_FIELD {
            key = MapKey::from_value(decoded, key_kind, field.name)?;
        } else {
            value = Some(decoded);
        }
    }

    Ok((key, value.unwrap_or_else(|| Value::default_for(field.kind))))
}

fn field_path(descriptor: &MessageDescriptor, field: &FieldDescriptor) -> String {
    format!("{}.{}", descriptor.name(), field.name)
}

/// 把部分消息合并到基准实例上，返回新实例；基准不被修改。
///
/// 提供且非 null 的值覆盖基准；嵌套 [`Partial`] 递归合并到基准中已有的嵌套消息（缺失时以默认实例为起点）；
/// 列表与 map 整体替换。
pub fn merge_partial(base: &Message, partial: &Partial) -> Result<Message> {
    let descriptor = base.descriptor();
    let mut merged = base.clone();
    for (name, provided) in partial.iter() {
        let (idx, field) =
            descriptor
                .field_by_name(name)
                .ok_or_else(|| CodecError::FieldNotFound {
                    message: descriptor.full_name().to_owned(),
                    field: name.to_owned(),
                })?;
        if matches!(provided, PartialValue::Null) {
            continue;
        }
        let slot = resolve_slot(field, merged.slot(idx), provided)?;
        *merged.slot_mut(idx) = slot;
    }
    Ok(merged)
}

/// 以默认实例为基准构造消息。
pub fn from_partial(descriptor: &'static MessageDescriptor, partial: &Partial) -> Result<Message> {
    merge_partial(&Message::new(descriptor), partial)
}

fn resolve_slot(
    field: &FieldDescriptor,
    base: &FieldValue,
    provided: &PartialValue,
) -> Result<FieldValue> {
    match field.cardinality {
        Cardinality::Repeated => {
            let PartialValue::List(items) = provided else {
                return Err(partial_mismatch(field, "list", provided));
            };
            let values = items
                .iter()
                .map(|item| resolve_value(field, None, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldValue::Repeated(values))
        }
        Cardinality::Map(key_kind) => {
            let PartialValue::Map(items) = provided else {
                return Err(partial_mismatch(field, "map", provided));
            };
            let mut entries = BTreeMap::new();
            for (key, item) in items {
                let key = MapKey::from_value(key.to_value(), key_kind, field.name)?;
                entries.insert(key, resolve_value(field, None, item)?);
            }
            Ok(FieldValue::Map(entries))
        }
        Cardinality::Singular | Cardinality::Optional => {
            let value = resolve_value(field, base.as_value(), provided)?;
            Ok(if field.has_presence() {
                FieldValue::Optional(Some(value))
            } else {
                FieldValue::Singular(value)
            })
        }
    }
}

fn resolve_value(
    field: &FieldDescriptor,
    base: Option<&Value>,
    provided: &PartialValue,
) -> Result<Value> {
    match (provided, field.kind) {
        (PartialValue::Scalar(value), kind) => value.clone().coerce(kind, field.name),
        (PartialValue::Message(nested), FieldKind::Message(descriptor)) => {
            let merged = match base {
                Some(Value::Message(existing)) => merge_partial(existing, nested)?,
                _ => from_partial(descriptor, nested)?,
            };
            Ok(Value::Message(Box::new(merged)))
        }
        (other, _) => Err(partial_mismatch(field, field.kind.name(), other)),
    }
}

fn partial_mismatch(
    field: &FieldDescriptor,
    expected: &'static str,
    provided: &PartialValue,
) -> CodecError {
    let actual = match provided {
        PartialValue::Null => "null",
        PartialValue::Scalar(value) => value.kind_name(),
        PartialValue::Message(_) => "partial message",
        PartialValue::List(_) => "list",
        PartialValue::Map(_) => "map",
    };
    CodecError::TypeMismatch {
        field: field.name.to_owned(),
        expected,
        actual,
    }
}
