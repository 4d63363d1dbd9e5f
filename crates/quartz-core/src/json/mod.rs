//! # json 模块说明
//!
//! ## 角色定位（Why）
//! - 同一条 Quicksilver 消息在生态中有三种互不兼容的文本形态：LCD 网关使用的规范 JSON、旧版签名使用的
//!   Amino JSON、SDK 进程内交换的普通对象形式；
//! - 三种形态的差异可以完整地用一张“方言表”描述（键名大小写、是否输出默认值、64 位整数/枚举/字节/
//!   well-known 类型的渲染方式），因此这里只有一个遍历引擎，由 [`canonical`]、[`amino`]、[`sdk`]
//!   各自提供方言表与公开入口。
//!
//! ## 设计要求（What）
//! - 每种形态满足 `from_json(to_json(m)) == m`；
//! - 解析错误携带格式、消息名、字段名与期望类型（[`CodecError::Json`]）；
//! - 默认拒绝描述符之外的键；仅大小写不同的键会在错误中提示期望的键名。
//!
//! ## 执行方式（How）
//! - 渲染：按描述符字段顺序生成 `serde_json::Map`；
//! - 解析：遍历 JSON 对象的键，按方言匹配字段，再按字段种类与基数解析值；
//!   嵌套深度沿用 [`crate::config::DecodeLimits::max_depth`]。

pub mod amino;
pub mod canonical;
pub mod sdk;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use heck::ToLowerCamelCase;
use serde_json::{Map, Number, Value as Json};
use tracing::trace;

use crate::config::CodecConfig;
use crate::descriptor::{Cardinality, FieldDescriptor, FieldKind, MessageDescriptor, WellKnown};
use crate::error::{CodecError, JsonFormat, Result};
use crate::value::{FieldValue, MapKey, Message, Value};
use crate::wellknown;

/// JSON 对象键的命名方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyCase {
    /// lowerCamelCase；解析时同时接受原始 snake_case 名称。
    LowerCamel,
    /// 原始 snake_case 名称。
    Snake,
}

/// 64 位整数的渲染方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Int64Style {
    /// 十进制字符串，避免 JavaScript 数值精度丢失。
    String,
    /// 原生 JSON 整数。
    Number,
}

/// 字节字段的渲染方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BytesStyle {
    /// 标准 base64 字符串。
    Base64,
    /// 字节数值数组。
    Array,
}

/// Duration 的字符串形态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DurationStyle {
    /// `"<seconds>[.<frac>]s"`。
    Seconds,
    /// 总纳秒数的十进制字符串。
    Nanos,
}

/// 一种 JSON 形态的完整描述。
#[derive(Clone, Copy, Debug)]
pub(crate) struct Dialect {
    pub(crate) format: JsonFormat,
    pub(crate) keys: KeyCase,
    pub(crate) emit_defaults: bool,
    pub(crate) int64: Int64Style,
    pub(crate) enum_names: bool,
    pub(crate) bytes: BytesStyle,
    /// `None` 表示不对 well-known 类型做特殊渲染。
    pub(crate) durations: Option<DurationStyle>,
}

impl Dialect {
    fn key_of(&self, field: &FieldDescriptor) -> String {
        match self.keys {
            KeyCase::LowerCamel => field.name.to_lower_camel_case(),
            KeyCase::Snake => field.name.to_owned(),
        }
    }

    fn special(&self, descriptor: &MessageDescriptor) -> Option<WellKnown> {
        self.durations.and(descriptor.well_known)
    }

    fn error(
        &self,
        descriptor: &MessageDescriptor,
        field: &str,
        expected: &'static str,
        detail: impl Into<String>,
    ) -> CodecError {
        CodecError::Json {
            format: self.format,
            message: descriptor.name().to_owned(),
            field: field.to_owned(),
            expected,
            detail: detail.into(),
        }
    }

    // ---- 渲染 ----

    pub(crate) fn render(&self, message: &Message) -> Result<Json> {
        let descriptor = message.descriptor();
        if let Some(special) = self.special(descriptor) {
            return self.render_well_known(message, special);
        }

        let mut object = Map::new();
        for (field, slot) in message.fields() {
            let rendered = match slot {
                FieldValue::Singular(value) if self.emit_defaults || !value.is_default() => {
                    self.render_value(descriptor, field, value)?
                }
                FieldValue::Optional(Some(value)) => self.render_value(descriptor, field, value)?,
                FieldValue::Repeated(values) if self.emit_defaults || !values.is_empty() => {
                    Json::Array(
                        values
                            .iter()
                            .map(|value| self.render_value(descriptor, field, value))
                            .collect::<Result<_>>()?,
                    )
                }
                FieldValue::Map(entries) if self.emit_defaults || !entries.is_empty() => {
                    let mut rendered = Map::new();
                    for (key, value) in entries {
                        rendered.insert(key.to_json_key(), self.render_value(descriptor, field, value)?);
                    }
                    Json::Object(rendered)
                }
                _ => continue,
            };
            object.insert(self.key_of(field), rendered);
        }
        Ok(Json::Object(object))
    }

    fn render_value(
        &self,
        descriptor: &MessageDescriptor,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<Json> {
        Ok(match value {
            Value::Bool(v) => Json::Bool(*v),
            Value::Int32(v) => Json::from(*v),
            Value::Uint32(v) => Json::from(*v),
            Value::Int64(v) => match self.int64 {
                Int64Style::String => Json::String(v.to_string()),
                Int64Style::Number => Json::from(*v),
            },
            Value::Uint64(v) => match self.int64 {
                Int64Style::String => Json::String(v.to_string()),
                Int64Style::Number => Json::from(*v),
            },
            Value::String(v) => Json::String(v.clone()),
            Value::Bytes(v) => match self.bytes {
                BytesStyle::Base64 => Json::String(STANDARD.encode(v)),
                BytesStyle::Array => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
            },
            Value::Enum(number) => match field.kind {
                FieldKind::Enum(enumeration) if self.enum_names => enumeration
                    .name_of(*number)
                    .map_or_else(|| Json::from(*number), |name| Json::String(name.to_owned())),
                _ => Json::from(*number),
            },
            Value::Message(nested) => self.render(nested).map_err(|err| match err {
                CodecError::Json { .. } => err,
                other => self.error(descriptor, field.name, "renderable value", other.to_string()),
            })?,
        })
    }

    fn render_well_known(&self, message: &Message, special: WellKnown) -> Result<Json> {
        let (seconds, nanos) = wellknown::seconds_and_nanos(message);
        let descriptor = message.descriptor();
        match (special, self.durations) {
            (WellKnown::Timestamp, _) => wellknown::format_timestamp(seconds, nanos)
                .map(Json::String)
                .ok_or_else(|| {
                    self.error(
                        descriptor,
                        "seconds",
                        "timestamp within year 0001..=9999",
                        format!("seconds={seconds} nanos={nanos}"),
                    )
                }),
            (WellKnown::Duration, _) if !wellknown::is_normalized_duration(seconds, nanos) => {
                Err(self.error(
                    descriptor,
                    "nanos",
                    "normalized duration",
                    format!("seconds={seconds} nanos={nanos}"),
                ))
            }
            (WellKnown::Duration, Some(DurationStyle::Nanos)) => Ok(Json::String(
                wellknown::total_nanos(seconds, nanos).to_string(),
            )),
            (WellKnown::Duration, _) => Ok(Json::String(wellknown::format_duration(seconds, nanos))),
        }
    }

    // ---- 解析 ----

    pub(crate) fn parse(
        &self,
        descriptor: &'static MessageDescriptor,
        json: &Json,
        config: &CodecConfig,
    ) -> Result<Message> {
        self.parse_message(descriptor, json, config, 0)
    }

    fn parse_message(
        &self,
        descriptor: &'static MessageDescriptor,
        json: &Json,
        config: &CodecConfig,
        depth: u32,
    ) -> Result<Message> {
        if depth > config.decode.max_depth {
            return Err(CodecError::RecursionLimitExceeded {
                limit: config.decode.max_depth,
            });
        }
        if let Some(special) = self.special(descriptor) {
            return self.parse_well_known(descriptor, special, json);
        }

        let Json::Object(object) = json else {
            return Err(self.error(descriptor, "", "object", found(json)));
        };

        let mut message = Message::new(descriptor);
        for (key, value) in object {
            let Some((idx, field)) = self.field_for_key(descriptor, key) else {
                if config.json.reject_unknown_fields {
                    return Err(self.unknown_key(descriptor, key));
                }
                trace!(
                    format = %self.format,
                    message = descriptor.full_name(),
                    key = key.as_str(),
                    "ignoring unknown json key"
                );
                continue;
            };
            let slot = self.parse_field(descriptor, field, value, config, depth)?;
            *message.slot_mut(idx) = slot;
        }
        Ok(message)
    }

    fn field_for_key(
        &self,
        descriptor: &'static MessageDescriptor,
        key: &str,
    ) -> Option<(usize, &'static FieldDescriptor)> {
        descriptor
            .fields
            .iter()
            .enumerate()
            .find(|(_, field)| {
                self.key_of(field) == key || (self.keys == KeyCase::LowerCamel && field.name == key)
            })
    }

    fn unknown_key(&self, descriptor: &MessageDescriptor, key: &str) -> CodecError {
        let folded = fold_key(key);
        let hint = descriptor
            .fields
            .iter()
            .map(|field| self.key_of(field))
            .find(|candidate| fold_key(candidate) == folded);
        let detail = match hint {
            Some(expected) => format!("unknown key `{key}`, did you mean `{expected}`?"),
            None => format!("unknown key `{key}`"),
        };
        self.error(descriptor, key, "known field", detail)
    }

    fn parse_field(
        &self,
        descriptor: &'static MessageDescriptor,
        field: &'static FieldDescriptor,
        json: &Json,
        config: &CodecConfig,
        depth: u32,
    ) -> Result<FieldValue> {
        if json.is_null() {
            return Ok(FieldValue::default_for(field));
        }
        match field.cardinality {
            Cardinality::Repeated => {
                let Json::Array(items) = json else {
                    return Err(self.error(descriptor, field.name, "array", found(json)));
                };
                let values = items
                    .iter()
                    .map(|item| self.parse_value(descriptor, field, field.kind, item, config, depth))
                    .collect::<Result<Vec<_>>>()?;
                Ok(FieldValue::Repeated(values))
            }
            Cardinality::Map(key_kind) => {
                let Json::Object(items) = json else {
                    return Err(self.error(descriptor, field.name, "object", found(json)));
                };
                let mut entries = std::collections::BTreeMap::new();
                for (text, item) in items {
                    let key = MapKey::parse_json_key(key_kind, text).ok_or_else(|| {
                        self.error(
                            descriptor,
                            field.name,
                            key_kind.as_field_kind().name(),
                            format!("invalid map key `{text}`"),
                        )
                    })?;
                    let value = self.parse_value(descriptor, field, field.kind, item, config, depth)?;
                    entries.insert(key, value);
                }
                Ok(FieldValue::Map(entries))
            }
            Cardinality::Singular | Cardinality::Optional => {
                let value = self.parse_value(descriptor, field, field.kind, json, config, depth)?;
                Ok(if field.has_presence() {
                    FieldValue::Optional(Some(value))
                } else {
                    FieldValue::Singular(value)
                })
            }
        }
    }

    fn parse_value(
        &self,
        descriptor: &'static MessageDescriptor,
        field: &FieldDescriptor,
        kind: FieldKind,
        json: &Json,
        config: &CodecConfig,
        depth: u32,
    ) -> Result<Value> {
        let fail = |expected: &'static str| self.error(descriptor, field.name, expected, found(json));
        match kind {
            FieldKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| fail("bool")),
            FieldKind::String => json
                .as_str()
                .map(|s| Value::String(s.to_owned()))
                .ok_or_else(|| fail("string")),
            FieldKind::Int32 => integer(json).map(Value::Int32).ok_or_else(|| fail("int32")),
            FieldKind::Uint32 => integer(json).map(Value::Uint32).ok_or_else(|| fail("uint32")),
            FieldKind::Int64 => integer(json)
                .map(Value::Int64)
                .ok_or_else(|| fail("int64 (decimal string or number)")),
            FieldKind::Uint64 => integer(json)
                .map(Value::Uint64)
                .ok_or_else(|| fail("uint64 (decimal string or number)")),
            FieldKind::Bytes => parse_bytes(json).map(Value::Bytes).ok_or_else(|| {
                fail(match self.bytes {
                    BytesStyle::Base64 => "base64 string",
                    BytesStyle::Array => "byte array",
                })
            }),
            FieldKind::Enum(enumeration) => match json {
                Json::String(name) => enumeration.number_of(name).map(Value::Enum).ok_or_else(|| {
                    self.error(
                        descriptor,
                        field.name,
                        "enum name or number",
                        format!("`{name}` is not a value of {}", enumeration.full_name),
                    )
                }),
                other => integer(other).map(Value::Enum).ok_or_else(|| fail("enum name or number")),
            },
            FieldKind::Message(nested) => {
                let message = self.parse_message(nested, json, config, depth + 1)?;
                Ok(Value::Message(Box::new(message)))
            }
        }
    }

    fn parse_well_known(
        &self,
        descriptor: &'static MessageDescriptor,
        special: WellKnown,
        json: &Json,
    ) -> Result<Message> {
        let parts = match (special, self.durations) {
            (WellKnown::Timestamp, _) => json
                .as_str()
                .and_then(wellknown::parse_timestamp)
                .ok_or_else(|| self.error(descriptor, "", "RFC 3339 timestamp", found(json)))?,
            (WellKnown::Duration, Some(DurationStyle::Nanos)) => integer::<i128>(json)
                .and_then(wellknown::split_nanos)
                .ok_or_else(|| {
                    self.error(descriptor, "", "duration in nanoseconds", found(json))
                })?,
            (WellKnown::Duration, _) => json
                .as_str()
                .and_then(wellknown::parse_duration)
                .ok_or_else(|| self.error(descriptor, "", "duration string like \"1.5s\"", found(json)))?,
        };
        wellknown::from_seconds_and_nanos(descriptor, parts.0, parts.1)
    }
}

/// JSON 数字或十进制字符串 → 目标整数类型；越界或非整数返回 `None`。
fn integer<T: TryFrom<i128>>(json: &Json) -> Option<T> {
    let wide = match json {
        Json::Number(number) => number_to_i128(number)?,
        Json::String(text) => text.trim().parse::<i128>().ok()?,
        _ => return None,
    };
    T::try_from(wide).ok()
}

fn number_to_i128(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

fn parse_bytes(json: &Json) -> Option<Vec<u8>> {
    match json {
        Json::String(text) => [STANDARD, URL_SAFE, STANDARD_NO_PAD, URL_SAFE_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(text).ok()),
        Json::Array(items) => items.iter().map(integer::<u8>).collect(),
        _ => None,
    }
}

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn found(json: &Json) -> String {
    let kind = match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };
    format!("found {kind}")
}

/// 把文本解析为 JSON 文档，失败时返回带格式信息的错误。
pub(crate) fn parse_document(
    format: JsonFormat,
    descriptor: &MessageDescriptor,
    text: &str,
) -> Result<Json> {
    serde_json::from_str(text).map_err(|err| CodecError::Json {
        format,
        message: descriptor.name().to_owned(),
        field: String::new(),
        expected: "JSON document",
        detail: err.to_string(),
    })
}

/// 把 JSON 值序列化为紧凑文本。
pub(crate) fn write_document(format: JsonFormat, message: &Message, json: &Json) -> Result<String> {
    serde_json::to_string(json).map_err(|err| CodecError::Json {
        format,
        message: message.descriptor().name().to_owned(),
        field: String::new(),
        expected: "serializable value",
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_accept_numbers_and_strings() {
        assert_eq!(integer::<u64>(&Json::from("18446744073709551615")), Some(u64::MAX));
        assert_eq!(integer::<i64>(&Json::from(-4)), Some(-4));
        assert_eq!(integer::<u32>(&Json::from(-4)), None);
        assert_eq!(integer::<i32>(&serde_json::json!(1.5)), None);
        assert_eq!(integer::<i32>(&Json::Bool(true)), None);
    }

    #[test]
    fn bytes_accept_base64_variants_and_arrays() {
        assert_eq!(parse_bytes(&Json::from("+/8=")), Some(vec![0xfb, 0xff]));
        assert_eq!(parse_bytes(&Json::from("-_8")), Some(vec![0xfb, 0xff]));
        assert_eq!(parse_bytes(&serde_json::json!([1, 2, 255])), Some(vec![1, 2, 255]));
        assert_eq!(parse_bytes(&serde_json::json!([256])), None);
    }

    #[test]
    fn folded_keys_ignore_case_and_underscores() {
        assert_eq!(fold_key("chainId"), fold_key("chain_id"));
        assert_eq!(fold_key("ChainID"), "chainid");
    }
}
