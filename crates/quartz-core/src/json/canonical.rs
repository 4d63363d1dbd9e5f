//! 规范 JSON（protobuf JSON mapping），LCD 网关与查询客户端使用的形态。
//!
//! - 键名为 lowerCamelCase，解析时同时接受原始 snake_case 名称；
//! - 非存在位字段总是输出（含默认值），存在位字段未设置时省略；
//! - 64 位整数渲染为十进制字符串，字节为标准 base64，枚举为符号名；
//! - Timestamp 为 RFC 3339 字符串，Duration 为 `"1.5s"` 形式。

use serde_json::Value as Json;

use super::{BytesStyle, Dialect, DurationStyle, Int64Style, KeyCase, parse_document, write_document};
use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::error::{JsonFormat, Result};
use crate::value::Message;

const DIALECT: Dialect = Dialect {
    format: JsonFormat::Canonical,
    keys: KeyCase::LowerCamel,
    emit_defaults: true,
    int64: Int64Style::String,
    enum_names: true,
    bytes: BytesStyle::Base64,
    durations: Some(DurationStyle::Seconds),
};

/// 渲染为规范 JSON 值。
pub fn to_json(message: &Message) -> Result<Json> {
    DIALECT.render(message)
}

/// 渲染为紧凑的规范 JSON 文本。
pub fn to_string(message: &Message) -> Result<String> {
    let json = to_json(message)?;
    write_document(DIALECT.format, message, &json)
}

/// 以默认配置解析。
pub fn from_json(descriptor: &'static MessageDescriptor, json: &Json) -> Result<Message> {
    from_json_with(descriptor, json, &CodecConfig::default())
}

/// 以指定配置解析。
pub fn from_json_with(
    descriptor: &'static MessageDescriptor,
    json: &Json,
    config: &CodecConfig,
) -> Result<Message> {
    DIALECT.parse(descriptor, json, config)
}

/// 从 JSON 文本解析。
pub fn from_str(descriptor: &'static MessageDescriptor, text: &str) -> Result<Message> {
    let json = parse_document(DIALECT.format, descriptor, text)?;
    from_json(descriptor, &json)
}
