//! SDK 进程内普通对象形态，仅用于同一进程内与 SDK 风格对象互换。
//!
//! snake_case 键，所有非存在位字段都输出；64 位整数保持 JSON 原生整数（`serde_json` 以 `i64`/`u64`
//! 保存，不经过浮点）；字节为数值数组；枚举为整数；well-known 类型不做特殊处理，Timestamp 与
//! Duration 均为 `{seconds, nanos}` 嵌套对象。

use serde_json::Value as Json;

use super::{BytesStyle, Dialect, Int64Style, KeyCase, parse_document, write_document};
use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::error::{JsonFormat, Result};
use crate::value::Message;

const DIALECT: Dialect = Dialect {
    format: JsonFormat::Sdk,
    keys: KeyCase::Snake,
    emit_defaults: true,
    int64: Int64Style::Number,
    enum_names: false,
    bytes: BytesStyle::Array,
    durations: None,
};

/// 渲染为 SDK 对象形态。
pub fn to_json(message: &Message) -> Result<Json> {
    DIALECT.render(message)
}

/// 渲染为紧凑文本。
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
