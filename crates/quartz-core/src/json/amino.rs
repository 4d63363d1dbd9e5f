//! 旧版 Amino JSON，硬件钱包与 legacy 签名流程使用的形态。
//!
//! # 教案式说明
//! - **Why**：Amino 签名对字节级文本敏感，键序、默认值省略与数值写法任何一处不同都会导致验签失败；
//! - **What**：snake_case 键，省略所有默认值（零值标量、空字符串/字节、空列表/map、未设置的消息），
//!   但存在位字段即使被设为默认值也会输出；64 位整数为十进制字符串，枚举为整数，字节为 base64，
//!   Timestamp 为 RFC 3339，Duration 为总纳秒数字符串；对象键按字典序输出；
//! - **How**：渲染结果再经 [`sorted`] 规整键序；`{type, value}` 信封由 [`to_envelope`] 基于
//!   [`MessageDescriptor::amino_name`] 生成，反向解析由注册中心按 Amino 名称分派。

use serde_json::{Map, Value as Json};

use super::{BytesStyle, Dialect, DurationStyle, Int64Style, KeyCase, parse_document, write_document};
use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::error::{CodecError, JsonFormat, Result};
use crate::value::Message;

const DIALECT: Dialect = Dialect {
    format: JsonFormat::Amino,
    keys: KeyCase::Snake,
    emit_defaults: false,
    int64: Int64Style::String,
    enum_names: false,
    bytes: BytesStyle::Base64,
    durations: Some(DurationStyle::Nanos),
};

/// 渲染为 Amino JSON 值（键已排序）。
pub fn to_json(message: &Message) -> Result<Json> {
    DIALECT.render(message).map(sorted)
}

/// 渲染为紧凑的 Amino JSON 文本，可直接作为签名文档的组成部分。
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

/// 生成 `{"type": <amino_name>, "value": {...}}` 信封。
pub fn to_envelope(message: &Message) -> Result<Json> {
    let descriptor = message.descriptor();
    let name = descriptor.amino_name.ok_or_else(|| {
        DIALECT.error(
            descriptor,
            "type",
            "message with an amino name",
            format!("`{}` has no amino name", descriptor.type_url),
        )
    })?;
    let mut envelope = Map::new();
    envelope.insert("type".to_owned(), Json::String(name.to_owned()));
    envelope.insert("value".to_owned(), to_json(message)?);
    Ok(Json::Object(envelope))
}

/// 拆开信封，返回 Amino 名称与内层值。
pub fn split_envelope(json: &Json) -> Result<(&str, &Json)> {
    let malformed = |detail: &str| CodecError::Json {
        format: JsonFormat::Amino,
        message: "AminoMsg".to_owned(),
        field: "type".to_owned(),
        expected: "{\"type\": string, \"value\": object}",
        detail: detail.to_owned(),
    };
    let object = json.as_object().ok_or_else(|| malformed("envelope is not an object"))?;
    let name = object
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("missing `type`"))?;
    let value = object.get("value").ok_or_else(|| malformed("missing `value`"))?;
    Ok((name, value))
}

/// 递归按键的字典序重建对象。
fn sorted(json: Json) -> Json {
    match json {
        Json::Object(object) => {
            let mut entries: Vec<(String, Json)> = object.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Json::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Json::Array(items) => Json::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
