//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为线格式、描述符、文本映射与注册中心暴露统一的错误域，调用方只需处理一个 [`CodecError`]；
//! - 每个变体都映射到稳定的点分错误码（见 [`codes`]），便于日志聚合与告警规则按码匹配。
//!
//! ## 设计要求（What）
//! - 解码期的结构性错误对单次调用是致命的：不返回部分结果，也不会退化为零值消息；
//! - 未知字段不是错误（前向兼容），未知类型 URL 是可恢复、可上报的错误；
//! - 文本解析错误必须携带消息名、字段名与期望类型，方便排查模式不一致。

use thiserror::Error;

use crate::wire::WireType;

/// 稳定错误码命名空间，遵循 `<域>.<语义>` 约定。
pub mod codes {
    /// varint 超过 10 字节仍未终止，或第 10 字节携带超出 64 位的比特。
    pub const MALFORMED_VARINT: &str = "codec.malformed_varint";
    /// 字段号为 0 或超出 `2^29 - 1`。
    pub const INVALID_FIELD_NUMBER: &str = "codec.invalid_field_number";
    /// 长度前缀与可用/消费字节数不一致。
    pub const TRUNCATED_OR_OVERLONG: &str = "codec.truncated_or_overlong";
    /// 字符串字段不是合法 UTF-8。
    pub const INVALID_ENCODING: &str = "codec.invalid_encoding";
    /// 线类型不在 {0, 1, 2, 5} 之内。
    pub const UNKNOWN_WIRE_TYPE: &str = "codec.unknown_wire_type";
    /// 已知字段以错误的线类型出现。
    pub const WIRE_TYPE_MISMATCH: &str = "codec.wire_type_mismatch";
    /// 嵌套深度超过配置上限。
    pub const RECURSION_LIMIT: &str = "codec.recursion_limit";
    /// 顶层负载超过配置上限。
    pub const MESSAGE_TOO_LARGE: &str = "codec.message_too_large";
    /// 按名称访问了描述符中不存在的字段。
    pub const FIELD_NOT_FOUND: &str = "schema.field_not_found";
    /// 值的种类与字段描述不符。
    pub const TYPE_MISMATCH: &str = "schema.type_mismatch";
    /// 描述符表自身不合法。
    pub const INVALID_DESCRIPTOR: &str = "schema.invalid_descriptor";
    /// 注册中心未登记该类型 URL。
    pub const UNKNOWN_TYPE_URL: &str = "registry.unknown_type_url";
    /// 同一类型 URL 被登记为不同描述符。
    pub const DUPLICATE_TYPE_URL: &str = "registry.duplicate_type_url";
    /// 信封类型 URL 与消息描述符不一致。
    pub const ENVELOPE_MISMATCH: &str = "registry.envelope_mismatch";
    /// JSON 文本映射解析或渲染失败。
    pub const JSON_INVALID: &str = "json.invalid";
    /// 配置内容非法。
    pub const CONFIG_INVALID: &str = "config.invalid";
}

/// 文本映射的格式标识，出现在 [`CodecError::Json`] 中以区分三套互不兼容的 JSON 方言。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JsonFormat {
    /// 规范 JSON（lowerCamelCase 键，64 位整数为字符串）。
    Canonical,
    /// 旧版 Amino JSON（snake_case 键，省略默认值）。
    Amino,
    /// SDK 进程内对象形式（snake_case 键，保留原生整数）。
    Sdk,
}

impl JsonFormat {
    /// 返回格式的稳定名称。
    pub const fn as_str(self) -> &'static str {
        match self {
            JsonFormat::Canonical => "canonical",
            JsonFormat::Amino => "amino",
            JsonFormat::Sdk => "sdk",
        }
    }
}

impl core::fmt::Display for JsonFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// quartz 的统一错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把 varint、帧、描述符、文本映射与注册中心的失败路径合流，`?` 即可一路传播；
/// - **契约 (What)**：所有变体 `Send + Sync + 'static`，[`CodecError::code`] 返回稳定错误码；
/// - **执行 (How)**：字段携带定位信息（字段路径、期望/实际线类型、长度），Display 输出面向排障人员。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// varint 未在 10 字节内终止。
    #[error("varint did not terminate within 10 bytes")]
    MalformedVarint,

    /// 字段号越界（编码期来自描述符，解码期来自标签）。
    #[error("field number {number} is outside 1..=536870911")]
    InvalidFieldNumber {
        /// 越界的字段号。
        number: u64,
    },

    /// 长度前缀要求的字节数超出剩余输入，或子消息未在边界处结束。
    #[error("length-delimited frame needs {needed} bytes but only {remaining} remain")]
    TruncatedOrOverlongMessage {
        /// 帧声明需要的字节数。
        needed: usize,
        /// 实际剩余的字节数。
        remaining: usize,
    },

    /// 字符串字段的 UTF-8 校验失败。
    #[error("field `{field}` contains invalid UTF-8")]
    InvalidEncoding {
        /// 出错的字段名。
        field: String,
    },

    /// 线类型取值非法（含已废弃的 group 类型）。
    #[error("unknown wire type {raw}")]
    UnknownWireType {
        /// 标签低 3 位的原始值。
        raw: u8,
    },

    /// 已知字段的线类型与描述符不一致。
    #[error("field `{field}` expects wire type {expected:?} but found {actual:?}")]
    WireTypeMismatch {
        /// 字段名。
        field: String,
        /// 描述符要求的线类型。
        expected: WireType,
        /// 输入中出现的线类型。
        actual: WireType,
    },

    /// 嵌套深度超出 [`crate::config::DecodeLimits::max_depth`]。
    #[error("message nesting exceeds the limit of {limit}")]
    RecursionLimitExceeded {
        /// 生效的深度上限。
        limit: u32,
    },

    /// 顶层负载超出 [`crate::config::DecodeLimits::max_message_bytes`]。
    #[error("payload of {size} bytes exceeds the limit of {limit} bytes")]
    MessageTooLarge {
        /// 负载字节数。
        size: usize,
        /// 生效的字节上限。
        limit: usize,
    },

    /// 描述符中没有该名称的字段。
    #[error("message `{message}` has no field named `{field}`")]
    FieldNotFound {
        /// 消息短名。
        message: String,
        /// 查找的字段名。
        field: String,
    },

    /// 值的种类与字段不符，或整数无法无损转换。
    #[error("field `{field}` expects {expected} but got {actual}")]
    TypeMismatch {
        /// 字段名。
        field: String,
        /// 字段声明的类型。
        expected: &'static str,
        /// 传入值的类型。
        actual: &'static str,
    },

    /// 描述符表校验失败。
    #[error("descriptor `{type_url}` is invalid: {reason}")]
    InvalidDescriptor {
        /// 描述符的类型 URL。
        type_url: String,
        /// 校验失败原因。
        reason: String,
    },

    /// 注册中心未命中。调用方应将其视为可恢复、可上报的错误。
    #[error("no codec registered for type url `{0}`")]
    UnknownTypeUrl(String),

    /// 同一类型 URL 已绑定到另一个描述符。
    #[error("type url `{0}` is already registered with a different descriptor")]
    DuplicateTypeUrl(String),

    /// 信封类型 URL 与消息的描述符不一致。
    #[error("envelope type url `{expected}` does not match message type `{actual}`")]
    EnvelopeMismatch {
        /// 编解码器或信封声明的类型 URL。
        expected: String,
        /// 消息实际的类型 URL。
        actual: String,
    },

    /// 文本映射失败，携带格式、消息、字段与期望类型。
    #[error("{format} json: `{message}.{field}` expected {expected}: {detail}")]
    Json {
        /// 出错的文本形态。
        format: JsonFormat,
        /// 消息短名。
        message: String,
        /// 字段名，消息级错误时为空。
        field: String,
        /// 期望的值形态。
        expected: &'static str,
        /// 实际输入的描述。
        detail: String,
    },

    /// 配置解析或校验失败。
    #[error("invalid codec configuration: {0}")]
    Config(String),
}

impl CodecError {
    /// 返回稳定错误码，供日志与指标按码聚合。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::MalformedVarint => codes::MALFORMED_VARINT,
            CodecError::InvalidFieldNumber { .. } => codes::INVALID_FIELD_NUMBER,
            CodecError::TruncatedOrOverlongMessage { .. } => codes::TRUNCATED_OR_OVERLONG,
            CodecError::InvalidEncoding { .. } => codes::INVALID_ENCODING,
            CodecError::UnknownWireType { .. } => codes::UNKNOWN_WIRE_TYPE,
            CodecError::WireTypeMismatch { .. } => codes::WIRE_TYPE_MISMATCH,
            CodecError::RecursionLimitExceeded { .. } => codes::RECURSION_LIMIT,
            CodecError::MessageTooLarge { .. } => codes::MESSAGE_TOO_LARGE,
            CodecError::FieldNotFound { .. } => codes::FIELD_NOT_FOUND,
            CodecError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            CodecError::InvalidDescriptor { .. } => codes::INVALID_DESCRIPTOR,
            CodecError::UnknownTypeUrl(_) => codes::UNKNOWN_TYPE_URL,
            CodecError::DuplicateTypeUrl(_) => codes::DUPLICATE_TYPE_URL,
            CodecError::EnvelopeMismatch { .. } => codes::ENVELOPE_MISMATCH,
            CodecError::Json { .. } => codes::JSON_INVALID,
            CodecError::Config(_) => codes::CONFIG_INVALID,
        }
    }

    /// 是否为解码输入本身损坏导致的错误（区别于模式或调用方误用）。
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CodecError::MalformedVarint
                | CodecError::InvalidFieldNumber { .. }
                | CodecError::TruncatedOrOverlongMessage { .. }
                | CodecError::InvalidEncoding { .. }
                | CodecError::UnknownWireType { .. }
                | CodecError::WireTypeMismatch { .. }
        )
    }
}

/// crate 级 `Result` 别名，默认错误类型为 [`CodecError`]。
pub type Result<T, E = CodecError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_dotted_convention() {
        let samples = [
            CodecError::MalformedVarint,
            CodecError::UnknownTypeUrl("/x.Y".into()),
            CodecError::Config("bad".into()),
            CodecError::InvalidEncoding {
                field: "ZoneDrop.chain_id".into(),
            },
        ];
        for err in samples {
            let code = err.code();
            assert!(code.contains('.'), "错误码 `{code}` 需遵循 <域>.<语义>");
        }
    }

    #[test]
    fn json_error_display_names_field_and_expectation() {
        let err = CodecError::Json {
            format: JsonFormat::Amino,
            message: "ZoneDrop".into(),
            field: "allocation".into(),
            expected: "uint64 decimal string",
            detail: "found boolean".into(),
        };
        assert_eq!(
            err.to_string(),
            "amino json: `ZoneDrop.allocation` expected uint64 decimal string: found boolean"
        );
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn unknown_type_url_is_not_malformed_input() {
        let err = CodecError::UnknownTypeUrl("/unknown.Type".into());
        assert_eq!(err.code(), codes::UNKNOWN_TYPE_URL);
        assert!(!err.is_malformed_input());
    }
}
