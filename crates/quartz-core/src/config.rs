//! 编解码配置：解码限额、UTF-8 策略与 JSON 严格度。
//!
//! # 教案式说明
//! - **Why**：恶意或损坏的输入可能构造极深的嵌套或超大负载，需要可调的保守上限；各宿主对 JSON 未知键的
//!   容忍度也不同（LCD 网关可能返回新版本字段）；
//! - **How**：配置以 `serde` 结构描述，缺省字段回落到 [`Default`]，可从 TOML 文本加载并校验；
//! - **What**：配置是纯数据，按值传入 [`crate::wire::Reader`] 与 JSON 适配器，不存在全局可变状态。

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// 默认最大嵌套深度，与主流 protobuf 实现的递归上限一致。
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// 默认顶层负载上限：4 MiB，对齐 gRPC 默认最大接收消息大小。
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// 字符串字段遇到非法 UTF-8 时的处理策略。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utf8Policy {
    /// 返回 [`CodecError::InvalidEncoding`]。
    #[default]
    Strict,
    /// 以 U+FFFD 替换非法序列，与部分代码生成器的宽松行为一致。
    Lossy,
}

/// 二进制解码限额。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeLimits {
    /// 允许的最大嵌套深度（顶层消息为 0）。
    pub max_depth: u32,
    /// 顶层负载的最大字节数。
    pub max_message_bytes: usize,
    /// 非法 UTF-8 的处理策略。
    pub utf8: Utf8Policy,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            utf8: Utf8Policy::Strict,
        }
    }
}

/// JSON 适配器选项。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonOptions {
    /// 遇到描述符之外的键时报错（默认开启，便于发现键名大小写不一致）。
    pub reject_unknown_fields: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            reject_unknown_fields: true,
        }
    }
}

/// quartz 的完整配置。
///
/// ```rust
/// use quartz_core::config::{CodecConfig, Utf8Policy};
///
/// let config = CodecConfig::from_toml_str(
///     r#"
///     [decode]
///     max_depth = 32
///     utf8 = "lossy"
///
///     [json]
///     reject_unknown_fields = false
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.decode.max_depth, 32);
/// assert_eq!(config.decode.utf8, Utf8Policy::Lossy);
/// assert!(!config.json.reject_unknown_fields);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// 二进制解码限额。
    pub decode: DecodeLimits,
    /// JSON 适配器选项。
    pub json: JsonOptions,
}

impl CodecConfig {
    /// 从 TOML 文本解析并校验配置。
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CodecConfig =
            toml::from_str(text).map_err(|err| CodecError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围。
    pub fn validate(&self) -> Result<()> {
        if self.decode.max_depth == 0 {
            return Err(CodecError::Config(
                "decode.max_depth must be at least 1".into(),
            ));
        }
        if self.decode.max_message_bytes == 0 {
            return Err(CodecError::Config(
                "decode.max_message_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.decode.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.json.reject_unknown_fields);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CodecConfig::from_toml_str("[decode]\nmax_dept = 3\n").unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CONFIG_INVALID);
    }

    #[test]
    fn zero_depth_fails_validation() {
        let err = CodecConfig::from_toml_str("[decode]\nmax_depth = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = CodecConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(CodecConfig::from_toml_str(&text).unwrap(), config);
    }
}
