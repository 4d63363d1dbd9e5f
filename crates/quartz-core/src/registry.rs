//! # registry 模块说明
//!
//! ## 角色定位（Why）
//! - `google.protobuf.Any` 只携带类型 URL 与不透明字节，解码前必须先按 URL 找到对应的编解码器；
//! - 旧版 Amino 签名以 `{type, value}` 信封携带消息，同样需要按 Amino 名称分派。
//!
//! ## 设计要求（What）
//! - 注册中心在进程启动时由调用方显式构建（[`SchemaRegistry::new`] + [`SchemaRegistry::register_all`]），
//!   不存在隐式的全局注册；
//! - 同一描述符重复注册是幂等的，不同描述符占用同一类型 URL 返回 [`CodecError::DuplicateTypeUrl`]；
//! - 未知类型 URL 是可恢复的错误，返回给调用方而非 panic。
//!
//! ## 执行方式（How）
//! - 编解码器以 [`MessageCodec`] trait 对象保存，默认实现 [`DescriptorCodec`] 驱动通用映射器；
//! - 表结构由 `parking_lot::RwLock` 保护，读多写少，`SchemaRegistry` 可放入 `Arc` 跨线程共享。

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use serde_json::Value as Json;
use tracing::debug;

use crate::config::CodecConfig;
use crate::descriptor::MessageDescriptor;
use crate::error::{CodecError, Result};
use crate::json::amino;
use crate::mapper;
use crate::value::Message;
use crate::wellknown::ANY;

/// 单个消息类型的编解码契约。
///
/// # 契约说明（What）
/// - `descriptor` 返回的描述符决定注册时使用的类型 URL 与 Amino 名称；
/// - `encode` 必须拒绝其他描述符的实例（[`CodecError::EnvelopeMismatch`]）；
/// - 实现需满足 `Send + Sync + 'static`，以便注册中心跨线程共享。
pub trait MessageCodec: Send + Sync + 'static {
    /// 编解码器负责的消息描述符。
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// 编码为 protobuf 二进制。
    fn encode(&self, message: &Message) -> Result<Bytes>;

    /// 从 protobuf 二进制解码。
    fn decode(&self, bytes: &[u8], config: &CodecConfig) -> Result<Message>;

    /// 负责的类型 URL。
    fn type_url(&self) -> &'static str {
        self.descriptor().type_url
    }
}

/// 由描述符驱动的默认编解码器。
#[derive(Clone, Copy, Debug)]
pub struct DescriptorCodec {
    descriptor: &'static MessageDescriptor,
}

impl DescriptorCodec {
    /// 以描述符创建编解码器。
    pub const fn new(descriptor: &'static MessageDescriptor) -> Self {
        Self { descriptor }
    }
}

impl MessageCodec for DescriptorCodec {
    fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    fn encode(&self, message: &Message) -> Result<Bytes> {
        if !std::ptr::eq(message.descriptor(), self.descriptor) {
            return Err(CodecError::EnvelopeMismatch {
                expected: self.descriptor.type_url.to_owned(),
                actual: message.type_url().to_owned(),
            });
        }
        mapper::encode(message)
    }

    fn decode(&self, bytes: &[u8], config: &CodecConfig) -> Result<Message> {
        mapper::decode_with(self.descriptor, bytes, config)
    }
}

/// 类型化的不透明负载，线格式与 `google.protobuf.Any` 相同。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// 负载的类型 URL。
    pub type_url: String,
    /// 负载的 protobuf 二进制。
    pub value: Bytes,
}

impl Envelope {
    /// 构造信封。
    pub fn new(type_url: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }

    /// 转为 `google.protobuf.Any` 实例，便于嵌入其他消息的 Any 字段。
    pub fn to_message(&self) -> Result<Message> {
        Message::new(&ANY)
            .with("type_url", self.type_url.as_str())?
            .with("value", self.value.clone())
    }

    /// 从 `google.protobuf.Any` 实例还原。
    pub fn from_message(message: &Message) -> Result<Self> {
        if message.descriptor() != &ANY {
            return Err(CodecError::EnvelopeMismatch {
                expected: ANY.type_url.to_owned(),
                actual: message.type_url().to_owned(),
            });
        }
        Ok(Self {
            type_url: message.get_str("type_url").unwrap_or_default().to_owned(),
            value: Bytes::copy_from_slice(message.get_bytes("value").unwrap_or_default()),
        })
    }

    /// 编码为 `google.protobuf.Any` 二进制。
    pub fn encode(&self) -> Result<Bytes> {
        mapper::encode(&self.to_message()?)
    }

    /// 从 `google.protobuf.Any` 二进制解码。
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_message(&mapper::decode(&ANY, bytes)?)
    }
}

#[derive(Default)]
struct Table {
    by_type_url: HashMap<&'static str, Arc<dyn MessageCodec>>,
    by_amino_name: HashMap<&'static str, &'static str>,
}

/// 类型 URL → 编解码器的注册中心。
///
/// ```rust
/// use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
/// use quartz_core::{Message, SchemaRegistry};
///
/// static COIN: MessageDescriptor = MessageDescriptor::new(
///     "/cosmos.base.v1beta1.Coin",
///     &[
///         FieldDescriptor::singular(1, "denom", FieldKind::String),
///         FieldDescriptor::singular(2, "amount", FieldKind::String),
///     ],
/// );
///
/// let registry = SchemaRegistry::new();
/// registry.register_descriptor(&COIN)?;
///
/// let coin = Message::new(&COIN).with("denom", "uqck")?;
/// let envelope = registry.encode_any(COIN.type_url, &coin)?;
/// assert_eq!(registry.decode_any(&envelope)?, coin);
/// # Ok::<(), quartz_core::CodecError>(())
/// ```
pub struct SchemaRegistry {
    config: CodecConfig,
    table: RwLock<Table>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// 以默认配置创建空注册中心。
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// 以指定配置创建空注册中心；配置作用于 [`SchemaRegistry::decode_any`] 与 Amino 解析。
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            table: RwLock::new(Table::default()),
        }
    }

    /// 注册中心使用的配置。
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 注册一个编解码器。
    ///
    /// # 契约说明（What）
    /// - 描述符先经 [`MessageDescriptor::validate`] 校验；
    /// - 同一描述符重复注册直接返回 `Ok(())`；
    /// - 类型 URL 或 Amino 名称已被其他描述符占用时返回 [`CodecError::DuplicateTypeUrl`]。
    pub fn register(&self, codec: Arc<dyn MessageCodec>) -> Result<()> {
        let descriptor = codec.descriptor();
        descriptor.validate()?;
        let type_url = codec.type_url();

        let mut table = self.table.write();
        if let Some(existing) = table.by_type_url.get(type_url) {
            if std::ptr::eq(existing.descriptor(), descriptor) {
                return Ok(());
            }
            return Err(CodecError::DuplicateTypeUrl(type_url.to_owned()));
        }
        if let Some(name) = descriptor.amino_name {
            if let Some(owner) = table.by_amino_name.get(name) {
                if *owner != type_url {
                    return Err(CodecError::DuplicateTypeUrl(name.to_owned()));
                }
            }
            table.by_amino_name.insert(name, type_url);
        }
        table.by_type_url.insert(type_url, codec);
        debug!(type_url, amino_name = ?descriptor.amino_name, "registered message codec");
        Ok(())
    }

    /// 以 [`DescriptorCodec`] 注册描述符。
    pub fn register_descriptor(&self, descriptor: &'static MessageDescriptor) -> Result<()> {
        self.register(Arc::new(DescriptorCodec::new(descriptor)))
    }

    /// 批量注册，遇到第一个错误即停止。
    pub fn register_all<I>(&self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'static MessageDescriptor>,
    {
        descriptors
            .into_iter()
            .try_for_each(|descriptor| self.register_descriptor(descriptor))
    }

    /// 按类型 URL 查找编解码器。
    pub fn lookup(&self, type_url: &str) -> Result<Arc<dyn MessageCodec>> {
        self.table
            .read()
            .by_type_url
            .get(type_url)
            .cloned()
            .ok_or_else(|| CodecError::UnknownTypeUrl(type_url.to_owned()))
    }

    /// 按类型 URL 查找描述符。
    pub fn descriptor(&self, type_url: &str) -> Result<&'static MessageDescriptor> {
        self.lookup(type_url).map(|codec| codec.descriptor())
    }

    /// 是否已注册该类型 URL。
    pub fn contains(&self, type_url: &str) -> bool {
        self.table.read().by_type_url.contains_key(type_url)
    }

    /// 已注册的类型 URL，按字典序排列。
    pub fn type_urls(&self) -> Vec<&'static str> {
        let mut urls: Vec<_> = self.table.read().by_type_url.keys().copied().collect();
        urls.sort_unstable();
        urls
    }

    /// 已注册的类型数量。
    pub fn len(&self) -> usize {
        self.table.read().by_type_url.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按类型 URL 编码为信封。
    pub fn encode_any(&self, type_url: &str, message: &Message) -> Result<Envelope> {
        let codec = self.lookup(type_url)?;
        let value = codec.encode(message)?;
        Ok(Envelope::new(codec.type_url(), value))
    }

    /// 以消息自身的类型 URL 编码为信封。
    pub fn pack(&self, message: &Message) -> Result<Envelope> {
        self.encode_any(message.type_url(), message)
    }

    /// 按信封的类型 URL 分派解码。
    pub fn decode_any(&self, envelope: &Envelope) -> Result<Message> {
        let codec = self.lookup(&envelope.type_url).inspect_err(|err| {
            debug!(code = err.code(), type_url = %envelope.type_url, "envelope dispatch failed");
        })?;
        codec.decode(&envelope.value, &self.config)
    }

    /// 渲染 Amino `{type, value}` 信封；消息类型必须已注册。
    pub fn to_amino_msg(&self, message: &Message) -> Result<Json> {
        self.lookup(message.type_url())?;
        amino::to_envelope(message)
    }

    /// 按 Amino 名称分派解析 `{type, value}` 信封。
    pub fn from_amino_msg(&self, json: &Json) -> Result<Message> {
        let (name, value) = amino::split_envelope(json)?;
        let type_url = self
            .table
            .read()
            .by_amino_name
            .get(name)
            .copied()
            .ok_or_else(|| CodecError::UnknownTypeUrl(name.to_owned()))?;
        let descriptor = self.descriptor(type_url)?;
        amino::from_json_with(descriptor, value, &self.config)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("config", &self.config)
            .field("type_urls", &self.type_urls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, FieldKind};
    use serde_json::json;

    static COIN: MessageDescriptor = MessageDescriptor::new(
        "/test.v1.Coin",
        &[
            FieldDescriptor::singular(1, "denom", FieldKind::String),
            FieldDescriptor::singular(2, "amount", FieldKind::String),
        ],
    )
    .with_amino_name("test/Coin");

    static OTHER_COIN: MessageDescriptor = MessageDescriptor::new(
        "/test.v1.Coin",
        &[FieldDescriptor::singular(1, "denom", FieldKind::String)],
    );

    static BROKEN: MessageDescriptor = MessageDescriptor::new(
        "/test.v1.Broken",
        &[
            FieldDescriptor::singular(1, "a", FieldKind::String),
            FieldDescriptor::singular(1, "b", FieldKind::String),
        ],
    );

    fn coin() -> Message {
        Message::new(&COIN)
            .with("denom", "uqck")
            .unwrap()
            .with("amount", "1000")
            .unwrap()
    }

    #[test]
    fn registration_is_idempotent_and_rejects_conflicts() {
        let registry = SchemaRegistry::new();
        registry.register_descriptor(&COIN).unwrap();
        registry.register_descriptor(&COIN).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.register_descriptor(&OTHER_COIN).unwrap_err(),
            CodecError::DuplicateTypeUrl("/test.v1.Coin".into())
        );
        assert_eq!(
            registry.register_descriptor(&BROKEN).unwrap_err().code(),
            crate::error::codes::INVALID_DESCRIPTOR
        );
        assert!(!registry.contains("/test.v1.Broken"));
    }

    #[test]
    fn unknown_type_url_is_recoverable() {
        let registry = SchemaRegistry::new();
        let envelope = Envelope::new("/unknown.Type", Bytes::new());
        assert_eq!(
            registry.decode_any(&envelope).unwrap_err(),
            CodecError::UnknownTypeUrl("/unknown.Type".into())
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn any_roundtrip_through_registry() {
        let registry = SchemaRegistry::new();
        registry.register_all([&COIN, &ANY]).unwrap();
        let envelope = registry.pack(&coin()).unwrap();
        assert_eq!(envelope.type_url, "/test.v1.Coin");
        assert_eq!(registry.decode_any(&envelope).unwrap(), coin());

        let wire = envelope.encode().unwrap();
        assert_eq!(Envelope::decode(&wire).unwrap(), envelope);
        assert_eq!(registry.type_urls(), vec!["/google.protobuf.Any", "/test.v1.Coin"]);
    }

    #[test]
    fn encode_any_rejects_foreign_message() {
        let registry = SchemaRegistry::new();
        registry.register_all([&COIN, &ANY]).unwrap();
        let err = registry.encode_any("/google.protobuf.Any", &coin()).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::ENVELOPE_MISMATCH);
    }

    #[test]
    fn codec_rejects_instance_of_same_url_but_other_table() {
        let codec = DescriptorCodec::new(&COIN);
        let impostor = Message::new(&OTHER_COIN).with("denom", "uqck").unwrap();
        assert_eq!(
            codec.encode(&impostor).unwrap_err(),
            CodecError::EnvelopeMismatch {
                expected: "/test.v1.Coin".into(),
                actual: "/test.v1.Coin".into(),
            }
        );
        assert!(codec.encode(&coin()).is_ok());
    }

    #[test]
    fn amino_envelope_dispatches_by_name() {
        let registry = SchemaRegistry::new();
        registry.register_descriptor(&COIN).unwrap();
        let amino = registry.to_amino_msg(&coin()).unwrap();
        assert_eq!(
            amino,
            json!({"type": "test/Coin", "value": {"amount": "1000", "denom": "uqck"}})
        );
        assert_eq!(registry.from_amino_msg(&amino).unwrap(), coin());

        let err = registry
            .from_amino_msg(&json!({"type": "test/Nope", "value": {}}))
            .unwrap_err();
        assert_eq!(err, CodecError::UnknownTypeUrl("test/Nope".into()));
    }

    #[test]
    fn shared_across_threads() {
        let registry = Arc::new(SchemaRegistry::new());
        registry.register_descriptor(&COIN).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    let envelope = registry.pack(&coin()).unwrap();
                    assert_eq!(registry.decode_any(&envelope).unwrap(), coin());
                });
            }
        });
    }
}
