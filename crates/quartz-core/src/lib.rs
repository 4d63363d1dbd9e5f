#![deny(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::result_large_err)]
#![doc = "quartz-core: 以描述符驱动的 protobuf 线格式、JSON/Amino 文本映射与类型 URL 注册中心。"]
#![doc = ""]
#![doc = "== 分层 =="]
#![doc = "1. `wire`：varint、标签字、fork/ldelim 写入器与有界读取器；"]
#![doc = "2. `primitive`：标量字段的线格式负载；"]
#![doc = "3. `mapper`：描述符驱动的消息编解码与部分消息合并；"]
#![doc = "4. `json`：规范 JSON、Amino JSON 与 SDK 对象三种文本形态；"]
#![doc = "5. `registry`：类型 URL 与 Amino 名称到编解码器的分派表。"]
#![doc = ""]
#![doc = "== 数值约定 =="]
#![doc = "64 位整数在内存中始终为 `i64`/`u64`，在文本形态中为十进制字符串或 JSON 原生整数，绝不经过浮点。"]

//! # 快速上手
//!
//! ```rust
//! use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
//! use quartz_core::{json, mapper, Message};
//!
//! static COIN: MessageDescriptor = MessageDescriptor::new(
//!     "/cosmos.base.v1beta1.Coin",
//!     &[
//!         FieldDescriptor::singular(1, "denom", FieldKind::String),
//!         FieldDescriptor::singular(2, "amount", FieldKind::String),
//!     ],
//! );
//!
//! let coin = Message::new(&COIN).with("denom", "uqck")?.with("amount", "5")?;
//! let bytes = mapper::encode(&coin)?;
//! assert_eq!(mapper::decode(&COIN, &bytes)?, coin);
//! assert_eq!(json::amino::to_string(&coin)?, r#"{"amount":"5","denom":"uqck"}"#);
//! # Ok::<(), quartz_core::CodecError>(())
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod json;
pub mod mapper;
pub mod primitive;
pub mod registry;
pub mod value;
pub mod wellknown;
pub mod wire;

pub use config::{CodecConfig, DecodeLimits, JsonOptions, Utf8Policy};
pub use descriptor::{
    Cardinality, EnumDescriptor, EnumValue, FieldDescriptor, FieldKind, MapKeyKind,
    MessageDescriptor, WellKnown,
};
pub use error::{CodecError, JsonFormat, Result};
pub use registry::{DescriptorCodec, Envelope, MessageCodec, SchemaRegistry};
pub use value::{FieldValue, MapKey, Message, Partial, PartialValue, Value};
