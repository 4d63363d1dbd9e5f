#![deny(unsafe_code)]
#![warn(missing_docs)]
#![doc = "quartz-quicksilver: Quicksilver 消息的描述符表与注册入口。"]
#![doc = ""]
#![doc = "每条消息只是一张 `static MessageDescriptor` 数据表，编解码、文本映射与类型 URL 分派由 `quartz-core` 完成。"]
#![doc = "宿主在启动时调用 [`register_all`] 把本 crate 的全部类型登记到自己的 `SchemaRegistry`。"]

//! ```rust
//! use quartz_core::{Message, SchemaRegistry};
//! use quartz_quicksilver::airdrop::MSG_CLAIM;
//!
//! let registry = SchemaRegistry::new();
//! quartz_quicksilver::register_all(&registry)?;
//!
//! let claim = Message::new(&MSG_CLAIM)
//!     .with("chain_id", "osmosis-1")?
//!     .with("action", 1i64)?
//!     .with("address", "quick1example")?;
//! let envelope = registry.pack(&claim)?;
//! assert_eq!(envelope.type_url, "/quicksilver.airdrop.v1.MsgClaim");
//! assert_eq!(registry.decode_any(&envelope)?, claim);
//! # Ok::<(), quartz_core::CodecError>(())
//! ```

pub mod airdrop;
pub mod cosmos;
pub mod interchainquery;
pub mod tendermint;

use quartz_core::descriptor::MessageDescriptor;
use quartz_core::{CodecConfig, Result, SchemaRegistry, wellknown};
use tracing::debug;

/// 本 crate 声明的全部消息类型（含其依赖的 cosmos、tendermint 与 well-known 类型）。
pub static DESCRIPTORS: &[&MessageDescriptor] = &[
    &airdrop::PARAMS,
    &airdrop::ZONE_DROP,
    &airdrop::COMPLETED_ACTION,
    &airdrop::CLAIM_RECORD,
    &airdrop::PROOF,
    &airdrop::MSG_CLAIM,
    &airdrop::MSG_CLAIM_RESPONSE,
    &airdrop::MSG_INCENTIVE_POOL_SPEND,
    &airdrop::MSG_INCENTIVE_POOL_SPEND_RESPONSE,
    &airdrop::REGISTER_ZONE_DROP_PROPOSAL,
    &airdrop::GENESIS_STATE,
    &airdrop::QUERY_PARAMS_REQUEST,
    &airdrop::QUERY_PARAMS_RESPONSE,
    &airdrop::QUERY_ZONE_DROP_REQUEST,
    &airdrop::QUERY_ZONE_DROP_RESPONSE,
    &airdrop::QUERY_ACCOUNT_BALANCE_REQUEST,
    &airdrop::QUERY_ACCOUNT_BALANCE_RESPONSE,
    &airdrop::QUERY_ZONE_DROPS_REQUEST,
    &airdrop::QUERY_ZONE_DROPS_RESPONSE,
    &airdrop::QUERY_CLAIM_RECORD_REQUEST,
    &airdrop::QUERY_CLAIM_RECORD_RESPONSE,
    &airdrop::QUERY_CLAIM_RECORDS_REQUEST,
    &airdrop::QUERY_CLAIM_RECORDS_RESPONSE,
    &interchainquery::MSG_SUBMIT_QUERY_RESPONSE,
    &interchainquery::MSG_SUBMIT_QUERY_RESPONSE_RESPONSE,
    &tendermint::PROOF_OP,
    &tendermint::PROOF_OPS,
    &cosmos::COIN,
    &cosmos::PAGE_REQUEST,
    &cosmos::PAGE_RESPONSE,
    &cosmos::MSG_SUBMIT_PROPOSAL,
    &wellknown::TIMESTAMP,
    &wellknown::DURATION,
    &wellknown::ANY,
];

/// 把 [`DESCRIPTORS`] 全部登记到 `registry`；重复调用是幂等的。
pub fn register_all(registry: &SchemaRegistry) -> Result<()> {
    registry.register_all(DESCRIPTORS.iter().copied())?;
    debug!(count = DESCRIPTORS.len(), "registered quicksilver schemas");
    Ok(())
}

/// 以指定配置构建一个已登记全部类型的注册中心。
pub fn registry(config: CodecConfig) -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::with_config(config);
    register_all(&registry)?;
    Ok(registry)
}
