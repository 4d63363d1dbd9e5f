//! `quicksilver.interchainquery.v1`：跨链查询结果的回传消息。
//!
//! # 教案式说明
//! - **Why**：中继者把宿主链查询结果连同默克尔证明提交回 Quicksilver，`proof_ops` 缺失与
//!   “存在但为空的证明”在链上语义不同（前者表示未附带证明），编解码必须保留这一区别；
//! - **What**：`proof_ops` 是单值消息字段，因此天然带存在位，未设置时不会出现在线格式中。

use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};

use crate::tendermint::PROOF_OPS;

/// `quicksilver.interchainquery.v1.MsgSubmitQueryResponse`。
pub static MSG_SUBMIT_QUERY_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.interchainquery.v1.MsgSubmitQueryResponse",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "query_id", FieldKind::String),
        FieldDescriptor::singular(3, "result", FieldKind::Bytes),
        FieldDescriptor::singular(4, "proof_ops", FieldKind::Message(&PROOF_OPS)),
        FieldDescriptor::singular(5, "height", FieldKind::Int64),
        FieldDescriptor::singular(6, "from_address", FieldKind::String),
    ],
)
.with_amino_name("quicksilver/MsgSubmitQueryResponse");

/// `quicksilver.interchainquery.v1.MsgSubmitQueryResponseResponse`。
pub static MSG_SUBMIT_QUERY_RESPONSE_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.interchainquery.v1.MsgSubmitQueryResponseResponse",
    &[],
);
