//! Quicksilver 消息引用到的 cosmos-sdk 类型。

use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
use quartz_core::wellknown::ANY;

/// `cosmos.base.v1beta1.Coin`；`amount` 为十进制字符串形式的大整数。
pub static COIN: MessageDescriptor = MessageDescriptor::new(
    "/cosmos.base.v1beta1.Coin",
    &[
        FieldDescriptor::singular(1, "denom", FieldKind::String),
        FieldDescriptor::singular(2, "amount", FieldKind::String),
    ],
);

/// `cosmos.base.query.v1beta1.PageRequest`。
pub static PAGE_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/cosmos.base.query.v1beta1.PageRequest",
    &[
        FieldDescriptor::singular(1, "key", FieldKind::Bytes),
        FieldDescriptor::singular(2, "offset", FieldKind::Uint64),
        FieldDescriptor::singular(3, "limit", FieldKind::Uint64),
        FieldDescriptor::singular(4, "count_total", FieldKind::Bool),
        FieldDescriptor::singular(5, "reverse", FieldKind::Bool),
    ],
);

/// `cosmos.base.query.v1beta1.PageResponse`。
pub static PAGE_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/cosmos.base.query.v1beta1.PageResponse",
    &[
        FieldDescriptor::singular(1, "next_key", FieldKind::Bytes),
        FieldDescriptor::singular(2, "total", FieldKind::Uint64),
    ],
);

/// `cosmos.gov.v1beta1.MsgSubmitProposal`：`content` 是以 `Any` 包装的提案正文，
/// 例如 [`crate::airdrop::REGISTER_ZONE_DROP_PROPOSAL`]。
pub static MSG_SUBMIT_PROPOSAL: MessageDescriptor = MessageDescriptor::new(
    "/cosmos.gov.v1beta1.MsgSubmitProposal",
    &[
        FieldDescriptor::singular(1, "content", FieldKind::Message(&ANY)),
        FieldDescriptor::repeated(2, "initial_deposit", FieldKind::Message(&COIN)),
        FieldDescriptor::singular(3, "proposer", FieldKind::String),
    ],
)
.with_amino_name("cosmos-sdk/MsgSubmitProposal");
