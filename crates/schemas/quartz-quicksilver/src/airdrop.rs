//! # airdrop 模块说明
//!
//! ## 角色定位（Why）
//! - `quicksilver.airdrop.v1` 描述按链划分的空投（ZoneDrop）、每个地址的领取记录以及领取交易；
//! - 这里只声明字段表，编解码与文本映射全部由 `quartz-core` 的通用映射器完成。
//!
//! ## 设计要求（What）
//! - 字段号与 `.proto` 保持一致，退役的字段号不得复用；
//! - `ZoneDrop.start_time` 等时间字段引用 well-known 描述符，文本形态由 JSON 适配器特殊渲染；
//! - `ClaimRecord.actions_completed` 以动作编号为键，值为完成记录。

use quartz_core::descriptor::{
    EnumDescriptor, EnumValue, FieldDescriptor, FieldKind, MapKeyKind, MessageDescriptor,
};
use quartz_core::wellknown::{DURATION, TIMESTAMP};

use crate::cosmos::{COIN, PAGE_REQUEST, PAGE_RESPONSE};
use crate::tendermint::PROOF_OPS;

/// 可领取空投的动作。
pub static ACTION: EnumDescriptor = EnumDescriptor::new(
    "quicksilver.airdrop.v1.Action",
    &[
        EnumValue::new("ActionUndefined", 0),
        EnumValue::new("ActionInitialClaim", 1),
        EnumValue::new("ActionDepositT1", 2),
        EnumValue::new("ActionDepositT2", 3),
        EnumValue::new("ActionDepositT3", 4),
        EnumValue::new("ActionDepositT4", 5),
        EnumValue::new("ActionDepositT5", 6),
        EnumValue::new("ActionStakeQCK", 7),
        EnumValue::new("ActionSignalIntent", 8),
        EnumValue::new("ActionQSGov", 9),
        EnumValue::new("ActionGbP", 10),
        EnumValue::new("ActionOsmosis", 11),
    ],
);

/// ZoneDrop 的生命周期状态。
pub static STATUS: EnumDescriptor = EnumDescriptor::new(
    "quicksilver.airdrop.v1.Status",
    &[
        EnumValue::new("StatusUndefined", 0),
        EnumValue::new("StatusActive", 1),
        EnumValue::new("StatusFuture", 2),
        EnumValue::new("StatusExpired", 3),
    ],
);

/// 模块参数（当前为空）。
pub static PARAMS: MessageDescriptor =
    MessageDescriptor::new("/quicksilver.airdrop.v1.Params", &[]);

/// 单条链的空投配置。
pub static ZONE_DROP: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.ZoneDrop",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "start_time", FieldKind::Message(&TIMESTAMP)),
        FieldDescriptor::singular(3, "duration", FieldKind::Message(&DURATION)),
        FieldDescriptor::singular(4, "decay", FieldKind::Message(&DURATION)),
        FieldDescriptor::singular(5, "allocation", FieldKind::Uint64),
        FieldDescriptor::repeated(6, "actions", FieldKind::String),
        FieldDescriptor::singular(7, "is_concluded", FieldKind::Bool),
    ],
);

/// 某个动作的完成记录。
pub static COMPLETED_ACTION: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.CompletedAction",
    &[
        FieldDescriptor::singular(1, "complete_time", FieldKind::Message(&TIMESTAMP)),
        FieldDescriptor::singular(2, "claim_amount", FieldKind::Uint64),
    ],
);

/// 单个地址在某条链上的领取记录。
pub static CLAIM_RECORD: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.ClaimRecord",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "address", FieldKind::String),
        FieldDescriptor::map(
            3,
            "actions_completed",
            MapKeyKind::Int32,
            FieldKind::Message(&COMPLETED_ACTION),
        ),
        FieldDescriptor::singular(4, "max_allocation", FieldKind::Uint64),
        FieldDescriptor::singular(5, "base_value", FieldKind::Uint64),
    ],
);

/// 领取动作附带的跨链证明。
pub static PROOF: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.Proof",
    &[
        FieldDescriptor::singular(1, "key", FieldKind::Bytes),
        FieldDescriptor::singular(2, "data", FieldKind::Bytes),
        FieldDescriptor::singular(3, "proof_ops", FieldKind::Message(&PROOF_OPS)),
        FieldDescriptor::singular(4, "height", FieldKind::Int64),
        FieldDescriptor::singular(5, "proof_type", FieldKind::String),
    ],
);

/// 领取交易。`action` 在 `.proto` 中声明为 int64，取值对应 [`ACTION`]。
pub static MSG_CLAIM: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.MsgClaim",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "action", FieldKind::Int64),
        FieldDescriptor::singular(3, "address", FieldKind::String),
        FieldDescriptor::repeated(4, "proofs", FieldKind::Message(&PROOF)),
    ],
)
.with_amino_name("quicksilver/MsgClaim");

/// 领取交易的回执。
pub static MSG_CLAIM_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.MsgClaimResponse",
    &[FieldDescriptor::singular(1, "amount", FieldKind::Uint64)],
);

/// 治理账户从激励池划转资金。
pub static MSG_INCENTIVE_POOL_SPEND: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.MsgIncentivePoolSpend",
    &[
        FieldDescriptor::singular(1, "authority", FieldKind::String),
        FieldDescriptor::singular(2, "to_address", FieldKind::String),
        FieldDescriptor::repeated(3, "amount", FieldKind::Message(&COIN)),
    ],
)
.with_amino_name("quicksilver/MsgIncentivePoolSpend");

/// 划转回执（空消息）。
pub static MSG_INCENTIVE_POOL_SPEND_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.MsgIncentivePoolSpendResponse",
    &[],
);

/// 注册 ZoneDrop 的治理提案正文；`claim_records` 是压缩后的领取记录批量字节。
pub static REGISTER_ZONE_DROP_PROPOSAL: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.RegisterZoneDropProposal",
    &[
        FieldDescriptor::singular(1, "title", FieldKind::String),
        FieldDescriptor::singular(2, "description", FieldKind::String),
        FieldDescriptor::singular(3, "zone_drop", FieldKind::Message(&ZONE_DROP)),
        FieldDescriptor::singular(4, "claim_records", FieldKind::Bytes),
    ],
)
.with_amino_name("quicksilver/RegisterZoneDropProposal");

/// 模块创世状态。
pub static GENESIS_STATE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.GenesisState",
    &[
        FieldDescriptor::singular(1, "params", FieldKind::Message(&PARAMS)),
        FieldDescriptor::repeated(2, "zone_drops", FieldKind::Message(&ZONE_DROP)),
        FieldDescriptor::repeated(3, "claim_records", FieldKind::Message(&CLAIM_RECORD)),
    ],
);

/// 查询模块参数。
pub static QUERY_PARAMS_REQUEST: MessageDescriptor =
    MessageDescriptor::new("/quicksilver.airdrop.v1.QueryParamsRequest", &[]);

/// 模块参数查询结果。
pub static QUERY_PARAMS_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryParamsResponse",
    &[FieldDescriptor::singular(1, "params", FieldKind::Message(&PARAMS))],
);

/// 按链 ID 查询单个 ZoneDrop。
pub static QUERY_ZONE_DROP_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryZoneDropRequest",
    &[FieldDescriptor::singular(1, "chain_id", FieldKind::String)],
);

/// 单个 ZoneDrop 查询结果。
pub static QUERY_ZONE_DROP_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryZoneDropResponse",
    &[FieldDescriptor::singular(1, "zone_drop", FieldKind::Message(&ZONE_DROP))],
);

/// 查询某条链空投账户的余额。
pub static QUERY_ACCOUNT_BALANCE_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryAccountBalanceRequest",
    &[FieldDescriptor::singular(1, "chain_id", FieldKind::String)],
);

/// 空投账户余额。
pub static QUERY_ACCOUNT_BALANCE_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryAccountBalanceResponse",
    &[FieldDescriptor::singular(1, "account_balance", FieldKind::Message(&COIN))],
);

/// 按状态分页列出 ZoneDrop。
pub static QUERY_ZONE_DROPS_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryZoneDropsRequest",
    &[
        FieldDescriptor::singular(1, "status", FieldKind::Enum(&STATUS)),
        FieldDescriptor::singular(2, "pagination", FieldKind::Message(&PAGE_REQUEST)),
    ],
);

/// ZoneDrop 列表及下一页游标。
pub static QUERY_ZONE_DROPS_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryZoneDropsResponse",
    &[
        FieldDescriptor::repeated(1, "zone_drops", FieldKind::Message(&ZONE_DROP)),
        FieldDescriptor::singular(2, "pagination", FieldKind::Message(&PAGE_RESPONSE)),
    ],
);

/// 查询某地址在某条链上的领取记录。
pub static QUERY_CLAIM_RECORD_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryClaimRecordRequest",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "address", FieldKind::String),
    ],
);

/// 单条领取记录。
pub static QUERY_CLAIM_RECORD_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryClaimRecordResponse",
    &[FieldDescriptor::singular(1, "claim_record", FieldKind::Message(&CLAIM_RECORD))],
);

/// 分页列出某条链的全部领取记录。
pub static QUERY_CLAIM_RECORDS_REQUEST: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryClaimRecordsRequest",
    &[
        FieldDescriptor::singular(1, "chain_id", FieldKind::String),
        FieldDescriptor::singular(2, "pagination", FieldKind::Message(&PAGE_REQUEST)),
    ],
);

/// 领取记录列表及下一页游标。
pub static QUERY_CLAIM_RECORDS_RESPONSE: MessageDescriptor = MessageDescriptor::new(
    "/quicksilver.airdrop.v1.QueryClaimRecordsResponse",
    &[
        FieldDescriptor::repeated(1, "claim_records", FieldKind::Message(&CLAIM_RECORD)),
        FieldDescriptor::singular(2, "pagination", FieldKind::Message(&PAGE_RESPONSE)),
    ],
);
