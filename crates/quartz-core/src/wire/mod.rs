//! 线格式底座：varint、标签字、写入器与有界读取器。
//!
//! # 教案式说明
//! - **Why**：protobuf 线格式是与链上节点互通的唯一契约，任何比特偏差都会破坏互操作，因此把最底层的
//!   编码规则集中在此处，由上层映射器按描述符驱动；
//! - **What**：`tag = field_number << 3 | wire_type`，线类型仅接受 {0, 1, 2, 5}；
//! - **How**：[`varint`] 负责 base-128 编解码，[`Writer`] 以 fork/ldelim 拼接长度前缀，
//!   [`Reader`] 以子读取器约束嵌套负载的边界并负责跳过未知字段。

mod reader;
pub mod varint;
mod writer;

pub use reader::Reader;
pub use writer::{Fork, Writer};

use crate::error::{CodecError, Result};

/// 字段号上限（`2^29 - 1`）。
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// protobuf 线类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    /// 变长整数。
    Varint,
    /// 8 字节小端定长。
    Fixed64,
    /// 长度前缀负载（字符串、字节、嵌套消息、packed 数组）。
    LengthDelimited,
    /// 4 字节小端定长。
    Fixed32,
}

impl WireType {
    /// 线类型的 3 bit 编码值。
    pub const fn as_u8(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = CodecError;

    fn try_from(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            // 3/4 为废弃的 group 起止标记，6/7 未定义。
            other => Err(CodecError::UnknownWireType { raw: other }),
        }
    }
}

/// 字段标签：字段号与线类型的组合。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    /// 字段号，取值 `1..=MAX_FIELD_NUMBER`。
    pub field_number: u32,
    /// 负载的线类型。
    pub wire_type: WireType,
}

impl Tag {
    /// 构造标签并校验字段号范围。
    pub fn new(field_number: u32, wire_type: WireType) -> Result<Self> {
        check_field_number(u64::from(field_number))?;
        Ok(Self {
            field_number,
            wire_type,
        })
    }

    /// 标签的 varint 原始值。
    pub fn to_raw(self) -> u64 {
        (u64::from(self.field_number) << 3) | u64::from(self.wire_type.as_u8())
    }

    /// 由 varint 原始值还原标签。
    pub fn from_raw(raw: u64) -> Result<Self> {
        let wire_type = WireType::try_from((raw & 0x07) as u8)?;
        let number = raw >> 3;
        check_field_number(number)?;
        Ok(Self {
            field_number: number as u32,
            wire_type,
        })
    }
}

fn check_field_number(number: u64) -> Result<()> {
    if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
        return Err(CodecError::InvalidFieldNumber { number });
    }
    Ok(())
}
