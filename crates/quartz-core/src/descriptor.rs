//! 模式即数据：字段表、消息描述符与枚举描述符。
//!
//! # 教案式说明
//! - **Why**：每个消息类型不再手写一套编码/解码/JSON 函数，而是声明一张静态字段表，交给通用的
//!   [`crate::mapper`] 与 [`crate::json`] 驱动，消除近似重复代码导致的默认值省略不一致等问题；
//! - **What**：描述符均为 `'static` 数据，可以在 `static` 中相互引用（包括递归引用）；
//!   字段号一经发布永不改变含义，删除字段后其编号永久保留不复用；
//! - **How**：`const fn` 构造器让模式 crate 以 `pub static FOO: MessageDescriptor = ...` 形式声明表，
//!   [`MessageDescriptor::validate`] 在注册时检查编号范围与唯一性。

use core::fmt;

use crate::error::{CodecError, Result};
use crate::wire::{MAX_FIELD_NUMBER, WireType};

/// 枚举取值。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumValue {
    /// 符号名（规范 JSON 中使用）。
    pub name: &'static str,
    /// 线上整数值。
    pub number: i32,
}

impl EnumValue {
    /// 构造枚举取值。
    pub const fn new(name: &'static str, number: i32) -> Self {
        Self { name, number }
    }
}

/// 枚举描述符。
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// 枚举的全限定名。
    pub full_name: &'static str,
    /// 取值表，第一个取值应为 0。
    pub values: &'static [EnumValue],
}

impl EnumDescriptor {
    /// 构造枚举描述符。
    pub const fn new(full_name: &'static str, values: &'static [EnumValue]) -> Self {
        Self { full_name, values }
    }

    /// 数值对应的符号名。
    pub fn name_of(&self, number: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|value| value.number == number)
            .map(|value| value.name)
    }

    /// 符号名对应的数值。
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|value| value.name == name)
            .map(|value| value.number)
    }
}

/// 字段值的种类。
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// bool。
    Bool,
    /// int32（非 zig-zag）。
    Int32,
    /// int64（非 zig-zag）。
    Int64,
    /// uint32。
    Uint32,
    /// uint64。
    Uint64,
    /// UTF-8 字符串。
    String,
    /// 原始字节。
    Bytes,
    /// 枚举，线上为 int32 varint。
    Enum(&'static EnumDescriptor),
    /// 嵌套消息。
    Message(&'static MessageDescriptor),
}

impl FieldKind {
    /// 该种类单个值使用的线类型。
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldKind::Bool
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint32
            | FieldKind::Uint64
            | FieldKind::Enum(_) => WireType::Varint,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// 重复字段是否以 packed 形式编码（数值、bool 与枚举）。
    pub const fn is_packable(self) -> bool {
        matches!(self.wire_type(), WireType::Varint)
    }

    /// 是否为 64 位整数（文本映射中需要字符串化）。
    pub const fn is_64_bit(self) -> bool {
        matches!(self, FieldKind::Int64 | FieldKind::Uint64)
    }

    /// 用于错误信息的种类名称。
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum(_) => "enum",
            FieldKind::Message(_) => "message",
        }
    }
}

// 手写 Debug：嵌套描述符只打印类型 URL，避免递归模式无限展开。
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Enum(descriptor) => write!(f, "Enum({})", descriptor.full_name),
            FieldKind::Message(descriptor) => write!(f, "Message({})", descriptor.type_url),
            other => f.write_str(other.name()),
        }
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldKind::Enum(a), FieldKind::Enum(b)) => a.full_name == b.full_name,
            (FieldKind::Message(a), FieldKind::Message(b)) => a.type_url == b.type_url,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Eq for FieldKind {}

/// map 键允许的种类。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapKeyKind {
    /// bool 键。
    Bool,
    /// int32 键。
    Int32,
    /// int64 键。
    Int64,
    /// uint32 键。
    Uint32,
    /// uint64 键。
    Uint64,
    /// 字符串键。
    String,
}

impl MapKeyKind {
    /// 键在 map 条目消息中的字段种类。
    pub const fn as_field_kind(self) -> FieldKind {
        match self {
            MapKeyKind::Bool => FieldKind::Bool,
            MapKeyKind::Int32 => FieldKind::Int32,
            MapKeyKind::Int64 => FieldKind::Int64,
            MapKeyKind::Uint32 => FieldKind::Uint32,
            MapKeyKind::Uint64 => FieldKind::Uint64,
            MapKeyKind::String => FieldKind::String,
        }
    }
}

/// 字段基数。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    /// 单值，无存在位；等于默认值时不上线。
    Singular,
    /// 单值，带显式存在位；设置即上线（即便为默认值）。
    Optional,
    /// 重复字段，按序追加。
    Repeated,
    /// map 字段，键种类在此给出，值种类为 [`FieldDescriptor::kind`]。
    Map(MapKeyKind),
}

/// 字段描述符。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// 字段号，`1..=536_870_911`，在消息内唯一且跨版本稳定。
    pub number: u32,
    /// proto 中的 snake_case 字段名。
    pub name: &'static str,
    /// 值种类（map 字段为值的种类）。
    pub kind: FieldKind,
    /// 基数。
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    /// 单值字段。
    pub const fn singular(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self {
            number,
            name,
            kind,
            cardinality: Cardinality::Singular,
        }
    }

    /// 带存在位的单值字段（proto3 `optional`）。
    pub const fn optional(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self {
            number,
            name,
            kind,
            cardinality: Cardinality::Optional,
        }
    }

    /// 重复字段。
    pub const fn repeated(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self {
            number,
            name,
            kind,
            cardinality: Cardinality::Repeated,
        }
    }

    /// map 字段。
    pub const fn map(number: u32, name: &'static str, key: MapKeyKind, value: FieldKind) -> Self {
        Self {
            number,
            name,
            kind: value,
            cardinality: Cardinality::Map(key),
        }
    }

    /// 字段是否区分“未设置”与“设置为默认值”。
    ///
    /// 只有 `Optional` 字段与单值消息字段带存在位；标量单值字段缺省即零值。
    pub const fn has_presence(&self) -> bool {
        match self.cardinality {
            Cardinality::Optional => true,
            Cardinality::Singular => matches!(self.kind, FieldKind::Message(_)),
            Cardinality::Repeated | Cardinality::Map(_) => false,
        }
    }
}

/// 描述符上标注的 well-known 类型，文本映射会对其做特殊渲染。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WellKnown {
    /// `google.protobuf.Timestamp`。
    Timestamp,
    /// `google.protobuf.Duration`。
    Duration,
}

/// 消息描述符。
///
/// ```rust
/// use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
///
/// static COIN: MessageDescriptor = MessageDescriptor::new(
///     "/cosmos.base.v1beta1.Coin",
///     &[
///         FieldDescriptor::singular(1, "denom", FieldKind::String),
///         FieldDescriptor::singular(2, "amount", FieldKind::String),
///     ],
/// );
///
/// assert_eq!(COIN.name(), "Coin");
/// assert_eq!(COIN.full_name(), "cosmos.base.v1beta1.Coin");
/// assert!(COIN.validate().is_ok());
/// ```
pub struct MessageDescriptor {
    /// 类型 URL，形如 `/<package>.<MessageName>`。
    pub type_url: &'static str,
    /// 字段表，按声明顺序排列。
    pub fields: &'static [FieldDescriptor],
    /// well-known 类型标注。
    pub well_known: Option<WellKnown>,
    /// 旧版 Amino 签名使用的类型名（如 `quicksilver/MsgClaim`）。
    pub amino_name: Option<&'static str>,
}

impl MessageDescriptor {
    /// 构造普通消息描述符。
    pub const fn new(type_url: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            type_url,
            fields,
            well_known: None,
            amino_name: None,
        }
    }

    /// 附加 Amino 类型名。
    pub const fn with_amino_name(mut self, amino_name: &'static str) -> Self {
        self.amino_name = Some(amino_name);
        self
    }

    /// 标注 well-known 类型。
    pub const fn with_well_known(mut self, well_known: WellKnown) -> Self {
        self.well_known = Some(well_known);
        self
    }

    /// 去掉前导 `/` 的全限定名。
    pub fn full_name(&self) -> &'static str {
        self.type_url.strip_prefix('/').unwrap_or(self.type_url)
    }

    /// 短名（全限定名最后一段）。
    pub fn name(&self) -> &'static str {
        let full = self.full_name();
        full.rsplit('.').next().unwrap_or(full)
    }

    /// 按字段号查找字段及其下标。
    pub fn field_by_number(&self, number: u32) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.number == number)
    }

    /// 按名称查找字段及其下标。
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &'static FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// 校验类型 URL、字段号范围与唯一性。
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CodecError::InvalidDescriptor {
            type_url: self.type_url.to_owned(),
            reason,
        };

        let full_name = self.type_url.strip_prefix('/').unwrap_or_default();
        if full_name.is_empty() || full_name.starts_with('.') || full_name.ends_with('.') {
            return Err(invalid(format!(
                "type url must look like `/<package>.<Message>`, got `{}`",
                self.type_url
            )));
        }

        for (idx, field) in self.fields.iter().enumerate() {
            if field.number == 0 || field.number > MAX_FIELD_NUMBER {
                return Err(invalid(format!(
                    "field `{}` uses out-of-range number {}",
                    field.name, field.number
                )));
            }
            if field.name.is_empty() {
                return Err(invalid(format!("field number {} has no name", field.number)));
            }
            for other in &self.fields[idx + 1..] {
                if other.number == field.number {
                    return Err(invalid(format!(
                        "fields `{}` and `{}` share number {}",
                        field.name, other.name, field.number
                    )));
                }
                if other.name == field.name {
                    return Err(invalid(format!("field name `{}` is declared twice", field.name)));
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other) || self.type_url == other.type_url
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("type_url", &self.type_url)
            .field("fields", &self.fields)
            .field("well_known", &self.well_known)
            .field("amino_name", &self.amino_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STATUS: EnumDescriptor = EnumDescriptor::new(
        "test.v1.Status",
        &[EnumValue::new("STATUS_UNSPECIFIED", 0), EnumValue::new("STATUS_ACTIVE", 1)],
    );

    // 自引用描述符：静态表允许递归。
    static NODE: MessageDescriptor = MessageDescriptor::new(
        "/test.v1.Node",
        &[
            FieldDescriptor::singular(1, "label", FieldKind::String),
            FieldDescriptor::repeated(2, "children", FieldKind::Message(&NODE)),
            FieldDescriptor::singular(3, "status", FieldKind::Enum(&STATUS)),
        ],
    );

    #[test]
    fn recursive_descriptor_is_valid_and_debuggable() {
        assert!(NODE.validate().is_ok());
        let rendered = format!("{NODE:?}");
        assert!(rendered.contains("Message(/test.v1.Node)"));
    }

    #[test]
    fn enum_lookup_both_ways() {
        assert_eq!(STATUS.name_of(1), Some("STATUS_ACTIVE"));
        assert_eq!(STATUS.number_of("STATUS_UNSPECIFIED"), Some(0));
        assert_eq!(STATUS.name_of(9), None);
    }

    #[test]
    fn presence_rules() {
        let (_, children) = NODE.field_by_name("children").unwrap();
        assert!(!children.has_presence());
        let nested = FieldDescriptor::singular(4, "parent", FieldKind::Message(&NODE));
        assert!(nested.has_presence());
        let scalar = FieldDescriptor::singular(5, "weight", FieldKind::Uint64);
        assert!(!scalar.has_presence());
        let optional = FieldDescriptor::optional(6, "hint", FieldKind::Uint64);
        assert!(optional.has_presence());
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        static DUP: MessageDescriptor = MessageDescriptor::new(
            "/test.v1.Dup",
            &[
                FieldDescriptor::singular(1, "a", FieldKind::String),
                FieldDescriptor::singular(1, "b", FieldKind::String),
            ],
        );
        let err = DUP.validate().unwrap_err();
        assert!(err.to_string().contains("share number 1"));
    }

    #[test]
    fn out_of_range_numbers_and_bad_urls_are_rejected() {
        static HUGE: MessageDescriptor = MessageDescriptor::new(
            "/test.v1.Huge",
            &[FieldDescriptor::singular(MAX_FIELD_NUMBER + 1, "a", FieldKind::Bool)],
        );
        static BARE: MessageDescriptor = MessageDescriptor::new("test.v1.Bare", &[]);
        assert!(HUGE.validate().is_err());
        assert!(BARE.validate().is_err());
    }

    #[test]
    fn names_derive_from_type_url() {
        assert_eq!(NODE.full_name(), "test.v1.Node");
        assert_eq!(NODE.name(), "Node");
        assert_eq!(NODE.field_by_number(3).map(|(idx, _)| idx), Some(2));
    }
}
