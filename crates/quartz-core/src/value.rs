//! 消息实例：由描述符完全决定形状的键控记录。
//!
//! # 教案式说明
//! - **Why**：字段表是数据，实例也必须是通用结构，才能让一个映射器服务所有消息类型；
//! - **What**：[`Message`] 按描述符字段顺序保存 [`FieldValue`]；64 位整数始终以 `i64`/`u64` 保存，
//!   绝不经过浮点；嵌套消息按值持有，不存在跨父节点共享或所有权环；
//! - **How**：写入接口（`set`/`push`/`insert`）按字段种类做类型检查与无损整数转换，
//!   读取接口（`get_*`）在字段缺失或种类不符时返回 `None`。

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

use crate::descriptor::{Cardinality, FieldDescriptor, FieldKind, MapKeyKind, MessageDescriptor};
use crate::error::{CodecError, Result};

/// 单个字段值。
#[derive(Clone, PartialEq, Eq)]
pub enum Value {
    /// bool。
    Bool(bool),
    /// int32。
    Int32(i32),
    /// int64。
    Int64(i64),
    /// uint32。
    Uint32(u32),
    /// uint64。
    Uint64(u64),
    /// UTF-8 字符串。
    String(String),
    /// 原始字节。
    Bytes(Vec<u8>),
    /// 枚举数值（允许描述符之外的值，保持前向兼容）。
    Enum(i32),
    /// 嵌套消息。
    Message(Box<Message>),
}

impl Value {
    /// 字段种类的零值；消息种类为其描述符的默认实例。
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::Uint32 => Value::Uint32(0),
            FieldKind::Uint64 => Value::Uint64(0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Enum(_) => Value::Enum(0),
            FieldKind::Message(descriptor) => Value::Message(Box::new(Message::new(descriptor))),
        }
    }

    /// 是否为零值。消息值永不视为零值：“存在但全为默认”由存在位表达。
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(v) => !v,
            Value::Int32(v) | Value::Enum(v) => *v == 0,
            Value::Int64(v) => *v == 0,
            Value::Uint32(v) => *v == 0,
            Value::Uint64(v) => *v == 0,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::Message(_) => false,
        }
    }

    /// 值的种类名称。
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
        }
    }

    /// 将值转换为 `kind` 要求的表示。
    ///
    /// 整数族之间做无损转换（越界即失败），`Int32` 可作为枚举数值；消息值必须属于同一描述符。
    pub fn coerce(self, kind: FieldKind, field: &str) -> Result<Value> {
        let mismatch = |actual: &'static str| CodecError::TypeMismatch {
            field: field.to_owned(),
            expected: kind.name(),
            actual,
        };
        let actual = self.kind_name();

        let integer = match &self {
            Value::Int32(v) | Value::Enum(v) => Some(i128::from(*v)),
            Value::Int64(v) => Some(i128::from(*v)),
            Value::Uint32(v) => Some(i128::from(*v)),
            Value::Uint64(v) => Some(i128::from(*v)),
            _ => None,
        };

        match (kind, self) {
            (FieldKind::Bool, v @ Value::Bool(_)) => Ok(v),
            (FieldKind::String, v @ Value::String(_)) => Ok(v),
            (FieldKind::Bytes, v @ Value::Bytes(_)) => Ok(v),
            (FieldKind::Message(descriptor), Value::Message(message)) => {
                if message.descriptor() == descriptor {
                    Ok(Value::Message(message))
                } else {
                    Err(mismatch(message.descriptor().full_name()))
                }
            }
            (FieldKind::Int32, _) => integer
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Int32)
                .ok_or_else(|| mismatch(actual)),
            (FieldKind::Enum(_), _) => integer
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::Enum)
                .ok_or_else(|| mismatch(actual)),
            (FieldKind::Int64, _) => integer
                .and_then(|v| i64::try_from(v).ok())
                .map(Value::Int64)
                .ok_or_else(|| mismatch(actual)),
            (FieldKind::Uint32, _) => integer
                .and_then(|v| u32::try_from(v).ok())
                .map(Value::Uint32)
                .ok_or_else(|| mismatch(actual)),
            (FieldKind::Uint64, _) => integer
                .and_then(|v| u64::try_from(v).ok())
                .map(Value::Uint64)
                .ok_or_else(|| mismatch(actual)),
            _ => Err(mismatch(actual)),
        }
    }

    /// bool 值。
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// 有符号整数值（int32/int64/enum）。
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) | Value::Enum(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// 无符号整数值（uint32/uint64）。
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint32(v) => Some(u64::from(*v)),
            Value::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// 字符串值。
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// 字节值。
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// 嵌套消息值。
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) | Value::Enum(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "0x{}", HexDisplay(v)),
            Value::Message(v) => fmt::Debug::fmt(v, f),
        }
    }
}

struct HexDisplay<'a>(&'a [u8]);

impl fmt::Display for HexDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => Uint32,
    u64 => Uint64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Message> for Value {
    fn from(value: Message) -> Self {
        Value::Message(Box::new(value))
    }
}

/// map 键。`Ord` 决定编码时条目的输出顺序。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// bool 键。
    Bool(bool),
    /// int32 键。
    Int32(i32),
    /// int64 键。
    Int64(i64),
    /// uint32 键。
    Uint32(u32),
    /// uint64 键。
    Uint64(u64),
    /// 字符串键。
    String(String),
}

impl MapKey {
    /// 键种类的零值。
    pub fn default_for(kind: MapKeyKind) -> Self {
        match kind {
            MapKeyKind::Bool => MapKey::Bool(false),
            MapKeyKind::Int32 => MapKey::Int32(0),
            MapKeyKind::Int64 => MapKey::Int64(0),
            MapKeyKind::Uint32 => MapKey::Uint32(0),
            MapKeyKind::Uint64 => MapKey::Uint64(0),
            MapKeyKind::String => MapKey::String(String::new()),
        }
    }

    /// 转为对应的字段值，用于编码 map 条目。
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(v) => Value::Bool(*v),
            MapKey::Int32(v) => Value::Int32(*v),
            MapKey::Int64(v) => Value::Int64(*v),
            MapKey::Uint32(v) => Value::Uint32(*v),
            MapKey::Uint64(v) => Value::Uint64(*v),
            MapKey::String(v) => Value::String(v.clone()),
        }
    }

    /// 由字段值构造键，按 `kind` 做无损整数转换。
    pub fn from_value(value: Value, kind: MapKeyKind, field: &str) -> Result<Self> {
        let coerced = value.coerce(kind.as_field_kind(), field)?;
        Ok(match coerced {
            Value::Bool(v) => MapKey::Bool(v),
            Value::Int32(v) => MapKey::Int32(v),
            Value::Int64(v) => MapKey::Int64(v),
            Value::Uint32(v) => MapKey::Uint32(v),
            Value::Uint64(v) => MapKey::Uint64(v),
            Value::String(v) => MapKey::String(v),
            other => {
                return Err(CodecError::TypeMismatch {
                    field: field.to_owned(),
                    expected: "map key",
                    actual: other.kind_name(),
                });
            }
        })
    }

    /// JSON 对象中的键文本。
    pub fn to_json_key(&self) -> String {
        match self {
            MapKey::Bool(v) => v.to_string(),
            MapKey::Int32(v) => v.to_string(),
            MapKey::Int64(v) => v.to_string(),
            MapKey::Uint32(v) => v.to_string(),
            MapKey::Uint64(v) => v.to_string(),
            MapKey::String(v) => v.clone(),
        }
    }

    /// 解析 JSON 对象键。
    pub fn parse_json_key(kind: MapKeyKind, text: &str) -> Option<Self> {
        Some(match kind {
            MapKeyKind::Bool => MapKey::Bool(text.parse().ok()?),
            MapKeyKind::Int32 => MapKey::Int32(text.parse().ok()?),
            MapKeyKind::Int64 => MapKey::Int64(text.parse().ok()?),
            MapKeyKind::Uint32 => MapKey::Uint32(text.parse().ok()?),
            MapKeyKind::Uint64 => MapKey::Uint64(text.parse().ok()?),
            MapKeyKind::String => MapKey::String(text.to_owned()),
        })
    }
}

macro_rules! map_key_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MapKey {
                fn from(value: $ty) -> Self {
                    MapKey::$variant(value.into())
                }
            }
        )*
    };
}

map_key_from! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => Uint32,
    u64 => Uint64,
    String => String,
    &str => String,
}

/// 按基数组织的字段槽位。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// 无存在位的单值字段。
    Singular(Value),
    /// 带存在位的单值字段；`None` 表示未设置。
    Optional(Option<Value>),
    /// 重复字段。
    Repeated(Vec<Value>),
    /// map 字段，按键有序。
    Map(BTreeMap<MapKey, Value>),
}

impl FieldValue {
    /// 字段的默认槽位。
    pub fn default_for(field: &FieldDescriptor) -> Self {
        if field.has_presence() {
            return FieldValue::Optional(None);
        }
        match field.cardinality {
            Cardinality::Repeated => FieldValue::Repeated(Vec::new()),
            Cardinality::Map(_) => FieldValue::Map(BTreeMap::new()),
            Cardinality::Singular | Cardinality::Optional => {
                FieldValue::Singular(Value::default_for(field.kind))
            }
        }
    }

    /// 槽位是否处于默认状态（零值、未设置、空列表或空 map）。
    pub fn is_default(&self) -> bool {
        match self {
            FieldValue::Singular(value) => value.is_default(),
            FieldValue::Optional(value) => value.is_none(),
            FieldValue::Repeated(values) => values.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
        }
    }

    /// 单值字段的当前值（可选字段未设置时为 `None`）。
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Singular(value) => Some(value),
            FieldValue::Optional(value) => value.as_ref(),
            FieldValue::Repeated(_) | FieldValue::Map(_) => None,
        }
    }
}

/// 消息实例。
///
/// ```rust
/// use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};
/// use quartz_core::Message;
///
/// static COIN: MessageDescriptor = MessageDescriptor::new(
///     "/cosmos.base.v1beta1.Coin",
///     &[
///         FieldDescriptor::singular(1, "denom", FieldKind::String),
///         FieldDescriptor::singular(2, "amount", FieldKind::String),
///     ],
/// );
///
/// let coin = Message::new(&COIN)
///     .with("denom", "uqck")?
///     .with("amount", "1000")?;
/// assert_eq!(coin.get_str("denom"), Some("uqck"));
/// assert!(!coin.is_default());
/// # Ok::<(), quartz_core::CodecError>(())
/// ```
#[derive(Clone)]
pub struct Message {
    descriptor: &'static MessageDescriptor,
    fields: Vec<FieldValue>,
}

impl Message {
    /// 以全部默认值构造实例。
    pub fn new(descriptor: &'static MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: descriptor.fields.iter().map(FieldValue::default_for).collect(),
        }
    }

    /// 实例的描述符。
    pub fn descriptor(&self) -> &'static MessageDescriptor {
        self.descriptor
    }

    /// 实例的类型 URL。
    pub fn type_url(&self) -> &'static str {
        self.descriptor.type_url
    }

    /// 按声明顺序遍历字段描述符与槽位。
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &FieldValue)> + '_ {
        self.descriptor.fields.iter().zip(self.fields.iter())
    }

    pub(crate) fn slot(&self, idx: usize) -> &FieldValue {
        &self.fields[idx]
    }

    pub(crate) fn slot_mut(&mut self, idx: usize) -> &mut FieldValue {
        &mut self.fields[idx]
    }

    /// 是否所有字段都处于默认状态。
    pub fn is_default(&self) -> bool {
        self.fields.iter().all(FieldValue::is_default)
    }

    /// 按名称读取槽位。
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.descriptor
            .field_by_name(name)
            .map(|(idx, _)| &self.fields[idx])
    }

    /// 单值字段的当前值。
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_value)
    }

    /// 字符串字段。
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    /// 无符号整数字段。
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.value(name).and_then(Value::as_u64)
    }

    /// 有符号整数或枚举字段。
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_i64)
    }

    /// bool 字段。
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(Value::as_bool)
    }

    /// 字节字段。
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.value(name).and_then(Value::as_bytes)
    }

    /// 嵌套消息字段；未设置时为 `None`。
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.value(name).and_then(Value::as_message)
    }

    /// 重复字段的元素。
    pub fn repeated(&self, name: &str) -> Option<&[Value]> {
        match self.get(name)? {
            FieldValue::Repeated(values) => Some(values),
            _ => None,
        }
    }

    /// map 字段的条目。
    pub fn map(&self, name: &str) -> Option<&BTreeMap<MapKey, Value>> {
        match self.get(name)? {
            FieldValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// 设置单值字段。
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (idx, field) = self.lookup(name)?;
        let value = value.into().coerce(field.kind, name)?;
        self.fields[idx] = match field.cardinality {
            _ if field.has_presence() => FieldValue::Optional(Some(value)),
            Cardinality::Singular | Cardinality::Optional => FieldValue::Singular(value),
            Cardinality::Repeated | Cardinality::Map(_) => {
                return Err(CodecError::TypeMismatch {
                    field: name.to_owned(),
                    expected: "single value field",
                    actual: "collection field",
                });
            }
        };
        Ok(())
    }

    /// 构建器风格的 [`Message::set`]。
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// 向重复字段追加元素。
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (idx, field) = self.lookup(name)?;
        let value = value.into().coerce(field.kind, name)?;
        match &mut self.fields[idx] {
            FieldValue::Repeated(values) => {
                values.push(value);
                Ok(())
            }
            _ => Err(CodecError::TypeMismatch {
                field: name.to_owned(),
                expected: "repeated field",
                actual: "non-repeated field",
            }),
        }
    }

    /// 构建器风格的批量追加。
    pub fn with_repeated<I, V>(mut self, name: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.push(name, value)?;
        }
        Ok(self)
    }

    /// 写入 map 条目，重复键覆盖旧值。
    pub fn insert(
        &mut self,
        name: &str,
        key: impl Into<MapKey>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let (idx, field) = self.lookup(name)?;
        let Cardinality::Map(key_kind) = field.cardinality else {
            return Err(CodecError::TypeMismatch {
                field: name.to_owned(),
                expected: "map field",
                actual: "non-map field",
            });
        };
        let key = MapKey::from_value(key.into().to_value(), key_kind, name)?;
        let value = value.into().coerce(field.kind, name)?;
        if let FieldValue::Map(entries) = &mut self.fields[idx] {
            entries.insert(key, value);
        }
        Ok(())
    }

    /// 将字段重置为默认槽位。
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let (idx, field) = self.lookup(name)?;
        self.fields[idx] = FieldValue::default_for(field);
        Ok(())
    }

    /// 编码为 protobuf 二进制。
    pub fn encode(&self) -> Result<Bytes> {
        crate::mapper::encode(self)
    }

    /// 以默认配置解码。
    pub fn decode(descriptor: &'static MessageDescriptor, bytes: &[u8]) -> Result<Self> {
        crate::mapper::decode(descriptor, bytes)
    }

    fn lookup(&self, name: &str) -> Result<(usize, &'static FieldDescriptor)> {
        self.descriptor
            .field_by_name(name)
            .ok_or_else(|| CodecError::FieldNotFound {
                message: self.descriptor.full_name().to_owned(),
                field: name.to_owned(),
            })
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.fields == other.fields
    }
}

impl Eq for Message {}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.descriptor.name());
        for (field, slot) in self.fields() {
            match slot {
                FieldValue::Singular(value) => out.field(field.name, value),
                FieldValue::Optional(value) => out.field(field.name, value),
                FieldValue::Repeated(values) => out.field(field.name, values),
                FieldValue::Map(entries) => out.field(field.name, entries),
            };
        }
        out.finish()
    }
}

/// 稀疏的部分消息，用于 [`crate::mapper::merge_partial`]。
///
/// 未出现或显式为 [`PartialValue::Null`] 的字段回落到基准消息的值。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partial {
    entries: BTreeMap<String, PartialValue>,
}

impl Partial {
    /// 空的部分消息。
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建器风格地提供字段值。
    pub fn with(mut self, name: &str, value: impl Into<PartialValue>) -> Self {
        self.set(name, value);
        self
    }

    /// 提供字段值。
    pub fn set(&mut self, name: &str, value: impl Into<PartialValue>) {
        self.entries.insert(name.to_owned(), value.into());
    }

    /// 显式标记为 null（等价于未提供）。
    pub fn with_null(self, name: &str) -> Self {
        self.with(name, PartialValue::Null)
    }

    /// 读取提供的值。
    pub fn get(&self, name: &str) -> Option<&PartialValue> {
        self.entries.get(name)
    }

    /// 遍历提供的字段名与值。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PartialValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// 是否未提供任何字段。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 部分消息中的值。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartialValue {
    /// 显式 null，回落到基准值。
    Null,
    /// 完整的单值（含完整的嵌套消息）。
    Scalar(Value),
    /// 嵌套部分消息，与基准中的嵌套消息递归合并。
    Message(Partial),
    /// 重复字段的元素，整体替换基准列表。
    List(Vec<PartialValue>),
    /// map 条目，整体替换基准 map。
    Map(Vec<(MapKey, PartialValue)>),
}

impl PartialValue {
    /// 由任意元素构造列表。
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PartialValue>,
    {
        PartialValue::List(items.into_iter().map(Into::into).collect())
    }

    /// 由键值对构造 map。
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<MapKey>,
        V: Into<PartialValue>,
    {
        PartialValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

macro_rules! partial_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PartialValue {
                fn from(value: $ty) -> Self {
                    PartialValue::Scalar(Value::from(value))
                }
            }
        )*
    };
}

partial_from_value!(bool, i32, i64, u32, u64, String, &str, Vec<u8>, &[u8], Bytes, Message);

impl From<Value> for PartialValue {
    fn from(value: Value) -> Self {
        PartialValue::Scalar(value)
    }
}

impl From<Partial> for PartialValue {
    fn from(value: Partial) -> Self {
        PartialValue::Message(value)
    }
}
