//! `google.protobuf` well-known 类型的描述符与文本转换助手。
//!
//! # 教案式说明
//! - **Why**：Timestamp 与 Duration 在二进制上只是普通的 `{seconds, nanos}` 消息，但规范 JSON 与
//!   Amino JSON 都把它们渲染成字符串，JSON 适配器需要一组统一的换算函数；
//! - **What**：Timestamp 渲染为 RFC 3339 UTC 字符串（小数位按 0/3/6/9 自动选择），Duration 在规范 JSON
//!   中渲染为 `"<seconds>[.<frac>]s"`，在 Amino JSON 中渲染为总纳秒数的十进制字符串；
//! - **How**：时间解析与格式化交给 `chrono`，纳秒换算在 `i128` 上用受检运算完成，溢出即解析失败。

use chrono::{DateTime, SecondsFormat, Utc};

use crate::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor, WellKnown};
use crate::value::Message;

/// `google.protobuf.Timestamp`。
pub static TIMESTAMP: MessageDescriptor = MessageDescriptor::new(
    "/google.protobuf.Timestamp",
    &[
        FieldDescriptor::singular(1, "seconds", FieldKind::Int64),
        FieldDescriptor::singular(2, "nanos", FieldKind::Int32),
    ],
)
.with_well_known(WellKnown::Timestamp);

/// `google.protobuf.Duration`。
pub static DURATION: MessageDescriptor = MessageDescriptor::new(
    "/google.protobuf.Duration",
    &[
        FieldDescriptor::singular(1, "seconds", FieldKind::Int64),
        FieldDescriptor::singular(2, "nanos", FieldKind::Int32),
    ],
)
.with_well_known(WellKnown::Duration);

/// `google.protobuf.Any`，二进制形式与 [`crate::registry::Envelope`] 一致。
pub static ANY: MessageDescriptor = MessageDescriptor::new(
    "/google.protobuf.Any",
    &[
        FieldDescriptor::singular(1, "type_url", FieldKind::String),
        FieldDescriptor::singular(2, "value", FieldKind::Bytes),
    ],
);

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// 取出 `{seconds, nanos}` 两个分量。
pub fn seconds_and_nanos(message: &Message) -> (i64, i32) {
    let seconds = message.get_i64("seconds").unwrap_or_default();
    let nanos = message
        .get_i64("nanos")
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or_default();
    (seconds, nanos)
}

/// 以 `{seconds, nanos}` 构造 Timestamp 或 Duration 实例。
pub fn from_seconds_and_nanos(
    descriptor: &'static MessageDescriptor,
    seconds: i64,
    nanos: i32,
) -> crate::error::Result<Message> {
    Message::new(descriptor)
        .with("seconds", seconds)?
        .with("nanos", nanos)
}

/// Timestamp → RFC 3339 UTC 字符串；超出 chrono 表示范围时返回 `None`。
pub fn format_timestamp(seconds: i64, nanos: i32) -> Option<String> {
    let nanos = u32::try_from(nanos).ok()?;
    let at = DateTime::<Utc>::from_timestamp(seconds, nanos)?;
    Some(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// RFC 3339 字符串（任意时区偏移）→ Timestamp 分量。
pub fn parse_timestamp(text: &str) -> Option<(i64, i32)> {
    let at = DateTime::parse_from_rfc3339(text).ok()?.with_timezone(&Utc);
    let nanos = i32::try_from(at.timestamp_subsec_nanos()).ok()?;
    Some((at.timestamp(), nanos))
}

/// Duration → `"<seconds>[.<frac>]s"`，小数位取 3/6/9 位中最短的无损形式。
pub fn format_duration(seconds: i64, nanos: i32) -> String {
    let total = total_nanos(seconds, nanos);
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let whole = total / NANOS_PER_SECOND as u128;
    let frac = total % NANOS_PER_SECOND as u128;
    if frac == 0 {
        format!("{sign}{whole}s")
    } else if frac % 1_000_000 == 0 {
        format!("{sign}{whole}.{:03}s", frac / 1_000_000)
    } else if frac % 1_000 == 0 {
        format!("{sign}{whole}.{:06}s", frac / 1_000)
    } else {
        format!("{sign}{whole}.{frac:09}s")
    }
}

/// `"<seconds>[.<frac>]s"` → Duration 分量。
pub fn parse_duration(text: &str) -> Option<(i64, i32)> {
    let body = text.strip_suffix('s')?;
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (whole, frac) = match body.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (body, ""),
    };
    if whole.is_empty() || frac.len() > 9 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: i128 = whole.parse().ok()?;
    let frac: i128 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}").parse().ok()?
    };
    let total = whole.checked_mul(NANOS_PER_SECOND)?.checked_add(frac)?;
    split_nanos(if negative { -total } else { total })
}

/// Duration 是否处于规范形态：`|nanos| < 1e9`，且 `nanos` 非零时与非零的 `seconds` 同号。
///
/// 非规范的 `{seconds, nanos}` 在文本中会被合并成另一组分量，渲染前必须拒绝。
pub fn is_normalized_duration(seconds: i64, nanos: i32) -> bool {
    let in_range = (-999_999_999..=999_999_999).contains(&nanos);
    let same_sign = seconds == 0 || nanos == 0 || (seconds < 0) == (nanos < 0);
    in_range && same_sign
}

/// Duration → 总纳秒数。
pub fn total_nanos(seconds: i64, nanos: i32) -> i128 {
    i128::from(seconds) * NANOS_PER_SECOND + i128::from(nanos)
}

/// 总纳秒数 → Duration 分量（`nanos` 与 `seconds` 同号）；超出 `i64` 秒时返回 `None`。
pub fn split_nanos(total: i128) -> Option<(i64, i32)> {
    let seconds = i64::try_from(total / NANOS_PER_SECOND).ok()?;
    let nanos = i32::try_from(total % NANOS_PER_SECOND).ok()?;
    Some((seconds, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_text_roundtrip() {
        assert_eq!(format_timestamp(0, 0).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(
            format_timestamp(1_700_000_000, 500_000_000).as_deref(),
            Some("2023-11-14T22:13:20.500Z")
        );
        assert_eq!(parse_timestamp("2023-11-14T22:13:20.500Z"), Some((1_700_000_000, 500_000_000)));
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Some((0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(format_timestamp(0, -1), None);
    }

    #[test]
    fn duration_text_forms() {
        assert_eq!(format_duration(3600, 0), "3600s");
        assert_eq!(format_duration(1, 500_000_000), "1.500s");
        assert_eq!(format_duration(0, 1_000), "0.000001s");
        assert_eq!(format_duration(-1, -5), "-1.000000005s");
        assert_eq!(parse_duration("1.5s"), Some((1, 500_000_000)));
        assert_eq!(parse_duration("-1.000000005s"), Some((-1, -5)));
        assert_eq!(parse_duration("-0.25s"), Some((0, -250_000_000)));
        assert_eq!(parse_duration("12"), None);
        assert_eq!(parse_duration("1.0000000001s"), None);
    }

    #[test]
    fn oversized_duration_text_is_rejected() {
        assert_eq!(parse_duration("100000000000000000000000000000000000000s"), None);
        assert_eq!(parse_duration("-170141183460469231731687303715884105727.5s"), None);
        assert_eq!(parse_duration("9223372036854775808s"), None);
        assert_eq!(
            parse_duration("9223372036854775807.999999999s"),
            Some((i64::MAX, 999_999_999))
        );
    }

    #[test]
    fn duration_normal_form() {
        assert!(is_normalized_duration(0, 0));
        assert!(is_normalized_duration(-1, -5));
        assert!(is_normalized_duration(0, -999_999_999));
        assert!(!is_normalized_duration(1, -5));
        assert!(!is_normalized_duration(-1, 5));
        assert!(!is_normalized_duration(0, 1_000_000_000));
        assert!(!is_normalized_duration(2, i32::MIN));
    }

    #[test]
    fn nanos_split_keeps_sign() {
        assert_eq!(total_nanos(2, 5), 2_000_000_005);
        assert_eq!(split_nanos(-1_500_000_000), Some((-1, -500_000_000)));
        assert_eq!(split_nanos(i128::MAX), None);
    }

    #[test]
    fn component_helpers() {
        let ts = from_seconds_and_nanos(&TIMESTAMP, 10, 20).unwrap();
        assert_eq!(seconds_and_nanos(&ts), (10, 20));
        assert_eq!(TIMESTAMP.well_known, Some(WellKnown::Timestamp));
        assert!(ANY.validate().is_ok());
    }
}
