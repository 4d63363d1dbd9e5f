//! 描述符驱动编解码的往返性质测试。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：
//!   - 手写的字节向量只能覆盖少数样例，映射器的默认值省略、存在位、map 排序与重复字段打包
//!     在随机输入下同样必须保持“解码(编码(m)) == m”；
//!   - 三种 JSON 形态各自有不同的默认值与整数规则，任何一处不对称都会在往返中暴露。
//! - **结构说明 (How)**：
//!   - 使用 `proptest` 生成 ZoneDrop、ClaimRecord 与 MsgClaim 实例，覆盖 well-known 时间字段、
//!     int32 键 map、嵌套重复消息与字节字段；
//!   - 每个性质对同一实例执行二进制、canonical、Amino 与 SDK 四条往返路径。
//! - **合同与边界 (What)**：
//!   - 时间戳秒数限制在 chrono 可表示的范围内，纳秒为 `0..1e9`；
//!   - Duration 的秒与纳秒保持同号，与线上数据一致。
//! - **风险与权衡 (Trade-offs)**：
//!   - 用例数量沿用 proptest 默认值，字符串只取小写 ASCII，避免把测试时间花在 UTF-8 组合上。

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use quartz_core::json::{amino, canonical, sdk};
use quartz_core::wellknown::{DURATION, TIMESTAMP, from_seconds_and_nanos};
use quartz_core::{Message, mapper};
use quartz_quicksilver::airdrop::{CLAIM_RECORD, COMPLETED_ACTION, MSG_CLAIM, PROOF, ZONE_DROP};

fn timestamp() -> impl Strategy<Value = Message> {
    (0i64..4_000_000_000, 0i32..1_000_000_000)
        .prop_map(|(seconds, nanos)| from_seconds_and_nanos(&TIMESTAMP, seconds, nanos).unwrap())
}

fn duration() -> impl Strategy<Value = Message> {
    (0i64..10_000_000, 0i32..1_000_000_000, any::<bool>()).prop_map(|(seconds, nanos, negative)| {
        let (seconds, nanos) = if negative {
            (-seconds, -nanos)
        } else {
            (seconds, nanos)
        };
        from_seconds_and_nanos(&DURATION, seconds, nanos).unwrap()
    })
}

fn zone_drop() -> impl Strategy<Value = Message> {
    (
        "[a-z]{0,8}(-[0-9])?",
        proptest::option::of(timestamp()),
        proptest::option::of(duration()),
        any::<u64>(),
        vec("[a-z]{0,5}", 0..4),
        any::<bool>(),
    )
        .prop_map(|(chain_id, start_time, decay, allocation, actions, concluded)| {
            let mut drop = Message::new(&ZONE_DROP)
                .with("chain_id", chain_id)
                .unwrap()
                .with("allocation", allocation)
                .unwrap()
                .with_repeated("actions", actions)
                .unwrap()
                .with("is_concluded", concluded)
                .unwrap();
            if let Some(start_time) = start_time {
                drop.set("start_time", start_time).unwrap();
            }
            if let Some(decay) = decay {
                drop.set("decay", decay).unwrap();
            }
            drop
        })
}

fn claim_record() -> impl Strategy<Value = Message> {
    let action = (proptest::option::of(timestamp()), any::<u64>()).prop_map(|(at, amount)| {
        let mut completed = Message::new(&COMPLETED_ACTION)
            .with("claim_amount", amount)
            .unwrap();
        if let Some(at) = at {
            completed.set("complete_time", at).unwrap();
        }
        completed
    });
    (
        "[a-z]{0,8}",
        "quick1[a-z0-9]{0,10}",
        btree_map(any::<i32>(), action, 0..4),
        any::<u64>(),
    )
        .prop_map(|(chain_id, address, actions, max_allocation)| {
            let mut record = Message::new(&CLAIM_RECORD)
                .with("chain_id", chain_id)
                .unwrap()
                .with("address", address)
                .unwrap()
                .with("max_allocation", max_allocation)
                .unwrap();
            for (key, completed) in actions {
                record.insert("actions_completed", key, completed).unwrap();
            }
            record
        })
}

fn msg_claim() -> impl Strategy<Value = Message> {
    let proof = (
        vec(any::<u8>(), 0..16),
        vec(any::<u8>(), 0..16),
        any::<i64>(),
        "[a-z]{0,6}",
    )
        .prop_map(|(key, data, height, proof_type)| {
            Message::new(&PROOF)
                .with("key", key)
                .unwrap()
                .with("data", data)
                .unwrap()
                .with("height", height)
                .unwrap()
                .with("proof_type", proof_type)
                .unwrap()
        });
    ("[a-z]{0,8}", 0i64..12, "quick1[a-z0-9]{0,10}", vec(proof, 0..3)).prop_map(
        |(chain_id, action, address, proofs)| {
            Message::new(&MSG_CLAIM)
                .with("chain_id", chain_id)
                .unwrap()
                .with("action", action)
                .unwrap()
                .with("address", address)
                .unwrap()
                .with_repeated("proofs", proofs)
                .unwrap()
        },
    )
}

fn assert_roundtrips(message: &Message) -> Result<(), TestCaseError> {
    let descriptor = message.descriptor();

    let bytes = mapper::encode(message).unwrap();
    let decoded = mapper::decode(descriptor, &bytes).unwrap();
    prop_assert_eq!(&decoded, message);
    prop_assert_eq!(mapper::encode(&decoded).unwrap(), bytes);

    let text = canonical::to_string(message).unwrap();
    prop_assert_eq!(&canonical::from_str(descriptor, &text).unwrap(), message);

    let text = amino::to_string(message).unwrap();
    prop_assert_eq!(&amino::from_str(descriptor, &text).unwrap(), message);

    let text = sdk::to_string(message).unwrap();
    prop_assert_eq!(&sdk::from_str(descriptor, &text).unwrap(), message);
    Ok(())
}

proptest! {
    #[test]
    fn zone_drop_roundtrips(message in zone_drop()) {
        assert_roundtrips(&message)?;
    }

    #[test]
    fn claim_record_roundtrips(message in claim_record()) {
        assert_roundtrips(&message)?;
    }

    #[test]
    fn msg_claim_roundtrips(message in msg_claim()) {
        assert_roundtrips(&message)?;
    }

    /// 任意字节要么解码失败，要么解码结果的再编码可以再次解码为同一实例。
    #[test]
    fn arbitrary_bytes_never_panic(bytes in vec(any::<u8>(), 0..64)) {
        if let Ok(decoded) = mapper::decode(&MSG_CLAIM, &bytes) {
            let again = mapper::decode(&MSG_CLAIM, &mapper::encode(&decoded).unwrap()).unwrap();
            prop_assert_eq!(again, decoded);
        }
    }
}
