//! Quicksilver 消息的线格式与注册中心场景。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：以真实的 airdrop / interchainquery 描述符验证默认值省略、存在位、未知字段容忍、
//!   map 重复键覆盖以及按类型 URL 分派解码等行为，这些是与链上节点互通的硬约束；
//! - **结构说明 (How)**：每个测试构造一个具体消息，断言精确的线格式字节或解码结果；
//! - **合同与边界 (What)**：字节向量按 protobuf 规则手工推导，任何编码偏差都会以字节差异的形式暴露。

use quartz_core::json::{amino, canonical};
use quartz_core::{CodecError, Envelope, MapKey, Message, SchemaRegistry, mapper};
use quartz_quicksilver::airdrop::{
    CLAIM_RECORD, COMPLETED_ACTION, GENESIS_STATE, MSG_CLAIM, PARAMS, PROOF,
    REGISTER_ZONE_DROP_PROPOSAL, ZONE_DROP,
};
use quartz_quicksilver::cosmos::{COIN, MSG_SUBMIT_PROPOSAL};
use quartz_quicksilver::interchainquery::MSG_SUBMIT_QUERY_RESPONSE;
use quartz_quicksilver::tendermint::{PROOF_OP, PROOF_OPS};
use serde_json::json;

fn zone_drop() -> Message {
    Message::new(&ZONE_DROP)
        .with("chain_id", "osmosis-1")
        .unwrap()
        .with("allocation", 1_000_000u64)
        .unwrap()
        .with_repeated("actions", ["a", "b"])
        .unwrap()
        .with("is_concluded", false)
        .unwrap()
}

fn registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    quartz_quicksilver::register_all(&registry).unwrap();
    registry
}

#[test]
fn zone_drop_scenario_is_byte_exact() {
    let bytes = mapper::encode(&zone_drop()).unwrap();
    let mut expected = vec![0x0a, 0x09];
    expected.extend_from_slice(b"osmosis-1");
    expected.extend_from_slice(&[0x28, 0xc0, 0x84, 0x3d]);
    expected.extend_from_slice(&[0x32, 0x01, b'a', 0x32, 0x01, b'b']);
    assert_eq!(&bytes[..], &expected[..], "is_concluded=false 不得出现在线格式中");

    let decoded = mapper::decode(&ZONE_DROP, &bytes).unwrap();
    assert_eq!(decoded, zone_drop());
    assert_eq!(decoded.get_bool("is_concluded"), Some(false));
    assert_eq!(mapper::encode(&decoded).unwrap(), bytes);
}

#[test]
fn empty_params_and_embedding_frame() {
    assert!(mapper::encode(&Message::new(&PARAMS)).unwrap().is_empty());

    let genesis = Message::new(&GENESIS_STATE)
        .with("params", Message::new(&PARAMS))
        .unwrap();
    let bytes = mapper::encode(&genesis).unwrap();
    assert_eq!(&bytes[..], &[0x0a, 0x00]);
    let decoded = mapper::decode(&GENESIS_STATE, &bytes).unwrap();
    assert!(decoded.get_message("params").is_some());
}

#[test]
fn absent_proof_ops_stays_absent() {
    let response = Message::new(&MSG_SUBMIT_QUERY_RESPONSE)
        .with("chain_id", "cosmoshub-4")
        .unwrap()
        .with("query_id", "abc")
        .unwrap()
        .with("height", 12_345i64)
        .unwrap();
    let decoded = mapper::decode(&MSG_SUBMIT_QUERY_RESPONSE, &mapper::encode(&response).unwrap())
        .unwrap();
    assert!(decoded.get_message("proof_ops").is_none());
    assert_eq!(decoded, response);

    let with_empty = response
        .clone()
        .with("proof_ops", Message::new(&PROOF_OPS))
        .unwrap();
    let decoded =
        mapper::decode(&MSG_SUBMIT_QUERY_RESPONSE, &mapper::encode(&with_empty).unwrap()).unwrap();
    assert_eq!(decoded.get_message("proof_ops"), Some(&Message::new(&PROOF_OPS)));
    assert_ne!(decoded, response);
}

#[test]
fn appended_unknown_field_is_ignored() {
    let mut bytes = mapper::encode(&zone_drop()).unwrap().to_vec();
    // field 15, length-delimited, 3 bytes
    bytes.extend_from_slice(&[0x7a, 0x03, 0x01, 0x02, 0x03]);
    // field 16, fixed64
    bytes.extend_from_slice(&[0x81, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(mapper::decode(&ZONE_DROP, &bytes).unwrap(), zone_drop());
}

#[test]
fn claim_record_duplicate_map_keys_last_wins() {
    let first = Message::new(&COMPLETED_ACTION).with("claim_amount", 10u64).unwrap();
    let second = Message::new(&COMPLETED_ACTION).with("claim_amount", 20u64).unwrap();

    let mut one = Message::new(&CLAIM_RECORD);
    one.insert("actions_completed", 1, first).unwrap();
    let mut two = Message::new(&CLAIM_RECORD);
    two.insert("actions_completed", 1, second.clone()).unwrap();

    let mut bytes = mapper::encode(&one).unwrap().to_vec();
    bytes.extend_from_slice(&mapper::encode(&two).unwrap());
    let decoded = mapper::decode(&CLAIM_RECORD, &bytes).unwrap();
    let actions = decoded.map("actions_completed").unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[&MapKey::Int32(1)].as_message(), Some(&second));
}

#[test]
fn registry_dispatches_msg_claim() {
    let registry = registry();
    let proof = Message::new(&PROOF)
        .with("key", vec![1u8, 2, 3])
        .unwrap()
        .with("height", 99i64)
        .unwrap()
        .with(
            "proof_ops",
            Message::new(&PROOF_OPS)
                .with_repeated(
                    "ops",
                    [Message::new(&PROOF_OP).with("type", "ics23:iavl").unwrap()],
                )
                .unwrap(),
        )
        .unwrap();
    let claim = Message::new(&MSG_CLAIM)
        .with("chain_id", "osmosis-1")
        .unwrap()
        .with("action", 1i64)
        .unwrap()
        .with("address", "quick1xyz")
        .unwrap()
        .with_repeated("proofs", [proof])
        .unwrap();
    let envelope = Envelope::new(
        "/quicksilver.airdrop.v1.MsgClaim",
        mapper::encode(&claim).unwrap(),
    );
    let decoded = registry.decode_any(&envelope).unwrap();
    assert_eq!(decoded.type_url(), "/quicksilver.airdrop.v1.MsgClaim");
    assert_eq!(decoded, claim);
}

#[test]
fn unknown_type_url_is_reported() {
    let registry = registry();
    let err = registry
        .decode_any(&Envelope::new("/unknown.Type", vec![0x08, 0x01]))
        .unwrap_err();
    assert_eq!(err, CodecError::UnknownTypeUrl("/unknown.Type".into()));
    assert!(!err.is_malformed_input());
}

#[test]
fn register_all_is_idempotent() {
    let registry = registry();
    let before = registry.len();
    quartz_quicksilver::register_all(&registry).unwrap();
    assert_eq!(registry.len(), before);
    assert_eq!(before, quartz_quicksilver::DESCRIPTORS.len());
}

#[test]
fn governance_proposal_content_resolves_through_any() {
    let registry = registry();
    let proposal = Message::new(&REGISTER_ZONE_DROP_PROPOSAL)
        .with("title", "Osmosis airdrop")
        .unwrap()
        .with("zone_drop", zone_drop())
        .unwrap();
    let content = registry.pack(&proposal).unwrap().to_message().unwrap();
    let deposit = Message::new(&COIN)
        .with("denom", "uqck")
        .unwrap()
        .with("amount", "5000000")
        .unwrap();
    let submit = Message::new(&MSG_SUBMIT_PROPOSAL)
        .with("content", content)
        .unwrap()
        .with_repeated("initial_deposit", [deposit])
        .unwrap()
        .with("proposer", "quick1gov")
        .unwrap();

    let decoded = registry.decode_any(&registry.pack(&submit).unwrap()).unwrap();
    let inner = Envelope::from_message(decoded.get_message("content").unwrap()).unwrap();
    assert_eq!(registry.decode_any(&inner).unwrap(), proposal);
}

#[test]
fn msg_claim_amino_envelope() {
    let registry = registry();
    let claim = Message::new(&MSG_CLAIM)
        .with("chain_id", "osmosis-1")
        .unwrap()
        .with("action", 2i64)
        .unwrap()
        .with("address", "quick1xyz")
        .unwrap();
    let signed = registry.to_amino_msg(&claim).unwrap();
    assert_eq!(
        serde_json::to_string(&signed).unwrap(),
        r#"{"type":"quicksilver/MsgClaim","value":{"action":"2","address":"quick1xyz","chain_id":"osmosis-1"}}"#
    );
    assert_eq!(registry.from_amino_msg(&signed).unwrap(), claim);
}

#[test]
fn zone_drop_canonical_json_matches_lcd_shape() {
    let rendered = canonical::to_json(&zone_drop()).unwrap();
    assert_eq!(
        rendered,
        json!({
            "chainId": "osmosis-1",
            "allocation": "1000000",
            "actions": ["a", "b"],
            "isConcluded": false,
        })
    );
    assert_eq!(
        amino::to_json(&zone_drop()).unwrap(),
        json!({"actions": ["a", "b"], "allocation": "1000000", "chain_id": "osmosis-1"})
    );
}

#[test]
fn truncated_payload_is_not_a_default_message() {
    let bytes = mapper::encode(&zone_drop()).unwrap();
    let err = mapper::decode(&ZONE_DROP, &bytes[..bytes.len() - 1]).unwrap_err();
    assert!(err.is_malformed_input());
}
