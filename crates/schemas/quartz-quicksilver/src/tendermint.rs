//! `tendermint.crypto` 默克尔证明类型，interchainquery 与 airdrop 的证明字段都引用它们。

use quartz_core::descriptor::{FieldDescriptor, FieldKind, MessageDescriptor};

/// `tendermint.crypto.ProofOp`：单步证明操作。
pub static PROOF_OP: MessageDescriptor = MessageDescriptor::new(
    "/tendermint.crypto.ProofOp",
    &[
        FieldDescriptor::singular(1, "type", FieldKind::String),
        FieldDescriptor::singular(2, "key", FieldKind::Bytes),
        FieldDescriptor::singular(3, "data", FieldKind::Bytes),
    ],
);

/// `tendermint.crypto.ProofOps`：按顺序执行的证明操作链。
pub static PROOF_OPS: MessageDescriptor = MessageDescriptor::new(
    "/tendermint.crypto.ProofOps",
    &[FieldDescriptor::repeated(1, "ops", FieldKind::Message(&PROOF_OP))],
);
