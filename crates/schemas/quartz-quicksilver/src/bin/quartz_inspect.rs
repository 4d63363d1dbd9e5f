//! 负载检查工具：按类型 URL 解码十六进制 protobuf 负载，并打印选定的文本形态。
//!
//! # 使用方法
//! ```bash
//! cargo run --bin quartz-inspect -- /quicksilver.airdrop.v1.MsgClaim 0a096f736d6f7369732d31 amino
//! ```
//! - 第一个参数为类型 URL，必须已由 `quartz_quicksilver::register_all` 登记；
//! - 第二个参数为十六进制负载，可带 `0x` 前缀；
//! - 第三个参数可选：`canonical`（默认）、`amino` 或 `sdk`。
//!
//! 日志写入 stderr，级别由 `RUST_LOG` 控制（缺省 `info`），结果 JSON 写入 stdout。

use anyhow::{Context, bail};
use quartz_core::json::{amino, canonical, sdk};
use quartz_core::{CodecConfig, Envelope, JsonFormat};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: quartz-inspect <type-url> <hex-payload> [canonical|amino|sdk]";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let type_url = args.next().context(USAGE)?;
    let payload_hex = args.next().context(USAGE)?;
    let format = match args.next().as_deref() {
        None | Some("canonical") => JsonFormat::Canonical,
        Some("amino") => JsonFormat::Amino,
        Some("sdk") => JsonFormat::Sdk,
        Some(other) => bail!("unknown format `{other}`\n{USAGE}"),
    };

    let payload = hex::decode(payload_hex.trim().trim_start_matches("0x"))
        .context("payload is not valid hex")?;
    let payload_len = payload.len();

    let registry = quartz_quicksilver::registry(CodecConfig::default())?;
    let message = registry
        .decode_any(&Envelope::new(type_url.as_str(), payload))
        .with_context(|| format!("failed to decode `{type_url}`"))?;

    let rendered = match format {
        JsonFormat::Canonical => canonical::to_json(&message)?,
        JsonFormat::Amino => amino::to_json(&message)?,
        JsonFormat::Sdk => sdk::to_json(&message)?,
    };
    info!(type_url = %type_url, bytes = payload_len, format = %format, "decoded payload");
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
