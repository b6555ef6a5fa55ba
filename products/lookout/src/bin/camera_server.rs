//! camera-server - streams frames from the local camera to one watcher at a time

use anyhow::{Context, Result, bail};
use clap::Parser;
use lookout::{AnySource, LookoutConfig, SourceKind, config::init_logging};
use lookout_com::FrameServer;
use std::path::PathBuf;
use std::time::Duration;

// wait before reopening a failed capture source
const REOPEN_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (TOML). Defaults apply when unset.
    #[arg(long, value_name = "PATH", env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,
    /// Address to listen on, overriding `server.addr`.
    #[arg(long)]
    addr: Option<String>,
    /// Capture source, overriding `capture.source`.
    #[arg(long, value_parser = parse_source)]
    source: Option<SourceKind>,
}

fn parse_source(value: &str) -> Result<SourceKind, String> {
    match value {
        "pattern" => Ok(SourceKind::Pattern),
        "v4l2" => Ok(SourceKind::V4l2),
        other => Err(format!("unknown source {other:?}, expected pattern or v4l2")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = LookoutConfig::load(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }
    if let Some(source) = args.source {
        config.capture.source = source;
    }
    init_logging(config.log_dir.as_deref())?;
    if !AnySource::is_supported(config.capture.source) {
        bail!("camera-server was built without v4l2 support");
    }

    let server = FrameServer::bind(config.server_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;

    loop {
        match AnySource::open(&config.capture) {
            Ok(mut source) => {
                let Err(e) = server.serve(&mut source).await;
                log::error!("capture source failed: {}", e);
            }
            Err(e) => log::error!("failed to open capture source: {}", e),
        }
        log::info!("reopening capture source in {:?}", REOPEN_DELAY);
        tokio::time::sleep(REOPEN_DELAY).await;
    }
}
