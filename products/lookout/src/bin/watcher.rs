//! watcher - receives frames from a camera and sends alerts for sustained detections

use anyhow::{Context, Result, bail};
use clap::Parser;
use lookout::{AnyAlerter, AnySource, LookoutConfig, WatchStats, Watcher, config::init_logging};
use lookout_alert::{Alerter, Detector, ReplayDetector};
use lookout_com::FrameClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (TOML). Defaults apply when unset.
    #[arg(long, value_name = "PATH", env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,
    /// Camera address, overriding `watch.camera`.
    #[arg(long, conflicts_with = "local")]
    camera: Option<String>,
    /// Read frames from the local capture source (`[capture]`) instead of a
    /// camera server.
    #[arg(long)]
    local: bool,
    /// Recorded detections (JSON) to replay instead of running a model.
    #[arg(long, value_name = "PATH")]
    detections: PathBuf,
    /// Labels to watch for, overriding `watch.labels`.
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,
    /// Stop after this many detection cycles.
    #[arg(long)]
    max_cycles: Option<u64>,
}

/// One session against the camera server. `None` when the connection failed.
async fn watch_remote<D: Detector, A: Alerter>(
    watcher: &mut Watcher<D, A>,
    camera: &str,
) -> Option<WatchStats> {
    let mut client = match FrameClient::connect(camera).await {
        Ok(client) => client,
        Err(e) => {
            log::warn!("failed to connect to {}: {}", camera, e);
            return None;
        }
    };
    match watcher.run(&mut client).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            log::warn!("lost camera {}: {}", client.peer_addr(), e);
            None
        }
    }
}

/// One session against the local capture source. `None` when it failed.
async fn watch_local<D: Detector, A: Alerter>(
    watcher: &mut Watcher<D, A>,
    config: &LookoutConfig,
) -> Option<WatchStats> {
    let mut source = match AnySource::open(&config.capture) {
        Ok(source) => source,
        Err(e) => {
            log::warn!("failed to open capture source: {}", e);
            return None;
        }
    };
    match watcher.run(&mut source).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            log::warn!("capture source failed: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = LookoutConfig::load(args.config.as_deref())?;
    if let Some(camera) = args.camera {
        config.watch.camera = camera;
    }
    if !args.labels.is_empty() {
        config.watch.labels = args.labels;
    }
    init_logging(config.log_dir.as_deref())?;
    if args.local && !AnySource::is_supported(config.capture.source) {
        bail!("watcher was built without v4l2 support");
    }

    let detector = ReplayDetector::from_path(&args.detections)
        .with_context(|| format!("failed to load detections {}", args.detections.display()))?;
    let alerter = AnyAlerter::from_settings(&config.alert, &config.watch.recipients);
    let mut watcher = Watcher::new(detector, alerter, &config.watch, &config.alert);
    if let Some(max_cycles) = args.max_cycles {
        watcher = watcher.with_max_cycles(max_cycles);
    }

    if args.local {
        log::info!(
            "watching local {:?} source for [{}]",
            config.capture.source,
            config.watch.labels.join(", ")
        );
    } else {
        log::info!(
            "watching {} for [{}]",
            config.watch.camera,
            config.watch.labels.join(", ")
        );
    }
    loop {
        let finished = if args.local {
            watch_local(&mut watcher, &config).await
        } else {
            watch_remote(&mut watcher, &config.watch.camera).await
        };
        if let Some(stats) = finished {
            log::info!("done: {:?}", stats);
            return Ok(());
        }
        tokio::time::sleep(config.watch.reconnect_delay).await;
    }
}
