use anyhow::{Context, Result, anyhow};
use lookout_alert::AlertConfig;
use lookout_com::framing::MAX_MESSAGE_SIZE;
use lookout_video::{CaptureConfig, Frame, PixelFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when none is given on the
/// command line.
pub const CONFIG_ENV: &str = "LOOKOUT_CONFIG";

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8089";
const DEFAULT_CAMERA_ADDR: &str = "pi-camera:8089";
const DEFAULT_LABEL: &str = "turkey";
const DEFAULT_DETECTION_INTERVAL_MS: u64 = 1000;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LookoutConfigFile {
    server: Option<ServerConfigFile>,
    capture: Option<CaptureConfigFile>,
    watch: Option<WatchConfigFile>,
    alert: Option<AlertConfigFile>,
    log: Option<LogConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ServerConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CaptureConfigFile {
    source: Option<SourceKind>,
    device: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
    format: Option<PixelFormat>,
    frame_limit: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct WatchConfigFile {
    camera: Option<String>,
    labels: Option<Vec<String>>,
    recipients: Option<Vec<String>>,
    detection_interval_ms: Option<u64>,
    reconnect_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AlertConfigFile {
    min_sustained_secs: Option<f64>,
    cooldown_secs: Option<f64>,
    score_threshold: Option<f32>,
    command: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LogConfigFile {
    dir: Option<PathBuf>,
}

/// Where the camera host gets its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Pattern,
    V4l2,
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub source: SourceKind,
    pub config: CaptureConfig,
}

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub camera: String,
    pub labels: Vec<String>,
    pub recipients: Vec<String>,
    pub detection_interval: Duration,
    pub reconnect_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub config: AlertConfig,
    /// Program to run per alert; alerts are only logged when unset.
    pub command: Option<String>,
    pub args: Vec<String>,
}

/// Settings for both binaries, read from one TOML file.
#[derive(Debug, Clone)]
pub struct LookoutConfig {
    pub server_addr: String,
    pub capture: CaptureSettings,
    pub watch: WatchSettings,
    pub alert: AlertSettings,
    pub log_dir: Option<PathBuf>,
}

impl Default for LookoutConfig {
    fn default() -> Self {
        // the empty file yields every default
        Self::from_file(LookoutConfigFile::default())
    }
}

impl LookoutConfig {
    /// Load from `path`, or from the file named by `LOOKOUT_CONFIG`, or use
    /// defaults when neither is set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let file_cfg = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => read_config_file(&path)?,
            None => LookoutConfigFile::default(),
        };
        let cfg = Self::from_file(file_cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: LookoutConfigFile = toml::from_str(raw).context("invalid config")?;
        let cfg = Self::from_file(file);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: LookoutConfigFile) -> Self {
        let server = file.server.unwrap_or_default();
        let capture = file.capture.unwrap_or_default();
        let watch = file.watch.unwrap_or_default();
        let alert = file.alert.unwrap_or_default();
        let log = file.log.unwrap_or_default();

        let mut capture_config = CaptureConfig::default();
        if let Some(device) = capture.device {
            capture_config = capture_config.with_device(device);
        }
        if let Some(width) = capture.width {
            capture_config = capture_config.with_width(width);
        }
        if let Some(height) = capture.height {
            capture_config = capture_config.with_height(height);
        }
        if let Some(fps) = capture.fps {
            capture_config = capture_config.with_fps(fps);
        }
        if let Some(format) = capture.format {
            capture_config = capture_config.with_format(format);
        }
        capture_config = capture_config.with_frame_limit(capture.frame_limit);

        let mut alert_config = AlertConfig::default();
        if let Some(secs) = alert.min_sustained_secs {
            alert_config = alert_config.with_min_sustained(secs_f64(secs));
        }
        if let Some(secs) = alert.cooldown_secs {
            alert_config = alert_config.with_cooldown(secs_f64(secs));
        }
        if let Some(threshold) = alert.score_threshold {
            alert_config = alert_config.with_score_threshold(threshold);
        }

        Self {
            server_addr: server
                .addr
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            capture: CaptureSettings {
                source: capture.source.unwrap_or_default(),
                config: capture_config,
            },
            watch: WatchSettings {
                camera: watch
                    .camera
                    .unwrap_or_else(|| DEFAULT_CAMERA_ADDR.to_string()),
                labels: watch
                    .labels
                    .unwrap_or_else(|| vec![DEFAULT_LABEL.to_string()]),
                recipients: watch.recipients.unwrap_or_default(),
                detection_interval: Duration::from_millis(
                    watch
                        .detection_interval_ms
                        .unwrap_or(DEFAULT_DETECTION_INTERVAL_MS),
                ),
                reconnect_delay: Duration::from_millis(
                    watch
                        .reconnect_delay_ms
                        .unwrap_or(DEFAULT_RECONNECT_DELAY_MS),
                ),
            },
            alert: AlertSettings {
                config: alert_config,
                command: alert.command.filter(|c| !c.trim().is_empty()),
                args: alert.args.unwrap_or_default(),
            },
            log_dir: log.dir,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.watch.labels.is_empty() {
            return Err(anyhow!("watch.labels must name at least one label"));
        }
        if self.capture.config.width() == 0 || self.capture.config.height() == 0 {
            return Err(anyhow!("capture width and height must be non-zero"));
        }
        let capture = &self.capture.config;
        let frame_len =
            Frame::encoded_len(capture.width(), capture.height(), capture.format().channels());
        if frame_len > MAX_MESSAGE_SIZE {
            return Err(anyhow!(
                "capture {}x{} {:?} frames need {} bytes, above the {} byte message limit",
                capture.width(),
                capture.height(),
                capture.format(),
                frame_len,
                MAX_MESSAGE_SIZE
            ));
        }
        Ok(())
    }
}

// negative or non-finite values clamp to zero
fn secs_f64(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn read_config_file(path: &Path) -> Result<LookoutConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Install the stdout logger, or the file logger when a log directory is
/// configured.
pub fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    match log_dir {
        Some(dir) => lookout_base::init_file_logger(dir)
            .with_context(|| format!("failed to open log directory {}", dir.display())),
        None => {
            lookout_base::init_stdout_logger();
            Ok(())
        }
    }
}
