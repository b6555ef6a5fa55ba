use lookout::{AnySource, LookoutConfig, Watcher};
use lookout_alert::{Alert, AlertConfig, AlertError, Alerter, Detection, ReplayDetector};
use lookout_base::Rect;
use lookout_com::{ErrorKind, FrameClient, FrameServer};
use lookout_video::{CaptureConfig, PatternSource};
use std::net::SocketAddr;
use std::time::Duration;

struct RecordingAlerter {
    sent: Vec<Alert>,
    fail: bool,
}

impl RecordingAlerter {
    fn new() -> Self {
        Self {
            sent: Vec::new(),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            sent: Vec::new(),
            fail: true,
        }
    }
}

impl Alerter for RecordingAlerter {
    async fn send(&mut self, alert: &Alert) -> Result<(), AlertError> {
        self.sent.push(alert.clone());
        if self.fail {
            return Err(AlertError::Dispatch("mail server down".to_string()));
        }
        Ok(())
    }
}

async fn start_camera(frame_limit: Option<u64>) -> SocketAddr {
    let server = FrameServer::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = server.local_addr();
    let capture = CaptureConfig::default()
        .with_width(8)
        .with_height(6)
        .with_fps(0)
        .with_frame_limit(frame_limit);
    tokio::spawn(async move {
        let mut source = PatternSource::new(&capture);
        let _ = server.serve(&mut source).await;
    });
    addr
}

fn turkey() -> Vec<Detection> {
    vec![Detection::new("turkey", 0.9, Rect::zero())]
}

fn settings(min_sustained: Duration, cooldown: Duration) -> LookoutConfig {
    let mut config = LookoutConfig::default();
    config.watch.labels = vec!["turkey".to_string()];
    config.watch.detection_interval = Duration::from_millis(20);
    config.alert.config = AlertConfig::default()
        .with_min_sustained(min_sustained)
        .with_cooldown(cooldown);
    config
}

#[tokio::test]
async fn test_sustained_detection_alerts_once() {
    let addr = start_camera(None).await;
    let config = settings(Duration::from_millis(50), Duration::from_secs(60));
    let detector = ReplayDetector::from_cycles(vec![turkey()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::new(), &config.watch, &config.alert)
        .with_max_cycles(10);

    let mut client = FrameClient::connect(addr).await.expect("connect failed");
    let stats = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut client))
        .await
        .expect("watch timed out")
        .unwrap();

    assert_eq!(stats.cycles, 10);
    assert_eq!(stats.detections, 10);
    assert_eq!(stats.alerts_fired, 1);
    assert_eq!(stats.alert_failures, 0);
    assert_eq!(watcher.alerter().sent.len(), 1);
    assert_eq!(watcher.alerter().sent[0].label, "turkey");
    assert!(watcher.alerter().sent[0].image.is_none());
}

#[tokio::test]
async fn test_interrupted_detection_never_alerts() {
    let addr = start_camera(None).await;
    let config = settings(Duration::from_millis(50), Duration::from_secs(60));
    let detector = ReplayDetector::from_cycles(vec![turkey(), Vec::new()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::new(), &config.watch, &config.alert)
        .with_max_cycles(8);

    let mut client = FrameClient::connect(addr).await.expect("connect failed");
    let stats = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut client))
        .await
        .expect("watch timed out")
        .unwrap();

    assert_eq!(stats.cycles, 8);
    assert_eq!(stats.detections, 4);
    assert_eq!(stats.alerts_fired, 0);
    assert!(watcher.alerter().sent.is_empty());
}

#[tokio::test]
async fn test_alert_failures_do_not_stop_watching() {
    let addr = start_camera(None).await;
    let config = settings(Duration::ZERO, Duration::ZERO);
    let detector = ReplayDetector::from_cycles(vec![turkey()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::failing(), &config.watch, &config.alert)
        .with_max_cycles(3);

    let mut client = FrameClient::connect(addr).await.expect("connect failed");
    let stats = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut client))
        .await
        .expect("watch timed out")
        .unwrap();

    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.alerts_fired, 0);
    assert_eq!(stats.alert_failures, 3);
    assert_eq!(watcher.alerter().sent.len(), 3);
}

#[tokio::test]
async fn test_lost_camera_ends_run_with_transport_error() {
    let addr = start_camera(Some(3)).await;
    let config = settings(Duration::from_secs(3), Duration::from_secs(600));
    let detector = ReplayDetector::from_cycles(vec![turkey()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::new(), &config.watch, &config.alert);

    let mut client = FrameClient::connect(addr).await.expect("connect failed");
    let err = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut client))
        .await
        .expect("watch timed out")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(watcher.stats().cycles, 3);
    // the streak survives the lost connection
    assert!(
        watcher
            .debouncer()
            .state("turkey")
            .unwrap()
            .detection_start()
            .is_some()
    );
}

#[tokio::test]
async fn test_local_source_alerts_without_server() {
    let mut config = settings(Duration::from_millis(50), Duration::from_secs(60));
    config.capture.config = CaptureConfig::default()
        .with_width(8)
        .with_height(6)
        .with_fps(0);
    let mut source = AnySource::open(&config.capture).unwrap();

    let detector = ReplayDetector::from_cycles(vec![turkey()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::new(), &config.watch, &config.alert)
        .with_max_cycles(10);

    let stats = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut source))
        .await
        .expect("watch timed out")
        .unwrap();

    assert_eq!(stats.cycles, 10);
    assert_eq!(stats.alerts_fired, 1);
    assert_eq!(watcher.alerter().sent[0].label, "turkey");
}

#[tokio::test]
async fn test_local_source_failure_ends_run_with_capture_error() {
    let capture = CaptureConfig::default()
        .with_width(8)
        .with_height(6)
        .with_fps(0)
        .with_frame_limit(Some(2));
    let mut source = PatternSource::new(&capture);
    let config = settings(Duration::from_secs(3), Duration::from_secs(600));
    let detector = ReplayDetector::from_cycles(vec![turkey()]).unwrap();
    let mut watcher = Watcher::new(detector, RecordingAlerter::new(), &config.watch, &config.alert);

    let err = tokio::time::timeout(Duration::from_secs(10), watcher.run(&mut source))
        .await
        .expect("watch timed out")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Capture);
    assert_eq!(watcher.stats().cycles, 2);
}
