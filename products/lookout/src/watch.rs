use crate::{AlertSettings, WatchSettings};
use lookout_alert::{
    Alert, AlertDebouncer, AlertError, Alerter, CommandAlerter, Detector, LogAlerter,
};
use lookout_com::{ComError, FrameFeed};
use std::time::{Duration, Instant, SystemTime};

/// Counters kept across the lifetime of a `Watcher`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub cycles: u64,
    pub detections: u64,
    pub detect_failures: u64,
    pub alerts_fired: u64,
    pub alert_failures: u64,
}

/// The alerter picked by configuration.
pub enum AnyAlerter {
    Log(LogAlerter),
    Command(CommandAlerter),
}

impl AnyAlerter {
    pub fn from_settings(settings: &AlertSettings, recipients: &[String]) -> Self {
        match &settings.command {
            Some(program) => AnyAlerter::Command(
                CommandAlerter::new(program.clone(), recipients.to_vec())
                    .with_args(settings.args.iter().cloned()),
            ),
            None => AnyAlerter::Log(LogAlerter::new(recipients.to_vec())),
        }
    }
}

impl Alerter for AnyAlerter {
    async fn send(&mut self, alert: &Alert) -> Result<(), AlertError> {
        match self {
            AnyAlerter::Log(alerter) => alerter.send(alert).await,
            AnyAlerter::Command(alerter) => alerter.send(alert).await,
        }
    }
}

/// Pulls frames from a camera, runs detection on each one and sends the
/// alerts the debouncer asks for.
///
/// Debounce state lives in the watcher, so it carries over when the caller
/// reconnects or reopens the camera.
pub struct Watcher<D, A> {
    detector: D,
    alerter: A,
    debouncer: AlertDebouncer,
    labels: Vec<String>,
    detection_interval: Duration,
    max_cycles: Option<u64>,
    stats: WatchStats,
}

impl<D: Detector, A: Alerter> Watcher<D, A> {
    pub fn new(detector: D, alerter: A, settings: &WatchSettings, alert: &AlertSettings) -> Self {
        Self {
            detector,
            alerter,
            debouncer: AlertDebouncer::new(settings.labels.iter().cloned(), alert.config.clone()),
            labels: settings.labels.clone(),
            detection_interval: settings.detection_interval,
            max_cycles: None,
            stats: WatchStats::default(),
        }
    }

    /// Stop `run` after this many cycles in total.
    pub fn with_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    pub fn stats(&self) -> WatchStats {
        self.stats
    }

    pub fn debouncer(&self) -> &AlertDebouncer {
        &self.debouncer
    }

    pub fn alerter(&self) -> &A {
        &self.alerter
    }

    fn is_done(&self) -> bool {
        self.max_cycles
            .is_some_and(|max_cycles| self.stats.cycles >= max_cycles)
    }

    /// Watch frames from `feed` until it fails or the cycle limit is reached.
    ///
    /// Detection and alert failures are logged and counted; only errors from
    /// the feed end the loop.
    pub async fn run<F: FrameFeed>(&mut self, feed: &mut F) -> Result<WatchStats, ComError> {
        while !self.is_done() {
            let frame = feed.next_frame().await?;
            self.stats.cycles += 1;

            match self.detector.detect(&frame, &self.labels).await {
                Ok(detections) => {
                    self.stats.detections += detections.len() as u64;
                    let decisions = self.debouncer.evaluate(&detections, Instant::now());
                    for decision in decisions {
                        let alert = Alert::new(decision.label, SystemTime::now());
                        match self.alerter.send(&alert).await {
                            Ok(()) => self.stats.alerts_fired += 1,
                            Err(e) => {
                                log::error!("failed to send alert \"{}\": {}", alert.subject(), e);
                                self.stats.alert_failures += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!("detection failed on frame {}: {}", frame, e);
                    self.stats.detect_failures += 1;
                }
            }

            if !self.is_done() {
                tokio::time::sleep(self.detection_interval).await;
            }
        }
        Ok(self.stats)
    }
}
