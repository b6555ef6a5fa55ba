use crate::{AlertError, Detection};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

/// Timing rules for turning detections into alerts.
#[derive(Clone, Debug)]
pub struct AlertConfig {
    min_sustained: Duration,
    cooldown: Duration,
    score_threshold: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_sustained: Duration::from_secs(3),
            cooldown: Duration::from_secs(600),
            score_threshold: 0.0,
        }
    }
}

impl AlertConfig {
    /// How long a label must be seen without a gap before it may alert.
    pub fn with_min_sustained(mut self, min_sustained: Duration) -> Self {
        self.min_sustained = min_sustained;
        self
    }

    /// Minimum time between two alerts for the same label.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Detections must score strictly above this to count.
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    pub fn min_sustained(&self) -> Duration {
        self.min_sustained
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }
}

/// Per-label timers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelAlertState {
    detection_start: Option<Instant>,
    last_alert_time: Option<Instant>,
}

impl LabelAlertState {
    /// Start of the current unbroken run of detections, if one is running.
    pub fn detection_start(&self) -> Option<Instant> {
        self.detection_start
    }

    pub fn last_alert_time(&self) -> Option<Instant> {
        self.last_alert_time
    }

    /// Length of the current run at `now`.
    pub fn streak(&self, now: Instant) -> Option<Duration> {
        now.checked_duration_since(self.detection_start?)
    }

    fn is_eligible(&self, now: Instant, config: &AlertConfig) -> bool {
        self.streak(now)
            .is_some_and(|streak| streak >= config.min_sustained)
    }

    fn is_cooled_down(&self, now: Instant, config: &AlertConfig) -> bool {
        match self.last_alert_time {
            None => true,
            // a `now` before the last alert never fires, keeping alert times ordered
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|since| since >= config.cooldown),
        }
    }
}

/// An alert the caller should send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertDecision {
    pub label: String,
    pub at: Instant,
}

/// Decides, once per detection cycle, which labels should raise an alert.
///
/// A label alerts when it has been detected in every cycle for at least
/// `min_sustained` and its last alert is at least `cooldown` old. A single
/// cycle without the label restarts its run. Alerting does not restart the
/// run, so a label that stays in view alerts again every `cooldown`.
///
/// Labels are fixed at construction. The debouncer is not synchronized; share
/// it behind a mutex if several tasks feed it.
#[derive(Clone, Debug)]
pub struct AlertDebouncer {
    config: AlertConfig,
    states: BTreeMap<String, LabelAlertState>,
}

impl AlertDebouncer {
    pub fn new<I, S>(labels: I, config: AlertConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states = labels
            .into_iter()
            .map(|label| (label.into(), LabelAlertState::default()))
            .collect();
        Self { config, states }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Configured labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn state(&self, label: &str) -> Result<&LabelAlertState, AlertError> {
        self.states
            .get(label)
            .ok_or_else(|| AlertError::UnknownLabel(label.to_string()))
    }

    /// Run one cycle: update every label from this cycle's `detections` and
    /// return the labels that alert at `now`, at most one decision per label.
    ///
    /// Detections for labels that were not configured are ignored.
    pub fn evaluate(&mut self, detections: &[Detection], now: Instant) -> Vec<AlertDecision> {
        let config = &self.config;

        let mut seen: HashSet<&str> = HashSet::new();
        for detection in detections {
            // strictly above; NaN on either side never passes
            if detection.score.partial_cmp(&config.score_threshold) != Some(Ordering::Greater) {
                continue;
            }
            if self.states.contains_key(&detection.label) {
                seen.insert(&detection.label);
            } else {
                log::debug!("ignoring detection of unconfigured label {}", detection.label);
            }
        }

        let mut decisions = Vec::new();
        for (label, state) in self.states.iter_mut() {
            if seen.contains(label.as_str()) {
                if state.detection_start.is_none() {
                    log::debug!("{}: detection run started", label);
                    state.detection_start = Some(now);
                }
            } else if state.detection_start.take().is_some() {
                log::debug!("{}: detection run broken", label);
            }

            if state.is_eligible(now, config) && state.is_cooled_down(now, config) {
                log::info!("{}: alert", label);
                state.last_alert_time = Some(now);
                decisions.push(AlertDecision {
                    label: label.clone(),
                    at: now,
                });
            }
        }
        decisions
    }
}
