use lookout_alert::{AlertConfig, AlertDebouncer, AlertError, Detection};
use lookout_base::Rect;
use std::time::{Duration, Instant};

fn seen(label: &str) -> Vec<Detection> {
    vec![Detection::new(label, 0.9, Rect::zero())]
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn turkey_debouncer() -> AlertDebouncer {
    AlertDebouncer::new(["turkey"], AlertConfig::default())
}

#[test]
fn test_fires_after_sustained_detection() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();

    // one cycle per second: t0, t0+1, t0+2 are too early, t0+3 fires
    for i in 0..3 {
        assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(i)).is_empty());
    }
    let decisions = debouncer.evaluate(&seen("turkey"), t0 + secs(3));
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].label, "turkey");
    assert_eq!(decisions[0].at, t0 + secs(3));

    let state = debouncer.state("turkey").unwrap();
    assert_eq!(state.detection_start(), Some(t0));
    assert_eq!(state.last_alert_time(), Some(t0 + secs(3)));
}

#[test]
fn test_gap_restarts_streak() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();

    debouncer.evaluate(&seen("turkey"), t0);
    debouncer.evaluate(&seen("turkey"), t0 + secs(1));
    debouncer.evaluate(&seen("turkey"), t0 + secs(2));
    assert!(debouncer.evaluate(&[], t0 + secs(3)).is_empty());
    assert_eq!(debouncer.state("turkey").unwrap().detection_start(), None);

    // streak restarts at t0+4, so t0+6 is still too early
    assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(4)).is_empty());
    assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(6)).is_empty());
    assert_eq!(debouncer.evaluate(&seen("turkey"), t0 + secs(7)).len(), 1);
}

#[test]
fn test_cooldown_suppresses_then_allows() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();

    debouncer.evaluate(&seen("turkey"), t0);
    assert_eq!(debouncer.evaluate(&seen("turkey"), t0 + secs(3)).len(), 1);

    // still in view, still cooling down
    assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(303)).is_empty());
    // continuous streak, cooldown over: fires again without a new streak
    let decisions = debouncer.evaluate(&seen("turkey"), t0 + secs(604));
    assert_eq!(decisions.len(), 1);
    assert_eq!(
        debouncer.state("turkey").unwrap().last_alert_time(),
        Some(t0 + secs(604))
    );
}

#[test]
fn test_cooldown_applies_across_streaks() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();

    debouncer.evaluate(&seen("turkey"), t0);
    assert_eq!(debouncer.evaluate(&seen("turkey"), t0 + secs(3)).len(), 1);
    debouncer.evaluate(&[], t0 + secs(4));

    // a fresh sustained streak inside the cooldown does not fire
    debouncer.evaluate(&seen("turkey"), t0 + secs(300));
    assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(303)).is_empty());
}

#[test]
fn test_labels_are_independent() {
    let mut debouncer = AlertDebouncer::new(["turkey", "deer"], AlertConfig::default());
    let t0 = Instant::now();

    let both = vec![
        Detection::new("turkey", 0.8, Rect::zero()),
        Detection::new("deer", 0.7, Rect::zero()),
    ];
    debouncer.evaluate(&both, t0);
    debouncer.evaluate(&seen("turkey"), t0 + secs(1));
    debouncer.evaluate(&both, t0 + secs(2));
    let decisions = debouncer.evaluate(&both, t0 + secs(3));

    let labels: Vec<&str> = decisions.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["turkey"]);
    assert_eq!(
        debouncer.state("deer").unwrap().detection_start(),
        Some(t0 + secs(2))
    );
}

#[test]
fn test_one_decision_per_label_per_cycle() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();
    let flock = vec![
        Detection::new("turkey", 0.9, Rect::zero()),
        Detection::new("turkey", 0.6, Rect::zero()),
    ];

    debouncer.evaluate(&flock, t0);
    assert_eq!(debouncer.evaluate(&flock, t0 + secs(3)).len(), 1);
}

#[test]
fn test_unknown_label() {
    let mut debouncer = turkey_debouncer();
    let t0 = Instant::now();

    debouncer.evaluate(&seen("cat"), t0);
    assert!(debouncer.evaluate(&seen("cat"), t0 + secs(10)).is_empty());

    match debouncer.state("cat") {
        Err(AlertError::UnknownLabel(label)) => assert_eq!(label, "cat"),
        other => panic!("Expected UnknownLabel, got {:?}", other),
    }
    assert_eq!(debouncer.labels().collect::<Vec<_>>(), vec!["turkey"]);
}

#[test]
fn test_score_threshold() {
    let config = AlertConfig::default().with_score_threshold(0.5);
    let mut debouncer = AlertDebouncer::new(["turkey"], config);
    let t0 = Instant::now();

    let weak = vec![Detection::new("turkey", 0.5, Rect::zero())];
    debouncer.evaluate(&weak, t0);
    assert_eq!(debouncer.state("turkey").unwrap().detection_start(), None);

    let strong = vec![Detection::new("turkey", 0.51, Rect::zero())];
    debouncer.evaluate(&strong, t0 + secs(1));
    assert_eq!(
        debouncer.state("turkey").unwrap().detection_start(),
        Some(t0 + secs(1))
    );
}

#[test]
fn test_zero_sustain_fires_on_first_sighting() {
    let config = AlertConfig::default()
        .with_min_sustained(Duration::ZERO)
        .with_cooldown(secs(10));
    let mut debouncer = AlertDebouncer::new(["turkey"], config);
    let t0 = Instant::now();

    assert_eq!(debouncer.evaluate(&seen("turkey"), t0).len(), 1);
    assert!(debouncer.evaluate(&seen("turkey"), t0 + secs(9)).is_empty());
    assert_eq!(debouncer.evaluate(&seen("turkey"), t0 + secs(10)).len(), 1);
}

#[test]
fn test_nan_score_is_not_a_detection() {
    let config = AlertConfig::default().with_min_sustained(Duration::ZERO);
    let mut debouncer = AlertDebouncer::new(["turkey"], config);
    let t0 = Instant::now();

    let garbled = vec![Detection::new("turkey", f32::NAN, Rect::zero())];
    assert!(debouncer.evaluate(&garbled, t0).is_empty());
    assert_eq!(debouncer.state("turkey").unwrap().detection_start(), None);

    // a NaN threshold admits nothing either
    let config = AlertConfig::default()
        .with_min_sustained(Duration::ZERO)
        .with_score_threshold(f32::NAN);
    let mut debouncer = AlertDebouncer::new(["turkey"], config);
    assert!(debouncer.evaluate(&seen("turkey"), t0).is_empty());
}
