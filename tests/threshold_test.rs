use verko::services::preference::Thresholds;
use verko::services::stock::{bucket, evaluate, Severity};

/// Replay a stock history and collect the severity of every alert that
/// actually fires.
fn alerts_for(history: &[i32], thresholds: &Thresholds) -> Vec<Severity> {
    history
        .windows(2)
        .filter_map(|w| {
            let (severity, should_notify) = evaluate(w[0], w[1], thresholds);
            should_notify.then_some(severity)
        })
        .collect()
}

#[test]
fn descending_sequence_alerts_once_per_band() {
    let th = Thresholds::new(5, 10);
    assert_eq!(
        alerts_for(&[20, 8, 4, 0], &th),
        vec![Severity::Medium, Severity::Low, Severity::Out]
    );
}

#[test]
fn drop_within_medium_band_stays_quiet() {
    let th = Thresholds::new(5, 10);
    // 7 is in the same band as 8, so only the entry into medium and the
    // final out-of-stock fire.
    assert_eq!(
        alerts_for(&[20, 8, 7, 0], &th),
        vec![Severity::Medium, Severity::Out]
    );
}

#[test]
fn oscillation_produces_no_repeat_alerts() {
    let th = Thresholds::new(5, 10);
    assert_eq!(alerts_for(&[20, 6, 7, 6, 7], &th), vec![Severity::Medium]);
}

#[test]
fn recovery_rearms_the_alert() {
    let th = Thresholds::new(5, 10);
    assert_eq!(
        alerts_for(&[20, 4, 50, 3], &th),
        vec![Severity::Low, Severity::Low]
    );
}

#[test]
fn users_with_different_thresholds_diverge_on_the_same_write() {
    // The same drop to 5 units: one user's bands ignore it, the other's
    // treat it as low stock.
    let relaxed = Thresholds::new(3, 4);
    let strict = Thresholds::new(8, 10);

    let (sev_relaxed, notify_relaxed) = evaluate(20, 5, &relaxed);
    let (sev_strict, notify_strict) = evaluate(20, 5, &strict);

    assert_eq!(sev_relaxed, Severity::None);
    assert!(!notify_relaxed);
    assert_eq!(sev_strict, Severity::Low);
    assert!(notify_strict);
}

#[test]
fn zero_is_always_out() {
    for th in [Thresholds::new(5, 10), Thresholds::new(1, 2)] {
        assert_eq!(bucket(0, &th), Severity::Out);
    }
}

#[test]
fn malformed_thresholds_fall_back_to_defaults() {
    // low >= medium is repaired, so the default bands apply.
    let th = Thresholds::new(10, 5);
    assert_eq!(bucket(5, &th), Severity::Low);
    assert_eq!(bucket(8, &th), Severity::Medium);
    assert_eq!(bucket(11, &th), Severity::None);
}
