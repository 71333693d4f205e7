use attempt_gate::infrastructure::mocks::{MockClock, SequentialIdentitySource};
use attempt_gate::{AttemptGate, GateDecision, MemoryStore};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, d)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap()
}

fn gate() -> AttemptGate {
    AttemptGate::builder()
        .with_store(MemoryStore::new())
        .with_clock(Arc::new(MockClock::new(day(19))))
        .with_identity_source(SequentialIdentitySource::new("device_"))
        .build()
        .unwrap()
}

#[test]
fn test_threshold_consumptions_then_blocked() {
    for threshold in 0..=6 {
        let gate = gate();
        let id = gate.ensure_identity();

        for call in 0..threshold {
            assert_eq!(
                gate.check_and_consume(&id, threshold, day(19)),
                GateDecision::Allowed,
                "call {} of {} should be allowed",
                call + 1,
                threshold
            );
        }
        assert_eq!(
            gate.check_and_consume(&id, threshold, day(19)),
            GateDecision::Blocked,
            "call {} should be blocked",
            threshold + 1
        );
    }
}

#[test]
fn test_remaining_after_n_consumptions() {
    let threshold = 5;
    let gate = gate();
    let id = gate.ensure_identity();

    for n in 0..=threshold {
        assert_eq!(gate.remaining(&id, threshold, day(19)), threshold - n);
        gate.check_and_consume(&id, threshold, day(19));
    }
    assert_eq!(gate.remaining(&id, threshold, day(19)), 0);
}

#[test]
fn test_later_day_after_blocked() {
    let gate = gate();
    let id = gate.ensure_identity();

    while gate.check_and_consume(&id, 2, day(19)).is_allowed() {}

    assert_eq!(gate.check_and_consume(&id, 2, day(22)), GateDecision::Allowed);
    assert_eq!(gate.remaining(&id, 2, day(23)), 2);
}

#[test]
fn test_reset_then_allowed_same_day() {
    let gate = gate();
    let id = gate.ensure_identity();

    for _ in 0..7 {
        gate.consume(&id);
    }
    gate.reset(&id);
    assert_eq!(gate.consume(&id), GateDecision::Allowed);
}

#[test]
fn test_ensure_identity_twice() {
    let gate = gate();
    assert_eq!(gate.ensure_identity(), gate.ensure_identity());
}

#[test]
fn test_three_per_day_scenario() {
    let gate = gate();
    let id = gate.ensure_identity();
    let d = day(19);
    let d_plus_1 = d + Duration::days(1);

    assert_eq!(gate.check_and_consume(&id, 3, d), GateDecision::Allowed);
    assert_eq!(gate.check_and_consume(&id, 3, d), GateDecision::Allowed);
    assert_eq!(gate.check_and_consume(&id, 3, d), GateDecision::Allowed);
    assert_eq!(gate.check_and_consume(&id, 3, d), GateDecision::Blocked);

    assert_eq!(gate.remaining(&id, 3, d_plus_1), 3);
    assert_eq!(gate.check_and_consume(&id, 3, d_plus_1), GateDecision::Allowed);
}

#[test]
fn test_ignoring_blocked_does_not_corrupt_count() {
    let gate = gate();
    let id = gate.ensure_identity();

    for _ in 0..20 {
        gate.check_and_consume(&id, 3, day(19));
    }
    let status = gate.status_at(&id, day(19));
    assert_eq!(status.used, 3);
    assert_eq!(status.remaining, 0);
    assert!(status.is_blocked());
}

#[test]
fn test_lowering_threshold_blocks_existing_count() {
    let gate = gate();
    let id = gate.ensure_identity();

    gate.check_and_consume(&id, 5, day(19));
    gate.check_and_consume(&id, 5, day(19));

    assert_eq!(gate.check_and_consume(&id, 1, day(19)), GateDecision::Blocked);
    assert_eq!(gate.remaining(&id, 1, day(19)), 0);
    assert_eq!(gate.remaining(&id, 5, day(19)), 3);
}
