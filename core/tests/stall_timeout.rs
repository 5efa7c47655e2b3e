//! Stall timeout: a restore that waits too long for its location or its
//! subject is abandoned and the engine goes back to auto-saving.

use rewind_core::{
    restore::RestorePhase,
    sandbox::SandboxHost,
    FrameInput, RewindConfig, RewindEngine, RewindEvent,
};

const DT: f64 = 0.25;

fn frame(engine: &mut RewindEngine, host: &mut SandboxHost, rewind: bool) -> Vec<RewindEvent> {
    host.step(DT);
    engine.tick(host, FrameInput { dt: DT, rewind_pressed: rewind })
}

fn with_timeout(timeout: Option<f64>) -> RewindEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    RewindEngine::new(RewindConfig {
        stall_timeout_secs: timeout,
        ..RewindConfig::default_test()
    })
    .expect("engine")
}

/// One snapshot in "Crossroads" at tick 4 (t = 1.0s).
fn one_snapshot(engine: &mut RewindEngine) -> SandboxHost {
    let mut host = SandboxHost::new("Crossroads").manual_loads();
    for _ in 0..4 {
        frame(engine, &mut host, false);
    }
    assert_eq!(engine.history().len(), 1);
    host
}

fn stalled(events: &[RewindEvent]) -> Option<(u64, String, f64)> {
    events.iter().find_map(|e| match e {
        RewindEvent::RestoreStalled { tick, phase, waited_secs } => {
            Some((*tick, phase.clone(), *waited_secs))
        }
        _ => None,
    })
}

#[test]
fn location_that_never_loads_is_abandoned() {
    let mut engine = with_timeout(Some(2.0));
    let mut host = one_snapshot(&mut engine);
    host.set_location("Greenpath");

    // Rewind at tick 5 (t = 1.25s).
    frame(&mut engine, &mut host, true);
    assert_eq!(engine.restore_phase(), Some(RestorePhase::WaitingForLocation));

    for _ in 6..13 {
        let events = frame(&mut engine, &mut host, false);
        assert!(stalled(&events).is_none());
        assert!(engine.is_restoring());
    }

    // t = 3.25s: two seconds after the restore began.
    let events = frame(&mut engine, &mut host, false);
    let (tick, phase, waited) = stalled(&events).expect("stalled");
    assert_eq!(tick, 13);
    assert_eq!(phase, "waiting_for_location");
    assert!(waited >= 2.0);

    assert!(!engine.is_restoring(), "restoring flag cleared");
    assert!(engine.history().is_empty(), "the popped snapshot is not put back");
    assert_eq!(host.location(), Some("Greenpath"));
}

#[test]
fn auto_capture_resumes_after_a_stall() {
    let mut engine = with_timeout(Some(2.0));
    let mut host = one_snapshot(&mut engine);
    host.set_location("Greenpath");

    frame(&mut engine, &mut host, true);
    let mut events = Vec::new();
    for _ in 6..=13 {
        events.extend(frame(&mut engine, &mut host, false));
    }
    assert!(stalled(&events).is_some());

    // The save timer was reset at the rewind and frozen since.
    let mut taken = Vec::new();
    for _ in 14..=17 {
        for event in frame(&mut engine, &mut host, false) {
            if let RewindEvent::SnapshotTaken { tick, location, .. } = event {
                taken.push((tick, location));
            }
        }
    }
    assert_eq!(taken, vec![(17, "Greenpath".to_string())]);

    // A fresh rewind goes through normally.
    let mut events = frame(&mut engine, &mut host, true);
    for _ in 0..12 {
        events.extend(frame(&mut engine, &mut host, false));
    }
    assert!(events.iter().any(|e| e.kind() == "restore_completed"));
    assert!(stalled(&events).is_none());
}

#[test]
fn subject_that_never_appears_is_abandoned() {
    let mut engine = with_timeout(Some(2.0));
    let mut host = one_snapshot(&mut engine);

    frame(&mut engine, &mut host, true);
    assert_eq!(
        engine.restore_phase(),
        Some(RestorePhase::WaitingForSubject { seen: true })
    );
    host.despawn_subject();

    let mut events = Vec::new();
    for _ in 6..=13 {
        events.extend(frame(&mut engine, &mut host, false));
    }
    let (tick, phase, _) = stalled(&events).expect("stalled");
    assert_eq!(tick, 13);
    assert_eq!(phase, "waiting_for_subject");
    assert!(!engine.is_restoring());
}

#[test]
fn timeout_counts_from_the_start_of_the_restore() {
    let mut engine = with_timeout(Some(2.0));
    let mut host = one_snapshot(&mut engine);
    host.set_location("Greenpath");

    frame(&mut engine, &mut host, true); // tick 5
    host.despawn_subject();
    frame(&mut engine, &mut host, false); // tick 6
    frame(&mut engine, &mut host, false); // tick 7

    host.set_location("Crossroads");
    let events = frame(&mut engine, &mut host, false); // tick 8
    assert!(events.iter().any(|e| e.kind() == "location_reached"));
    assert_eq!(
        engine.restore_phase(),
        Some(RestorePhase::WaitingForSubject { seen: false })
    );

    let mut events = Vec::new();
    for _ in 9..=13 {
        events.extend(frame(&mut engine, &mut host, false));
    }
    let (tick, phase, _) = stalled(&events).expect("stalled");
    assert_eq!(tick, 13, "not reset on entering the subject wait");
    assert_eq!(phase, "waiting_for_subject");
}

#[test]
fn subject_vanishing_after_grace_tick_restarts_the_grace() {
    let mut engine = with_timeout(Some(2.0));
    let mut host = one_snapshot(&mut engine);

    frame(&mut engine, &mut host, true);
    assert_eq!(
        engine.restore_phase(),
        Some(RestorePhase::WaitingForSubject { seen: true })
    );

    let subject = host.subject.take();
    frame(&mut engine, &mut host, false);
    assert_eq!(
        engine.restore_phase(),
        Some(RestorePhase::WaitingForSubject { seen: false })
    );

    host.subject = subject;
    let events = frame(&mut engine, &mut host, false);
    assert!(events.iter().any(|e| e.kind() == "subject_reacquired"));
    let events = frame(&mut engine, &mut host, false);
    assert!(events.iter().any(|e| e.kind() == "snapshot_applied"));
}

#[test]
fn no_timeout_waits_forever() {
    let mut engine = with_timeout(None);
    let mut host = one_snapshot(&mut engine);
    host.set_location("Greenpath");

    frame(&mut engine, &mut host, true);
    for _ in 0..400 {
        let events = frame(&mut engine, &mut host, false);
        assert!(stalled(&events).is_none());
    }

    assert!(engine.is_restoring());
    assert_eq!(engine.restore_phase(), Some(RestorePhase::WaitingForLocation));
    assert_eq!(host.load_requests.len(), 1);
}
