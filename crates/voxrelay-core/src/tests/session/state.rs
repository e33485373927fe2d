use crate::{SessionState, SessionStateMachine};

use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

/// WHAT: A fresh machine is Idle with the hotkey enabled
/// WHY: The application accepts the first trigger without setup
#[test]
fn given_new_machine_when_inspected_then_idle_and_enabled() {
    let machine = SessionStateMachine::new();

    assert_eq!(machine.get_state(), SessionState::Idle);
    assert!(machine.is_enabled());
}

/// WHAT: Compare-and-set applies only when the expected state matches
/// WHY: A stale caller must not move the cycle forward
#[test]
fn given_mismatched_expected_state_when_transitioning_then_rejected() {
    // Given: Machine in Idle
    let machine = SessionStateMachine::new();

    // When: Attempting Recording -> Processing
    let moved = machine.try_transition(SessionState::Recording, SessionState::Processing);

    // Then: Rejected and state unchanged
    assert!(!moved);
    assert_eq!(machine.get_state(), SessionState::Idle);
}

/// WHAT: Any pair is accepted when the expected state matches
/// WHY: Reset paths (Recording -> Idle) and direct jumps must be expressible
#[test]
fn given_matching_expected_state_when_transitioning_then_any_target_accepted() {
    let machine = SessionStateMachine::new();

    assert!(machine.try_transition(SessionState::Idle, SessionState::Processing));
    assert!(machine.try_transition(SessionState::Processing, SessionState::Recording));
    assert!(machine.try_transition(SessionState::Recording, SessionState::Idle));
    assert_eq!(machine.get_state(), SessionState::Idle);
}

/// WHAT: Exactly one of many concurrent callers wins the same transition
/// WHY: Two racing triggers must never both start a recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_concurrent_callers_when_transitioning_from_idle_then_exactly_one_wins() {
    // Given: 16 threads released together
    const CALLERS: usize = 16;
    let machine = Arc::new(SessionStateMachine::new());
    let barrier = Arc::new(Barrier::new(CALLERS));
    let winners = Arc::new(AtomicUsize::new(0));

    // When: Each attempts Idle -> Recording
    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let machine = Arc::clone(&machine);
            let barrier = Arc::clone(&barrier);
            let winners = Arc::clone(&winners);
            thread::spawn(move || {
                barrier.wait();
                if machine.try_transition(SessionState::Idle, SessionState::Recording) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Then: One winner, state is Recording
    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(machine.get_state(), SessionState::Recording);
}

/// WHAT: The enabled flag is independent of the state
/// WHY: Disabling must not be encoded as a fourth state
#[test]
fn given_recording_when_disabling_flag_then_state_untouched() {
    let machine = SessionStateMachine::new();
    machine.set_state(SessionState::Recording);

    machine.set_enabled(false);

    assert!(!machine.is_enabled());
    assert_eq!(machine.get_state(), SessionState::Recording);
}

/// WHAT: Subscribers observe every committed state
/// WHY: The tray icon follows the state through this channel
#[test]
fn given_subscriber_when_state_changes_then_latest_state_visible() {
    // Given: A subscriber on a fresh machine
    let machine = SessionStateMachine::new();
    let mut changes = machine.subscribe();
    assert_eq!(*changes.borrow(), SessionState::Idle);

    // When: A successful and a rejected transition
    assert!(machine.try_transition(SessionState::Idle, SessionState::Recording));
    assert!(!machine.try_transition(SessionState::Idle, SessionState::Processing));

    // Then: Only the committed state is published
    assert!(changes.has_changed().unwrap_or(false));
    assert_eq!(*changes.borrow_and_update(), SessionState::Recording);
}
