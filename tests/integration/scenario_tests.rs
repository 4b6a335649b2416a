//! Switching and fault scenarios, driven tick by tick.

use relaywatch::app::ports::PinState;
use relaywatch::fsm::StateId;
use relaywatch::{RelayConfig, RelayFault, RelayKind, RelayState};

use crate::mock_hw::{PinCall, Recorder, rig};

const DO0: u8 = 0;
const DI0: u8 = 0;

fn no_with_feedback() -> RelayConfig {
    RelayConfig::new(RelayKind::NormallyOpen, DO0, Some(DI0), 10)
}

fn nc_with_feedback() -> RelayConfig {
    RelayConfig::new(RelayKind::NormallyClosed, DO0, Some(DI0), 5)
}

// ── Successful close ──────────────────────────────────────────

#[test]
fn close_confirmed_by_feedback() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    let rec = Recorder::leaked();
    driver.add_state_listener(0, rec).unwrap();

    driver.request_close(0).unwrap();
    assert_eq!(driver.machine_state(0), Ok(StateId::OpenToClose));
    assert_eq!(board.writes(), vec![(DO0, PinState::High)]);

    for _ in 1..10 {
        clock.advance(1);
        driver.self_check_tick();
        assert_eq!(driver.machine_state(0), Ok(StateId::OpenToClose));
    }

    board.set_feedback(DI0, PinState::High);
    clock.advance(1);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::Closed));
    assert_eq!(driver.get_state(0), RelayState::Closed);
    // Delivered on the step after the one that confirmed the switch.
    assert!(rec.states().is_empty());

    driver.self_check_tick();
    assert_eq!(rec.states(), vec![(0, RelayState::Closed)]);

    for _ in 0..5 {
        driver.self_check_tick();
    }
    assert_eq!(rec.states().len(), 1);
    assert_eq!(driver.get_fault(0), RelayFault::None);
}

#[test]
fn waiting_relay_does_not_sample_feedback() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    driver.request_close(0).unwrap();
    board.clear();

    clock.advance(9);
    driver.self_check_tick();
    assert!(board.calls().is_empty());

    clock.advance(1);
    driver.self_check_tick();
    assert_eq!(board.calls(), vec![PinCall::Read(DI0)]);
}

#[test]
fn pending_notice_is_delivered_by_the_next_request() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    let rec = Recorder::leaked();
    driver.add_state_listener(0, rec).unwrap();

    driver.request_close(0).unwrap();
    board.set_feedback(DI0, PinState::High);
    clock.advance(10);
    driver.self_check_tick();

    driver.request_open(0).unwrap();
    assert_eq!(rec.states(), vec![(0, RelayState::Closed)]);
    assert_eq!(driver.machine_state(0), Ok(StateId::CloseToOpen));
    assert_eq!(board.last_write(DO0), Some(PinState::Low));
}

#[test]
fn full_cycle_reports_both_positions() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    let rec = Recorder::leaked();
    driver.add_state_listener(0, rec).unwrap();

    driver.request_close(0).unwrap();
    board.set_feedback(DI0, PinState::High);
    clock.advance(10);
    driver.self_check_tick();
    driver.self_check_tick();

    driver.request_open(0).unwrap();
    board.set_feedback(DI0, PinState::Low);
    clock.advance(10);
    driver.self_check_tick();
    driver.self_check_tick();

    assert_eq!(driver.machine_state(0), Ok(StateId::Open));
    assert_eq!(
        rec.states(),
        vec![(0, RelayState::Closed), (0, RelayState::Open)]
    );
    assert_eq!(
        board.writes(),
        vec![(DO0, PinState::High), (DO0, PinState::Low)]
    );
}

// ── Constantly-open fault ─────────────────────────────────────

#[test]
fn close_never_confirmed_latches_constantly_open() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    let rec = Recorder::leaked();
    driver.add_state_listener(0, rec).unwrap();
    driver.add_fault_listener(0, rec).unwrap();

    driver.request_close(0).unwrap();
    clock.advance(10);
    driver.self_check_tick();

    assert_eq!(driver.machine_state(0), Ok(StateId::LatchedConstantlyOpen));
    assert_eq!(driver.get_fault(0), RelayFault::ConstantlyOpen);
    assert_eq!(driver.get_state(0), RelayState::Open);
    assert!(rec.faults().is_empty());

    driver.self_check_tick();
    assert_eq!(rec.faults(), vec![(0, RelayFault::ConstantlyOpen)]);

    board.clear();
    assert_eq!(driver.request_open(0), Ok(()));
    assert_eq!(driver.request_close(0), Ok(()));
    board.set_feedback(DI0, PinState::High);
    clock.advance(100);
    driver.self_check_tick();

    assert_eq!(driver.machine_state(0), Ok(StateId::LatchedConstantlyOpen));
    assert!(board.writes().is_empty());
    assert_eq!(rec.faults().len(), 1);
    assert!(rec.states().is_empty());
}

#[test]
fn closed_relay_reading_open_latches_constantly_open() {
    let (driver, board, clock) = rig(&[no_with_feedback()]);
    driver.request_close(0).unwrap();
    board.set_feedback(DI0, PinState::High);
    clock.advance(10);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::Closed));

    board.set_feedback(DI0, PinState::Low);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::LatchedConstantlyOpen));
    assert_eq!(driver.get_fault(0), RelayFault::ConstantlyOpen);
}

// ── No feedback wired ─────────────────────────────────────────

#[test]
fn relay_without_feedback_never_faults() {
    let cfg = RelayConfig::new(RelayKind::NormallyOpen, 2, None, 10);
    let (driver, board, clock) = rig(&[cfg]);
    // A stray level on the line it would have used changes nothing.
    board.set_feedback(DI0, PinState::High);

    for _ in 0..3 {
        driver.request_close(0).unwrap();
        clock.advance(10);
        driver.self_check_tick();
        assert_eq!(driver.machine_state(0), Ok(StateId::Closed));

        driver.request_open(0).unwrap();
        clock.advance(10);
        driver.self_check_tick();
        assert_eq!(driver.machine_state(0), Ok(StateId::Open));
        assert_eq!(driver.get_fault(0), RelayFault::None);
    }

    assert!(
        board
            .calls()
            .iter()
            .all(|c| matches!(c, PinCall::Write(2, _)))
    );
}

#[test]
fn relay_without_feedback_waits_out_its_window() {
    let cfg = RelayConfig::new(RelayKind::NormallyClosed, 3, None, 5);
    let (driver, _, clock) = rig(&[cfg]);

    driver.request_open(0).unwrap();
    clock.advance(4);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::CloseToOpen));

    clock.advance(1);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::Open));
}

// ── Welded ────────────────────────────────────────────────────

#[test]
fn open_relay_reading_closed_latches_welded_at_once() {
    let (driver, board, _) = rig(&[no_with_feedback()]);
    let rec = Recorder::leaked();
    driver.add_fault_listener(0, rec).unwrap();

    board.set_feedback(DI0, PinState::High);
    driver.self_check_tick();

    assert_eq!(driver.machine_state(0), Ok(StateId::LatchedWelded));
    assert_eq!(driver.get_fault(0), RelayFault::Welded);
    assert_eq!(driver.get_state(0), RelayState::Closed);
    assert!(board.writes().is_empty());

    driver.self_check_tick();
    driver.self_check_tick();
    assert_eq!(rec.faults(), vec![(0, RelayFault::Welded)]);
}

#[test]
fn open_never_confirmed_latches_welded() {
    let (driver, board, clock) = rig(&[nc_with_feedback()]);
    board.set_feedback(DI0, PinState::High);

    driver.request_open(0).unwrap();
    assert_eq!(board.writes(), vec![(DO0, PinState::High)]);

    clock.advance(5);
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::LatchedWelded));
    assert_eq!(driver.get_fault(0), RelayFault::Welded);
}

#[test]
fn latched_fault_clears_only_through_deinit() {
    let (driver, board, _) = rig(&[nc_with_feedback()]);
    board.set_feedback(DI0, PinState::Low);
    driver.self_check_tick();
    assert_eq!(driver.get_fault(0), RelayFault::ConstantlyOpen);

    driver.deinit();
    assert_eq!(driver.get_fault(0), RelayFault::None);

    board.set_feedback(DI0, PinState::High);
    driver.init(&[nc_with_feedback()]).unwrap();
    driver.self_check_tick();
    assert_eq!(driver.machine_state(0), Ok(StateId::Closed));
    assert_eq!(driver.get_fault(0), RelayFault::None);
}

// ── Independence ──────────────────────────────────────────────

#[test]
fn faults_stay_on_their_own_relay() {
    let relays = [
        RelayConfig::new(RelayKind::NormallyOpen, 0, Some(0), 10),
        RelayConfig::new(RelayKind::NormallyClosed, 1, Some(1), 5),
    ];
    let (driver, board, _) = rig(&relays);
    let rec = Recorder::leaked();
    driver.add_fault_listener(0, rec).unwrap();
    driver.add_fault_listener(1, rec).unwrap();

    board.set_feedback(0, PinState::High);
    board.set_feedback(1, PinState::High);
    driver.self_check_tick();
    driver.self_check_tick();

    assert_eq!(driver.get_fault(0), RelayFault::Welded);
    assert_eq!(driver.get_fault(1), RelayFault::None);
    assert_eq!(driver.machine_state(1), Ok(StateId::Closed));
    assert_eq!(rec.faults(), vec![(0, RelayFault::Welded)]);
}
