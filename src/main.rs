//! relaywatch demo: drives a simulated four-relay board.
//!
//! ```text
//! relaywatch [--wrong] [BOARD.json]
//! ```
//!
//! Walks the driver through its whole lifecycle against a
//! [`SimulatedBoard`]: rejections before init, listener registration up to
//! capacity, resting-state checks, an open and a close of every relay, and
//! a final deinit that stops the poll thread.  With `--wrong` the simulated
//! contacts report the opposite of their coil, so the self-check latches
//! faults and the fault listeners fire.
//!
//! Set `RUST_LOG=debug` to see every state transition.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};

use relaywatch::adapters::log_sink::LOG_LISTENER;
use relaywatch::adapters::sim::{SimMode, SimulatedBoard};
use relaywatch::adapters::time::MonotonicClock;
use relaywatch::config::{MAX_FAULT_LISTENERS_PER_RELAY, MAX_STATE_LISTENERS_PER_RELAY};
use relaywatch::{
    BoardConfig, Poller, RelayDriver, RelayFault, RelayId, RelayKind, RelayState,
};

type Driver = RelayDriver<SimulatedBoard, MonotonicClock>;

/// Time given to relays to pass their response window and be re-checked.
const SETTLE: Duration = Duration::from_secs(1);

// ── Listeners ─────────────────────────────────────────────────

fn on_state_changed(relay: RelayId, state: RelayState) {
    info!("on_state_changed(relay: {}, state: {})", relay, state);
}

fn on_fault(relay: RelayId, fault: RelayFault) {
    error!("on_fault(relay: {}, fault: {})", relay, fault);
}

// ── Entry point ───────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut mode = SimMode::Correct;
    let mut board_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--wrong" => mode = SimMode::Wrong,
            _ => board_path = Some(arg),
        }
    }

    let board = match board_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading board config {path}"))?;
            BoardConfig::from_json(&text).with_context(|| format!("parsing board config {path}"))?
        }
        None => BoardConfig::default(),
    };

    info!("relaywatch demo: {} relays, {:?} contacts", board.relays.len(), mode);

    let sim = SimulatedBoard::new(mode, &board.relays);
    let driver: Arc<Driver> = Arc::new(RelayDriver::new(sim, MonotonicClock::new()));

    report("not_init_test", not_init_test(&driver, &board));

    driver.init(&board.relays).context("initialising relay driver")?;

    report("add_listeners_test", add_listeners_test(&driver, &board));

    let poller = Poller::spawn(
        driver.clone(),
        Duration::from_millis(u64::from(board.poll_interval_ms)),
    )
    .context("starting poll thread")?;

    report("get_state_test", get_state_test(&driver, &board));
    report("get_fault_test", get_fault_test(&driver, &board));

    // With wrong contacts the self-check now has had time to latch faults.
    thread::sleep(SETTLE);
    report("get_state_test", get_state_test(&driver, &board));
    report("get_fault_test", get_fault_test(&driver, &board));

    report("open_test", open_test(&driver, &board));
    thread::sleep(SETTLE);
    report("close_test", close_test(&driver, &board));
    thread::sleep(SETTLE);

    driver.deinit();

    report("not_init_test", not_init_test(&driver, &board));

    let polls = poller.join();
    info!("relaywatch demo: done after {} self-checks", polls);
    Ok(())
}

fn report(name: &str, passed: bool) {
    if passed {
        info!("  PASSED: {}()", name);
    } else {
        error!("  FAILED: {}()", name);
    }
}

fn relay_ids(board: &BoardConfig) -> impl Iterator<Item = RelayId> {
    0..board.relays.len()
}

// ── Checks ────────────────────────────────────────────────────

/// Every call is rejected, or answers "no information", before init.
fn not_init_test(driver: &Driver, board: &BoardConfig) -> bool {
    if driver.is_initialized() {
        return false;
    }
    relay_ids(board).all(|id| {
        driver.request_open(id).is_err()
            && driver.request_close(id).is_err()
            && driver.get_state(id) == RelayState::Uninit
            && driver.add_state_listener(id, &on_state_changed).is_err()
            && driver.add_fault_listener(id, &on_fault).is_err()
    })
}

/// Listener lists fill to capacity, then refuse.
fn add_listeners_test(driver: &Driver, board: &BoardConfig) -> bool {
    relay_ids(board).all(|id| {
        let states_fit = driver.add_state_listener(id, &LOG_LISTENER).is_ok()
            && (1..MAX_STATE_LISTENERS_PER_RELAY)
                .all(|_| driver.add_state_listener(id, &on_state_changed).is_ok());
        let faults_fit = driver.add_fault_listener(id, &LOG_LISTENER).is_ok()
            && (1..MAX_FAULT_LISTENERS_PER_RELAY)
                .all(|_| driver.add_fault_listener(id, &on_fault).is_ok());

        states_fit
            && faults_fit
            && driver.add_state_listener(id, &on_state_changed).is_err()
            && driver.add_fault_listener(id, &on_fault).is_err()
    })
}

/// Every relay sits in its resting position.
fn get_state_test(driver: &Driver, board: &BoardConfig) -> bool {
    board.relays.iter().enumerate().all(|(id, c)| {
        let resting = match c.kind {
            RelayKind::NormallyOpen => RelayState::Open,
            RelayKind::NormallyClosed => RelayState::Closed,
        };
        driver.get_state(id) == resting
    })
}

fn get_fault_test(driver: &Driver, board: &BoardConfig) -> bool {
    relay_ids(board).all(|id| driver.get_fault(id) == RelayFault::None)
}

fn open_test(driver: &Driver, board: &BoardConfig) -> bool {
    relay_ids(board).all(|id| driver.request_open(id).is_ok())
}

fn close_test(driver: &Driver, board: &BoardConfig) -> bool {
    relay_ids(board).all(|id| driver.request_close(id).is_ok())
}
