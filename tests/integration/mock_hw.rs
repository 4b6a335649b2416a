//! Mock relay board and recording listeners for integration tests.
//!
//! `MockBoard` records every pin access so tests can assert on the full
//! command history.  Feedback lines never move on their own: tests script
//! them with [`MockBoard::set_feedback`], which is how contact faults are
//! staged.  The board is a cloneable handle; the driver owns one clone and
//! the test keeps another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use relaywatch::adapters::time::ManualClock;
use relaywatch::app::ports::{DigitalInputs, DigitalOutputs, Line, PinState};
use relaywatch::{
    FaultListener, RelayConfig, RelayDriver, RelayFault, RelayId, RelayState, StateListener,
};

// ── Pin access record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Read(Line),
    Write(Line, PinState),
}

#[derive(Default)]
struct BoardState {
    feedback: HashMap<Line, PinState>,
    calls: Vec<PinCall>,
}

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level the next reads of `line` return.  Unset lines read `Low`.
    pub fn set_feedback(&self, line: Line, level: PinState) {
        self.state.lock().unwrap().feedback.insert(line, level);
    }

    pub fn calls(&self) -> Vec<PinCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the output writes, oldest first.
    pub fn writes(&self) -> Vec<(Line, PinState)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PinCall::Write(line, level) => Some((line, level)),
                PinCall::Read(_) => None,
            })
            .collect()
    }

    /// Last level written to `line`, if any.
    pub fn last_write(&self, line: Line) -> Option<PinState> {
        self.writes()
            .into_iter()
            .rev()
            .find_map(|(l, level)| (l == line).then_some(level))
    }

    pub fn clear(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

impl DigitalInputs for MockBoard {
    fn read(&mut self, line: Line) -> PinState {
        let mut s = self.state.lock().unwrap();
        s.calls.push(PinCall::Read(line));
        s.feedback.get(&line).copied().unwrap_or(PinState::Low)
    }
}

impl DigitalOutputs for MockBoard {
    fn write(&mut self, line: Line, level: PinState) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(PinCall::Write(line, level));
    }
}

// ── Recording listeners ───────────────────────────────────────

/// Listener that remembers every notice it receives.
#[derive(Default)]
pub struct Recorder {
    states: Mutex<Vec<(RelayId, RelayState)>>,
    faults: Mutex<Vec<(RelayId, RelayFault)>>,
}

#[allow(dead_code)]
impl Recorder {
    /// A fresh recorder with the `'static` lifetime listeners need.
    pub fn leaked() -> &'static Self {
        Box::leak(Box::default())
    }

    pub fn states(&self) -> Vec<(RelayId, RelayState)> {
        self.states.lock().unwrap().clone()
    }

    pub fn faults(&self) -> Vec<(RelayId, RelayFault)> {
        self.faults.lock().unwrap().clone()
    }
}

impl StateListener for Recorder {
    fn on_state(&self, relay: RelayId, state: RelayState) {
        self.states.lock().unwrap().push((relay, state));
    }
}

impl FaultListener for Recorder {
    fn on_fault(&self, relay: RelayId, fault: RelayFault) {
        self.faults.lock().unwrap().push((relay, fault));
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockDriver = RelayDriver<MockBoard, ManualClock>;

/// Tick at which every rig's clock starts.
pub const T0: u64 = 100;

/// Fresh, initialised driver over a mock board and a manual clock.
#[allow(dead_code)]
pub fn rig(relays: &[RelayConfig]) -> (MockDriver, MockBoard, ManualClock) {
    let board = MockBoard::new();
    let clock = ManualClock::starting_at(T0);
    let driver = RelayDriver::new(board.clone(), clock.clone());
    driver.init(relays).unwrap();
    (driver, board, clock)
}
