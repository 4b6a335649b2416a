//! Simulated relay board.
//!
//! Stands in for real coils and contacts on the host.  Every relay with a
//! wired feedback line gets a simulated contact whose feedback follows the
//! coil output according to the board's [`SimMode`]:
//!
//! - **Correct**: contacts behave: NO closes when energised, NC opens when
//!   energised.
//! - **Wrong**: every contact reports the opposite of what it should, the
//!   way a welded or dead relay would.
//!
//! Feedback lines are seeded to the resting position (or its opposite in
//! `Wrong` mode).  Tests can override a feedback line at any time with
//! [`force_feedback`](SimulatedBoard::force_feedback); the override holds
//! until the next write to that relay's coil.
//!
//! The board is a cheap cloneable handle, so a test can keep one clone
//! while the driver owns another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::Vec;
use log::debug;

use crate::app::ports::{DigitalInputs, DigitalOutputs, Line, PinState};
use crate::config::{LINE_COUNT, MAX_RELAYS, RelayConfig, RelayKind};

/// How simulated contacts respond to their coil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    Correct,
    Wrong,
}

struct SimState {
    mode: SimMode,
    relays: Vec<RelayConfig, MAX_RELAYS>,
    inputs: [PinState; LINE_COUNT as usize],
    outputs: [PinState; LINE_COUNT as usize],
    writes: std::vec::Vec<(Line, PinState)>,
}

/// Shared handle to a simulated board.
#[derive(Clone)]
pub struct SimulatedBoard {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedBoard {
    /// Build a board for `relays`.  Relays beyond the driver capacity are
    /// not simulated.
    pub fn new(mode: SimMode, relays: &[RelayConfig]) -> Self {
        let mut state = SimState {
            mode,
            relays: Vec::new(),
            inputs: [PinState::Low; LINE_COUNT as usize],
            outputs: [PinState::Low; LINE_COUNT as usize],
            writes: std::vec::Vec::new(),
        };

        for c in relays.iter().take(MAX_RELAYS) {
            let _ = state.relays.push(*c);
            if let Some(line) = c.feedback_line {
                let resting_closed = c.kind == RelayKind::NormallyClosed;
                set_line(&mut state.inputs, line, contact(mode, resting_closed));
            }
        }

        debug!("sim: board with {} relays in {:?} mode", state.relays.len(), mode);

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Override a feedback line until the next coil write for its relay.
    pub fn force_feedback(&self, line: Line, level: PinState) {
        set_line(&mut self.lock().inputs, line, level);
    }

    /// Switch how contacts respond to subsequent coil writes.
    pub fn set_mode(&self, mode: SimMode) {
        self.lock().mode = mode;
    }

    /// Last level written to an output line.
    pub fn output(&self, line: Line) -> PinState {
        get_line(&self.lock().outputs, line)
    }

    /// Current level of a feedback line.
    pub fn feedback(&self, line: Line) -> PinState {
        get_line(&self.lock().inputs, line)
    }

    /// Every output write so far, oldest first.
    pub fn writes(&self) -> std::vec::Vec<(Line, PinState)> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DigitalInputs for SimulatedBoard {
    fn read(&mut self, line: Line) -> PinState {
        self.feedback(line)
    }
}

impl DigitalOutputs for SimulatedBoard {
    fn write(&mut self, line: Line, level: PinState) {
        let mut s = self.lock();
        set_line(&mut s.outputs, line, level);
        s.writes.push((line, level));

        let energised = level == PinState::High;
        let mode = s.mode;
        let driven: Vec<(Line, PinState), MAX_RELAYS> = s
            .relays
            .iter()
            .filter(|c| c.control_line == line)
            .filter_map(|c| {
                let feedback = c.feedback_line?;
                let closed = match c.kind {
                    RelayKind::NormallyOpen => energised,
                    RelayKind::NormallyClosed => !energised,
                };
                Some((feedback, contact(mode, closed)))
            })
            .collect();

        for (feedback, state) in driven {
            set_line(&mut s.inputs, feedback, state);
        }
    }
}

/// Feedback level of a contact that should be `closed`.
fn contact(mode: SimMode, closed: bool) -> PinState {
    let reads_closed = match mode {
        SimMode::Correct => closed,
        SimMode::Wrong => !closed,
    };
    PinState::from(reads_closed)
}

fn set_line(bank: &mut [PinState], line: Line, level: PinState) {
    if let Some(slot) = bank.get_mut(line as usize) {
        *slot = level;
    }
}

fn get_line(bank: &[PinState], line: Line) -> PinState {
    bank.get(line as usize).copied().unwrap_or(PinState::Low)
}
