//! Per-relay record and the context threaded through every state handler.
//!
//! `RelayRecord` is the mutable half of a relay and is owned by the driver.
//! `RelayContext` borrows one record together with that relay's
//! configuration and the shared I/O and clock ports for the length of a
//! single engine step.

use crate::app::driver::RelayId;
use crate::app::listeners::{FaultListener, ListenerList, StateListener};
use crate::app::ports::{PinState, RelayIo, TickSource, Ticks};
use crate::config::{
    MAX_FAULT_LISTENERS_PER_RELAY, MAX_STATE_LISTENERS_PER_RELAY, RelayConfig, RelayKind,
};
use crate::fsm::StateId;
use crate::safety::{RelayFault, RelayState};

// ---------------------------------------------------------------------------
// Relay record
// ---------------------------------------------------------------------------

/// Mutable state of one relay.
pub struct RelayRecord {
    pub state: StateId,
    /// Tick at which the last switch command was issued.  Only meaningful
    /// in the transitional states.
    pub switch_started_at: Ticks,
    /// A confirmed position change awaits delivery to state listeners.
    pub pending_state_notice: bool,
    /// A latched fault awaits delivery to fault listeners.
    pub pending_fault_notice: bool,
    pub state_listeners: ListenerList<dyn StateListener, MAX_STATE_LISTENERS_PER_RELAY>,
    pub fault_listeners: ListenerList<dyn FaultListener, MAX_FAULT_LISTENERS_PER_RELAY>,
}

impl RelayRecord {
    /// Fresh record in the relay's de-energised resting state.  No hardware
    /// command is issued.
    pub fn resting(kind: RelayKind) -> Self {
        Self {
            state: resting_state(kind),
            switch_started_at: 0,
            pending_state_notice: false,
            pending_fault_notice: false,
            state_listeners: ListenerList::new(),
            fault_listeners: ListenerList::new(),
        }
    }
}

/// Machine state a relay of `kind` rests in with its coil de-energised.
pub fn resting_state(kind: RelayKind) -> StateId {
    match kind {
        RelayKind::NormallyOpen => StateId::Open,
        RelayKind::NormallyClosed => StateId::Closed,
    }
}

// ---------------------------------------------------------------------------
// Step context
// ---------------------------------------------------------------------------

/// Everything a state handler may read or touch during one step.
pub struct RelayContext<'a> {
    pub id: RelayId,
    pub config: &'a RelayConfig,
    pub record: &'a mut RelayRecord,
    pub io: &'a mut dyn RelayIo,
    pub clock: &'a dyn TickSource,
}

impl RelayContext<'_> {
    /// Drive the coil so the contact closes.
    pub fn command_close(&mut self) {
        let level = match self.config.kind {
            RelayKind::NormallyOpen => PinState::High,
            RelayKind::NormallyClosed => PinState::Low,
        };
        self.io.write(self.config.control_line, level);
    }

    /// Drive the coil so the contact opens.
    pub fn command_open(&mut self) {
        let level = match self.config.kind {
            RelayKind::NormallyOpen => PinState::Low,
            RelayKind::NormallyClosed => PinState::High,
        };
        self.io.write(self.config.control_line, level);
    }

    /// Drive the coil to the relay's de-energised resting position.
    pub fn command_rest(&mut self) {
        match self.config.kind {
            RelayKind::NormallyOpen => self.command_open(),
            RelayKind::NormallyClosed => self.command_close(),
        }
    }

    /// Sample the feedback line.  `None` when no feedback is wired.
    pub fn feedback_closed(&mut self) -> Option<bool> {
        self.config
            .feedback_line
            .map(|line| self.io.read(line) == PinState::High)
    }

    /// Record the start of a switch at the current tick.
    pub fn start_switch(&mut self) {
        self.record.switch_started_at = self.clock.ticks();
    }

    /// Whether the response window of the current switch has elapsed.
    pub fn response_elapsed(&self) -> bool {
        let now = self.clock.ticks();
        now.saturating_sub(self.record.switch_started_at) >= self.config.response_ticks
    }

    /// Deliver a pending state notice raised by an earlier step.
    pub fn flush_state_notice(&mut self, state: RelayState) {
        if self.record.pending_state_notice {
            self.record.pending_state_notice = false;
            self.record.state_listeners.notify(self.id, state);
        }
    }

    /// Deliver a pending fault notice raised by an earlier step.
    pub fn flush_fault_notice(&mut self, fault: RelayFault) {
        if self.record.pending_fault_notice {
            self.record.pending_fault_notice = false;
            self.record.fault_listeners.notify(self.id, fault);
        }
    }
}
