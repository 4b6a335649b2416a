//! Table-driven per-relay state machine.
//!
//! Two tables drive every step:
//!
//! ```text
//! ┌──────────────────────────────────────┐   ┌──────────────────────────────────────┐
//! │  StateTable (one row per StateId)    │   │  TRANSITIONS                         │
//! │  ┌──────────────┬──────────────────┐ │   │  (state, Outcome) ─────▶ next state  │
//! │  │ StateId      │ on_event         │ │   │                                      │
//! │  ├──────────────┼──────────────────┤ │   │  Open        · Ok    ─▶ OpenToClose  │
//! │  │ Open         │ fn(ctx, ev)->Out │ │──▶│  OpenToClose · Ok    ─▶ Closed       │
//! │  │ OpenToClose  │ fn(ctx, ev)->Out │ │   │  OpenToClose · Fault ─▶ Latched...   │
//! │  │ ...          │ ...              │ │   │  ...                                 │
//! │  └──────────────┴──────────────────┘ │   │  no row ⇒ stay                       │
//! └──────────────────────────────────────┘   └──────────────────────────────────────┘
//! ```
//!
//! The handler decides *what happened* (an [`Outcome`]); the transition
//! table decides *which state that implies*.  Handlers issue hardware
//! writes and raise deferred notices through the [`RelayContext`]; a notice
//! raised in one step is delivered at the start of the next step for the
//! same relay, never in the step that raised it.

pub mod context;
pub mod states;

use context::RelayContext;
use log::debug;

// ---------------------------------------------------------------------------
// State, event and outcome identity
// ---------------------------------------------------------------------------

/// Every state a relay record can be in.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Uninit = 0,
    Open = 1,
    /// Close commanded, waiting out the response window.
    OpenToClose = 2,
    Closed = 3,
    /// Open commanded, waiting out the response window.
    CloseToOpen = 4,
    LatchedConstantlyOpen = 5,
    LatchedWelded = 6,
    /// Transient: drives the fail-safe output, then resolves to `Uninit`.
    ShuttingDown = 7,
}

impl StateId {
    /// Total number of states, the size of the handler table.
    pub const COUNT: usize = 8;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Uninit` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Uninit,
            1 => Self::Open,
            2 => Self::OpenToClose,
            3 => Self::Closed,
            4 => Self::CloseToOpen,
            5 => Self::LatchedConstantlyOpen,
            6 => Self::LatchedWelded,
            7 => Self::ShuttingDown,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Uninit
            }
        }
    }

    pub fn is_transitional(self) -> bool {
        matches!(self, Self::OpenToClose | Self::CloseToOpen)
    }

    pub fn is_latched(self) -> bool {
        matches!(self, Self::LatchedConstantlyOpen | Self::LatchedWelded)
    }
}

/// Events delivered to a relay's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    RequestOpen,
    RequestClose,
    SelfCheck,
    Shutdown,
}

/// What a state handler reports back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoTransition,
    Ok,
    Fault,
    ShuttingDown,
}

// ---------------------------------------------------------------------------
// Handler table
// ---------------------------------------------------------------------------

/// Signature of a state's event handler.
pub type StateEventFn = fn(&mut RelayContext<'_>, Event) -> Outcome;

/// Static descriptor for a single state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_event: StateEventFn,
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: StateId,
    pub outcome: Outcome,
    pub to: StateId,
}

const fn row(from: StateId, outcome: Outcome, to: StateId) -> Transition {
    Transition { from, outcome, to }
}

/// `(state, outcome) → next state`.  Pairs without a row leave the state
/// unchanged.
pub const TRANSITIONS: [Transition; 15] = [
    row(StateId::Open, Outcome::Ok, StateId::OpenToClose),
    row(StateId::Open, Outcome::Fault, StateId::LatchedWelded),
    row(StateId::Open, Outcome::ShuttingDown, StateId::ShuttingDown),
    row(StateId::OpenToClose, Outcome::Ok, StateId::Closed),
    row(StateId::OpenToClose, Outcome::Fault, StateId::LatchedConstantlyOpen),
    row(StateId::OpenToClose, Outcome::ShuttingDown, StateId::ShuttingDown),
    row(StateId::Closed, Outcome::Ok, StateId::CloseToOpen),
    row(StateId::Closed, Outcome::Fault, StateId::LatchedConstantlyOpen),
    row(StateId::Closed, Outcome::ShuttingDown, StateId::ShuttingDown),
    row(StateId::CloseToOpen, Outcome::Ok, StateId::Open),
    row(StateId::CloseToOpen, Outcome::Fault, StateId::LatchedWelded),
    row(StateId::CloseToOpen, Outcome::ShuttingDown, StateId::ShuttingDown),
    // Latched faults are left only through shutdown.
    row(StateId::LatchedConstantlyOpen, Outcome::ShuttingDown, StateId::ShuttingDown),
    row(StateId::LatchedWelded, Outcome::ShuttingDown, StateId::ShuttingDown),
    row(StateId::ShuttingDown, Outcome::Ok, StateId::Uninit),
];

/// Resolve the next state for a handler outcome.
pub fn next_state(current: StateId, outcome: Outcome) -> StateId {
    TRANSITIONS
        .iter()
        .find(|t| t.from == current && t.outcome == outcome)
        .map_or(current, |t| t.to)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The state machine engine.  Stateless apart from its handler table;
/// all per-relay state lives in the [`RelayContext`] it is handed.
pub struct Engine {
    table: [StateDescriptor; StateId::COUNT],
}

impl Engine {
    pub fn new() -> Self {
        Self {
            table: states::build_state_table(),
        }
    }

    /// Deliver one event to one relay: run the current state's handler,
    /// then resolve and store the next state.
    pub fn step(&self, ctx: &mut RelayContext<'_>, event: Event) {
        let current = ctx.record.state;
        let descriptor = &self.table[current as usize];
        let outcome = (descriptor.on_event)(ctx, event);
        let next = next_state(current, outcome);

        if next != current {
            debug!(
                "relay {}: {} -> {} ({:?} on {:?})",
                ctx.id,
                descriptor.name,
                self.table[next as usize].name,
                outcome,
                event
            );
        }

        ctx.record.state = next;
    }

    pub fn state_name(&self, state: StateId) -> &'static str {
        self.table[state as usize].name
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
