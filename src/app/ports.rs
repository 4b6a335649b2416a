//! Port traits: the boundary between the relay engine and the outside world.
//!
//! ```text
//!   DigitalInputs ──▶ ┌──────────────┐ ──▶ DigitalOutputs
//!                     │  RelayDriver │
//!     TickSource ───▶ └──────────────┘ ◀── Poller (PollRoutine)
//! ```
//!
//! Adapters (the simulated board, an embedded-hal pin bank, real
//! firmware I/O) implement these traits.  The driver consumes them through
//! generics, so the engine never touches hardware directly.
//!
//! Line polarity:
//!
//! - a feedback line reading [`PinState::High`] means the contact is closed;
//! - an output line driven [`PinState::High`] means the coil is energised.

pub use embedded_hal::digital::PinState;

/// Identifier of one digital input or output line.
pub type Line = u8;

/// Monotonic tick count.  64 bits wide so that it never wraps within the
/// lifetime of a pending response timeout.
pub type Ticks = u64;

// ───────────────────────────────────────────────────────────────
// Digital I/O ports
// ───────────────────────────────────────────────────────────────

/// Read side: sample a feedback line.  No side effects.
pub trait DigitalInputs {
    fn read(&mut self, line: Line) -> PinState;
}

/// Write side: drive a coil line.  Fire-and-forget.
pub trait DigitalOutputs {
    fn write(&mut self, line: Line, state: PinState);
}

/// Both halves of the relay I/O.  Blanket-implemented.
pub trait RelayIo: DigitalInputs + DigitalOutputs {}

impl<T: DigitalInputs + DigitalOutputs + ?Sized> RelayIo for T {}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonically non-decreasing tick counter.
pub trait TickSource {
    fn ticks(&self) -> Ticks;
}

// ───────────────────────────────────────────────────────────────
// Poll routine (driven by the scheduler)
// ───────────────────────────────────────────────────────────────

/// Result of one poll of a [`PollRoutine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// More work remains; poll again after the interval.
    Active,
    /// Nothing to do; the poller stops.
    Idle,
}

/// A routine the [`Poller`](crate::scheduler::Poller) invokes repeatedly
/// on its worker thread.
pub trait PollRoutine {
    fn poll(&self) -> PollState;
}
