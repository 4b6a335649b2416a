//! Concrete state handler functions and table builder.
//!
//! Each state is one plain `fn` pointer with no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!            ┌──[close req]──▶ OPEN→CLOSE ──[confirmed]──▶ CLOSED ─┐
//!   OPEN ◀───┼────────────────────────────────────────────────────┘ │
//!     ▲      │                      │ [still open]          [open req]
//!     │      │                      ▼                               ▼
//!     │      │         LATCHED_CONST_OPEN ◀──[reads open]── CLOSE→OPEN
//!     │      │                                                      │
//!     └──────┴──────────────[confirmed]─────────────────────────────┘
//!
//!   OPEN ──[reads closed]──▶ LATCHED_WELDED ◀──[still closed]── CLOSE→OPEN
//!
//!   any initialised state ──[shutdown]──▶ SHUTTING_DOWN ──▶ UNINIT
//! ```
//!
//! Every handler that owns a notice first delivers whatever an *earlier*
//! step left pending, then reacts to the event.

use super::context::RelayContext;
use super::{Event, Outcome, StateDescriptor, StateId};
use crate::safety::{RelayFault, RelayState};
use log::error;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per engine.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Uninit
        StateDescriptor {
            id: StateId::Uninit,
            name: "Uninit",
            on_event: uninit_event,
        },
        // Index 1: Open
        StateDescriptor {
            id: StateId::Open,
            name: "Open",
            on_event: open_event,
        },
        // Index 2: OpenToClose
        StateDescriptor {
            id: StateId::OpenToClose,
            name: "OpenToClose",
            on_event: open_to_close_event,
        },
        // Index 3: Closed
        StateDescriptor {
            id: StateId::Closed,
            name: "Closed",
            on_event: closed_event,
        },
        // Index 4: CloseToOpen
        StateDescriptor {
            id: StateId::CloseToOpen,
            name: "CloseToOpen",
            on_event: close_to_open_event,
        },
        // Index 5: LatchedConstantlyOpen
        StateDescriptor {
            id: StateId::LatchedConstantlyOpen,
            name: "LatchedConstantlyOpen",
            on_event: latched_constantly_open_event,
        },
        // Index 6: LatchedWelded
        StateDescriptor {
            id: StateId::LatchedWelded,
            name: "LatchedWelded",
            on_event: latched_welded_event,
        },
        // Index 7: ShuttingDown
        StateDescriptor {
            id: StateId::ShuttingDown,
            name: "ShuttingDown",
            on_event: shutting_down_event,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNINIT
// ═══════════════════════════════════════════════════════════════════════════

fn uninit_event(_ctx: &mut RelayContext<'_>, _event: Event) -> Outcome {
    Outcome::NoTransition
}

// ═══════════════════════════════════════════════════════════════════════════
//  Settled states
// ═══════════════════════════════════════════════════════════════════════════

fn open_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    ctx.flush_state_notice(RelayState::Open);

    match event {
        Event::RequestOpen => Outcome::NoTransition,
        Event::RequestClose => {
            ctx.command_close();
            ctx.start_switch();
            Outcome::Ok
        }
        Event::SelfCheck => {
            // Contact closed without being told to.
            if ctx.feedback_closed() == Some(true) {
                ctx.record.pending_fault_notice = true;
                Outcome::Fault
            } else {
                Outcome::NoTransition
            }
        }
        Event::Shutdown => Outcome::ShuttingDown,
    }
}

fn closed_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    ctx.flush_state_notice(RelayState::Closed);

    match event {
        Event::RequestOpen => {
            ctx.command_open();
            ctx.start_switch();
            Outcome::Ok
        }
        Event::RequestClose => Outcome::NoTransition,
        Event::SelfCheck => {
            // Contact dropped open while it should be held closed.
            if ctx.feedback_closed() == Some(false) {
                ctx.record.pending_fault_notice = true;
                Outcome::Fault
            } else {
                Outcome::NoTransition
            }
        }
        Event::Shutdown => Outcome::ShuttingDown,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Transitional states: waiting out the response window
// ═══════════════════════════════════════════════════════════════════════════

fn open_to_close_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    confirm_switch(ctx, event, true)
}

fn close_to_open_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    confirm_switch(ctx, event, false)
}

/// Shared body of both transitional states.  Once the response window has
/// elapsed, a relay without feedback is assumed to have switched; one with
/// feedback must read `want_closed`.
fn confirm_switch(ctx: &mut RelayContext<'_>, event: Event, want_closed: bool) -> Outcome {
    if event == Event::Shutdown {
        return Outcome::ShuttingDown;
    }

    if !ctx.response_elapsed() {
        return Outcome::NoTransition;
    }

    match ctx.feedback_closed() {
        Some(closed) if closed != want_closed => {
            ctx.record.pending_fault_notice = true;
            Outcome::Fault
        }
        _ => {
            ctx.record.pending_state_notice = true;
            Outcome::Ok
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Latched faults: sticky until shutdown
// ═══════════════════════════════════════════════════════════════════════════

fn latched_constantly_open_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    latched(ctx, event, RelayFault::ConstantlyOpen)
}

fn latched_welded_event(ctx: &mut RelayContext<'_>, event: Event) -> Outcome {
    latched(ctx, event, RelayFault::Welded)
}

fn latched(ctx: &mut RelayContext<'_>, event: Event, fault: RelayFault) -> Outcome {
    if ctx.record.pending_fault_notice {
        error!("relay {}: fault latched: {}", ctx.id, fault);
    }
    ctx.flush_fault_notice(fault);

    if event == Event::Shutdown {
        Outcome::ShuttingDown
    } else {
        Outcome::NoTransition
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SHUTTING_DOWN: force the fail-safe output, then resolve to Uninit
// ═══════════════════════════════════════════════════════════════════════════

fn shutting_down_event(ctx: &mut RelayContext<'_>, _event: Event) -> Outcome {
    ctx.command_rest();
    Outcome::Ok
}
