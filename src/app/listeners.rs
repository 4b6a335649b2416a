//! Bounded per-relay listener lists.
//!
//! Listeners are `&'static` trait objects, stored in a fixed-capacity
//! `heapless::Vec`: registration never allocates and there is no
//! deregistration.  A listener's id is its position in the list.
//!
//! Listeners run synchronously, on whichever thread delivers the event,
//! while the driver lock is held.  A listener must not call back into the
//! driver that notified it.

use heapless::Vec;

use crate::app::driver::RelayId;
use crate::error::RelayError;
use crate::safety::{RelayFault, RelayState};

/// Position of a listener within its relay's list.
pub type ListenerId = usize;

/// Observer of confirmed relay position changes.
pub trait StateListener: Sync {
    fn on_state(&self, relay: RelayId, state: RelayState);
}

/// Observer of latched relay faults.
pub trait FaultListener: Sync {
    fn on_fault(&self, relay: RelayId, fault: RelayFault);
}

impl<F: Fn(RelayId, RelayState) + Sync> StateListener for F {
    fn on_state(&self, relay: RelayId, state: RelayState) {
        self(relay, state);
    }
}

impl<F: Fn(RelayId, RelayFault) + Sync> FaultListener for F {
    fn on_fault(&self, relay: RelayId, fault: RelayFault) {
        self(relay, fault);
    }
}

/// Fixed-capacity list of listeners, invoked in registration order.
pub struct ListenerList<L: ?Sized + 'static, const N: usize> {
    entries: Vec<&'static L, N>,
}

impl<L: ?Sized + 'static, const N: usize> ListenerList<L, N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a listener.  Fails without side effects once the list is full.
    pub fn add(&mut self, listener: &'static L) -> Result<ListenerId, RelayError> {
        let id = self.entries.len();
        self.entries
            .push(listener)
            .map_err(|_| RelayError::ListenerCapacity)?;
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static L> + '_ {
        self.entries.iter().copied()
    }
}

impl<L: ?Sized + 'static, const N: usize> Default for ListenerList<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ListenerList<dyn StateListener, N> {
    pub fn notify(&self, relay: RelayId, state: RelayState) {
        for l in self.iter() {
            l.on_state(relay, state);
        }
    }
}

impl<const N: usize> ListenerList<dyn FaultListener, N> {
    pub fn notify(&self, relay: RelayId, fault: RelayFault) {
        for l in self.iter() {
            l.on_fault(relay, fault);
        }
    }
}
