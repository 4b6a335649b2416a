//! Log-based listener adapter.
//!
//! Implements both listener traits by writing every notice to the `log`
//! facade.  Register the shared [`LOG_LISTENER`] on any relay.

use log::{error, info};

use crate::app::driver::RelayId;
use crate::app::listeners::{FaultListener, StateListener};
use crate::safety::{RelayFault, RelayState};

/// Listener that logs every state and fault notice.
pub struct LogListener;

/// Ready-made `'static` instance for registration.
pub static LOG_LISTENER: LogListener = LogListener;

impl StateListener for LogListener {
    fn on_state(&self, relay: RelayId, state: RelayState) {
        info!("STATE | relay {} -> {}", relay, state);
    }
}

impl FaultListener for LogListener {
    fn on_fault(&self, relay: RelayId, fault: RelayFault) {
        error!("FAULT | relay {}: {}", relay, fault);
    }
}
