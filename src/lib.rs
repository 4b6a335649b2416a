//! Relay supervision library.
//!
//! Drives a fixed set of electromechanical relays through a table-driven
//! state machine, confirms every switch against an optional feedback
//! contact, and latches welded or constantly-open faults until shutdown.
//!
//! Start with [`RelayDriver`] and [`BoardConfig`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod fsm;
pub mod safety;
pub mod scheduler;

mod error;

pub use app::driver::{RelayDriver, RelayId};
pub use app::listeners::{FaultListener, ListenerId, StateListener};
pub use config::{BoardConfig, RelayConfig, RelayKind};
pub use error::{ConfigError, RelayError, Result};
pub use safety::{RelayFault, RelayState};
pub use scheduler::Poller;
