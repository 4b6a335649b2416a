//! Application core: the relay driver and the seams around it.
//!
//! All interaction with hardware and time happens through the **port
//! traits** in [`ports`], so the driver and its state machine are fully
//! testable without real pins.

pub mod driver;
pub mod listeners;
pub mod ports;
