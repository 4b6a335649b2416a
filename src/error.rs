//! Error types for the relay driver.
//!
//! Two categories exist and they never mix:
//!
//! - **Operational rejections** ([`RelayError`]) are returned synchronously
//!   to the caller.  No relay state is touched when one is returned.
//! - **Hardware faults** ([`RelayFault`](crate::safety::RelayFault)) are
//!   latched inside the state machine and reported through fault listeners
//!   and [`get_fault`](crate::app::driver::RelayDriver::get_fault).  They are
//!   never an `Err`, because the self-check that detects them has no caller
//!   to fail.
//!
//! All variants are `Copy` so they pass through the driver without
//! allocation.

use core::fmt;

use crate::app::ports::Line;

// ---------------------------------------------------------------------------
// Driver errors
// ---------------------------------------------------------------------------

/// Every rejected driver call funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The driver has not been initialised (or has been deinitialised).
    NotInitialized,
    /// `init` was called on a driver that is already initialised.
    AlreadyInitialized,
    /// The relay id is outside `0..relay_count`.
    InvalidRelay(usize),
    /// The per-relay listener list is full.
    ListenerCapacity,
    /// The supplied configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "relay driver not initialised"),
            Self::AlreadyInitialized => write!(f, "relay driver already initialised"),
            Self::InvalidRelay(id) => write!(f, "invalid relay id {id}"),
            Self::ListenerCapacity => write!(f, "listener capacity exhausted"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for RelayError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No relays were configured.
    Empty,
    /// More relays than the driver has record slots for.
    TooManyRelays { given: usize, max: usize },
    /// A control or feedback line is outside the I/O bank.
    LineOutOfRange { relay: usize, line: Line },
    /// Two relays drive the same output line.
    DuplicateControlLine { line: Line },
    /// The serialised configuration could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no relays configured"),
            Self::TooManyRelays { given, max } => {
                write!(f, "{given} relays configured, at most {max} supported")
            }
            Self::LineOutOfRange { relay, line } => {
                write!(f, "relay {relay} uses line {line}, outside the I/O bank")
            }
            Self::DuplicateControlLine { line } => {
                write!(f, "control line {line} assigned to more than one relay")
            }
            Self::Malformed => write!(f, "malformed configuration"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for RelayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, RelayError>;
