//! Static relay configuration.
//!
//! A configuration is supplied once, at [`RelayDriver::init`], and never
//! changes afterwards.  Board-level settings (the relay table plus the poll
//! interval) can be loaded from JSON.
//!
//! [`RelayDriver::init`]: crate::app::driver::RelayDriver::init

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::app::ports::{Line, Ticks};
use crate::error::ConfigError;

/// Maximum number of relays a single driver supervises.
pub const MAX_RELAYS: usize = 4;

/// Maximum number of state listeners per relay.
pub const MAX_STATE_LISTENERS_PER_RELAY: usize = 2;

/// Maximum number of fault listeners per relay.
pub const MAX_FAULT_LISTENERS_PER_RELAY: usize = 2;

/// Number of lines in each digital input / output bank.
pub const LINE_COUNT: Line = 16;

/// De-energised resting position of a relay contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayKind {
    /// Contact open while the coil is de-energised.
    NormallyOpen,
    /// Contact closed while the coil is de-energised.
    NormallyClosed,
}

impl RelayKind {
    pub fn short_name(self) -> &'static str {
        match self {
            Self::NormallyOpen => "NO",
            Self::NormallyClosed => "NC",
        }
    }
}

/// Configuration of one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub kind: RelayKind,
    /// Output line driving the coil.
    pub control_line: Line,
    /// Input line sensing the contact, `None` when no feedback is wired.
    pub feedback_line: Option<Line>,
    /// Ticks allowed between a switch command and its confirmation.
    pub response_ticks: Ticks,
}

impl RelayConfig {
    pub const fn new(
        kind: RelayKind,
        control_line: Line,
        feedback_line: Option<Line>,
        response_ticks: Ticks,
    ) -> Self {
        Self {
            kind,
            control_line,
            feedback_line,
            response_ticks,
        }
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_line.is_some()
    }
}

/// Validate a relay table before it is handed to the driver.
pub fn validate(relays: &[RelayConfig]) -> Result<(), ConfigError> {
    if relays.is_empty() {
        return Err(ConfigError::Empty);
    }
    if relays.len() > MAX_RELAYS {
        return Err(ConfigError::TooManyRelays {
            given: relays.len(),
            max: MAX_RELAYS,
        });
    }

    for (relay, c) in relays.iter().enumerate() {
        if c.control_line >= LINE_COUNT {
            return Err(ConfigError::LineOutOfRange {
                relay,
                line: c.control_line,
            });
        }
        if let Some(line) = c.feedback_line.filter(|l| *l >= LINE_COUNT) {
            return Err(ConfigError::LineOutOfRange { relay, line });
        }
        if relays[..relay]
            .iter()
            .any(|other| other.control_line == c.control_line)
        {
            return Err(ConfigError::DuplicateControlLine {
                line: c.control_line,
            });
        }
    }

    Ok(())
}

/// Board-level configuration: the relay table plus poll timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub relays: Vec<RelayConfig, MAX_RELAYS>,
    /// Interval between self-check polls (milliseconds).
    pub poll_interval_ms: u32,
}

impl BoardConfig {
    /// Parse a board description from JSON and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let board: Self = serde_json::from_str(text).map_err(|_| ConfigError::Malformed)?;
        validate(&board.relays)?;
        Ok(board)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        let mut relays = Vec::new();
        for c in [
            RelayConfig::new(RelayKind::NormallyOpen, 0, Some(0), 10),
            RelayConfig::new(RelayKind::NormallyClosed, 1, Some(1), 5),
            RelayConfig::new(RelayKind::NormallyOpen, 2, None, 10),
            RelayConfig::new(RelayKind::NormallyClosed, 3, None, 5),
        ] {
            // Capacity is MAX_RELAYS, which the table never exceeds.
            let _ = relays.push(c);
        }

        Self {
            relays,
            poll_interval_ms: 100,
        }
    }
}
