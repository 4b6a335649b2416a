//! Public relay state and fault classification.
//!
//! The state machine tracks eight internal states; callers only see a
//! coarse view of them:
//!
//! | machine state           | [`RelayState`] | [`RelayFault`]   |
//! |-------------------------|----------------|------------------|
//! | `Uninit`, `ShuttingDown`| `Uninit`       | `None`           |
//! | `Open`                  | `Open`         | `None`           |
//! | `OpenToClose`           | `Open`         | `None`           |
//! | `LatchedConstantlyOpen` | `Open`         | `ConstantlyOpen` |
//! | `Closed`                | `Closed`       | `None`           |
//! | `CloseToOpen`           | `Closed`       | `None`           |
//! | `LatchedWelded`         | `Closed`       | `Welded`         |
//!
//! Transitional states report the side they are leaving, and each latched
//! fault reports the side the contact is stuck on.
//!
//! ## Fault kinds
//!
//! - **ConstantlyOpen**: the contact never reached the closed position
//!   within its response window, or a settled-closed relay was later seen
//!   open.
//! - **Welded**: the contact was seen closed while it should be open, either
//!   at rest or after an open command's response window.
//!
//! Both are latched: only a deinit clears them.

use core::fmt;

use crate::fsm::StateId;

/// Coarse relay position reported to callers and state listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayState {
    Uninit,
    Open,
    Closed,
}

/// Latched hardware fault reported to callers and fault listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayFault {
    None,
    Welded,
    ConstantlyOpen,
}

impl RelayState {
    pub fn of(state: StateId) -> Self {
        match state {
            StateId::Uninit | StateId::ShuttingDown => Self::Uninit,
            StateId::Open | StateId::OpenToClose | StateId::LatchedConstantlyOpen => Self::Open,
            StateId::Closed | StateId::CloseToOpen | StateId::LatchedWelded => Self::Closed,
        }
    }
}

impl RelayFault {
    pub fn of(state: StateId) -> Self {
        match state {
            StateId::LatchedConstantlyOpen => Self::ConstantlyOpen,
            StateId::LatchedWelded => Self::Welded,
            StateId::Uninit
            | StateId::Open
            | StateId::OpenToClose
            | StateId::Closed
            | StateId::CloseToOpen
            | StateId::ShuttingDown => Self::None,
        }
    }

    pub fn is_fault(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninit => write!(f, "uninit"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl fmt::Display for RelayFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Welded => write!(f, "welded"),
            Self::ConstantlyOpen => write!(f, "constantly open"),
        }
    }
}
