//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements                     | Connects to               |
//! |------------|--------------------------------|---------------------------|
//! | `hardware` | DigitalInputs, DigitalOutputs  | embedded-hal GPIO pins    |
//! | `sim`      | DigitalInputs, DigitalOutputs  | In-memory relay contacts  |
//! | `time`     | TickSource                     | Host clock / manual ticks |
//! | `log_sink` | StateListener, FaultListener   | `log` output              |

pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
