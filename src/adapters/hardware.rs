//! Hardware adapter: bridges embedded-hal pins to the relay I/O ports.
//!
//! [`PinBank`] owns one `InputPin` per feedback line and one `OutputPin`
//! per coil line, indexed by [`Line`].  This is the only module that
//! touches real pins.  Pin errors never reach the engine: they are logged,
//! and a failed feedback read reports `Low` (contact open).

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{DigitalInputs, DigitalOutputs, Line, PinState};

/// Fixed bank of `NI` input pins and `NO` output pins.
pub struct PinBank<I, O, const NI: usize, const NO: usize> {
    inputs: [I; NI],
    outputs: [O; NO],
}

impl<I, O, const NI: usize, const NO: usize> PinBank<I, O, NI, NO>
where
    I: InputPin,
    O: OutputPin,
{
    pub fn new(inputs: [I; NI], outputs: [O; NO]) -> Self {
        Self { inputs, outputs }
    }

    /// Give the pins back.
    pub fn release(self) -> ([I; NI], [O; NO]) {
        (self.inputs, self.outputs)
    }
}

impl<I, O, const NI: usize, const NO: usize> DigitalInputs for PinBank<I, O, NI, NO>
where
    I: InputPin,
{
    fn read(&mut self, line: Line) -> PinState {
        let Some(pin) = self.inputs.get_mut(line as usize) else {
            warn!("pins: read of unmapped input line {}", line);
            return PinState::Low;
        };

        match pin.is_high() {
            Ok(high) => PinState::from(high),
            Err(e) => {
                warn!("pins: input line {} read failed: {:?}", line, e);
                PinState::Low
            }
        }
    }
}

impl<I, O, const NI: usize, const NO: usize> DigitalOutputs for PinBank<I, O, NI, NO>
where
    O: OutputPin,
{
    fn write(&mut self, line: Line, state: PinState) {
        let Some(pin) = self.outputs.get_mut(line as usize) else {
            warn!("pins: write to unmapped output line {}", line);
            return;
        };

        if let Err(e) = pin.set_state(state) {
            warn!("pins: output line {} write failed: {:?}", line, e);
        }
    }
}
