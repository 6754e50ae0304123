//! Relay board driver for the switched outlets.
//!
//! One active-high channel per outlet, generic over
//! [`embedded_hal::digital::OutputPin`] so the same driver runs against
//! real GPIO or the in-memory [`SimulatedPin`].
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator: it drives whatever level it is told.
//! The Alert cutoff policy lives in the FSM, not here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::error::ActuatorError;
use crate::pins::OUTLET_COUNT;

/// Fixed bank of relay channels, indexed by outlet id − 1.
pub struct RelayBank<P: OutputPin> {
    channels: [P; OUTLET_COUNT],
    commanded: [bool; OUTLET_COUNT],
}

impl<P: OutputPin> RelayBank<P> {
    /// Wrap the channel pins.  All channels start de-energized.
    pub fn new(mut channels: [P; OUTLET_COUNT]) -> Self {
        for pin in &mut channels {
            // Best effort; a failure here surfaces on the first write.
            let _ = pin.set_low();
        }
        Self {
            channels,
            commanded: [false; OUTLET_COUNT],
        }
    }

    /// Drive one channel (1-based outlet id) to the given level.
    pub fn write(&mut self, id: u8, on: bool) -> Result<(), ActuatorError> {
        let idx = (id as usize)
            .checked_sub(1)
            .filter(|idx| *idx < OUTLET_COUNT)
            .ok_or(ActuatorError::RelayWriteFailed(id))?;

        let result = if on {
            self.channels[idx].set_high()
        } else {
            self.channels[idx].set_low()
        };
        result.map_err(|_| ActuatorError::RelayWriteFailed(id))?;

        self.commanded[idx] = on;
        debug!("Relay {id} -> {}", if on { "ON" } else { "OFF" });
        Ok(())
    }

    /// De-energize every channel, continuing past individual failures.
    pub fn all_off(&mut self) -> Result<(), ActuatorError> {
        let mut first_err = None;
        for id in 1..=OUTLET_COUNT as u8 {
            if let Err(e) = self.write(id, false) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Last successfully commanded level of one channel.
    pub fn commanded(&self, id: u8) -> bool {
        (id as usize)
            .checked_sub(1)
            .and_then(|idx| self.commanded.get(idx).copied())
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

/// In-memory output pin; the shared level is observable from tests and
/// from the status side of a demo run.
pub struct SimulatedPin {
    level: Arc<AtomicBool>,
}

impl SimulatedPin {
    pub fn new() -> Self {
        Self {
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the pin level.
    pub fn level(&self) -> Arc<AtomicBool> {
        self.level.clone()
    }
}

impl Default for SimulatedPin {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_hal::digital::ErrorType for SimulatedPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.store(false, Ordering::Release);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.store(true, Ordering::Release);
        Ok(())
    }
}

impl RelayBank<SimulatedPin> {
    /// A bank backed entirely by simulated pins.
    pub fn simulated() -> Self {
        Self::new(core::array::from_fn(|_| SimulatedPin::new()))
    }
}
