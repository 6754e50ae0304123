//! Hardware adapter — bridges the actuator drivers to domain port traits.
//!
//! Owns the relay bank and the alarm driver, exposing them through
//! [`OutletPort`] and [`SirenPort`].  This is the only module the
//! controller's actuation path goes through; everything behind it is a
//! dumb driver.  The shipped construction uses simulated pins — a real
//! Raspberry Pi build would hand [`RelayBank::new`] GPIO-backed pins and
//! leave everything else untouched.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{OutletPort, SirenPort};
use crate::config::SystemConfig;
use crate::drivers::alarm::AlarmDriver;
use crate::drivers::relays::{RelayBank, SimulatedPin};
use crate::error::ActuatorError;

/// Concrete adapter that combines the actuators behind port traits.
pub struct HardwareAdapter<P: OutputPin> {
    relays: RelayBank<P>,
    alarm: AlarmDriver,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(relays: RelayBank<P>, alarm: AlarmDriver) -> Self {
        Self { relays, alarm }
    }
}

impl HardwareAdapter<SimulatedPin> {
    /// Fully simulated hardware for host runs and tests.
    pub fn simulated(config: &SystemConfig) -> Self {
        Self::new(RelayBank::simulated(), AlarmDriver::new(config))
    }
}

// ── OutletPort implementation ─────────────────────────────────

impl<P: OutputPin> OutletPort for HardwareAdapter<P> {
    fn set_outlet(&mut self, id: u8, on: bool) -> Result<(), ActuatorError> {
        self.relays.write(id, on)
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.relays.all_off()
    }
}

// ── SirenPort implementation ──────────────────────────────────

impl<P: OutputPin> SirenPort for HardwareAdapter<P> {
    fn start(&mut self) {
        self.alarm.start();
    }

    fn stop(&mut self) {
        self.alarm.stop();
    }

    fn is_active(&self) -> bool {
        self.alarm.is_active()
    }
}
