//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM.

use quakeguard::app::events::StatusSnapshot;
use quakeguard::app::ports::{OutletPort, SirenPort, StatusSink};
use quakeguard::error::ActuatorError;
use quakeguard::pins::OUTLET_COUNT;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetOutlet { id: u8, on: bool },
    AllOff,
    SirenStart,
    SirenStop,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub outlets: [bool; OUTLET_COUNT],
    pub siren: bool,
    /// Relay id that fails every write, if set.
    pub fail_relay: Option<u8>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            outlets: [false; OUTLET_COUNT],
            siren: false,
            fail_relay: None,
        }
    }

    pub fn all_outlets_off(&self) -> bool {
        self.outlets.iter().all(|on| !on)
    }

    pub fn all_outlets_on(&self) -> bool {
        self.outlets.iter().all(|on| *on)
    }

    /// Index of the first siren start in the call history.
    pub fn first_siren_start(&self) -> Option<usize> {
        self.calls
            .iter()
            .position(|c| *c == ActuatorCall::SirenStart)
    }

    /// Index of the last outlet-off write before any siren start.
    pub fn last_cutoff_before_siren(&self) -> Option<usize> {
        let siren_at = self.first_siren_start()?;
        self.calls[..siren_at]
            .iter()
            .rposition(|c| matches!(c, ActuatorCall::SetOutlet { on: false, .. }))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl OutletPort for MockHardware {
    fn set_outlet(&mut self, id: u8, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::SetOutlet { id, on });
        if self.fail_relay == Some(id) {
            return Err(ActuatorError::RelayWriteFailed(id));
        }
        self.outlets[(id - 1) as usize] = on;
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::AllOff);
        self.outlets = [false; OUTLET_COUNT];
        Ok(())
    }
}

impl SirenPort for MockHardware {
    fn start(&mut self) {
        self.calls.push(ActuatorCall::SirenStart);
        self.siren = true;
    }

    fn stop(&mut self) {
        self.calls.push(ActuatorCall::SirenStop);
        self.siren = false;
    }

    fn is_active(&self) -> bool {
        self.siren
    }
}

// ── Collecting status sink ────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub snapshots: Vec<StatusSnapshot>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&StatusSnapshot> {
        self.snapshots.last()
    }
}

impl StatusSink for CollectingSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
}
