//! Shared mutable context threaded through every state handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the commanded outlet bank, the commanded alarm flag, the
//! active alert message, configuration, and the outcome of the event
//! currently being dispatched.  Handlers record *intent* here; the
//! controller applies it to the actuator ports after dispatch returns.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::app::events::EventOutcome;
use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::pins::OUTLET_COUNT;

// ---------------------------------------------------------------------------
// Outlet bank (commanded state; written by handlers, applied by the service)
// ---------------------------------------------------------------------------

/// Commanded on/off state of the fixed outlet set.  Outlet ids are
/// 1-based to match the panel labels and the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletBank {
    channels: [bool; OUTLET_COUNT],
}

impl OutletBank {
    /// All outlets off — the de-energized power-on default.
    pub fn new() -> Self {
        Self {
            channels: [false; OUTLET_COUNT],
        }
    }

    /// Command one outlet to an explicit level.
    pub fn set(&mut self, id: u8, on: bool) -> Result<()> {
        let idx = Self::index(id)?;
        self.channels[idx] = on;
        Ok(())
    }

    /// Flip one outlet; returns the new level.
    pub fn toggle(&mut self, id: u8) -> Result<bool> {
        let idx = Self::index(id)?;
        self.channels[idx] = !self.channels[idx];
        Ok(self.channels[idx])
    }

    /// Whether one outlet is commanded on.
    pub fn is_on(&self, id: u8) -> Result<bool> {
        Ok(self.channels[Self::index(id)?])
    }

    /// Energize every outlet.
    pub fn all_on(&mut self) {
        self.channels = [true; OUTLET_COUNT];
    }

    /// De-energize every outlet.
    pub fn all_off(&mut self) {
        self.channels = [false; OUTLET_COUNT];
    }

    /// Snapshot of every channel, reflecting all prior mutations.
    pub fn status(&self) -> OutletStatus {
        OutletStatus(self.channels)
    }

    fn index(id: u8) -> Result<usize> {
        if (1..=OUTLET_COUNT as u8).contains(&id) {
            Ok((id - 1) as usize)
        } else {
            Err(Error::NotFoundOutlet(id))
        }
    }
}

impl Default for OutletBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time outlet levels, indexed by outlet id − 1.
///
/// Serializes as an id-keyed map (`{"1": true, ...}`) to match the
/// status wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletStatus(pub [bool; OUTLET_COUNT]);

impl OutletStatus {
    /// Whether every outlet is off.
    pub fn all_off(&self) -> bool {
        self.0.iter().all(|on| !on)
    }

    /// Whether every outlet is on.
    pub fn all_on(&self) -> bool {
        self.0.iter().all(|on| *on)
    }
}

impl Serialize for OutletStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(OUTLET_COUNT))?;
        for (idx, on) in self.0.iter().enumerate() {
            map.serialize_entry(&(idx + 1).to_string(), on)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    /// System configuration (tunable parameters).
    pub config: SystemConfig,

    /// Commanded outlet levels.  Applied to the relay port after dispatch.
    pub outlets: OutletBank,

    /// Commanded siren state.  Applied to the siren port after dispatch.
    pub alarm_commanded: bool,

    /// Human-readable cause of the active alert.  Most recent hazard
    /// wins; cleared on entry to Normal.
    pub alert_message: String,

    /// Outcome of the event currently being dispatched.  Reset to
    /// `Applied` before each dispatch; handlers downgrade or reject it.
    outcome: Result<EventOutcome>,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            outlets: OutletBank::new(),
            alarm_commanded: false,
            alert_message: String::new(),
            outcome: Ok(EventOutcome::Applied),
        }
    }

    /// Mark the current event as legal but meaningless in this state.
    pub fn ignore(&mut self) {
        self.outcome = Ok(EventOutcome::Ignored);
    }

    /// Reject the current event.  No handler mutates state after calling
    /// this; the event has no effect.
    pub fn reject(&mut self, err: Error) {
        self.outcome = Err(err);
    }

    /// Reset the outcome slot before dispatching a new event.
    pub fn reset_outcome(&mut self) {
        self.outcome = Ok(EventOutcome::Applied);
    }

    /// Take the outcome recorded during the last dispatch.
    pub fn take_outcome(&mut self) -> Result<EventOutcome> {
        core::mem::replace(&mut self.outcome, Ok(EventOutcome::Applied))
    }
}
