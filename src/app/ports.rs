//! Port traits — the hexagonal boundary between the safety core and hardware.
//!
//! ```text
//!   AccelPort / ReportPort / ButtonPort ──▶ sources ──▶ EventIngress
//!                                                          │
//!                                          ┌───────────────▼──┐
//!                     OutletPort ◀─────────│  SafetyController │──▶ StatusSink
//!                     SirenPort  ◀─────────└──────────────────┘
//! ```
//!
//! Driven adapters (relay bank, siren, status sinks) implement the write
//! side; driving adapters (accelerometer, broadcast receiver, buttons,
//! TCP server) feed events in.  The controller consumes ports via
//! generics, so the domain core never touches hardware directly.

use crate::error::{ActuatorError, Result};

use super::events::{EventOutcome, HazardEvent, StatusSnapshot};

// ───────────────────────────────────────────────────────────────
// Actuator ports (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the switched outlets.
///
/// Implementations report hardware-level failures through
/// [`ActuatorError`]; the controller logs them and keeps the commanded
/// state as the source of truth.
pub trait OutletPort {
    /// Drive one outlet (1-based id) to the given level.
    fn set_outlet(&mut self, id: u8, on: bool) -> core::result::Result<(), ActuatorError>;

    /// De-energize every outlet.  The terminal safety action — must make
    /// a best effort on every channel even if one fails.
    fn all_off(&mut self) -> core::result::Result<(), ActuatorError>;
}

/// Write-side port for the audible alarm.
pub trait SirenPort {
    /// Start the siren pattern.  Idempotent.
    fn start(&mut self);

    /// Stop the siren and silence the output before returning.  Idempotent.
    fn stop(&mut self);

    /// Whether the siren pattern is currently running.
    fn is_active(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Status sink (domain → observers)
// ───────────────────────────────────────────────────────────────

/// The controller publishes a [`StatusSnapshot`] through this port after
/// every applied change.  Implementations must not block the caller; a
/// slow consumer drops snapshots, it never stalls a transition.
pub trait StatusSink {
    fn publish(&mut self, snapshot: &StatusSnapshot);
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (hardware → sources)
// ───────────────────────────────────────────────────────────────

/// Raw three-axis accelerometer access, polled by the shake monitor.
pub trait AccelPort: Send {
    /// One sample in G per axis.
    fn read_g(&mut self) -> (f32, f32, f32);
}

/// Decoded early-warning report access, polled by the broadcast receiver.
pub trait ReportPort: Send {
    /// The next decoded report text, if one arrived since the last poll.
    fn poll_report(&mut self) -> Option<String>;
}

/// Raw front-panel button levels, scanned by the debouncer.
pub trait ButtonPort {
    /// Whether the button with the given 1-based id is held down now.
    fn is_pressed(&self, id: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event ingress (sources → router)
// ───────────────────────────────────────────────────────────────

/// The single entry point event sources submit through.
///
/// Implemented by [`EventRouter`](crate::router::EventRouter).  `submit`
/// blocks while another producer holds the transition lock, so every
/// accepted event is fully applied before the call returns.
pub trait EventIngress: Send + Sync {
    fn submit(&self, event: HazardEvent) -> Result<EventOutcome>;
}
