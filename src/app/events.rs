//! Inbound hazard events and outbound status types.
//!
//! Every stimulus the controller reacts to — a seismic shake, a decoded
//! early-warning broadcast, a front-panel button, a remote command — is
//! normalized into a [`HazardEvent`] before it reaches the state machine.
//! Sources never call the FSM directly; they submit events through the
//! [`EventRouter`](crate::router::EventRouter), which serializes them.

use serde::Serialize;

use crate::fsm::StateId;
use crate::fsm::context::OutletStatus;

/// Control operations carried inside [`HazardEvent::Control`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Drive one outlet to an explicit level.
    Set { outlet: u8, on: bool },
    /// Flip one outlet.
    Toggle { outlet: u8 },
    /// Publish a status snapshot.  Never mutates anything, legal anywhere.
    Get,
}

/// A normalized stimulus submitted to the event router.
#[derive(Debug, Clone, PartialEq)]
pub enum HazardEvent {
    /// Accelerometer sample, total magnitude in G (1.0 at rest).
    Shake { magnitude: f32 },
    /// Decoded early-warning broadcast report text.
    BroadcastReport { text: String },
    /// Debounced front-panel button press (ids 1..=5).
    ButtonPress { id: u8 },
    /// Remote command from the TCP command channel.
    Control(ControlAction),
}

/// What the router did with a submitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event caused a transition, an outlet change, or a publish.
    Applied,
    /// The event was legal but meaningless in the current state.
    Ignored,
}

/// Point-in-time controller status, published after every applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub state: StateId,
    pub outlets: OutletStatus,
    /// Cause of the active alert; empty outside `Alert`.
    pub alert_message: String,
}
