//! Unified error types for the QuakeGuard controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! router's per-event outcome handling uniform.  All variants are `Copy` so
//! they can be cheaply passed back through the router without allocation.
//!
//! None of these are fatal to the process except [`Error::RouterPoisoned`]:
//! a poisoned serialization lock is a programming-contract violation, and
//! the router forces the terminal all-off safety action before reporting it.

use core::fmt;

use crate::fsm::StateId;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An event was malformed (unknown field, missing value).  Dropped and
    /// logged; no state change.
    InvalidEvent(&'static str),
    /// A command named an outlet id outside the fixed set.
    NotFoundOutlet(u8),
    /// A control command arrived while the state machine was not in a state
    /// where manual control is safe.  Rejected; no state change.
    ForbiddenInState(StateId),
    /// An actuator reported a hardware-level failure.  Logged; commanded
    /// state still reflects intent.
    Actuator(ActuatorError),
    /// The router is shutting down and no longer accepts events.
    ShuttingDown,
    /// The router's serialization lock was poisoned by a panicking holder.
    /// Fatal: the terminal all-off action has already been forced.
    RouterPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEvent(msg) => write!(f, "invalid event: {msg}"),
            Self::NotFoundOutlet(id) => write!(f, "unknown outlet id {id}"),
            Self::ForbiddenInState(state) => {
                write!(f, "control command forbidden in {state:?}")
            }
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::ShuttingDown => write!(f, "router shutting down"),
            Self::RouterPoisoned => write!(f, "router lock poisoned"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// A relay channel rejected the commanded level.
    RelayWriteFailed(u8),
    /// The siren task could not be started or did not terminate.
    SirenUnresponsive,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayWriteFailed(id) => write!(f, "relay {id} write failed"),
            Self::SirenUnresponsive => write!(f, "siren unresponsive"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
