//! QuakeGuard controller library.
//!
//! Disaster-response safety controller for a multi-outlet smart power
//! strip.  Seismic shakes, satellite early-warning broadcasts, panel
//! buttons, and remote commands funnel into one serialized event router
//! driving a Boot/Normal/Alert/Recovery state machine; Alert cuts every
//! outlet and sounds the siren until an operator acknowledges.
//!
//! Exposes the pure-logic modules for integration testing; the binary
//! in `main.rs` wires them to (simulated) hardware adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod router;
pub mod server;
pub mod sources;
