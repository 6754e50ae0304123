//! Hardware drivers — dumb actuators and input scanners.
//!
//! Drivers know how to move their device and nothing else.  All policy
//! (when to cut power, when to sound the alarm) lives in the FSM.

pub mod alarm;
pub mod buttons;
pub mod relays;
