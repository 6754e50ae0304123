//! GPIO pin assignments for the QuakeGuard strip controller (Raspberry Pi, BCM numbering).
//!
//! Single source of truth — every adapter references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! BCM 2/3 (I²C, accelerometer) and BCM 14/15 (UART, early-warning receiver)
//! are claimed by their buses and deliberately absent from the maps below.

/// Number of switched outlets on the strip.
pub const OUTLET_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Relay board (one channel per outlet, active HIGH)
// ---------------------------------------------------------------------------

/// Relay channel pins, indexed by outlet id − 1 (outlets are 1-based).
pub const RELAY_GPIOS: [u8; OUTLET_COUNT] = [4, 17, 27, 22];

// ---------------------------------------------------------------------------
// Front-panel buttons (momentary, active-low with pull-up)
// ---------------------------------------------------------------------------

/// Button pins, indexed by button id − 1.
/// Button 1 = acknowledge, 2–4 = outlet toggles, 5 = alarm test.
pub const BUTTON_GPIOS: [u8; 5] = [5, 6, 13, 19, 26];

// ---------------------------------------------------------------------------
// Siren (buzzer / speaker driver on the hardware PWM pin)
// ---------------------------------------------------------------------------

/// PWM0 output driving the alarm buzzer.
pub const SIREN_GPIO: u8 = 12;

// ---------------------------------------------------------------------------
// Early-warning receiver (serial)
// ---------------------------------------------------------------------------

/// Serial device the satellite early-warning receiver is attached to.
pub const RECEIVER_SERIAL_DEV: &str = "/dev/ttyUSB0";
/// Receiver baud rate.
pub const RECEIVER_BAUD: u32 = 9600;
