//! Front-panel button scanner with per-button debounce.
//!
//! Five momentary buttons (active-low with pull-ups on hardware).  The
//! main loop calls [`ButtonPanel::tick`] at scan rate; each button runs
//! a small debounce state machine and emits one press event per
//! physical press, on the settled edge.
//!
//! Button map: 1 = acknowledge, 2–4 = outlet toggles, 5 = alarm test.
//! The *meaning* of a press lives in the FSM; this driver only debounces.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::ButtonPort;
use crate::config::SystemConfig;

/// Number of front-panel buttons.
pub const BUTTON_COUNT: usize = 5;

/// Per-button debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Released,
    /// Held down, waiting for the debounce window to confirm it.
    Settling { since_ms: u32 },
    Pressed,
}

/// Debounce state machines for the whole panel.
pub struct ButtonPanel {
    states: [DebounceState; BUTTON_COUNT],
    debounce_ms: u32,
}

impl ButtonPanel {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            states: [DebounceState::Released; BUTTON_COUNT],
            debounce_ms: config.button_debounce_ms,
        }
    }

    /// Scan every button once.  `now_ms` is monotonic milliseconds;
    /// `emit` receives the 1-based id of each settled press.
    pub fn tick(&mut self, port: &impl ButtonPort, now_ms: u32, mut emit: impl FnMut(u8)) {
        for idx in 0..BUTTON_COUNT {
            let id = (idx + 1) as u8;
            let held = port.is_pressed(id);

            self.states[idx] = match self.states[idx] {
                DebounceState::Released if held => DebounceState::Settling { since_ms: now_ms },
                DebounceState::Released => DebounceState::Released,

                DebounceState::Settling { .. } if !held => DebounceState::Released,
                DebounceState::Settling { since_ms } => {
                    if now_ms.wrapping_sub(since_ms) >= self.debounce_ms {
                        emit(id);
                        DebounceState::Pressed
                    } else {
                        DebounceState::Settling { since_ms }
                    }
                }

                DebounceState::Pressed if !held => DebounceState::Released,
                DebounceState::Pressed => DebounceState::Pressed,
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

/// In-memory button levels, settable from tests or a demo driver.
#[derive(Clone, Default)]
pub struct SimulatedButtons {
    levels: Arc<[AtomicBool; BUTTON_COUNT]>,
}

impl SimulatedButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold or release one button.
    pub fn set_pressed(&self, id: u8, held: bool) {
        if let Some(level) = (id as usize)
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
        {
            level.store(held, Ordering::Release);
        }
    }
}

impl ButtonPort for SimulatedButtons {
    fn is_pressed(&self, id: u8) -> bool {
        (id as usize)
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .map(|level| level.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}
