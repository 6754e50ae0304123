//! Safety controller — the hexagonal core.
//!
//! [`SafetyController`] owns the FSM and its context.  All I/O flows
//! through port traits injected at call sites, making the entire core
//! testable with mock adapters.
//!
//! ```text
//!  EventRouter ──▶ ┌──────────────────────┐ ──▶ StatusSink
//!                  │   SafetyController    │
//!  OutletPort  ◀───│   FSM · OutletBank    │──▶ SirenPort
//!                  └──────────────────────┘
//! ```
//!
//! Side-effect ordering is fixed here: after every dispatch the relays
//! are driven first and the siren second, so the Alert cutoff lands
//! before the alarm sounds and re-energizing precedes the alarm stop
//! being reported.

use log::{error, info};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::pins::OUTLET_COUNT;

use super::events::{ControlAction, EventOutcome, HazardEvent, StatusSnapshot};
use super::ports::{OutletPort, SirenPort, StatusSink};

// ───────────────────────────────────────────────────────────────
// SafetyController
// ───────────────────────────────────────────────────────────────

/// Orchestrates the hazard-safety domain logic.
pub struct SafetyController {
    fsm: Fsm,
    ctx: FsmContext,
}

impl SafetyController {
    /// Construct the controller from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Boot);
        Self { fsm, ctx }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Boot, then drain the auto-resolution chain into Normal.
    /// Each hop drives the actuators and publishes its own snapshot, so
    /// observers see the full startup sequence.
    pub fn start(&mut self, hw: &mut (impl OutletPort + SirenPort), sink: &mut impl StatusSink) {
        self.fsm.start(&mut self.ctx);
        self.apply_actuators(hw);
        sink.publish(&self.snapshot());

        while self.fsm.auto_advance(&mut self.ctx).is_some() {
            self.apply_actuators(hw);
            sink.publish(&self.snapshot());
        }
        info!("Controller started in {:?}", self.fsm.current_state());
    }

    // ── Event handling ────────────────────────────────────────

    /// Apply one event: dispatch, actuate, publish.
    ///
    /// The caller (the router) guarantees exclusive access, so the whole
    /// sequence is one atomic step in the event history.
    pub fn handle_event(
        &mut self,
        event: &HazardEvent,
        hw: &mut (impl OutletPort + SirenPort),
        sink: &mut impl StatusSink,
    ) -> Result<EventOutcome> {
        // Get is a pure read: answer it without touching the FSM.
        if matches!(event, HazardEvent::Control(ControlAction::Get)) {
            sink.publish(&self.snapshot());
            return Ok(EventOutcome::Applied);
        }

        self.ctx.reset_outcome();
        let outlets_before = self.ctx.outlets.status();
        let message_before = self.ctx.alert_message.clone();

        let transition = self.fsm.dispatch(&mut self.ctx, event);
        let outcome = self.ctx.take_outcome()?;

        // Rejected events mutate nothing, so only the accepted path
        // reaches the actuators.
        self.apply_actuators(hw);
        let changed = transition.is_some()
            || self.ctx.outlets.status() != outlets_before
            || self.ctx.alert_message != message_before;
        if changed {
            sink.publish(&self.snapshot());
        }

        while self.fsm.auto_advance(&mut self.ctx).is_some() {
            self.apply_actuators(hw);
            sink.publish(&self.snapshot());
        }

        Ok(outcome)
    }

    /// Terminal safety action: everything off, siren silent.
    /// Used on shutdown and when the serialization lock is poisoned.
    pub fn emergency_stop(hw: &mut (impl OutletPort + SirenPort)) {
        if let Err(e) = hw.all_off() {
            error!("Emergency stop: {e}");
        }
        hw.stop();
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot from the current context.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.fsm.current_state(),
            outlets: self.ctx.outlets.status(),
            alert_message: self.ctx.alert_message.clone(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate commanded context into port calls, relays before siren.
    fn apply_actuators(&self, hw: &mut (impl OutletPort + SirenPort)) {
        for idx in 0..OUTLET_COUNT {
            let id = (idx + 1) as u8;
            // The id is in range by construction.
            let on = self.ctx.outlets.is_on(id).unwrap_or(false);
            if let Err(e) = hw.set_outlet(id, on) {
                // Commanded state stays the source of truth; the fault
                // is surfaced but never blocks the transition.
                error!("Actuator fault: {e}");
            }
        }

        if self.ctx.alarm_commanded {
            hw.start();
        } else if hw.is_active() {
            hw.stop();
        }
    }
}
