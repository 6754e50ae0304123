//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  BOOT ──[auto]──▶ NORMAL ──[strong shake / report / test btn]──▶ ALERT
//!                     ▲                                              │
//!                     │                                       [acknowledge]
//!                     │                                              ▼
//!                     └──────────────[auto]──────────────────── RECOVERY
//! ```
//!
//! Handlers mutate only the [`FsmContext`]: commanded outlet levels, the
//! commanded alarm flag, and the alert message.  The controller applies
//! that intent to the actuator ports after dispatch, relays before siren,
//! so the safety cutoff always lands before the alarm sounds.

use log::{info, warn};

use crate::app::events::{ControlAction, HazardEvent};
use crate::error::Error;

use super::context::FsmContext;
use super::{StateDescriptor, StateId};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Boot
        StateDescriptor {
            id: StateId::Boot,
            name: "Boot",
            on_enter: Some(boot_enter),
            on_exit: None,
            on_event: boot_on_event,
            auto_advance: Some(boot_advance),
        },
        // Index 1 — Normal
        StateDescriptor {
            id: StateId::Normal,
            name: "Normal",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_event: normal_on_event,
            auto_advance: None,
        },
        // Index 2 — Alert
        StateDescriptor {
            id: StateId::Alert,
            name: "Alert",
            on_enter: Some(alert_enter),
            on_exit: None,
            on_event: alert_on_event,
            auto_advance: None,
        },
        // Index 3 — Recovery
        StateDescriptor {
            id: StateId::Recovery,
            name: "Recovery",
            on_enter: Some(recovery_enter),
            on_exit: None,
            on_event: recovery_on_event,
            auto_advance: Some(recovery_advance),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  BOOT state — hardware settling, everything de-energized
// ═══════════════════════════════════════════════════════════════════════════

fn boot_enter(ctx: &mut FsmContext) {
    ctx.outlets.all_off();
    ctx.alarm_commanded = false;
    ctx.alert_message.clear();
    info!("BOOT: outlets de-energized, waiting for startup to settle");
}

fn boot_advance(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Normal)
}

fn boot_on_event(ctx: &mut FsmContext, event: &HazardEvent) -> Option<StateId> {
    match event {
        HazardEvent::Control(ControlAction::Set { .. } | ControlAction::Toggle { .. }) => {
            ctx.reject(Error::ForbiddenInState(StateId::Boot));
        }
        _ => ctx.ignore(),
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL state — all outlets energized, manual control allowed
// ═══════════════════════════════════════════════════════════════════════════

fn normal_enter(ctx: &mut FsmContext) {
    ctx.outlets.all_on();
    ctx.alarm_commanded = false;
    ctx.alert_message.clear();
    info!("NORMAL: all outlets energized, alarm silenced");
}

fn normal_on_event(ctx: &mut FsmContext, event: &HazardEvent) -> Option<StateId> {
    match event {
        HazardEvent::Shake { magnitude } => {
            if (magnitude - 1.0).abs() > ctx.config.shake_threshold_g {
                ctx.alert_message = format!("Strong shaking detected ({magnitude:.1}G)");
                return Some(StateId::Alert);
            }
            ctx.ignore();
        }

        HazardEvent::BroadcastReport { text } => {
            ctx.alert_message = format!("Early warning received: {text}");
            return Some(StateId::Alert);
        }

        HazardEvent::ButtonPress { id } => match id {
            // Buttons 2..4 map to outlets 1..3 (button 1 is acknowledge).
            2..=4 => {
                let outlet = id - 1;
                if let Ok(on) = ctx.outlets.toggle(outlet) {
                    info!("NORMAL: button {id} toggled outlet {outlet} -> {on}");
                }
            }
            5 => {
                ctx.alert_message = "Alarm test (button 5)".to_string();
                return Some(StateId::Alert);
            }
            _ => ctx.ignore(),
        },

        HazardEvent::Control(action) => match action {
            ControlAction::Set { outlet, on } => {
                if let Err(e) = ctx.outlets.set(*outlet, *on) {
                    ctx.reject(e);
                }
            }
            ControlAction::Toggle { outlet } => {
                if let Err(e) = ctx.outlets.toggle(*outlet) {
                    ctx.reject(e);
                }
            }
            // Get is answered by the controller without entering the FSM.
            ControlAction::Get => ctx.ignore(),
        },
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALERT state — safety cutoff, siren sounding, waiting for acknowledge
// ═══════════════════════════════════════════════════════════════════════════

fn alert_enter(ctx: &mut FsmContext) {
    // Cutoff first.  The controller drives relays before the siren, so
    // ordering here fixes ordering at the hardware.
    ctx.outlets.all_off();
    ctx.alarm_commanded = true;
    warn!("ALERT: safety cutoff, alarm sounding ({})", ctx.alert_message);
}

fn alert_on_event(ctx: &mut FsmContext, event: &HazardEvent) -> Option<StateId> {
    match event {
        // Further hazards replace the message and reassert the cutoff;
        // no transition, entry effects stay idempotent.
        HazardEvent::Shake { magnitude } => {
            if (magnitude - 1.0).abs() > ctx.config.shake_threshold_g {
                ctx.alert_message = format!("Strong shaking detected ({magnitude:.1}G)");
                ctx.outlets.all_off();
                ctx.alarm_commanded = true;
            } else {
                ctx.ignore();
            }
        }

        HazardEvent::BroadcastReport { text } => {
            ctx.alert_message = format!("Early warning received: {text}");
            ctx.outlets.all_off();
            ctx.alarm_commanded = true;
        }

        HazardEvent::ButtonPress { id: 1 } => {
            info!("ALERT: acknowledged by operator");
            return Some(StateId::Recovery);
        }
        HazardEvent::ButtonPress { .. } => ctx.ignore(),

        HazardEvent::Control(ControlAction::Set { .. } | ControlAction::Toggle { .. }) => {
            ctx.reject(Error::ForbiddenInState(StateId::Alert));
        }
        HazardEvent::Control(ControlAction::Get) => ctx.ignore(),
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RECOVERY state — acknowledged, restoring service
// ═══════════════════════════════════════════════════════════════════════════

fn recovery_enter(_ctx: &mut FsmContext) {
    info!("RECOVERY: alert acknowledged, restoring service");
}

/// Recovery currently needs no operator confirmation; it settles straight
/// into Normal.  A confirmation gate would replace this with `None` and
/// let `recovery_on_event` drive the exit.
fn recovery_advance(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Normal)
}

fn recovery_on_event(ctx: &mut FsmContext, event: &HazardEvent) -> Option<StateId> {
    match event {
        HazardEvent::ButtonPress { id: 1 } => return Some(StateId::Normal),
        HazardEvent::Control(ControlAction::Set { .. } | ControlAction::Toggle { .. }) => {
            ctx.reject(Error::ForbiddenInState(StateId::Recovery));
        }
        _ => ctx.ignore(),
    }
    None
}
