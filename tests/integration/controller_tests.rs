//! End-to-end scenarios: events through the controller to mock hardware.

use quakeguard::app::events::{ControlAction, EventOutcome, HazardEvent};
use quakeguard::app::service::SafetyController;
use quakeguard::config::SystemConfig;
use quakeguard::error::Error;
use quakeguard::fsm::StateId;
use quakeguard::pins::OUTLET_COUNT;

use crate::mock_hw::{ActuatorCall, CollectingSink, MockHardware};

fn started() -> (SafetyController, MockHardware, CollectingSink) {
    let mut ctl = SafetyController::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = CollectingSink::new();
    ctl.start(&mut hw, &mut sink);
    (ctl, hw, sink)
}

fn shake(magnitude: f32) -> HazardEvent {
    HazardEvent::Shake { magnitude }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_settles_in_normal_with_power_restored() {
    let (ctl, hw, sink) = started();

    assert_eq!(ctl.state(), StateId::Normal);
    assert!(hw.all_outlets_on());
    assert!(!hw.siren);

    let states: Vec<StateId> = sink.snapshots.iter().map(|s| s.state).collect();
    assert_eq!(states, vec![StateId::Boot, StateId::Normal]);
}

// ── Seismic alert ─────────────────────────────────────────────

#[test]
fn quake_cuts_every_outlet_then_sounds_siren() {
    let (mut ctl, mut hw, mut sink) = started();
    hw.calls.clear();

    let outcome = ctl.handle_event(&shake(4.5), &mut hw, &mut sink).unwrap();
    assert_eq!(outcome, EventOutcome::Applied);
    assert_eq!(ctl.state(), StateId::Alert);
    assert!(hw.all_outlets_off());
    assert!(hw.siren);

    // Cutoff ordering: every outlet was written off before the siren started.
    let siren_at = hw.first_siren_start().unwrap();
    let off_writes = hw.calls[..siren_at]
        .iter()
        .filter(|c| matches!(c, ActuatorCall::SetOutlet { on: false, .. }))
        .count();
    assert_eq!(off_writes, OUTLET_COUNT);

    let alert = sink.last().unwrap();
    assert_eq!(alert.state, StateId::Alert);
    assert!(alert.alert_message.contains("4.5"));
    assert!(alert.outlets.all_off());
}

#[test]
fn broadcast_report_raises_alert_with_its_text() {
    let (mut ctl, mut hw, mut sink) = started();

    let ev = HazardEvent::BroadcastReport {
        text: "Magnitude 7 expected".to_string(),
    };
    ctl.handle_event(&ev, &mut hw, &mut sink).unwrap();

    assert_eq!(ctl.state(), StateId::Alert);
    assert!(sink.last().unwrap().alert_message.contains("Magnitude 7"));
}

#[test]
fn later_hazard_overwrites_alert_message() {
    let (mut ctl, mut hw, mut sink) = started();
    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();

    let ev = HazardEvent::BroadcastReport {
        text: "Aftershock".to_string(),
    };
    ctl.handle_event(&ev, &mut hw, &mut sink).unwrap();

    assert_eq!(ctl.state(), StateId::Alert);
    assert!(sink.last().unwrap().alert_message.contains("Aftershock"));
    assert!(hw.all_outlets_off());
    assert!(hw.siren);
}

// ── Acknowledge / recovery ────────────────────────────────────

#[test]
fn acknowledge_restores_service_through_recovery() {
    let (mut ctl, mut hw, mut sink) = started();
    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();
    sink.snapshots.clear();

    ctl.handle_event(&HazardEvent::ButtonPress { id: 1 }, &mut hw, &mut sink)
        .unwrap();

    let states: Vec<StateId> = sink.snapshots.iter().map(|s| s.state).collect();
    assert_eq!(states, vec![StateId::Recovery, StateId::Normal]);
    assert!(hw.all_outlets_on());
    assert!(!hw.siren);
    assert!(sink.last().unwrap().alert_message.is_empty());

    // Siren stop happened before the Normal snapshot was published;
    // the final call history ends with the re-energize + stop sequence.
    assert!(hw.calls.contains(&ActuatorCall::SirenStop));
}

#[test]
fn non_acknowledge_buttons_do_nothing_in_alert() {
    let (mut ctl, mut hw, mut sink) = started();
    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();

    for id in [2u8, 3, 4, 5, 9] {
        let outcome = ctl
            .handle_event(&HazardEvent::ButtonPress { id }, &mut hw, &mut sink)
            .unwrap();
        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(ctl.state(), StateId::Alert);
        assert!(hw.all_outlets_off());
    }
}

// ── Manual / remote control ───────────────────────────────────

#[test]
fn remote_control_works_only_in_normal() {
    let (mut ctl, mut hw, mut sink) = started();

    let set_off = HazardEvent::Control(ControlAction::Set {
        outlet: 2,
        on: false,
    });
    assert_eq!(
        ctl.handle_event(&set_off, &mut hw, &mut sink),
        Ok(EventOutcome::Applied)
    );
    assert!(!hw.outlets[1]);
    assert_eq!(sink.last().unwrap().outlets.0[1], false);

    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();
    let toggled = HazardEvent::Control(ControlAction::Toggle { outlet: 2 });
    assert_eq!(
        ctl.handle_event(&toggled, &mut hw, &mut sink),
        Err(Error::ForbiddenInState(StateId::Alert))
    );
    assert!(hw.all_outlets_off());
}

#[test]
fn get_is_legal_in_every_state_and_mutates_nothing() {
    let (mut ctl, mut hw, mut sink) = started();
    let get = HazardEvent::Control(ControlAction::Get);

    for hazard in [None, Some(shake(4.0))] {
        if let Some(ev) = hazard {
            ctl.handle_event(&ev, &mut hw, &mut sink).unwrap();
        }
        let before = ctl.snapshot();
        sink.snapshots.clear();

        assert_eq!(
            ctl.handle_event(&get, &mut hw, &mut sink),
            Ok(EventOutcome::Applied)
        );
        assert_eq!(sink.snapshots, vec![before.clone()]);
        assert_eq!(ctl.snapshot(), before);
    }
}

#[test]
fn unknown_outlet_in_command_is_rejected_not_fatal() {
    let (mut ctl, mut hw, mut sink) = started();

    let ev = HazardEvent::Control(ControlAction::Set {
        outlet: 9,
        on: true,
    });
    assert_eq!(
        ctl.handle_event(&ev, &mut hw, &mut sink),
        Err(Error::NotFoundOutlet(9))
    );

    // Controller still fully operational afterwards.
    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();
    assert_eq!(ctl.state(), StateId::Alert);
}

// ── Panel outlet toggles ──────────────────────────────────────

#[test]
fn panel_buttons_toggle_their_outlets_in_normal() {
    let (mut ctl, mut hw, mut sink) = started();

    ctl.handle_event(&HazardEvent::ButtonPress { id: 2 }, &mut hw, &mut sink)
        .unwrap();
    assert!(!hw.outlets[0]);
    assert!(hw.outlets[1] && hw.outlets[2] && hw.outlets[3]);

    ctl.handle_event(&HazardEvent::ButtonPress { id: 2 }, &mut hw, &mut sink)
        .unwrap();
    assert!(hw.outlets[0]);
}

#[test]
fn test_button_runs_full_alert_cycle() {
    let (mut ctl, mut hw, mut sink) = started();

    ctl.handle_event(&HazardEvent::ButtonPress { id: 5 }, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(ctl.state(), StateId::Alert);
    assert!(sink.last().unwrap().alert_message.contains("test"));
    assert!(hw.all_outlets_off());
    assert!(hw.siren);

    ctl.handle_event(&HazardEvent::ButtonPress { id: 1 }, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(ctl.state(), StateId::Normal);
    assert!(hw.all_outlets_on());
    assert!(!hw.siren);
}

// ── Fault tolerance ───────────────────────────────────────────

#[test]
fn relay_fault_does_not_block_the_alert() {
    let (mut ctl, mut hw, mut sink) = started();
    hw.fail_relay = Some(3);

    ctl.handle_event(&shake(4.0), &mut hw, &mut sink).unwrap();
    assert_eq!(ctl.state(), StateId::Alert);
    // Commanded state reports the cutoff even though relay 3 faulted.
    assert!(sink.last().unwrap().outlets.all_off());
    assert!(hw.siren);
}
