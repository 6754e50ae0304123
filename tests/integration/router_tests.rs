//! Router serialization, shutdown, and failure-containment tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use quakeguard::app::events::{ControlAction, HazardEvent, StatusSnapshot};
use quakeguard::app::ports::{EventIngress, OutletPort, SirenPort, StatusSink};
use quakeguard::app::service::SafetyController;
use quakeguard::config::SystemConfig;
use quakeguard::error::{ActuatorError, Error};
use quakeguard::fsm::StateId;
use quakeguard::pins::OUTLET_COUNT;
use quakeguard::router::EventRouter;

// ── Thread-safe observer sink ─────────────────────────────────

#[derive(Clone, Default)]
struct SharedSink {
    snapshots: Arc<std::sync::Mutex<Vec<StatusSnapshot>>>,
}

impl StatusSink for SharedSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

// ── Observable hardware (state shared outside the router) ─────

#[derive(Clone, Default)]
struct SharedHw {
    outlets: Arc<std::sync::Mutex<[bool; OUTLET_COUNT]>>,
    siren: Arc<AtomicBool>,
}

impl SharedHw {
    fn all_outlets_off(&self) -> bool {
        self.outlets.lock().unwrap().iter().all(|on| !on)
    }
}

impl OutletPort for SharedHw {
    fn set_outlet(&mut self, id: u8, on: bool) -> Result<(), ActuatorError> {
        self.outlets.lock().unwrap()[(id - 1) as usize] = on;
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        *self.outlets.lock().unwrap() = [false; OUTLET_COUNT];
        Ok(())
    }
}

impl SirenPort for SharedHw {
    fn start(&mut self) {
        self.siren.store(true, Ordering::SeqCst);
    }
    fn stop(&mut self) {
        self.siren.store(false, Ordering::SeqCst);
    }
    fn is_active(&self) -> bool {
        self.siren.load(Ordering::SeqCst)
    }
}

fn started_router() -> (Arc<EventRouter<SharedHw, SharedSink>>, SharedHw, SharedSink) {
    let sink = SharedSink::default();
    let hw = SharedHw::default();
    let router = Arc::new(EventRouter::new(
        SafetyController::new(SystemConfig::default()),
        hw.clone(),
        sink.clone(),
    ));
    router.start().unwrap();
    (router, hw, sink)
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn concurrent_producers_yield_a_linear_history() {
    let (router, hw, sink) = started_router();

    let mut handles = Vec::new();
    for worker in 0..8u8 {
        let router = router.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..50u32 {
                let event = match (worker as u32 + i) % 4 {
                    0 => HazardEvent::Shake {
                        magnitude: 5.0 + i as f32 / 100.0,
                    },
                    1 => HazardEvent::ButtonPress { id: 1 },
                    2 => HazardEvent::Control(ControlAction::Toggle {
                        outlet: 1 + (i % OUTLET_COUNT as u32) as u8,
                    }),
                    _ => HazardEvent::BroadcastReport {
                        text: format!("warning {worker}/{i}"),
                    },
                };
                // Rejections (control outside Normal) are expected; loss
                // or a poisoned router is not.
                match router.submit(event) {
                    Ok(_) | Err(Error::ForbiddenInState(_)) => {}
                    Err(e) => panic!("router failed under load: {e}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // The router survived and every published snapshot is internally
    // consistent: Alert snapshots always show the cutoff.
    let snapshots = sink.snapshots.lock().unwrap();
    assert!(!snapshots.is_empty());
    for snapshot in snapshots.iter() {
        if snapshot.state == StateId::Alert {
            assert!(snapshot.outlets.all_off(), "Alert snapshot with power on");
            assert!(!snapshot.alert_message.is_empty());
        }
        if snapshot.state == StateId::Normal {
            assert!(snapshot.alert_message.is_empty());
        }
    }

    // The final state is one of the two stable states, and the hardware
    // agrees with the commanded picture.
    let last = router.snapshot().unwrap();
    assert!(last.state == StateId::Normal || last.state == StateId::Alert);
    if last.state == StateId::Alert {
        assert!(hw.all_outlets_off());
        assert!(hw.siren.load(Ordering::SeqCst));
    }
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_de_energizes_and_rejects_further_events() {
    let (router, hw, _sink) = started_router();
    router
        .submit(HazardEvent::Shake { magnitude: 6.0 })
        .unwrap();
    assert!(hw.siren.load(Ordering::SeqCst));

    router.shutdown();
    router.shutdown(); // idempotent

    assert!(hw.all_outlets_off());
    assert!(!hw.siren.load(Ordering::SeqCst));
    assert_eq!(
        router.submit(HazardEvent::ButtonPress { id: 1 }),
        Err(Error::ShuttingDown)
    );
}

#[test]
fn shutdown_during_normal_still_cuts_power() {
    let (router, hw, _sink) = started_router();
    // Outlets are energized in Normal; shutdown must not leave them so.
    assert!(!hw.all_outlets_off());
    router.shutdown();
    assert!(hw.all_outlets_off());
    assert_eq!(
        router.submit(HazardEvent::Control(ControlAction::Get)),
        Err(Error::ShuttingDown)
    );
}

// ── Poisoned lock containment ─────────────────────────────────

/// Hardware whose first outlet write panics, poisoning the router lock
/// mid-transition.
struct PanickyHw {
    armed: Arc<AtomicBool>,
    all_off_calls: Arc<AtomicUsize>,
    siren_stops: Arc<AtomicUsize>,
    siren: bool,
}

impl OutletPort for PanickyHw {
    fn set_outlet(&mut self, _id: u8, _on: bool) -> Result<(), ActuatorError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            panic!("injected actuator panic");
        }
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.all_off_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl SirenPort for PanickyHw {
    fn start(&mut self) {
        self.siren = true;
    }
    fn stop(&mut self) {
        self.siren_stops.fetch_add(1, Ordering::SeqCst);
        self.siren = false;
    }
    fn is_active(&self) -> bool {
        self.siren
    }
}

#[test]
fn poisoned_lock_forces_all_off_and_reports_fatal() {
    let armed = Arc::new(AtomicBool::new(false));
    let all_off_calls = Arc::new(AtomicUsize::new(0));
    let siren_stops = Arc::new(AtomicUsize::new(0));

    let router = Arc::new(EventRouter::new(
        SafetyController::new(SystemConfig::default()),
        PanickyHw {
            armed: armed.clone(),
            all_off_calls: all_off_calls.clone(),
            siren_stops: siren_stops.clone(),
            siren: false,
        },
        SharedSink::default(),
    ));
    router.start().unwrap();

    // Panic inside the locked region on a worker thread.
    armed.store(true, Ordering::SeqCst);
    let worker = {
        let router = router.clone();
        std::thread::spawn(move || {
            let _ = router.submit(HazardEvent::Shake { magnitude: 6.0 });
        })
    };
    assert!(worker.join().is_err(), "injected panic must propagate");

    // Every later submit sees the fatal error, and the terminal all-off
    // ran on the poisoned state.
    assert_eq!(
        router.submit(HazardEvent::ButtonPress { id: 1 }),
        Err(Error::RouterPoisoned)
    );
    assert!(all_off_calls.load(Ordering::SeqCst) >= 1);
    assert!(siren_stops.load(Ordering::SeqCst) >= 1);
}
