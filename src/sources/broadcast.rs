//! Broadcast receiver — polls for decoded early-warning reports.
//!
//! The satellite receiver hardware and its NMEA decoding live behind
//! [`ReportPort`]; this source only loops, polls, and submits each
//! decoded report as a
//! [`HazardEvent::BroadcastReport`](crate::app::events::HazardEvent).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use log::{info, warn};

use crate::app::events::HazardEvent;
use crate::app::ports::{EventIngress, ReportPort};
use crate::config::SystemConfig;

use super::SourceHandle;

fn receive_loop(
    mut port: impl ReportPort,
    ingress: Arc<dyn EventIngress>,
    poll: Duration,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::Acquire) {
        while let Some(text) = port.poll_report() {
            info!("Broadcast report: {text}");
            if ingress
                .submit(HazardEvent::BroadcastReport { text })
                .is_err()
            {
                warn!("Broadcast report rejected by router");
            }
        }
        std::thread::sleep(poll);
    }
}

/// Spawn the receiver thread.
pub fn spawn(
    port: impl ReportPort + 'static,
    ingress: Arc<dyn EventIngress>,
    config: &SystemConfig,
) -> SourceHandle {
    let running = Arc::new(AtomicBool::new(true));
    let poll = Duration::from_millis(config.report_poll_interval_ms as u64);

    let thread_flag = running.clone();
    let handle = std::thread::spawn(move || {
        receive_loop(port, ingress, poll, thread_flag);
    });
    SourceHandle::new(running, handle, "broadcast receiver")
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

/// Receiver with no attached device; never produces a report.
pub struct IdleReceiver;

impl ReportPort for IdleReceiver {
    fn poll_report(&mut self) -> Option<String> {
        None
    }
}

/// Receiver fed from a channel; tests and demos push reports in.
pub struct ScriptedReceiver {
    rx: mpsc::Receiver<String>,
}

impl ScriptedReceiver {
    pub fn new() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl ReportPort for ScriptedReceiver {
    fn poll_report(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}
