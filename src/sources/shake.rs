//! Shake monitor — polls the accelerometer and reports seismic motion.
//!
//! Samples an [`AccelPort`] at the configured rate, computes the total
//! acceleration magnitude, and submits a
//! [`HazardEvent::Shake`](crate::app::events::HazardEvent) when the
//! deviation from 1 G exceeds the configured threshold.  After a report
//! the monitor re-arms only once the re-arm window elapses, so a single
//! quake does not flood the router with one event per sample.
//!
//! The threshold is also re-checked inside the Normal state handler;
//! the pre-filter here only exists to keep sub-threshold samples off
//! the router entirely.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::app::events::HazardEvent;
use crate::app::ports::{AccelPort, EventIngress};
use crate::config::SystemConfig;

use super::SourceHandle;

/// Poll loop, extracted so tests can drive it with scripted adapters.
fn monitor_loop(
    mut accel: impl AccelPort,
    ingress: Arc<dyn EventIngress>,
    threshold_g: f32,
    poll: Duration,
    rearm: Duration,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::Acquire) {
        let (ax, ay, az) = accel.read_g();
        let magnitude = (ax * ax + ay * ay + az * az).sqrt();

        if (magnitude - 1.0).abs() > threshold_g {
            info!("Shake: {magnitude:.2}G");
            if ingress
                .submit(HazardEvent::Shake { magnitude })
                .is_err()
            {
                warn!("Shake event rejected by router");
            }
            // Re-arm window; sliced so stop() stays responsive.
            let mut remaining = rearm;
            while !remaining.is_zero() && running.load(Ordering::Acquire) {
                let slice = remaining.min(Duration::from_millis(50));
                std::thread::sleep(slice);
                remaining -= slice;
            }
        }

        std::thread::sleep(poll);
    }
}

/// Spawn the monitor thread.
pub fn spawn(
    accel: impl AccelPort + 'static,
    ingress: Arc<dyn EventIngress>,
    config: &SystemConfig,
) -> SourceHandle {
    let running = Arc::new(AtomicBool::new(true));
    let threshold_g = config.shake_threshold_g;
    let poll = Duration::from_millis(config.shake_poll_interval_ms as u64);
    let rearm = Duration::from_millis(config.shake_rearm_ms as u64);

    let thread_flag = running.clone();
    let handle = std::thread::spawn(move || {
        monitor_loop(accel, ingress, threshold_g, poll, rearm, thread_flag);
    });
    SourceHandle::new(running, handle, "shake monitor")
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

/// Quiet accelerometer: 1 G on Z with a small deterministic wobble.
pub struct SimulatedAccel {
    sample: u32,
}

impl SimulatedAccel {
    pub fn new() -> Self {
        Self { sample: 0 }
    }
}

impl Default for SimulatedAccel {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelPort for SimulatedAccel {
    fn read_g(&mut self) -> (f32, f32, f32) {
        self.sample = self.sample.wrapping_add(1);
        // +/- 0.01 G triangle wobble around rest.
        let wobble = ((self.sample % 20) as f32 - 10.0) / 1000.0;
        (0.0, 0.0, 1.0 + wobble)
    }
}

/// Plays back a fixed list of samples, then holds the last one.
pub struct ScriptedAccel {
    samples: Vec<(f32, f32, f32)>,
    cursor: usize,
}

impl ScriptedAccel {
    pub fn new(samples: Vec<(f32, f32, f32)>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl AccelPort for ScriptedAccel {
    fn read_g(&mut self) -> (f32, f32, f32) {
        let sample = self
            .samples
            .get(self.cursor)
            .or_else(|| self.samples.last())
            .copied()
            .unwrap_or((0.0, 0.0, 1.0));
        if self.cursor < self.samples.len() {
            self.cursor += 1;
        }
        sample
    }
}
