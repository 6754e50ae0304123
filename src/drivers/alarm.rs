//! Two-tone siren driver.
//!
//! A background thread alternates the siren output between a high and a
//! low tone (880 Hz / 440 Hz by default, 500 ms per segment) until
//! stopped.  `start` is idempotent — a running pattern is never
//! restarted — and `stop` is synchronous: it joins the thread and forces
//! the output silent before returning, so callers can report "alarm
//! stopped" truthfully.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;

/// How finely the segment sleep is sliced so `stop` latency stays low.
const CANCEL_SLICE_MS: u64 = 20;

/// Shared siren output state, observable by tests and the demo GUI-less
/// status path.  A real PWM adapter would mirror these into hardware.
#[derive(Debug, Default)]
pub struct SirenOutput {
    /// Current tone frequency in Hz (meaningful only while `on`).
    pub frequency_hz: AtomicU32,
    /// Whether the output is currently driven.
    pub on: AtomicBool,
}

impl SirenOutput {
    fn silence(&self) {
        self.on.store(false, Ordering::Release);
    }

    fn tone(&self, hz: u32) {
        self.frequency_hz.store(hz, Ordering::Release);
        self.on.store(true, Ordering::Release);
    }
}

/// Owns the siren pattern thread.
pub struct AlarmDriver {
    output: Arc<SirenOutput>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    high_hz: u32,
    low_hz: u32,
    segment_ms: u32,
}

impl AlarmDriver {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            output: Arc::new(SirenOutput::default()),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            high_hz: config.siren_high_hz,
            low_hz: config.siren_low_hz,
            segment_ms: config.siren_segment_ms,
        }
    }

    /// Shared handle to the output state.
    pub fn output(&self) -> Arc<SirenOutput> {
        self.output.clone()
    }

    /// Start the pattern thread.  A second call while running is a no-op.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let output = self.output.clone();
        let running = self.running.clone();
        let (high, low, segment_ms) = (self.high_hz, self.low_hz, self.segment_ms as u64);

        self.handle = Some(std::thread::spawn(move || {
            info!("Siren pattern started ({high}Hz/{low}Hz)");
            while running.load(Ordering::Acquire) {
                for hz in [high, low] {
                    output.tone(hz);
                    // Sliced sleep so a stop request lands within one slice.
                    let mut remaining = segment_ms;
                    while remaining > 0 && running.load(Ordering::Acquire) {
                        let slice = remaining.min(CANCEL_SLICE_MS);
                        std::thread::sleep(Duration::from_millis(slice));
                        remaining -= slice;
                    }
                    if !running.load(Ordering::Acquire) {
                        break;
                    }
                }
            }
            output.silence();
        }));
    }

    /// Stop the pattern and silence the output before returning.
    /// Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Siren thread panicked; output forced silent");
            }
        }
        // The thread silences on exit; this covers the never-started case.
        self.output.silence();
    }

    /// Whether the pattern thread is running.
    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for AlarmDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
