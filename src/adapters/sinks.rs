//! Status sink adapters.
//!
//! The controller publishes one [`StatusSnapshot`] per applied change;
//! these adapters decide where it goes.  [`LogStatusSink`] writes log
//! lines, [`ChannelStatusSink`] hands snapshots to the TCP server's
//! write task over a bounded channel, and [`FanoutSink`] combines
//! several sinks.  None of them block: a full channel drops the
//! snapshot with a warning, never stalling a transition.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::events::StatusSnapshot;
use crate::app::ports::StatusSink;

/// Channel depth for status snapshots headed to the I/O thread.
const STATUS_DEPTH: usize = 16;

/// Status channel: control side → server write task.
pub static STATUS_CHANNEL: Channel<CriticalSectionRawMutex, StatusSnapshot, STATUS_DEPTH> =
    Channel::new();

// ───────────────────────────────────────────────────────────────
// Log sink
// ───────────────────────────────────────────────────────────────

/// Adapter that logs every snapshot to the console.
pub struct LogStatusSink;

impl LogStatusSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for LogStatusSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        let outlets: String = snapshot
            .outlets
            .0
            .iter()
            .map(|on| if *on { '1' } else { '0' })
            .collect();
        if snapshot.alert_message.is_empty() {
            info!("STATUS | state={:?} | outlets={}", snapshot.state, outlets);
        } else {
            info!(
                "STATUS | state={:?} | outlets={} | alert=\"{}\"",
                snapshot.state, outlets, snapshot.alert_message
            );
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Channel sink (feeds the TCP server write task)
// ───────────────────────────────────────────────────────────────

/// Adapter that forwards snapshots to [`STATUS_CHANNEL`].
pub struct ChannelStatusSink;

impl ChannelStatusSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChannelStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ChannelStatusSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        if STATUS_CHANNEL.try_send(snapshot.clone()).is_err() {
            warn!("Status channel full, dropping snapshot");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Fan-out
// ───────────────────────────────────────────────────────────────

/// Publishes each snapshot to every wrapped sink in order.
pub struct FanoutSink {
    sinks: Vec<Box<dyn StatusSink + Send>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn StatusSink + Send>>) -> Self {
        Self { sinks }
    }
}

impl StatusSink for FanoutSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        for sink in &mut self.sinks {
            sink.publish(snapshot);
        }
    }
}
