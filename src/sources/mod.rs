//! Hazard event sources — background threads feeding the router.
//!
//! Each source polls a sensor port on its own thread and submits
//! normalized [`HazardEvent`](crate::app::events::HazardEvent)s through
//! the shared [`EventIngress`](crate::app::ports::EventIngress).  All
//! sources are cancellable: `stop()` raises a flag and joins the thread.

pub mod broadcast;
pub mod shake;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use log::warn;

/// Handle to one running source thread.
pub struct SourceHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    name: &'static str,
}

impl SourceHandle {
    fn new(running: Arc<AtomicBool>, handle: JoinHandle<()>, name: &'static str) -> Self {
        Self {
            running,
            handle: Some(handle),
            name,
        }
    }

    /// Signal the thread to exit and join it.  Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("{} thread panicked during shutdown", self.name);
            }
        }
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
