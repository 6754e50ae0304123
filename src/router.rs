//! Event router — the single serialization point for hazard events.
//!
//! Every source (shake monitor, broadcast receiver, button scanner, TCP
//! server) submits through one [`EventRouter`].  A `std::sync::Mutex`
//! around the controller, the hardware ports, and the status sink makes
//! each submit an atomic transition: lock, dispatch, actuate, publish,
//! release.  The event history is therefore linear, nothing is dropped,
//! and a blocked producer waits rather than losing its event.
//!
//! A poisoned lock is the one fatal condition.  It means a handler
//! panicked mid-transition, so the router forces the terminal all-off
//! action on the poisoned state and reports [`Error::RouterPoisoned`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};

use crate::app::events::{EventOutcome, HazardEvent, StatusSnapshot};
use crate::app::ports::{EventIngress, OutletPort, SirenPort, StatusSink};
use crate::app::service::SafetyController;
use crate::error::{Error, Result};

struct RouterInner<H, S> {
    controller: SafetyController,
    hw: H,
    sink: S,
}

/// Serializes event application across all producer threads.
pub struct EventRouter<H, S> {
    inner: Mutex<RouterInner<H, S>>,
    accepting: AtomicBool,
}

impl<H, S> EventRouter<H, S>
where
    H: OutletPort + SirenPort + Send,
    S: StatusSink + Send,
{
    pub fn new(controller: SafetyController, hw: H, sink: S) -> Self {
        Self {
            inner: Mutex::new(RouterInner {
                controller,
                hw,
                sink,
            }),
            accepting: AtomicBool::new(true),
        }
    }

    /// Run the startup sequence (Boot settling into Normal) under the lock.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let RouterInner {
            controller,
            hw,
            sink,
        } = &mut *inner;
        controller.start(hw, sink);
        Ok(())
    }

    /// Apply one event.  Blocks while another producer holds the lock.
    pub fn submit(&self, event: HazardEvent) -> Result<EventOutcome> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(Error::ShuttingDown);
        }

        let mut inner = self.lock()?;
        let RouterInner {
            controller,
            hw,
            sink,
        } = &mut *inner;
        controller.handle_event(&event, hw, sink)
    }

    /// Current controller status, read under the lock.
    pub fn snapshot(&self) -> Result<StatusSnapshot> {
        Ok(self.lock()?.controller.snapshot())
    }

    /// Stop accepting events, de-energize every outlet, and silence the
    /// alarm.  Idempotent; runs even if the lock is poisoned.
    pub fn shutdown(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            info!("Router shutting down");
        }
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        SafetyController::emergency_stop(&mut inner.hw);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RouterInner<H, S>>> {
        self.inner.lock().map_err(|poisoned| {
            // A handler panicked mid-transition.  Force the terminal
            // safety action on whatever state the panic left behind.
            error!("Router lock poisoned, forcing all-off");
            let mut inner = poisoned.into_inner();
            SafetyController::emergency_stop(&mut inner.hw);
            self.accepting.store(false, Ordering::Release);
            Error::RouterPoisoned
        })
    }
}

impl<H, S> EventIngress for EventRouter<H, S>
where
    H: OutletPort + SirenPort + Send,
    S: StatusSink + Send,
{
    fn submit(&self, event: HazardEvent) -> Result<EventOutcome> {
        match EventRouter::submit(self, event) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("Event rejected: {e}");
                Err(e)
            }
        }
    }
}
