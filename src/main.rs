//! QuakeGuard — Main Entry Point
//!
//! Hexagonal architecture with one serialized event path.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogStatusSink    ChannelStatusSink         │
//! │  (Outlet+Siren)     (StatusSink)     (StatusSink → TCP)        │
//! │  CommandServer      shake monitor    broadcast receiver        │
//! │  (JSON over TCP)    (AccelPort)      (ReportPort)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        EventRouter → SafetyController (pure logic)     │    │
//! │  │        Boot / Normal / Alert / Recovery FSM            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use quakeguard::adapters::hardware::HardwareAdapter;
use quakeguard::adapters::sinks::{ChannelStatusSink, FanoutSink, LogStatusSink};
use quakeguard::app::events::HazardEvent;
use quakeguard::app::ports::EventIngress;
use quakeguard::app::service::SafetyController;
use quakeguard::config::SystemConfig;
use quakeguard::drivers::buttons::{ButtonPanel, SimulatedButtons};
use quakeguard::router::EventRouter;
use quakeguard::server::CommandServer;
use quakeguard::sources::broadcast::IdleReceiver;
use quakeguard::sources::shake::SimulatedAccel;
use quakeguard::sources::{broadcast, shake};

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::var_os("QUAKEGUARD_CONFIG") {
        Some(path) => SystemConfig::load_or_default(&PathBuf::from(path)),
        None => SystemConfig::default(),
    };
    info!("QuakeGuard starting");

    // ── 2. Hardware adapters (simulated on a bare host) ───────
    let hw = HardwareAdapter::simulated(&config);
    let sink = FanoutSink::new(vec![
        Box::new(LogStatusSink::new()),
        Box::new(ChannelStatusSink::new()),
    ]);

    // ── 3. Core: controller behind the serializing router ─────
    let controller = SafetyController::new(config.clone());
    let router = Arc::new(EventRouter::new(controller, hw, sink));
    router.start()?;
    let ingress: Arc<dyn EventIngress> = router.clone();

    // ── 4. Hazard sources ─────────────────────────────────────
    let mut shake_monitor = shake::spawn(SimulatedAccel::new(), ingress.clone(), &config);
    let mut receiver = broadcast::spawn(IdleReceiver, ingress.clone(), &config);

    // ── 5. Command server ─────────────────────────────────────
    let mut server = CommandServer::spawn(ingress.clone(), &config)?;

    info!("System ready. Entering scan loop.");

    // ── 6. Button scan + telemetry loop ───────────────────────
    let buttons = SimulatedButtons::new();
    let mut panel = ButtonPanel::new(&config);
    let started = Instant::now();
    let scan = Duration::from_millis(config.button_scan_interval_ms as u64);
    let telemetry_every = Duration::from_secs(config.telemetry_interval_secs as u64);
    let mut last_telemetry = Instant::now();

    let run_result = loop {
        let now_ms = started.elapsed().as_millis() as u32;

        let mut pressed = Vec::new();
        panel.tick(&buttons, now_ms, |id| pressed.push(id));
        // Button events are never rejected by the FSM, so a submit error
        // means the router itself is gone.
        if let Some(e) = pressed
            .into_iter()
            .find_map(|id| ingress.submit(HazardEvent::ButtonPress { id }).err())
        {
            break Err(anyhow::anyhow!("router unavailable: {e}"));
        }

        if last_telemetry.elapsed() >= telemetry_every {
            last_telemetry = Instant::now();
            match router.snapshot() {
                Ok(snapshot) => info!(
                    "TELEM | state={:?} | alert=\"{}\"",
                    snapshot.state, snapshot.alert_message
                ),
                Err(e) => break Err(anyhow::anyhow!("router unavailable: {e}")),
            }
        }

        std::thread::sleep(scan);
    };

    // ── 7. Shutdown sequence ──────────────────────────────────
    // Router first (stop accepting, final all-off, alarm joined),
    // then the producers.
    router.shutdown();
    server.stop();
    shake_monitor.stop();
    receiver.stop();
    info!("QuakeGuard stopped");

    run_result
}
